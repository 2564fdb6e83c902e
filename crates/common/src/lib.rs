//! Common utilities and shared types for givehub.
//!
//! This crate provides foundational components used across all givehub crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers, access tokens and slugs via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use givehub_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let slug = id_gen.generate_slug("Clean water for Ban Nong Khai");
//!     println!("{} listening on {}", slug, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult, FieldErrors, collect_field_errors, set_expose_details};
pub use id::IdGenerator;
