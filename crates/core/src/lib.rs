//! Core business logic for givehub.
//!
//! Services wrap the repositories of `givehub-db` and enforce the donation
//! request lifecycle, moderation, the donation ledger and the story
//! subsystem. HTTP concerns live in `givehub-api`.

pub mod services;

pub use services::*;
