//! Database entities.

#![allow(missing_docs)]

pub mod category;
pub mod donation;
pub mod donation_request;
pub mod organization;
pub mod story;
pub mod user;

pub use category::Entity as Category;
pub use donation::Entity as Donation;
pub use donation_request::Entity as DonationRequest;
pub use organization::Entity as Organization;
pub use story::Entity as Story;
pub use user::Entity as User;
