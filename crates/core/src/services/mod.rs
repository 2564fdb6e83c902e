//! Business logic services.

#![allow(missing_docs)]

pub mod donation;
pub mod donation_request;
pub mod lifecycle;
pub mod media;
pub mod moderation;
pub mod progress;
pub mod storage;
pub mod story;
pub mod story_stats;
pub mod user;

pub use donation::{DonateInput, DonationReceipt, DonationService, DonationView};
pub use donation_request::{
    BankAccount, CreateRequestInput, DashboardEntry, DonationRequestService, OrganizerDashboard,
    PaymentMethods, RequestDetail, RequestSummary, UpdateRequestInput,
};
pub use lifecycle::Transition;
pub use media::{MediaUpload, ValidatedMedia};
pub use moderation::{AdminStats, ModerationService};
pub use progress::Progress;
pub use storage::{LocalStorage, MemoryStorage, StorageBackend, StorageService};
pub use story::{CreateStoryInput, StoryService, UpdateStoryInput};
pub use story_stats::{StatsQuery, StoryPerformance, StoryStats, TimeRange};
pub use user::{AuthSession, RegisterInput, SignInInput, UserService, UserSummary};
