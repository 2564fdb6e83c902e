//! Model fixtures for tests against `MockDatabase`.
//!
//! Enabled for this crate's tests and, through the `test-utils` feature,
//! for downstream crates.

#![allow(missing_docs)]

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;

use crate::entities::{
    category, donation,
    donation_request::{self, RequestStatus, Urgency},
    organization,
    story::{self, MediaType, StoryStatus, StoryType},
    user::{self, UserRole, UserStatus},
};

/// An active user whose token is `token-{id}`.
#[must_use]
pub fn user_model(id: &str, role: UserRole) -> user::Model {
    user::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        name: format!("User {id}"),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        token: Some(format!("token-{id}")),
        role,
        status: UserStatus::Active,
        is_verified: false,
        organization_id: None,
        phone: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

#[must_use]
pub fn organization_model(id: &str) -> organization::Model {
    organization::Model {
        id: id.to_string(),
        name: "Ban Nong Khai Foundation".to_string(),
        org_type: "foundation".to_string(),
        registration_number: None,
        contact_email: "contact@example.org".to_string(),
        contact_phone: None,
        address: None,
        created_at: Utc::now().into(),
    }
}

#[must_use]
pub fn category_model(id: i32, name: &str) -> category::Model {
    category::Model {
        id,
        name: name.to_string(),
    }
}

/// A money request with a goal of 5000 and nothing raised yet.
#[must_use]
pub fn request_model(
    id: &str,
    organizer_id: &str,
    status: RequestStatus,
) -> donation_request::Model {
    donation_request::Model {
        id: id.to_string(),
        slug: format!("clean-water-{id}"),
        title: "Clean water".to_string(),
        description: "A well for the village school.".to_string(),
        category_id: 1,
        organizer_id: organizer_id.to_string(),
        organization_id: "org1".to_string(),
        urgency: Urgency::Medium,
        accepts_money: true,
        accepts_items: false,
        accepts_volunteer: false,
        goal_amount: Some(Decimal::new(5000, 0)),
        current_amount: Decimal::ZERO,
        payment_methods: Some(json!({
            "bank_account": {
                "bank": "Kasikorn",
                "account_number": "123-4-56789-0",
                "account_name": "Ban Nong Khai Foundation"
            }
        })),
        items_needed: None,
        volunteers_needed: None,
        volunteers_received: 0,
        volunteer_details: None,
        location: Some("Nong Khai".to_string()),
        latitude: None,
        longitude: None,
        status,
        expires_at: None,
        approved_at: None,
        approved_by: None,
        rejected_at: None,
        view_count: 0,
        supporters: 0,
        recommendation_score: 0.0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

#[must_use]
pub fn donation_model(
    id: &str,
    donation_request_id: &str,
    donor_id: &str,
    amount: i64,
) -> donation::Model {
    donation::Model {
        id: id.to_string(),
        donation_request_id: donation_request_id.to_string(),
        donor_id: donor_id.to_string(),
        amount: Decimal::new(amount, 0),
        message: None,
        is_anonymous: false,
        created_at: Utc::now().into(),
    }
}

/// An image progress story. Published stories carry `published_at`.
#[must_use]
pub fn story_model(
    id: &str,
    donation_request_id: &str,
    author_id: &str,
    status: StoryStatus,
    views: i32,
) -> story::Model {
    let now = Utc::now();
    story::Model {
        id: id.to_string(),
        donation_request_id: donation_request_id.to_string(),
        author_id: author_id.to_string(),
        title: "First week".to_string(),
        content: "Digging started.".to_string(),
        story_type: StoryType::Progress,
        status,
        media_type: MediaType::Image,
        media_path: format!("stories/2025/01/{id}.jpg"),
        media_url: format!("/storage/stories/2025/01/{id}.jpg"),
        duration: 5,
        views,
        published_at: (status == StoryStatus::Published).then(|| now.into()),
        created_at: now.into(),
        updated_at: None,
    }
}
