//! Admin moderation of donation requests and platform statistics.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use givehub_common::{AppError, AppResult};
use givehub_db::{
    entities::{
        donation_request::{self, RequestStatus},
        user::{self, UserRole},
    },
    repositories::{
        DonationRepository, DonationRequestRepository, Paged, StoryRepository, UserRepository,
    },
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Iterable, Set};
use serde::Serialize;

use super::donation_request::RequestSummary;
use super::lifecycle::{self, Transition};
use super::user::require_admin;

/// Platform-wide counters for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Every role, zero-filled.
    pub users_by_role: BTreeMap<&'static str, i64>,
    /// Every status, zero-filled.
    pub requests_by_status: BTreeMap<&'static str, i64>,
    pub total_donated: Decimal,
    pub donation_count: i64,
    pub story_count: u64,
}

/// Moderation service for business logic.
#[derive(Clone)]
pub struct ModerationService {
    request_repo: DonationRequestRepository,
    user_repo: UserRepository,
    donation_repo: DonationRepository,
    story_repo: StoryRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            request_repo: DonationRequestRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            donation_repo: DonationRepository::new(Arc::clone(&db)),
            story_repo: StoryRepository::new(db),
        }
    }

    /// Requests in one status, oldest first.
    pub async fn queue(
        &self,
        admin: &user::Model,
        status: RequestStatus,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<RequestSummary>> {
        require_admin(admin)?;

        let now = Utc::now();
        let page = self
            .request_repo
            .list_by_status(status, page, per_page)
            .await?;
        Ok(page.map(|request| RequestSummary::new(request, now)))
    }

    /// Approve a pending request.
    pub async fn approve(&self, admin: &user::Model, id: &str) -> AppResult<RequestSummary> {
        let now = Utc::now();
        let changes = donation_request::ActiveModel {
            status: Set(RequestStatus::Approved),
            approved_at: Set(Some(now.into())),
            approved_by: Set(Some(admin.id.clone())),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.moderate(admin, id, Transition::Approve, changes).await
    }

    /// Reject a pending request. The organizer may edit and resubmit it.
    pub async fn reject(&self, admin: &user::Model, id: &str) -> AppResult<RequestSummary> {
        let now = Utc::now();
        let changes = donation_request::ActiveModel {
            status: Set(RequestStatus::Rejected),
            rejected_at: Set(Some(now.into())),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        self.moderate(admin, id, Transition::Reject, changes).await
    }

    async fn moderate(
        &self,
        admin: &user::Model,
        id: &str,
        transition: Transition,
        changes: donation_request::ActiveModel,
    ) -> AppResult<RequestSummary> {
        require_admin(admin)?;

        let request = self.request_repo.get_by_id(id).await?;
        lifecycle::next_status(request.status, transition)?;

        // Guarded on PENDING so a concurrent decision cannot also land.
        if !self
            .request_repo
            .update_if_status(id, transition.sources(), changes)
            .await?
        {
            return Err(AppError::InvalidState(
                "Request was moderated by someone else".to_string(),
            ));
        }

        tracing::info!(
            request_id = %id,
            admin_id = %admin.id,
            transition = ?transition,
            "Donation request moderated"
        );

        let request = self.request_repo.get_by_id(id).await?;
        Ok(RequestSummary::new(request, Utc::now()))
    }

    /// Counters across the whole platform.
    pub async fn stats(&self, admin: &user::Model) -> AppResult<AdminStats> {
        require_admin(admin)?;

        let mut users_by_role: BTreeMap<&'static str, i64> =
            UserRole::iter().map(|role| (role_code(role), 0)).collect();
        for (role, count) in self.user_repo.count_by_role().await? {
            users_by_role.insert(role_code(role), count);
        }

        let mut requests_by_status: BTreeMap<&'static str, i64> = RequestStatus::iter()
            .map(|status| (lifecycle::status_code(status), 0))
            .collect();
        for (status, count) in self.request_repo.count_by_status(None).await? {
            requests_by_status.insert(lifecycle::status_code(status), count);
        }

        let totals = self.donation_repo.totals_all().await?;
        let story_count = self.story_repo.count_all().await?;

        Ok(AdminStats {
            users_by_role,
            requests_by_status,
            total_donated: totals.amount(),
            donation_count: totals.count,
            story_count,
        })
    }
}

const fn role_code(role: UserRole) -> &'static str {
    match role {
        UserRole::Donor => "DONOR",
        UserRole::Organizer => "ORGANIZER",
        UserRole::Admin => "ADMIN",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use givehub_db::test_utils::{request_model, user_model};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn service(db: MockDatabase) -> ModerationService {
        ModerationService::new(Arc::new(db.into_connection()))
    }

    fn updated(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_approve_requires_admin() {
        let organizer = user_model("o1", UserRole::Organizer);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = service.approve(&organizer, "r1").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_approve_pending_request() {
        let admin = user_model("a1", UserRole::Admin);
        let mut approved = request_model("r1", "o1", RequestStatus::Approved);
        approved.approved_by = Some("a1".to_string());
        approved.approved_at = Some(Utc::now().into());

        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request_model("r1", "o1", RequestStatus::Pending)]])
                .append_exec_results([updated(1)])
                .append_query_results([[approved]]),
        );

        let summary = service.approve(&admin, "r1").await.unwrap();
        assert_eq!(summary.request.status, RequestStatus::Approved);
        assert_eq!(summary.request.approved_by.as_deref(), Some("a1"));
        assert!(summary.request.approved_at.is_some());
    }

    #[tokio::test]
    async fn test_reject_approved_request_is_invalid() {
        let admin = user_model("a1", UserRole::Admin);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request_model("r1", "o1", RequestStatus::Approved)]]),
        );

        let err = service.reject(&admin, "r1").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_lost_race_is_reported() {
        let admin = user_model("a1", UserRole::Admin);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request_model("r1", "o1", RequestStatus::Pending)]])
                .append_exec_results([updated(0)]),
        );

        let err = service.reject(&admin, "r1").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_stats_are_zero_filled() {
        let admin = user_model("a1", UserRole::Admin);
        // Tuple rows are read by position, so keys sort in select order.
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[BTreeMap::from([
                    ("role", Value::from("DONOR")),
                    ("total", Value::from(3_i64)),
                ])]])
                .append_query_results([[BTreeMap::from([
                    ("status", Value::from("PENDING")),
                    ("total", Value::from(2_i64)),
                ])]])
                .append_query_results([[BTreeMap::from([
                    ("total", Value::from(Decimal::new(1500, 0))),
                    ("count", Value::from(2_i64)),
                    ("supporters", Value::from(2_i64)),
                ])]])
                .append_query_results([[BTreeMap::from([(
                    "num_items",
                    Value::from(4_i64),
                )])]]),
        );

        let stats = service.stats(&admin).await.unwrap();

        assert_eq!(stats.users_by_role["DONOR"], 3);
        assert_eq!(stats.users_by_role["ADMIN"], 0);
        assert_eq!(stats.requests_by_status["PENDING"], 2);
        assert_eq!(stats.requests_by_status["APPROVED"], 0);
        assert_eq!(stats.requests_by_status.len(), 4);
        assert_eq!(stats.total_donated, Decimal::new(1500, 0));
        assert_eq!(stats.donation_count, 2);
        assert_eq!(stats.story_count, 4);
    }
}
