//! Donation service: the money ledger behind request progress.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use givehub_common::{AppError, AppResult, IdGenerator};
use givehub_db::{
    entities::{
        donation,
        donation_request::{self, RequestStatus},
        user::{self, UserRole},
    },
    repositories::{DonationRepository, DonationRequestRepository, Paged, UserRepository},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::donation_request::can_view;
use super::progress::Progress;
use super::user::UserSummary;

/// Input for a money donation.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DonateInput {
    pub amount: Decimal,

    #[validate(length(max = 1000))]
    pub message: Option<String>,

    #[serde(default)]
    pub is_anonymous: bool,
}

/// A donation as other users see it. Anonymous donors are hidden.
#[derive(Debug, Clone, Serialize)]
pub struct DonationView {
    pub id: String,
    pub donation_request_id: String,
    pub amount: Decimal,
    pub message: Option<String>,
    pub is_anonymous: bool,
    pub donor: Option<UserSummary>,
    pub created_at: DateTime<FixedOffset>,
}

impl DonationView {
    /// Build the public view; `donor` is dropped for anonymous donations.
    #[must_use]
    pub fn new(donation: donation::Model, donor: Option<&user::Model>) -> Self {
        Self {
            donor: donor
                .filter(|_| !donation.is_anonymous)
                .map(UserSummary::from),
            id: donation.id,
            donation_request_id: donation.donation_request_id,
            amount: donation.amount,
            message: donation.message,
            is_anonymous: donation.is_anonymous,
            created_at: donation.created_at,
        }
    }
}

/// A recorded donation and the request's progress after it.
#[derive(Debug, Clone, Serialize)]
pub struct DonationReceipt {
    pub donation: donation::Model,
    pub progress: Progress,
}

/// Donation service for business logic.
#[derive(Clone)]
pub struct DonationService {
    db: Arc<DatabaseConnection>,
    donation_repo: DonationRepository,
    request_repo: DonationRequestRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl DonationService {
    /// Create a new donation service.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            donation_repo: DonationRepository::new(Arc::clone(&db)),
            request_repo: DonationRequestRepository::new(Arc::clone(&db)),
            user_repo: UserRepository::new(Arc::clone(&db)),
            id_gen: IdGenerator::new(),
            db,
        }
    }

    /// Record a money donation.
    ///
    /// The ledger row and the request's `current_amount` and `supporters`
    /// columns are written in one transaction.
    pub async fn donate(
        &self,
        donor: &user::Model,
        request_id: &str,
        input: DonateInput,
    ) -> AppResult<DonationReceipt> {
        match donor.role {
            UserRole::Donor => {}
            UserRole::Organizer | UserRole::Admin => {
                return Err(AppError::Forbidden(
                    "Only donors can make donations".to_string(),
                ));
            }
        }

        input.validate()?;
        // Stored with two decimal places; the stored value must stay positive.
        let amount = input.amount.round_dp(2);
        if amount <= Decimal::ZERO {
            return Err(AppError::field(
                "amount",
                "The amount must be at least 0.01.",
            ));
        }

        let request = self.request_repo.get_by_id(request_id).await?;
        let now = Utc::now();
        check_accepts_money(&request, now)?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let model = donation::ActiveModel {
            id: Set(self.id_gen.generate()),
            donation_request_id: Set(request.id.clone()),
            donor_id: Set(donor.id.clone()),
            amount: Set(amount),
            message: Set(input.message.filter(|m| !m.trim().is_empty())),
            is_anonymous: Set(input.is_anonymous),
            created_at: Set(now.into()),
        };
        let donation = DonationRepository::create_in(&txn, model).await?;

        // The amount update locks the request row; recount only after it so a
        // concurrent donation's supporter cannot be missed.
        DonationRequestRepository::add_donation_in(&txn, &request.id, donation.amount).await?;
        let supporters = DonationRepository::count_supporters_in(&txn, &request.id).await?;
        DonationRequestRepository::set_supporters_in(&txn, &request.id, supporters).await?;

        let updated = DonationRequestRepository::find_by_id_in(&txn, &request.id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(request.id.clone()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            donation_id = %donation.id,
            request_id = %request.id,
            donor_id = %donor.id,
            amount = %donation.amount,
            "Donation recorded"
        );

        Ok(DonationReceipt {
            donation,
            progress: Progress::of(&updated, now),
        })
    }

    /// Donations to a request the viewer may see, newest first.
    pub async fn list_for_request(
        &self,
        viewer: Option<&user::Model>,
        request_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<DonationView>> {
        let request = self.request_repo.get_by_id(request_id).await?;
        if !can_view(viewer, &request) {
            return Err(AppError::RequestNotFound(request_id.to_string()));
        }

        let page = self
            .donation_repo
            .list_by_request(&request.id, page, per_page)
            .await?;

        let donor_ids: Vec<String> = page
            .items
            .iter()
            .filter(|d| !d.is_anonymous)
            .map(|d| d.donor_id.clone())
            .collect();
        let donors = self.user_repo.find_by_ids(&donor_ids).await?;

        Ok(page.map(|donation| {
            let donor = donors.iter().find(|u| u.id == donation.donor_id);
            DonationView::new(donation, donor)
        }))
    }

    /// The donor's own donations, newest first.
    pub async fn my_donations(
        &self,
        donor: &user::Model,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation::Model>> {
        self.donation_repo.list_by_donor(&donor.id, page, per_page).await
    }
}

fn check_accepts_money(request: &donation_request::Model, now: DateTime<Utc>) -> AppResult<()> {
    if request.status != RequestStatus::Approved {
        return Err(AppError::InvalidState(
            "Donations are accepted only for approved requests".to_string(),
        ));
    }
    if !request.accepts_money {
        return Err(AppError::InvalidState(
            "This request does not accept money donations".to_string(),
        ));
    }
    if request.expires_at.is_some_and(|expires_at| expires_at <= now) {
        return Err(AppError::InvalidState(
            "This request has expired".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use givehub_db::test_utils::{donation_model, request_model, user_model};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service(db: MockDatabase) -> DonationService {
        DonationService::new(Arc::new(db.into_connection()))
    }

    fn input(amount: i64) -> DonateInput {
        DonateInput {
            amount: Decimal::new(amount, 0),
            message: Some("Good luck!".to_string()),
            is_anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_donate_requires_donor_role() {
        let organizer = user_model("o1", UserRole::Organizer);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = service.donate(&organizer, "r1", input(100)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_donate_rejects_non_positive_amount() {
        let donor = user_model("d1", UserRole::Donor);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let err = service.donate(&donor, "r1", input(0)).await.unwrap_err();
        match err {
            AppError::Validation { fields, .. } => assert!(fields.contains_key("amount")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_donate_to_pending_request() {
        let donor = user_model("d1", UserRole::Donor);
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[request_model("r1", "o1", RequestStatus::Pending)]]),
        );

        let err = service.donate(&donor, "r1", input(100)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_donate_to_expired_request() {
        let donor = user_model("d1", UserRole::Donor);
        let mut request = request_model("r1", "o1", RequestStatus::Approved);
        request.expires_at = Some((Utc::now() - Duration::days(1)).into());
        let service = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[request]]),
        );

        let err = service.donate(&donor, "r1", input(100)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    fn updated() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    /// Mock results for one successful donation, in statement order.
    fn donation_db(amount: i64, after: donation_request::Model) -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[request_model("r1", "o1", RequestStatus::Approved)]])
            .append_query_results([[donation_model("dn1", "r1", "d1", amount)]])
            .append_exec_results([updated()])
            .append_query_results([[std::collections::BTreeMap::from([(
                "count",
                sea_orm::Value::from(1_i64),
            )])]])
            .append_exec_results([updated()])
            .append_query_results([[after]])
    }

    #[tokio::test]
    async fn test_donate_updates_progress() {
        let donor = user_model("d1", UserRole::Donor);
        let mut after = request_model("r1", "o1", RequestStatus::Approved);
        after.current_amount = Decimal::new(1000, 0);
        after.supporters = 1;

        let service = service(donation_db(1000, after));

        let receipt = service.donate(&donor, "r1", input(1000)).await.unwrap();

        assert_eq!(receipt.donation.amount, Decimal::new(1000, 0));
        assert_eq!(receipt.progress.current_amount, Decimal::new(1000, 0));
        assert_eq!(receipt.progress.supporters, 1);
        assert_eq!(receipt.progress.progress_percentage, Decimal::new(20, 0));
    }

    #[tokio::test]
    async fn test_supporters_are_recounted_after_the_row_lock() {
        let donor = user_model("d1", UserRole::Donor);
        let after = request_model("r1", "o1", RequestStatus::Approved);
        let db = Arc::new(donation_db(1000, after).into_connection());
        let service = DonationService::new(Arc::clone(&db));

        service.donate(&donor, "r1", input(1000)).await.unwrap();
        drop(service);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let txn = log
            .iter()
            .find(|t| t.statements().iter().any(|st| st.sql.contains("COUNT(DISTINCT donor_id)")))
            .unwrap();
        let position = |pred: &dyn Fn(&str) -> bool| {
            txn.statements().iter().position(|st| pred(&st.sql)).unwrap()
        };

        let lock = position(&|sql| sql.starts_with("UPDATE") && sql.contains("current_amount"));
        let count = position(&|sql| sql.contains("COUNT(DISTINCT donor_id)"));
        let supporters = position(&|sql| sql.starts_with("UPDATE") && sql.contains("supporters"));
        assert!(lock < count);
        assert!(count < supporters);
    }

    #[tokio::test]
    async fn test_donate_rejects_amount_that_rounds_to_zero() {
        let donor = user_model("d1", UserRole::Donor);
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let tiny = DonateInput {
            amount: Decimal::new(1, 3),
            message: None,
            is_anonymous: false,
        };
        let err = service.donate(&donor, "r1", tiny).await.unwrap_err();
        match err {
            AppError::Validation { fields, .. } => assert!(fields.contains_key("amount")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_anonymous_donor_is_masked() {
        let donor = user_model("d1", UserRole::Donor);
        let mut donation = donation_model("dn1", "r1", "d1", 50);
        donation.is_anonymous = true;

        let view = DonationView::new(donation, Some(&donor));
        assert!(view.donor.is_none());

        let view = DonationView::new(donation_model("dn2", "r1", "d1", 50), Some(&donor));
        assert_eq!(view.donor.unwrap().name, "User d1");
    }
}
