//! Donation request repository.

use std::sync::Arc;

use crate::entities::{
    DonationRequest,
    donation_request::{self, DonationType, RequestStatus, Urgency},
};
use crate::repositories::{Paged, page_offset};
use givehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    prelude::Decimal,
    sea_query::{Expr, LikeExpr, SimpleExpr, extension::postgres::PgExpr},
};

/// Requests per status.
pub type StatusCount = (RequestStatus, i64);

/// Sortable columns of the public listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    GoalAmount,
    CurrentAmount,
    ViewCount,
    Supporters,
    ExpiresAt,
    Urgency,
}

impl RequestSort {
    /// Parse a `sort_by` query value. Anything outside the whitelist is `None`.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        Some(match value {
            "created_at" => Self::CreatedAt,
            "updated_at" => Self::UpdatedAt,
            "title" => Self::Title,
            "goal_amount" => Self::GoalAmount,
            "current_amount" => Self::CurrentAmount,
            "view_count" => Self::ViewCount,
            "supporters" => Self::Supporters,
            "expires_at" => Self::ExpiresAt,
            "urgency" => Self::Urgency,
            _ => return None,
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse a `sort_order` query value.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

/// Filters of the public listing.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub category_id: Option<i32>,
    pub donation_type: Option<DonationType>,
    /// Substring of the location.
    pub location: Option<String>,
    pub urgency: Option<Urgency>,
    /// Substring of the title or the description.
    pub search: Option<String>,
    pub sort: RequestSort,
    pub order: SortOrder,
}

/// Case-insensitive substring match; `%`, `_` and `\` in `text` match literally.
fn ilike_contains(column: donation_request::Column, text: &str) -> SimpleExpr {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');

    Expr::col(column).ilike(LikeExpr::new(pattern).escape('\\'))
}

impl RequestFilter {
    fn condition(&self) -> Condition {
        let mut condition =
            Condition::all().add(donation_request::Column::Status.eq(RequestStatus::Approved));

        if let Some(category_id) = self.category_id {
            condition = condition.add(donation_request::Column::CategoryId.eq(category_id));
        }
        if let Some(kind) = self.donation_type {
            condition = condition.add(kind.column().eq(true));
        }
        if let Some(location) = self.location.as_deref().filter(|l| !l.is_empty()) {
            condition = condition.add(ilike_contains(donation_request::Column::Location, location));
        }
        if let Some(urgency) = self.urgency {
            condition = condition.add(donation_request::Column::Urgency.eq(urgency));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            condition = condition.add(
                Condition::any()
                    .add(ilike_contains(donation_request::Column::Title, search))
                    .add(ilike_contains(donation_request::Column::Description, search)),
            );
        }

        condition
    }

    fn apply_order(
        &self,
        query: Select<DonationRequest>,
    ) -> Select<DonationRequest> {
        use donation_request::Column;

        let order = self.order.order();
        let query = match self.sort {
            RequestSort::CreatedAt => query.order_by(Column::CreatedAt, order),
            RequestSort::UpdatedAt => query.order_by(Column::UpdatedAt, order),
            RequestSort::Title => query.order_by(Column::Title, order),
            RequestSort::GoalAmount => query.order_by(Column::GoalAmount, order),
            RequestSort::CurrentAmount => query.order_by(Column::CurrentAmount, order),
            RequestSort::ViewCount => query.order_by(Column::ViewCount, order),
            RequestSort::Supporters => query.order_by(Column::Supporters, order),
            RequestSort::ExpiresAt => query.order_by(Column::ExpiresAt, order),
            // Rank rather than the stored label so HIGH sorts above MEDIUM.
            RequestSort::Urgency => query.order_by(
                Expr::cust("CASE urgency WHEN 'HIGH' THEN 3 WHEN 'MEDIUM' THEN 2 ELSE 1 END"),
                order,
            ),
        };

        query.order_by_desc(Column::Id)
    }
}

/// Donation request repository for database operations.
#[derive(Clone)]
pub struct DonationRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl DonationRequestRepository {
    /// Create a new donation request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<donation_request::Model>> {
        Self::find_by_id_in(self.db.as_ref(), id).await
    }

    /// Find a request by ID on the given connection or transaction.
    pub async fn find_by_id_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
    ) -> AppResult<Option<donation_request::Model>> {
        DonationRequest::find_by_id(id)
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<donation_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::RequestNotFound(id.to_string()))
    }

    /// Find requests by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<donation_request::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        DonationRequest::find()
            .filter(donation_request::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a request on the given connection or transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        model: donation_request::ActiveModel,
    ) -> AppResult<donation_request::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a request.
    pub async fn update(
        &self,
        model: donation_request::ActiveModel,
    ) -> AppResult<donation_request::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a request.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        DonationRequest::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Approved requests matching the filter.
    pub async fn list_public(
        &self,
        filter: &RequestFilter,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation_request::Model>> {
        let query = DonationRequest::find().filter(filter.condition());
        self.paginate(filter.apply_order(query), page, per_page).await
    }

    /// Requests of one organizer in any status, newest first.
    pub async fn list_by_organizer(
        &self,
        organizer_id: &str,
        status: Option<RequestStatus>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation_request::Model>> {
        let mut query =
            DonationRequest::find().filter(donation_request::Column::OrganizerId.eq(organizer_id));
        if let Some(status) = status {
            query = query.filter(donation_request::Column::Status.eq(status));
        }

        let query = query
            .order_by_desc(donation_request::Column::CreatedAt)
            .order_by_desc(donation_request::Column::Id);
        self.paginate(query, page, per_page).await
    }

    /// Every request of one organizer, newest first.
    pub async fn find_all_by_organizer(
        &self,
        organizer_id: &str,
    ) -> AppResult<Vec<donation_request::Model>> {
        DonationRequest::find()
            .filter(donation_request::Column::OrganizerId.eq(organizer_id))
            .order_by_desc(donation_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests in one status, oldest first (moderation queue).
    pub async fn list_by_status(
        &self,
        status: RequestStatus,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation_request::Model>> {
        let query = DonationRequest::find()
            .filter(donation_request::Column::Status.eq(status))
            .order_by_asc(donation_request::Column::CreatedAt)
            .order_by_asc(donation_request::Column::Id);
        self.paginate(query, page, per_page).await
    }

    async fn paginate(
        &self,
        query: Select<DonationRequest>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation_request::Model>> {
        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = query
            .offset(page_offset(page, per_page))
            .limit(per_page)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Paged { items, total })
    }

    /// Increment view count atomically (single UPDATE query, no fetch).
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        DonationRequest::update_many()
            .col_expr(
                donation_request::Column::ViewCount,
                Expr::col(donation_request::Column::ViewCount).add(1),
            )
            .filter(donation_request::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Apply `changes` only while the row is in one of `expected`.
    ///
    /// Returns `false` when the row moved on (or vanished) in the meantime.
    pub async fn update_if_status(
        &self,
        id: &str,
        expected: &[RequestStatus],
        changes: donation_request::ActiveModel,
    ) -> AppResult<bool> {
        let result = DonationRequest::update_many()
            .set(changes)
            .filter(donation_request::Column::Id.eq(id))
            .filter(donation_request::Column::Status.is_in(expected.iter().copied()))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected == 1)
    }

    /// Add a donation's amount to `current_amount`.
    ///
    /// Must run in the transaction that inserted the donation. The update
    /// takes the request's row lock, so concurrent donations to the same
    /// request serialize from here until commit.
    pub async fn add_donation_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        amount: Decimal,
    ) -> AppResult<()> {
        DonationRequest::update_many()
            .col_expr(
                donation_request::Column::CurrentAmount,
                Expr::col(donation_request::Column::CurrentAmount).add(amount),
            )
            .filter(donation_request::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Store a recounted supporter total. Call after [`Self::add_donation_in`].
    pub async fn set_supporters_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
        supporters: i64,
    ) -> AppResult<()> {
        DonationRequest::update_many()
            .col_expr(
                donation_request::Column::Supporters,
                Expr::value(i32::try_from(supporters).unwrap_or(i32::MAX)),
            )
            .filter(donation_request::Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count requests grouped by status, optionally for one organizer.
    pub async fn count_by_status(&self, organizer_id: Option<&str>) -> AppResult<Vec<StatusCount>> {
        let mut query = DonationRequest::find();
        if let Some(organizer_id) = organizer_id {
            query = query.filter(donation_request::Column::OrganizerId.eq(organizer_id));
        }

        query
            .select_only()
            .column(donation_request::Column::Status)
            .column_as(donation_request::Column::Id.count(), "count")
            .group_by(donation_request::Column::Status)
            .into_tuple::<StatusCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::request_model;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
    use std::collections::BTreeMap;

    fn count_row(n: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::from(n))])
    }

    #[test]
    fn test_sort_whitelist() {
        assert_eq!(RequestSort::from_param("goal_amount"), Some(RequestSort::GoalAmount));
        assert_eq!(RequestSort::from_param("urgency"), Some(RequestSort::Urgency));
        assert_eq!(RequestSort::from_param("password_hash"), None);
        assert_eq!(SortOrder::from_param("ASC"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::from_param("sideways"), None);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<donation_request::Model>::new()])
                .into_connection(),
        );

        let repo = DonationRequestRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::RequestNotFound(_))));
    }

    #[tokio::test]
    async fn test_list_public_only_queries_approved() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .append_query_results([[request_model("r1", "org1", RequestStatus::Approved)]])
                .into_connection(),
        );

        let repo = DonationRequestRepository::new(Arc::clone(&db));
        let filter = RequestFilter {
            search: Some("water".to_string()),
            ..RequestFilter::default()
        };
        let page = repo.list_public(&filter, 1, 15).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, "r1");
        drop(repo);

        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        assert_eq!(log.len(), 2);
        for statement in &log {
            let text = format!("{statement:?}");
            assert!(text.contains("APPROVED"));
            assert!(text.contains("ILIKE"));
            assert!(text.contains("%water%"));
        }
    }

    #[test]
    fn test_search_is_case_insensitive_and_escaped() {
        let filter = RequestFilter {
            search: Some("100%_sure".to_string()),
            location: Some("Chiang Mai".to_string()),
            ..RequestFilter::default()
        };
        let statement = DonationRequest::find()
            .filter(filter.condition())
            .build(DatabaseBackend::Postgres);

        assert!(statement.sql.contains(r#""location" ILIKE"#), "{}", statement.sql);
        assert!(statement.sql.contains(r#""title" ILIKE"#), "{}", statement.sql);
        assert!(statement.sql.contains(r#""description" ILIKE"#), "{}", statement.sql);

        let values = statement.values.unwrap().0;
        assert!(values.contains(&sea_orm::Value::from(r"%100\%\_sure%")));
        assert!(values.contains(&sea_orm::Value::from("%Chiang Mai%")));
    }

    #[tokio::test]
    async fn test_update_if_status_reports_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = DonationRequestRepository::new(db);
        let changes = donation_request::ActiveModel {
            status: sea_orm::Set(RequestStatus::Approved),
            ..Default::default()
        };
        let applied = repo
            .update_if_status("r1", &[RequestStatus::Pending], changes)
            .await
            .unwrap();

        assert!(!applied);
    }

    #[tokio::test]
    async fn test_increment_view_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = DonationRequestRepository::new(db);
        assert!(repo.increment_view_count("r1").await.is_ok());
    }
}
