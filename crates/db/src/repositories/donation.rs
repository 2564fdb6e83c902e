//! Donation repository.

use std::sync::Arc;

use crate::entities::{Donation, donation, donation_request};
use crate::repositories::{Paged, page_offset};
use givehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select, prelude::Decimal, sea_query::Expr,
};

/// Sum and number of donations over some scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromQueryResult)]
pub struct DonationTotals {
    pub total: Option<Decimal>,
    pub count: i64,
    pub supporters: i64,
}

impl DonationTotals {
    /// Summed amount, zero when there are no donations.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.total.unwrap_or(Decimal::ZERO)
    }
}

/// Donation repository for database operations.
///
/// The ledger is append-only; there is no update or delete.
#[derive(Clone)]
pub struct DonationRepository {
    db: Arc<DatabaseConnection>,
}

impl DonationRepository {
    /// Create a new donation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a donation on the given connection or transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        model: donation::ActiveModel,
    ) -> AppResult<donation::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count distinct donors of a request on the given connection or transaction.
    pub async fn count_supporters_in<C: ConnectionTrait>(
        conn: &C,
        donation_request_id: &str,
    ) -> AppResult<i64> {
        let count = Donation::find()
            .filter(donation::Column::DonationRequestId.eq(donation_request_id))
            .select_only()
            .column_as(Expr::cust("COUNT(DISTINCT donor_id)"), "count")
            .into_tuple::<i64>()
            .one(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count.unwrap_or(0))
    }

    /// Donations to a request, newest first.
    pub async fn list_by_request(
        &self,
        donation_request_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation::Model>> {
        let query = Donation::find()
            .filter(donation::Column::DonationRequestId.eq(donation_request_id));
        self.paginate(query, page, per_page).await
    }

    /// Latest donations to a request.
    pub async fn find_recent_by_request(
        &self,
        donation_request_id: &str,
        limit: u64,
    ) -> AppResult<Vec<donation::Model>> {
        Donation::find()
            .filter(donation::Column::DonationRequestId.eq(donation_request_id))
            .order_by_desc(donation::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Donations made by a donor, newest first.
    pub async fn list_by_donor(
        &self,
        donor_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation::Model>> {
        let query = Donation::find().filter(donation::Column::DonorId.eq(donor_id));
        self.paginate(query, page, per_page).await
    }

    async fn paginate(
        &self,
        query: Select<Donation>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<donation::Model>> {
        let total = query
            .clone()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = query
            .order_by_desc(donation::Column::CreatedAt)
            .order_by_desc(donation::Column::Id)
            .offset(page_offset(page, per_page))
            .limit(per_page)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Paged { items, total })
    }

    /// Totals across every request of one organizer.
    pub async fn totals_for_organizer(&self, organizer_id: &str) -> AppResult<DonationTotals> {
        let query = Donation::find()
            .join(JoinType::InnerJoin, donation::Relation::DonationRequest.def())
            .filter(donation_request::Column::OrganizerId.eq(organizer_id));
        self.totals(query).await
    }

    /// Totals across the whole platform.
    pub async fn totals_all(&self) -> AppResult<DonationTotals> {
        self.totals(Donation::find()).await
    }

    async fn totals(&self, query: Select<Donation>) -> AppResult<DonationTotals> {
        let totals = query
            .select_only()
            .column_as(donation::Column::Amount.sum(), "total")
            .column_as(donation::Column::Id.count(), "count")
            .column_as(
                Expr::cust("COUNT(DISTINCT \"donation\".\"donor_id\")"),
                "supporters",
            )
            .into_model::<DonationTotals>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(totals.unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::donation_model;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_count_supporters() {
        let row = BTreeMap::from([("count", Value::from(3i64))]);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[row]])
            .into_connection();

        let count = DonationRepository::count_supporters_in(&db, "r1").await.unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_totals_for_organizer() {
        let row = BTreeMap::from([
            ("total", Value::from(Decimal::new(150_000, 2))),
            ("count", Value::from(4i64)),
            ("supporters", Value::from(2i64)),
        ]);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row]])
                .into_connection(),
        );

        let repo = DonationRepository::new(db);
        let totals = repo.totals_for_organizer("org1").await.unwrap();

        assert_eq!(totals.amount(), Decimal::new(1500, 0));
        assert_eq!(totals.count, 4);
        assert_eq!(totals.supporters, 2);
    }

    #[tokio::test]
    async fn test_list_by_donor() {
        let count_row = BTreeMap::from([("num_items", Value::from(1i64))]);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row]])
                .append_query_results([[donation_model("d1", "r1", "donor1", 500)]])
                .into_connection(),
        );

        let repo = DonationRepository::new(db);
        let page = repo.list_by_donor("donor1", 1, 15).await.unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].amount, Decimal::new(500, 0));
    }
}
