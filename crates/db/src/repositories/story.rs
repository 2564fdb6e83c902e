//! Story repository.

use std::sync::Arc;

use crate::entities::{
    Story,
    story::{self, StoryStatus, StoryType},
};
use crate::repositories::{Paged, page_offset};
use givehub_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, sea_query::Expr,
};

/// Story repository for database operations.
#[derive(Clone)]
pub struct StoryRepository {
    db: Arc<DatabaseConnection>,
}

impl StoryRepository {
    /// Create a new story repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a story by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<story::Model>> {
        Story::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a story by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<story::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::StoryNotFound(id.to_string()))
    }

    /// Find a published story by ID.
    pub async fn find_published(&self, id: &str) -> AppResult<Option<story::Model>> {
        Story::find_by_id(id)
            .filter(story::Column::Status.eq(StoryStatus::Published))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a story on the given connection or transaction.
    pub async fn create_in<C: ConnectionTrait>(
        conn: &C,
        model: story::ActiveModel,
    ) -> AppResult<story::Model> {
        model
            .insert(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a story on the given connection or transaction.
    pub async fn update_in<C: ConnectionTrait>(
        conn: &C,
        model: story::ActiveModel,
    ) -> AppResult<story::Model> {
        model
            .update(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a story.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Story::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment the view counter and return the new value.
    ///
    /// Returns `None` when no published story has this ID.
    pub async fn increment_views(&self, id: &str) -> AppResult<Option<i32>> {
        let result = Story::update_many()
            .col_expr(story::Column::Views, Expr::col(story::Column::Views).add(1))
            .filter(story::Column::Id.eq(id))
            .filter(story::Column::Status.eq(StoryStatus::Published))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Story::find_by_id(id)
            .select_only()
            .column(story::Column::Views)
            .into_tuple::<i32>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Published stories, newest first, optionally for one request.
    pub async fn list_published(
        &self,
        donation_request_id: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<story::Model>> {
        let mut query = Story::find().filter(story::Column::Status.eq(StoryStatus::Published));
        if let Some(request_id) = donation_request_id {
            query = query.filter(story::Column::DonationRequestId.eq(request_id));
        }

        let query = query
            .order_by_desc(story::Column::PublishedAt)
            .order_by_desc(story::Column::Id);
        self.paginate(query, page, per_page).await
    }

    /// Latest published stories of a request.
    pub async fn find_published_by_request(
        &self,
        donation_request_id: &str,
        limit: u64,
    ) -> AppResult<Vec<story::Model>> {
        Story::find()
            .filter(story::Column::DonationRequestId.eq(donation_request_id))
            .filter(story::Column::Status.eq(StoryStatus::Published))
            .order_by_desc(story::Column::PublishedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Stories written by an author in any status, newest first.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<story::Model>> {
        let query = Story::find()
            .filter(story::Column::AuthorId.eq(author_id))
            .order_by_desc(story::Column::CreatedAt)
            .order_by_desc(story::Column::Id);
        self.paginate(query, page, per_page).await
    }

    /// Every story of an author, newest first.
    pub async fn find_all_by_author(&self, author_id: &str) -> AppResult<Vec<story::Model>> {
        Story::find()
            .filter(story::Column::AuthorId.eq(author_id))
            .order_by_desc(story::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// View counts of an author's published stories of one type.
    pub async fn find_published_views(
        &self,
        author_id: &str,
        story_type: StoryType,
    ) -> AppResult<Vec<i32>> {
        Story::find()
            .filter(story::Column::AuthorId.eq(author_id))
            .filter(story::Column::StoryType.eq(story_type))
            .filter(story::Column::Status.eq(StoryStatus::Published))
            .select_only()
            .column(story::Column::Views)
            .into_tuple::<i32>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count every story on the platform.
    pub async fn count_all(&self) -> AppResult<u64> {
        Story::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn paginate(
        &self,
        query: Select<Story>,
        page: u64,
        per_page: u64,
    ) -> AppResult<Paged<story::Model>> {
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
}
