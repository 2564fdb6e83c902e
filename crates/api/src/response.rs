//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use givehub_db::repositories::Paged;
use serde::Serialize;

use crate::extractors::PageQuery;

/// Standard API response wrapper: `{ "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a 200 response.
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            status: StatusCode::OK,
        }
    }

    /// Create a 201 response.
    pub const fn created(data: T) -> Self {
        Self {
            data,
            status: StatusCode::CREATED,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Empty success response.
#[must_use]
pub fn no_content() -> impl IntoResponse {
    StatusCode::NO_CONTENT
}

/// One page of a listing with its position in the whole.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T: Serialize> Paginated<T> {
    /// Wrap a repository page fetched with `query`.
    #[must_use]
    pub fn new(page: Paged<T>, query: &PageQuery) -> Self {
        let per_page = query.per_page();
        Self {
            last_page: page.total.div_ceil(per_page).max(1),
            data: page.items,
            current_page: query.page(),
            per_page,
            total: page.total,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page() {
        let query = PageQuery {
            page: Some(2),
            per_page: Some(10),
        };
        let page = Paginated::new(
            Paged {
                items: vec![1, 2, 3],
                total: 23,
            },
            &query,
        );
        assert_eq!(page.last_page, 3);
        assert_eq!(page.current_page, 2);

        let empty = Paginated::new(
            Paged::<i32> {
                items: vec![],
                total: 0,
            },
            &query,
        );
        assert_eq!(empty.last_page, 1);
    }
}
