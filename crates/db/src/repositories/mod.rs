//! Database repositories.

mod category;
mod donation;
mod donation_request;
mod organization;
mod story;
mod user;

pub use category::CategoryRepository;
pub use donation::{DonationRepository, DonationTotals};
pub use donation_request::{
    DonationRequestRepository, RequestFilter, RequestSort, SortOrder, StatusCount,
};
pub use organization::OrganizationRepository;
pub use story::StoryRepository;
pub use user::{RoleCount, UserRepository};

/// One page of rows plus the total row count across all pages.
#[derive(Debug, Clone)]
pub struct Paged<T> {
    /// Rows on the requested page.
    pub items: Vec<T>,
    /// Rows matching the query across every page.
    pub total: u64,
}

impl<T> Paged<T> {
    /// Convert the rows, keeping the total.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paged<U> {
        Paged {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }
}

/// Row offset of a 1-based page.
#[must_use]
pub const fn page_offset(page: u64, per_page: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(1, 15), 0);
        assert_eq!(page_offset(3, 15), 30);
        assert_eq!(page_offset(0, 15), 0);
    }
}
