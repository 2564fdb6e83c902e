//! Fundraising progress derived from a donation request.
//!
//! Every read path (listing, detail, dashboard, donation receipt) goes through
//! [`Progress::of`] so the numbers agree everywhere.

use chrono::{DateTime, Utc};
use givehub_db::entities::donation_request;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Derived fundraising figures of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_amount: Decimal,
    pub goal_amount: Option<Decimal>,
    pub supporters: i32,
    pub progress_percentage: Decimal,
    /// Whole days until expiry, `None` when the request never expires.
    pub days_remaining: Option<i64>,
}

impl Progress {
    /// Progress of `request` as of `now`.
    #[must_use]
    pub fn of(request: &donation_request::Model, now: DateTime<Utc>) -> Self {
        Self {
            current_amount: request.current_amount,
            goal_amount: request.goal_amount,
            supporters: request.supporters,
            progress_percentage: progress_percentage(request.current_amount, request.goal_amount),
            days_remaining: days_remaining(request.expires_at.map(|t| t.with_timezone(&Utc)), now),
        }
    }
}

/// `current / goal × 100` rounded to two places; 0 without a positive goal.
///
/// Not capped: an over-funded request reports more than 100.
#[must_use]
pub fn progress_percentage(current: Decimal, goal: Option<Decimal>) -> Decimal {
    match goal {
        Some(goal) if goal > Decimal::ZERO => (current / goal * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        _ => Decimal::ZERO,
    }
}

/// Whole days left until `expires_at`, never negative.
#[must_use]
pub fn days_remaining(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    expires_at.map(|at| (at - now).num_days().max(0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use givehub_db::{entities::donation_request::RequestStatus, test_utils::request_model};

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_progress_percentage() {
        assert_eq!(progress_percentage(dec(250), Some(dec(1000))), Decimal::new(250, 1));
        assert_eq!(progress_percentage(dec(1000), Some(dec(5000))), dec(20));
        assert_eq!(progress_percentage(dec(1), Some(dec(3))), Decimal::new(3333, 2));
        assert_eq!(progress_percentage(dec(2), Some(dec(3))), Decimal::new(6667, 2));
        assert_eq!(progress_percentage(dec(7500), Some(dec(5000))), dec(150));
    }

    #[test]
    fn test_progress_without_goal() {
        assert_eq!(progress_percentage(dec(500), None), Decimal::ZERO);
        assert_eq!(progress_percentage(dec(500), Some(Decimal::ZERO)), Decimal::ZERO);
        assert_eq!(progress_percentage(dec(500), Some(dec(-10))), Decimal::ZERO);
    }

    #[test]
    fn test_days_remaining() {
        let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();

        assert_eq!(days_remaining(None, now), None);
        assert_eq!(days_remaining(Some(now + Duration::days(10)), now), Some(10));
        assert_eq!(days_remaining(Some(now + Duration::hours(30)), now), Some(1));
        assert_eq!(days_remaining(Some(now - Duration::days(3)), now), Some(0));
    }

    #[test]
    fn test_progress_of_request() {
        let now = Utc::now();
        let mut request = request_model("r1", "org1", RequestStatus::Approved);
        request.current_amount = dec(1000);
        request.supporters = 3;
        request.expires_at = Some((now + Duration::days(5) + Duration::minutes(1)).into());

        let progress = Progress::of(&request, now);

        assert_eq!(progress.progress_percentage, dec(20));
        assert_eq!(progress.supporters, 3);
        assert_eq!(progress.days_remaining, Some(5));
    }

    #[test]
    fn test_progress_serializes_camel_case() {
        let request = request_model("r1", "org1", RequestStatus::Approved);
        let json = serde_json::to_value(Progress::of(&request, Utc::now())).unwrap();

        assert!(json.get("progressPercentage").is_some());
        assert!(json.get("daysRemaining").unwrap().is_null());
    }
}
