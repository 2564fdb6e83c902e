//! Donation request status machine.
//!
//! ```text
//! DRAFT ──submit──▶ PENDING ──approve──▶ APPROVED
//!                     │  ▲
//!                  reject └──submit── REJECTED
//! ```

use givehub_common::{AppError, AppResult};
use givehub_db::entities::donation_request::RequestStatus;

/// A status change requested by an organizer or an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Organizer sends a draft or a rejected request for review.
    Submit,
    /// Admin accepts a pending request.
    Approve,
    /// Admin turns down a pending request.
    Reject,
}

impl Transition {
    /// Statuses this transition may start from.
    #[must_use]
    pub const fn sources(self) -> &'static [RequestStatus] {
        match self {
            Self::Submit => &[RequestStatus::Draft, RequestStatus::Rejected],
            Self::Approve | Self::Reject => &[RequestStatus::Pending],
        }
    }

    const fn verb(self) -> &'static str {
        match self {
            Self::Submit => "submitted",
            Self::Approve => "approved",
            Self::Reject => "rejected",
        }
    }
}

/// Status reached by applying `transition` to `from`.
pub fn next_status(from: RequestStatus, transition: Transition) -> AppResult<RequestStatus> {
    use RequestStatus::{Approved, Draft, Pending, Rejected};

    match (from, transition) {
        (Draft | Rejected, Transition::Submit) => Ok(Pending),
        (Pending, Transition::Approve) => Ok(Approved),
        (Pending, Transition::Reject) => Ok(Rejected),
        (Draft | Pending | Approved | Rejected, _) => Err(AppError::InvalidState(format!(
            "Request is {} and cannot be {}",
            status_label(from),
            transition.verb()
        ))),
    }
}

/// Whether the organizer may still edit the request.
#[must_use]
pub const fn is_editable(status: RequestStatus) -> bool {
    matches!(status, RequestStatus::Draft | RequestStatus::Rejected)
}

/// Whether the organizer may delete the request.
#[must_use]
pub const fn is_deletable(status: RequestStatus) -> bool {
    matches!(status, RequestStatus::Draft)
}

/// Wire name of a status, as stored and serialized.
#[must_use]
pub const fn status_code(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Draft => "DRAFT",
        RequestStatus::Pending => "PENDING",
        RequestStatus::Approved => "APPROVED",
        RequestStatus::Rejected => "REJECTED",
    }
}

/// Lowercase status name for messages.
#[must_use]
pub const fn status_label(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Draft => "draft",
        RequestStatus::Pending => "pending",
        RequestStatus::Approved => "approved",
        RequestStatus::Rejected => "rejected",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_legal_transitions() {
        assert_eq!(
            next_status(RequestStatus::Draft, Transition::Submit).unwrap(),
            RequestStatus::Pending
        );
        assert_eq!(
            next_status(RequestStatus::Rejected, Transition::Submit).unwrap(),
            RequestStatus::Pending
        );
        assert_eq!(
            next_status(RequestStatus::Pending, Transition::Approve).unwrap(),
            RequestStatus::Approved
        );
        assert_eq!(
            next_status(RequestStatus::Pending, Transition::Reject).unwrap(),
            RequestStatus::Rejected
        );
    }

    #[test]
    fn test_sources_match_transition_table() {
        for transition in [Transition::Submit, Transition::Approve, Transition::Reject] {
            for status in RequestStatus::iter() {
                assert_eq!(
                    next_status(status, transition).is_ok(),
                    transition.sources().contains(&status),
                    "{status:?} / {transition:?}"
                );
            }
        }
    }

    #[test]
    fn test_approved_is_terminal() {
        let err = next_status(RequestStatus::Approved, Transition::Reject).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(err.to_string(), "Request is approved and cannot be rejected");
    }

    #[test]
    fn test_edit_and_delete_gates() {
        assert!(is_editable(RequestStatus::Draft));
        assert!(is_editable(RequestStatus::Rejected));
        assert!(!is_editable(RequestStatus::Pending));
        assert!(!is_editable(RequestStatus::Approved));

        assert!(is_deletable(RequestStatus::Draft));
        assert!(!is_deletable(RequestStatus::Rejected));
    }
}
