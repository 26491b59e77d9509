//! Complaints filed against rental requests.
//!
//! Append-only apart from the single monotonic status transition
//! `UnderReview → Closed`, performed by an administrator.

use serde::{Deserialize, Serialize};

use crate::domain::ids::{ComplaintId, RequestId, UserId};

/// Review status of a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    UnderReview,
    Closed,
}

/// A complaint filed against a rental request.
#[derive(Debug, Clone, PartialEq)]
pub struct Complaint {
    pub id: ComplaintId,
    pub status: ComplaintStatus,
    pub request: RequestId,
    pub filer: UserId,
    pub description: String,
}

/// Complaint fields supplied at filing; the store assigns the id and the
/// engine fixes the initial status.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub request: RequestId,
    pub filer: UserId,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::UnderReview).expect("serializes"),
            "\"under_review\""
        );
    }
}
