//! Rental requests.
//!
//! A request carries its own lifecycle status independent of the listing's:
//! `Submitted → Approved → InProgress → Completed`, forward only. A submitted
//! request may instead be withdrawn (deleted). `Rejected` exists solely for
//! the configurable sibling policy applied when a competing request is
//! approved; under the default policy it is never produced.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ListingId, RequestId, UserId};

/// Lifecycle status of a rental request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Submitted,
    Approved,
    InProgress,
    Completed,
    Rejected,
}

impl RequestStatus {
    /// Whether a rental is agreed or currently underway.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Approved | Self::InProgress)
    }
}

/// A prospective renter's application against a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalRequest {
    pub id: RequestId,
    pub status: RequestStatus,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub note: String,
    pub requester: UserId,
    pub listing: ListingId,
}

/// Request fields supplied at submission; the store assigns the id and the
/// engine fixes the initial status.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub note: String,
    pub requester: UserId,
    pub listing: ListingId,
}
