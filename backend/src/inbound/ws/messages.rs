//! Wire-level message definitions for the WebSocket adapter.
//!
//! Frames are JSON objects `{"event": <name>, "data": <payload>}` in both
//! directions. Event names are part of the public contract and stay
//! snake_case; payload fields are camelCase like the REST DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{CatalogRow, ComplaintRow, FavoriteRow, ListingRow, RequestRow};
use crate::domain::{ComplaintId, Error, ErrorCode, FavoriteId, ListingId, RequestId};
use chrono::NaiveDate;

/// Payload of `add_rent_in`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentInPayload {
    pub listing_id: ListingId,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    #[serde(default)]
    pub note: String,
}

/// Payload of `approve` and `rent_finish`: both sides of the paired
/// transition, so the server can verify they belong together.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairPayload {
    pub request_id: RequestId,
    pub listing_id: ListingId,
}

/// Payload of `add_complaint`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPayload {
    pub request_id: RequestId,
    pub description: String,
}

/// Inbound events a client may send.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    ReloadCatalog,
    ReloadMyRentOut,
    ReloadBag,
    ReloadOutgoing,
    ReloadIncoming,
    ReloadIrent,
    ReloadNotirent,
    ReloadIrentHistory,
    ReloadNotirentHistory,
    ReloadComplaint,
    ReloadMyComplaint,
    AddBag(ListingId),
    DelBag(FavoriteId),
    AddRentIn(RentInPayload),
    DelRentIn(RequestId),
    Approve(PairPayload),
    RentStart(RequestId),
    RentFinish(PairPayload),
    DelRentOut(ListingId),
    AddComplaint(ComplaintPayload),
    Resolved(ComplaintId),
}

/// Error frame payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&Error> for ErrorPayload {
    fn from(error: &Error) -> Self {
        Self {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Outbound events pushed to clients. Each view event carries the full,
/// freshly recomputed row array for that view.
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Catalog(Vec<CatalogRow>),
    MyRentOut(Vec<ListingRow>),
    Bag(Vec<FavoriteRow>),
    Outgoing(Vec<RequestRow>),
    Incoming(Vec<RequestRow>),
    Irent(Vec<RequestRow>),
    Notirent(Vec<RequestRow>),
    IrentHistory(Vec<RequestRow>),
    NotirentHistory(Vec<RequestRow>),
    Complaint(Vec<ComplaintRow>),
    MyComplaint(Vec<ComplaintRow>),
    Error(ErrorPayload),
}

impl ServerEvent {
    pub fn error(error: &Error) -> Self {
        Self::Error(ErrorPayload::from(error))
    }
}
