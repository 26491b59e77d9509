//! Driving port for the read views and their row DTOs.
//!
//! Each view is a pure function of current store state, recomputed in full on
//! every call and ordered by the primary entity's identifier descending.
//! Rows serialize with camelCase field names; dates serialize as ISO strings.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    Caller, ComplaintId, ComplaintStatus, DomainResult, FavoriteId, ItemId, ListingId,
    ListingStatus, RequestId, RequestStatus, UserId,
};

/// Catalog row: an active listing joined with its item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRow {
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
}

/// My-listings row: one of the caller's own listings with its status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingRow {
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub status: ListingStatus,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
}

/// Favorites row: a bookmark joined with its active listing and item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRow {
    pub favorite_id: FavoriteId,
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
}

/// Contact card for the counterparty of a rental.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyRow {
    pub user_id: UserId,
    pub username: String,
    pub phone: String,
    pub email: String,
}

/// Request row shared by the outgoing/incoming/rental/letting/history views.
///
/// `party` carries the counterparty contact where the view includes one: the
/// requester for owner-side views, the owner for renter-side views, absent
/// for the outgoing view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRow {
    pub request_id: RequestId,
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub note: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<PartyRow>,
}

/// Complaint row joining the complaint, its request, listing, item, and filer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintRow {
    pub complaint_id: ComplaintId,
    pub request_id: RequestId,
    pub listing_id: ListingId,
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub note: String,
    pub request_status: RequestStatus,
    pub complaint_status: ComplaintStatus,
    pub complaint_description: String,
    pub filer: PartyRow,
}

/// The read views clients consume.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceViews: Send + Sync {
    /// Active listings. Public.
    async fn catalog(&self) -> DomainResult<Vec<CatalogRow>>;
    /// The caller's own non-removed listings.
    async fn my_listings(&self, caller: &Caller) -> DomainResult<Vec<ListingRow>>;
    /// The caller's favorites over active listings.
    async fn favorites(&self, caller: &Caller) -> DomainResult<Vec<FavoriteRow>>;
    /// Submitted requests the caller has made.
    async fn outgoing(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// Submitted requests against the caller's listings.
    async fn incoming(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// Approved or in-progress rentals, caller as renter.
    async fn rentals(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// Approved or in-progress rentals, caller as owner.
    async fn lettings(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// Completed rentals, caller as renter.
    async fn rental_history(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// Completed rentals, caller as owner.
    async fn letting_history(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>>;
    /// All complaints. Any authenticated caller.
    async fn complaints(&self, caller: &Caller) -> DomainResult<Vec<ComplaintRow>>;
    /// Complaints filed by the caller.
    async fn my_complaints(&self, caller: &Caller) -> DomainResult<Vec<ComplaintRow>>;
}
