//! Driving port for lifecycle mutations.
//!
//! Every operation takes the explicit caller identity and returns the
//! [`Mutation`] describing what changed, which the broadcast layer turns into
//! view pushes. Guard violations, missing entities, and authorization
//! failures reject without mutating anything.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{
    Caller, ComplaintId, DomainResult, FavoriteId, Listing, ListingId, Mutation, RequestId,
};

/// Fields supplied when creating a listing.
#[derive(Debug, Clone)]
pub struct ListingDraft {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
}

/// Fields supplied when submitting a rental request.
#[derive(Debug, Clone)]
pub struct RequestDraft {
    pub listing: ListingId,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub note: String,
}

/// Lifecycle mutations over listings, requests, favorites, and complaints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketplaceCommands: Send + Sync {
    /// Create an item together with its active listing.
    async fn create_listing(
        &self,
        caller: &Caller,
        draft: ListingDraft,
    ) -> DomainResult<(Listing, Mutation)>;

    /// Soft-delete a listing and cascade-delete its favorites. Owner or
    /// administrator only.
    async fn remove_listing(&self, caller: &Caller, listing: ListingId)
        -> DomainResult<Mutation>;

    /// Submit a rental request against an active listing.
    async fn submit_request(&self, caller: &Caller, draft: RequestDraft)
        -> DomainResult<Mutation>;

    /// Withdraw a still-submitted request. Requester only.
    async fn withdraw_request(&self, caller: &Caller, request: RequestId)
        -> DomainResult<Mutation>;

    /// Approve a submitted request, deactivating the listing. Owner only.
    async fn approve_request(
        &self,
        caller: &Caller,
        request: RequestId,
        listing: ListingId,
    ) -> DomainResult<Mutation>;

    /// Move an approved rental into progress. Either party.
    async fn start_rental(&self, caller: &Caller, request: RequestId) -> DomainResult<Mutation>;

    /// Complete an in-progress rental, reactivating the listing. Either party.
    async fn finish_rental(
        &self,
        caller: &Caller,
        request: RequestId,
        listing: ListingId,
    ) -> DomainResult<Mutation>;

    /// Bookmark a listing.
    async fn add_favorite(&self, caller: &Caller, listing: ListingId) -> DomainResult<Mutation>;

    /// Delete one of the caller's own bookmarks.
    async fn remove_favorite(
        &self,
        caller: &Caller,
        favorite: FavoriteId,
    ) -> DomainResult<Mutation>;

    /// File a complaint against any existing request.
    async fn file_complaint(
        &self,
        caller: &Caller,
        request: RequestId,
        description: String,
    ) -> DomainResult<Mutation>;

    /// Close an under-review complaint. Administrator only.
    async fn resolve_complaint(
        &self,
        caller: &Caller,
        complaint: ComplaintId,
    ) -> DomainResult<Mutation>;
}
