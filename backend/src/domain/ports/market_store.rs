//! Port for the persistence collaborator.
//!
//! The [`MarketStore`] trait is the transactional CRUD boundary the lifecycle
//! engine and the view assembler depend on. Every method is a single
//! transaction: the conditional transitions re-check their `expected` status
//! under the store's transaction boundary and fail with
//! [`StoreError::Precondition`] when the guard no longer holds at commit
//! time, closing the read-then-write race on competing transitions.

use async_trait::async_trait;

use crate::domain::{
    Complaint, ComplaintId, ComplaintStatus, Favorite, FavoriteId, Item, ItemId, Listing,
    ListingId, ListingStatus, NewComplaint, NewItem, NewRequest, NewUser, RentalRequest,
    RequestId, RequestStatus, User, UserId,
};

/// Errors raised by store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i64 },
    /// A conditional update found a status other than the expected one.
    #[error("precondition failed: {message}")]
    Precondition { message: String },
    /// A uniqueness constraint was violated.
    #[error("conflict: {message}")]
    Conflict { message: String },
    /// The backing store failed; the transaction was rolled back.
    #[error("store backend failure: {message}")]
    Backend { message: String },
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Conditional status update for a rental request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTransition {
    pub id: RequestId,
    pub expected: RequestStatus,
    pub next: RequestStatus,
}

/// Conditional status update for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingTransition {
    pub id: ListingId,
    pub expected: ListingStatus,
    pub next: ListingStatus,
}

/// Transactional CRUD port over the five entity tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketStore: Send + Sync {
    // Users.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;
    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    // Items and listings. A listing is created with its item in one
    // transaction and defaults to active.
    async fn insert_listing(&self, item: NewItem, owner: UserId)
        -> Result<(Item, Listing), StoreError>;
    async fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError>;
    async fn listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError>;
    async fn listings_by_status(&self, status: ListingStatus)
        -> Result<Vec<Listing>, StoreError>;
    async fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, StoreError>;
    /// Mark the listing removed and delete every favorite referencing it, in
    /// one transaction.
    async fn remove_listing(&self, id: ListingId) -> Result<(), StoreError>;

    // Rental requests.
    async fn insert_request(&self, request: NewRequest) -> Result<RentalRequest, StoreError>;
    async fn request(&self, id: RequestId) -> Result<Option<RentalRequest>, StoreError>;
    async fn requests_by_requester(&self, user: UserId)
        -> Result<Vec<RentalRequest>, StoreError>;
    async fn requests_by_listing(&self, listing: ListingId)
        -> Result<Vec<RentalRequest>, StoreError>;
    /// Compare-and-swap on the request status.
    async fn transition_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<(), StoreError>;
    /// Paired compare-and-swap over a request and its listing. Applies both
    /// updates or neither.
    async fn transition_request_and_listing(
        &self,
        request: RequestTransition,
        listing: ListingTransition,
    ) -> Result<(), StoreError>;
    /// Delete the request if it still holds the expected status.
    async fn delete_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
    ) -> Result<(), StoreError>;

    // Favorites.
    async fn insert_favorite(
        &self,
        user: UserId,
        listing: ListingId,
    ) -> Result<Favorite, StoreError>;
    async fn favorite(&self, id: FavoriteId) -> Result<Option<Favorite>, StoreError>;
    async fn favorites_by_user(&self, user: UserId) -> Result<Vec<Favorite>, StoreError>;
    async fn delete_favorite(&self, id: FavoriteId) -> Result<(), StoreError>;

    // Complaints.
    async fn insert_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError>;
    async fn complaint(&self, id: ComplaintId) -> Result<Option<Complaint>, StoreError>;
    async fn complaints(&self) -> Result<Vec<Complaint>, StoreError>;
    async fn complaints_by_filer(&self, user: UserId) -> Result<Vec<Complaint>, StoreError>;
    /// Compare-and-swap on the complaint status.
    async fn transition_complaint(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        next: ComplaintStatus,
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::StoreError;

    #[test]
    fn errors_render_their_context() {
        assert_eq!(
            StoreError::not_found("listing", 7).to_string(),
            "listing 7 not found"
        );
        assert_eq!(
            StoreError::precondition("request 3 is approved, expected submitted").to_string(),
            "precondition failed: request 3 is approved, expected submitted"
        );
        assert_eq!(
            StoreError::backend("store lock poisoned").to_string(),
            "store backend failure: store lock poisoned"
        );
    }
}
