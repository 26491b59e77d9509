//! Rental lifecycle engine.
//!
//! Enforces the state machine over listings and rental requests together
//! with the side effects on favorites and complaints:
//!
//! - Listing: `Active ↔ Inactive` cycles, `Active/Inactive → Removed`
//!   (terminal).
//! - Request: `Submitted → Approved → InProgress → Completed`, or
//!   `Submitted → withdrawn` (deleted), or `Submitted → Rejected` under the
//!   auto-reject sibling policy.
//!
//! Each transition is applied through the store's conditional updates, so a
//! guard checked here is re-checked under the store's transaction boundary
//! before it commits. Paired updates (approve, finish) go through a single
//! store call that applies both rows or neither.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    ListingDraft, ListingTransition, MarketStore, MarketplaceCommands, RequestDraft,
    RequestTransition, StoreError,
};
use crate::domain::{
    Caller, ComplaintId, ComplaintStatus, DomainResult, EntityKind, Error, FavoriteId, Listing,
    ListingId, ListingStatus, Mutation, NewComplaint, NewItem, NewRequest, RentalRequest,
    RequestId, RequestStatus,
};

/// What happens to the other still-submitted requests against a listing when
/// one of them is approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingPolicy {
    /// Leave them submitted (the historical behavior); they stay visible but
    /// cannot be approved while the listing is inactive.
    #[default]
    Retain,
    /// Transition them to rejected so they disappear from the request views.
    AutoReject,
}

impl FromStr for SiblingPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "retain" => Ok(Self::Retain),
            "auto-reject" => Ok(Self::AutoReject),
            other => Err(format!(
                "unknown sibling policy {other:?}; expected \"retain\" or \"auto-reject\""
            )),
        }
    }
}

/// Lifecycle engine over a [`MarketStore`].
pub struct LifecycleEngine<S> {
    store: Arc<S>,
    sibling_policy: SiblingPolicy,
}

impl<S> LifecycleEngine<S> {
    pub fn new(store: Arc<S>, sibling_policy: SiblingPolicy) -> Self {
        Self {
            store,
            sibling_policy,
        }
    }
}

fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::NotFound { entity, id } => Error::not_found(entity, id),
        // The expected status no longer held at commit time; the guard that
        // passed on read was violated by a competing transition.
        StoreError::Precondition { message } => Error::guard(message),
        StoreError::Conflict { message } => Error::guard(message),
        StoreError::Backend { message } => Error::persistence(message),
    }
}

impl<S: MarketStore> LifecycleEngine<S> {
    async fn fetch_listing(&self, id: ListingId) -> DomainResult<Listing> {
        self.store
            .listing(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("listing", id.value()))
    }

    async fn fetch_request(&self, id: RequestId) -> DomainResult<RentalRequest> {
        self.store
            .request(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("request", id.value()))
    }

    /// Fetch a request and its listing, checking that the client-supplied
    /// listing id actually matches the request.
    async fn fetch_pair(
        &self,
        request_id: RequestId,
        listing_id: ListingId,
    ) -> DomainResult<(RentalRequest, Listing)> {
        let request = self.fetch_request(request_id).await?;
        if request.listing != listing_id {
            return Err(Error::invalid_request(format!(
                "request {request_id} does not belong to listing {listing_id}"
            )));
        }
        let listing = self.fetch_listing(listing_id).await?;
        Ok((request, listing))
    }

    fn ensure_party(caller: &Caller, request: &RentalRequest, listing: &Listing) -> DomainResult<()> {
        if caller.id == request.requester || caller.id == listing.owner {
            Ok(())
        } else {
            Err(Error::forbidden(
                "only the requester or the listing owner may act on this rental",
            ))
        }
    }

    /// Best-effort rejection of the other submitted requests against a
    /// listing after one was approved. Failures are logged, never surfaced:
    /// a sibling withdrawn concurrently is simply gone.
    async fn reject_siblings(&self, listing: ListingId, approved: RequestId) {
        let siblings = match self.store.requests_by_listing(listing).await {
            Ok(rows) => rows,
            Err(error) => {
                warn!(%listing, error = %error, "failed to enumerate sibling requests");
                return;
            }
        };
        for sibling in siblings {
            if sibling.id == approved || sibling.status != RequestStatus::Submitted {
                continue;
            }
            if let Err(error) = self
                .store
                .transition_request(sibling.id, RequestStatus::Submitted, RequestStatus::Rejected)
                .await
            {
                warn!(request = %sibling.id, error = %error, "failed to auto-reject sibling request");
            } else {
                info!(request = %sibling.id, %listing, "auto-rejected sibling request");
            }
        }
    }
}

#[async_trait]
impl<S: MarketStore> MarketplaceCommands for LifecycleEngine<S> {
    async fn create_listing(
        &self,
        caller: &Caller,
        draft: ListingDraft,
    ) -> DomainResult<(Listing, Mutation)> {
        if draft.rent_price < 0 {
            return Err(Error::invalid_request("rent price must not be negative"));
        }
        let item = NewItem {
            name: draft.name,
            category: draft.category,
            description: draft.description,
            rent_price: draft.rent_price,
            image_url: draft.image_url,
        };
        let (_, listing) = self
            .store
            .insert_listing(item, caller.id)
            .await
            .map_err(map_store_error)?;
        info!(listing = %listing.id, owner = %caller.id, "listing created");
        Ok((listing, Mutation::of([EntityKind::Item, EntityKind::Listing])))
    }

    async fn remove_listing(&self, caller: &Caller, listing: ListingId) -> DomainResult<Mutation> {
        let row = self.fetch_listing(listing).await?;
        if row.owner != caller.id && !caller.is_administrator() {
            return Err(Error::forbidden(
                "only the listing owner or an administrator may remove a listing",
            ));
        }
        if row.status == ListingStatus::Removed {
            return Err(Error::guard("listing is already removed"));
        }
        self.store
            .remove_listing(listing)
            .await
            .map_err(map_store_error)?;
        info!(%listing, "listing removed; favorites cascade-deleted");
        Ok(Mutation::of([EntityKind::Listing, EntityKind::Favorite]))
    }

    async fn submit_request(&self, caller: &Caller, draft: RequestDraft) -> DomainResult<Mutation> {
        let listing = self.fetch_listing(draft.listing).await?;
        if listing.status != ListingStatus::Active {
            return Err(Error::guard("listing is not active"));
        }
        self.store
            .insert_request(NewRequest {
                starts_on: draft.starts_on,
                ends_on: draft.ends_on,
                note: draft.note,
                requester: caller.id,
                listing: draft.listing,
            })
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Request]))
    }

    async fn withdraw_request(&self, caller: &Caller, request: RequestId) -> DomainResult<Mutation> {
        let row = self.fetch_request(request).await?;
        if row.requester != caller.id {
            return Err(Error::forbidden("only the requester may withdraw a request"));
        }
        if row.status != RequestStatus::Submitted {
            return Err(Error::guard("only a submitted request can be withdrawn"));
        }
        self.store
            .delete_request(request, RequestStatus::Submitted)
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Request]))
    }

    async fn approve_request(
        &self,
        caller: &Caller,
        request: RequestId,
        listing: ListingId,
    ) -> DomainResult<Mutation> {
        let (row, listing_row) = self.fetch_pair(request, listing).await?;
        if listing_row.owner != caller.id {
            return Err(Error::forbidden("only the listing owner may approve a request"));
        }
        if row.status != RequestStatus::Submitted {
            return Err(Error::guard("request is not submitted"));
        }
        if listing_row.status != ListingStatus::Active {
            return Err(Error::guard("listing is not active"));
        }
        self.store
            .transition_request_and_listing(
                RequestTransition {
                    id: request,
                    expected: RequestStatus::Submitted,
                    next: RequestStatus::Approved,
                },
                ListingTransition {
                    id: listing,
                    expected: ListingStatus::Active,
                    next: ListingStatus::Inactive,
                },
            )
            .await
            .map_err(map_store_error)?;
        if self.sibling_policy == SiblingPolicy::AutoReject {
            self.reject_siblings(listing, request).await;
        }
        Ok(Mutation::of([EntityKind::Request, EntityKind::Listing]))
    }

    async fn start_rental(&self, caller: &Caller, request: RequestId) -> DomainResult<Mutation> {
        let row = self.fetch_request(request).await?;
        let listing = self.fetch_listing(row.listing).await?;
        Self::ensure_party(caller, &row, &listing)?;
        if row.status != RequestStatus::Approved {
            return Err(Error::guard("request is not approved"));
        }
        self.store
            .transition_request(request, RequestStatus::Approved, RequestStatus::InProgress)
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Request]))
    }

    async fn finish_rental(
        &self,
        caller: &Caller,
        request: RequestId,
        listing: ListingId,
    ) -> DomainResult<Mutation> {
        let (row, listing_row) = self.fetch_pair(request, listing).await?;
        Self::ensure_party(caller, &row, &listing_row)?;
        if row.status != RequestStatus::InProgress {
            return Err(Error::guard("request is not in progress"));
        }
        // A removed listing stays removed; only the request completes.
        if listing_row.status == ListingStatus::Removed {
            self.store
                .transition_request(request, RequestStatus::InProgress, RequestStatus::Completed)
                .await
                .map_err(map_store_error)?;
            return Ok(Mutation::of([EntityKind::Request]));
        }
        self.store
            .transition_request_and_listing(
                RequestTransition {
                    id: request,
                    expected: RequestStatus::InProgress,
                    next: RequestStatus::Completed,
                },
                ListingTransition {
                    id: listing,
                    expected: ListingStatus::Inactive,
                    next: ListingStatus::Active,
                },
            )
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Request, EntityKind::Listing]))
    }

    async fn add_favorite(&self, caller: &Caller, listing: ListingId) -> DomainResult<Mutation> {
        let row = self.fetch_listing(listing).await?;
        if row.status == ListingStatus::Removed {
            return Err(Error::guard("listing is removed"));
        }
        self.store
            .insert_favorite(caller.id, listing)
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Favorite]))
    }

    async fn remove_favorite(&self, caller: &Caller, favorite: FavoriteId) -> DomainResult<Mutation> {
        let row = self
            .store
            .favorite(favorite)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("favorite", favorite.value()))?;
        if row.user != caller.id {
            return Err(Error::forbidden("only the owner may delete a favorite"));
        }
        self.store
            .delete_favorite(favorite)
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Favorite]))
    }

    async fn file_complaint(
        &self,
        caller: &Caller,
        request: RequestId,
        description: String,
    ) -> DomainResult<Mutation> {
        // Any authenticated user may file against any request, whatever its
        // current status.
        self.fetch_request(request).await?;
        self.store
            .insert_complaint(NewComplaint {
                request,
                filer: caller.id,
                description,
            })
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Complaint]))
    }

    async fn resolve_complaint(
        &self,
        caller: &Caller,
        complaint: ComplaintId,
    ) -> DomainResult<Mutation> {
        // Role check comes before any persistence access.
        if !caller.is_administrator() {
            return Err(Error::forbidden("only an administrator may resolve a complaint"));
        }
        self.store
            .transition_complaint(
                complaint,
                ComplaintStatus::UnderReview,
                ComplaintStatus::Closed,
            )
            .await
            .map_err(map_store_error)?;
        Ok(Mutation::of([EntityKind::Complaint]))
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
