//! Read-view assembler.
//!
//! Joins the five entity tables into the denormalized projections clients
//! consume. Every view is a pure function of current store state, recomputed
//! in full per call; no caching or incremental materialization. Rows are
//! ordered by the primary entity's identifier descending, newest first.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{
    CatalogRow, ComplaintRow, FavoriteRow, ListingRow, MarketStore, MarketplaceViews, PartyRow,
    RequestRow, StoreError,
};
use crate::domain::{
    Caller, Complaint, DomainResult, Error, Item, Listing, ListingId, ListingStatus,
    RentalRequest, RequestStatus, User, UserId,
};

/// Which counterparty a request view exposes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Party {
    None,
    Requester,
    Owner,
}

/// View assembler over a [`MarketStore`].
pub struct ViewAssembler<S> {
    store: Arc<S>,
}

impl<S> ViewAssembler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn map_store_error(error: StoreError) -> Error {
    match error {
        StoreError::NotFound { entity, id } => Error::not_found(entity, id),
        StoreError::Precondition { message }
        | StoreError::Conflict { message }
        | StoreError::Backend { message } => Error::persistence(message),
    }
}

impl<S: MarketStore> ViewAssembler<S> {
    /// Resolve a referenced item, surfacing a dangling reference as a
    /// persistence failure rather than an empty row.
    async fn item_of(&self, listing: &Listing) -> DomainResult<Item> {
        self.store
            .item(listing.item)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| {
                Error::persistence(format!(
                    "listing {} references missing item {}",
                    listing.id, listing.item
                ))
            })
    }

    async fn listing_of(&self, id: ListingId) -> DomainResult<Listing> {
        self.store
            .listing(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::persistence(format!("dangling listing reference {id}")))
    }

    async fn user_of(&self, id: UserId) -> DomainResult<User> {
        self.store
            .user(id)
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::persistence(format!("dangling user reference {id}")))
    }

    async fn party_row(&self, id: UserId) -> DomainResult<PartyRow> {
        let user = self.user_of(id).await?;
        Ok(PartyRow {
            user_id: user.id,
            username: user.username,
            phone: user.phone,
            email: user.email,
        })
    }

    async fn request_row(&self, request: RentalRequest, party: Party) -> DomainResult<RequestRow> {
        let listing = self.listing_of(request.listing).await?;
        let item = self.item_of(&listing).await?;
        let party = match party {
            Party::None => None,
            Party::Requester => Some(self.party_row(request.requester).await?),
            Party::Owner => Some(self.party_row(listing.owner).await?),
        };
        Ok(RequestRow {
            request_id: request.id,
            listing_id: listing.id,
            item_id: item.id,
            name: item.name,
            category: item.category,
            description: item.description,
            rent_price: item.rent_price,
            image_url: item.image_url,
            starts_on: request.starts_on,
            ends_on: request.ends_on,
            note: request.note,
            status: request.status,
            party,
        })
    }

    /// Requests made by the caller, filtered by status.
    async fn requests_as_renter(
        &self,
        caller: &Caller,
        keep: fn(RequestStatus) -> bool,
        party: Party,
    ) -> DomainResult<Vec<RequestRow>> {
        let mut requests = self
            .store
            .requests_by_requester(caller.id)
            .await
            .map_err(map_store_error)?;
        requests.retain(|request| keep(request.status));
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::with_capacity(requests.len());
        for request in requests {
            rows.push(self.request_row(request, party).await?);
        }
        Ok(rows)
    }

    /// Requests against the caller's listings, filtered by status.
    async fn requests_as_owner(
        &self,
        caller: &Caller,
        keep: fn(RequestStatus) -> bool,
        party: Party,
    ) -> DomainResult<Vec<RequestRow>> {
        let listings = self
            .store
            .listings_by_owner(caller.id)
            .await
            .map_err(map_store_error)?;
        let mut requests = Vec::new();
        for listing in listings {
            let mut batch = self
                .store
                .requests_by_listing(listing.id)
                .await
                .map_err(map_store_error)?;
            batch.retain(|request| keep(request.status));
            requests.append(&mut batch);
        }
        requests.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::with_capacity(requests.len());
        for request in requests {
            rows.push(self.request_row(request, party).await?);
        }
        Ok(rows)
    }

    async fn complaint_rows(&self, complaints: Vec<Complaint>) -> DomainResult<Vec<ComplaintRow>> {
        let mut complaints = complaints;
        complaints.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::with_capacity(complaints.len());
        for complaint in complaints {
            // Withdrawing a request deletes it but leaves any complaints
            // filed against it. Those rows no longer join to anything, so
            // they drop out of the view instead of failing it.
            let Some(request) = self
                .store
                .request(complaint.request)
                .await
                .map_err(map_store_error)?
            else {
                continue;
            };
            let listing = self.listing_of(request.listing).await?;
            let item = self.item_of(&listing).await?;
            let filer = self.party_row(complaint.filer).await?;
            rows.push(ComplaintRow {
                complaint_id: complaint.id,
                request_id: request.id,
                listing_id: listing.id,
                item_id: item.id,
                name: item.name,
                category: item.category,
                description: item.description,
                rent_price: item.rent_price,
                image_url: item.image_url,
                starts_on: request.starts_on,
                ends_on: request.ends_on,
                note: request.note,
                request_status: request.status,
                complaint_status: complaint.status,
                complaint_description: complaint.description,
                filer,
            });
        }
        Ok(rows)
    }
}

#[async_trait]
impl<S: MarketStore> MarketplaceViews for ViewAssembler<S> {
    async fn catalog(&self) -> DomainResult<Vec<CatalogRow>> {
        let mut listings = self
            .store
            .listings_by_status(ListingStatus::Active)
            .await
            .map_err(map_store_error)?;
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::with_capacity(listings.len());
        for listing in listings {
            let item = self.item_of(&listing).await?;
            rows.push(CatalogRow {
                listing_id: listing.id,
                item_id: item.id,
                name: item.name,
                category: item.category,
                description: item.description,
                rent_price: item.rent_price,
                image_url: item.image_url,
            });
        }
        Ok(rows)
    }

    async fn my_listings(&self, caller: &Caller) -> DomainResult<Vec<ListingRow>> {
        let mut listings = self
            .store
            .listings_by_owner(caller.id)
            .await
            .map_err(map_store_error)?;
        listings.retain(|listing| listing.status != ListingStatus::Removed);
        listings.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::with_capacity(listings.len());
        for listing in listings {
            let item = self.item_of(&listing).await?;
            rows.push(ListingRow {
                listing_id: listing.id,
                item_id: item.id,
                status: listing.status,
                name: item.name,
                category: item.category,
                description: item.description,
                rent_price: item.rent_price,
                image_url: item.image_url,
            });
        }
        Ok(rows)
    }

    async fn favorites(&self, caller: &Caller) -> DomainResult<Vec<FavoriteRow>> {
        let mut favorites = self
            .store
            .favorites_by_user(caller.id)
            .await
            .map_err(map_store_error)?;
        favorites.sort_by(|a, b| b.id.cmp(&a.id));
        let mut rows = Vec::new();
        for favorite in favorites {
            let listing = self.listing_of(favorite.listing).await?;
            if listing.status != ListingStatus::Active {
                continue;
            }
            let item = self.item_of(&listing).await?;
            rows.push(FavoriteRow {
                favorite_id: favorite.id,
                listing_id: listing.id,
                item_id: item.id,
                name: item.name,
                category: item.category,
                description: item.description,
                rent_price: item.rent_price,
                image_url: item.image_url,
            });
        }
        Ok(rows)
    }

    async fn outgoing(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_renter(caller, |s| s == RequestStatus::Submitted, Party::None)
            .await
    }

    async fn incoming(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_owner(caller, |s| s == RequestStatus::Submitted, Party::Requester)
            .await
    }

    async fn rentals(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_renter(caller, RequestStatus::is_live, Party::Owner)
            .await
    }

    async fn lettings(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_owner(caller, RequestStatus::is_live, Party::Requester)
            .await
    }

    async fn rental_history(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_renter(caller, |s| s == RequestStatus::Completed, Party::Owner)
            .await
    }

    async fn letting_history(&self, caller: &Caller) -> DomainResult<Vec<RequestRow>> {
        self.requests_as_owner(caller, |s| s == RequestStatus::Completed, Party::Requester)
            .await
    }

    async fn complaints(&self, _caller: &Caller) -> DomainResult<Vec<ComplaintRow>> {
        let complaints = self.store.complaints().await.map_err(map_store_error)?;
        self.complaint_rows(complaints).await
    }

    async fn my_complaints(&self, caller: &Caller) -> DomainResult<Vec<ComplaintRow>> {
        let complaints = self
            .store
            .complaints_by_filer(caller.id)
            .await
            .map_err(map_store_error)?;
        self.complaint_rows(complaints).await
    }
}

#[cfg(test)]
#[path = "views_tests.rs"]
mod tests;
