//! In-memory implementation of the [`MarketStore`] port.
//!
//! A single `RwLock` over all tables serves as the transaction boundary:
//! every port method takes the lock once and applies its reads, guard
//! re-checks, and writes under it, so paired updates commit both rows or
//! neither and a conditional transition can never interleave with a
//! competing writer.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::ports::{ListingTransition, MarketStore, RequestTransition, StoreError};
use crate::domain::{
    Complaint, ComplaintId, ComplaintStatus, Favorite, FavoriteId, Item, ItemId, Listing,
    ListingId, ListingStatus, NewComplaint, NewItem, NewRequest, NewUser, RentalRequest,
    RequestId, RequestStatus, User, UserId,
};

#[derive(Debug, Default)]
struct Sequences {
    users: i64,
    items: i64,
    listings: i64,
    requests: i64,
    favorites: i64,
    complaints: i64,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    items: BTreeMap<i64, Item>,
    listings: BTreeMap<i64, Listing>,
    requests: BTreeMap<i64, RentalRequest>,
    favorites: BTreeMap<i64, Favorite>,
    complaints: BTreeMap<i64, Complaint>,
    seq: Sequences,
}

/// In-process store; cheap to construct, intended to live behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables
            .read()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables
            .write()
            .map_err(|_| StoreError::backend("store lock poisoned"))
    }
}

fn next(seq: &mut i64) -> i64 {
    *seq += 1;
    *seq
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables
            .users
            .values()
            .any(|existing| existing.email == user.email)
        {
            return Err(StoreError::conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        let id = next(&mut tables.seq.users);
        let row = User {
            id: UserId::new(id),
            username: user.username,
            role: user.role,
            phone: user.phone,
            email: user.email,
            credential_hash: user.credential_hash,
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id.value()).cloned())
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn insert_listing(
        &self,
        item: NewItem,
        owner: UserId,
    ) -> Result<(Item, Listing), StoreError> {
        let mut tables = self.write()?;
        let item_id = next(&mut tables.seq.items);
        let item_row = Item {
            id: ItemId::new(item_id),
            name: item.name,
            category: item.category,
            description: item.description,
            rent_price: item.rent_price,
            image_url: item.image_url,
        };
        tables.items.insert(item_id, item_row.clone());
        let listing_id = next(&mut tables.seq.listings);
        let listing_row = Listing {
            id: ListingId::new(listing_id),
            status: ListingStatus::Active,
            owner,
            item: item_row.id,
        };
        tables.listings.insert(listing_id, listing_row);
        Ok((item_row, listing_row))
    }

    async fn item(&self, id: ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.items.get(&id.value()).cloned())
    }

    async fn listing(&self, id: ListingId) -> Result<Option<Listing>, StoreError> {
        Ok(self.read()?.listings.get(&id.value()).copied())
    }

    async fn listings_by_status(
        &self,
        status: ListingStatus,
    ) -> Result<Vec<Listing>, StoreError> {
        Ok(self
            .read()?
            .listings
            .values()
            .filter(|listing| listing.status == status)
            .copied()
            .collect())
    }

    async fn listings_by_owner(&self, owner: UserId) -> Result<Vec<Listing>, StoreError> {
        Ok(self
            .read()?
            .listings
            .values()
            .filter(|listing| listing.owner == owner)
            .copied()
            .collect())
    }

    async fn remove_listing(&self, id: ListingId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let listing = tables
            .listings
            .get_mut(&id.value())
            .ok_or_else(|| StoreError::not_found("listing", id.value()))?;
        listing.status = ListingStatus::Removed;
        tables
            .favorites
            .retain(|_, favorite| favorite.listing != id);
        Ok(())
    }

    async fn insert_request(&self, request: NewRequest) -> Result<RentalRequest, StoreError> {
        let mut tables = self.write()?;
        let id = next(&mut tables.seq.requests);
        let row = RentalRequest {
            id: RequestId::new(id),
            status: RequestStatus::Submitted,
            starts_on: request.starts_on,
            ends_on: request.ends_on,
            note: request.note,
            requester: request.requester,
            listing: request.listing,
        };
        tables.requests.insert(id, row.clone());
        Ok(row)
    }

    async fn request(&self, id: RequestId) -> Result<Option<RentalRequest>, StoreError> {
        Ok(self.read()?.requests.get(&id.value()).cloned())
    }

    async fn requests_by_requester(
        &self,
        user: UserId,
    ) -> Result<Vec<RentalRequest>, StoreError> {
        Ok(self
            .read()?
            .requests
            .values()
            .filter(|request| request.requester == user)
            .cloned()
            .collect())
    }

    async fn requests_by_listing(
        &self,
        listing: ListingId,
    ) -> Result<Vec<RentalRequest>, StoreError> {
        Ok(self
            .read()?
            .requests
            .values()
            .filter(|request| request.listing == listing)
            .cloned()
            .collect())
    }

    async fn transition_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
        next: RequestStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let request = tables
            .requests
            .get_mut(&id.value())
            .ok_or_else(|| StoreError::not_found("request", id.value()))?;
        if request.status != expected {
            return Err(StoreError::precondition(format!(
                "request {id} is {:?}, expected {expected:?}",
                request.status
            )));
        }
        request.status = next;
        Ok(())
    }

    async fn transition_request_and_listing(
        &self,
        request: RequestTransition,
        listing: ListingTransition,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        // Validate both rows before touching either.
        let current_request = tables
            .requests
            .get(&request.id.value())
            .ok_or_else(|| StoreError::not_found("request", request.id.value()))?;
        if current_request.status != request.expected {
            return Err(StoreError::precondition(format!(
                "request {} is {:?}, expected {:?}",
                request.id, current_request.status, request.expected
            )));
        }
        let current_listing = tables
            .listings
            .get(&listing.id.value())
            .ok_or_else(|| StoreError::not_found("listing", listing.id.value()))?;
        if current_listing.status != listing.expected {
            return Err(StoreError::precondition(format!(
                "listing {} is {:?}, expected {:?}",
                listing.id, current_listing.status, listing.expected
            )));
        }
        if let Some(row) = tables.requests.get_mut(&request.id.value()) {
            row.status = request.next;
        }
        if let Some(row) = tables.listings.get_mut(&listing.id.value()) {
            row.status = listing.next;
        }
        Ok(())
    }

    async fn delete_request(
        &self,
        id: RequestId,
        expected: RequestStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let request = tables
            .requests
            .get(&id.value())
            .ok_or_else(|| StoreError::not_found("request", id.value()))?;
        if request.status != expected {
            return Err(StoreError::precondition(format!(
                "request {id} is {:?}, expected {expected:?}",
                request.status
            )));
        }
        tables.requests.remove(&id.value());
        Ok(())
    }

    async fn insert_favorite(
        &self,
        user: UserId,
        listing: ListingId,
    ) -> Result<Favorite, StoreError> {
        let mut tables = self.write()?;
        if !tables.listings.contains_key(&listing.value()) {
            return Err(StoreError::not_found("listing", listing.value()));
        }
        let id = next(&mut tables.seq.favorites);
        let row = Favorite {
            id: FavoriteId::new(id),
            user,
            listing,
        };
        tables.favorites.insert(id, row);
        Ok(row)
    }

    async fn favorite(&self, id: FavoriteId) -> Result<Option<Favorite>, StoreError> {
        Ok(self.read()?.favorites.get(&id.value()).copied())
    }

    async fn favorites_by_user(&self, user: UserId) -> Result<Vec<Favorite>, StoreError> {
        Ok(self
            .read()?
            .favorites
            .values()
            .filter(|favorite| favorite.user == user)
            .copied()
            .collect())
    }

    async fn delete_favorite(&self, id: FavoriteId) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        tables
            .favorites
            .remove(&id.value())
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("favorite", id.value()))
    }

    async fn insert_complaint(&self, complaint: NewComplaint) -> Result<Complaint, StoreError> {
        let mut tables = self.write()?;
        if !tables.requests.contains_key(&complaint.request.value()) {
            return Err(StoreError::not_found("request", complaint.request.value()));
        }
        let id = next(&mut tables.seq.complaints);
        let row = Complaint {
            id: ComplaintId::new(id),
            status: ComplaintStatus::UnderReview,
            request: complaint.request,
            filer: complaint.filer,
            description: complaint.description,
        };
        tables.complaints.insert(id, row.clone());
        Ok(row)
    }

    async fn complaint(&self, id: ComplaintId) -> Result<Option<Complaint>, StoreError> {
        Ok(self.read()?.complaints.get(&id.value()).cloned())
    }

    async fn complaints(&self) -> Result<Vec<Complaint>, StoreError> {
        Ok(self.read()?.complaints.values().cloned().collect())
    }

    async fn complaints_by_filer(&self, user: UserId) -> Result<Vec<Complaint>, StoreError> {
        Ok(self
            .read()?
            .complaints
            .values()
            .filter(|complaint| complaint.filer == user)
            .cloned()
            .collect())
    }

    async fn transition_complaint(
        &self,
        id: ComplaintId,
        expected: ComplaintStatus,
        next: ComplaintStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let complaint = tables
            .complaints
            .get_mut(&id.value())
            .ok_or_else(|| StoreError::not_found("complaint", id.value()))?;
        if complaint.status != expected {
            return Err(StoreError::precondition(format!(
                "complaint {id} is {:?}, expected {expected:?}",
                complaint.status
            )));
        }
        complaint.status = next;
        Ok(())
    }
}
