//! Items and listings.
//!
//! A listing is an owner's offer to rent out a specific item. Listings carry
//! the availability status and are never physically deleted; removal is a
//! terminal soft-delete status.

use serde::{Deserialize, Serialize};

use crate::domain::ids::{ItemId, ListingId, UserId};

/// Availability status of a listing.
///
/// Transitions are owned by the lifecycle engine: `Active ↔ Inactive` cycles
/// as rentals are approved and finished, `Removed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Active,
    Inactive,
    Removed,
}

/// A rentable item. Owned implicitly through its listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    pub description: String,
    /// Non-negative price per rental period.
    pub rent_price: i64,
    /// Opaque path into the external image store.
    pub image_url: String,
}

/// Item fields supplied at listing creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub description: String,
    pub rent_price: i64,
    pub image_url: String,
}

/// An owner's offer to rent out an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub id: ListingId,
    pub status: ListingStatus,
    pub owner: UserId,
    pub item: ItemId,
}
