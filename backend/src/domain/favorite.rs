//! Favorites: user-curated bookmarks of listings.
//!
//! Rows are created and destroyed freely by their owning user and are
//! cascade-deleted when the referenced listing is removed.

use crate::domain::ids::{FavoriteId, ListingId, UserId};

/// A user's bookmark of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Favorite {
    pub id: FavoriteId,
    pub user: UserId,
    pub listing: ListingId,
}
