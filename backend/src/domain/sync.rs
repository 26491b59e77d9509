//! Mutation descriptors and the static staleness mapping.
//!
//! Every successful command reports which entity kinds it touched. The
//! broadcast layer resolves those kinds through [`EntityKind::stale_views`]
//! and pushes the affected views to connected clients, so the mapping is the
//! single source of truth for what a mutation invalidates.

/// Entity kinds a mutation can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Item,
    Listing,
    Request,
    Favorite,
    Complaint,
}

/// The client-facing read views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Active listings, visible to everyone.
    Catalog,
    /// The caller's own non-removed listings.
    MyListings,
    /// The caller's favorites over active listings.
    Favorites,
    /// Submitted requests the caller has made.
    Outgoing,
    /// Submitted requests against the caller's listings.
    Incoming,
    /// Approved or in-progress rentals where the caller is the renter.
    Rentals,
    /// Approved or in-progress rentals where the caller is the owner.
    Lettings,
    /// Completed rentals where the caller was the renter.
    RentalHistory,
    /// Completed rentals where the caller was the owner.
    LettingHistory,
    /// All complaints.
    Complaints,
    /// Complaints filed by the caller.
    MyComplaints,
}

impl ViewKind {
    /// Every view, in the canonical push order.
    pub const ALL: [Self; 11] = [
        Self::Catalog,
        Self::MyListings,
        Self::Favorites,
        Self::Outgoing,
        Self::Incoming,
        Self::Rentals,
        Self::Lettings,
        Self::RentalHistory,
        Self::LettingHistory,
        Self::Complaints,
        Self::MyComplaints,
    ];

    /// Whether the view is identical for every client (no caller filter).
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::Catalog)
    }
}

impl EntityKind {
    /// Views whose contents may change when an entity of this kind mutates.
    ///
    /// Request views join listings and items for display but never filter on
    /// listing status, so listing mutations do not invalidate them. Complaint
    /// views display the request status, so request mutations do.
    #[must_use]
    pub const fn stale_views(self) -> &'static [ViewKind] {
        match self {
            Self::Item => &[ViewKind::Catalog, ViewKind::MyListings],
            Self::Listing => &[ViewKind::Catalog, ViewKind::MyListings, ViewKind::Favorites],
            Self::Request => &[
                ViewKind::Outgoing,
                ViewKind::Incoming,
                ViewKind::Rentals,
                ViewKind::Lettings,
                ViewKind::RentalHistory,
                ViewKind::LettingHistory,
                ViewKind::Complaints,
                ViewKind::MyComplaints,
            ],
            Self::Favorite => &[ViewKind::Favorites],
            Self::Complaint => &[ViewKind::Complaints, ViewKind::MyComplaints],
        }
    }
}

/// The entity kinds a successful command touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    entities: Vec<EntityKind>,
}

impl Mutation {
    #[must_use]
    pub fn of(entities: impl Into<Vec<EntityKind>>) -> Self {
        Self {
            entities: entities.into(),
        }
    }

    /// Entity kinds touched by the mutation.
    #[must_use]
    pub fn entities(&self) -> &[EntityKind] {
        &self.entities
    }

    /// Deduplicated stale views in canonical order.
    #[must_use]
    pub fn stale_views(&self) -> Vec<ViewKind> {
        ViewKind::ALL
            .into_iter()
            .filter(|view| {
                self.entities
                    .iter()
                    .any(|entity| entity.stale_views().contains(view))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_mutations_invalidate_listing_filtered_views() {
        let stale = Mutation::of([EntityKind::Listing]).stale_views();
        assert_eq!(
            stale,
            vec![ViewKind::Catalog, ViewKind::MyListings, ViewKind::Favorites]
        );
    }

    #[test]
    fn approve_style_mutations_union_without_duplicates() {
        let stale = Mutation::of([EntityKind::Request, EntityKind::Listing]).stale_views();
        assert_eq!(stale.len(), 11);
        assert_eq!(stale, ViewKind::ALL.to_vec());
    }

    #[test]
    fn favorite_mutations_touch_only_favorites() {
        let stale = Mutation::of([EntityKind::Favorite]).stale_views();
        assert_eq!(stale, vec![ViewKind::Favorites]);
    }

    #[test]
    fn only_the_catalog_is_global() {
        let globals: Vec<_> = ViewKind::ALL
            .into_iter()
            .filter(|view| view.is_global())
            .collect();
        assert_eq!(globals, vec![ViewKind::Catalog]);
    }
}
