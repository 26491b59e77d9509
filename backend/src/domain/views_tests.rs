use chrono::NaiveDate;

use super::*;
use crate::domain::lifecycle::{LifecycleEngine, SiblingPolicy};
use crate::domain::ports::{ListingDraft, MarketplaceCommands, RequestDraft};
use crate::domain::{NewUser, Role};
use crate::outbound::persistence::MemoryStore;

struct Market {
    store: Arc<MemoryStore>,
    engine: LifecycleEngine<MemoryStore>,
    views: ViewAssembler<MemoryStore>,
    owner: Caller,
    renter: Caller,
}

async fn register(store: &MemoryStore, name: &str) -> Caller {
    let user = store
        .insert_user(NewUser {
            username: name.into(),
            role: Role::Client,
            phone: format!("+1-555-{name}"),
            email: format!("{name}@example.com"),
            credential_hash: "fingerprint".into(),
        })
        .await
        .expect("inserts user");
    Caller::from(&user)
}

async fn market() -> Market {
    let store = Arc::new(MemoryStore::new());
    let engine = LifecycleEngine::new(Arc::clone(&store), SiblingPolicy::Retain);
    let views = ViewAssembler::new(Arc::clone(&store));
    let owner = register(&store, "owner").await;
    let renter = register(&store, "renter").await;
    Market {
        store,
        engine,
        views,
        owner,
        renter,
    }
}

impl Market {
    async fn listed(&self, name: &str) -> ListingId {
        let (listing, _) = self
            .engine
            .create_listing(
                &self.owner,
                ListingDraft {
                    name: name.into(),
                    category: "tools".into(),
                    description: "a thing for rent".into(),
                    rent_price: 25,
                    image_url: "https://img.example.com/thing.jpg".into(),
                },
            )
            .await
            .expect("creates listing");
        listing.id
    }

    async fn submitted(&self, listing: ListingId) -> crate::domain::RequestId {
        self.engine
            .submit_request(
                &self.renter,
                RequestDraft {
                    listing,
                    starts_on: NaiveDate::from_ymd_opt(2026, 9, 1).expect("valid date"),
                    ends_on: NaiveDate::from_ymd_opt(2026, 9, 8).expect("valid date"),
                    note: "weekend project".into(),
                },
            )
            .await
            .expect("submits request");
        self.store
            .requests_by_requester(self.renter.id)
            .await
            .expect("lists requests")
            .into_iter()
            .max_by_key(|r| r.id)
            .expect("request exists")
            .id
    }
}

#[tokio::test]
async fn catalog_lists_active_listings_newest_first() {
    let m = market().await;
    let older = m.listed("drill").await;
    let newer = m.listed("ladder").await;
    let rows = m.views.catalog().await.expect("assembles");
    let ids: Vec<_> = rows.iter().map(|row| row.listing_id).collect();
    assert_eq!(ids, vec![newer, older]);
    assert_eq!(rows[0].name, "ladder");
    assert_eq!(rows[0].rent_price, 25);
}

#[tokio::test]
async fn catalog_tracks_the_listing_through_its_lifecycle() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let request = m.submitted(listing).await;
    assert_eq!(m.views.catalog().await.expect("assembles").len(), 1);

    m.engine
        .approve_request(&m.owner, request, listing)
        .await
        .expect("approves");
    assert!(m.views.catalog().await.expect("assembles").is_empty());

    m.engine
        .start_rental(&m.renter, request)
        .await
        .expect("starts");
    assert!(m.views.catalog().await.expect("assembles").is_empty());

    m.engine
        .finish_rental(&m.owner, request, listing)
        .await
        .expect("finishes");
    assert_eq!(m.views.catalog().await.expect("assembles").len(), 1);
}

#[tokio::test]
async fn my_listings_keeps_inactive_but_drops_removed() {
    let m = market().await;
    let rented = m.listed("drill").await;
    let removed = m.listed("ladder").await;
    let request = m.submitted(rented).await;
    m.engine
        .approve_request(&m.owner, request, rented)
        .await
        .expect("approves");
    m.engine
        .remove_listing(&m.owner, removed)
        .await
        .expect("removes");

    let rows = m.views.my_listings(&m.owner).await.expect("assembles");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].listing_id, rented);
    assert_eq!(rows[0].status, ListingStatus::Inactive);
    assert!(m
        .views
        .my_listings(&m.renter)
        .await
        .expect("assembles")
        .is_empty());
}

#[tokio::test]
async fn favorites_show_only_active_listings() {
    let m = market().await;
    let active = m.listed("drill").await;
    let rented = m.listed("ladder").await;
    m.engine
        .add_favorite(&m.renter, active)
        .await
        .expect("favorites");
    m.engine
        .add_favorite(&m.renter, rented)
        .await
        .expect("favorites");
    let request = m.submitted(rented).await;
    m.engine
        .approve_request(&m.owner, request, rented)
        .await
        .expect("approves");

    let rows = m.views.favorites(&m.renter).await.expect("assembles");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].listing_id, active);
}

#[tokio::test]
async fn a_submitted_request_appears_outgoing_and_incoming() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let request = m.submitted(listing).await;

    let outgoing = m.views.outgoing(&m.renter).await.expect("assembles");
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].request_id, request);
    assert_eq!(outgoing[0].status, RequestStatus::Submitted);
    assert!(outgoing[0].party.is_none());

    let incoming = m.views.incoming(&m.owner).await.expect("assembles");
    assert_eq!(incoming.len(), 1);
    let requester = incoming[0].party.as_ref().expect("requester contact");
    assert_eq!(requester.user_id, m.renter.id);
    assert_eq!(requester.email, "renter@example.com");

    assert!(m.views.outgoing(&m.owner).await.expect("assembles").is_empty());
    assert!(m.views.incoming(&m.renter).await.expect("assembles").is_empty());
}

#[tokio::test]
async fn live_rentals_expose_the_counterparty() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let request = m.submitted(listing).await;
    m.engine
        .approve_request(&m.owner, request, listing)
        .await
        .expect("approves");

    // Approval moves the request out of the submitted views.
    assert!(m.views.outgoing(&m.renter).await.expect("assembles").is_empty());
    assert!(m.views.incoming(&m.owner).await.expect("assembles").is_empty());

    let rentals = m.views.rentals(&m.renter).await.expect("assembles");
    assert_eq!(rentals.len(), 1);
    assert_eq!(rentals[0].status, RequestStatus::Approved);
    let owner = rentals[0].party.as_ref().expect("owner contact");
    assert_eq!(owner.user_id, m.owner.id);

    let lettings = m.views.lettings(&m.owner).await.expect("assembles");
    assert_eq!(lettings.len(), 1);
    let renter = lettings[0].party.as_ref().expect("renter contact");
    assert_eq!(renter.user_id, m.renter.id);

    m.engine
        .start_rental(&m.owner, request)
        .await
        .expect("starts");
    let rentals = m.views.rentals(&m.renter).await.expect("assembles");
    assert_eq!(rentals[0].status, RequestStatus::InProgress);
}

#[tokio::test]
async fn finished_rentals_move_to_the_histories() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let request = m.submitted(listing).await;
    m.engine
        .approve_request(&m.owner, request, listing)
        .await
        .expect("approves");
    m.engine
        .start_rental(&m.renter, request)
        .await
        .expect("starts");
    m.engine
        .finish_rental(&m.renter, request, listing)
        .await
        .expect("finishes");

    assert!(m.views.rentals(&m.renter).await.expect("assembles").is_empty());
    assert!(m.views.lettings(&m.owner).await.expect("assembles").is_empty());

    let history = m.views.rental_history(&m.renter).await.expect("assembles");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, RequestStatus::Completed);

    let history = m.views.letting_history(&m.owner).await.expect("assembles");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].request_id, request);
}

#[tokio::test]
async fn complaint_views_join_the_request_and_the_filer() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let request = m.submitted(listing).await;
    m.engine
        .approve_request(&m.owner, request, listing)
        .await
        .expect("approves");
    m.engine
        .file_complaint(&m.renter, request, "item was broken".into())
        .await
        .expect("files");

    let all = m.views.complaints(&m.owner).await.expect("assembles");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].request_id, request);
    assert_eq!(all[0].request_status, RequestStatus::Approved);
    assert_eq!(all[0].complaint_status, crate::domain::ComplaintStatus::UnderReview);
    assert_eq!(all[0].complaint_description, "item was broken");
    assert_eq!(all[0].filer.user_id, m.renter.id);

    let mine = m.views.my_complaints(&m.renter).await.expect("assembles");
    assert_eq!(mine.len(), 1);
    assert!(m
        .views
        .my_complaints(&m.owner)
        .await
        .expect("assembles")
        .is_empty());
}

#[tokio::test]
async fn withdrawing_a_complained_about_request_drops_it_from_the_views() {
    let m = market().await;
    let listing = m.listed("drill").await;
    let kept = m.submitted(listing).await;
    let withdrawn = m.submitted(listing).await;
    m.engine
        .file_complaint(&m.renter, kept, "late pickup".into())
        .await
        .expect("files");
    m.engine
        .file_complaint(&m.renter, withdrawn, "never mind".into())
        .await
        .expect("files");
    m.engine
        .withdraw_request(&m.renter, withdrawn)
        .await
        .expect("withdraws");

    // The dangling complaint drops out; the view still assembles.
    let all = m.views.complaints(&m.owner).await.expect("assembles");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].request_id, kept);

    let mine = m.views.my_complaints(&m.renter).await.expect("assembles");
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].request_id, kept);
}

#[tokio::test]
async fn recomputing_an_unchanged_view_is_byte_identical() {
    let m = market().await;
    let listing = m.listed("drill").await;
    m.submitted(listing).await;

    let first = serde_json::to_string(&m.views.catalog().await.expect("assembles"))
        .expect("serializes");
    let second = serde_json::to_string(&m.views.catalog().await.expect("assembles"))
        .expect("serializes");
    assert_eq!(first, second);

    let first = serde_json::to_string(&m.views.incoming(&m.owner).await.expect("assembles"))
        .expect("serializes");
    let second = serde_json::to_string(&m.views.incoming(&m.owner).await.expect("assembles"))
        .expect("serializes");
    assert_eq!(first, second);
}
