//! Mutation-driven view fan-out.
//!
//! After a successful command the broadcaster resolves the mutation's stale
//! views through the static staleness mapping, recomputes each one, and
//! pushes it to connected clients: the catalog (identical for everyone) goes
//! to every connection, per-user views are recomputed per authenticated
//! caller. Delivery is fire-and-forget over unbounded channels; a connection
//! whose receiver is gone is pruned and never blocks the rest.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::MarketplaceViews;
use crate::domain::{Caller, DomainResult, Error, Mutation, ViewKind};
use crate::inbound::ws::messages::ServerEvent;

/// Assemble the refresh event for one view.
///
/// Per-user views require a caller; requesting one anonymously is an
/// authorization failure, which the dispatcher surfaces as an error frame.
pub(super) async fn assemble_view(
    views: &dyn MarketplaceViews,
    view: ViewKind,
    caller: Option<&Caller>,
) -> DomainResult<ServerEvent> {
    if view.is_global() {
        return Ok(ServerEvent::Catalog(views.catalog().await?));
    }
    let caller = caller.ok_or(Error::Unauthorized)?;
    Ok(match view {
        ViewKind::Catalog => unreachable!("catalog handled as the global view"),
        ViewKind::MyListings => ServerEvent::MyRentOut(views.my_listings(caller).await?),
        ViewKind::Favorites => ServerEvent::Bag(views.favorites(caller).await?),
        ViewKind::Outgoing => ServerEvent::Outgoing(views.outgoing(caller).await?),
        ViewKind::Incoming => ServerEvent::Incoming(views.incoming(caller).await?),
        ViewKind::Rentals => ServerEvent::Irent(views.rentals(caller).await?),
        ViewKind::Lettings => ServerEvent::Notirent(views.lettings(caller).await?),
        ViewKind::RentalHistory => {
            ServerEvent::IrentHistory(views.rental_history(caller).await?)
        }
        ViewKind::LettingHistory => {
            ServerEvent::NotirentHistory(views.letting_history(caller).await?)
        }
        ViewKind::Complaints => ServerEvent::Complaint(views.complaints(caller).await?),
        ViewKind::MyComplaints => ServerEvent::MyComplaint(views.my_complaints(caller).await?),
    })
}

fn encode(event: &ServerEvent) -> Option<String> {
    match serde_json::to_string(event) {
        Ok(frame) => Some(frame),
        Err(error) => {
            warn!(error = %error, "failed to serialize WebSocket payload");
            None
        }
    }
}

struct Client {
    caller: Option<Caller>,
    tx: mpsc::UnboundedSender<String>,
}

struct Inner {
    views: Arc<dyn MarketplaceViews>,
    clients: Mutex<HashMap<Uuid, Client>>,
}

/// Shared handle over the connection registry.
#[derive(Clone)]
pub struct Broadcaster {
    inner: Arc<Inner>,
}

impl Broadcaster {
    pub fn new(views: Arc<dyn MarketplaceViews>) -> Self {
        Self {
            inner: Arc::new(Inner {
                views,
                clients: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Register a connection; the session loop drains the returned receiver.
    pub fn subscribe(&self, caller: Option<Caller>) -> (Uuid, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.lock_clients().insert(id, Client { caller, tx });
        (id, rx)
    }

    pub fn unsubscribe(&self, id: Uuid) {
        self.lock_clients().remove(&id);
    }

    /// Number of registered connections.
    #[must_use]
    pub fn connected(&self) -> usize {
        self.lock_clients().len()
    }

    /// Recompute and push every view the mutation made stale.
    pub async fn publish(&self, mutation: &Mutation) {
        let stale = mutation.stale_views();
        debug!(views = stale.len(), "pushing stale views");
        for view in stale {
            if view.is_global() {
                self.push_global(view).await;
            } else {
                self.push_per_caller(view).await;
            }
        }
    }

    async fn push_global(&self, view: ViewKind) {
        let event = match assemble_view(self.inner.views.as_ref(), view, None).await {
            Ok(event) => event,
            Err(error) => {
                warn!(?view, error = %error, "failed to assemble view for broadcast");
                return;
            }
        };
        let Some(frame) = encode(&event) else { return };
        let recipients: Vec<(Uuid, mpsc::UnboundedSender<String>)> = self
            .lock_clients()
            .iter()
            .map(|(id, client)| (*id, client.tx.clone()))
            .collect();
        self.deliver(&frame, &recipients);
    }

    async fn push_per_caller(&self, view: ViewKind) {
        // Snapshot the registry, then compute once per distinct caller so two
        // tabs of the same user share the assembly work.
        let recipients: Vec<(Uuid, Caller, mpsc::UnboundedSender<String>)> = self
            .lock_clients()
            .iter()
            .filter_map(|(id, client)| {
                client
                    .caller
                    .map(|caller| (*id, caller, client.tx.clone()))
            })
            .collect();
        let mut frames: HashMap<i64, String> = HashMap::new();
        let mut dead = Vec::new();
        for (id, caller, tx) in &recipients {
            let frame = match frames.entry(caller.id.value()) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    let event =
                        match assemble_view(self.inner.views.as_ref(), view, Some(caller)).await {
                            Ok(event) => event,
                            Err(error) => {
                                warn!(?view, user = %caller.id, error = %error,
                                    "failed to assemble view for broadcast");
                                continue;
                            }
                        };
                    let Some(frame) = encode(&event) else { continue };
                    entry.insert(frame)
                }
            };
            if tx.send(frame.clone()).is_err() {
                dead.push(*id);
            }
        }
        self.prune(&dead);
    }

    fn deliver(&self, frame: &str, recipients: &[(Uuid, mpsc::UnboundedSender<String>)]) {
        let mut dead = Vec::new();
        for (id, tx) in recipients {
            if tx.send(frame.to_owned()).is_err() {
                dead.push(*id);
            }
        }
        self.prune(&dead);
    }

    fn prune(&self, dead: &[Uuid]) {
        if dead.is_empty() {
            return;
        }
        let mut clients = self.lock_clients();
        for id in dead {
            clients.remove(id);
        }
        debug!(pruned = dead.len(), "dropped dead WebSocket clients");
    }

    fn lock_clients(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Client>> {
        // The registry mutex is only held for registry edits and snapshots;
        // a poisoned lock means a panic mid-edit, so propagating it would
        // only mask the original failure.
        match self.inner.clients.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
