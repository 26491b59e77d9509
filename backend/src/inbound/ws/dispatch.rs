//! Per-connection event dispatch.
//!
//! Routes parsed client events to the driving ports. Reload events reply to
//! the requesting client only; successful mutations reply to nobody and hand
//! the resulting [`Mutation`](crate::domain::Mutation) to the broadcaster,
//! which covers the caller along with everyone else. Failures produce a
//! targeted error frame and no broadcast.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{MarketplaceCommands, MarketplaceViews, RequestDraft};
use crate::domain::{Caller, DomainResult, Error, ViewKind};
use crate::inbound::ws::broadcast::{assemble_view, Broadcaster};
use crate::inbound::ws::messages::{ClientEvent, ServerEvent};

pub(super) struct Dispatcher {
    commands: Arc<dyn MarketplaceCommands>,
    views: Arc<dyn MarketplaceViews>,
    broadcaster: Broadcaster,
    caller: Option<Caller>,
}

impl Dispatcher {
    pub(super) fn new(
        commands: Arc<dyn MarketplaceCommands>,
        views: Arc<dyn MarketplaceViews>,
        broadcaster: Broadcaster,
        caller: Option<Caller>,
    ) -> Self {
        Self {
            commands,
            views,
            broadcaster,
            caller,
        }
    }

    /// Handle one client event, returning the frame to send back, if any.
    pub(super) async fn dispatch(&self, event: ClientEvent) -> Option<ServerEvent> {
        match self.handle(event).await {
            Ok(reply) => reply,
            Err(error) => {
                warn!(user = ?self.caller.map(|c| c.id), error = %error, "rejected client event");
                Some(ServerEvent::error(&error))
            }
        }
    }

    async fn handle(&self, event: ClientEvent) -> DomainResult<Option<ServerEvent>> {
        if let Some(view) = reload_target(&event) {
            let caller = if view.is_global() {
                None
            } else {
                Some(self.require_caller()?)
            };
            let reply = assemble_view(self.views.as_ref(), view, caller.as_ref()).await?;
            return Ok(Some(reply));
        }

        let caller = self.require_caller()?;
        let mutation = match event {
            ClientEvent::AddBag(listing) => self.commands.add_favorite(&caller, listing).await?,
            ClientEvent::DelBag(favorite) => {
                self.commands.remove_favorite(&caller, favorite).await?
            }
            ClientEvent::AddRentIn(payload) => {
                self.commands
                    .submit_request(
                        &caller,
                        RequestDraft {
                            listing: payload.listing_id,
                            starts_on: payload.starts_on,
                            ends_on: payload.ends_on,
                            note: payload.note,
                        },
                    )
                    .await?
            }
            ClientEvent::DelRentIn(request) => {
                self.commands.withdraw_request(&caller, request).await?
            }
            ClientEvent::Approve(pair) => {
                self.commands
                    .approve_request(&caller, pair.request_id, pair.listing_id)
                    .await?
            }
            ClientEvent::RentStart(request) => {
                self.commands.start_rental(&caller, request).await?
            }
            ClientEvent::RentFinish(pair) => {
                self.commands
                    .finish_rental(&caller, pair.request_id, pair.listing_id)
                    .await?
            }
            ClientEvent::DelRentOut(listing) => {
                self.commands.remove_listing(&caller, listing).await?
            }
            ClientEvent::AddComplaint(payload) => {
                self.commands
                    .file_complaint(&caller, payload.request_id, payload.description)
                    .await?
            }
            ClientEvent::Resolved(complaint) => {
                self.commands.resolve_complaint(&caller, complaint).await?
            }
            ClientEvent::ReloadCatalog
            | ClientEvent::ReloadMyRentOut
            | ClientEvent::ReloadBag
            | ClientEvent::ReloadOutgoing
            | ClientEvent::ReloadIncoming
            | ClientEvent::ReloadIrent
            | ClientEvent::ReloadNotirent
            | ClientEvent::ReloadIrentHistory
            | ClientEvent::ReloadNotirentHistory
            | ClientEvent::ReloadComplaint
            | ClientEvent::ReloadMyComplaint => {
                unreachable!("reload events are handled above")
            }
        };
        self.broadcaster.publish(&mutation).await;
        Ok(None)
    }

    fn require_caller(&self) -> DomainResult<Caller> {
        self.caller.ok_or(Error::Unauthorized)
    }
}

fn reload_target(event: &ClientEvent) -> Option<ViewKind> {
    match event {
        ClientEvent::ReloadCatalog => Some(ViewKind::Catalog),
        ClientEvent::ReloadMyRentOut => Some(ViewKind::MyListings),
        ClientEvent::ReloadBag => Some(ViewKind::Favorites),
        ClientEvent::ReloadOutgoing => Some(ViewKind::Outgoing),
        ClientEvent::ReloadIncoming => Some(ViewKind::Incoming),
        ClientEvent::ReloadIrent => Some(ViewKind::Rentals),
        ClientEvent::ReloadNotirent => Some(ViewKind::Lettings),
        ClientEvent::ReloadIrentHistory => Some(ViewKind::RentalHistory),
        ClientEvent::ReloadNotirentHistory => Some(ViewKind::LettingHistory),
        ClientEvent::ReloadComplaint => Some(ViewKind::Complaints),
        ClientEvent::ReloadMyComplaint => Some(ViewKind::MyComplaints),
        _ => None,
    }
}
