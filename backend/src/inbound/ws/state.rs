//! Shared WebSocket adapter state.
//!
//! The entry point depends on the driving ports plus the broadcaster, so the
//! adapter is testable with deterministic doubles and the per-connection
//! session stays free of construction logic.

use std::sync::Arc;

use crate::domain::ports::{MarketplaceCommands, MarketplaceViews};
use crate::inbound::ws::broadcast::Broadcaster;

/// Dependency bundle for the WebSocket entry point.
#[derive(Clone)]
pub struct WsState {
    pub commands: Arc<dyn MarketplaceCommands>,
    pub views: Arc<dyn MarketplaceViews>,
    pub broadcaster: Broadcaster,
}

impl WsState {
    /// Construct state from explicit port implementations.
    pub fn new(
        commands: Arc<dyn MarketplaceCommands>,
        views: Arc<dyn MarketplaceViews>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            commands,
            views,
            broadcaster,
        }
    }
}
