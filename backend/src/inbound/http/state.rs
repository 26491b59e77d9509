//! Shared HTTP adapter state.
//!
//! Handlers depend on the driving ports rather than on concrete services, so
//! the adapter is testable with the generated mocks.

use std::sync::Arc;

use crate::domain::ports::{LoginService, MarketplaceCommands};
use crate::inbound::ws::broadcast::Broadcaster;

/// Dependency bundle for the REST handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub commands: Arc<dyn MarketplaceCommands>,
    pub broadcaster: Broadcaster,
}

impl HttpState {
    /// Construct state from explicit port implementations.
    pub fn new(
        login: Arc<dyn LoginService>,
        commands: Arc<dyn MarketplaceCommands>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            login,
            commands,
            broadcaster,
        }
    }
}
