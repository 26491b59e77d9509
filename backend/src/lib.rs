//! Peer-to-peer rental marketplace backend.
//!
//! Owners list items for rent, renters browse the catalog and submit rental
//! requests, and both sides drive the requests through their lifecycle.
//! Mutations fan out to every connected WebSocket client as refreshed view
//! snapshots.
//!
//! Layout follows a hexagonal split:
//! - [`domain`] — entities, the rental lifecycle engine, the read-view
//!   assembler, and the ports both of them depend on.
//! - [`inbound`] — HTTP and WebSocket adapters.
//! - [`outbound`] — adapter implementations of the driven ports.
//! - [`server`] — application wiring and configuration.

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;
