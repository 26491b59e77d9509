//! Persistence adapters.
//!
//! The marketplace treats durable storage as an external collaborator behind
//! the [`MarketStore`](crate::domain::ports::MarketStore) port. This module
//! ships the in-process adapter: a table-per-entity store whose write lock is
//! the transaction boundary, so every port method is atomic and the
//! conditional transitions re-check their guards before committing.

mod login;
mod memory;

pub use login::Sha256LoginService;
pub use memory::MemoryStore;
