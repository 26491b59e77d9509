//! Inbound adapters implementing the driving interfaces.

pub mod http;
pub mod ws;
