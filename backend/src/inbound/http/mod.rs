//! HTTP inbound adapter exposing the REST endpoints.

pub mod accounts;
pub mod error;
pub mod health;
pub mod listings;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
