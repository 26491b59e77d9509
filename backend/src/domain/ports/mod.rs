//! Domain ports and supporting types for the hexagonal boundary.

mod commands;
mod login_service;
mod market_store;
mod views;

#[cfg(test)]
pub use commands::MockMarketplaceCommands;
pub use commands::{ListingDraft, MarketplaceCommands, RequestDraft};
#[cfg(test)]
pub use login_service::MockLoginService;
pub use login_service::{LoginError, LoginService, NewProfile};
#[cfg(test)]
pub use market_store::MockMarketStore;
pub use market_store::{ListingTransition, MarketStore, RequestTransition, StoreError};
#[cfg(test)]
pub use views::MockMarketplaceViews;
pub use views::{
    CatalogRow, ComplaintRow, FavoriteRow, ListingRow, MarketplaceViews, PartyRow, RequestRow,
};
