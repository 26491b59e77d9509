//! Domain model and core services.
//!
//! Everything in this module is transport agnostic. Adapters translate
//! [`Error`] values into HTTP responses or WebSocket frames and feed the
//! [`Mutation`] returned by successful commands into the broadcast layer.

pub mod complaint;
pub mod error;
pub mod favorite;
pub mod ids;
pub mod lifecycle;
pub mod listing;
pub mod ports;
pub mod request;
pub mod sync;
pub mod user;
pub mod views;

pub use self::complaint::{Complaint, ComplaintStatus, NewComplaint};
pub use self::error::{DomainResult, Error, ErrorCode};
pub use self::favorite::Favorite;
pub use self::ids::{ComplaintId, FavoriteId, ItemId, ListingId, RequestId, UserId};
pub use self::lifecycle::{LifecycleEngine, SiblingPolicy};
pub use self::listing::{Item, Listing, ListingStatus, NewItem};
pub use self::request::{NewRequest, RentalRequest, RequestStatus};
pub use self::sync::{EntityKind, Mutation, ViewKind};
pub use self::user::{Caller, NewUser, Role, User};
pub use self::views::ViewAssembler;
