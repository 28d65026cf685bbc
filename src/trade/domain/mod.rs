//! Domain model for bilateral trades.
//!
//! The trade domain models offers, the two-party session state machine, and
//! the slot placement policy used to reason about external resource pools.
//! Pools themselves stay outside the domain boundary and are reached only
//! through [`crate::trade::ports::ResourcePool`].

mod asset;
mod digest;
mod error;
mod event;
mod ids;
mod location;
mod offer;
pub mod pool;
mod request;
mod session;
mod status;

pub use asset::{AssetDescriptor, AssetOrigin};
pub use digest::TermsDigest;
pub use error::{CommitAbort, TradeDomainError};
pub use event::TradeEvent;
pub use ids::{PartyId, SessionId};
pub use location::{ContextId, Location, Position};
pub use offer::{OfferLine, Overflow, TradeOffer};
pub use pool::{AssetStack, PoolContents};
pub use request::PendingRequest;
pub use session::{Confirmation, OfferEdit, SessionState, TradeSession};
pub use status::{CapacityStatus, StatusLine, StatusSnapshot};
