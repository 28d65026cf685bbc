//! Port contracts for the trade core.
//!
//! Ports define the host-facing interfaces the trade services consume:
//! resource pools, the world, the notifier, and the session registry.

pub mod notifier;
pub mod pool;
pub mod registry;
pub mod world;

pub use notifier::TradeNotifier;
pub use pool::{PoolError, PoolResult, ResourcePool};
pub use registry::{PartyCleanup, RegistryError, RegistryResult, SessionRegistry};
pub use world::TradeWorld;
