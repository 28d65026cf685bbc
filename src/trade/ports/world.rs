//! World port: liveness, location, pools, and the overflow fallback.

use super::ResourcePool;
use crate::trade::domain::{AssetDescriptor, Location, PartyId};

/// Host-side view of the parties taking part in trades.
///
/// Every query is answered from live host state; the trade core never
/// caches the answers between operations.
pub trait TradeWorld {
    /// Returns `true` when `party` is present and reachable.
    fn is_reachable(&self, party: PartyId) -> bool;

    /// Returns where `party` currently is, if known.
    fn location(&self, party: PartyId) -> Option<Location>;

    /// Read access to `party`'s resource pool.
    fn pool(&self, party: PartyId) -> Option<&dyn ResourcePool>;

    /// Write access to `party`'s resource pool.
    fn pool_mut(&mut self, party: PartyId) -> Option<&mut dyn ResourcePool>;

    /// Receives units that did not fit into `party`'s pool after a commit.
    ///
    /// Only reached when a pool changed between the capacity check and the
    /// deposit; hosts typically drop the goods next to the party.
    fn deposit_overflow(&mut self, party: PartyId, descriptor: &AssetDescriptor, quantity: u32);
}
