//! Resource pool port: a slot-level view over a party's external container.

use crate::trade::domain::{AssetStack, PartyId, PoolContents};
use thiserror::Error;

/// Result type for resource pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Mutable slot container owned by the host, not by the trade core.
///
/// The core reads slots to verify availability and capacity and writes
/// slots only while withdrawing or depositing during a commit. Hosts may
/// mutate their pools between any two trade operations; the core never
/// caches what it read.
pub trait ResourcePool {
    /// Number of slots, occupied or not.
    fn slot_count(&self) -> usize;

    /// Returns a copy of the stack held in `index`, or `None` when the slot
    /// is empty or out of range.
    fn slot(&self, index: usize) -> Option<AssetStack>;

    /// Replaces the contents of `index`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::SlotOutOfRange`] when `index` is not a slot of
    /// this pool.
    fn set_slot(&mut self, index: usize, stack: Option<AssetStack>) -> PoolResult<()>;

    /// Copies every slot into a detached [`PoolContents`].
    ///
    /// Simulations run against the copy so the live pool is never touched.
    fn snapshot(&self) -> PoolContents {
        PoolContents::from_slots((0..self.slot_count()).map(|index| self.slot(index)).collect())
    }
}

/// Errors returned by resource pool adapters.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// A write addressed a slot the pool does not have.
    #[error("slot {index} is out of range for a pool of {slot_count} slots")]
    SlotOutOfRange {
        /// Requested slot.
        index: usize,
        /// Slots available in the pool.
        slot_count: usize,
    },

    /// The host could not provide the party's pool.
    #[error("resource pool for party {0} is unavailable")]
    PoolUnavailable(PartyId),
}
