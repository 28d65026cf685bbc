//! A single party's proposal within a trade session.

use super::{
    AssetDescriptor, PartyId, TradeDomainError,
    pool::{count_matching, fill_empty_slots, fill_partial_stacks, place, take},
};
use crate::trade::ports::{PoolResult, ResourcePool};
use serde::{Deserialize, Serialize};

/// One `(descriptor, quantity)` entry of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "OfferLineSerde")]
pub struct OfferLine {
    descriptor: AssetDescriptor,
    quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct OfferLineSerde {
    descriptor: AssetDescriptor,
    quantity: u32,
}

impl TryFrom<OfferLineSerde> for OfferLine {
    type Error = TradeDomainError;

    fn try_from(value: OfferLineSerde) -> Result<Self, Self::Error> {
        Self::new(value.descriptor, value.quantity)
    }
}

impl OfferLine {
    /// Creates an offer line.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::ZeroQuantity`] for a zero quantity and
    /// [`TradeDomainError::NonTradeableAsset`] for system-marked assets.
    pub fn new(descriptor: AssetDescriptor, quantity: u32) -> Result<Self, TradeDomainError> {
        if quantity == 0 {
            return Err(TradeDomainError::ZeroQuantity);
        }
        if !descriptor.is_tradeable() {
            return Err(TradeDomainError::NonTradeableAsset(
                descriptor.kind().to_owned(),
            ));
        }
        Ok(Self {
            descriptor,
            quantity,
        })
    }

    /// Returns the offered asset kind.
    #[must_use]
    pub const fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    /// Returns the offered quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// Quantity of one asset kind that did not fit into a receiving pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overflow {
    /// Asset kind that overflowed.
    pub descriptor: AssetDescriptor,
    /// Units that could not be placed.
    pub quantity: u32,
}

/// A party's mutable proposal: ordered lines plus a confirmation flag.
///
/// Lines are kept in insertion order and hold at most one entry per
/// distinct descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    owner: PartyId,
    lines: Vec<OfferLine>,
    confirmed: bool,
}

impl TradeOffer {
    /// Creates an empty, unconfirmed offer.
    #[must_use]
    pub const fn new(owner: PartyId) -> Self {
        Self {
            owner,
            lines: Vec::new(),
            confirmed: false,
        }
    }

    /// Returns the owning party.
    #[must_use]
    pub const fn owner(&self) -> PartyId {
        self.owner
    }

    /// Returns the lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[OfferLine] {
        &self.lines
    }

    /// Returns `true` when the offer has no lines.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the confirmation flag.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Adds `quantity` units of `descriptor`, merging into an existing line
    /// with an equal descriptor. The merged line keeps its position.
    ///
    /// Clears this offer's confirmation. Clearing the counterpart's flag is
    /// the session's job.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::ZeroQuantity`],
    /// [`TradeDomainError::NonTradeableAsset`] or
    /// [`TradeDomainError::QuantityOverflow`] without touching the offer.
    pub fn add_line(
        &mut self,
        descriptor: AssetDescriptor,
        quantity: u32,
    ) -> Result<(), TradeDomainError> {
        let line = OfferLine::new(descriptor, quantity)?;
        if let Some(existing) = self
            .lines
            .iter_mut()
            .find(|existing| existing.descriptor == line.descriptor)
        {
            let merged = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
                TradeDomainError::QuantityOverflow {
                    kind: line.descriptor.kind().to_owned(),
                    current: existing.quantity,
                    offered: line.quantity,
                }
            })?;
            existing.quantity = merged;
        } else {
            self.lines.push(line);
        }
        self.confirmed = false;
        Ok(())
    }

    /// Removes the line at the 1-based `position` shown to the user.
    ///
    /// Out-of-range positions are ignored. Returns the removed line, if any.
    pub fn remove_line(&mut self, position: usize) -> Option<OfferLine> {
        let index = position.checked_sub(1)?;
        if index >= self.lines.len() {
            return None;
        }
        self.confirmed = false;
        Some(self.lines.remove(index))
    }

    /// Drops every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.confirmed = false;
    }

    /// Sets the confirmation flag.
    pub const fn confirm(&mut self) {
        self.confirmed = true;
    }

    /// Clears the confirmation flag.
    pub const fn reset_confirmation(&mut self) {
        self.confirmed = false;
    }

    /// Returns `true` when `pool` holds at least the offered quantity of
    /// every line. Reads only.
    #[must_use]
    pub fn has_sufficient_resources<P: ResourcePool + ?Sized>(&self, pool: &P) -> bool {
        self.lines
            .iter()
            .all(|line| count_matching(pool, &line.descriptor) >= u64::from(line.quantity))
    }

    /// Simulates receiving this offer into `snapshot` and returns how many
    /// more empty slots would be needed (zero when everything fits).
    ///
    /// Each line first tops up matching partial stacks, then occupies empty
    /// slots. The snapshot is left holding the simulated result.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::trade::ports::PoolError`] from the snapshot.
    pub fn simulate_capacity<P: ResourcePool + ?Sized>(&self, snapshot: &mut P) -> PoolResult<u32> {
        let mut shortfall: u32 = 0;
        for line in &self.lines {
            let unstacked = fill_partial_stacks(snapshot, &line.descriptor, line.quantity)?;
            let leftover = fill_empty_slots(snapshot, &line.descriptor, unstacked)?;
            shortfall = shortfall.saturating_add(leftover.div_ceil(line.descriptor.max_stack()));
        }
        Ok(shortfall)
    }

    /// Slots needed beyond existing partial stacks to hold this offer in
    /// `pool`, ignoring how many empty slots the pool has.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::trade::ports::PoolError`] from the snapshot.
    pub fn required_slots<P: ResourcePool + ?Sized>(&self, pool: &P) -> PoolResult<u32> {
        let mut snapshot = pool.snapshot();
        let mut required: u32 = 0;
        for line in &self.lines {
            let unstacked = fill_partial_stacks(&mut snapshot, &line.descriptor, line.quantity)?;
            required = required.saturating_add(unstacked.div_ceil(line.descriptor.max_stack()));
        }
        Ok(required)
    }

    /// Capacity shortfall of `pool` for this offer, computed on a snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::trade::ports::PoolError`] from the snapshot.
    pub fn capacity_shortfall<P: ResourcePool + ?Sized>(&self, pool: &P) -> PoolResult<u32> {
        let mut snapshot = pool.snapshot();
        self.simulate_capacity(&mut snapshot)
    }

    /// Removes exactly the offered quantities from `pool`.
    ///
    /// Availability is re-checked first; when the pool no longer holds the
    /// offered goods nothing is removed and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::trade::ports::PoolError`] from slot writes.
    pub fn withdraw<P: ResourcePool + ?Sized>(&self, pool: &mut P) -> PoolResult<bool> {
        if !self.has_sufficient_resources(pool) {
            return Ok(false);
        }
        for line in &self.lines {
            take(pool, &line.descriptor, line.quantity)?;
        }
        Ok(true)
    }

    /// Adds every line to `pool` with the stack-then-new-slot policy.
    ///
    /// Quantities that fit nowhere are returned rather than discarded.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::trade::ports::PoolError`] from slot writes.
    pub fn deposit<P: ResourcePool + ?Sized>(&self, pool: &mut P) -> PoolResult<Vec<Overflow>> {
        let mut overflow = Vec::new();
        for line in &self.lines {
            let leftover = place(pool, &line.descriptor, line.quantity)?;
            if leftover > 0 {
                overflow.push(Overflow {
                    descriptor: line.descriptor.clone(),
                    quantity: leftover,
                });
            }
        }
        Ok(overflow)
    }
}
