//! Stacks, detached pool contents, and the slot placement policy shared by
//! capacity simulation, withdrawal, and deposit.

use super::{AssetDescriptor, TradeDomainError};
use crate::trade::ports::{PoolError, PoolResult, ResourcePool};
use serde::{Deserialize, Serialize};

/// A quantity of one asset kind held in a single slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AssetStackSerde")]
pub struct AssetStack {
    descriptor: AssetDescriptor,
    quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct AssetStackSerde {
    descriptor: AssetDescriptor,
    quantity: u32,
}

impl TryFrom<AssetStackSerde> for AssetStack {
    type Error = TradeDomainError;

    fn try_from(value: AssetStackSerde) -> Result<Self, Self::Error> {
        Self::new(value.descriptor, value.quantity)
    }
}

impl AssetStack {
    /// Creates a stack.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::ZeroQuantity`] when `quantity` is zero.
    pub fn new(descriptor: AssetDescriptor, quantity: u32) -> Result<Self, TradeDomainError> {
        if quantity == 0 {
            return Err(TradeDomainError::ZeroQuantity);
        }
        Ok(Self {
            descriptor,
            quantity,
        })
    }

    /// Returns the stacked asset kind.
    #[must_use]
    pub const fn descriptor(&self) -> &AssetDescriptor {
        &self.descriptor
    }

    /// Returns the number of units in the stack.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Units that still fit on top of this stack.
    #[must_use]
    pub const fn headroom(&self) -> u32 {
        self.descriptor.max_stack().saturating_sub(self.quantity)
    }

    /// Returns `true` when this stack holds units of `descriptor`.
    #[must_use]
    pub fn holds(&self, descriptor: &AssetDescriptor) -> bool {
        self.descriptor == *descriptor
    }
}

/// Detached copy of a pool's slots.
///
/// Used as the scratch space for capacity simulation and as a restore point
/// when a commit has to undo a partial withdrawal. It is also a complete
/// [`ResourcePool`] in its own right.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PoolContents {
    slots: Vec<Option<AssetStack>>,
}

impl PoolContents {
    /// Creates contents with `slot_count` empty slots.
    #[must_use]
    pub fn with_slots(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
        }
    }

    /// Wraps an existing slot vector.
    #[must_use]
    pub const fn from_slots(slots: Vec<Option<AssetStack>>) -> Self {
        Self { slots }
    }

    /// Returns the slots in order.
    #[must_use]
    pub fn slots(&self) -> &[Option<AssetStack>] {
        &self.slots
    }

    /// Number of empty slots.
    #[must_use]
    pub fn empty_slot_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Writes every slot of this copy back into `pool`.
    ///
    /// # Errors
    ///
    /// Returns the first [`PoolError`] raised by the pool.
    pub fn restore_into<P: ResourcePool + ?Sized>(&self, pool: &mut P) -> PoolResult<()> {
        for (index, stack) in self.slots.iter().enumerate() {
            pool.set_slot(index, stack.clone())?;
        }
        Ok(())
    }
}

impl ResourcePool for PoolContents {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> Option<AssetStack> {
        self.slots.get(index).cloned().flatten()
    }

    fn set_slot(&mut self, index: usize, stack: Option<AssetStack>) -> PoolResult<()> {
        let slot_count = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(PoolError::SlotOutOfRange { index, slot_count })?;
        *slot = stack;
        Ok(())
    }
}

/// Total units of `descriptor` across every slot of `pool`.
#[must_use]
pub fn count_matching<P: ResourcePool + ?Sized>(pool: &P, descriptor: &AssetDescriptor) -> u64 {
    (0..pool.slot_count())
        .filter_map(|index| pool.slot(index))
        .filter(|stack| stack.holds(descriptor))
        .map(|stack| u64::from(stack.quantity()))
        .sum()
}

/// Tops up existing stacks of `descriptor`, first slot first.
///
/// Returns the quantity that did not fit on existing stacks.
///
/// # Errors
///
/// Propagates [`PoolError`] from slot writes.
pub fn fill_partial_stacks<P: ResourcePool + ?Sized>(
    pool: &mut P,
    descriptor: &AssetDescriptor,
    quantity: u32,
) -> PoolResult<u32> {
    let mut remaining = quantity;
    for index in 0..pool.slot_count() {
        if remaining == 0 {
            break;
        }
        let Some(stack) = pool.slot(index) else {
            continue;
        };
        if !stack.holds(descriptor) || stack.headroom() == 0 {
            continue;
        }
        let added = stack.headroom().min(remaining);
        remaining -= added;
        pool.set_slot(
            index,
            Some(AssetStack {
                descriptor: stack.descriptor,
                quantity: stack.quantity + added,
            }),
        )?;
    }
    Ok(remaining)
}

/// Opens new stacks of `descriptor` in empty slots, first slot first, each
/// holding at most the descriptor's stack limit.
///
/// Returns the quantity left over once the pool has no empty slot.
///
/// # Errors
///
/// Propagates [`PoolError`] from slot writes.
pub fn fill_empty_slots<P: ResourcePool + ?Sized>(
    pool: &mut P,
    descriptor: &AssetDescriptor,
    quantity: u32,
) -> PoolResult<u32> {
    let mut remaining = quantity;
    for index in 0..pool.slot_count() {
        if remaining == 0 {
            break;
        }
        if pool.slot(index).is_some() {
            continue;
        }
        let placed = descriptor.max_stack().min(remaining);
        remaining -= placed;
        pool.set_slot(
            index,
            Some(AssetStack {
                descriptor: descriptor.clone(),
                quantity: placed,
            }),
        )?;
    }
    Ok(remaining)
}

/// Places `quantity` units using the stack-then-new-slot policy.
///
/// Returns the overflow that fitted nowhere.
///
/// # Errors
///
/// Propagates [`PoolError`] from slot writes.
pub fn place<P: ResourcePool + ?Sized>(
    pool: &mut P,
    descriptor: &AssetDescriptor,
    quantity: u32,
) -> PoolResult<u32> {
    let after_stacking = fill_partial_stacks(pool, descriptor, quantity)?;
    fill_empty_slots(pool, descriptor, after_stacking)
}

/// Removes up to `quantity` units of `descriptor`, draining the
/// lowest-indexed matching slots first.
///
/// Returns the quantity that could not be removed.
///
/// # Errors
///
/// Propagates [`PoolError`] from slot writes.
pub fn take<P: ResourcePool + ?Sized>(
    pool: &mut P,
    descriptor: &AssetDescriptor,
    quantity: u32,
) -> PoolResult<u32> {
    let mut remaining = quantity;
    for index in 0..pool.slot_count() {
        if remaining == 0 {
            break;
        }
        let Some(stack) = pool.slot(index) else {
            continue;
        };
        if !stack.holds(descriptor) {
            continue;
        }
        let taken = stack.quantity().min(remaining);
        remaining -= taken;
        let left = stack.quantity - taken;
        let replacement = (left > 0).then(|| AssetStack {
            descriptor: stack.descriptor,
            quantity: left,
        });
        pool.set_slot(index, replacement)?;
    }
    Ok(remaining)
}
