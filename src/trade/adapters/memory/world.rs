//! In-memory world adapter.

use std::collections::HashMap;

use crate::trade::{
    domain::{AssetDescriptor, Location, PartyId, PoolContents},
    ports::{ResourcePool, TradeWorld},
};

/// Units handed to the overflow fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowRecord {
    /// Party whose pool was full.
    pub party: PartyId,
    /// Asset kind.
    pub descriptor: AssetDescriptor,
    /// Units that did not fit.
    pub quantity: u32,
}

#[derive(Debug, Clone)]
struct PartyState {
    location: Location,
    pool: PoolContents,
    reachable: bool,
}

/// World holding parties, their locations, and their pools in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorld {
    parties: HashMap<PartyId, PartyState>,
    overflow: Vec<OverflowRecord>,
}

impl InMemoryWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a reachable party.
    #[must_use]
    pub fn with_party(mut self, party: PartyId, location: Location, pool: PoolContents) -> Self {
        self.insert_party(party, location, pool);
        self
    }

    /// Adds (or replaces) a reachable party in place.
    pub fn insert_party(&mut self, party: PartyId, location: Location, pool: PoolContents) {
        self.parties.insert(
            party,
            PartyState {
                location,
                pool,
                reachable: true,
            },
        );
    }

    /// Removes a party entirely.
    pub fn remove_party(&mut self, party: PartyId) {
        self.parties.remove(&party);
    }

    /// Marks a party reachable or unreachable. Unknown parties are ignored.
    pub fn set_reachable(&mut self, party: PartyId, reachable: bool) {
        if let Some(state) = self.parties.get_mut(&party) {
            state.reachable = reachable;
        }
    }

    /// Moves a party. Unknown parties are ignored.
    pub fn move_party(&mut self, party: PartyId, location: Location) {
        if let Some(state) = self.parties.get_mut(&party) {
            state.location = location;
        }
    }

    /// Returns a party's pool contents.
    #[must_use]
    pub fn pool_contents(&self, party: PartyId) -> Option<&PoolContents> {
        self.parties.get(&party).map(|state| &state.pool)
    }

    /// Mutable access to a party's pool contents.
    pub fn pool_contents_mut(&mut self, party: PartyId) -> Option<&mut PoolContents> {
        self.parties.get_mut(&party).map(|state| &mut state.pool)
    }

    /// Everything routed to the overflow fallback so far.
    #[must_use]
    pub fn overflow(&self) -> &[OverflowRecord] {
        &self.overflow
    }
}

impl TradeWorld for InMemoryWorld {
    fn is_reachable(&self, party: PartyId) -> bool {
        self.parties.get(&party).is_some_and(|state| state.reachable)
    }

    fn location(&self, party: PartyId) -> Option<Location> {
        self.parties.get(&party).map(|state| state.location.clone())
    }

    fn pool(&self, party: PartyId) -> Option<&dyn ResourcePool> {
        self.parties
            .get(&party)
            .map(|state| &state.pool as &dyn ResourcePool)
    }

    fn pool_mut(&mut self, party: PartyId) -> Option<&mut dyn ResourcePool> {
        self.parties
            .get_mut(&party)
            .map(|state| &mut state.pool as &mut dyn ResourcePool)
    }

    fn deposit_overflow(&mut self, party: PartyId, descriptor: &AssetDescriptor, quantity: u32) {
        self.overflow.push(OverflowRecord {
            party,
            descriptor: descriptor.clone(),
            quantity,
        });
    }
}
