//! Shared world state for trade commit BDD scenarios.

use std::{collections::HashMap, sync::Arc};

use mockable::DefaultClock;
use rstest::fixture;
use tradepost::trade::{
    adapters::memory::{InMemorySessionRegistry, InMemoryWorld, RecordingNotifier},
    config::TradeConfig,
    domain::{AssetDescriptor, ContextId, Location, PartyId, PoolContents, Position},
    services::{ConfirmOutcome, RequestOutcome, TradeDesk, TradeDeskError},
};

/// Desk type used by the scenarios.
pub type ScenarioDesk =
    TradeDesk<InMemorySessionRegistry, InMemoryWorld, RecordingNotifier, DefaultClock>;

/// Scenario world for trade commit behaviour tests.
pub struct MarketWorld {
    /// The desk under test.
    pub desk: ScenarioDesk,
    /// Parties by the names used in the feature file.
    pub parties: HashMap<String, PartyId>,
    /// Every pool as it stood just before the last confirmation.
    pub pools_before_confirm: Vec<(PartyId, PoolContents)>,
    /// Result of the last confirmation.
    pub last_confirm: Option<Result<ConfirmOutcome, TradeDeskError>>,
    /// Result of the last trade request.
    pub last_request: Option<Result<RequestOutcome, TradeDeskError>>,
}

impl MarketWorld {
    /// Creates a world with no parties.
    #[must_use]
    pub fn new() -> Self {
        let desk = TradeDesk::new(
            InMemorySessionRegistry::new(),
            InMemoryWorld::new(),
            RecordingNotifier::new(),
            Arc::new(DefaultClock),
            TradeConfig::default(),
        );
        Self {
            desk,
            parties: HashMap::new(),
            pools_before_confirm: Vec::new(),
            last_confirm: None,
            last_request: None,
        }
    }

    /// Looks up a named party.
    pub fn party(&self, name: &str) -> Result<PartyId, eyre::Report> {
        self.parties
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown party '{name}' in scenario world"))
    }

    /// Adds a named party to the desk's world.
    pub fn add_party(&mut self, name: &str, x: i64, pool: PoolContents) -> PartyId {
        let party = PartyId::new();
        let location = Location::new(ContextId::new("market"), Position::new(x, 0, 0));
        self.desk.world_mut().insert_party(party, location, pool);
        self.parties.insert(name.to_owned(), party);
        party
    }

    /// Records every pool so later steps can check nothing moved.
    pub fn remember_pools(&mut self) -> Result<(), eyre::Report> {
        let parties: Vec<PartyId> = self.parties.values().copied().collect();
        self.pools_before_confirm = parties
            .into_iter()
            .map(|party| self.pool(party).map(|contents| (party, contents)))
            .collect::<Result<_, _>>()?;
        Ok(())
    }

    /// Current contents of a party's pool.
    pub fn pool(&self, party: PartyId) -> Result<PoolContents, eyre::Report> {
        self.desk
            .world()
            .pool_contents(party)
            .cloned()
            .ok_or_else(|| eyre::eyre!("party {party} has no pool"))
    }
}

impl Default for MarketWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> MarketWorld {
    MarketWorld::default()
}

/// Descriptor for an asset kind named in a scenario.
pub fn descriptor(kind: &str) -> Result<AssetDescriptor, eyre::Report> {
    let max_stack = match kind {
        "widget" => 64,
        "gadget" => 16,
        other => return Err(eyre::eyre!("unknown asset kind '{other}' in scenario")),
    };
    AssetDescriptor::new(kind, max_stack).map_err(|err| eyre::eyre!("invalid descriptor: {err}"))
}
