//! Shared fixtures for in-memory trade integration tests.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use tradepost::trade::{
    adapters::memory::{InMemorySessionRegistry, InMemoryWorld, RecordingNotifier},
    config::TradeConfig,
    domain::{AssetDescriptor, AssetStack, ContextId, Location, PartyId, PoolContents, Position},
    services::TradeDesk,
};

/// Desk type wired to the in-memory adapters.
pub type MemoryDesk =
    TradeDesk<InMemorySessionRegistry, InMemoryWorld, RecordingNotifier, DefaultClock>;

/// Desk plus handles for inspecting what it did.
pub struct Market {
    pub desk: MemoryDesk,
    pub notices: RecordingNotifier,
    pub alice: PartyId,
    pub bob: PartyId,
}

impl Market {
    /// Current contents of `party`'s pool.
    pub fn pool(&self, party: PartyId) -> PoolContents {
        self.desk
            .world()
            .pool_contents(party)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces `party`'s pool.
    pub fn set_pool(&mut self, party: PartyId, contents: PoolContents) {
        if let Some(pool) = self.desk.world_mut().pool_contents_mut(party) {
            *pool = contents;
        }
    }

    /// Opens a session between alice (requester) and bob.
    pub fn open_session(&mut self) -> eyre::Result<()> {
        self.desk.request_trade(self.alice, self.bob)?;
        self.desk.accept_request(self.bob, self.alice)?;
        Ok(())
    }
}

pub fn widget() -> AssetDescriptor {
    AssetDescriptor::new("widget", 64).expect("valid widget descriptor")
}

pub fn gadget() -> AssetDescriptor {
    AssetDescriptor::new("gadget", 16).expect("valid gadget descriptor")
}

pub fn stack(descriptor: &AssetDescriptor, quantity: u32) -> Option<AssetStack> {
    Some(AssetStack::new(descriptor.clone(), quantity).expect("valid stack"))
}

pub fn plaza(x: i64) -> Location {
    Location::new(ContextId::new("plaza"), Position::new(x, 0, 0))
}

/// Alice holds 5 widgets, bob 2 gadgets; both have spare slots and stand
/// two units apart.
#[fixture]
pub fn market() -> Market {
    market_with(TradeConfig::default())
}

/// Same as [`market`] with an explicit configuration.
pub fn market_with(config: TradeConfig) -> Market {
    let alice = PartyId::new();
    let bob = PartyId::new();
    let world = InMemoryWorld::new()
        .with_party(
            alice,
            plaza(0),
            PoolContents::from_slots(vec![stack(&widget(), 5), None, None]),
        )
        .with_party(
            bob,
            plaza(2),
            PoolContents::from_slots(vec![stack(&gadget(), 2), None, None]),
        );
    let notices = RecordingNotifier::new();
    let desk = TradeDesk::new(
        InMemorySessionRegistry::new(),
        world,
        notices.clone(),
        Arc::new(DefaultClock),
        config,
    );
    Market {
        desk,
        notices,
        alice,
        bob,
    }
}
