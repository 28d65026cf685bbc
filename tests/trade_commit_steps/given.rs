//! Given steps for trade commit BDD scenarios.

use super::world::{MarketWorld, descriptor};
use rstest_bdd_macros::given;
use tradepost::trade::domain::{AssetStack, PoolContents};

fn holding(kind: &str, quantity: u32, spare_slots: usize) -> Result<PoolContents, eyre::Report> {
    let stack = AssetStack::new(descriptor(kind)?, quantity)
        .map_err(|err| eyre::eyre!("invalid stack: {err}"))?;
    let mut slots = vec![Some(stack)];
    slots.extend(std::iter::repeat_n(None, spare_slots));
    Ok(PoolContents::from_slots(slots))
}

#[given("alice and bob stand together holding widgets and gadgets")]
fn alice_and_bob_stand_together(world: &mut MarketWorld) -> Result<(), eyre::Report> {
    let alice_pool = holding("widget", 5, 2)?;
    let bob_pool = holding("gadget", 2, 2)?;
    world.add_party("alice", 0, alice_pool);
    world.add_party("bob", 2, bob_pool);
    Ok(())
}

#[given("{name} has no free slots")]
fn party_has_no_free_slots(world: &mut MarketWorld, name: String) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    let occupied: Vec<_> = world
        .pool(party)?
        .slots()
        .iter()
        .filter(|slot| slot.is_some())
        .cloned()
        .collect();
    let pool = world
        .desk
        .world_mut()
        .pool_contents_mut(party)
        .ok_or_else(|| eyre::eyre!("{name} has no pool"))?;
    *pool = PoolContents::from_slots(occupied);
    Ok(())
}

#[given("{name} stands nearby")]
fn party_stands_nearby(world: &mut MarketWorld, name: String) {
    world.add_party(&name, 1, PoolContents::with_slots(3));
}

#[given("{requester} and {target} have opened a trade session")]
fn session_opened(
    world: &mut MarketWorld,
    requester: String,
    target: String,
) -> Result<(), eyre::Report> {
    let asking = world.party(&requester)?;
    let asked = world.party(&target)?;
    world
        .desk
        .request_trade(asking, asked)
        .map_err(|err| eyre::eyre!("request failed: {err}"))?;
    world
        .desk
        .accept_request(asked, asking)
        .map_err(|err| eyre::eyre!("accept failed: {err}"))?;
    Ok(())
}
