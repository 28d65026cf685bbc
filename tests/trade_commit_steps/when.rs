//! When steps for trade commit BDD scenarios.

use super::world::{MarketWorld, descriptor};
use rstest_bdd_macros::when;

#[when(r#"{name} offers {quantity:u32} "{kind}""#)]
fn party_offers(
    world: &mut MarketWorld,
    name: String,
    quantity: u32,
    kind: String,
) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    let asset = descriptor(&kind)?;
    world
        .desk
        .add_line_from_selection(party, asset, quantity)
        .map_err(|err| eyre::eyre!("{name} could not offer {kind}: {err}"))?;
    Ok(())
}

#[when("{name} confirms")]
fn party_confirms(world: &mut MarketWorld, name: String) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    world.remember_pools()?;
    world.last_confirm = Some(world.desk.confirm(party));
    Ok(())
}

#[when("{requester} asks {target} to trade")]
fn party_asks(world: &mut MarketWorld, requester: String, target: String) -> Result<(), eyre::Report> {
    let asking = world.party(&requester)?;
    let asked = world.party(&target)?;
    world.last_request = Some(world.desk.request_trade(asking, asked));
    Ok(())
}
