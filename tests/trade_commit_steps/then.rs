//! Then steps for trade commit BDD scenarios.

use super::world::{MarketWorld, descriptor};
use rstest_bdd_macros::then;
use tradepost::trade::{
    domain::{CommitAbort, pool::count_matching},
    ports::SessionRegistry,
    services::{ConfirmOutcome, TradeDeskError},
};

fn last_confirm(world: &MarketWorld) -> Result<&ConfirmOutcome, eyre::Report> {
    match world.last_confirm.as_ref() {
        Some(Ok(outcome)) => Ok(outcome),
        Some(Err(err)) => Err(eyre::eyre!("last confirmation failed: {err}")),
        None => Err(eyre::eyre!("no confirmation in scenario world")),
    }
}

#[then("the trade commits")]
fn trade_commits(world: &mut MarketWorld) -> Result<(), eyre::Report> {
    let outcome = last_confirm(world)?;
    if !matches!(outcome, ConfirmOutcome::Committed(_)) {
        return Err(eyre::eyre!("expected a commit, got {outcome:?}"));
    }
    if world.desk.registry().session_count() != 0 {
        return Err(eyre::eyre!("committed session is still registered"));
    }
    Ok(())
}

#[then(r#"{name} holds {quantity:u64} "{kind}""#)]
fn party_holds(
    world: &mut MarketWorld,
    name: String,
    quantity: u64,
    kind: String,
) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    let held = count_matching(&world.pool(party)?, &descriptor(&kind)?);
    if held != quantity {
        return Err(eyre::eyre!("{name} holds {held} {kind}, expected {quantity}"));
    }
    Ok(())
}

#[then("the trade aborts needing {shortfall:u32} more slot for {name}")]
fn trade_aborts_for_capacity(
    world: &mut MarketWorld,
    shortfall: u32,
    name: String,
) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    let expected = CommitAbort::InsufficientCapacity { party, shortfall };
    match last_confirm(world)? {
        ConfirmOutcome::Aborted(reason) if *reason == expected => Ok(()),
        other => Err(eyre::eyre!("expected {expected}, got {other:?}")),
    }
}

#[then("neither pool has changed")]
fn pools_unchanged(world: &mut MarketWorld) -> Result<(), eyre::Report> {
    if world.pools_before_confirm.is_empty() {
        return Err(eyre::eyre!("no pools were recorded before confirming"));
    }
    for (party, before) in &world.pools_before_confirm {
        if world.pool(*party)? != *before {
            return Err(eyre::eyre!("pool of {party} changed"));
        }
    }
    Ok(())
}

#[then("{name} is no longer confirmed")]
fn party_not_confirmed(world: &mut MarketWorld, name: String) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    let status = world
        .desk
        .query_status(party)
        .map_err(|err| eyre::eyre!("status query failed: {err}"))?;
    if status.own_confirmed {
        return Err(eyre::eyre!("{name} is still confirmed"));
    }
    Ok(())
}

#[then("the trade is still awaiting confirmation")]
fn trade_awaiting(world: &mut MarketWorld) -> Result<(), eyre::Report> {
    let outcome = last_confirm(world)?;
    if *outcome != ConfirmOutcome::AwaitingCounterpart {
        return Err(eyre::eyre!("expected to await the counterpart, got {outcome:?}"));
    }
    Ok(())
}

#[then("the request is refused because {name} is already trading")]
fn request_refused_busy(world: &mut MarketWorld, name: String) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    match world.last_request.as_ref() {
        Some(Err(TradeDeskError::SessionConflict(busy))) if *busy == party => Ok(()),
        other => Err(eyre::eyre!("expected a session conflict, got {other:?}")),
    }
}

#[then("{name} has no pending request")]
fn no_pending_request(world: &mut MarketWorld, name: String) -> Result<(), eyre::Report> {
    let party = world.party(&name)?;
    if world.desk.registry().pending_request(party).is_some() {
        return Err(eyre::eyre!("{name} has a pending request"));
    }
    Ok(())
}
