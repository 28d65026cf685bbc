//! End-to-end trade flows through the desk and the in-memory adapters.

use super::helpers::{Market, gadget, market, plaza, stack, widget};
use chrono::{Duration, Utc};
use eyre::{bail, ensure};
use rstest::rstest;
use tradepost::trade::{
    config::TradeConfig,
    domain::{AssetDescriptor, CommitAbort, PoolContents, TradeEvent, pool::count_matching},
    ports::SessionRegistry,
    services::{ConfirmOutcome, TradeDeskError},
};

fn confirm_both(market: &mut Market) -> eyre::Result<ConfirmOutcome> {
    market.desk.confirm(market.alice)?;
    Ok(market.desk.confirm(market.bob)?)
}

#[rstest]
fn widgets_for_gadgets(mut market: Market) -> eyre::Result<()> {
    market.open_session()?;
    market
        .desk
        .add_line_from_selection(market.alice, widget(), 5)?;
    market.desk.add_line_from_selection(market.bob, gadget(), 2)?;

    let outcome = confirm_both(&mut market)?;

    ensure!(
        matches!(outcome, ConfirmOutcome::Committed(_)),
        "expected commit, got {outcome:?}"
    );
    let alice = market.pool(market.alice);
    let bob = market.pool(market.bob);
    ensure!(count_matching(&alice, &widget()) == 0, "alice kept widgets");
    ensure!(count_matching(&alice, &gadget()) == 2, "alice lacks gadgets");
    ensure!(count_matching(&bob, &gadget()) == 0, "bob kept gadgets");
    ensure!(count_matching(&bob, &widget()) == 5, "bob lacks widgets");
    ensure!(
        !market.desk.registry().has_active_session(market.alice),
        "session still registered"
    );
    Ok(())
}

#[rstest]
fn full_receiver_blocks_the_trade(mut market: Market) -> eyre::Result<()> {
    let bob_full = PoolContents::from_slots(vec![stack(&gadget(), 2)]);
    market.set_pool(market.bob, bob_full.clone());
    market.open_session()?;
    market
        .desk
        .add_line_from_selection(market.alice, widget(), 5)?;
    market.desk.add_line_from_selection(market.bob, gadget(), 2)?;
    let alice_before = market.pool(market.alice);

    let outcome = confirm_both(&mut market)?;

    let ConfirmOutcome::Aborted(reason) = outcome else {
        bail!("expected abort, got {outcome:?}");
    };
    ensure!(
        reason
            == CommitAbort::InsufficientCapacity {
                party: market.bob,
                shortfall: 1,
            },
        "unexpected reason {reason}"
    );
    ensure!(market.pool(market.alice) == alice_before, "alice pool changed");
    ensure!(market.pool(market.bob) == bob_full, "bob pool changed");
    Ok(())
}

#[rstest]
fn late_edit_requires_fresh_confirmation(mut market: Market) -> eyre::Result<()> {
    market.open_session()?;
    market.desk.add_line_from_selection(market.bob, gadget(), 1)?;
    market.desk.confirm(market.bob)?;

    market
        .desk
        .add_line_from_selection(market.alice, widget(), 1)?;

    let status = market.desk.query_status(market.bob)?;
    ensure!(!status.own_confirmed, "bob's confirmation survived the edit");
    let alice_outcome = market.desk.confirm(market.alice)?;
    ensure!(
        alice_outcome == ConfirmOutcome::AwaitingCounterpart,
        "committed without bob re-confirming"
    );
    let bob_outcome = market.desk.confirm(market.bob)?;
    ensure!(
        matches!(bob_outcome, ConfirmOutcome::Committed(_)),
        "expected commit after re-confirmation, got {bob_outcome:?}"
    );
    Ok(())
}

#[rstest]
fn request_to_trading_party_is_rejected(mut market: Market) -> eyre::Result<()> {
    market.open_session()?;
    let carol = tradepost::trade::domain::PartyId::new();
    market.desk.world_mut().insert_party(
        carol,
        plaza(1),
        PoolContents::with_slots(1),
    );

    let result = market.desk.request_trade(carol, market.bob);

    ensure!(
        result == Err(TradeDeskError::SessionConflict(market.bob)),
        "unexpected result {result:?}"
    );
    ensure!(
        market.desk.registry().pending_request(market.bob).is_none(),
        "pending entry recorded for a busy party"
    );
    Ok(())
}

#[rstest]
#[case::moved_away(AbortCause::MovedAway)]
#[case::went_offline(AbortCause::Offline)]
#[case::spent_goods(AbortCause::SpentGoods)]
#[case::filled_pool(AbortCause::FilledPool)]
fn every_abort_leaves_pools_identical(
    mut market: Market,
    #[case] cause: AbortCause,
) -> eyre::Result<()> {
    market.open_session()?;
    market
        .desk
        .add_line_from_selection(market.alice, widget(), 3)?;
    market.desk.add_line_from_selection(market.bob, gadget(), 2)?;
    market.desk.confirm(market.alice)?;
    cause.apply(&mut market);
    let before = (market.pool(market.alice), market.pool(market.bob));

    let outcome = market.desk.confirm(market.bob)?;

    ensure!(
        matches!(outcome, ConfirmOutcome::Aborted(_)),
        "expected abort, got {outcome:?}"
    );
    ensure!(
        (market.pool(market.alice), market.pool(market.bob)) == before,
        "pools changed on abort"
    );
    Ok(())
}

#[derive(Debug, Clone, Copy)]
enum AbortCause {
    MovedAway,
    Offline,
    SpentGoods,
    FilledPool,
}

impl AbortCause {
    fn apply(self, market: &mut Market) {
        match self {
            Self::MovedAway => market.desk.world_mut().move_party(market.bob, plaza(50)),
            Self::Offline => market.desk.world_mut().set_reachable(market.alice, false),
            Self::SpentGoods => {
                market.set_pool(
                    market.alice,
                    PoolContents::from_slots(vec![stack(&widget(), 1), None, None]),
                );
            }
            Self::FilledPool => {
                let filler = AssetDescriptor::new("gravel", 1).expect("valid descriptor");
                market.set_pool(
                    market.alice,
                    PoolContents::from_slots(vec![
                        stack(&widget(), 64),
                        stack(&filler, 1),
                        stack(&filler, 1),
                    ]),
                );
            }
        }
    }
}

#[rstest]
#[case(vec![(5, 2)])]
#[case(vec![(1, 0), (4, 16)])]
#[case(vec![(0, 1)])]
fn commit_conserves_every_unit(
    mut market: Market,
    #[case] rounds: Vec<(u32, u32)>,
) -> eyre::Result<()> {
    market.set_pool(
        market.alice,
        PoolContents::from_slots(vec![stack(&widget(), 64), None, None, None]),
    );
    market.set_pool(
        market.bob,
        PoolContents::from_slots(vec![stack(&gadget(), 16), stack(&gadget(), 16), None, None]),
    );
    for (widgets, gadgets) in rounds {
        let alice_before = market.pool(market.alice);
        let bob_before = market.pool(market.bob);
        market.open_session()?;
        if widgets > 0 {
            market
                .desk
                .add_line_from_selection(market.alice, widget(), widgets)?;
        }
        if gadgets > 0 {
            market
                .desk
                .add_line_from_selection(market.bob, gadget(), gadgets)?;
        }

        let outcome = confirm_both(&mut market)?;

        ensure!(
            matches!(outcome, ConfirmOutcome::Committed(_)),
            "expected commit, got {outcome:?}"
        );
        let alice_after = market.pool(market.alice);
        let bob_after = market.pool(market.bob);
        let moved_widgets = u64::from(widgets);
        let moved_gadgets = u64::from(gadgets);
        ensure!(
            count_matching(&alice_after, &widget()) + moved_widgets
                == count_matching(&alice_before, &widget()),
            "alice widgets not conserved"
        );
        ensure!(
            count_matching(&bob_after, &widget())
                == count_matching(&bob_before, &widget()) + moved_widgets,
            "bob widgets not conserved"
        );
        ensure!(
            count_matching(&bob_after, &gadget()) + moved_gadgets
                == count_matching(&bob_before, &gadget()),
            "bob gadgets not conserved"
        );
        ensure!(
            count_matching(&alice_after, &gadget())
                == count_matching(&alice_before, &gadget()) + moved_gadgets,
            "alice gadgets not conserved"
        );
    }
    ensure!(
        market.desk.world().overflow().is_empty(),
        "unexpected overflow"
    );
    Ok(())
}

#[rstest]
fn departure_cancels_and_tells_the_counterpart(mut market: Market) -> eyre::Result<()> {
    market.open_session()?;
    market
        .desk
        .add_line_from_selection(market.alice, widget(), 2)?;
    let pools_before = (market.pool(market.alice), market.pool(market.bob));
    market.notices.clear();

    market.desk.disconnect(market.alice);
    ensure!(
        market.notices.events_for(market.bob).is_empty(),
        "notice delivered before the next cycle"
    );
    market.desk.process_cycle();

    let delivered = market.notices.events_for(market.bob);
    ensure!(
        matches!(
            delivered.as_slice(),
            [TradeEvent::CounterpartLeft { party, .. }] if *party == market.alice
        ),
        "unexpected notices {delivered:?}"
    );
    ensure!(
        !market.desk.registry().has_active_session(market.bob),
        "session survived the disconnect"
    );
    ensure!(
        (market.pool(market.alice), market.pool(market.bob)) == pools_before,
        "pools changed on disconnect"
    );
    Ok(())
}

#[rstest]
fn stale_session_expires_when_enabled() -> eyre::Result<()> {
    let mut market =
        super::helpers::market_with(TradeConfig::default().with_session_ttl_secs(60));
    market.open_session()?;
    let soon = Utc::now() + Duration::try_seconds(5).expect("valid span");
    let later = Utc::now() + Duration::try_minutes(5).expect("valid span");

    ensure!(
        market.desk.expire_stale(soon).is_empty(),
        "expired too early"
    );
    let report = market.desk.expire_stale(later);

    ensure!(report.sessions.len() == 1, "unexpected report {report:?}");
    ensure!(
        market.desk.confirm(market.alice) == Err(TradeDeskError::NoActiveSession(market.alice)),
        "expired session still accepts confirmations"
    );
    Ok(())
}
