//! All-or-nothing exchange of two confirmed offers.

use tracing::{error, info, warn};

use crate::trade::{
    domain::{
        AssetDescriptor, CommitAbort, OfferLine, Overflow, PartyId, PoolContents, SessionId,
        TradeOffer, TradeSession,
    },
    ports::{PoolError, ResourcePool, TradeWorld},
};

use super::TradeValidator;

/// Units that fitted nowhere in the receiving pool and went to the host's
/// overflow fallback instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowAnomaly {
    /// Receiving party.
    pub party: PartyId,
    /// Asset kind.
    pub descriptor: AssetDescriptor,
    /// Units routed to the fallback.
    pub quantity: u32,
}

/// Record of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Committed session.
    pub session: SessionId,
    /// Lines the first party gave up.
    pub first_lines: Vec<OfferLine>,
    /// Lines the second party gave up.
    pub second_lines: Vec<OfferLine>,
    /// Overflow routed to the fallback, normally empty.
    pub overflow: Vec<OverflowAnomaly>,
}

impl CommitReceipt {
    /// Overflow that landed with `party`.
    #[must_use]
    pub fn overflow_for(&self, party: PartyId) -> Vec<Overflow> {
        self.overflow
            .iter()
            .filter(|anomaly| anomaly.party == party)
            .map(|anomaly| Overflow {
                descriptor: anomaly.descriptor.clone(),
                quantity: anomaly.quantity,
            })
            .collect()
    }
}

/// Runs the commit algorithm against live world state.
#[derive(Debug, Clone, Copy)]
pub struct CommitExecutor<'a> {
    validator: &'a TradeValidator,
}

impl<'a> CommitExecutor<'a> {
    /// Creates an executor using `validator` for the co-location check.
    #[must_use]
    pub const fn new(validator: &'a TradeValidator) -> Self {
        Self { validator }
    }

    /// Exchanges both offers or changes nothing.
    ///
    /// Checks run in order: liveness, co-location, confirmed terms,
    /// availability, capacity. Only then are both pools snapshotted and the
    /// goods moved; any failure after that point restores the snapshots.
    /// On success the session is [`crate::trade::domain::SessionState::Committed`],
    /// on failure it is aborted.
    ///
    /// # Errors
    ///
    /// Returns the [`CommitAbort`] naming the first check that failed.
    pub fn commit<W: TradeWorld + ?Sized>(
        &self,
        session: &mut TradeSession,
        world: &mut W,
    ) -> Result<CommitReceipt, CommitAbort> {
        if !session.is_active() {
            return Err(CommitAbort::SessionClosed(session.state()));
        }
        match self.execute(session, world) {
            Ok(overflow) => {
                for anomaly in &overflow {
                    warn!(
                        session = %session.id(),
                        party = %anomaly.party,
                        asset = %anomaly.descriptor,
                        quantity = anomaly.quantity,
                        "deposit overflowed after a passing capacity check"
                    );
                    world.deposit_overflow(anomaly.party, &anomaly.descriptor, anomaly.quantity);
                }
                let (first_lines, second_lines) = session.mark_committed();
                info!(session = %session.id(), "trade committed");
                Ok(CommitReceipt {
                    session: session.id(),
                    first_lines,
                    second_lines,
                    overflow,
                })
            }
            Err(abort) => {
                session.abort();
                warn!(session = %session.id(), reason = %abort, "trade commit aborted");
                Err(abort)
            }
        }
    }

    fn execute<W: TradeWorld + ?Sized>(
        &self,
        session: &TradeSession,
        world: &mut W,
    ) -> Result<Vec<OverflowAnomaly>, CommitAbort> {
        let (first, second) = session.parties();
        for party in [first, second] {
            if !world.is_reachable(party) {
                return Err(CommitAbort::PartyUnavailable(party));
            }
        }
        if !self.validator.co_located(world, first, second) {
            return Err(CommitAbort::NotEligible);
        }
        if !session.confirmations_match_terms() {
            return Err(CommitAbort::TermsChanged);
        }

        let first_offer = session.first_offer();
        let second_offer = session.second_offer();
        for offer in [first_offer, second_offer] {
            let owner = offer.owner();
            if !offer.has_sufficient_resources(read_pool(world, owner)?) {
                return Err(CommitAbort::InsufficientResources(owner));
            }
        }
        for (offer, receiver) in [(first_offer, second), (second_offer, first)] {
            let shortfall = offer.capacity_shortfall(read_pool(world, receiver)?)?;
            if shortfall > 0 {
                return Err(CommitAbort::InsufficientCapacity {
                    party: receiver,
                    shortfall,
                });
            }
        }

        let first_restore = read_pool(world, first)?.snapshot();
        let second_restore = read_pool(world, second)?.snapshot();
        let moved = transfer(world, first_offer, second_offer);
        if moved.is_err() {
            rollback(world, [(first, &first_restore), (second, &second_restore)]);
        }
        moved
    }
}

fn transfer<W: TradeWorld + ?Sized>(
    world: &mut W,
    first_offer: &TradeOffer,
    second_offer: &TradeOffer,
) -> Result<Vec<OverflowAnomaly>, CommitAbort> {
    for offer in [first_offer, second_offer] {
        let owner = offer.owner();
        if !offer.withdraw(write_pool(world, owner)?)? {
            return Err(CommitAbort::WithdrawFailed(owner));
        }
    }
    let mut anomalies = Vec::new();
    for (offer, receiver) in [
        (first_offer, second_offer.owner()),
        (second_offer, first_offer.owner()),
    ] {
        let overflow = offer.deposit(write_pool(world, receiver)?)?;
        anomalies.extend(overflow.into_iter().map(|spill| OverflowAnomaly {
            party: receiver,
            descriptor: spill.descriptor,
            quantity: spill.quantity,
        }));
    }
    Ok(anomalies)
}

fn rollback<W: TradeWorld + ?Sized>(world: &mut W, restore_points: [(PartyId, &PoolContents); 2]) {
    for (party, contents) in restore_points {
        let restored = write_pool(world, party)
            .and_then(|pool| contents.restore_into(pool).map_err(CommitAbort::from));
        if let Err(failure) = restored {
            error!(%party, error = %failure, "could not restore pool after failed commit");
        }
    }
}

fn read_pool<W: TradeWorld + ?Sized>(
    world: &W,
    party: PartyId,
) -> Result<&dyn ResourcePool, CommitAbort> {
    world
        .pool(party)
        .ok_or(CommitAbort::Pool(PoolError::PoolUnavailable(party)))
}

fn write_pool<W: TradeWorld + ?Sized>(
    world: &mut W,
    party: PartyId,
) -> Result<&mut dyn ResourcePool, CommitAbort> {
    world
        .pool_mut(party)
        .ok_or(CommitAbort::Pool(PoolError::PoolUnavailable(party)))
}
