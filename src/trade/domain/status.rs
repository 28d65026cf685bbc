//! Read model handed to the rendering collaborator after each change.

use super::{
    AssetDescriptor, OfferLine, PartyId, SessionId, SessionState, TermsDigest, TradeDomainError,
    TradeOffer, TradeSession,
};
use crate::trade::ports::{PoolResult, ResourcePool};
use serde::{Deserialize, Serialize};

/// An offer line with the 1-based position used for removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    /// Position as accepted by remove commands.
    pub position: usize,
    /// Asset kind.
    pub descriptor: AssetDescriptor,
    /// Offered units.
    pub quantity: u32,
}

/// Space in the viewing party's pool for the incoming offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityStatus {
    /// Slots the incoming offer needs beyond existing partial stacks.
    pub required_slots: u32,
    /// Empty slots currently available.
    pub empty_slots: usize,
    /// Additional empty slots needed (zero when the offer fits).
    pub shortfall: u32,
}

impl CapacityStatus {
    /// Returns `true` when the incoming offer fits.
    #[must_use]
    pub const fn fits(&self) -> bool {
        self.shortfall == 0
    }
}

/// Everything one party needs to see about its session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Session identifier.
    pub session: SessionId,
    /// Session state.
    pub state: SessionState,
    /// Viewing party.
    pub party: PartyId,
    /// The other participant.
    pub counterpart: PartyId,
    /// Viewing party's own offer.
    pub own_lines: Vec<StatusLine>,
    /// Counterpart's offer.
    pub incoming_lines: Vec<StatusLine>,
    /// Whether the viewing party has confirmed.
    pub own_confirmed: bool,
    /// Whether the counterpart has confirmed.
    pub counterpart_confirmed: bool,
    /// Capacity of the viewing party's pool, when the pool was readable.
    pub capacity: Option<CapacityStatus>,
    /// Fingerprint of the current terms.
    pub terms_digest: TermsDigest,
}

impl StatusSnapshot {
    /// Builds the snapshot for `party`, reading its pool when available.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn capture(
        session: &TradeSession,
        party: PartyId,
        own_pool: Option<&dyn ResourcePool>,
    ) -> Result<Self, TradeDomainError> {
        let own = session.offer(party)?;
        let incoming = session.incoming_offer(party)?;
        let capacity = own_pool.and_then(|pool| capacity_for(incoming, pool).ok());
        Ok(Self {
            session: session.id(),
            state: session.state(),
            party,
            counterpart: incoming.owner(),
            own_lines: status_lines(own.lines()),
            incoming_lines: status_lines(incoming.lines()),
            own_confirmed: own.is_confirmed(),
            counterpart_confirmed: incoming.is_confirmed(),
            capacity,
            terms_digest: session.terms_digest(),
        })
    }
}

fn capacity_for(incoming: &TradeOffer, pool: &dyn ResourcePool) -> PoolResult<CapacityStatus> {
    Ok(CapacityStatus {
        required_slots: incoming.required_slots(pool)?,
        empty_slots: pool.snapshot().empty_slot_count(),
        shortfall: incoming.capacity_shortfall(pool)?,
    })
}

fn status_lines(lines: &[OfferLine]) -> Vec<StatusLine> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| StatusLine {
            position: index + 1,
            descriptor: line.descriptor().clone(),
            quantity: line.quantity(),
        })
        .collect()
}
