//! Two-party trade session and its confirmation state machine.

use super::{
    AssetDescriptor, OfferLine, PartyId, SessionId, TermsDigest, TradeDomainError, TradeOffer,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Offers may be edited and confirmed.
    Active,
    /// Goods were exchanged.
    Committed,
    /// The session ended without an exchange.
    Aborted,
}

impl SessionState {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Committed => "committed",
            Self::Aborted => "aborted",
        }
    }

    /// Returns `true` for states a session never leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Aborted)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An edit one party applies to its own offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferEdit {
    /// Add units, merging with an equal descriptor.
    Add {
        /// Asset kind to add.
        descriptor: AssetDescriptor,
        /// Units to add.
        quantity: u32,
    },
    /// Remove the line at a 1-based position.
    Remove {
        /// Position as presented to the user.
        position: usize,
    },
}

/// Result of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Only one side has confirmed so far.
    AwaitingCounterpart,
    /// Both sides have confirmed the current terms; commit must run now.
    ReadyToCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    First,
    Second,
}

/// Two-party session owning both offers.
///
/// The first party is the one who sent the request, the second the one who
/// accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSession {
    id: SessionId,
    first: TradeOffer,
    second: TradeOffer,
    first_terms: Option<TermsDigest>,
    second_terms: Option<TermsDigest>,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl TradeSession {
    /// Opens an active session between two distinct parties.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::SameParty`] when both ids are equal.
    pub fn new(
        requester: PartyId,
        accepter: PartyId,
        clock: &impl Clock,
    ) -> Result<Self, TradeDomainError> {
        Self::opened_at(requester, accepter, clock.utc())
    }

    /// Opens an active session stamped with an explicit creation time.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::SameParty`] when both ids are equal.
    pub fn opened_at(
        requester: PartyId,
        accepter: PartyId,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TradeDomainError> {
        if requester == accepter {
            return Err(TradeDomainError::SameParty(requester));
        }
        Ok(Self {
            id: SessionId::new(),
            first: TradeOffer::new(requester),
            second: TradeOffer::new(accepter),
            first_terms: None,
            second_terms: None,
            state: SessionState::Active,
            created_at,
        })
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` while offers can still change.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns both parties, requester first.
    #[must_use]
    pub const fn parties(&self) -> (PartyId, PartyId) {
        (self.first.owner(), self.second.owner())
    }

    /// Returns `true` when `party` participates in this session.
    #[must_use]
    pub fn contains(&self, party: PartyId) -> bool {
        self.side_of(party).is_some()
    }

    /// Returns the first party's offer.
    #[must_use]
    pub const fn first_offer(&self) -> &TradeOffer {
        &self.first
    }

    /// Returns the second party's offer.
    #[must_use]
    pub const fn second_offer(&self) -> &TradeOffer {
        &self.second
    }

    /// Returns the offer owned by `party`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn offer(&self, party: PartyId) -> Result<&TradeOffer, TradeDomainError> {
        Ok(match self.require_side(party)? {
            Side::First => &self.first,
            Side::Second => &self.second,
        })
    }

    /// Returns the offer `party` would receive.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn incoming_offer(&self, party: PartyId) -> Result<&TradeOffer, TradeDomainError> {
        Ok(match self.require_side(party)? {
            Side::First => &self.second,
            Side::Second => &self.first,
        })
    }

    /// Returns the other participant.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn counterpart(&self, party: PartyId) -> Result<PartyId, TradeDomainError> {
        Ok(self.incoming_offer(party)?.owner())
    }

    /// Applies `edit` to `party`'s offer and clears both confirmations.
    ///
    /// Any edit by either side invalidates both flags, including a removal
    /// whose position turned out to be out of range.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::SessionClosed`] outside the active state,
    /// [`TradeDomainError::PartyNotInSession`] for outsiders, and line
    /// validation errors from [`TradeOffer::add_line`]. A rejected edit
    /// leaves the flags untouched.
    pub fn mutate_offer(&mut self, party: PartyId, edit: OfferEdit) -> Result<(), TradeDomainError> {
        self.ensure_active()?;
        let offer = match self.require_side(party)? {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        };
        match edit {
            OfferEdit::Add {
                descriptor,
                quantity,
            } => offer.add_line(descriptor, quantity)?,
            OfferEdit::Remove { position } => {
                offer.remove_line(position);
            }
        }
        self.reset_confirmations();
        Ok(())
    }

    /// Convenience wrapper for [`OfferEdit::Add`].
    ///
    /// # Errors
    ///
    /// See [`Self::mutate_offer`].
    pub fn add_line(
        &mut self,
        party: PartyId,
        descriptor: AssetDescriptor,
        quantity: u32,
    ) -> Result<(), TradeDomainError> {
        self.mutate_offer(
            party,
            OfferEdit::Add {
                descriptor,
                quantity,
            },
        )
    }

    /// Convenience wrapper for [`OfferEdit::Remove`].
    ///
    /// # Errors
    ///
    /// See [`Self::mutate_offer`].
    pub fn remove_line(&mut self, party: PartyId, position: usize) -> Result<(), TradeDomainError> {
        self.mutate_offer(party, OfferEdit::Remove { position })
    }

    /// Records `party`'s confirmation of the current terms.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::SessionClosed`] outside the active state
    /// and [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn confirm(&mut self, party: PartyId) -> Result<Confirmation, TradeDomainError> {
        self.ensure_active()?;
        let terms = self.terms_digest();
        match self.require_side(party)? {
            Side::First => {
                self.first.confirm();
                self.first_terms = Some(terms);
            }
            Side::Second => {
                self.second.confirm();
                self.second_terms = Some(terms);
            }
        }
        if self.both_confirmed() {
            Ok(Confirmation::ReadyToCommit)
        } else {
            Ok(Confirmation::AwaitingCounterpart)
        }
    }

    /// Returns `true` when both confirmation flags are set.
    #[must_use]
    pub const fn both_confirmed(&self) -> bool {
        self.first.is_confirmed() && self.second.is_confirmed()
    }

    /// Digest of the current terms.
    #[must_use]
    pub fn terms_digest(&self) -> TermsDigest {
        TermsDigest::of(&self.first, &self.second)
    }

    /// Returns `true` when both recorded confirmations refer to the current
    /// terms.
    #[must_use]
    pub fn confirmations_match_terms(&self) -> bool {
        let current = self.terms_digest();
        self.first_terms == Some(current) && self.second_terms == Some(current)
    }

    /// Ends the session at `party`'s request.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::SessionClosed`] outside the active state
    /// and [`TradeDomainError::PartyNotInSession`] for outsiders.
    pub fn cancel(&mut self, party: PartyId) -> Result<(), TradeDomainError> {
        self.ensure_active()?;
        self.require_side(party)?;
        self.state = SessionState::Aborted;
        Ok(())
    }

    /// Moves an active session to [`SessionState::Aborted`].
    ///
    /// Used for commit failures, disconnection, and expiry. No-op once
    /// terminal.
    pub const fn abort(&mut self) {
        if matches!(self.state, SessionState::Active) {
            self.state = SessionState::Aborted;
        }
    }

    /// Clears both offers and moves to [`SessionState::Committed`].
    ///
    /// Returns the executed lines, requester's first.
    pub(crate) fn mark_committed(&mut self) -> (Vec<OfferLine>, Vec<OfferLine>) {
        let first = self.first.lines().to_vec();
        let second = self.second.lines().to_vec();
        self.first.clear();
        self.second.clear();
        self.first_terms = None;
        self.second_terms = None;
        self.state = SessionState::Committed;
        (first, second)
    }

    fn reset_confirmations(&mut self) {
        self.first.reset_confirmation();
        self.second.reset_confirmation();
        self.first_terms = None;
        self.second_terms = None;
    }

    fn side_of(&self, party: PartyId) -> Option<Side> {
        if self.first.owner() == party {
            Some(Side::First)
        } else if self.second.owner() == party {
            Some(Side::Second)
        } else {
            None
        }
    }

    fn require_side(&self, party: PartyId) -> Result<Side, TradeDomainError> {
        self.side_of(party)
            .ok_or(TradeDomainError::PartyNotInSession {
                session: self.id,
                party,
            })
    }

    const fn ensure_active(&self) -> Result<(), TradeDomainError> {
        if matches!(self.state, SessionState::Active) {
            return Ok(());
        }
        Err(TradeDomainError::SessionClosed {
            session: self.id,
            state: self.state,
        })
    }
}
