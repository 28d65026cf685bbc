//! Registry port: pending requests and the party-to-session directory.

use crate::trade::domain::{PartyId, PendingRequest, SessionId, TradeDomainError, TradeSession};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Outcome of [`SessionRegistry::cleanup_party`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyCleanup {
    /// Pending requests sent by or addressed to the party.
    pub dropped_requests: Vec<PendingRequest>,
    /// The party's session, if it had one.
    pub cancelled_session: Option<TradeSession>,
}

/// Process-wide directory of pending requests and active sessions.
///
/// Implementations guarantee that a session is reachable through both of
/// its parties or through neither, and that a party maps to at most one
/// session.
pub trait SessionRegistry {
    /// Records `requester`'s request to `target`, replacing any earlier
    /// inbound request for `target`. Returns the replaced request.
    fn request_trade(
        &mut self,
        requester: PartyId,
        target: PartyId,
        requested_at: DateTime<Utc>,
    ) -> Option<PendingRequest>;

    /// Returns `true` iff the pending request for `target` came from
    /// `requester`.
    fn has_pending_request(&self, target: PartyId, requester: PartyId) -> bool;

    /// Returns the inbound request recorded for `target`.
    fn pending_request(&self, target: PartyId) -> Option<PendingRequest>;

    /// Returns every pending request.
    fn pending_requests(&self) -> Vec<PendingRequest>;

    /// Drops the inbound request recorded for `target`.
    fn remove_pending_request(&mut self, target: PartyId) -> Option<PendingRequest>;

    /// Consumes the pending request for `accepter` from `requester` and opens
    /// a session indexed under both parties.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NoPendingRequest`] when no matching request
    /// exists and [`RegistryError::PartyBusy`] when either party already has
    /// a session. Nothing changes on error.
    fn accept_request(
        &mut self,
        accepter: PartyId,
        requester: PartyId,
        opened_at: DateTime<Utc>,
    ) -> RegistryResult<SessionId>;

    /// Returns the session `party` belongs to.
    fn session(&self, party: PartyId) -> Option<&TradeSession>;

    /// Mutable access to the session `party` belongs to.
    fn session_mut(&mut self, party: PartyId) -> Option<&mut TradeSession>;

    /// Returns every registered session.
    fn sessions(&self) -> Vec<&TradeSession>;

    /// Returns `true` when `party` belongs to a session.
    fn has_active_session(&self, party: PartyId) -> bool {
        self.session(party).is_some()
    }

    /// Removes `party`'s session from both party indices and returns it.
    fn cancel_session(&mut self, party: PartyId) -> Option<TradeSession>;

    /// Drops every request sent by or to `party` and cancels its session.
    fn cleanup_party(&mut self, party: PartyId) -> PartyCleanup;
}

/// Errors returned by registry implementations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// There is no request from `requester` waiting on `target`.
    #[error("no pending trade request from {requester} to {target}")]
    NoPendingRequest {
        /// Party that would have sent the request.
        requester: PartyId,
        /// Party that would have received it.
        target: PartyId,
    },

    /// The party already belongs to a session.
    #[error("party {0} already has an active trade session")]
    PartyBusy(PartyId),

    /// The session could not be constructed.
    #[error(transparent)]
    Domain(#[from] TradeDomainError),
}
