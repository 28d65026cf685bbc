//! Error types for trade domain validation.

use super::{PartyId, SessionId, SessionState};
use crate::trade::ports::PoolError;
use thiserror::Error;

/// Errors returned while building or mutating trade domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TradeDomainError {
    /// Offer lines must carry at least one unit.
    #[error("offer quantity must be at least 1")]
    ZeroQuantity,

    /// The asset carries the system marker and can never be offered.
    #[error("asset '{0}' is a system asset and cannot be traded")]
    NonTradeableAsset(String),

    /// Merging a line would exceed the largest representable quantity.
    #[error("offer line for '{kind}' cannot hold {offered} more unit(s) on top of {current}")]
    QuantityOverflow {
        /// Asset kind of the line.
        kind: String,
        /// Units already on the line.
        current: u32,
        /// Units the edit tried to add.
        offered: u32,
    },

    /// The asset kind is empty after trimming.
    #[error("asset kind must not be empty")]
    EmptyAssetKind,

    /// Stack limits must allow at least one unit per slot.
    #[error("asset '{0}' must allow at least one unit per stack")]
    ZeroStackLimit(String),

    /// The party does not participate in the session.
    #[error("party {party} is not a participant of trade session {session}")]
    PartyNotInSession {
        /// Session identifier.
        session: SessionId,
        /// Party that attempted the operation.
        party: PartyId,
    },

    /// The session has already left the active state.
    #[error("trade session {session} is closed (state: {state})")]
    SessionClosed {
        /// Session identifier.
        session: SessionId,
        /// Terminal state the session is in.
        state: SessionState,
    },

    /// A session needs two distinct parties.
    #[error("party {0} cannot trade with itself")]
    SameParty(PartyId),
}

/// Reasons a commit was abandoned. Every variant guarantees that neither
/// pool was left modified.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommitAbort {
    /// The session already left the active state.
    #[error("trade session is already {0}")]
    SessionClosed(SessionState),

    /// A party is no longer reachable.
    #[error("party {0} is unavailable")]
    PartyUnavailable(PartyId),

    /// The co-location predicate no longer holds.
    #[error("parties are no longer eligible to transact")]
    NotEligible,

    /// A party no longer holds everything it offered.
    #[error("party {0} does not have all offered resources")]
    InsufficientResources(PartyId),

    /// A receiving pool cannot hold the incoming offer.
    #[error("party {party} needs {shortfall} more free slot(s)")]
    InsufficientCapacity {
        /// Receiving party.
        party: PartyId,
        /// Additional empty slots required.
        shortfall: u32,
    },

    /// A confirmation refers to terms other than the current ones.
    #[error("confirmed terms no longer match the current offers")]
    TermsChanged,

    /// Withdrawal failed because the pool changed after the availability
    /// check.
    #[error("could not withdraw the offered resources from party {0}")]
    WithdrawFailed(PartyId),

    /// The host pool rejected a read or write.
    #[error(transparent)]
    Pool(#[from] PoolError),
}
