//! Notifications delivered to parties through the notifier port.

use super::{CommitAbort, Overflow, PartyId, SessionId};

/// Something a party should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TradeEvent {
    /// Another party asked to trade.
    RequestReceived {
        /// Requesting party.
        from: PartyId,
    },
    /// The party's own request was recorded.
    RequestSent {
        /// Addressed party.
        to: PartyId,
    },
    /// A session opened.
    SessionStarted {
        /// New session.
        session: SessionId,
        /// The other participant.
        counterpart: PartyId,
    },
    /// A participant confirmed the current terms.
    Confirmed {
        /// Session concerned.
        session: SessionId,
        /// Confirming party.
        by: PartyId,
    },
    /// A participant cancelled the session.
    Cancelled {
        /// Session concerned.
        session: SessionId,
        /// Cancelling party.
        by: PartyId,
    },
    /// The counterpart disconnected and the session was cancelled.
    CounterpartLeft {
        /// Session concerned.
        session: SessionId,
        /// Disconnected party.
        party: PartyId,
    },
    /// Goods were exchanged.
    Committed {
        /// Session concerned.
        session: SessionId,
        /// Units routed to the overflow fallback for the notified party.
        overflow: Vec<Overflow>,
    },
    /// The commit was abandoned without touching either pool.
    CommitFailed {
        /// Session concerned.
        session: SessionId,
        /// Why the commit stopped.
        reason: CommitAbort,
    },
    /// A pending request timed out.
    RequestExpired {
        /// Party that sent the request.
        from: PartyId,
        /// Party it was addressed to.
        to: PartyId,
    },
    /// An active session timed out.
    SessionExpired {
        /// Session concerned.
        session: SessionId,
    },
}
