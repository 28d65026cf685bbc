//! In-memory session registry.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::trade::{
    domain::{PartyId, PendingRequest, SessionId, TradeSession},
    ports::{PartyCleanup, RegistryError, RegistryResult, SessionRegistry},
};

/// Registry keeping one authoritative session table and a derived
/// party index.
///
/// Sessions enter and leave the table only through `insert_session` and
/// `remove_session`, which update both indices together.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRegistry {
    sessions: HashMap<SessionId, TradeSession>,
    party_index: HashMap<PartyId, SessionId>,
    pending: HashMap<PartyId, PendingRequest>,
}

impl InMemorySessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Session id `party` is indexed under, if any.
    #[must_use]
    pub fn session_id_of(&self, party: PartyId) -> Option<SessionId> {
        self.party_index.get(&party).copied()
    }

    fn insert_session(&mut self, session: TradeSession) -> SessionId {
        let id = session.id();
        let (first, second) = session.parties();
        self.party_index.insert(first, id);
        self.party_index.insert(second, id);
        self.sessions.insert(id, session);
        id
    }

    fn remove_session(&mut self, id: SessionId) -> Option<TradeSession> {
        let session = self.sessions.remove(&id)?;
        let (first, second) = session.parties();
        self.party_index.remove(&first);
        self.party_index.remove(&second);
        Some(session)
    }
}

impl SessionRegistry for InMemorySessionRegistry {
    fn request_trade(
        &mut self,
        requester: PartyId,
        target: PartyId,
        requested_at: DateTime<Utc>,
    ) -> Option<PendingRequest> {
        let replaced = self
            .pending
            .insert(target, PendingRequest::new(requester, target, requested_at));
        if let Some(previous) = replaced {
            debug!(
                %target,
                previous_requester = %previous.requester,
                %requester,
                "pending trade request replaced"
            );
        }
        replaced
    }

    fn has_pending_request(&self, target: PartyId, requester: PartyId) -> bool {
        self.pending
            .get(&target)
            .is_some_and(|request| request.requester == requester)
    }

    fn pending_request(&self, target: PartyId) -> Option<PendingRequest> {
        self.pending.get(&target).copied()
    }

    fn pending_requests(&self) -> Vec<PendingRequest> {
        self.pending.values().copied().collect()
    }

    fn remove_pending_request(&mut self, target: PartyId) -> Option<PendingRequest> {
        self.pending.remove(&target)
    }

    fn accept_request(
        &mut self,
        accepter: PartyId,
        requester: PartyId,
        opened_at: DateTime<Utc>,
    ) -> RegistryResult<SessionId> {
        if !self.has_pending_request(accepter, requester) {
            return Err(RegistryError::NoPendingRequest {
                requester,
                target: accepter,
            });
        }
        for party in [accepter, requester] {
            if self.party_index.contains_key(&party) {
                return Err(RegistryError::PartyBusy(party));
            }
        }
        let session = TradeSession::opened_at(requester, accepter, opened_at)?;
        self.pending.remove(&accepter);
        Ok(self.insert_session(session))
    }

    fn session(&self, party: PartyId) -> Option<&TradeSession> {
        let id = self.party_index.get(&party)?;
        self.sessions.get(id)
    }

    fn session_mut(&mut self, party: PartyId) -> Option<&mut TradeSession> {
        let id = self.party_index.get(&party)?;
        self.sessions.get_mut(id)
    }

    fn sessions(&self) -> Vec<&TradeSession> {
        self.sessions.values().collect()
    }

    fn cancel_session(&mut self, party: PartyId) -> Option<TradeSession> {
        let id = self.party_index.get(&party).copied()?;
        self.remove_session(id)
    }

    fn cleanup_party(&mut self, party: PartyId) -> PartyCleanup {
        let involved: Vec<PartyId> = self
            .pending
            .iter()
            .filter(|(_, request)| request.involves(party))
            .map(|(target, _)| *target)
            .collect();
        let dropped_requests: Vec<PendingRequest> = involved
            .into_iter()
            .filter_map(|target| self.pending.remove(&target))
            .collect();
        PartyCleanup {
            dropped_requests,
            cancelled_session: self.cancel_session(party),
        }
    }
}
