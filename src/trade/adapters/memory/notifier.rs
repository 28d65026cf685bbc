//! Notifier adapter that records everything it is asked to show.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::trade::{
    domain::{PartyId, StatusSnapshot, TradeEvent},
    ports::TradeNotifier,
};

/// A status snapshot as delivered to one party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    /// Recipient.
    pub party: PartyId,
    /// Delivered snapshot.
    pub snapshot: StatusSnapshot,
}

#[derive(Debug, Default)]
struct RecordingState {
    statuses: Vec<RenderedStatus>,
    events: Vec<(PartyId, TradeEvent)>,
}

/// Notifier that keeps every status and event in memory.
///
/// Clones share the same recording, so a test can keep a handle after
/// moving the notifier into a service.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<Mutex<RecordingState>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every status delivered so far, oldest first.
    #[must_use]
    pub fn statuses(&self) -> Vec<RenderedStatus> {
        self.state
            .lock()
            .map(|state| state.statuses.clone())
            .unwrap_or_default()
    }

    /// The most recent status delivered to `party`.
    #[must_use]
    pub fn last_status_for(&self, party: PartyId) -> Option<StatusSnapshot> {
        self.statuses()
            .into_iter()
            .rev()
            .find(|rendered| rendered.party == party)
            .map(|rendered| rendered.snapshot)
    }

    /// Every event delivered so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<(PartyId, TradeEvent)> {
        self.state
            .lock()
            .map(|state| state.events.clone())
            .unwrap_or_default()
    }

    /// Events delivered to `party`, oldest first.
    #[must_use]
    pub fn events_for(&self, party: PartyId) -> Vec<TradeEvent> {
        self.events()
            .into_iter()
            .filter(|(recipient, _)| *recipient == party)
            .map(|(_, event)| event)
            .collect()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.statuses.clear();
            state.events.clear();
        }
    }
}

impl TradeNotifier for RecordingNotifier {
    fn render_status(&self, party: PartyId, snapshot: &StatusSnapshot) {
        debug!(%party, session = %snapshot.session, "status rendered");
        if let Ok(mut state) = self.state.lock() {
            state.statuses.push(RenderedStatus {
                party,
                snapshot: snapshot.clone(),
            });
        }
    }

    fn notify(&self, party: PartyId, event: &TradeEvent) {
        debug!(%party, ?event, "event delivered");
        if let Ok(mut state) = self.state.lock() {
            state.events.push((party, event.clone()));
        }
    }
}
