//! Pending trade requests.

use super::PartyId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unanswered request from `requester` to `target`.
///
/// A target holds at most one inbound request; a newer one replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    /// Party that asked to trade.
    pub requester: PartyId,
    /// Party that was asked.
    pub target: PartyId,
    /// When the request was recorded.
    pub requested_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Creates a pending request.
    #[must_use]
    pub const fn new(requester: PartyId, target: PartyId, requested_at: DateTime<Utc>) -> Self {
        Self {
            requester,
            target,
            requested_at,
        }
    }

    /// Returns `true` when `party` sent or received this request.
    #[must_use]
    pub fn involves(&self, party: PartyId) -> bool {
        self.requester == party || self.target == party
    }
}
