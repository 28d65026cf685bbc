//! Notifier port: outbound status rendering and event delivery.

use crate::trade::domain::{PartyId, StatusSnapshot, TradeEvent};

/// Rendering and messaging collaborator.
///
/// Called after every state-changing operation. Implementations decide how
/// (and whether) anything is shown.
pub trait TradeNotifier {
    /// Presents the current session status to `party`.
    fn render_status(&self, party: PartyId, snapshot: &StatusSnapshot);

    /// Tells `party` that something happened.
    fn notify(&self, party: PartyId, event: &TradeEvent);
}
