//! Trade configuration.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default co-location radius in world units.
pub const DEFAULT_MAX_TRADE_DISTANCE: u32 = 10;

/// Tunables for the trade services.
///
/// Every field has a default, so a partial JSON document is enough.
///
/// # Examples
///
/// ```
/// use tradepost::trade::config::TradeConfig;
///
/// let config = TradeConfig::default();
/// assert_eq!(config.max_trade_distance, 10);
/// assert!(config.session_ttl_secs.is_none());
///
/// let parsed = TradeConfig::from_json(r#"{"session_ttl_secs": 300}"#)?;
/// assert_eq!(parsed.session_ttl_secs, Some(300));
/// assert_eq!(parsed.max_trade_distance, 10);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeConfig {
    /// Maximum distance between parties, checked on request and on commit.
    pub max_trade_distance: u32,
    /// Age after which an unanswered request is dropped. `None` disables
    /// request expiry.
    pub pending_request_ttl_secs: Option<u64>,
    /// Age after which an uncommitted session is cancelled. `None` disables
    /// session expiry.
    pub session_ttl_secs: Option<u64>,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            max_trade_distance: DEFAULT_MAX_TRADE_DISTANCE,
            pending_request_ttl_secs: None,
            session_ttl_secs: None,
        }
    }
}

impl TradeConfig {
    /// Parses a JSON document, falling back to defaults for missing keys.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] for malformed input.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }

    /// Sets the co-location radius.
    #[must_use]
    pub const fn with_max_trade_distance(mut self, distance: u32) -> Self {
        self.max_trade_distance = distance;
        self
    }

    /// Enables pending request expiry.
    #[must_use]
    pub const fn with_pending_request_ttl_secs(mut self, secs: u64) -> Self {
        self.pending_request_ttl_secs = Some(secs);
        self
    }

    /// Enables session expiry.
    #[must_use]
    pub const fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_secs = Some(secs);
        self
    }

    /// Request expiry as a duration.
    #[must_use]
    pub fn pending_request_ttl(&self) -> Option<Duration> {
        self.pending_request_ttl_secs.and_then(seconds)
    }

    /// Session expiry as a duration.
    #[must_use]
    pub fn session_ttl(&self) -> Option<Duration> {
        self.session_ttl_secs.and_then(seconds)
    }
}

fn seconds(secs: u64) -> Option<Duration> {
    i64::try_from(secs).ok().and_then(Duration::try_seconds)
}
