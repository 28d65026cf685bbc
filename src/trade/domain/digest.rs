//! SHA-256 fingerprint of a session's terms.

use super::{OfferLine, TradeOffer};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::{self, Write as _};

/// Fingerprint of both offers' lines at one instant.
///
/// A confirmation is recorded against the digest current at the time, so a
/// commit can prove both parties agreed to exactly the terms being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermsDigest([u8; 32]);

impl TermsDigest {
    /// Digests two offers in session order.
    #[must_use]
    pub fn of(first: &TradeOffer, second: &TradeOffer) -> Self {
        let mut hasher = Sha256::new();
        for offer in [first, second] {
            hasher.update(offer.owner().into_inner().as_bytes());
            update_field(&mut hasher, &offer.lines().len().to_string());
            for line in offer.lines() {
                update_line(&mut hasher, line);
            }
        }
        Self(hasher.finalize().into())
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First eight hex characters, for compact display.
    #[must_use]
    pub fn short(&self) -> String {
        self.to_string().chars().take(8).collect()
    }
}

fn update_line(hasher: &mut Sha256, line: &OfferLine) {
    let descriptor = line.descriptor();
    update_field(hasher, descriptor.kind());
    update_field(hasher, &descriptor.attributes().len().to_string());
    for (key, value) in descriptor.attributes() {
        update_field(hasher, key);
        update_field(hasher, value);
    }
    hasher.update([u8::from(descriptor.is_tradeable())]);
    update_field(hasher, &descriptor.max_stack().to_string());
    update_field(hasher, &line.quantity().to_string());
}

/// Length-prefixed so adjacent fields cannot run into each other.
fn update_field(hasher: &mut Sha256, value: &str) {
    hasher.update(value.len().to_string().as_bytes());
    hasher.update(b":");
    hasher.update(value.as_bytes());
}

impl fmt::Display for TermsDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = String::with_capacity(64);
        for byte in self.0 {
            write!(rendered, "{byte:02x}")?;
        }
        f.write_str(&rendered)
    }
}
