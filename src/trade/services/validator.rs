//! Stateless eligibility checks shared by request handling and commit.

use thiserror::Error;

use crate::trade::{config::TradeConfig, domain::PartyId, ports::TradeWorld};

/// Why a trade request was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestRejection {
    /// The target is absent or unreachable.
    #[error("party {0} is not available")]
    TargetUnavailable(PartyId),

    /// A party asked to trade with itself.
    #[error("a party cannot trade with itself")]
    SelfTrade,

    /// The parties are in contexts that cannot be compared.
    #[error("parties {requester} and {target} are in different contexts")]
    ContextMismatch {
        /// Requesting party.
        requester: PartyId,
        /// Requested party.
        target: PartyId,
    },

    /// The parties are further apart than allowed.
    #[error("parties are {distance} units apart, the limit is {max_distance}")]
    TooFar {
        /// Current distance in whole units.
        distance: u64,
        /// Configured limit.
        max_distance: u32,
    },
}

/// Identity, context, and co-location predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeValidator {
    max_distance: u32,
}

impl TradeValidator {
    /// Creates a validator with the given co-location radius.
    #[must_use]
    pub const fn new(max_distance: u32) -> Self {
        Self { max_distance }
    }

    /// Creates a validator from configuration.
    #[must_use]
    pub const fn from_config(config: &TradeConfig) -> Self {
        Self::new(config.max_trade_distance)
    }

    /// Returns the co-location radius.
    #[must_use]
    pub const fn max_distance(&self) -> u32 {
        self.max_distance
    }

    /// Checks whether `requester` may ask `target` to trade.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`RequestRejection`], checked in the order
    /// availability, identity, context, distance.
    pub fn validate_request<W: TradeWorld + ?Sized>(
        &self,
        world: &W,
        requester: PartyId,
        target: PartyId,
    ) -> Result<(), RequestRejection> {
        if !world.is_reachable(target) {
            return Err(RequestRejection::TargetUnavailable(target));
        }
        if requester == target {
            return Err(RequestRejection::SelfTrade);
        }
        let (Some(from), Some(to)) = (world.location(requester), world.location(target)) else {
            return Err(RequestRejection::ContextMismatch { requester, target });
        };
        let Some(distance) = from.distance_to(&to) else {
            return Err(RequestRejection::ContextMismatch { requester, target });
        };
        if !from.is_within(&to, self.max_distance) {
            return Err(RequestRejection::TooFar {
                distance,
                max_distance: self.max_distance,
            });
        }
        Ok(())
    }

    /// Returns `true` when both parties are known, share a context, and are
    /// within range. Re-evaluated on every call.
    #[must_use]
    pub fn co_located<W: TradeWorld + ?Sized>(&self, world: &W, first: PartyId, second: PartyId) -> bool {
        match (world.location(first), world.location(second)) {
            (Some(a), Some(b)) => a.is_within(&b, self.max_distance),
            _ => false,
        }
    }
}
