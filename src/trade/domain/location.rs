//! Spatial context used by the co-location predicate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a comparable context (world, dimension, instanced space).
///
/// Parties in different contexts are never co-located, regardless of their
/// coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(String);

impl ContextId {
    /// Creates a context identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// East-west axis.
    pub x: i64,
    /// Vertical axis.
    pub y: i64,
    /// North-south axis.
    pub z: i64,
}

impl Position {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance, saturating at `u128::MAX`.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> u128 {
        let dx = u128::from(self.x.abs_diff(other.x));
        let dy = u128::from(self.y.abs_diff(other.y));
        let dz = u128::from(self.z.abs_diff(other.z));
        (dx * dx).saturating_add(dy * dy).saturating_add(dz * dz)
    }
}

/// A party's whereabouts as reported by the host world.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    context: ContextId,
    position: Position,
}

impl Location {
    /// Creates a location inside `context`.
    #[must_use]
    pub const fn new(context: ContextId, position: Position) -> Self {
        Self { context, position }
    }

    /// Returns the context.
    #[must_use]
    pub const fn context(&self) -> &ContextId {
        &self.context
    }

    /// Returns the coordinates.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns `true` when both locations share a context.
    #[must_use]
    pub fn shares_context(&self, other: &Self) -> bool {
        self.context == other.context
    }

    /// Distance to `other` rounded up to whole units, or `None` across
    /// contexts.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> Option<u64> {
        if !self.shares_context(other) {
            return None;
        }
        let squared = self.position.distance_squared(other.position);
        let floor = squared.isqrt();
        let root = if floor * floor < squared { floor + 1 } else { floor };
        Some(u64::try_from(root).unwrap_or(u64::MAX))
    }

    /// Returns `true` when `other` is in the same context and no further
    /// than `max_distance` units away.
    #[must_use]
    pub fn is_within(&self, other: &Self, max_distance: u32) -> bool {
        let limit = u128::from(max_distance);
        self.shares_context(other)
            && self.position.distance_squared(other.position) <= limit * limit
    }
}
