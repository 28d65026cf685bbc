//! Asset descriptors: the identity key deciding which units merge and stack.

use super::TradeDomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Marks whether an asset came from the world or was constructed by a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetOrigin {
    /// A regular world asset that may be offered.
    Tradeable,
    /// A UI-constructed marker (buttons, dividers, status panes).
    System,
}

/// Identity key for a kind of resource unit.
///
/// Two units are "the same kind" exactly when their descriptors are equal.
/// Quantity and cosmetic data (display names, tooltips) are deliberately not
/// part of the descriptor. Identity attributes live in an ordered map so
/// equality and hashing do not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetDescriptor {
    kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
    origin: AssetOrigin,
    max_stack: u32,
}

impl AssetDescriptor {
    /// Creates a tradeable descriptor for `kind` stacking up to `max_stack`
    /// units per slot.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::EmptyAssetKind`] when the kind is blank
    /// and [`TradeDomainError::ZeroStackLimit`] when `max_stack` is zero.
    pub fn new(kind: impl Into<String>, max_stack: u32) -> Result<Self, TradeDomainError> {
        let raw = kind.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TradeDomainError::EmptyAssetKind);
        }
        if max_stack == 0 {
            return Err(TradeDomainError::ZeroStackLimit(trimmed.to_owned()));
        }
        Ok(Self {
            kind: trimmed.to_owned(),
            attributes: BTreeMap::new(),
            origin: AssetOrigin::Tradeable,
            max_stack,
        })
    }

    /// Creates a non-stackable system marker descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDomainError::EmptyAssetKind`] when the kind is blank.
    pub fn system(kind: impl Into<String>) -> Result<Self, TradeDomainError> {
        let mut descriptor = Self::new(kind, 1)?;
        descriptor.origin = AssetOrigin::System;
        Ok(descriptor)
    }

    /// Adds an identity attribute (enchantment, durability, variant, ...).
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the asset kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the identity attributes.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns the asset origin marker.
    #[must_use]
    pub const fn origin(&self) -> AssetOrigin {
        self.origin
    }

    /// Returns the number of units a single slot can hold.
    #[must_use]
    pub const fn max_stack(&self) -> u32 {
        self.max_stack
    }

    /// Returns `true` unless the descriptor carries the system marker.
    #[must_use]
    pub const fn is_tradeable(&self) -> bool {
        matches!(self.origin, AssetOrigin::Tradeable)
    }
}

impl fmt::Display for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.attributes.is_empty() {
            return Ok(());
        }
        let rendered: Vec<String> = self
            .attributes
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        write!(f, "[{}]", rendered.join(","))
    }
}
