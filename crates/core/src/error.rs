//! Engine error model.
//!
//! Every variant is a deterministic, caller-fixable failure reported
//! synchronously from the invoking operation. Infrastructure concerns
//! (storage, transport, locking) belong to the surrounding layers.

use thiserror::Error;

/// Result type used across the engine.
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine-level error.
///
/// Operations return these before any mutation is applied; a failed
/// operation never leaves a partially-updated snapshot behind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Unit identifier not registered in the catalog.
    #[error("unknown unit: {unit_id}")]
    UnknownUnit { unit_id: String },

    /// Arithmetic or conversion attempted across differing unit categories.
    #[error("incompatible units: {left} vs {right}")]
    IncompatibleUnits { left: String, right: String },

    /// Attempt to commit an invalid (e.g. negative) magnitude to an item.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Transfer or subtraction would drive a committed quantity negative.
    #[error("insufficient quantity: available {available}, requested {requested}")]
    InsufficientQuantity {
        available: String,
        requested: String,
    },

    /// A computation exceeded the representable decimal precision; the
    /// result would have to be rounded or cannot be represented at all.
    #[error("precision overflow: {0}")]
    PrecisionOverflow(String),

    /// Split requested with fewer than two parts.
    #[error("invalid split factor: {0} (must be at least 2)")]
    InvalidSplitFactor(u32),

    /// Structural operation targeted an item with live children.
    #[error("operation requires a leaf item: {0}")]
    NonLeafItem(String),

    /// Item identifier not present (or retired) in the hierarchy snapshot.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// A snapshot-level conflict (e.g. duplicate item id on insertion).
    #[error("conflict: {0}")]
    Conflict(String),

    /// An identifier was malformed (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl EngineError {
    pub fn unknown_unit(unit_id: impl Into<String>) -> Self {
        Self::UnknownUnit {
            unit_id: unit_id.into(),
        }
    }

    pub fn incompatible_units(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self::IncompatibleUnits {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn insufficient_quantity(
        available: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::InsufficientQuantity {
            available: available.into(),
            requested: requested.into(),
        }
    }

    pub fn precision_overflow(msg: impl Into<String>) -> Self {
        Self::PrecisionOverflow(msg.into())
    }

    pub fn non_leaf_item(id: impl Into<String>) -> Self {
        Self::NonLeafItem(id.into())
    }

    pub fn item_not_found(id: impl Into<String>) -> Self {
        Self::ItemNotFound(id.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
