//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value** — two with the
/// same attribute values are equal. A `Quantity { 100, Millilitre }` is a
/// value object; an inventory item with an `ItemId` is an entity.
///
/// To "modify" a value object, create a new one with the new values. This
/// keeps them safe to share across threads and gives them the semantics of
/// primitives (copyable, comparable).
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
