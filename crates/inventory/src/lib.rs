//! Inventory hierarchy domain module.
//!
//! This crate contains the quantity-conserving structural operations over a
//! sample/subsample tree, implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage). The surrounding transaction boundary
//! supplies a loaded snapshot and persists the resulting deltas atomically.

pub mod delta;
pub mod hierarchy;
pub mod item;
pub mod ops;

pub use delta::HierarchyDelta;
pub use hierarchy::InventoryHierarchy;
pub use item::InventoryItem;
pub use ops::{
    duplicate, execute, split, transfer, DuplicateItem, OperationOutcome, SplitItem,
    StructuralCommand, TransferQuantity,
};
