//! Unit-aware quantity engine primitives.
//!
//! Deterministic value types and pure arithmetic only — no IO, no storage,
//! no presentation beyond the canonical `"<magnitude> <symbol>"` rendering.

pub mod arithmetic;
pub mod catalog;
pub mod category;
pub mod quantity;
pub mod unit;

pub use catalog::UnitCatalog;
pub use category::UnitCategory;
pub use quantity::Quantity;
pub use unit::Unit;
