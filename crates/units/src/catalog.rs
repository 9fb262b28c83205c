//! Static unit registry.

use labstock_core::{EngineError, EngineResult};

use crate::category::UnitCategory;
use crate::unit::Unit;

/// Registry of all known units, keyed by identifier and grouped by category.
pub struct UnitCatalog;

impl UnitCatalog {
    /// Resolve a registry identifier to its unit.
    pub fn lookup(unit_id: &str) -> EngineResult<Unit> {
        Unit::ALL
            .iter()
            .copied()
            .find(|u| u.id() == unit_id)
            .ok_or_else(|| EngineError::unknown_unit(unit_id))
    }

    /// Units of one category, ascending by conversion factor (smallest
    /// physical magnitude first, e.g. picogram before milligram).
    pub fn units_in_category(category: UnitCategory) -> Vec<Unit> {
        let mut units: Vec<Unit> = Unit::ALL
            .iter()
            .copied()
            .filter(|u| u.category() == category)
            .collect();
        units.sort_by(|a, b| a.factor().cmp(&b.factor()));
        units
    }
}
