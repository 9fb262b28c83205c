//! Measurement categories.

use serde::{Deserialize, Serialize};

use crate::unit::Unit;

/// Physical measurement category. Units are compatible for arithmetic iff
/// they belong to the same category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Mass,
    Volume,
    Count,
}

impl UnitCategory {
    /// The canonical base unit of the category (conversion factor 1).
    pub fn base_unit(self) -> Unit {
        match self {
            UnitCategory::Mass => Unit::Gram,
            UnitCategory::Volume => Unit::Litre,
            UnitCategory::Count => Unit::Piece,
        }
    }
}
