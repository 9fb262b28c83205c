//! The closed set of registered units.
//!
//! Units and categories are compile-time-enumerable; conversion factors are
//! static decimal tables, not runtime-registered state.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::category::UnitCategory;

/// A registered unit of measurement.
///
/// Each unit carries a registry identifier (stable, storage-facing), a
/// display symbol, its category, a decimal conversion factor to the
/// category's base unit, and the minimum precision (decimal places) at which
/// it is displayed and at which split parts are truncated.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    // Mass (base: Gram)
    Picogram,
    Nanogram,
    Microgram,
    Milligram,
    Gram,
    Kilogram,
    // Volume (base: Litre)
    Picolitre,
    Nanolitre,
    Microlitre,
    Millilitre,
    Litre,
    // Count (base: Piece)
    Piece,
}

impl Unit {
    /// Every registered unit, grouped by category, ascending by factor.
    pub const ALL: [Unit; 12] = [
        Unit::Picogram,
        Unit::Nanogram,
        Unit::Microgram,
        Unit::Milligram,
        Unit::Gram,
        Unit::Kilogram,
        Unit::Picolitre,
        Unit::Nanolitre,
        Unit::Microlitre,
        Unit::Millilitre,
        Unit::Litre,
        Unit::Piece,
    ];

    /// Stable registry identifier, as used by storage and request payloads.
    pub fn id(self) -> &'static str {
        match self {
            Unit::Picogram => "PICOGRAM",
            Unit::Nanogram => "NANOGRAM",
            Unit::Microgram => "MICROGRAM",
            Unit::Milligram => "MILLIGRAM",
            Unit::Gram => "GRAM",
            Unit::Kilogram => "KILOGRAM",
            Unit::Picolitre => "PICO_LITRE",
            Unit::Nanolitre => "NANO_LITRE",
            Unit::Microlitre => "MICRO_LITRE",
            Unit::Millilitre => "MILLI_LITRE",
            Unit::Litre => "LITRE",
            Unit::Piece => "PIECE",
        }
    }

    /// Display symbol used in the canonical quantity rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Picogram => "pg",
            Unit::Nanogram => "ng",
            Unit::Microgram => "µg",
            Unit::Milligram => "mg",
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Picolitre => "pl",
            Unit::Nanolitre => "nl",
            Unit::Microlitre => "µl",
            Unit::Millilitre => "ml",
            Unit::Litre => "l",
            Unit::Piece => "pcs",
        }
    }

    pub fn category(self) -> UnitCategory {
        match self {
            Unit::Picogram
            | Unit::Nanogram
            | Unit::Microgram
            | Unit::Milligram
            | Unit::Gram
            | Unit::Kilogram => UnitCategory::Mass,
            Unit::Picolitre
            | Unit::Nanolitre
            | Unit::Microlitre
            | Unit::Millilitre
            | Unit::Litre => UnitCategory::Volume,
            Unit::Piece => UnitCategory::Count,
        }
    }

    /// Conversion factor to the category's base unit.
    pub fn factor(self) -> Decimal {
        match self {
            Unit::Picogram | Unit::Picolitre => dec!(0.000000000001),
            Unit::Nanogram | Unit::Nanolitre => dec!(0.000000001),
            Unit::Microgram | Unit::Microlitre => dec!(0.000001),
            Unit::Milligram | Unit::Millilitre => dec!(0.001),
            Unit::Gram | Unit::Litre | Unit::Piece => dec!(1),
            Unit::Kilogram => dec!(1000),
        }
    }

    /// Minimum display precision in decimal places.
    ///
    /// Split parts are truncated to this precision (the last part absorbs
    /// the remainder); counts are always whole.
    pub fn display_precision(self) -> u32 {
        match self.category() {
            UnitCategory::Count => 0,
            UnitCategory::Mass | UnitCategory::Volume => 3,
        }
    }
}

impl core::fmt::Display for Unit {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.symbol())
    }
}
