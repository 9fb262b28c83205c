//! The Quantity value object.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use labstock_core::{EngineError, EngineResult, ValueObject};

use crate::unit::Unit;

/// An immutable physical quantity: a decimal magnitude tagged with a unit.
///
/// Arithmetic and conversion are carried out at full decimal precision with
/// no intermediate rounding; rounding for human display is a presentation
/// concern and happens only at the serialization boundary.
///
/// A magnitude may be negative while it is a transient arithmetic delta
/// (e.g. a subtraction result). Negative magnitudes become invalid only at
/// the point a caller commits them onto an inventory item; use
/// [`Quantity::committed`] at that boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quantity {
    #[serde(with = "rust_decimal::serde::str")]
    magnitude: Decimal,
    unit: Unit,
}

impl ValueObject for Quantity {}

impl Quantity {
    /// Create a quantity. No sign constraint; fine for transient deltas.
    pub fn new(magnitude: Decimal, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// Create a quantity destined for an item's committed state.
    ///
    /// Fails with [`EngineError::InvalidQuantity`] for negative magnitudes.
    pub fn committed(magnitude: Decimal, unit: Unit) -> EngineResult<Self> {
        if magnitude < Decimal::ZERO {
            return Err(EngineError::invalid_quantity(format!(
                "committed magnitude cannot be negative: {magnitude} {}",
                unit.symbol()
            )));
        }
        Ok(Self { magnitude, unit })
    }

    pub fn zero(unit: Unit) -> Self {
        Self {
            magnitude: Decimal::ZERO,
            unit,
        }
    }

    pub fn magnitude(&self) -> Decimal {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.magnitude.is_sign_negative() && !self.magnitude.is_zero()
    }

    /// Convert into another unit of the same category, at full precision.
    ///
    /// Fails with [`EngineError::IncompatibleUnits`] across categories, and
    /// with [`EngineError::PrecisionOverflow`] if the magnitude cannot be
    /// carried into the target unit exactly — the engine never rounds, and
    /// it never panics on a well-typed magnitude.
    pub fn convert_to(&self, target: Unit) -> EngineResult<Quantity> {
        if target.category() != self.unit.category() {
            return Err(EngineError::incompatible_units(
                self.unit.id(),
                target.id(),
            ));
        }
        let magnitude = scale_exact(self.magnitude, self.unit, target)?;
        // Scaling back must reproduce the original magnitude bit-for-bit;
        // anything else means the forward scaling lost digits.
        let back = scale_exact(magnitude, target, self.unit)?;
        if back != self.magnitude {
            return Err(EngineError::precision_overflow(format!(
                "{self} is not exactly representable in {}",
                target.symbol()
            )));
        }
        Ok(Quantity {
            magnitude,
            unit: target,
        })
    }

    /// The same quantity expressed in its category's base unit.
    pub fn in_base_unit(&self) -> EngineResult<Quantity> {
        self.convert_to(self.unit.category().base_unit())
    }
}

/// `magnitude * (source factor / target factor)` with overflow checking.
///
/// The checked operators catch magnitudes whose scaled value exceeds the
/// decimal range; silent rounding inside the capacity is caught by the
/// round-trip comparison in [`Quantity::convert_to`].
fn scale_exact(magnitude: Decimal, source: Unit, target: Unit) -> EngineResult<Decimal> {
    magnitude
        .checked_mul(source.factor())
        .and_then(|m| m.checked_div(target.factor()))
        .ok_or_else(|| {
            EngineError::precision_overflow(format!(
                "{magnitude} {} does not fit in {}",
                source.symbol(),
                target.symbol()
            ))
        })
}

/// Canonical serialization: `"<magnitude> <symbol>"`, magnitude in minimal
/// decimal form without superfluous trailing zeros (`999.999 µl`, `251 ml`).
impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude.normalize(), self.unit.symbol())
    }
}
