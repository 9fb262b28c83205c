//! Pure quantity arithmetic.
//!
//! All functions are total over well-typed inputs and side-effect free. The
//! result of `add`/`subtract` always carries the **first operand's unit**;
//! there is no "smallest unit" normalization.

use core::cmp::Ordering;

use labstock_core::{EngineError, EngineResult};

use crate::quantity::Quantity;

/// `a + b`, with `b` converted into `a`'s unit first.
///
/// Fails with `IncompatibleUnits` if the categories differ, and with
/// `PrecisionOverflow` if the sum exceeds the representable decimal range
/// (never a panic, never a silently rounded result).
pub fn add(a: Quantity, b: Quantity) -> EngineResult<Quantity> {
    let b = b.convert_to(a.unit())?;
    let magnitude = a
        .magnitude()
        .checked_add(b.magnitude())
        .ok_or_else(|| EngineError::precision_overflow(format!("cannot add {b} to {a}")))?;
    Ok(Quantity::new(magnitude, a.unit()))
}

/// `a - b`, with `b` converted into `a`'s unit first.
///
/// May yield a negative magnitude: valid as a transient delta, invalid to
/// commit onto an item.
pub fn subtract(a: Quantity, b: Quantity) -> EngineResult<Quantity> {
    let b = b.convert_to(a.unit())?;
    let magnitude = a
        .magnitude()
        .checked_sub(b.magnitude())
        .ok_or_else(|| EngineError::precision_overflow(format!("cannot subtract {b} from {a}")))?;
    Ok(Quantity::new(magnitude, a.unit()))
}

/// Order two quantities after conversion to a common unit.
pub fn compare(a: Quantity, b: Quantity) -> EngineResult<Ordering> {
    let b = b.convert_to(a.unit())?;
    Ok(a.magnitude().cmp(&b.magnitude()))
}
