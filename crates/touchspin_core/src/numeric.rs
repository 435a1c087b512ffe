//! Numeric policy
//!
//! Pure functions for step alignment, clamping and decimal rounding. Every
//! function is total: bad inputs fall back to something in range instead of
//! producing NaN or panicking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest number of decimals honoured. f64 carries ~15-17 significant digits.
pub const MAX_DECIMALS: u32 = 15;

/// Quotients this close to an integer count as that integer, so that
/// `0.3 / 0.1` is three steps rather than 2.999...
const QUOTIENT_EPSILON: f64 = 1e-9;

/// Policy for snapping a value that is not on the step grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAlignment {
    /// Nearest grid point, ties go up
    #[default]
    Round,
    Floor,
    Ceil,
    /// Leave the value where it is
    None,
}

impl StepAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepAlignment::Round => "round",
            StepAlignment::Floor => "floor",
            StepAlignment::Ceil => "ceil",
            StepAlignment::None => "none",
        }
    }
}

impl fmt::Display for StepAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StepAlignment {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Ok(StepAlignment::Round),
            "floor" => Ok(StepAlignment::Floor),
            "ceil" => Ok(StepAlignment::Ceil),
            "none" => Ok(StepAlignment::None),
            _ => Err(()),
        }
    }
}

/// Step size with non-positive and non-finite values replaced by `1`
pub fn sanitize_step(step: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step
    } else {
        1.0
    }
}

/// Snap `value` onto the grid `min + n * step` according to `policy`
///
/// `StepAlignment::None` returns `value` untouched. A NaN value snaps to `min`.
pub fn align_to_step(value: f64, min: f64, step: f64, policy: StepAlignment) -> f64 {
    if policy == StepAlignment::None {
        return value;
    }
    if value.is_nan() {
        return min;
    }
    if !value.is_finite() || !min.is_finite() {
        return value;
    }

    let step = sanitize_step(step);
    let mut quotient = (value - min) / step;
    let nearest = quotient.round();
    if (quotient - nearest).abs() < QUOTIENT_EPSILON {
        quotient = nearest;
    }

    let steps = match policy {
        StepAlignment::Round => (quotient + 0.5).floor(),
        StepAlignment::Floor => quotient.floor(),
        StepAlignment::Ceil => quotient.ceil(),
        StepAlignment::None => return value,
    };

    let precision = decimal_places(step).max(decimal_places(min));
    round_to_decimals(min + steps * step, precision)
}

/// Bound `value` to `[min, max]`
///
/// An inverted range collapses onto `min`; NaN maps to `min`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if min > max || value.is_nan() {
        return min;
    }
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Quantize `value` to `decimals` places
pub fn round_to_decimals(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / factor;
    // Avoid "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Largest value at `decimals` places that is not above `value`
pub fn floor_to_decimals(value: f64, decimals: u32) -> f64 {
    quantize(value, decimals, f64::floor)
}

/// Smallest value at `decimals` places that is not below `value`
pub fn ceil_to_decimals(value: f64, decimals: u32) -> f64 {
    quantize(value, decimals, f64::ceil)
}

fn quantize(value: f64, decimals: u32, direction: fn(f64) -> f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals.min(MAX_DECIMALS) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    let nearest = scaled.round();
    let units = if (scaled - nearest).abs() < QUOTIENT_EPSILON {
        nearest
    } else {
        direction(scaled)
    };
    let quantized = units / factor;
    if quantized == 0.0 {
        0.0
    } else {
        quantized
    }
}

/// Whether two values are the same once rounded to `decimals`
pub fn same_at_precision(a: f64, b: f64, decimals: u32) -> bool {
    round_to_decimals(a, decimals) == round_to_decimals(b, decimals)
}

/// Render `value` with exactly `decimals` fractional digits
pub fn format_fixed(value: f64, decimals: u32) -> String {
    let decimals = decimals.min(MAX_DECIMALS);
    format!(
        "{:.*}",
        decimals as usize,
        round_to_decimals(value, decimals)
    )
}

/// Parse a finite number, `None` for empty or malformed text
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `raw`, returning `fallback` for empty or malformed text
pub fn parse_or_fallback(raw: &str, fallback: f64) -> f64 {
    parse_number(raw).unwrap_or(fallback)
}

/// Number of fractional digits in the shortest representation of `value`
pub fn decimal_places(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    let repr = value.to_string();
    match repr.split_once('.') {
        Some((_, fraction)) => u32::try_from(fraction.len()).unwrap_or(u32::MAX).min(MAX_DECIMALS),
        None => 0,
    }
}
