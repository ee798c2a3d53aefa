pub mod bmi;
pub mod percentage;

use crate::error::{Result, ToolError};

/// Rejects NaN and infinities coming from empty or malformed number inputs.
pub(crate) fn ensure_finite(label: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ToolError::invalid(format!("{label} must be a finite number")))
    }
}

/// Rounds to two decimals for display; `-0.00` is normalised to `0.00`.
pub(crate) fn round2(value: f64) -> f64 {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
