//! Percentage calculator.
//!
//! ```
//! use toolbox_core::calc::percentage::{percent_change, percent_of};
//!
//! assert_eq!(percent_of(25.0, 200.0)?.result, 50.0);
//! assert_eq!(percent_change(100.0, 120.0)?.explanation, "100 → 120 = 20.00% increase");
//! # Ok::<(), toolbox_core::error::ToolError>(())
//! ```
use serde::Serialize;

use super::{ensure_finite, round2};
use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PercentageKind {
    PercentOf,
    WhatPercent,
    Change,
    IncreaseBy,
    DecreaseBy,
    Difference,
}

impl PercentageKind {
    pub fn parse(kind: &str) -> Result<Self> {
        match kind.trim() {
            "percentOf" | "percent_of" => Ok(Self::PercentOf),
            "whatPercent" | "what_percent" => Ok(Self::WhatPercent),
            "change" | "percent_change" => Ok(Self::Change),
            "increaseBy" | "increase_by" => Ok(Self::IncreaseBy),
            "decreaseBy" | "decrease_by" => Ok(Self::DecreaseBy),
            "difference" | "percent_difference" => Ok(Self::Difference),
            other => Err(ToolError::invalid(format!(
                "unsupported percentage calculation {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageResult {
    #[serde(rename = "type")]
    pub kind: PercentageKind,
    pub operands: [f64; 2],
    pub result: f64,
    pub explanation: String,
    pub formula: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
}

/// Dispatches on a calculation name coming from the UI form.
pub fn calculate(kind: &str, a: f64, b: f64) -> Result<PercentageResult> {
    match PercentageKind::parse(kind)? {
        PercentageKind::PercentOf => percent_of(a, b),
        PercentageKind::WhatPercent => what_percent(a, b),
        PercentageKind::Change => percent_change(a, b),
        PercentageKind::IncreaseBy => increase_by(a, b),
        PercentageKind::DecreaseBy => decrease_by(a, b),
        PercentageKind::Difference => percent_difference(a, b),
    }
}

/// `percent`% of `value`.
pub fn percent_of(percent: f64, value: f64) -> Result<PercentageResult> {
    let percent = ensure_finite("percentage", percent)?;
    let value = ensure_finite("value", value)?;
    let result = percent / 100.0 * value;
    Ok(PercentageResult {
        kind: PercentageKind::PercentOf,
        operands: [percent, value],
        result,
        explanation: format!("{percent}% of {value} = {}", trim_number(result)),
        formula: "(percentage / 100) × value",
        direction: None,
    })
}

/// `part` is what percent of `whole`.
pub fn what_percent(part: f64, whole: f64) -> Result<PercentageResult> {
    let part = ensure_finite("part", part)?;
    let whole = ensure_finite("whole", whole)?;
    if whole == 0.0 {
        return Err(ToolError::invalid("whole value cannot be zero"));
    }
    let result = part / whole * 100.0;
    Ok(PercentageResult {
        kind: PercentageKind::WhatPercent,
        operands: [part, whole],
        result,
        explanation: format!("{part} is {:.2}% of {whole}", round2(result)),
        formula: "(part / whole) × 100",
        direction: None,
    })
}

/// Relative change from `from` to `to`, signed.
pub fn percent_change(from: f64, to: f64) -> Result<PercentageResult> {
    let from = ensure_finite("original value", from)?;
    let to = ensure_finite("new value", to)?;
    if from == 0.0 {
        return Err(ToolError::invalid(
            "original value cannot be zero for a percentage change",
        ));
    }
    let result = (to - from) / from.abs() * 100.0;
    let direction = if result > 0.0 {
        Direction::Increase
    } else if result < 0.0 {
        Direction::Decrease
    } else {
        Direction::Unchanged
    };
    let explanation = match direction {
        Direction::Increase => format!("{from} → {to} = {:.2}% increase", round2(result)),
        Direction::Decrease => format!("{from} → {to} = {:.2}% decrease", round2(result.abs())),
        Direction::Unchanged => format!("{from} → {to} = no change"),
    };
    Ok(PercentageResult {
        kind: PercentageKind::Change,
        operands: [from, to],
        result,
        explanation,
        formula: "((new - original) / |original|) × 100",
        direction: Some(direction),
    })
}

pub fn increase_by(value: f64, percent: f64) -> Result<PercentageResult> {
    let value = ensure_finite("value", value)?;
    let percent = ensure_finite("percentage", percent)?;
    let result = value * (1.0 + percent / 100.0);
    Ok(PercentageResult {
        kind: PercentageKind::IncreaseBy,
        operands: [value, percent],
        result,
        explanation: format!("{value} + {percent}% = {}", trim_number(result)),
        formula: "value × (1 + percentage / 100)",
        direction: Some(Direction::Increase),
    })
}

pub fn decrease_by(value: f64, percent: f64) -> Result<PercentageResult> {
    let value = ensure_finite("value", value)?;
    let percent = ensure_finite("percentage", percent)?;
    let result = value * (1.0 - percent / 100.0);
    Ok(PercentageResult {
        kind: PercentageKind::DecreaseBy,
        operands: [value, percent],
        result,
        explanation: format!("{value} - {percent}% = {}", trim_number(result)),
        formula: "value × (1 - percentage / 100)",
        direction: Some(Direction::Decrease),
    })
}

/// Symmetric difference relative to the mean of both values.
pub fn percent_difference(a: f64, b: f64) -> Result<PercentageResult> {
    let a = ensure_finite("first value", a)?;
    let b = ensure_finite("second value", b)?;
    let mean = (a + b) / 2.0;
    if mean == 0.0 {
        return Err(ToolError::invalid(
            "values average to zero; percentage difference is undefined",
        ));
    }
    let result = (a - b).abs() / mean.abs() * 100.0;
    Ok(PercentageResult {
        kind: PercentageKind::Difference,
        operands: [a, b],
        result,
        explanation: format!("{a} and {b} differ by {:.2}%", round2(result)),
        formula: "|a - b| / ((a + b) / 2) × 100",
        direction: None,
    })
}

/// Up to two decimals without trailing zeros: `50`, `12.5`, `0.33`.
fn trim_number(value: f64) -> String {
    let text = format!("{:.2}", round2(value));
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
