use serde::Serialize;

use super::{ensure_finite, round2};
use crate::error::{Result, ToolError};

const HEALTHY_MIN: f64 = 18.5;
const HEALTHY_MAX: f64 = 24.9;
const IMPERIAL_FACTOR: f64 = 703.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Kilograms and centimetres.
    Metric,
    /// Pounds and inches.
    Imperial,
}

impl UnitSystem {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            other => Err(ToolError::invalid(format!("unsupported unit system {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < HEALTHY_MIN {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiResult {
    pub bmi: f64,
    pub category: BmiCategory,
    pub unit_system: UnitSystem,
    /// Weight range (in the input unit) that lands in the normal category
    /// for this height.
    pub healthy_weight_range: [f64; 2],
}

/// Weight in kg/lb, height in cm/in depending on `units`.
pub fn calculate_bmi(weight: f64, height: f64, units: UnitSystem) -> Result<BmiResult> {
    let weight = ensure_finite("weight", weight)?;
    let height = ensure_finite("height", height)?;
    if weight <= 0.0 || height <= 0.0 {
        return Err(ToolError::invalid("weight and height must be positive"));
    }

    let (bmi, weight_for) = match units {
        UnitSystem::Metric => {
            let meters = height / 100.0;
            let area = meters * meters;
            (weight / area, area)
        }
        UnitSystem::Imperial => {
            let area = height * height;
            (IMPERIAL_FACTOR * weight / area, area / IMPERIAL_FACTOR)
        }
    };

    Ok(BmiResult {
        bmi: round2(bmi),
        category: BmiCategory::from_bmi(bmi),
        unit_system: units,
        healthy_weight_range: [
            round2(HEALTHY_MIN * weight_for),
            round2(HEALTHY_MAX * weight_for),
        ],
    })
}
