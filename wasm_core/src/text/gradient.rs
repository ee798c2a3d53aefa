//! CSS gradient string assembly.
use serde::{Deserialize, Serialize};

use crate::calc::round2;
use crate::error::{Result, ToolError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub color: String,
    /// Percentage along the gradient line, clamped to 0..=100.
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gradient {
    #[serde(default)]
    pub kind: GradientKind,
    /// Degrees; only used for linear gradients.
    #[serde(default = "default_angle")]
    pub angle: f64,
    pub stops: Vec<ColorStop>,
}

fn default_angle() -> f64 {
    90.0
}

impl Gradient {
    /// Renders the gradient as a CSS `background` value.
    ///
    /// ```
    /// use toolbox_core::text::gradient::{ColorStop, Gradient, GradientKind};
    /// let gradient = Gradient {
    ///     kind: GradientKind::Linear,
    ///     angle: 45.0,
    ///     stops: vec![
    ///         ColorStop { color: "#ff0000".into(), position: 0.0 },
    ///         ColorStop { color: "#0000ff".into(), position: 100.0 },
    ///     ],
    /// };
    /// assert_eq!(gradient.to_css()?, "linear-gradient(45deg, #ff0000 0%, #0000ff 100%)");
    /// # Ok::<(), toolbox_core::error::ToolError>(())
    /// ```
    pub fn to_css(&self) -> Result<String> {
        if self.stops.len() < 2 {
            return Err(ToolError::invalid("a gradient needs at least two color stops"));
        }
        let mut stops = Vec::with_capacity(self.stops.len());
        for stop in &self.stops {
            let color = stop.color.trim();
            if !is_css_color(color) {
                return Err(ToolError::invalid(format!("invalid color {color}")));
            }
            if !stop.position.is_finite() {
                return Err(ToolError::invalid("stop position must be a number"));
            }
            stops.push((stop.position.clamp(0.0, 100.0), color.to_ascii_lowercase()));
        }
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        let rendered: Vec<String> = stops
            .iter()
            .map(|(pos, color)| format!("{color} {}%", format_number(*pos)))
            .collect();

        Ok(match self.kind {
            GradientKind::Linear => {
                if !self.angle.is_finite() {
                    return Err(ToolError::invalid("angle must be a number"));
                }
                // Wrap after rounding: 359.999 is 0deg.
                let angle = round2(self.angle).rem_euclid(360.0);
                format!(
                    "linear-gradient({}deg, {})",
                    format_number(angle),
                    rendered.join(", ")
                )
            }
            GradientKind::Radial => format!("radial-gradient(circle, {})", rendered.join(", ")),
        })
    }
}

/// Parses the JSON form the UI posts and renders it.
pub fn gradient_css(input: &str) -> Result<String> {
    let gradient: Gradient = serde_json::from_str(input)?;
    gradient.to_css()
}

fn format_number(value: f64) -> String {
    let text = format!("{:.2}", round2(value));
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(...)` and `rgba(...)`.
pub fn is_css_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    let lower = value.to_ascii_lowercase();
    let (inner, expected) = if let Some(rest) = lower.strip_prefix("rgba(") {
        (rest, 4)
    } else if let Some(rest) = lower.strip_prefix("rgb(") {
        (rest, 3)
    } else {
        return false;
    };
    let Some(inner) = inner.strip_suffix(')') else {
        return false;
    };
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != expected {
        return false;
    }
    let channels_ok = parts[..3]
        .iter()
        .all(|p| p.parse::<u16>().is_ok_and(|v| v <= 255));
    let alpha_ok = expected == 3
        || parts[3]
            .parse::<f64>()
            .is_ok_and(|a| (0.0..=1.0).contains(&a));
    channels_ok && alpha_ok
}
