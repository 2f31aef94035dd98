//! Color preservation after a levels adjustment.
//!
//! Stretching channels independently shifts hue and brightness. A
//! preservation mode picks a scalar "color" metric `f(R, G, B)`; after the
//! plain per-channel adjustment the RGB triplet is rescaled by
//! `f(original) / f(adjusted)` so the metric of the original pixel is kept.
//!
//! | Mode        | Metric                          |
//! |-------------|---------------------------------|
//! | `luminance` | `0.299 R + 0.587 G + 0.114 B`   |
//! | `max`       | `max(R, G, B)`                  |
//! | `average`   | `(R + G + B) / 3`               |
//! | `sum`       | `R + G + B`                     |
//! | `norm`      | `sqrt(R² + G² + B²)`            |
//! | `power`     | `cbrt(R³ + G³ + B³)`            |
//!
//! The mode is fixed per filter instance, so it is resolved once per frame
//! into a plain function pointer ([`ColorMetric`]) and the pixel loop never
//! matches on the enum.
//!
//! # Example
//!
//! ```rust
//! use levels_ops::preserve::{correction_ratio, PreserveMode};
//!
//! let metric = PreserveMode::Max.metric().unwrap();
//! let ratio = correction_ratio(metric, [100.0, 50.0, 0.0], [200.0, 100.0, 0.0], 255.0);
//! assert_eq!(ratio, 0.5);
//! ```

use crate::{OpsError, OpsResult};
use levels_core::luma_rec601;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar color metric: `f(rgb, max_value)`.
///
/// `max_value` is the largest sample of the bit depth; metrics may use it
/// to keep intermediates small but the ratio between two calls with the
/// same `max_value` does not depend on it.
pub type ColorMetric = fn([f32; 3], f32) -> f32;

/// Which color property to keep when adjusting levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreserveMode {
    /// Plain per-channel adjustment.
    #[default]
    None,
    /// Rec.601 luma.
    #[serde(alias = "lum")]
    Luminance,
    /// Largest component.
    Max,
    /// Mean of the components.
    #[serde(alias = "avg")]
    Average,
    /// Sum of the components.
    Sum,
    /// Euclidean norm.
    #[serde(alias = "nrm")]
    Norm,
    /// Cube-power mean.
    #[serde(alias = "pwr")]
    Power,
}

impl PreserveMode {
    /// Every mode, in option order.
    pub const ALL: [PreserveMode; 7] = [
        Self::None,
        Self::Luminance,
        Self::Max,
        Self::Average,
        Self::Sum,
        Self::Norm,
        Self::Power,
    ];

    /// Canonical name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Luminance => "luminance",
            Self::Max => "max",
            Self::Average => "average",
            Self::Sum => "sum",
            Self::Norm => "norm",
            Self::Power => "power",
        }
    }

    /// Short option name (`lum`, `avg`, `nrm`, `pwr`).
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Luminance => "lum",
            Self::Max => "max",
            Self::Average => "avg",
            Self::Sum => "sum",
            Self::Norm => "nrm",
            Self::Power => "pwr",
        }
    }

    /// Metric for this mode, or `None` when no correction is applied.
    pub fn metric(&self) -> Option<ColorMetric> {
        match self {
            Self::None => None,
            Self::Luminance => Some(luminance as ColorMetric),
            Self::Max => Some(max as ColorMetric),
            Self::Average => Some(average as ColorMetric),
            Self::Sum => Some(sum as ColorMetric),
            Self::Norm => Some(norm as ColorMetric),
            Self::Power => Some(power as ColorMetric),
        }
    }

    /// Correction ratio for one pixel under this mode.
    ///
    /// Always `1.0` for [`PreserveMode::None`].
    pub fn ratio(&self, original: [f32; 3], adjusted: [f32; 3], max_value: f32) -> f32 {
        match self.metric() {
            Some(metric) => correction_ratio(metric, original, adjusted, max_value),
            None => 1.0,
        }
    }
}

impl fmt::Display for PreserveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PreserveMode {
    type Err = OpsError;

    fn from_str(s: &str) -> OpsResult<Self> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name() == lower || m.short_name() == lower)
            .ok_or_else(|| {
                OpsError::InvalidParameter(format!(
                    "preserve mode '{s}' (expected none, lum, max, avg, sum, nrm or pwr)"
                ))
            })
    }
}

/// Ratio `f(original) / f(adjusted)`.
///
/// When the adjusted metric is not positive (black pixel, or NaN) the
/// adjustment is kept as is and the ratio is `1.0`.
#[inline]
pub fn correction_ratio(
    metric: ColorMetric,
    original: [f32; 3],
    adjusted: [f32; 3],
    max_value: f32,
) -> f32 {
    let icolor = metric(original, max_value);
    let ocolor = metric(adjusted, max_value);
    if ocolor > 0.0 { icolor / ocolor } else { 1.0 }
}

#[inline]
fn luminance(rgb: [f32; 3], _max: f32) -> f32 {
    luma_rec601(rgb)
}

#[inline]
fn max(rgb: [f32; 3], _max: f32) -> f32 {
    rgb[0].max(rgb[1]).max(rgb[2])
}

#[inline]
fn average(rgb: [f32; 3], _max: f32) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}

#[inline]
fn sum(rgb: [f32; 3], _max: f32) -> f32 {
    rgb[0] + rgb[1] + rgb[2]
}

#[inline]
fn norm(rgb: [f32; 3], max: f32) -> f32 {
    let [r, g, b] = rgb.map(|c| c / max);
    (r * r + g * g + b * b).sqrt()
}

#[inline]
fn power(rgb: [f32; 3], max: f32) -> f32 {
    let [r, g, b] = rgb.map(|c| c / max);
    (r * r * r + g * g * g + b * b * b).cbrt()
}
