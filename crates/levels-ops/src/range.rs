//! Per-channel black and white points.
//!
//! A [`ChannelRange`] maps an input interval `[in_min, in_max]` linearly
//! onto an output interval `[out_min, out_max]`. Bounds are normalized:
//! inputs live in `[-1, 1]`, outputs in `[0, 1]`. A negative input bound
//! means "detect this bound from the frame".
//!
//! # Example
//!
//! ```rust
//! use levels_core::BitDepth;
//! use levels_ops::range::ChannelRange;
//!
//! // Stretch [50/255, 200/255] to the full range
//! let range = ChannelRange::new(50.0 / 255.0, 200.0 / 255.0, 0.0, 1.0);
//! let resolved = range.resolve(BitDepth::U8);
//! assert_eq!(resolved.in_min, Some(50));
//! assert_eq!(resolved.in_max, Some(200));
//! assert_eq!(resolved.out_max, 255);
//!
//! // Auto-detect the black point
//! let auto = ChannelRange::default().with_auto_in_min();
//! assert_eq!(auto.resolve(BitDepth::U16).in_min, None);
//! ```

use crate::{OpsError, OpsResult};
use levels_core::BitDepth;
use serde::{Deserialize, Serialize};

/// Black and white points of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRange {
    /// Input black point, `[-1, 1]`. Negative requests auto-detection.
    pub in_min: f64,
    /// Input white point, `[-1, 1]`. Negative requests auto-detection.
    pub in_max: f64,
    /// Output black point, `[0, 1]`.
    pub out_min: f64,
    /// Output white point, `[0, 1]`.
    pub out_max: f64,
}

impl ChannelRange {
    /// Input bound value that requests auto-detection.
    pub const AUTO: f64 = -1.0;

    /// Creates a range with all four bounds.
    pub fn new(in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> Self {
        Self {
            in_min,
            in_max,
            out_min,
            out_max,
        }
    }

    /// Identity range (`[0, 1] -> [0, 1]`).
    pub fn identity() -> Self {
        Self::new(0.0, 1.0, 0.0, 1.0)
    }

    /// Requests auto-detection of the input black point.
    pub fn with_auto_in_min(mut self) -> Self {
        self.in_min = Self::AUTO;
        self
    }

    /// Requests auto-detection of the input white point.
    pub fn with_auto_in_max(mut self) -> Self {
        self.in_max = Self::AUTO;
        self
    }

    /// Checks bound domains: inputs in `[-1, 1]`, outputs in `[0, 1]`.
    pub fn validate(&self) -> OpsResult<()> {
        check_bound("in_min", self.in_min, -1.0, 1.0)?;
        check_bound("in_max", self.in_max, -1.0, 1.0)?;
        check_bound("out_min", self.out_min, 0.0, 1.0)?;
        check_bound("out_max", self.out_max, 0.0, 1.0)?;
        Ok(())
    }

    /// Converts the bounds to the integer domain of `depth`.
    ///
    /// Each bound is scaled by `2^bits - 1` and rounded to nearest, ties
    /// to even. Input bounds that resolve negative become `None`
    /// (auto-detect). Bounds that round to zero are explicit, so tiny
    /// negative values do not trigger detection.
    pub fn resolve(&self, depth: BitDepth) -> ResolvedRange {
        let scale = depth.max_value() as f64;
        let to_int = |v: f64| (v * scale).round_ties_even() as i32;
        let explicit = |v: i32| (v >= 0).then_some(v);

        ResolvedRange {
            in_min: explicit(to_int(self.in_min)),
            in_max: explicit(to_int(self.in_max)),
            out_min: to_int(self.out_min),
            out_max: to_int(self.out_max),
        }
    }

    /// Returns `true` if this range leaves values unchanged.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self::identity()
    }
}

/// A [`ChannelRange`] in the integer domain of one bit depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// Input black point, or `None` to scan the frame minimum.
    pub in_min: Option<i32>,
    /// Input white point, or `None` to scan the frame maximum.
    pub in_max: Option<i32>,
    /// Output black point.
    pub out_min: i32,
    /// Output white point.
    pub out_max: i32,
}

fn check_bound(name: &str, v: f64, lo: f64, hi: f64) -> OpsResult<()> {
    if !v.is_finite() || v < lo || v > hi {
        return Err(OpsError::InvalidParameter(format!(
            "{name} = {v} outside [{lo}, {hi}]"
        )));
    }
    Ok(())
}
