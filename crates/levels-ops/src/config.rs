//! Filter configuration and named runtime options.
//!
//! [`LevelsConfig`] holds the sixteen black/white points (input and output,
//! min and max, for R, G, B and A) and the [`PreserveMode`]. Every value is
//! also reachable by a short option name, so a host can change the
//! configuration between frames:
//!
//! | Option | Meaning | Domain | Default |
//! |--------|---------|--------|---------|
//! | `rimin` `gimin` `bimin` `aimin` | input black point | [-1, 1] | 0 |
//! | `rimax` `gimax` `bimax` `aimax` | input white point | [-1, 1] | 1 |
//! | `romin` `gomin` `bomin` `aomin` | output black point | [0, 1] | 0 |
//! | `romax` `gomax` `bomax` `aomax` | output white point | [0, 1] | 1 |
//! | `preserve` | color preservation | `none lum max avg sum nrm pwr` | `none` |
//!
//! Negative input points request auto-detection from each frame.
//!
//! # Example
//!
//! ```rust
//! use levels_ops::{LevelsConfig, PreserveMode};
//!
//! let mut config = LevelsConfig::default();
//! config.set_option("rimin", "0.1").unwrap();
//! config.set_option("preserve", "lum").unwrap();
//! assert_eq!(config.red.in_min, 0.1);
//! assert_eq!(config.preserve, PreserveMode::Luminance);
//! assert!(config.set_option("romax", "1.5").is_err());
//! ```

use crate::preserve::PreserveMode;
use crate::range::ChannelRange;
use crate::{OpsError, OpsResult};
use levels_core::Channel;
use serde::{Deserialize, Serialize};

/// Which bound of a [`ChannelRange`] an option addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    InMin,
    InMax,
    OutMin,
    OutMax,
}

impl Bound {
    const ALL: [Bound; 4] = [Self::InMin, Self::InMax, Self::OutMin, Self::OutMax];

    fn suffix(self) -> &'static str {
        match self {
            Self::InMin => "imin",
            Self::InMax => "imax",
            Self::OutMin => "omin",
            Self::OutMax => "omax",
        }
    }

    fn field(self, range: &mut ChannelRange) -> &mut f64 {
        match self {
            Self::InMin => &mut range.in_min,
            Self::InMax => &mut range.in_max,
            Self::OutMin => &mut range.out_min,
            Self::OutMax => &mut range.out_max,
        }
    }
}

/// Complete levels configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsConfig {
    /// Red channel range.
    pub red: ChannelRange,
    /// Green channel range.
    pub green: ChannelRange,
    /// Blue channel range.
    pub blue: ChannelRange,
    /// Alpha channel range (ignored for 3-component layouts).
    pub alpha: ChannelRange,
    /// Color preservation mode.
    pub preserve: PreserveMode,
}

impl LevelsConfig {
    /// Name of the preservation option.
    pub const PRESERVE_OPTION: &'static str = "preserve";

    /// Range of `channel`.
    pub fn range(&self, channel: Channel) -> &ChannelRange {
        match channel {
            Channel::Red => &self.red,
            Channel::Green => &self.green,
            Channel::Blue => &self.blue,
            Channel::Alpha => &self.alpha,
        }
    }

    /// Mutable range of `channel`.
    pub fn range_mut(&mut self, channel: Channel) -> &mut ChannelRange {
        match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
            Channel::Alpha => &mut self.alpha,
        }
    }

    /// Sets every channel to `range`.
    pub fn with_all(mut self, range: ChannelRange) -> Self {
        for channel in Channel::ALL {
            *self.range_mut(channel) = range;
        }
        self
    }

    /// Sets the preservation mode.
    pub fn with_preserve(mut self, mode: PreserveMode) -> Self {
        self.preserve = mode;
        self
    }

    /// Validates every bound.
    pub fn validate(&self) -> OpsResult<()> {
        for channel in Channel::ALL {
            self.range(channel).validate().map_err(|e| match e {
                OpsError::InvalidParameter(msg) => {
                    OpsError::InvalidParameter(format!("{channel}: {msg}"))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    /// All option names, ranges first (R, G, B, A for each bound).
    pub fn option_names() -> Vec<String> {
        let mut names: Vec<String> = Bound::ALL
            .iter()
            .flat_map(|b| Channel::ALL.iter().map(move |c| format!("{}{}", c.letter(), b.suffix())))
            .collect();
        names.push(Self::PRESERVE_OPTION.to_string());
        names
    }

    /// Sets one option by name.
    ///
    /// The configuration is left unchanged on error.
    pub fn set_option(&mut self, name: &str, value: &str) -> OpsResult<()> {
        if name == Self::PRESERVE_OPTION {
            self.preserve = value.parse()?;
            return Ok(());
        }

        let (channel, bound) = parse_range_option(name)?;
        let v: f64 = value.trim().parse().map_err(|_| {
            OpsError::InvalidParameter(format!("{name}: '{value}' is not a number"))
        })?;

        let mut range = *self.range(channel);
        *bound.field(&mut range) = v;
        range
            .validate()
            .map_err(|_| OpsError::InvalidParameter(format!("{name} = {v} out of range")))?;
        *self.range_mut(channel) = range;
        Ok(())
    }

    /// Reads one option by name, formatted as it would be set.
    pub fn option(&self, name: &str) -> OpsResult<String> {
        if name == Self::PRESERVE_OPTION {
            return Ok(self.preserve.short_name().to_string());
        }
        let (channel, bound) = parse_range_option(name)?;
        let mut range = *self.range(channel);
        Ok(bound.field(&mut range).to_string())
    }
}

fn parse_range_option(name: &str) -> OpsResult<(Channel, Bound)> {
    let unknown = || OpsError::UnknownOption(name.to_string());
    let mut chars = name.chars();
    let letter = chars.next().ok_or_else(unknown)?;
    let channel = Channel::ALL
        .into_iter()
        .find(|c| c.letter() == letter)
        .ok_or_else(unknown)?;
    let suffix = chars.as_str();
    let bound = Bound::ALL
        .into_iter()
        .find(|b| b.suffix() == suffix)
        .ok_or_else(unknown)?;
    Ok((channel, bound))
}
