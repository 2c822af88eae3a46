//! Adjustment parameters.
//!
//! [`AdjustmentParams`] is the slider state fed to the
//! [`AdjustmentPipeline`](crate::pipeline::AdjustmentPipeline). Values are
//! clamped to their ranges, never rejected. Non-finite input falls back to
//! the parameter's neutral value.
//!
//! Individual parameters can also be addressed by name through
//! [`AdjustmentParam`], which is how a UI or a config file refers to them.
//!
//! # Example
//!
//! ```rust
//! use retouch_ops::params::{AdjustmentParam, AdjustmentParams};
//!
//! let mut params = AdjustmentParams::default();
//! assert!(params.is_neutral());
//!
//! let p: AdjustmentParam = "Brightness".parse().unwrap();
//! params.set(p, 250.0);
//! assert_eq!(params.brightness, 200.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::OpsError;

/// Slider state for one edit.
///
/// Percent-style fields (brightness, contrast, saturation) are neutral at
/// 100; everything else is neutral at 0. Missing fields deserialize to
/// neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentParams {
    /// Channel scale in percent, [0, 200].
    pub brightness: f64,
    /// Contrast around mid-gray in percent, [0, 200].
    pub contrast: f64,
    /// Distance from luma in percent, [0, 200].
    pub saturation: f64,
    /// Hue rotation in degrees, [-180, 180].
    pub hue: f64,
    /// Exposure in hundredths of a stop, [-100, 100].
    pub exposure: f64,
    /// Warm (+) / cool (-) shift, [-100, 100].
    pub temperature: f64,
    /// Box blur radius, [0, 20].
    pub blur: f64,
    /// Sharpen strength in percent, [0, 100].
    pub sharpen: f64,
    /// Vignette strength, [-100, 100]; only positive values darken.
    pub vignette: f64,
    /// Noise amplitude, [0, 100].
    pub noise: f64,
}

impl Default for AdjustmentParams {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            hue: 0.0,
            exposure: 0.0,
            temperature: 0.0,
            blur: 0.0,
            sharpen: 0.0,
            vignette: 0.0,
            noise: 0.0,
        }
    }
}

impl AdjustmentParams {
    /// All parameters at their neutral values.
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Reads one parameter.
    pub fn get(&self, param: AdjustmentParam) -> f64 {
        match param {
            AdjustmentParam::Brightness => self.brightness,
            AdjustmentParam::Contrast => self.contrast,
            AdjustmentParam::Saturation => self.saturation,
            AdjustmentParam::Hue => self.hue,
            AdjustmentParam::Exposure => self.exposure,
            AdjustmentParam::Temperature => self.temperature,
            AdjustmentParam::Blur => self.blur,
            AdjustmentParam::Sharpen => self.sharpen,
            AdjustmentParam::Vignette => self.vignette,
            AdjustmentParam::Noise => self.noise,
        }
    }

    fn slot(&mut self, param: AdjustmentParam) -> &mut f64 {
        match param {
            AdjustmentParam::Brightness => &mut self.brightness,
            AdjustmentParam::Contrast => &mut self.contrast,
            AdjustmentParam::Saturation => &mut self.saturation,
            AdjustmentParam::Hue => &mut self.hue,
            AdjustmentParam::Exposure => &mut self.exposure,
            AdjustmentParam::Temperature => &mut self.temperature,
            AdjustmentParam::Blur => &mut self.blur,
            AdjustmentParam::Sharpen => &mut self.sharpen,
            AdjustmentParam::Vignette => &mut self.vignette,
            AdjustmentParam::Noise => &mut self.noise,
        }
    }

    /// Writes one parameter, clamped to its range.
    pub fn set(&mut self, param: AdjustmentParam, value: f64) {
        *self.slot(param) = param.sanitize(value);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, param: AdjustmentParam, value: f64) -> Self {
        self.set(param, value);
        self
    }

    /// Returns a copy with every field clamped and non-finite fields reset.
    pub fn sanitized(&self) -> Self {
        let mut out = *self;
        for p in AdjustmentParam::ALL {
            out.set(p, self.get(p));
        }
        out
    }

    /// `true` if applying these parameters would leave a buffer unchanged.
    pub fn is_neutral(&self) -> bool {
        let s = self.sanitized();
        AdjustmentParam::ALL.iter().all(|&p| p.is_neutral_value(s.get(p)))
    }

    /// `true` if any per-pixel color stage is active.
    pub fn has_color_stages(&self) -> bool {
        AdjustmentParam::COLOR.iter().any(|&p| !p.is_neutral_value(self.get(p)))
    }
}

/// Names one field of [`AdjustmentParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentParam {
    /// Brightness.
    Brightness,
    /// Contrast.
    Contrast,
    /// Saturation.
    Saturation,
    /// Hue.
    Hue,
    /// Exposure.
    Exposure,
    /// Temperature.
    Temperature,
    /// Blur.
    Blur,
    /// Sharpen.
    Sharpen,
    /// Vignette.
    Vignette,
    /// Noise.
    Noise,
}

impl AdjustmentParam {
    /// Every parameter, in pipeline order.
    pub const ALL: [AdjustmentParam; 10] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Hue,
        Self::Exposure,
        Self::Temperature,
        Self::Blur,
        Self::Sharpen,
        Self::Vignette,
        Self::Noise,
    ];

    /// The per-pixel color stages, in application order.
    pub const COLOR: [AdjustmentParam; 6] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Hue,
        Self::Exposure,
        Self::Temperature,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturation",
            Self::Hue => "hue",
            Self::Exposure => "exposure",
            Self::Temperature => "temperature",
            Self::Blur => "blur",
            Self::Sharpen => "sharpen",
            Self::Vignette => "vignette",
            Self::Noise => "noise",
        }
    }

    /// Value that leaves the image unchanged.
    pub fn neutral(self) -> f64 {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => 100.0,
            _ => 0.0,
        }
    }

    /// Inclusive `(min, max)` slider range.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => (0.0, 200.0),
            Self::Hue => (-180.0, 180.0),
            Self::Exposure | Self::Temperature | Self::Vignette => (-100.0, 100.0),
            Self::Blur => (0.0, 20.0),
            Self::Sharpen | Self::Noise => (0.0, 100.0),
        }
    }

    /// Clamps `value` into range; non-finite values become neutral.
    pub fn sanitize(self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.neutral();
        }
        let (lo, hi) = self.range();
        value.clamp(lo, hi)
    }

    /// `true` if `value` leaves the buffer unchanged for this stage.
    ///
    /// Vignette below zero and blur that rounds to radius 0 count as neutral.
    pub fn is_neutral_value(self, value: f64) -> bool {
        match self {
            Self::Vignette => value <= 0.0,
            Self::Blur => value.round() <= 0.0,
            _ => value == self.neutral(),
        }
    }
}

impl fmt::Display for AdjustmentParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdjustmentParam {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| OpsError::UnknownParameter(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let p = AdjustmentParams::default();
        assert!(p.is_neutral());
        assert!(!p.has_color_stages());
        for param in AdjustmentParam::ALL {
            assert_eq!(p.get(param), param.neutral());
        }
    }

    #[test]
    fn test_set_clamps_and_resets_non_finite() {
        let mut p = AdjustmentParams::default();
        p.set(AdjustmentParam::Hue, 400.0);
        assert_eq!(p.hue, 180.0);
        p.set(AdjustmentParam::Blur, -3.0);
        assert_eq!(p.blur, 0.0);
        p.set(AdjustmentParam::Contrast, f64::NAN);
        assert_eq!(p.contrast, 100.0);
        p.set(AdjustmentParam::Noise, f64::INFINITY);
        assert_eq!(p.noise, 0.0);
    }

    #[test]
    fn test_sanitized_fixes_direct_writes() {
        let p = AdjustmentParams {
            saturation: 900.0,
            exposure: f64::NEG_INFINITY,
            ..Default::default()
        };
        let s = p.sanitized();
        assert_eq!(s.saturation, 200.0);
        assert_eq!(s.exposure, 0.0);
    }

    #[test]
    fn test_negative_vignette_is_neutral() {
        let p = AdjustmentParams::default().with(AdjustmentParam::Vignette, -40.0);
        assert_eq!(p.vignette, -40.0);
        assert!(p.is_neutral());
        // Tiny blur rounds to radius 0
        assert!(AdjustmentParams::default().with(AdjustmentParam::Blur, 0.4).is_neutral());
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("hue".parse::<AdjustmentParam>().unwrap(), AdjustmentParam::Hue);
        assert_eq!(" NOISE ".parse::<AdjustmentParam>().unwrap(), AdjustmentParam::Noise);
        assert_eq!(
            "gamma".parse::<AdjustmentParam>(),
            Err(OpsError::UnknownParameter("gamma".into()))
        );
        for p in AdjustmentParam::ALL {
            assert_eq!(p.to_string().parse::<AdjustmentParam>().unwrap(), p);
        }
    }

    #[test]
    fn test_partial_yaml_defaults_to_neutral() {
        let p: AdjustmentParams = serde_yaml::from_str("contrast: 130\nvignette: 20\n").unwrap();
        assert_eq!(p.contrast, 130.0);
        assert_eq!(p.vignette, 20.0);
        assert_eq!(p.brightness, 100.0);
        assert_eq!(p.noise, 0.0);
    }
}
