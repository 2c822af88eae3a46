//! Named filters.
//!
//! A [`FilterCatalog`] maps names to [`Filter`] trait objects, keeping
//! registration order for display. Built-in and user filters go through the
//! same trait, and anything `Fn(&PixelBuffer) -> OpsResult<PixelBuffer>`
//! already implements it.
//!
//! Most built-ins are [`Look`]s: short chains of [`ToneStep`]s applied per
//! pixel in order. Looks are serde-friendly so a config file can define new
//! ones.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::catalog::FilterCatalog;
//! use retouch_ops::parallel::map_pixels;
//! use retouch_ops::OpsResult;
//!
//! let mut catalog = FilterCatalog::with_builtins();
//! let gray = PixelBuffer::filled(2, 2, [128, 128, 128, 255]).unwrap();
//! let out = catalog.apply("invert", &gray).unwrap();
//! assert_eq!(out.get(0, 0).unwrap(), [127, 127, 127, 255]);
//!
//! catalog.register("swap", "Swap R/B", |src: &PixelBuffer| -> OpsResult<PixelBuffer> {
//!     Ok(map_pixels(src, |[r, g, b, a]| [b, g, r, a]))
//! });
//! assert!(catalog.contains("swap"));
//! ```

use std::fmt;
use std::sync::Arc;

use retouch_core::pixel::clamp_unit;
use retouch_core::PixelBuffer;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::color;
use crate::composite::mix;
use crate::filter::{convolve, gaussian_blur, Kernel};
use crate::parallel::map_pixels;
use crate::{OpsError, OpsResult};

/// A buffer-to-buffer transform.
pub trait Filter: Send + Sync {
    /// Produces a new buffer from `src`.
    fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer>;
}

impl<F> Filter for F
where
    F: Fn(&PixelBuffer) -> OpsResult<PixelBuffer> + Send + Sync,
{
    fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        self(src)
    }
}

/// One per-pixel step of a [`Look`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToneStep {
    /// Rec.601 luma grayscale.
    Grayscale,
    /// Unweighted channel average.
    ChannelAverage,
    /// `255 - v` on each color channel.
    Invert,
    /// Sepia matrix blended by the amount in [0, 1].
    Sepia(f64),
    /// Brightness in percent.
    Brightness(f64),
    /// Contrast in percent.
    Contrast(f64),
    /// Saturation in percent.
    Saturate(f64),
    /// Hue rotation in degrees.
    HueRotate(f64),
    /// Additive offset per color channel.
    Tint {
        /// Red offset.
        r: f64,
        /// Green offset.
        g: f64,
        /// Blue offset.
        b: f64,
    },
}

impl ToneStep {
    #[inline]
    fn run(&self, [r, g, b]: [f64; 3]) -> [f64; 3] {
        match *self {
            Self::Grayscale => {
                let y = color::grayscale(r, g, b);
                [y, y, y]
            }
            Self::ChannelAverage => {
                let y = color::channel_average(r, g, b);
                [y, y, y]
            }
            Self::Invert => [color::invert(r), color::invert(g), color::invert(b)],
            Self::Sepia(amount) => color::sepia(r, g, b, amount),
            Self::Brightness(pct) => [
                color::brightness(r, pct),
                color::brightness(g, pct),
                color::brightness(b, pct),
            ],
            Self::Contrast(pct) => [
                color::contrast(r, pct),
                color::contrast(g, pct),
                color::contrast(b, pct),
            ],
            Self::Saturate(pct) => color::saturation(r, g, b, pct),
            Self::HueRotate(deg) => color::hue_rotate(r, g, b, deg),
            Self::Tint { r: dr, g: dg, b: db } => [clamp_unit(r + dr), clamp_unit(g + dg), clamp_unit(b + db)],
        }
    }
}

/// A chain of per-pixel [`ToneStep`]s; alpha passes through.
///
/// An empty look is the identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Look {
    steps: Vec<ToneStep>,
}

impl Look {
    /// Creates a look from steps applied in order.
    pub fn new(steps: impl Into<Vec<ToneStep>>) -> Self {
        Self {
            steps: steps.into(),
        }
    }

    /// The steps.
    pub fn steps(&self) -> &[ToneStep] {
        &self.steps
    }
}

impl Filter for Look {
    fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        if self.steps.is_empty() {
            return Ok(src.clone());
        }
        Ok(map_pixels(src, |[r, g, b, a]| {
            let [r, g, b] = self.steps.iter().fold([r, g, b], |rgb, step| step.run(rgb));
            [r, g, b, a]
        }))
    }
}

/// [`convolve`] as a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Convolution {
    /// Kernel.
    pub kernel: Kernel,
    /// Multiplier on the weighted sum.
    pub factor: f64,
    /// Offset added after the factor.
    pub bias: f64,
}

impl Filter for Convolution {
    fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        Ok(convolve(src, &self.kernel, self.factor, self.bias))
    }
}

/// [`gaussian_blur`] as a filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Soften {
    /// Gaussian sigma in pixels.
    pub sigma: f64,
}

impl Filter for Soften {
    fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        Ok(gaussian_blur(src, self.sigma))
    }
}

/// A registered filter.
#[derive(Clone)]
pub struct FilterDefinition {
    name: String,
    label: String,
    transform: Arc<dyn Filter>,
}

impl FilterDefinition {
    /// Creates a definition.
    pub fn new(name: impl Into<String>, label: impl Into<String>, filter: impl Filter + 'static) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            transform: Arc::new(filter),
        }
    }

    /// Lookup key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Runs the transform.
    pub fn apply(&self, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        self.transform.apply(src)
    }
}

impl fmt::Debug for FilterDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterDefinition")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Name-keyed filter registry in registration order.
#[derive(Debug, Clone, Default)]
pub struct FilterCatalog {
    filters: Vec<FilterDefinition>,
}

impl FilterCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with the built-in filters.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        for def in builtins() {
            catalog.insert(def);
        }
        catalog
    }

    /// Adds a filter, or replaces the one with the same name in place.
    pub fn register(&mut self, name: impl Into<String>, label: impl Into<String>, filter: impl Filter + 'static) {
        self.insert(FilterDefinition::new(name, label, filter));
    }

    /// Adds a prepared definition, replacing by name in place.
    pub fn insert(&mut self, def: FilterDefinition) {
        match self.filters.iter_mut().find(|d| d.name == def.name) {
            Some(slot) => {
                debug!(name = %def.name, "filter replaced");
                *slot = def;
            }
            None => {
                trace!(name = %def.name, "filter registered");
                self.filters.push(def);
            }
        }
    }

    /// Looks up a definition.
    pub fn get(&self, name: &str) -> Option<&FilterDefinition> {
        self.filters.iter().find(|d| d.name == name)
    }

    /// `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Display label for `name`.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.get(name).map(FilterDefinition::label)
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|d| d.name.as_str()).collect()
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FilterDefinition> {
        self.filters.iter()
    }

    /// Number of registered filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Runs the filter registered as `name`.
    ///
    /// # Errors
    ///
    /// [`OpsError::UnknownFilter`] if nothing is registered under `name`,
    /// or whatever the filter itself returns.
    pub fn apply(&self, name: &str, src: &PixelBuffer) -> OpsResult<PixelBuffer> {
        let def = self
            .get(name)
            .ok_or_else(|| OpsError::UnknownFilter(name.to_string()))?;
        trace!(name, w = src.width(), h = src.height(), "apply filter");
        def.apply(src)
    }

    /// Runs a filter and mixes it over the source by `amount` in [0, 1].
    ///
    /// # Errors
    ///
    /// As [`apply`](Self::apply), plus `DimensionMismatch` if the filter
    /// changed the buffer size.
    pub fn apply_with_intensity(&self, name: &str, src: &PixelBuffer, amount: f64) -> OpsResult<PixelBuffer> {
        let filtered = self.apply(name, src)?;
        mix(src, &filtered, amount)
    }
}

fn builtins() -> Vec<FilterDefinition> {
    use ToneStep::*;

    let look = |name: &str, label: &str, steps: &[ToneStep]| FilterDefinition::new(name, label, Look::new(steps));
    let conv = |name: &str, label: &str, kernel: Kernel, bias: f64| {
        FilterDefinition::new(name, label, Convolution { kernel, factor: 1.0, bias })
    };

    vec![
        look("original", "Original", &[]),
        look("grayscale", "Grayscale", &[Grayscale]),
        look("black-white", "Black & White", &[ChannelAverage]),
        look("invert", "Invert", &[Invert]),
        look("sepia", "Sepia", &[Sepia(1.0)]),
        look("vintage", "Vintage", &[Sepia(1.0), Tint { r: 10.0, g: 5.0, b: 0.0 }]),
        look("clarendon", "Clarendon", &[Contrast(120.0), Saturate(135.0)]),
        look("lark", "Lark", &[Contrast(90.0), Brightness(110.0), Saturate(110.0)]),
        look("moon", "Moon", &[Grayscale, Contrast(110.0), Brightness(110.0)]),
        look(
            "reyes",
            "Reyes",
            &[Sepia(0.22), Contrast(85.0), Brightness(110.0), Saturate(75.0)],
        ),
        look(
            "juno",
            "Juno",
            &[Contrast(115.0), Brightness(110.0), Saturate(110.0), HueRotate(-10.0)],
        ),
        conv("emboss", "Emboss", Kernel::emboss(), 128.0),
        conv("sharpen", "Sharpen", Kernel::sharpen(), 0.0),
        conv("edge-detect", "Edge Detect", Kernel::edge_detect(), 0.0),
        FilterDefinition::new("soften", "Soften", Soften { sigma: 2.0 }),
    ]
}
