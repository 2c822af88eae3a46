//! The edit session.
//!
//! [`EditSession`] owns everything one open image needs: the original
//! buffer, the committed buffer, the live slider state, the pipeline, the
//! filter catalog, presets and history. There are no globals; two sessions
//! never share state.
//!
//! Live adjustments are a preview layered over the committed buffer.
//! Filters, presets and transforms operate on the committed buffer and push
//! a history entry; live adjustments stay in place on top of the result
//! until they are committed or discarded.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::AdjustmentParam;
//! use retouch_session::{EditSession, TransformOp};
//!
//! let img = PixelBuffer::filled(8, 4, [100, 100, 100, 255]).unwrap();
//! let mut session = EditSession::new(img);
//!
//! session.set_param(AdjustmentParam::Brightness, 150.0);
//! assert_eq!(session.preview().get(0, 0).unwrap(), [150, 150, 150, 255]);
//! session.commit_adjustments();
//!
//! session.apply_filter("invert").unwrap();
//! session.apply_transform(TransformOp::RotateCw).unwrap();
//! assert_eq!(session.image().dimensions(), (4, 8));
//!
//! session.undo().unwrap();
//! assert_eq!(session.image().get(0, 0).unwrap(), [105, 105, 105, 255]);
//! ```

use retouch_core::{PixelBuffer, Rect, Rgba};
use retouch_ops::catalog::FilterCatalog;
use retouch_ops::params::{AdjustmentParam, AdjustmentParams};
use retouch_ops::pipeline::AdjustmentPipeline;
use retouch_ops::resize::{self, ResizeFilter};
use retouch_ops::stats::{self, Histogram, ImageStats};
use retouch_ops::transform;
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::config::EditorConfig;
use crate::history::{HistoryItem, HistoryStack};
use crate::preset::PresetBook;
use crate::SessionResult;

/// Description of the first history entry.
pub const LOADED: &str = "Image Loaded";

/// A geometric edit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    /// Keep only this rectangle.
    Crop(Rect),
    /// Mirror left-right.
    FlipHorizontal,
    /// Mirror top-bottom.
    FlipVertical,
    /// Quarter turn clockwise.
    RotateCw,
    /// Quarter turn counter-clockwise.
    RotateCcw,
    /// Half turn.
    Rotate180,
    /// Arbitrary clockwise rotation; uncovered canvas takes `fill`.
    Rotate {
        /// Angle in degrees.
        degrees: f64,
        /// Background for the grown canvas.
        fill: Rgba,
    },
    /// Resample to an exact size.
    Resize {
        /// Target width.
        width: u32,
        /// Target height.
        height: u32,
        /// Resampling filter.
        filter: ResizeFilter,
    },
    /// Resample by a factor.
    Scale {
        /// Size multiplier.
        factor: f64,
        /// Resampling filter.
        filter: ResizeFilter,
    },
}

impl TransformOp {
    /// Runs the transform.
    pub fn apply(&self, src: &PixelBuffer) -> SessionResult<PixelBuffer> {
        Ok(match *self {
            Self::Crop(rect) => transform::crop(src, rect)?,
            Self::FlipHorizontal => transform::flip_horizontal(src),
            Self::FlipVertical => transform::flip_vertical(src),
            Self::RotateCw => transform::rotate_90_cw(src),
            Self::RotateCcw => transform::rotate_90_ccw(src),
            Self::Rotate180 => transform::rotate_180(src),
            Self::Rotate { degrees, fill } => transform::rotate(src, degrees, fill)?,
            Self::Resize { width, height, filter } => resize::resize(src, width, height, filter)?,
            Self::Scale { factor, filter } => resize::scale(src, factor, filter)?,
        })
    }

    /// History description.
    pub fn description(&self) -> String {
        match *self {
            Self::Crop(_) => "Crop Applied".to_string(),
            Self::FlipHorizontal => "Flipped Horizontal".to_string(),
            Self::FlipVertical => "Flipped Vertical".to_string(),
            Self::RotateCw => "Rotated 90°".to_string(),
            Self::RotateCcw => "Rotated -90°".to_string(),
            Self::Rotate180 => "Rotated 180°".to_string(),
            Self::Rotate { degrees, .. } => format!("Rotated {}°", degrees),
            Self::Resize { width, height, .. } => format!("Resized to {}x{}", width, height),
            Self::Scale { factor, .. } => format!("Scaled {}%", (factor * 100.0).round()),
        }
    }
}

/// One open image and its edit state.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: PixelBuffer,
    base: PixelBuffer,
    params: AdjustmentParams,
    pipeline: AdjustmentPipeline,
    catalog: FilterCatalog,
    presets: PresetBook,
    history: HistoryStack,
}

impl EditSession {
    /// Opens `image` with default settings.
    pub fn new(image: PixelBuffer) -> Self {
        Self::with_config(image, &EditorConfig::default())
    }

    /// Opens `image` with `config`'s limits, seed, presets and looks.
    pub fn with_config(image: PixelBuffer, config: &EditorConfig) -> Self {
        let mut history = HistoryStack::new(config.history);
        history.push(image.clone(), LOADED);
        info!(w = image.width(), h = image.height(), "session opened");
        Self {
            base: image.clone(),
            original: image,
            params: AdjustmentParams::default(),
            pipeline: AdjustmentPipeline::with_seed(config.noise_seed),
            catalog: config.filter_catalog(),
            presets: config.preset_book(),
            history,
        }
    }

    fn commit(&mut self, buffer: PixelBuffer, description: String) {
        info!(%description, w = buffer.width(), h = buffer.height(), "commit");
        self.base = buffer;
        self.history.push(self.base.clone(), description);
    }

    /// Committed buffer with the live adjustments applied.
    pub fn preview(&self) -> PixelBuffer {
        if self.params.is_neutral() {
            return self.base.clone();
        }
        self.pipeline.apply(&self.base, &self.params)
    }

    /// Live adjustments.
    pub fn params(&self) -> &AdjustmentParams {
        &self.params
    }

    /// Sets one live adjustment, clamped to its range.
    pub fn set_param(&mut self, param: AdjustmentParam, value: f64) {
        trace!(%param, value, "set param");
        self.params.set(param, value);
    }

    /// Sets one live adjustment by name.
    ///
    /// # Errors
    ///
    /// `UnknownParameter` if `name` isn't an adjustment.
    pub fn set_param_by_name(&mut self, name: &str, value: f64) -> SessionResult<()> {
        let param: AdjustmentParam = name.parse()?;
        self.set_param(param, value);
        Ok(())
    }

    /// Replaces all live adjustments.
    pub fn set_params(&mut self, params: AdjustmentParams) {
        self.params = params.sanitized();
    }

    /// Bakes the live adjustments into the committed buffer.
    ///
    /// Returns `false` and records nothing when the adjustments are neutral.
    pub fn commit_adjustments(&mut self) -> bool {
        if self.params.is_neutral() {
            debug!("nothing to commit");
            return false;
        }
        let changed: Vec<&str> = AdjustmentParam::ALL
            .iter()
            .filter(|&&p| !p.is_neutral_value(self.params.get(p)))
            .map(|p| p.name())
            .collect();
        let adjusted = self.pipeline.apply(&self.base, &self.params);
        self.params = AdjustmentParams::default();
        self.commit(adjusted, format!("Adjusted {}", changed.join(", ")));
        true
    }

    /// Resets the live adjustments without touching the image.
    pub fn discard_adjustments(&mut self) {
        self.params = AdjustmentParams::default();
    }

    /// Runs a catalog filter on the committed buffer.
    ///
    /// # Errors
    ///
    /// `UnknownFilter`, or whatever the filter returns.
    pub fn apply_filter(&mut self, name: &str) -> SessionResult<()> {
        let out = self.catalog.apply(name, &self.base)?;
        self.commit(out, format!("Applied {} filter", name));
        Ok(())
    }

    /// Runs a catalog filter mixed over the committed buffer by `amount`.
    ///
    /// # Errors
    ///
    /// As [`apply_filter`](Self::apply_filter), plus `DimensionMismatch` if
    /// the filter changed the size.
    pub fn apply_filter_with_intensity(&mut self, name: &str, amount: f64) -> SessionResult<()> {
        let amount = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };
        let out = self.catalog.apply_with_intensity(name, &self.base, amount)?;
        let pct = (amount * 100.0).round();
        self.commit(out, format!("Applied {} filter ({}%)", name, pct));
        Ok(())
    }

    /// Runs the pipeline with a preset's params on the committed buffer.
    ///
    /// # Errors
    ///
    /// `UnknownPreset` if `name` isn't registered.
    pub fn apply_preset(&mut self, name: &str) -> SessionResult<()> {
        let params = self.presets.get(name)?.params;
        let out = self.pipeline.apply(&self.base, &params);
        self.commit(out, format!("Applied {} preset", name));
        Ok(())
    }

    /// Crops, flips, rotates or resizes the committed buffer.
    ///
    /// # Errors
    ///
    /// `InvalidRegion` for a bad crop, `InvalidDimensions` for a bad size.
    pub fn apply_transform(&mut self, op: TransformOp) -> SessionResult<()> {
        let out = op.apply(&self.base)?;
        self.commit(out, op.description());
        Ok(())
    }

    /// Steps back in history.
    ///
    /// # Errors
    ///
    /// `NoHistory` at the oldest entry.
    pub fn undo(&mut self) -> SessionResult<&PixelBuffer> {
        self.base = self.history.undo()?;
        Ok(&self.base)
    }

    /// Steps forward in history.
    ///
    /// # Errors
    ///
    /// `NoHistory` at the newest entry.
    pub fn redo(&mut self) -> SessionResult<&PixelBuffer> {
        self.base = self.history.redo()?;
        Ok(&self.base)
    }

    /// Restores the state at history `index`.
    ///
    /// # Errors
    ///
    /// `NoHistory` if `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> SessionResult<&PixelBuffer> {
        self.base = self.history.jump_to(index)?;
        Ok(&self.base)
    }

    /// Forgets all history; the image stays as it is.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Back to the original image with neutral adjustments and a fresh history.
    pub fn reset(&mut self) {
        info!("session reset");
        self.base = self.original.clone();
        self.params = AdjustmentParams::default();
        self.history.clear();
        self.history.push(self.original.clone(), LOADED);
    }

    /// Rows for a history panel.
    pub fn history_panel(&self) -> Vec<HistoryItem> {
        self.history.panel()
    }

    /// The history stack.
    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// Committed buffer, without live adjustments.
    pub fn image(&self) -> &PixelBuffer {
        &self.base
    }

    /// Buffer the session was opened with.
    pub fn original(&self) -> &PixelBuffer {
        &self.original
    }

    /// Channel statistics of the preview.
    pub fn stats(&self) -> ImageStats {
        stats::stats(&self.preview())
    }

    /// Histogram of the preview.
    pub fn histogram(&self) -> Histogram {
        stats::histogram(&self.preview())
    }

    /// The filter catalog.
    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    /// The filter catalog, for registering custom filters.
    pub fn catalog_mut(&mut self) -> &mut FilterCatalog {
        &mut self.catalog
    }

    /// The presets.
    pub fn presets(&self) -> &PresetBook {
        &self.presets
    }

    /// The presets, for adding user presets.
    pub fn presets_mut(&mut self) -> &mut PresetBook {
        &mut self.presets
    }

    /// The pipeline.
    pub fn pipeline(&self) -> &AdjustmentPipeline {
        &self.pipeline
    }
}
