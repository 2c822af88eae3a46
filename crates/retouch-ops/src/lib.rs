//! # retouch-ops
//!
//! Pixel operations for the retouch photo pipeline.
//!
//! # Modules
//!
//! - [`color`] - Per-pixel color math (brightness, contrast, HSL hue, ...)
//! - [`filter`] - Kernel convolution, box and Gaussian blur
//! - [`params`] - Adjustment slider state
//! - [`pipeline`] - Ordered application of adjustments
//! - [`catalog`] - Named filters behind one trait
//! - [`composite`] - Mixing and differencing two buffers
//! - [`transform`] - Crop, flip, rotate
//! - [`resize`] - Resampling
//! - [`stats`] - Histogram and channel statistics
//!
//! Every operation borrows its source and returns a new
//! [`PixelBuffer`](retouch_core::PixelBuffer).
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::{AdjustmentParams, AdjustmentPipeline, FilterCatalog};
//!
//! let src = PixelBuffer::filled(32, 32, [120, 90, 60, 255]).unwrap();
//!
//! let params = AdjustmentParams { contrast: 130.0, vignette: 40.0, ..Default::default() };
//! let adjusted = AdjustmentPipeline::new().apply(&src, &params);
//!
//! let catalog = FilterCatalog::with_builtins();
//! let toned = catalog.apply("sepia", &adjusted).unwrap();
//! assert_eq!(toned.dimensions(), (32, 32));
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - Row-parallel processing with rayon. Output is
//!   byte-identical with the feature off.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod catalog;
pub mod color;
pub mod composite;
pub mod filter;
pub mod parallel;
pub mod params;
pub mod pipeline;
pub mod resize;
pub mod stats;
pub mod transform;

pub use catalog::{Filter, FilterCatalog, FilterDefinition, Look, ToneStep};
pub use error::{OpsError, OpsResult};
pub use filter::Kernel;
pub use params::{AdjustmentParam, AdjustmentParams};
pub use pipeline::AdjustmentPipeline;
pub use resize::ResizeFilter;
