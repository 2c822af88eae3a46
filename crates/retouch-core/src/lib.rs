//! # retouch-core
//!
//! Core types for the retouch photo pipeline.
//!
//! - [`PixelBuffer`] - Owned 8-bit RGBA buffer with bounds-checked access
//! - [`Rect`] - Crop regions
//! - [`pixel`] - Channel clamping and luma helpers
//! - [`Error`] - Buffer-level failures
//!
//! ## Crate Structure
//!
//! ```text
//! retouch-core (this crate)
//!    ^
//!    |
//!    +-- retouch-ops (color ops, convolution, pipeline, filters)
//!    +-- retouch-session (history, presets, edit session)
//! ```
//!
//! ## Ownership
//!
//! A buffer is exclusively owned by whoever holds it. Every transform in the
//! workspace borrows its source and returns a freshly allocated buffer, so
//! a source is never mutated behind a caller's back.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod pixel;
pub mod rect;

pub use buffer::PixelBuffer;
pub use error::{Error, Result};
pub use pixel::{Rgba, CHANNELS};
pub use rect::Rect;

/// Prelude module for convenient imports.
///
/// ```
/// use retouch_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{clamp_channel, luma_rec601, Rgba, CHANNELS};
    pub use crate::rect::Rect;
}
