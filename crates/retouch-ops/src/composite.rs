//! Buffer compositing.
//!
//! Two-buffer operations. These are the only operations in the crate that
//! can fail on a size mismatch.
//!
//! - [`mix`] - Linear blend, used for filter intensity and sharpen strength
//! - [`difference`] - Per-channel absolute difference
//! - [`max_difference`] - Largest channel delta between two buffers
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::composite::mix;
//!
//! let a = PixelBuffer::filled(2, 2, [0, 0, 0, 255]).unwrap();
//! let b = PixelBuffer::filled(2, 2, [200, 100, 50, 255]).unwrap();
//! let half = mix(&a, &b, 0.5).unwrap();
//! assert_eq!(half.get(0, 0).unwrap(), [100, 50, 25, 255]);
//! ```

use crate::parallel::map_rows;
use crate::OpsResult;
use retouch_core::pixel::clamp_channel;
use retouch_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Mixes `a` toward `b` by `t`: per channel `a + (b - a) * t`.
///
/// `t` is clamped to [0, 1]; NaN counts as 0. All four channels blend.
///
/// # Errors
///
/// `DimensionMismatch` if the buffers differ in size.
pub fn mix(a: &PixelBuffer, b: &PixelBuffer, t: f64) -> OpsResult<PixelBuffer> {
    a.ensure_same_size(b)?;
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    trace!(w = a.width(), h = a.height(), t, "mix");

    if t == 0.0 {
        return Ok(a.clone());
    }
    if t == 1.0 {
        return Ok(b.clone());
    }

    Ok(lerp(a, b, t))
}

/// [`mix`] without the size check or the `t` clamp; callers guarantee both.
pub(crate) fn lerp(a: &PixelBuffer, b: &PixelBuffer, t: f64) -> PixelBuffer {
    let stride = a.stride();
    let braw = b.as_raw();
    map_rows(a, |y, arow, dst| {
        let brow = &braw[y * stride..(y + 1) * stride];
        for ((d, &va), &vb) in dst.iter_mut().zip(arow).zip(brow) {
            let va = va as f64;
            *d = clamp_channel(va + (vb as f64 - va) * t);
        }
    })
}

/// Per-channel `|a - b|`, alpha included.
///
/// # Errors
///
/// `DimensionMismatch` if the buffers differ in size.
pub fn difference(a: &PixelBuffer, b: &PixelBuffer) -> OpsResult<PixelBuffer> {
    a.ensure_same_size(b)?;
    let stride = a.stride();
    let braw = b.as_raw();
    Ok(map_rows(a, |y, arow, dst| {
        let brow = &braw[y * stride..(y + 1) * stride];
        for ((d, &va), &vb) in dst.iter_mut().zip(arow).zip(brow) {
            *d = va.abs_diff(vb);
        }
    }))
}

/// Largest per-channel delta between `a` and `b`.
///
/// # Errors
///
/// `DimensionMismatch` if the buffers differ in size.
pub fn max_difference(a: &PixelBuffer, b: &PixelBuffer) -> OpsResult<u8> {
    a.ensure_same_size(b)?;
    Ok(a.as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(&va, &vb)| va.abs_diff(vb))
        .max()
        .unwrap_or(0))
}
