//! Resampling.
//!
//! # Filters
//!
//! - [`ResizeFilter::Nearest`] - No interpolation, keeps hard pixel edges
//! - [`ResizeFilter::Bilinear`] - Linear interpolation between the four nearest samples
//!
//! Sample positions are pixel centres: destination pixel `x` maps to
//! source coordinate `(x + 0.5) * src_w / dst_w - 0.5`.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::resize::{resize, ResizeFilter};
//!
//! let src = PixelBuffer::filled(64, 48, [10, 20, 30, 255]).unwrap();
//! let dst = resize(&src, 32, 24, ResizeFilter::Bilinear).unwrap();
//! assert_eq!(dst.dimensions(), (32, 24));
//! assert_eq!(dst.get(5, 5).unwrap(), [10, 20, 30, 255]);
//! ```

use retouch_core::pixel::{clamp_channel, CHANNELS};
use retouch_core::{Error, PixelBuffer};
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::OpsResult;

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    /// Nearest-neighbor.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Bilinear,
}

/// Resizes `src` to `width x height`.
///
/// # Errors
///
/// `InvalidDimensions` if either target dimension is zero.
pub fn resize(src: &PixelBuffer, width: u32, height: u32, filter: ResizeFilter) -> OpsResult<PixelBuffer> {
    let mut out = PixelBuffer::new(width, height)?;
    if out.dimensions() == src.dimensions() {
        return Ok(src.clone());
    }
    debug!(from = ?src.dimensions(), to = ?(width, height), ?filter, "resize");

    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let scale_x = sw as f64 / width as f64;
    let scale_y = sh as f64 / height as f64;
    let raw = src.as_raw();
    let stride = out.stride();

    match filter {
        ResizeFilter::Nearest => {
            for_each_row(out.as_raw_mut(), stride, |y, row| {
                let sy = (((y as f64 + 0.5) * scale_y) as usize).min(sh - 1);
                for (x, d) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    let sx = (((x as f64 + 0.5) * scale_x) as usize).min(sw - 1);
                    let i = (sy * sw + sx) * CHANNELS;
                    d.copy_from_slice(&raw[i..i + CHANNELS]);
                }
            });
        }
        ResizeFilter::Bilinear => {
            let max_x = (sw - 1) as f64;
            let max_y = (sh - 1) as f64;
            for_each_row(out.as_raw_mut(), stride, |y, row| {
                let fy = ((y as f64 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
                let y0 = fy.floor() as usize;
                let y1 = (y0 + 1).min(sh - 1);
                let ty = fy - y0 as f64;
                for (x, d) in row.chunks_exact_mut(CHANNELS).enumerate() {
                    let fx = ((x as f64 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
                    let x0 = fx.floor() as usize;
                    let x1 = (x0 + 1).min(sw - 1);
                    let tx = fx - x0 as f64;

                    let i00 = (y0 * sw + x0) * CHANNELS;
                    let i10 = (y0 * sw + x1) * CHANNELS;
                    let i01 = (y1 * sw + x0) * CHANNELS;
                    let i11 = (y1 * sw + x1) * CHANNELS;
                    for c in 0..CHANNELS {
                        let top = raw[i00 + c] as f64 + (raw[i10 + c] as f64 - raw[i00 + c] as f64) * tx;
                        let bottom = raw[i01 + c] as f64 + (raw[i11 + c] as f64 - raw[i01 + c] as f64) * tx;
                        d[c] = clamp_channel(top + (bottom - top) * ty);
                    }
                }
            });
        }
    }

    Ok(out)
}

/// Scales both dimensions by `factor`, rounding to at least one pixel.
///
/// # Errors
///
/// `InvalidDimensions` if `factor` isn't positive and finite, or the result
/// is too large.
pub fn scale(src: &PixelBuffer, factor: f64, filter: ResizeFilter) -> OpsResult<PixelBuffer> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(Error::invalid_dimensions(
            src.width(),
            src.height(),
            format!("scale factor must be positive and finite, got {}", factor),
        )
        .into());
    }
    let w = (src.width() as f64 * factor).round().clamp(1.0, u32::MAX as f64) as u32;
    let h = (src.height() as f64 * factor).round().clamp(1.0, u32::MAX as f64) as u32;
    resize(src, w, h, filter)
}
