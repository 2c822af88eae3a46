//! Geometric transforms.
//!
//! Every function allocates a new buffer and leaves the source alone.
//!
//! # Operations
//!
//! - [`crop`] - Extract a rectangle
//! - [`flip_horizontal`] / [`flip_vertical`] - Mirror
//! - [`rotate_90_cw`] / [`rotate_90_ccw`] / [`rotate_180`] - Lossless quarter turns
//! - [`rotate`] - Arbitrary angle, canvas grows to fit
//!
//! # Example
//!
//! ```rust
//! use retouch_core::{PixelBuffer, Rect};
//! use retouch_ops::transform::{crop, rotate_90_cw};
//!
//! let src = PixelBuffer::new(64, 32).unwrap();
//! assert_eq!(rotate_90_cw(&src).dimensions(), (32, 64));
//! assert_eq!(crop(&src, Rect::new(8, 8, 16, 4)).unwrap().dimensions(), (16, 4));
//! ```

use retouch_core::pixel::{clamp_channel, Rgba, CHANNELS};
use retouch_core::{Error, PixelBuffer, Rect};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::OpsResult;

/// Copies `region` out of `src`.
///
/// # Errors
///
/// `InvalidRegion` if the region is empty or reaches past the buffer.
///
/// # Example
///
/// ```rust
/// use retouch_core::{PixelBuffer, Rect};
/// use retouch_ops::transform::crop;
///
/// let src = PixelBuffer::new(10, 10).unwrap();
/// assert!(crop(&src, Rect::new(5, 5, 6, 2)).is_err());
/// assert!(crop(&src, Rect::new(0, 0, 0, 3)).is_err());
/// ```
pub fn crop(src: &PixelBuffer, region: Rect) -> OpsResult<PixelBuffer> {
    if region.is_empty() || !region.fits_within(src.width(), src.height()) {
        return Err(Error::invalid_region(
            region.x,
            region.y,
            region.width,
            region.height,
            src.width(),
            src.height(),
        )
        .into());
    }
    trace!(?region, "crop");

    let stride = src.stride();
    let row_bytes = region.width as usize * CHANNELS;
    let x0 = region.x as usize * CHANNELS;
    let mut data = Vec::with_capacity(row_bytes * region.height as usize);
    for y in region.y as usize..region.bottom() as usize {
        let start = y * stride + x0;
        data.extend_from_slice(&src.as_raw()[start..start + row_bytes]);
    }
    Ok(PixelBuffer::from_raw(region.width, region.height, data)?)
}

/// Mirrors left-right.
pub fn flip_horizontal(src: &PixelBuffer) -> PixelBuffer {
    let stride = src.stride();
    let raw = src.as_raw();
    let mut out = src.blank_like();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        let src_row = &raw[y * stride..(y + 1) * stride];
        for (d, s) in row
            .chunks_exact_mut(CHANNELS)
            .zip(src_row.chunks_exact(CHANNELS).rev())
        {
            d.copy_from_slice(s);
        }
    });
    out
}

/// Mirrors top-bottom.
pub fn flip_vertical(src: &PixelBuffer) -> PixelBuffer {
    let stride = src.stride();
    let h = src.height() as usize;
    let raw = src.as_raw();
    let mut out = src.blank_like();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        let sy = h - 1 - y;
        row.copy_from_slice(&raw[sy * stride..(sy + 1) * stride]);
    });
    out
}

/// Quarter turn where output pixel (x, y) reads source pixel `pick(x, y)`.
fn quarter_turn<F>(src: &PixelBuffer, pick: F) -> PixelBuffer
where
    F: Fn(usize, usize) -> (usize, usize) + Sync + Send,
{
    let sw = src.width() as usize;
    let raw = src.as_raw();
    let mut out = src.blank_transposed();
    let stride = out.stride();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        for (x, d) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let (sx, sy) = pick(x, y);
            let i = (sy * sw + sx) * CHANNELS;
            d.copy_from_slice(&raw[i..i + CHANNELS]);
        }
    });
    out
}

/// Rotates 90 degrees clockwise; a `w x h` buffer becomes `h x w`.
pub fn rotate_90_cw(src: &PixelBuffer) -> PixelBuffer {
    let sh = src.height() as usize;
    quarter_turn(src, |x, y| (y, sh - 1 - x))
}

/// Rotates 90 degrees counter-clockwise.
pub fn rotate_90_ccw(src: &PixelBuffer) -> PixelBuffer {
    let sw = src.width() as usize;
    quarter_turn(src, |x, y| (sw - 1 - y, x))
}

/// Rotates 180 degrees.
pub fn rotate_180(src: &PixelBuffer) -> PixelBuffer {
    let stride = src.stride();
    let h = src.height() as usize;
    let raw = src.as_raw();
    let mut out = src.blank_like();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        let sy = h - 1 - y;
        let src_row = &raw[sy * stride..(sy + 1) * stride];
        for (d, s) in row
            .chunks_exact_mut(CHANNELS)
            .zip(src_row.chunks_exact(CHANNELS).rev())
        {
            d.copy_from_slice(s);
        }
    });
    out
}

// Slack for trig round-off when sizing the rotated canvas.
const CANVAS_EPS: f64 = 1e-9;

/// Canvas size that holds a `width x height` buffer rotated by `degrees`.
pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let t = degrees.to_radians();
    let (sin, cos) = (t.sin().abs(), t.cos().abs());
    let (w, h) = (width as f64, height as f64);
    let nw = (w * cos + h * sin - CANVAS_EPS).ceil().max(1.0);
    let nh = (w * sin + h * cos - CANVAS_EPS).ceil().max(1.0);
    (nw as u32, nh as u32)
}

/// Rotates clockwise by `degrees` about the centre.
///
/// The canvas grows to `ceil(w|cos| + h|sin|) x ceil(w|sin| + h|cos|)`.
/// Samples are bilinear; taps that fall outside the source read `fill`.
/// Exact multiples of 90 degrees take the lossless paths.
///
/// # Errors
///
/// `InvalidDimensions` if the grown canvas can't be allocated.
///
/// # Example
///
/// ```rust
/// use retouch_core::PixelBuffer;
/// use retouch_ops::transform::rotate;
///
/// let src = PixelBuffer::filled(10, 10, [255, 0, 0, 255]).unwrap();
/// let out = rotate(&src, 45.0, [0, 0, 0, 0]).unwrap();
/// assert_eq!(out.dimensions(), (15, 15));
/// assert_eq!(out.get(7, 7).unwrap(), [255, 0, 0, 255]);
/// assert_eq!(out.get(0, 0).unwrap(), [0, 0, 0, 0]);
/// ```
pub fn rotate(src: &PixelBuffer, degrees: f64, fill: Rgba) -> OpsResult<PixelBuffer> {
    let degrees = if degrees.is_finite() { degrees.rem_euclid(360.0) } else { 0.0 };
    match degrees {
        d if d == 0.0 => return Ok(src.clone()),
        d if d == 90.0 => return Ok(rotate_90_cw(src)),
        d if d == 180.0 => return Ok(rotate_180(src)),
        d if d == 270.0 => return Ok(rotate_90_ccw(src)),
        _ => {}
    }

    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let (nw, nh) = rotated_size(src.width(), src.height(), degrees);
    debug!(degrees, from = ?src.dimensions(), to = ?(nw, nh), "rotate");

    let t = degrees.to_radians();
    let (sin, cos) = t.sin_cos();
    let (scx, scy) = (sw as f64 / 2.0, sh as f64 / 2.0);
    let (dcx, dcy) = (nw as f64 / 2.0, nh as f64 / 2.0);
    let raw = src.as_raw();

    let tap = |x: i64, y: i64| -> [f64; 4] {
        if x < 0 || y < 0 || x >= sw as i64 || y >= sh as i64 {
            return fill.map(|v| v as f64);
        }
        let i = (y as usize * sw + x as usize) * CHANNELS;
        [raw[i] as f64, raw[i + 1] as f64, raw[i + 2] as f64, raw[i + 3] as f64]
    };

    let mut out = PixelBuffer::new(nw, nh)?;
    let stride = out.stride();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        let dy = y as f64 + 0.5 - dcy;
        for (x, d) in row.chunks_exact_mut(CHANNELS).enumerate() {
            let dx = x as f64 + 0.5 - dcx;
            // Inverse rotation back into source pixel-index space
            let sx = cos * dx + sin * dy + scx - 0.5;
            let sy = -sin * dx + cos * dy + scy - 0.5;

            if sx <= -1.0 || sy <= -1.0 || sx >= sw as f64 || sy >= sh as f64 {
                d.copy_from_slice(&fill);
                continue;
            }

            let (x0, y0) = (sx.floor(), sy.floor());
            let (fx, fy) = (sx - x0, sy - y0);
            let (x0, y0) = (x0 as i64, y0 as i64);
            let p00 = tap(x0, y0);
            let p10 = tap(x0 + 1, y0);
            let p01 = tap(x0, y0 + 1);
            let p11 = tap(x0 + 1, y0 + 1);
            for c in 0..CHANNELS {
                let top = p00[c] + (p10[c] - p00[c]) * fx;
                let bottom = p01[c] + (p11[c] - p01[c]) * fx;
                d[c] = clamp_channel(top + (bottom - top) * fy);
            }
        }
    });
    Ok(out)
}
