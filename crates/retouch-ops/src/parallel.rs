//! Row-parallel drivers shared by every pass.
//!
//! Transforms are embarrassingly parallel: each output row depends only on
//! the read-only source and never on another output row. The helpers here
//! split the destination into disjoint rows and hand them to rayon when the
//! `parallel` feature is on, or walk them in order when it's off. Both paths
//! produce identical bytes.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::parallel::map_pixels;
//!
//! let src = PixelBuffer::filled(8, 8, [10, 20, 30, 255]).unwrap();
//! let out = map_pixels(&src, |[r, g, b, a]| [b, g, r, a]);
//! assert_eq!(out.get(3, 3).unwrap(), [30, 20, 10, 255]);
//! ```

use retouch_core::pixel::{from_f64, to_f64, CHANNELS};
use retouch_core::PixelBuffer;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Runs `f(y, row)` over each `row_len`-sized chunk of `dst`.
///
/// A zero `row_len` is a no-op.
pub fn for_each_row<T, F>(dst: &mut [T], row_len: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if row_len == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    dst.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));

    #[cfg(not(feature = "parallel"))]
    dst.chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Builds a new buffer by running `f(y, src_row, dst_row)` for every row.
pub fn map_rows<F>(src: &PixelBuffer, f: F) -> PixelBuffer
where
    F: Fn(usize, &[u8], &mut [u8]) + Sync + Send,
{
    let stride = src.stride();
    let raw = src.as_raw();
    let mut out = src.blank_like();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        f(y, &raw[y * stride..(y + 1) * stride], row);
    });
    out
}

/// Builds a new buffer by applying `f` to every pixel independently.
///
/// `f` receives and returns `[r, g, b, a]` as `f64`; results are rounded and
/// clamped on store.
pub fn map_pixels<F>(src: &PixelBuffer, f: F) -> PixelBuffer
where
    F: Fn([f64; 4]) -> [f64; 4] + Sync + Send,
{
    map_rows(src, |_, src_row, dst_row| {
        for (s, d) in src_row
            .chunks_exact(CHANNELS)
            .zip(dst_row.chunks_exact_mut(CHANNELS))
        {
            let px = to_f64([s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&from_f64(f(px)));
        }
    })
}
