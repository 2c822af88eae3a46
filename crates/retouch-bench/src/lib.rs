//! Fixtures shared by the retouch benchmarks.
//!
//! Run with: `cargo bench -p retouch-bench`

use retouch_core::{PixelBuffer, Result};

/// Square sizes each benchmark group sweeps.
pub const SIZES: [u32; 3] = [256, 512, 1024];

/// Deterministic test image with gradients in every channel.
pub fn sample_photo(width: u32, height: u32) -> Result<PixelBuffer> {
    let (w, h) = (width.max(1), height.max(1));
    PixelBuffer::from_fn(w, h, |x, y| {
        [
            (x * 255 / w) as u8,
            (y * 255 / h) as u8,
            ((x + y) * 255 / (w + h)) as u8,
            255,
        ]
    })
}
