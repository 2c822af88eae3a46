//! The adjustment pipeline.
//!
//! [`AdjustmentPipeline::apply`] turns a source buffer plus
//! [`AdjustmentParams`] into a new buffer. The source is never touched and
//! no numeric input is an error.
//!
//! Stage order:
//!
//! 1. Per-pixel color: brightness, contrast, saturation, hue, exposure,
//!    temperature. Each stage clamps before feeding the next; the value is
//!    rounded once when stored. Alpha passes through.
//! 2. Blur: box blur with radius `round(blur)`.
//! 3. Sharpen: 3x3 sharpen convolution, mixed in by `sharpen / 100`.
//! 4. Vignette: radial darkening of RGB toward the corners.
//! 5. Noise: uniform offset in `[-noise/2, noise/2]` per color channel.
//!
//! Stages at their neutral value are skipped entirely.
//!
//! Noise comes from a [`StdRng`] seeded per row from the pipeline seed and
//! the row index, so a given seed always produces the same bytes regardless
//! of how rows are scheduled across threads.
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::params::AdjustmentParams;
//! use retouch_ops::pipeline::AdjustmentPipeline;
//!
//! let src = PixelBuffer::filled(4, 4, [100, 100, 100, 255]).unwrap();
//! let params = AdjustmentParams { brightness: 150.0, ..Default::default() };
//! let out = AdjustmentPipeline::new().apply(&src, &params);
//! assert_eq!(out.get(0, 0).unwrap(), [150, 150, 150, 255]);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retouch_core::pixel::{clamp_channel, CHANNELS};
use retouch_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::color;
use crate::composite::lerp;
use crate::filter::{box_blur, convolve, Kernel};
use crate::parallel::{map_pixels, map_rows};
use crate::params::AdjustmentParams;

/// Seed used by [`AdjustmentPipeline::new`].
pub const DEFAULT_NOISE_SEED: u64 = 0x5EED_0F_F11E;

/// Applies [`AdjustmentParams`] to buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjustmentPipeline {
    seed: u64,
}

impl Default for AdjustmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl AdjustmentPipeline {
    /// Pipeline with [`DEFAULT_NOISE_SEED`].
    pub fn new() -> Self {
        Self {
            seed: DEFAULT_NOISE_SEED,
        }
    }

    /// Pipeline with an explicit noise seed.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Noise seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Produces the adjusted buffer.
    pub fn apply(&self, src: &PixelBuffer, params: &AdjustmentParams) -> PixelBuffer {
        let p = params.sanitized();
        trace!(w = src.width(), h = src.height(), "apply adjustments");

        let mut out = if p.has_color_stages() {
            debug!("color stages");
            apply_color(src, &p)
        } else {
            src.clone()
        };

        let radius = p.blur.round() as usize;
        if radius > 0 {
            debug!(radius, "blur stage");
            out = box_blur(&out, radius);
        }

        if p.sharpen > 0.0 {
            debug!(amount = p.sharpen, "sharpen stage");
            let sharpened = convolve(&out, &Kernel::sharpen(), 1.0, 0.0);
            out = lerp(&out, &sharpened, p.sharpen / 100.0);
        }

        if p.vignette > 0.0 {
            debug!(amount = p.vignette, "vignette stage");
            out = vignette(&out, p.vignette / 100.0);
        }

        if p.noise > 0.0 {
            debug!(amount = p.noise, seed = self.seed, "noise stage");
            out = noise(&out, p.noise, self.seed);
        }

        out
    }
}

/// Runs the per-pixel stages; neutral stages are skipped.
fn apply_color(src: &PixelBuffer, p: &AdjustmentParams) -> PixelBuffer {
    let p = *p;
    map_pixels(src, move |[mut r, mut g, mut b, a]| {
        if p.brightness != 100.0 {
            r = color::brightness(r, p.brightness);
            g = color::brightness(g, p.brightness);
            b = color::brightness(b, p.brightness);
        }
        if p.contrast != 100.0 {
            r = color::contrast(r, p.contrast);
            g = color::contrast(g, p.contrast);
            b = color::contrast(b, p.contrast);
        }
        if p.saturation != 100.0 {
            [r, g, b] = color::saturation(r, g, b, p.saturation);
        }
        if p.hue != 0.0 {
            [r, g, b] = color::hue_rotate(r, g, b, p.hue);
        }
        if p.exposure != 0.0 {
            r = color::exposure(r, p.exposure);
            g = color::exposure(g, p.exposure);
            b = color::exposure(b, p.exposure);
        }
        if p.temperature != 0.0 {
            [r, g, b] = color::temperature(r, g, b, p.temperature);
        }
        [r, g, b, a]
    })
}

/// Darkens RGB by `1 - strength * min(d / R, 1)`.
///
/// `d` is measured from the pixel centre to the buffer midpoint and `R` is
/// half the longer side.
fn vignette(src: &PixelBuffer, strength: f64) -> PixelBuffer {
    let (w, h) = (src.width() as f64, src.height() as f64);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let max_r = w.max(h) / 2.0;

    map_rows(src, |y, src_row, dst_row| {
        let dy = y as f64 + 0.5 - cy;
        for (x, (s, d)) in src_row
            .chunks_exact(CHANNELS)
            .zip(dst_row.chunks_exact_mut(CHANNELS))
            .enumerate()
        {
            let dx = x as f64 + 0.5 - cx;
            let dist = (dx * dx + dy * dy).sqrt();
            let factor = 1.0 - strength * (dist / max_r).min(1.0);
            for c in 0..3 {
                d[c] = clamp_channel(s[c] as f64 * factor);
            }
            d[3] = s[3];
        }
    })
}

/// Golden-ratio increment, spreads row seeds apart.
const ROW_SEED_STEP: u64 = 0x9E37_79B9_7F4A_7C15;

fn row_rng(seed: u64, y: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (y as u64 + 1).wrapping_mul(ROW_SEED_STEP))
}

/// Adds a uniform offset in `[-amount/2, amount/2]` to each color channel.
fn noise(src: &PixelBuffer, amount: f64, seed: u64) -> PixelBuffer {
    let half = amount / 2.0;
    map_rows(src, |y, src_row, dst_row| {
        let mut rng = row_rng(seed, y);
        for (s, d) in src_row
            .chunks_exact(CHANNELS)
            .zip(dst_row.chunks_exact_mut(CHANNELS))
        {
            for c in 0..3 {
                d[c] = clamp_channel(s[c] as f64 + rng.gen_range(-half..=half));
            }
            d[3] = s[3];
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::AdjustmentParam;

    fn sample() -> PixelBuffer {
        PixelBuffer::from_fn(12, 9, |x, y| {
            [(x * 21) as u8, (y * 28) as u8, ((x * y) % 256) as u8, (200 + x) as u8]
        })
        .unwrap()
    }

    #[test]
    fn test_neutral_is_identity() {
        let src = sample();
        let out = AdjustmentPipeline::new().apply(&src, &AdjustmentParams::default());
        assert_eq!(out, src);
    }

    #[test]
    fn test_source_untouched() {
        let src = sample();
        let before = src.clone();
        let params = AdjustmentParams {
            contrast: 160.0,
            blur: 2.0,
            noise: 30.0,
            ..Default::default()
        };
        let out = AdjustmentPipeline::new().apply(&src, &params);
        assert_eq!(src, before);
        assert_ne!(out, src);
    }

    #[test]
    fn test_stage_order_brightness_then_contrast() {
        // brightness 50 -> 100, contrast 200 -> (100-128)*2+128 = 72
        let src = PixelBuffer::filled(1, 1, [200, 200, 200, 255]).unwrap();
        let params = AdjustmentParams {
            brightness: 50.0,
            contrast: 200.0,
            ..Default::default()
        };
        let out = AdjustmentPipeline::new().apply(&src, &params);
        assert_eq!(out.get(0, 0).unwrap(), [72, 72, 72, 255]);
    }

    #[test]
    fn test_stages_clamp_between_steps() {
        // 200*2 clamps to 255 before contrast 50: (255-128)/2+128 = 191.5 -> 192
        let src = PixelBuffer::filled(1, 1, [200, 0, 0, 9]).unwrap();
        let params = AdjustmentParams {
            brightness: 200.0,
            contrast: 50.0,
            ..Default::default()
        };
        let out = AdjustmentPipeline::new().apply(&src, &params);
        assert_eq!(out.get(0, 0).unwrap(), [192, 64, 64, 9]);
    }

    #[test]
    fn test_alpha_preserved_by_color_stages() {
        let src = sample();
        let params = AdjustmentParams::default()
            .with(AdjustmentParam::Hue, 90.0)
            .with(AdjustmentParam::Temperature, -40.0)
            .with(AdjustmentParam::Vignette, 80.0);
        let out = AdjustmentPipeline::new().apply(&src, &params);
        for ((_, _, a), (_, _, b)) in src.pixels().zip(out.pixels()) {
            assert_eq!(a[3], b[3]);
        }
    }

    #[test]
    fn test_vignette_center_and_corner() {
        let src = PixelBuffer::filled(101, 101, [200, 200, 200, 255]).unwrap();
        let params = AdjustmentParams::default().with(AdjustmentParam::Vignette, 100.0);
        let out = AdjustmentPipeline::new().apply(&src, &params);
        // Centre pixel sits on the midpoint
        assert_eq!(out.get(50, 50).unwrap(), [200, 200, 200, 255]);
        // Corner is beyond R, fully darkened
        assert_eq!(out.get(0, 0).unwrap(), [0, 0, 0, 255]);
    }

    #[test]
    fn test_noise_bounded_and_deterministic() {
        let src = PixelBuffer::filled(16, 16, [128, 128, 128, 255]).unwrap();
        let params = AdjustmentParams::default().with(AdjustmentParam::Noise, 40.0);
        let a = AdjustmentPipeline::with_seed(7).apply(&src, &params);
        let b = AdjustmentPipeline::with_seed(7).apply(&src, &params);
        let c = AdjustmentPipeline::with_seed(8).apply(&src, &params);
        assert_eq!(a, b);
        assert_ne!(a, c);
        for (_, _, px) in a.pixels() {
            for v in &px[..3] {
                assert!((108..=148).contains(v));
            }
            assert_eq!(px[3], 255);
        }
    }

    #[test]
    fn test_sharpen_full_strength_matches_convolution() {
        let src = sample();
        let params = AdjustmentParams::default().with(AdjustmentParam::Sharpen, 100.0);
        let out = AdjustmentPipeline::new().apply(&src, &params);
        assert_eq!(out, convolve(&src, &Kernel::sharpen(), 1.0, 0.0));
    }

    #[test]
    fn test_blur_rounds_radius() {
        let src = sample();
        let params = AdjustmentParams::default().with(AdjustmentParam::Blur, 1.6);
        let out = AdjustmentPipeline::new().apply(&src, &params);
        assert_eq!(out, box_blur(&src, 2));
    }
}
