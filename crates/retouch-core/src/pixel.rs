//! Pixel-level helpers shared by every transform.
//!
//! Buffers store 8-bit RGBA. Intermediate math is done in floating point
//! and brought back to a channel value with [`clamp_channel`], which is the
//! single place where rounding and clamping happen.

/// Number of interleaved channels per pixel (R, G, B, A).
pub const CHANNELS: usize = 4;

/// Maximum value of a color channel.
pub const CHANNEL_MAX: f64 = 255.0;

/// One RGBA pixel.
pub type Rgba = [u8; 4];

/// Rec.601 luma coefficient for red.
pub const REC601_LUMA_R: f64 = 0.299;

/// Rec.601 luma coefficient for green.
pub const REC601_LUMA_G: f64 = 0.587;

/// Rec.601 luma coefficient for blue.
pub const REC601_LUMA_B: f64 = 0.114;

/// Rec.601 luma coefficients as an array [R, G, B].
pub const REC601_LUMA: [f64; 3] = [REC601_LUMA_R, REC601_LUMA_G, REC601_LUMA_B];

/// Rec.601 luma of an RGB triple, same scale as the input.
///
/// # Example
///
/// ```rust
/// use retouch_core::pixel::luma_rec601;
///
/// let y = luma_rec601(255.0, 0.0, 0.0);
/// assert!((y - 76.245).abs() < 1e-9);
/// ```
#[inline]
pub fn luma_rec601(r: f64, g: f64, b: f64) -> f64 {
    r * REC601_LUMA_R + g * REC601_LUMA_G + b * REC601_LUMA_B
}

/// Clamps a value to the channel range without rounding.
///
/// NaN maps to 0.
#[inline]
pub fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, CHANNEL_MAX) }
}

/// Rounds to nearest and clamps into a storable channel value.
///
/// NaN maps to 0.
///
/// # Example
///
/// ```rust
/// use retouch_core::pixel::clamp_channel;
///
/// assert_eq!(clamp_channel(300.0), 255);
/// assert_eq!(clamp_channel(-4.0), 0);
/// assert_eq!(clamp_channel(12.6), 13);
/// ```
#[inline]
pub fn clamp_channel(v: f64) -> u8 {
    clamp_unit(v).round() as u8
}

/// Widens a pixel to `f64` channels.
#[inline]
pub fn to_f64(px: Rgba) -> [f64; 4] {
    [px[0] as f64, px[1] as f64, px[2] as f64, px[3] as f64]
}

/// Narrows `f64` channels back to a pixel, clamping each one.
#[inline]
pub fn from_f64(px: [f64; 4]) -> Rgba {
    [
        clamp_channel(px[0]),
        clamp_channel(px[1]),
        clamp_channel(px[2]),
        clamp_channel(px[3]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_luma_weights_sum_to_one() {
        assert_abs_diff_eq!(REC601_LUMA.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(luma_rec601(200.0, 200.0, 200.0), 200.0, epsilon = 1e-9);
    }

    #[test]
    fn test_clamp_channel_edges() {
        assert_eq!(clamp_channel(f64::NAN), 0);
        assert_eq!(clamp_channel(f64::INFINITY), 255);
        assert_eq!(clamp_channel(254.5), 255);
        assert_eq!(clamp_channel(0.49), 0);
    }

    #[test]
    fn test_f64_roundtrip() {
        let px = [1, 128, 254, 255];
        assert_eq!(from_f64(to_f64(px)), px);
    }
}
