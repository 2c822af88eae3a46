//! Per-pixel color operations.
//!
//! Stateless functions over channel values on the 0..=255 scale. Inputs and
//! intermediate math are `f64` and may leave the range; every function
//! clamps its result back to [0, 255] (without rounding; rounding happens
//! once, when a pipeline stores the final value).
//!
//! Percent-style parameters use 100 as neutral, additive ones use 0.
//!
//! # Example
//!
//! ```rust
//! use retouch_ops::color;
//!
//! assert_eq!(color::brightness(100.0, 150.0), 150.0);
//! assert_eq!(color::contrast(200.0, 50.0), 164.0);
//! let [r, g, b] = color::hue_rotate(255.0, 0.0, 0.0, 120.0);
//! assert!(r.abs() < 1e-9 && (g - 255.0).abs() < 1e-9 && b.abs() < 1e-9);
//! ```

use retouch_core::pixel::{clamp_unit, luma_rec601, CHANNEL_MAX};

/// Luma weights used by the saturation adjustment.
pub const SATURATION_LUMA: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Red gain per unit of warm temperature.
pub const WARM_RED: f64 = 0.5;
/// Green gain per unit of temperature, both directions.
pub const TEMP_GREEN: f64 = 0.3;
/// Blue gain per unit of cool temperature.
pub const COOL_BLUE: f64 = 0.5;

/// Classic sepia tone matrix, rows are output R, G, B.
pub const SEPIA_MATRIX: [[f64; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

#[inline]
fn clamp3(rgb: [f64; 3]) -> [f64; 3] {
    [clamp_unit(rgb[0]), clamp_unit(rgb[1]), clamp_unit(rgb[2])]
}

/// Scales a channel: `v * pct / 100`.
#[inline]
pub fn brightness(v: f64, pct: f64) -> f64 {
    clamp_unit(v * pct / 100.0)
}

/// Stretches a channel around mid-gray: `(v - 128) * pct / 100 + 128`.
#[inline]
pub fn contrast(v: f64, pct: f64) -> f64 {
    clamp_unit((v - 128.0) * pct / 100.0 + 128.0)
}

/// Photographic exposure: `v * 2^(stops / 100)`.
///
/// `stops` is in hundredths, so +100 doubles and -100 halves.
#[inline]
pub fn exposure(v: f64, stops: f64) -> f64 {
    clamp_unit(v * (stops / 100.0).exp2())
}

/// Blends each channel toward (pct < 100) or away from (pct > 100) luma.
///
/// # Example
///
/// ```rust
/// use retouch_ops::color::saturation;
///
/// // Fully desaturated: every channel lands on the luma value
/// let [r, g, b] = saturation(200.0, 100.0, 50.0, 0.0);
/// assert!((r - g).abs() < 1e-9 && (g - b).abs() < 1e-9);
/// ```
pub fn saturation(r: f64, g: f64, b: f64, pct: f64) -> [f64; 3] {
    let gray = r * SATURATION_LUMA[0] + g * SATURATION_LUMA[1] + b * SATURATION_LUMA[2];
    let k = pct / 100.0;
    clamp3([
        gray + (r - gray) * k,
        gray + (g - gray) * k,
        gray + (b - gray) * k,
    ])
}

/// Warm/cool white-balance shift.
///
/// Positive amounts add to red and green; negative amounts add to green
/// and blue. The warm side never touches blue.
pub fn temperature(r: f64, g: f64, b: f64, amount: f64) -> [f64; 3] {
    if amount > 0.0 {
        clamp3([r + amount * WARM_RED, g + amount * TEMP_GREEN, b])
    } else if amount < 0.0 {
        let a = amount.abs();
        clamp3([r, g + a * TEMP_GREEN, b + a * COOL_BLUE])
    } else {
        clamp3([r, g, b])
    }
}

/// Converts RGB (0..=255) to HSL with every component in [0, 1].
///
/// When all channels are equal, hue and saturation are both 0.
///
/// # Example
///
/// ```rust
/// use retouch_ops::color::rgb_to_hsl;
///
/// let (h, s, l) = rgb_to_hsl(0.0, 0.0, 255.0);
/// assert!((h - 2.0 / 3.0).abs() < 1e-12);
/// assert_eq!((s, l), (1.0, 0.5));
/// ```
pub fn rgb_to_hsl(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let r = r / CHANNEL_MAX;
    let g = g / CHANNEL_MAX;
    let b = b / CHANNEL_MAX;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    (h / 6.0, s, l)
}

#[inline]
fn hue_to_channel(p: f64, q: f64, mut t: f64) -> f64 {
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Converts HSL (each in [0, 1]) back to RGB on the 0..=255 scale.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    if s == 0.0 {
        let v = l * CHANNEL_MAX;
        return clamp3([v, v, v]);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    clamp3([
        hue_to_channel(p, q, h + 1.0 / 3.0) * CHANNEL_MAX,
        hue_to_channel(p, q, h) * CHANNEL_MAX,
        hue_to_channel(p, q, h - 1.0 / 3.0) * CHANNEL_MAX,
    ])
}

/// Rotates hue by `degrees` through HSL, wrapping modulo one turn.
pub fn hue_rotate(r: f64, g: f64, b: f64, degrees: f64) -> [f64; 3] {
    let (h, s, l) = rgb_to_hsl(r, g, b);
    let h = (h + degrees / 360.0).rem_euclid(1.0);
    hsl_to_rgb(h, s, l)
}

/// Sepia tone blended with the original by `amount` in [0, 1].
pub fn sepia(r: f64, g: f64, b: f64, amount: f64) -> [f64; 3] {
    let t = amount.clamp(0.0, 1.0);
    let m = &SEPIA_MATRIX;
    let toned = [
        m[0][0] * r + m[0][1] * g + m[0][2] * b,
        m[1][0] * r + m[1][1] * g + m[1][2] * b,
        m[2][0] * r + m[2][1] * g + m[2][2] * b,
    ];
    clamp3([
        r + (toned[0] - r) * t,
        g + (toned[1] - g) * t,
        b + (toned[2] - b) * t,
    ])
}

/// Rec.601 luma grayscale.
#[inline]
pub fn grayscale(r: f64, g: f64, b: f64) -> f64 {
    clamp_unit(luma_rec601(r, g, b))
}

/// Unweighted channel average, the "black & white" look.
#[inline]
pub fn channel_average(r: f64, g: f64, b: f64) -> f64 {
    clamp_unit((r + g + b) / 3.0)
}

/// Photographic negative of one channel.
#[inline]
pub fn invert(v: f64) -> f64 {
    clamp_unit(CHANNEL_MAX - v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_neutral_values_are_identity() {
        for v in [0.0, 1.0, 127.0, 128.0, 254.0, 255.0] {
            assert_eq!(brightness(v, 100.0), v);
            assert_eq!(contrast(v, 100.0), v);
            assert_eq!(exposure(v, 0.0), v);
        }
    }

    #[test]
    fn test_results_clamped() {
        assert_eq!(brightness(200.0, 200.0), 255.0);
        assert_eq!(contrast(0.0, 200.0), 0.0);
        assert_eq!(exposure(255.0, 100.0), 255.0);
        assert_eq!(invert(-20.0), 255.0);
    }

    #[test]
    fn test_exposure_stops() {
        assert_abs_diff_eq!(exposure(100.0, 100.0), 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(exposure(100.0, -100.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_saturation_neutral_and_boost() {
        let [r, g, b] = saturation(200.0, 100.0, 50.0, 100.0);
        assert_abs_diff_eq!(r, 200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b, 50.0, epsilon = 1e-9);

        let [r2, _, b2] = saturation(200.0, 100.0, 50.0, 150.0);
        assert!(r2 > 200.0 && b2 < 50.0);
    }

    #[test]
    fn test_temperature_asymmetry() {
        let warm = temperature(100.0, 100.0, 100.0, 20.0);
        let cool = temperature(100.0, 100.0, 100.0, -20.0);
        for (got, want) in warm.iter().zip([110.0, 106.0, 100.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
        }
        for (got, want) in cool.iter().zip([100.0, 106.0, 110.0]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-9);
        }
        assert_eq!(temperature(10.0, 20.0, 30.0, 0.0), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_hsl_gray_tie_break() {
        let (h, s, l) = rgb_to_hsl(128.0, 128.0, 128.0);
        assert_eq!((h, s), (0.0, 0.0));
        assert_abs_diff_eq!(l, 128.0 / 255.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hsl_branches() {
        // max == r with g < b wraps into the top of the hue circle
        let (h, _, _) = rgb_to_hsl(255.0, 0.0, 128.0);
        assert!(h > 5.0 / 6.0 && h < 1.0);
        let (h, _, _) = rgb_to_hsl(0.0, 255.0, 0.0);
        assert_abs_diff_eq!(h, 1.0 / 3.0, epsilon = 1e-12);
        // light colors take the l > 0.5 saturation branch
        let (_, s, l) = rgb_to_hsl(255.0, 200.0, 200.0);
        assert!(l > 0.5);
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hsl_round_trip() {
        for &(r, g, b) in &[(12.0, 200.0, 99.0), (255.0, 255.0, 0.0), (3.0, 4.0, 5.0), (250.0, 10.0, 240.0)] {
            let (h, s, l) = rgb_to_hsl(r, g, b);
            let [r2, g2, b2] = hsl_to_rgb(h, s, l);
            assert_abs_diff_eq!(r, r2, epsilon = 1e-9);
            assert_abs_diff_eq!(g, g2, epsilon = 1e-9);
            assert_abs_diff_eq!(b, b2, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_hue_full_turn_matches_zero() {
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    let (r, g, b) = (r as f64, g as f64, b as f64);
                    let a = hue_rotate(r, g, b, 0.0);
                    let z = hue_rotate(r, g, b, 360.0);
                    for c in 0..3 {
                        assert!((a[c].round() - z[c].round()).abs() <= 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_hue_rotate_primaries() {
        let [r, g, b] = hue_rotate(255.0, 0.0, 0.0, -120.0);
        assert_abs_diff_eq!(r, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(g, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b, 255.0, epsilon = 1e-9);
    }

    #[test]
    fn test_grayscale_red() {
        assert_eq!(grayscale(255.0, 0.0, 0.0).round(), 76.0);
        assert_eq!(channel_average(255.0, 0.0, 0.0), 85.0);
    }

    #[test]
    fn test_sepia_amount() {
        assert_eq!(sepia(10.0, 20.0, 30.0, 0.0), [10.0, 20.0, 30.0]);
        let [r, g, b] = sepia(100.0, 100.0, 100.0, 1.0);
        assert_abs_diff_eq!(r, 135.1, epsilon = 1e-9);
        assert_abs_diff_eq!(g, 120.3, epsilon = 1e-9);
        assert_abs_diff_eq!(b, 93.7, epsilon = 1e-9);
    }
}
