//! Convolution and blur.
//!
//! Edge policy everywhere in this module: kernel taps that fall outside the
//! buffer are skipped. Nothing wraps around and nothing is zero-padded, so
//! blurring a constant field returns the same field right up to the border.
//!
//! # Kernels
//!
//! - [`Kernel::identity`] - Pass-through
//! - [`Kernel::box_kernel`] - Flat average, used with [`convolve_normalized`]
//! - [`Kernel::gaussian`] - Gaussian weights
//! - [`Kernel::sharpen`] - 3x3 sharpen
//! - [`Kernel::emboss`] - 3x3 emboss
//! - [`Kernel::edge_detect`] - Laplacian edges
//!
//! # Example
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//! use retouch_ops::filter::{box_blur, convolve, Kernel};
//!
//! let src = PixelBuffer::filled(16, 16, [90, 120, 150, 255]).unwrap();
//! assert_eq!(convolve(&src, &Kernel::identity(), 1.0, 0.0), src);
//! assert_eq!(box_blur(&src, 3), src);
//! ```

use crate::parallel::{for_each_row, map_rows};
use crate::{OpsError, OpsResult};
use retouch_core::pixel::{clamp_channel, CHANNELS};
use retouch_core::PixelBuffer;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Square convolution kernel with an odd side length.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
    size: usize,
}

impl Kernel {
    /// Creates a kernel from row-major weights.
    ///
    /// # Errors
    ///
    /// [`OpsError::InvalidKernel`] if `size` is even or below 3, the weight
    /// count isn't `size * size`, or a weight isn't finite.
    pub fn new(size: usize, weights: Vec<f64>) -> OpsResult<Self> {
        if size < 3 || size % 2 == 0 {
            return Err(OpsError::InvalidKernel(format!(
                "side length must be odd and >= 3, got {}",
                size
            )));
        }
        if weights.len() != size * size {
            return Err(OpsError::InvalidKernel(format!(
                "expected {} weights for {}x{}, got {}",
                size * size,
                size,
                size,
                weights.len()
            )));
        }
        if weights.iter().any(|w| !w.is_finite()) {
            return Err(OpsError::InvalidKernel("weights must be finite".into()));
        }
        Ok(Self { weights, size })
    }

    /// Creates a kernel from a square array literal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retouch_ops::filter::Kernel;
    ///
    /// let k = Kernel::from_rows([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]]).unwrap();
    /// assert_eq!(k, Kernel::sharpen());
    /// assert!(Kernel::from_rows([[1.0, 1.0], [1.0, 1.0]]).is_err());
    /// ```
    pub fn from_rows<const N: usize>(rows: [[f64; N]; N]) -> OpsResult<Self> {
        Self::new(N, rows.iter().flatten().copied().collect())
    }

    // Built-in kernels are valid by construction.
    fn fixed<const N: usize>(rows: [[f64; N]; N]) -> Self {
        Self {
            weights: rows.iter().flatten().copied().collect(),
            size: N,
        }
    }

    /// Pass-through kernel.
    pub fn identity() -> Self {
        Self::fixed([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]])
    }

    /// Flat `(2r+1)²` kernel of ones; a radius of 0 is bumped to 1.
    ///
    /// Meant for [`convolve_normalized`], which divides by the number of
    /// in-bounds taps per pixel.
    pub fn box_kernel(radius: usize) -> Self {
        let size = 2 * radius.max(1) + 1;
        Self {
            weights: vec![1.0; size * size],
            size,
        }
    }

    /// Normalized Gaussian kernel of side `2r+1`.
    pub fn gaussian(radius: usize, sigma: f64) -> Self {
        let radius = radius.max(1);
        let size = 2 * radius + 1;
        let half = radius as i64;
        let two_sigma2 = 2.0 * sigma.max(f64::EPSILON).powi(2);

        let mut weights = Vec::with_capacity(size * size);
        for y in -half..=half {
            for x in -half..=half {
                weights.push((-((x * x + y * y) as f64) / two_sigma2).exp());
            }
        }
        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }
        Self { weights, size }
    }

    /// 3x3 sharpen kernel, weights sum to 1.
    pub fn sharpen() -> Self {
        Self::fixed([[0.0, -1.0, 0.0], [-1.0, 5.0, -1.0], [0.0, -1.0, 0.0]])
    }

    /// 3x3 emboss kernel; pair with a bias of 128.
    pub fn emboss() -> Self {
        Self::fixed([[-2.0, -1.0, 0.0], [-1.0, 1.0, 1.0], [0.0, 1.0, 2.0]])
    }

    /// 3x3 Laplacian edge detector, weights sum to 0.
    pub fn edge_detect() -> Self {
        Self::fixed([[0.0, -1.0, 0.0], [-1.0, 4.0, -1.0], [0.0, -1.0, 0.0]])
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the side length, rounded down.
    #[inline]
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weight at column `kx`, row `ky`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f64 {
        self.weights[ky * self.size + kx]
    }

    /// Row-major weights.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.weights.iter().sum()
    }
}

/// Visits the in-bounds taps around (x, y) as `(sx, sy, weight)`.
#[inline]
fn for_each_tap<F>(kernel: &Kernel, x: usize, y: usize, w: usize, h: usize, mut f: F)
where
    F: FnMut(usize, usize, f64),
{
    let r = kernel.radius();
    // Clip the kernel window to the buffer instead of testing every tap
    let ky0 = r.saturating_sub(y);
    let ky1 = (h - 1 - y).min(r) + r;
    let kx0 = r.saturating_sub(x);
    let kx1 = (w - 1 - x).min(r) + r;
    for ky in ky0..=ky1 {
        let sy = y + ky - r;
        for kx in kx0..=kx1 {
            f(x + kx - r, sy, kernel.weight(kx, ky));
        }
    }
}

/// Convolves the color channels with `kernel`.
///
/// Per channel: `clamp(Σ weight * sample * factor + bias)`. Out-of-bounds
/// taps are skipped; alpha is copied from the source.
///
/// # Example
///
/// ```rust
/// use retouch_core::PixelBuffer;
/// use retouch_ops::filter::{convolve, Kernel};
///
/// let src = PixelBuffer::filled(4, 4, [100, 100, 100, 200]).unwrap();
/// let out = convolve(&src, &Kernel::emboss(), 1.0, 128.0);
/// // Interior of a flat field: weights sum to 1, so 100 + 128
/// assert_eq!(out.get(1, 1).unwrap(), [228, 228, 228, 200]);
/// ```
pub fn convolve(src: &PixelBuffer, kernel: &Kernel, factor: f64, bias: f64) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    trace!(w, h, kernel = kernel.size(), factor, bias, "convolve");
    let raw = src.as_raw();

    map_rows(src, |y, src_row, dst_row| {
        for x in 0..w {
            let mut sums = [0.0f64; 3];
            for_each_tap(kernel, x, y, w, h, |sx, sy, kw| {
                let i = (sy * w + sx) * CHANNELS;
                sums[0] += raw[i] as f64 * kw;
                sums[1] += raw[i + 1] as f64 * kw;
                sums[2] += raw[i + 2] as f64 * kw;
            });
            let o = x * CHANNELS;
            for c in 0..3 {
                dst_row[o + c] = clamp_channel(sums[c] * factor + bias);
            }
            dst_row[o + 3] = src_row[o + 3];
        }
    })
}

/// Convolves all four channels, dividing each pixel by the sum of the
/// weights that landed in bounds.
///
/// With [`Kernel::box_kernel`] this is a plain average whose denominator
/// shrinks at the borders. Kernels whose in-bounds weights cancel to zero
/// fall back to a factor of 1.
pub fn convolve_normalized(src: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    let (w, h) = (src.width() as usize, src.height() as usize);
    trace!(w, h, kernel = kernel.size(), "convolve_normalized");
    let raw = src.as_raw();

    map_rows(src, |y, _, dst_row| {
        for x in 0..w {
            let mut sums = [0.0f64; 4];
            let mut weight_sum = 0.0f64;
            for_each_tap(kernel, x, y, w, h, |sx, sy, kw| {
                let i = (sy * w + sx) * CHANNELS;
                for c in 0..CHANNELS {
                    sums[c] += raw[i + c] as f64 * kw;
                }
                weight_sum += kw;
            });
            let norm = if weight_sum.abs() > f64::EPSILON { weight_sum } else { 1.0 };
            let o = x * CHANNELS;
            for c in 0..CHANNELS {
                dst_row[o + c] = clamp_channel(sums[c] / norm);
            }
        }
    })
}

/// Box blur of all four channels over a `(2r+1)²` window.
///
/// Separable: a horizontal pass keeps exact integer window sums, a vertical
/// pass adds them up and divides by the number of in-bounds samples. The
/// result equals [`convolve_normalized`] with [`Kernel::box_kernel`].
///
/// A radius of 0 returns a copy.
pub fn box_blur(src: &PixelBuffer, radius: usize) -> PixelBuffer {
    if radius == 0 {
        return src.clone();
    }
    let (w, h) = (src.width() as usize, src.height() as usize);
    debug!(w, h, radius, "box blur");
    let raw = src.as_raw();
    let stride = w * CHANNELS;

    // Horizontal window sums via per-row prefix sums
    let mut hsum = vec![0u64; w * h * CHANNELS];
    for_each_row(&mut hsum, stride, |y, row| {
        let s = &raw[y * stride..(y + 1) * stride];
        let mut prefix = vec![[0u64; CHANNELS]; w + 1];
        for x in 0..w {
            for c in 0..CHANNELS {
                prefix[x + 1][c] = prefix[x][c] + s[x * CHANNELS + c] as u64;
            }
        }
        for x in 0..w {
            let lo = x.saturating_sub(radius);
            let hi = (x + radius).min(w - 1) + 1;
            for c in 0..CHANNELS {
                row[x * CHANNELS + c] = prefix[hi][c] - prefix[lo][c];
            }
        }
    });

    let mut out = src.blank_like();
    for_each_row(out.as_raw_mut(), stride, |y, row| {
        let lo = y.saturating_sub(radius);
        let hi = (y + radius).min(h - 1);
        let count_y = (hi - lo + 1) as u64;

        let mut acc = vec![0u64; stride];
        for sy in lo..=hi {
            for (a, v) in acc.iter_mut().zip(&hsum[sy * stride..(sy + 1) * stride]) {
                *a += v;
            }
        }

        for x in 0..w {
            let count_x = (x.min(radius) + (w - 1 - x).min(radius) + 1) as u64;
            let n = count_x * count_y;
            for c in 0..CHANNELS {
                let total = acc[x * CHANNELS + c];
                // round half up in integers
                row[x * CHANNELS + c] = ((2 * total + n) / (2 * n)) as u8;
            }
        }
    });

    out
}

/// Builds a 1D Gaussian of radius `ceil(3σ)`, unnormalized.
///
/// The radius is capped at `max_radius`; taps past the buffer edge are
/// skipped anyway. `None` when `2σ²` underflows.
fn gaussian_1d(sigma: f64, max_radius: usize) -> Option<Vec<f64>> {
    let two_sigma2 = 2.0 * sigma * sigma;
    if two_sigma2 < f64::MIN_POSITIVE {
        return None;
    }
    let radius = (3.0 * sigma).ceil().clamp(1.0, max_radius.max(1) as f64) as i64;
    Some(
        (-radius..=radius)
            .map(|i| {
                let d = i as f64;
                (-(d * d) / two_sigma2).exp()
            })
            .collect(),
    )
}

/// One separable pass over an interleaved `f64` plane.
///
/// `horizontal` picks the axis. Weights are renormalized over the taps that
/// land in bounds.
fn gaussian_pass(src: &[f64], w: usize, h: usize, weights: &[f64], horizontal: bool) -> Vec<f64> {
    let r = weights.len() / 2;
    let stride = w * CHANNELS;
    let mut dst = vec![0.0f64; src.len()];

    for_each_row(&mut dst, stride, |y, row| {
        for x in 0..w {
            let (pos, len) = if horizontal { (x, w) } else { (y, h) };
            let lo = pos.saturating_sub(r);
            let hi = (pos + r).min(len - 1);

            let mut sums = [0.0f64; CHANNELS];
            let mut norm = 0.0f64;
            for p in lo..=hi {
                let kw = weights[p + r - pos];
                let i = if horizontal {
                    (y * w + p) * CHANNELS
                } else {
                    (p * w + x) * CHANNELS
                };
                for c in 0..CHANNELS {
                    sums[c] += src[i + c] * kw;
                }
                norm += kw;
            }
            for c in 0..CHANNELS {
                row[x * CHANNELS + c] = sums[c] / norm;
            }
        }
    });

    dst
}

/// Separable Gaussian blur of all four channels.
///
/// Non-positive or non-finite `sigma` returns a copy, as does a sigma too
/// small to spread past the centre tap.
pub fn gaussian_blur(src: &PixelBuffer, sigma: f64) -> PixelBuffer {
    if !(sigma.is_finite() && sigma > 0.0) {
        return src.clone();
    }
    let (w, h) = (src.width() as usize, src.height() as usize);
    let Some(weights) = gaussian_1d(sigma, w.max(h)) else {
        return src.clone();
    };
    debug!(w, h, sigma, taps = weights.len(), "gaussian blur");

    let plane: Vec<f64> = src.as_raw().iter().map(|&v| v as f64).collect();
    let temp = gaussian_pass(&plane, w, h, &weights, true);
    let blurred = gaussian_pass(&temp, w, h, &weights, false);

    let mut out = src.blank_like();
    for (d, v) in out.as_raw_mut().iter_mut().zip(&blurred) {
        *d = clamp_channel(*v);
    }
    out
}
