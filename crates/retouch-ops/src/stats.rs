//! Channel statistics for an info panel.

use retouch_core::pixel::CHANNELS;
use retouch_core::PixelBuffer;
use serde::{Deserialize, Serialize};

/// Per-channel 256-bin histogram of R, G and B.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    /// Red counts.
    pub red: [u32; 256],
    /// Green counts.
    pub green: [u32; 256],
    /// Blue counts.
    pub blue: [u32; 256],
}

impl Histogram {
    /// Total samples in one channel, i.e. the pixel count.
    pub fn total(&self) -> u64 {
        self.red.iter().map(|&n| n as u64).sum()
    }

    /// Most populated bin of each channel, lowest value on ties.
    pub fn peaks(&self) -> [u8; 3] {
        [peak(&self.red), peak(&self.green), peak(&self.blue)]
    }
}

fn peak(bins: &[u32; 256]) -> u8 {
    let mut best = 0usize;
    for (i, &n) in bins.iter().enumerate() {
        if n > bins[best] {
            best = i;
        }
    }
    best as u8
}

/// Counts every R, G and B value. Alpha is ignored.
///
/// # Example
///
/// ```rust
/// use retouch_core::PixelBuffer;
/// use retouch_ops::stats::histogram;
///
/// let buf = PixelBuffer::filled(4, 4, [255, 0, 9, 255]).unwrap();
/// let h = histogram(&buf);
/// assert_eq!(h.red[255], 16);
/// assert_eq!(h.total(), 16);
/// ```
pub fn histogram(buf: &PixelBuffer) -> Histogram {
    let mut h = Histogram {
        red: [0; 256],
        green: [0; 256],
        blue: [0; 256],
    };
    for px in buf.as_raw().chunks_exact(CHANNELS) {
        h.red[px[0] as usize] += 1;
        h.green[px[1] as usize] += 1;
        h.blue[px[2] as usize] += 1;
    }
    h
}

/// Average, minimum and maximum of each color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStats {
    /// Rounded mean of R, G, B.
    pub average: [u8; 3],
    /// Smallest R, G, B.
    pub min: [u8; 3],
    /// Largest R, G, B.
    pub max: [u8; 3],
}

/// Computes [`ImageStats`].
pub fn stats(buf: &PixelBuffer) -> ImageStats {
    let mut sum = [0u64; 3];
    let mut min = [u8::MAX; 3];
    let mut max = [0u8; 3];
    for px in buf.as_raw().chunks_exact(CHANNELS) {
        for c in 0..3 {
            sum[c] += px[c] as u64;
            min[c] = min[c].min(px[c]);
            max[c] = max[c].max(px[c]);
        }
    }
    let n = buf.pixel_count() as u64;
    // Buffers are never empty, so n > 0.
    let average = sum.map(|s| ((2 * s + n) / (2 * n)) as u8);
    ImageStats { average, min, max }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_sums_to_pixel_count() {
        let buf = PixelBuffer::from_fn(17, 5, |x, y| [(x * 15) as u8, (y * 50) as u8, (x ^ y) as u8, 0]).unwrap();
        let h = histogram(&buf);
        let count = buf.pixel_count() as u64;
        for bins in [&h.red, &h.green, &h.blue] {
            assert_eq!(bins.iter().map(|&n| n as u64).sum::<u64>(), count);
        }
    }

    #[test]
    fn test_stats() {
        let buf = PixelBuffer::from_raw(2, 1, vec![0, 100, 255, 9, 1, 200, 255, 9]).unwrap();
        let s = stats(&buf);
        // 0.5 rounds up, 150 exact
        assert_eq!(s.average, [1, 150, 255]);
        assert_eq!(s.min, [0, 100, 255]);
        assert_eq!(s.max, [1, 200, 255]);
    }

    #[test]
    fn test_peaks() {
        let mut buf = PixelBuffer::filled(3, 1, [7, 7, 7, 255]).unwrap();
        buf.put(0, 0, [9, 7, 0, 255]).unwrap();
        assert_eq!(histogram(&buf).peaks(), [7, 7, 7]);
    }
}
