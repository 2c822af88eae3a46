//! Owned RGBA pixel buffer.
//!
//! [`PixelBuffer`] is the substrate every transform reads from and writes
//! to. It owns a contiguous `Vec<u8>` of `width * height * 4` bytes laid out
//! row-major, top-to-bottom:
//!
//! ```text
//! Memory: [R G B A R G B A ...]  <- Row 0
//!         [R G B A R G B A ...]  <- Row 1
//!         ...
//! ```
//!
//! Buffers are never aliased and mutated: transforms borrow a source and
//! allocate a new output. `clone()` is a deep copy, which is what history
//! snapshots rely on.
//!
//! # Usage
//!
//! ```rust
//! use retouch_core::PixelBuffer;
//!
//! let mut buf = PixelBuffer::filled(4, 3, [128, 128, 128, 255]).unwrap();
//! buf.set(1, 2, [300.0, -2.0, 10.0, 255.0]).unwrap();
//! assert_eq!(buf.get(1, 2).unwrap(), [255, 0, 10, 255]);
//! assert!(buf.get(4, 0).is_err());
//! ```

use crate::pixel::{clamp_channel, Rgba, CHANNELS};
use crate::{Error, Rect, Result};

/// Owned 8-bit RGBA image buffer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Pixel data omitted
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Validates dimensions and returns the byte length they require.
fn byte_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "width and height must be > 0"));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(CHANNELS))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))
}

impl PixelBuffer {
    /// Creates a transparent black buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if either dimension is zero or the byte
    /// count overflows.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Creates a buffer where every pixel is `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> Result<Self> {
        let len = byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for _ in 0..len / CHANNELS {
            data.extend_from_slice(&pixel);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wraps existing RGBA bytes, e.g. the output of an image decoder.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDimensions`] if `data.len() != width * height * 4`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retouch_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::from_raw(2, 1, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
    /// assert_eq!(buf.get(1, 0).unwrap(), [5, 6, 7, 8]);
    /// assert!(PixelBuffer::from_raw(2, 2, vec![0; 8]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} bytes, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let len = byte_len(width, height)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Bytes held by the pixel data.
    #[inline]
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Rectangle covering the whole buffer.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw RGBA bytes.
    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw RGBA bytes. The length can't change, so the size
    /// invariant holds.
    #[inline]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer and returns its bytes.
    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    #[inline]
    fn check(&self, x: u32, y: u32) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(())
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `x >= width` or `y >= height`.
    pub fn get(&self, x: u32, y: u32) -> Result<Rgba> {
        self.check(x, y)?;
        let i = self.offset(x, y);
        Ok([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Writes the pixel at (x, y), rounding and clamping each channel to [0, 255].
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `x >= width` or `y >= height`.
    pub fn set(&mut self, x: u32, y: u32, rgba: [f32; 4]) -> Result<()> {
        self.check(x, y)?;
        let i = self.offset(x, y);
        for (c, v) in rgba.iter().enumerate() {
            self.data[i + c] = clamp_channel(*v as f64);
        }
        Ok(())
    }

    /// Writes an exact pixel value at (x, y).
    pub fn put(&mut self, x: u32, y: u32, px: Rgba) -> Result<()> {
        self.check(x, y)?;
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&px);
        Ok(())
    }

    /// Fills every pixel with `px`.
    pub fn fill(&mut self, px: Rgba) {
        for chunk in self.data.chunks_exact_mut(CHANNELS) {
            chunk.copy_from_slice(&px);
        }
    }

    /// Row `y` as a byte slice.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfBounds`] if `y >= height`.
    pub fn row(&self, y: u32) -> Result<&[u8]> {
        self.check(0, y)?;
        let start = y as usize * self.stride();
        Ok(&self.data[start..start + self.stride()])
    }

    /// Iterates rows top to bottom.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.data.chunks_exact(self.stride())
    }

    /// Iterates `(x, y, pixel)` in row-major order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use retouch_core::PixelBuffer;
    ///
    /// let buf = PixelBuffer::filled(3, 2, [9, 9, 9, 255]).unwrap();
    /// assert_eq!(buf.pixels().count(), 6);
    /// assert!(buf.pixels().all(|(_, _, px)| px == [9, 9, 9, 255]));
    /// ```
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Rgba)> + '_ {
        let w = self.width;
        self.data
            .chunks_exact(CHANNELS)
            .enumerate()
            .map(move |(i, c)| {
                let i = i as u32;
                (i % w, i / w, [c[0], c[1], c[2], c[3]])
            })
    }

    /// Returns `true` if `other` has the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.dimensions() == other.dimensions()
    }

    /// Fails with [`Error::DimensionMismatch`] unless both buffers share dimensions.
    pub fn ensure_same_size(&self, other: &PixelBuffer) -> Result<()> {
        if !self.same_size(other) {
            return Err(Error::dimension_mismatch(self.dimensions(), other.dimensions()));
        }
        Ok(())
    }

    /// Allocates a zeroed buffer with the same dimensions.
    pub fn blank_like(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            data: vec![0; self.data.len()],
        }
    }

    /// Allocates a zeroed buffer with width and height swapped.
    pub fn blank_transposed(&self) -> Self {
        Self {
            width: self.height,
            height: self.width,
            data: vec![0; self.data.len()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent_black() {
        let buf = PixelBuffer::new(3, 2).unwrap();
        assert_eq!(buf.as_raw().len(), 3 * 2 * 4);
        assert!(buf.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(PixelBuffer::new(0, 5), Err(Error::InvalidDimensions { .. })));
        assert!(matches!(PixelBuffer::filled(5, 0, [0; 4]), Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_from_raw_length_checked() {
        let err = PixelBuffer::from_raw(2, 2, vec![0; 15]).unwrap_err();
        assert!(err.to_string().contains("expected 16 bytes"));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut buf = PixelBuffer::new(2, 2).unwrap();
        assert_eq!(buf.get(2, 0), Err(Error::out_of_bounds(2, 0, 2, 2)));
        assert_eq!(buf.set(0, 2, [0.0; 4]), Err(Error::out_of_bounds(0, 2, 2, 2)));
        buf.set(1, 1, [1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(buf.get(1, 1).unwrap(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_set_clamps() {
        let mut buf = PixelBuffer::new(1, 1).unwrap();
        buf.set(0, 0, [-10.0, 255.4, 1000.0, f32::NAN]).unwrap();
        assert_eq!(buf.get(0, 0).unwrap(), [0, 255, 255, 0]);
    }

    #[test]
    fn test_clone_is_deep() {
        let a = PixelBuffer::filled(2, 2, [10, 20, 30, 255]).unwrap();
        let mut b = a.clone();
        b.put(0, 0, [0, 0, 0, 0]).unwrap();
        assert_eq!(a.get(0, 0).unwrap(), [10, 20, 30, 255]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_rows_and_pixels_order() {
        let buf = PixelBuffer::from_fn(3, 2, |x, y| [x as u8, y as u8, 0, 255]).unwrap();
        assert_eq!(buf.rows().len(), 2);
        assert_eq!(&buf.row(1).unwrap()[..4], &[0, 1, 0, 255]);
        let coords: Vec<_> = buf.pixels().map(|(x, y, _)| (x, y)).collect();
        assert_eq!(coords[4], (1, 1));
        assert!(buf.row(2).is_err());
    }

    #[test]
    fn test_ensure_same_size() {
        let a = PixelBuffer::new(2, 3).unwrap();
        let b = PixelBuffer::new(3, 2).unwrap();
        assert!(a.ensure_same_size(&a.blank_like()).is_ok());
        assert_eq!(
            a.ensure_same_size(&b),
            Err(Error::dimension_mismatch((2, 3), (3, 2)))
        );
    }

    #[test]
    fn test_blank_transposed() {
        let a = PixelBuffer::filled(5, 2, [9; 4]).unwrap();
        let t = a.blank_transposed();
        assert_eq!(t.dimensions(), (2, 5));
        assert!(t.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_debug_is_compact() {
        let buf = PixelBuffer::new(64, 64).unwrap();
        let s = format!("{:?}", buf);
        assert!(s.contains("64"));
        assert!(s.len() < 100);
    }
}
