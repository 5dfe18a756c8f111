//! Frame types and the acquisition seam

use crate::camera_control::common::error::Result;

/// Number of interleaved channels in a [`Frame`].
pub const CHANNELS: usize = 3;

/// A borrowed 8-bit RGB raster.
///
/// Frames are lent out by a [`FrameSource`] for a single loop iteration; the
/// borrow ends before the next frame is requested.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Pixel data interleaved [R, G, B, R, G, B, ...]
    pub data: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Self {
        Self { width, height, data }
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// A frame with no pixels, or a buffer too short to hold them, is treated
    /// as a dropped capture.
    pub fn is_empty(&self) -> bool {
        self.pixel_count() == 0 || self.data.len() < self.pixel_count() * CHANNELS
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        let data: &'a [u8] = self.data;
        let len = (self.pixel_count() * CHANNELS).min(data.len());
        data[..len]
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2]])
    }
}

pub trait FrameSource {
    /// Blocks until the next frame is available. `Ok(None)` means the capture
    /// came back empty and the caller should simply try again.
    fn next_frame(&mut self) -> Result<Option<Frame<'_>>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_is_empty() {
        let data = vec![0u8; 5];
        assert!(Frame::new(2, 1, &data).is_empty());
        assert!(Frame::new(0, 0, &[]).is_empty());
        assert!(!Frame::new(1, 1, &data).is_empty());
    }

    #[test]
    fn test_pixels_ignores_trailing_bytes() {
        let data = [1u8, 2, 3, 4, 5, 6, 7];
        let frame = Frame::new(2, 1, &data);
        let pixels: Vec<[u8; 3]> = frame.pixels().collect();
        assert_eq!(pixels, vec![[1, 2, 3], [4, 5, 6]]);
    }
}
