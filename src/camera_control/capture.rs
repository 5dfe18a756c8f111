//! V4L2 frame source.
//!
//! Frames are captured as YUYV through a memory-mapped stream and converted to
//! RGB into a buffer owned by the source, which the returned [`Frame`] borrows.

use tracing::{debug, info};
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::video::Capture;
use v4l::{Device, FourCC};

use crate::camera_control::common::error::{ControlError, Result};
use crate::camera_control::frame::{CHANNELS, Frame, FrameSource};

const BUFFER_COUNT: u32 = 4;
const YUYV: &[u8; 4] = b"YUYV";
const YUYV_BYTES_PER_PIXEL: usize = 2;

pub struct V4lCapture {
    stream: Stream<'static>,
    width: usize,
    height: usize,
    rgb: Vec<u8>,
}

impl V4lCapture {
    /// Opens `path` and asks for `width`×`height` YUYV. The driver may pick a
    /// nearby resolution; the one it settles on is what frames will have.
    pub fn open(path: &str, width: u32, height: u32) -> Result<Self> {
        let device = Device::with_path(path)?;

        let mut format = device.format()?;
        format.width = width;
        format.height = height;
        format.fourcc = FourCC::new(YUYV);
        let format = device.set_format(&format)?;

        if format.fourcc != FourCC::new(YUYV) {
            return Err(ControlError::UnsupportedFormat(format!(
                "{} delivers {}, only YUYV is supported",
                path, format.fourcc
            )));
        }

        info!(
            device = path,
            width = format.width,
            height = format.height,
            "Capture format negotiated"
        );

        let stream = Stream::with_buffers(&device, Type::VideoCapture, BUFFER_COUNT)?;
        let (width, height) = (format.width as usize, format.height as usize);

        Ok(Self {
            stream,
            width,
            height,
            rgb: Vec::with_capacity(width * height * CHANNELS),
        })
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

impl FrameSource for V4lCapture {
    fn next_frame(&mut self) -> Result<Option<Frame<'_>>> {
        let (data, meta) = self
            .stream
            .next()
            .map_err(|e| ControlError::Capture(e.to_string()))?;

        let expected = self.width * self.height * YUYV_BYTES_PER_PIXEL;
        let used = (meta.bytesused as usize).min(data.len());
        if used < expected {
            debug!(used, expected, "Short capture");
            return Ok(None);
        }

        yuyv_to_rgb(&data[..expected], &mut self.rgb);
        Ok(Some(Frame::new(self.width, self.height, &self.rgb)))
    }
}

/// Converts packed YUYV (4:2:2, BT.601 studio range) to interleaved RGB,
/// replacing the contents of `rgb`.
pub fn yuyv_to_rgb(yuyv: &[u8], rgb: &mut Vec<u8>) {
    rgb.clear();
    rgb.reserve(yuyv.len() / YUYV_BYTES_PER_PIXEL * CHANNELS);
    for chunk in yuyv.chunks_exact(4) {
        let (y0, u, y1, v) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        rgb.extend_from_slice(&ycbcr_to_rgb(y0, u, v));
        rgb.extend_from_slice(&ycbcr_to_rgb(y1, u, v));
    }
}

fn ycbcr_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let c = 298 * (i32::from(y) - 16);
    let d = i32::from(u) - 128;
    let e = i32::from(v) - 128;
    let clip = |x: i32| ((x + 128) >> 8).clamp(0, 255) as u8;
    [
        clip(c + 409 * e),
        clip(c - 100 * d - 208 * e),
        clip(c + 516 * d),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_chroma_is_gray() {
        let mut rgb = Vec::new();
        yuyv_to_rgb(&[16, 128, 235, 128, 126, 128, 126, 128], &mut rgb);
        assert_eq!(&rgb[..6], &[0, 0, 0, 255, 255, 255]);
        // mid gray: (298 * 110 + 128) >> 8 = 128
        assert_eq!(&rgb[6..], &[128; 6]);
    }

    #[test]
    fn test_red_chroma_warms_the_pixel() {
        let mut rgb = Vec::new();
        yuyv_to_rgb(&[81, 90, 81, 240], &mut rgb);
        assert_eq!(rgb.len(), 6);
        let (r, g, b) = (rgb[0], rgb[1], rgb[2]);
        assert!(r > 200 && g < 60 && b < 60, "got {:?}", (r, g, b));
    }

    #[test]
    fn test_output_buffer_is_replaced() {
        let mut rgb = vec![1, 2, 3];
        yuyv_to_rgb(&[128, 128, 128, 128], &mut rgb);
        assert_eq!(rgb.len(), 6);
    }
}
