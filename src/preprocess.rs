//! Frame preprocessing: grayscale conversion and PNG encoding.
//!
//! OCR engines work noticeably better on grayscale input, so every captured
//! frame is flattened before it crosses the recognition boundary.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::camera::Frame;

/// Convert an RGBA frame to grayscale in place.
///
/// Each pixel's red, green, and blue channels are replaced by their
/// arithmetic mean; the alpha channel is untouched. The transform is total
/// and idempotent: the integer mean of (m, m, m) is m again.
pub fn grayscale_in_place(frame: &mut Frame) {
    for px in frame.data.chunks_exact_mut(4) {
        let r = px[0] as u32;
        let g = px[1] as u32;
        let b = px[2] as u32;
        let mean = ((r + g + b) / 3) as u8;
        px[0] = mean;
        px[1] = mean;
        px[2] = mean;
    }
}

/// Errors that can occur while encoding a frame.
#[derive(Debug)]
pub enum EncodeError {
    /// Frame dimensions don't match the pixel buffer length
    InvalidDimensions { width: u32, height: u32, len: usize },
    /// The PNG encoder failed
    PngFailed(String),
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::InvalidDimensions { width, height, len } => {
                write!(
                    f,
                    "Frame buffer length {} does not match {}x{} RGBA",
                    len, width, height
                )
            }
            EncodeError::PngFailed(msg) => write!(f, "PNG encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for EncodeError {}

/// Encode a frame as PNG bytes.
///
/// This is the transmissible representation handed to the OCR boundary
/// (and written out by `--save-frame`).
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, EncodeError> {
    let img = RgbaImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
        EncodeError::InvalidDimensions {
            width: frame.width,
            height: frame.height,
            len: frame.data.len(),
        },
    )?;

    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EncodeError::PngFailed(e.to_string()))?;
    Ok(bytes)
}
