//! Shared vision types

use std::io::Cursor;

use image::RgbImage;
use serde::Deserialize;

use crate::Result;

/// Face location in image coordinates, `(top, right, bottom, left)` order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FaceBox {
    /// Top edge (pixels from the image top)
    pub top: u32,
    /// Right edge
    pub right: u32,
    /// Bottom edge
    pub bottom: u32,
    /// Left edge
    pub left: u32,
}

impl FaceBox {
    /// Scale all edges by an integer factor
    ///
    /// Used to map boxes detected on a downscaled frame back to full-frame
    /// coordinates.
    #[must_use]
    pub const fn scale(&self, factor: u32) -> Self {
        Self {
            top: self.top * factor,
            right: self.right * factor,
            bottom: self.bottom * factor,
            left: self.left * factor,
        }
    }
}

/// One detected face: location plus its embedding vector
#[derive(Debug, Clone)]
pub struct Detection {
    /// Face location in the coordinates of the image that was searched
    pub location: FaceBox,
    /// Fixed-length facial feature vector
    pub embedding: Vec<f32>,
}

/// Encode an RGB frame as JPEG
///
/// # Errors
///
/// Returns error if encoding fails
pub fn encode_jpeg(frame: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut buf), 85);
    encoder.encode(
        frame.as_raw(),
        frame.width(),
        frame.height(),
        image::ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
