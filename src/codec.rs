//! Conversion between in-memory RGB images and the base64 JPEG text the
//! try-on service exchanges in its JSON bodies.
//!
//! The service speaks plain JPEG produced by a BGR-native encoder from a BGR
//! buffer. The `image` crate encodes and decodes RGB buffers natively, so a
//! JPEG written from an [`RgbImage`] carries the same colours, and decoding
//! hands back RGB. The channel mapping happens exactly once per direction,
//! inside the encoder and decoder.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use serde::Serialize;
use std::path::Path;

use crate::error::{CodecError, TryonError};

/// JPEG quality used for uploads.
pub const JPEG_QUALITY: u8 = 95;

/// Base64-encoded JPEG bytes, ready to embed in a request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EncodedImage(String);

impl EncodedImage {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Encode an RGB image as base64 JPEG.
pub fn encode(image: &RgbImage) -> Result<EncodedImage, CodecError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(CodecError::EmptyImage);
    }

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode_image(image)?;
    Ok(EncodedImage(STANDARD.encode(jpeg)))
}

/// Decode a base64 image payload back into an RGB image.
///
/// Accepts any format the crate is built with, not only JPEG.
pub fn decode(payload: &str) -> Result<RgbImage, CodecError> {
    let bytes = STANDARD.decode(payload.trim())?;
    let image = image::load_from_memory(&bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(CodecError::EmptyImage);
    }
    Ok(image.to_rgb8())
}

/// Load an image file from disk as RGB.
pub fn load_image(path: &Path) -> Result<RgbImage, TryonError> {
    let bytes = std::fs::read(path).map_err(|e| TryonError::Io {
        context: format!("Failed to read image {}", path.display()),
        source: e,
    })?;
    let image = image::load_from_memory(&bytes).map_err(CodecError::from)?;
    Ok(image.to_rgb8())
}
