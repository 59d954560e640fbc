use image::RgbImage;
use rand::Rng;
use serde::Serialize;

use crate::codec::{self, EncodedImage};
use crate::error::{Result, TryonError};

/// Largest seed the service accepts.
pub const MAX_SEED: u32 = 999_999;

/// Pick the seed for a request.
///
/// With `randomize` set, a seed is drawn uniformly from `0..=MAX_SEED` and
/// the input is ignored. Otherwise the input is used as-is and must be in
/// range.
pub fn resolve_seed(seed: u32, randomize: bool) -> Result<u32> {
    if randomize {
        return Ok(rand::rng().random_range(0..=MAX_SEED));
    }
    if seed > MAX_SEED {
        return Err(TryonError::InvalidSeed(seed));
    }
    Ok(seed)
}

/// Body of both the submission and the synchronous try-on endpoints.
///
/// ```
/// use tryon_client::TryonRequest;
/// use image::RgbImage;
///
/// let person = RgbImage::new(8, 8);
/// let garment = RgbImage::new(8, 8);
/// let request = TryonRequest::new(&person, &garment, 42).unwrap();
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["seed"], 42);
/// assert!(json["humanImage"].is_string());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TryonRequest {
    pub cloth_image: EncodedImage,
    pub human_image: EncodedImage,
    pub seed: u32,
}

impl TryonRequest {
    /// Encode both images and attach the resolved seed.
    pub fn new(person: &RgbImage, garment: &RgbImage, seed: u32) -> Result<Self> {
        Ok(Self {
            cloth_image: codec::encode(garment)?,
            human_image: codec::encode(person)?,
            seed,
        })
    }
}
