//! # cp-media
//!
//! `ImageNormalizer` implementation on top of the `image` crate.
//! Auto-orients from EXIF metadata, bounds both dimensions to 1920px without
//! ever upscaling, and re-encodes to JPEG at quality 80. Decoding is
//! CPU-bound, so it runs on the blocking pool behind a one-permit semaphore:
//! one large decode at a time process-wide keeps memory flat under load.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use cp_core::error::{AppError, Result};
use cp_core::traits::{EncodedImage, ImageNormalizer};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ImageReader};
use tokio::sync::Semaphore;

const MAX_DIMENSION: u32 = 1920;
const JPEG_QUALITY: u8 = 80;

pub struct JpegNormalizer {
    decode_slots: Arc<Semaphore>,
}

impl JpegNormalizer {
    pub fn new() -> Self {
        Self {
            decode_slots: Arc::new(Semaphore::new(1)),
        }
    }
}

impl Default for JpegNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageNormalizer for JpegNormalizer {
    async fn normalize(&self, raw: &[u8]) -> Result<EncodedImage> {
        let _slot = self
            .decode_slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| AppError::Internal(format!("decode semaphore closed: {e}")))?;

        let raw = raw.to_vec();
        let bytes = tokio::task::spawn_blocking(move || reencode(&raw))
            .await
            .map_err(|e| AppError::Internal(format!("decode task panicked: {e}")))??;

        Ok(EncodedImage {
            bytes,
            content_type: "image/jpeg",
            extension: "jpg",
        })
    }
}

fn reencode(raw: &[u8]) -> Result<Vec<u8>> {
    let reader = ImageReader::new(Cursor::new(raw))
        .with_guessed_format()
        .map_err(|e| AppError::AssetDecode(e.to_string()))?;
    let mut decoder = reader
        .into_decoder()
        .map_err(|e| AppError::AssetDecode(e.to_string()))?;
    let orientation = image::ImageDecoder::orientation(&mut decoder)
        .unwrap_or(Orientation::NoTransforms);

    let mut img = DynamicImage::from_decoder(decoder)
        .map_err(|e| AppError::AssetDecode(e.to_string()))?;
    img.apply_orientation(orientation);

    if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);
    }

    // JPEG has no alpha channel; flatten before encoding.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .map_err(|e| AppError::Internal(format!("jpeg encode failed: {e}")))?;
    Ok(out.into_inner())
}
