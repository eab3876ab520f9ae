// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decode uploaded bytes into a `RasterImage` and encode enhanced rasters as
// JPEG. Operates on in-memory buffers using the `image` crate.

use std::io::Cursor;

use image::ImageReader;
use image::codecs::jpeg::JpegEncoder;
use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::ArtifactMetadata;
use tracing::{debug, instrument};

use super::raster::RasterImage;

/// Decode raw encoded bytes (JPEG, PNG, BMP, TIFF, etc.).
#[instrument(skip(data), fields(data_len = data.len()))]
pub fn decode(data: &[u8]) -> Result<RasterImage> {
    let img = image::load_from_memory(data)
        .map_err(|err| KlarwerkError::Decode(format!("failed to decode image: {}", err)))?;
    debug!(
        width = img.width(),
        height = img.height(),
        "Image decoded from bytes"
    );
    RasterImage::from_dynamic(img)
}

/// Decode and normalise to 3-channel RGB, the layout every strategy expects.
pub fn decode_rgb(data: &[u8]) -> Result<RasterImage> {
    decode(data)?.into_rgb()
}

/// Encode as baseline JPEG with the given quality (1-100).
///
/// The `image` encoder writes all three components at full resolution, so
/// chroma is never subsampled.
pub fn encode_jpeg(raster: &RasterImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = raster.to_dynamic()?.into_rgb8();
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(|err| KlarwerkError::Encode(format!("JPEG encoding failed: {}", err)))?;
    debug!(bytes = buffer.len(), quality, "JPEG encoded");
    Ok(buffer)
}

/// Byte size and pixel dimensions of encoded bytes, read from the header.
pub fn probe(data: &[u8]) -> Result<ArtifactMetadata> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|err| KlarwerkError::Decode(format!("failed to read dimensions: {}", err)))?;
    Ok(ArtifactMetadata {
        byte_size: data.len() as u64,
        width,
        height,
    })
}
