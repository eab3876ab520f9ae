// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Decoded 8-bit raster buffer passed between pipeline stages.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use klarwerk_core::error::{KlarwerkError, Result};

/// Interleaved channel layout of a `RasterImage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// An immutable decoded image.
///
/// Stages never mutate a `RasterImage`; each returns a new one. The buffer
/// length always equals `width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: Vec<u8>,
}

impl RasterImage {
    // -- Construction ---------------------------------------------------------

    /// Wrap a raw interleaved buffer, rejecting empty or mis-sized input.
    pub fn from_raw(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(KlarwerkError::Decode(format!(
                "image has zero dimension ({width}x{height})"
            )));
        }
        let expected = width as usize * height as usize * layout.channels();
        if pixels.len() != expected {
            return Err(KlarwerkError::Decode(format!(
                "pixel buffer holds {} bytes, {width}x{height} {layout:?} needs {expected}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Convert any decoded image, keeping gray / colour / alpha distinct.
    pub fn from_dynamic(image: DynamicImage) -> Result<Self> {
        let (width, height) = (image.width(), image.height());
        let color = image.color();
        let (layout, pixels) = if color.has_alpha() {
            (ChannelLayout::Rgba, image.into_rgba8().into_raw())
        } else if color.has_color() {
            (ChannelLayout::Rgb, image.into_rgb8().into_raw())
        } else {
            (ChannelLayout::Gray, image.into_luma8().into_raw())
        };
        Self::from_raw(width, height, layout, pixels)
    }

    pub fn from_rgb(image: RgbImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        Self::from_raw(width, height, ChannelLayout::Rgb, image.into_raw())
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    // -- Conversions ----------------------------------------------------------

    /// Rebuild the `image` crate representation of this buffer.
    pub fn to_dynamic(&self) -> Result<DynamicImage> {
        let malformed = || {
            KlarwerkError::Decode(format!(
                "malformed {:?} buffer for {}x{}",
                self.layout, self.width, self.height
            ))
        };
        let pixels = self.pixels.clone();
        let image = match self.layout {
            ChannelLayout::Gray => DynamicImage::ImageLuma8(
                GrayImage::from_raw(self.width, self.height, pixels).ok_or_else(malformed)?,
            ),
            ChannelLayout::Rgb => DynamicImage::ImageRgb8(
                RgbImage::from_raw(self.width, self.height, pixels).ok_or_else(malformed)?,
            ),
            ChannelLayout::Rgba => DynamicImage::ImageRgba8(
                RgbaImage::from_raw(self.width, self.height, pixels).ok_or_else(malformed)?,
            ),
        };
        Ok(image)
    }

    /// Copy out as an `RgbImage`, if this buffer is 3-channel.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.layout != ChannelLayout::Rgb {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Normalise to 3-channel RGB (alpha dropped, gray replicated).
    pub fn into_rgb(self) -> Result<Self> {
        if self.layout == ChannelLayout::Rgb {
            return Ok(self);
        }
        let rgb = self.to_dynamic()?.into_rgb8();
        Self::from_rgb(rgb)
    }
}
