// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancement strategies — fixed, deterministic pixel recipes tuned for
// photographed and scanned documents.
//
// Each strategy takes a 3-channel RGB raster and returns a new one of the
// same size. Resampling and encoding happen outside, in the pipeline.

mod natural_enhance;
mod professional_gentle;
mod smooth_quality;
mod soft_contrast;

use image::RgbImage;
use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::EnhancementMethod;

use crate::image::raster::{ChannelLayout, RasterImage};

pub use natural_enhance::NaturalEnhance;
pub use professional_gentle::ProfessionalGentle;
pub use smooth_quality::SmoothQuality;
pub use soft_contrast::SoftContrast;

/// JPEG quality every strategy encodes at.
pub const ENCODE_QUALITY: u8 = 95;

/// A pure image-to-image enhancement recipe.
pub trait EnhancementStrategy: Send + Sync {
    fn method(&self) -> EnhancementMethod;

    /// Enhance `image`. Fails with `KlarwerkError::Strategy` on unsupported
    /// input; never mutates the argument.
    fn apply(&self, image: &RasterImage) -> Result<RasterImage>;

    /// JPEG quality for this strategy's output.
    fn encode_quality(&self) -> u8 {
        ENCODE_QUALITY
    }
}

static SMOOTH_QUALITY: SmoothQuality = SmoothQuality;
static NATURAL_ENHANCE: NaturalEnhance = NaturalEnhance;
static SOFT_CONTRAST: SoftContrast = SoftContrast;
static PROFESSIONAL_GENTLE: ProfessionalGentle = ProfessionalGentle;

/// The strategy implementing `method`.
pub fn strategy_for(method: EnhancementMethod) -> &'static dyn EnhancementStrategy {
    match method {
        EnhancementMethod::SmoothQuality => &SMOOTH_QUALITY,
        EnhancementMethod::NaturalEnhance => &NATURAL_ENHANCE,
        EnhancementMethod::SoftContrast => &SOFT_CONTRAST,
        EnhancementMethod::ProfessionalGentle => &PROFESSIONAL_GENTLE,
    }
}

/// Borrow the input as an `RgbImage`, rejecting any other layout.
pub(crate) fn rgb_input(method: EnhancementMethod, image: &RasterImage) -> Result<RgbImage> {
    if image.layout() != ChannelLayout::Rgb {
        return Err(KlarwerkError::strategy(
            method,
            format!("expected 3-channel RGB input, got {:?}", image.layout()),
        ));
    }
    image.to_rgb_image().ok_or_else(|| {
        KlarwerkError::strategy(method, "RGB buffer does not match its dimensions")
    })
}

/// Wrap a strategy's result, checking it kept the input size.
pub(crate) fn rgb_output(
    method: EnhancementMethod,
    input: &RasterImage,
    output: RgbImage,
) -> Result<RasterImage> {
    if output.dimensions() != input.dimensions() {
        return Err(KlarwerkError::strategy(
            method,
            format!(
                "output is {:?}, input was {:?}",
                output.dimensions(),
                input.dimensions()
            ),
        ));
    }
    RasterImage::from_rgb(output)
}

#[cfg(test)]
pub(crate) mod test_support {
    use image::{Rgb, RgbImage};

    use crate::image::raster::RasterImage;

    /// A small synthetic "document": light paper, dark text strokes, a
    /// coloured stamp and mild noise.
    pub fn document(width: u32, height: u32) -> RasterImage {
        let rgb = RgbImage::from_fn(width, height, |x, y| {
            let noise = ((x * 7 + y * 13) % 5) as u8;
            if y % 6 == 2 && x % 9 < 6 {
                Rgb([30 + noise, 32 + noise, 40 + noise])
            } else if x > width * 2 / 3 && y > height * 2 / 3 {
                Rgb([190 + noise, 60, 70])
            } else {
                Rgb([215 + noise, 210 + noise, 198 + noise])
            }
        });
        RasterImage::from_rgb(rgb).expect("raster")
    }
}
