// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// NaturalEnhance — thresholded unsharp mask, then contrast and sharpness
// factors relative to the image's own mean and smoothed copy.

use klarwerk_core::error::Result;
use klarwerk_core::types::EnhancementMethod;
use tracing::instrument;

use super::{EnhancementStrategy, rgb_input, rgb_output};
use crate::filters::convolve::unsharp_mask;
use crate::filters::tone::{adjust_contrast, adjust_sharpness};
use crate::image::raster::RasterImage;

const UNSHARP_RADIUS: f32 = 0.5;
const UNSHARP_PERCENT: i32 = 50;
const UNSHARP_THRESHOLD: i32 = 1;
const CONTRAST: f32 = 1.2;
const SHARPNESS: f32 = 1.3;

#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalEnhance;

impl EnhancementStrategy for NaturalEnhance {
    fn method(&self) -> EnhancementMethod {
        EnhancementMethod::NaturalEnhance
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        let rgb = rgb_input(self.method(), image)?;
        let masked = unsharp_mask(&rgb, UNSHARP_RADIUS, UNSHARP_PERCENT, UNSHARP_THRESHOLD);
        let contrasted = adjust_contrast(&masked, CONTRAST);
        let out = adjust_sharpness(&contrasted, SHARPNESS);
        rgb_output(self.method(), image, out)
    }
}
