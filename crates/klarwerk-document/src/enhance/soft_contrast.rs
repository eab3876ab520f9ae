// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SoftContrast — per-channel 2nd/98th percentile stretch and a light
// cross-shaped sharpen.

use klarwerk_core::error::Result;
use klarwerk_core::types::EnhancementMethod;
use tracing::{debug, instrument};

use super::{EnhancementStrategy, rgb_input, rgb_output};
use crate::filters::convolve::{Border, Kernel3};
use crate::filters::tone::percentile_stretch;
use crate::image::raster::RasterImage;

const LOW_PERCENTILE: f64 = 2.0;
const HIGH_PERCENTILE: f64 = 98.0;
/// Channels whose normalised percentile spread is at or below this are kept as-is.
const MIN_SPREAD: f64 = 0.1;
const SHARPEN: Kernel3 = Kernel3::cross_sharpen(1.4, 0.1);

#[derive(Debug, Clone, Copy, Default)]
pub struct SoftContrast;

impl EnhancementStrategy for SoftContrast {
    fn method(&self) -> EnhancementMethod {
        EnhancementMethod::SoftContrast
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        let rgb = rgb_input(self.method(), image)?;
        let (stretched, plan) =
            percentile_stretch(&rgb, LOW_PERCENTILE, HIGH_PERCENTILE, MIN_SPREAD);
        debug!(?plan, "percentile stretch");
        let out = SHARPEN.apply(&stretched, Border::Reflect101);
        rgb_output(self.method(), image, out)
    }
}
