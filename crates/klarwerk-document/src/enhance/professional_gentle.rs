// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ProfessionalGentle — luma gamma and gentle CLAHE in YUV, two-stage
// sharpening, and a slight saturation boost.

use klarwerk_core::error::Result;
use klarwerk_core::types::EnhancementMethod;
use tracing::instrument;

use super::{EnhancementStrategy, rgb_input, rgb_output};
use crate::filters::color::{SplitPlanes, merge_yuv, scale_saturation, split_yuv};
use crate::filters::convolve::{Border, Kernel3, unsharp_blend};
use crate::filters::{Clahe, GammaLut};
use crate::image::raster::RasterImage;

const LUMA_EXPONENT: f32 = 0.9;
const CLAHE_CLIP: f32 = 1.0;
const CLAHE_GRID: u32 = 16;
const SHARPEN: Kernel3 = Kernel3::cross_sharpen(1.2, 0.05);
const UNSHARP_SIGMA: f32 = 0.5;
const UNSHARP_AMOUNT: f32 = 0.1;
const SATURATION: f32 = 1.05;

#[derive(Debug, Clone, Copy, Default)]
pub struct ProfessionalGentle;

impl EnhancementStrategy for ProfessionalGentle {
    fn method(&self) -> EnhancementMethod {
        EnhancementMethod::ProfessionalGentle
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        let rgb = rgb_input(self.method(), image)?;

        let yuv = split_yuv(&rgb);
        let lifted = GammaLut::power(LUMA_EXPONENT).apply_gray(&yuv.lightness);
        let equalised = Clahe::new(CLAHE_CLIP, CLAHE_GRID, CLAHE_GRID).apply(&lifted);
        let merged = merge_yuv(&SplitPlanes {
            lightness: equalised,
            ..yuv
        });

        let sharpened = SHARPEN.apply(&merged, Border::Reflect101);
        let refined = unsharp_blend(&sharpened, UNSHARP_SIGMA, UNSHARP_AMOUNT);
        let out = scale_saturation(&refined, SATURATION);
        rgb_output(self.method(), image, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::test_support::document;

    #[test]
    fn keeps_neutral_pixels_neutral() {
        let input = RasterImage::from_raw(
            20,
            20,
            crate::ChannelLayout::Rgb,
            (0..20 * 20).flat_map(|i| {
                let v = (i % 200) as u8 + 30;
                [v, v, v]
            })
            .collect(),
        )
        .expect("raster");
        let out = ProfessionalGentle.apply(&input).expect("apply");
        for p in out.pixels().chunks_exact(3) {
            assert!(p[0].abs_diff(p[1]) <= 2 && p[1].abs_diff(p[2]) <= 2, "{p:?}");
        }
    }

    #[test]
    fn changes_a_document() {
        let input = document(32, 32);
        let out = ProfessionalGentle.apply(&input).expect("apply");
        assert_eq!(out.dimensions(), (32, 32));
        assert_ne!(out, input);
    }
}
