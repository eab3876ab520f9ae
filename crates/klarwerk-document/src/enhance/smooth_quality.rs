// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// SmoothQuality — light colour denoise, half-strength CLAHE on lightness,
// soft unsharp blend and a small gamma lift.

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::EnhancementMethod;
use tracing::{debug, instrument};

use super::{EnhancementStrategy, rgb_input, rgb_output};
use crate::filters::color::{SplitPlanes, merge_lab, split_lab};
use crate::filters::convolve::{unsharp_blend, weighted_blend};
use crate::filters::{Clahe, GammaLut, NlMeans};
use crate::image::raster::RasterImage;

const DENOISE: NlMeans = NlMeans {
    h: 3.0,
    template_radius: 2,
    search_radius: 7,
};
const CLAHE_CLIP: f32 = 1.5;
const CLAHE_GRID: u32 = 12;
/// Share of the equalised lightness in the final L plane.
const EQUALISED_WEIGHT: f32 = 0.6;
const UNSHARP_SIGMA: f32 = 1.0;
const UNSHARP_AMOUNT: f32 = 0.3;
const GAMMA: f32 = 0.95;

#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothQuality;

impl EnhancementStrategy for SmoothQuality {
    fn method(&self) -> EnhancementMethod {
        EnhancementMethod::SmoothQuality
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn apply(&self, image: &RasterImage) -> Result<RasterImage> {
        let rgb = rgb_input(self.method(), image)?;

        // Denoise in Lab so colour and lightness noise are judged together.
        let lab = split_lab(&rgb);
        let mut denoised = DENOISE
            .apply(&[lab.lightness, lab.chroma_a, lab.chroma_b])
            .into_iter();
        let (Some(lightness), Some(chroma_a), Some(chroma_b)) =
            (denoised.next(), denoised.next(), denoised.next())
        else {
            return Err(KlarwerkError::strategy(
                self.method(),
                "denoise returned fewer planes than it was given",
            ));
        };

        let equalised = Clahe::new(CLAHE_CLIP, CLAHE_GRID, CLAHE_GRID).apply(&lightness);
        let blended = weighted_blend(
            &equalised,
            EQUALISED_WEIGHT,
            &lightness,
            1.0 - EQUALISED_WEIGHT,
        );

        let merged = merge_lab(&SplitPlanes {
            lightness: blended,
            chroma_a,
            chroma_b,
        });
        let sharpened = unsharp_blend(&merged, UNSHARP_SIGMA, UNSHARP_AMOUNT);
        let out = GammaLut::correction(GAMMA).apply_rgb(&sharpened);

        debug!("smooth quality applied");
        rgb_output(self.method(), image, out)
    }
}
