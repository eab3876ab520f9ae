// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Runs one variant token end to end: resample, enhance, encode.

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::VariantToken;
use tracing::{debug, instrument};

use crate::enhance::{EnhancementStrategy, strategy_for};
use crate::image::codec::encode_jpeg;
use crate::image::raster::RasterImage;
use crate::image::resample::Resampler;

/// Encoded output of a single pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedVariant {
    pub token: VariantToken,
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Something that can turn a source raster into the encoded variant for a
/// token. The catalog builder drives any implementation of this.
pub trait VariantPipeline: Send + Sync {
    fn run(&self, token: VariantToken, source: &RasterImage) -> Result<EncodedVariant>;
}

/// The standard pipeline: optional Lanczos upscale, then the token's
/// enhancement strategy, then JPEG encoding.
#[derive(Debug, Clone, Default)]
pub struct Orchestrator {
    resampler: Resampler,
    jpeg_quality: Option<u8>,
}

impl Orchestrator {
    pub fn new(resampler: Resampler) -> Self {
        Self {
            resampler,
            jpeg_quality: None,
        }
    }

    /// Override the strategies' own JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = Some(quality.clamp(1, 100));
        self
    }

    /// Pixel stage only: resample to the token's scale and enhance.
    ///
    /// The upscaled intermediate lives only for the duration of this call.
    pub fn enhance(&self, token: VariantToken, source: &RasterImage) -> Result<RasterImage> {
        let strategy = strategy_for(token.method);
        let expected = (
            token.scale.apply(source.width()),
            token.scale.apply(source.height()),
        );

        let enhanced = if token.is_upscaled() {
            let upscaled = self.resampler.resample(source, token.scale)?;
            strategy.apply(&upscaled)?
        } else {
            strategy.apply(source)?
        };

        if enhanced.dimensions() != expected {
            return Err(KlarwerkError::strategy(
                token.method,
                format!(
                    "produced {:?} for a {:?} target",
                    enhanced.dimensions(),
                    expected
                ),
            ));
        }
        Ok(enhanced)
    }

    fn quality_for(&self, strategy: &dyn EnhancementStrategy) -> u8 {
        self.jpeg_quality.unwrap_or_else(|| strategy.encode_quality())
    }
}

impl VariantPipeline for Orchestrator {
    #[instrument(skip_all, fields(token = %token))]
    fn run(&self, token: VariantToken, source: &RasterImage) -> Result<EncodedVariant> {
        let enhanced = self.enhance(token, source)?;
        let quality = self.quality_for(strategy_for(token.method));
        let bytes = encode_jpeg(&enhanced, quality)?;
        let (width, height) = enhanced.dimensions();
        debug!(width, height, bytes = bytes.len(), "variant encoded");
        Ok(EncodedVariant {
            token,
            bytes,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::test_support::document;
    use crate::image::codec;
    use crate::image::raster::ChannelLayout;

    #[test]
    fn every_token_yields_scaled_dimensions() {
        let source = document(13, 9);
        let orchestrator = Orchestrator::default();
        for token in VariantToken::ALL {
            let out = orchestrator.run(token, &source).expect("run");
            let factor = token.scale.factor();
            assert_eq!((out.width, out.height), (13 * factor, 9 * factor), "{token}");
            let probed = codec::probe(&out.bytes).expect("probe");
            assert_eq!((probed.width, probed.height), (out.width, out.height));
        }
    }

    #[test]
    fn runs_are_deterministic() {
        let source = document(16, 12);
        let orchestrator = Orchestrator::default();
        for token in [VariantToken::ALL[0], VariantToken::ALL[5], VariantToken::ALL[9]] {
            let a = orchestrator.run(token, &source).expect("first");
            let b = orchestrator.run(token, &source).expect("second");
            assert_eq!(a, b, "{token}");
        }
    }

    #[test]
    fn upscale_then_enhance_matches_manual_composition() {
        let source = document(10, 8);
        let token: VariantToken = "soft_contrast_2x".parse().expect("token");
        let manual = strategy_for(token.method)
            .apply(&Resampler::default().resample(&source, token.scale).expect("resample"))
            .expect("apply");
        assert_eq!(Orchestrator::default().enhance(token, &source).expect("enhance"), manual);
    }

    #[test]
    fn gray_source_is_rejected_by_the_strategy() {
        let gray = RasterImage::from_raw(4, 4, ChannelLayout::Gray, vec![0; 16]).expect("gray");
        let err = Orchestrator::default()
            .run(VariantToken::default(), &gray)
            .expect_err("gray input");
        assert!(matches!(err, KlarwerkError::Strategy { .. }));
    }

    #[test]
    fn quality_override_changes_output() {
        let source = document(24, 24);
        let token = VariantToken::default();
        let high = Orchestrator::default().run(token, &source).expect("q95");
        let low = Orchestrator::default()
            .with_jpeg_quality(20)
            .run(token, &source)
            .expect("q20");
        assert!(low.bytes.len() < high.bytes.len());
    }
}
