// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klarwerk-document — Document image enhancement for Klarwerk.
//
// Provides the raster type and codec, a Lanczos resampler, the pixel filters
// (colour spaces, CLAHE, NL-means denoise, convolution, tone curves), the four
// enhancement strategies, and the pipeline that fans one upload out into a
// twelve-entry variant catalog.

pub mod enhance;
pub mod filters;
pub mod image;
pub mod pipeline;

// Re-export the primary structs so callers can use `klarwerk_document::Orchestrator` etc.
pub use enhance::{EnhancementStrategy, strategy_for};
pub use crate::image::raster::{ChannelLayout, RasterImage};
pub use crate::image::resample::Resampler;
pub use pipeline::catalog::{AttemptOutcome, BatchReport, CatalogBuilder};
pub use pipeline::orchestrator::{EncodedVariant, Orchestrator, VariantPipeline};
