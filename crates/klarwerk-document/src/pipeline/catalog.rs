// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Variant catalog builder — fans one decoded upload out into all twelve
// method × scale variants, storing each success and recording each failure.

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::storage::ArtifactSink;
use klarwerk_core::types::{Catalog, Primary, Variant, VariantToken};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

use super::orchestrator::VariantPipeline;
use crate::image::codec;
use crate::image::raster::RasterImage;

/// Result of one token's attempt.
#[derive(Debug)]
pub struct AttemptOutcome {
    pub token: VariantToken,
    pub result: Result<Variant>,
}

impl AttemptOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Every attempt of a batch, in declared token order, plus the catalog of
/// successes.
#[derive(Debug)]
pub struct BatchReport {
    attempts: Vec<AttemptOutcome>,
    catalog: Catalog,
}

impl BatchReport {
    fn from_attempts(attempts: Vec<AttemptOutcome>) -> Self {
        let mut catalog = Catalog::new();
        for attempt in &attempts {
            if let Ok(variant) = &attempt.result {
                catalog.insert(variant.clone());
            }
        }
        Self { attempts, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    pub fn attempts(&self) -> &[AttemptOutcome] {
        &self.attempts
    }

    pub fn success_count(&self) -> usize {
        self.catalog.len()
    }

    pub fn total_attempted(&self) -> usize {
        self.attempts.len()
    }

    /// Failed tokens with their errors, in declared order.
    pub fn failures(&self) -> impl Iterator<Item = (VariantToken, &KlarwerkError)> {
        self.attempts
            .iter()
            .filter_map(|a| a.result.as_ref().err().map(|err| (a.token, err)))
    }

    /// First successful token in declared order, or the original.
    pub fn default_primary(&self) -> Primary {
        self.catalog.default_primary()
    }
}

/// Drives a `VariantPipeline` over every token.
pub struct CatalogBuilder<'a> {
    pipeline: &'a dyn VariantPipeline,
    parallel: bool,
}

impl<'a> CatalogBuilder<'a> {
    pub fn new(pipeline: &'a dyn VariantPipeline) -> Self {
        Self {
            pipeline,
            parallel: false,
        }
    }

    /// Run attempts on the rayon pool. Output order is unaffected.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Attempt all twelve tokens against `source`, storing each encoded
    /// variant in `sink` as `{name_prefix}_{token}.jpg`.
    ///
    /// A failed attempt is recorded and the batch continues.
    #[instrument(skip_all, fields(prefix = name_prefix, parallel = self.parallel))]
    pub fn build(
        &self,
        source: &RasterImage,
        sink: &dyn ArtifactSink,
        name_prefix: &str,
    ) -> BatchReport {
        let attempt = |token: &VariantToken| AttemptOutcome {
            token: *token,
            result: self.attempt(*token, source, sink, name_prefix),
        };

        let attempts: Vec<AttemptOutcome> = if self.parallel {
            VariantToken::ALL.par_iter().map(attempt).collect()
        } else {
            VariantToken::ALL.iter().map(attempt).collect()
        };

        let report = BatchReport::from_attempts(attempts);
        for (token, err) in report.failures() {
            warn!(token = %token, error = %err, "variant attempt failed");
        }
        info!(
            succeeded = report.success_count(),
            attempted = report.total_attempted(),
            "variant batch finished"
        );
        report
    }

    /// Decode `bytes` and build. Undecodable input yields a report in which
    /// every attempt failed with the decode error.
    pub fn build_from_bytes(
        &self,
        bytes: &[u8],
        sink: &dyn ArtifactSink,
        name_prefix: &str,
    ) -> BatchReport {
        match codec::decode_rgb(bytes) {
            Ok(source) => self.build(&source, sink, name_prefix),
            Err(err) => {
                warn!(error = %err, "source could not be decoded; no variants attempted");
                let reason = err.to_string();
                let attempts = VariantToken::ALL
                    .iter()
                    .map(|token| AttemptOutcome {
                        token: *token,
                        result: Err(KlarwerkError::Decode(reason.clone())),
                    })
                    .collect();
                BatchReport::from_attempts(attempts)
            }
        }
    }

    fn attempt(
        &self,
        token: VariantToken,
        source: &RasterImage,
        sink: &dyn ArtifactSink,
        name_prefix: &str,
    ) -> Result<Variant> {
        let encoded = self.pipeline.run(token, source)?;
        let artifact = sink.put(&format!("{name_prefix}_{token}.jpg"), &encoded.bytes)?;
        Ok(Variant {
            token,
            artifact,
            byte_size: encoded.bytes.len() as u64,
            width: encoded.width,
            height: encoded.height,
        })
    }
}
