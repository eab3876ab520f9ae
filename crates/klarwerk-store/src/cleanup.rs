// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cleanup — delete every stored artifact and forget every submission.
//
// Best-effort: an artifact that cannot be deleted becomes a warning, and
// the registry is cleared regardless.

use klarwerk_core::error::CleanupWarning;
use tracing::{info, instrument, warn};

use crate::artifact::ArtifactStore;
use crate::registry::Registry;

/// What a cleanup pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub artifacts_removed: usize,
    pub records_cleared: usize,
    pub warnings: Vec<CleanupWarning>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[instrument(skip_all)]
pub fn cleanup(store: &dyn ArtifactStore, registry: &mut Registry) -> CleanupReport {
    let mut report = CleanupReport::default();

    match store.list() {
        Ok(handles) => {
            for handle in handles {
                match store.remove(&handle) {
                    Ok(()) => report.artifacts_removed += 1,
                    // Already gone is as good as deleted.
                    Err(err) if err.is_not_found() => {}
                    Err(err) => report.warnings.push(CleanupWarning {
                        artifact: handle.to_string(),
                        reason: err.to_string(),
                    }),
                }
            }
        }
        Err(err) => report.warnings.push(CleanupWarning {
            artifact: "*".into(),
            reason: format!("could not list artifacts: {err}"),
        }),
    }

    report.records_cleared = registry.clear();

    for warning in &report.warnings {
        warn!(
            artifact = %warning.artifact,
            reason = %warning.reason,
            "cleanup could not delete artifact"
        );
    }
    info!(
        removed = report.artifacts_removed,
        cleared = report.records_cleared,
        warnings = report.warnings.len(),
        "cleanup finished"
    );
    report
}
