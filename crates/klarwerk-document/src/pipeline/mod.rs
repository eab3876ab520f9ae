// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline module — per-token orchestration and the twelve-variant catalog.

pub mod catalog;
pub mod orchestrator;

pub use catalog::{AttemptOutcome, BatchReport, CatalogBuilder};
pub use orchestrator::{EncodedVariant, Orchestrator, VariantPipeline};
