// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Klarwerk — Core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod human_errors;
pub mod storage;
pub mod types;

pub use config::{EnhanceConfig, StorageConfig};
pub use error::{CleanupWarning, KlarwerkError};
pub use storage::ArtifactSink;
pub use types::*;
