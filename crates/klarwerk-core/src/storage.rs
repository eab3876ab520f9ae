// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Write side of artifact storage, shared by the pipeline and the store crate.

use crate::error::Result;
use crate::types::ArtifactHandle;

/// Destination for encoded variant bytes.
///
/// The catalog builder only ever writes; reading, listing and deletion live on
/// `klarwerk_store::ArtifactStore`.
pub trait ArtifactSink: Send + Sync {
    /// Store `bytes` under `name` and return a handle that stays valid until
    /// the next cleanup.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<ArtifactHandle>;
}
