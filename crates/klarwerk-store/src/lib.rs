// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klarwerk-store — where uploads and variants live, which variant each
// submission presents, and how all of it is cleared between batches.

pub mod artifact;
pub mod cleanup;
pub mod integrity;
pub mod registry;

pub use artifact::{ArtifactStore, DirectoryStore, MemoryStore};
pub use cleanup::{CleanupReport, cleanup};
pub use registry::Registry;
