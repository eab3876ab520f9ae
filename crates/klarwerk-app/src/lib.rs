// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// klarwerk-app — the enhancer service that owns the working set, plus the
// folder mode and data-directory helpers behind the `klarwerk` binary.

pub mod services;

pub use services::enhancer_service::EnhancerService;
pub use services::folder::{FolderReport, enhance_folder};
