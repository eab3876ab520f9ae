// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Klarwerk.

use thiserror::Error;

use crate::types::EnhancementMethod;

/// Top-level error type for all Klarwerk operations.
///
/// Pipeline errors (`Decode`, `Strategy`, `Encode`) are terminal for the one
/// variant attempt that raised them; the catalog builder records them and
/// moves on to the next token.
#[derive(Debug, Error)]
pub enum KlarwerkError {
    // -- Pipeline errors --
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("{method} failed: {reason}")]
    Strategy {
        method: EnhancementMethod,
        reason: String,
    },

    #[error("image encoding failed: {0}")]
    Encode(String),

    #[error("unknown enhancement method: {0}")]
    UnknownMethod(String),

    // -- Selection / lookup --
    #[error("not found: {0}")]
    NotFound(String),

    // -- Storage / configuration --
    #[error("artifact storage error: {0}")]
    Storage(String),

    #[error("stored original does not match its hash (expected {expected}, got {actual})")]
    IntegrityMismatch { expected: String, actual: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl KlarwerkError {
    /// Shorthand for a strategy failure.
    pub fn strategy(method: EnhancementMethod, reason: impl Into<String>) -> Self {
        Self::Strategy {
            method,
            reason: reason.into(),
        }
    }

    /// Whether this error is a lookup miss (unknown submission or token).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// A backing artifact that could not be deleted during cleanup.
///
/// Cleanup is best-effort: warnings are logged and reported, but never stop
/// the next batch from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupWarning {
    /// Store-specific name of the artifact (key or file path).
    pub artifact: String,
    pub reason: String,
}

impl std::fmt::Display for CleanupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not delete {}: {}", self.artifact, self.reason)
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, KlarwerkError>;
