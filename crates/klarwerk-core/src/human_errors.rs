// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the layer that presents results to users.
//
// Every technical error is mapped to plain English with a clear suggestion.

use crate::error::{CleanupWarning, KlarwerkError};

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Only this one variant is affected; the rest of the catalog is fine.
    Partial,
    /// User must do something (pick another file, choose a listed variant).
    ActionRequired,
    /// Cannot be fixed by retrying — damaged file, broken configuration.
    Permanent,
    /// Something went wrong in the background; the result is still usable.
    Warning,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `KlarwerkError` into a `HumanError`.
pub fn humanize_error(err: &KlarwerkError) -> HumanError {
    match err {
        KlarwerkError::Decode(_) => HumanError {
            message: "We couldn't read this image.".into(),
            suggestion: "The file may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        KlarwerkError::Strategy { method, .. } => HumanError {
            message: format!("The \"{method}\" version couldn't be produced."),
            suggestion: "The other versions are unaffected. Pick one of them instead.".into(),
            severity: Severity::Partial,
        },

        KlarwerkError::Encode(_) => HumanError {
            message: "We couldn't save one of the enhanced versions.".into(),
            suggestion: "The other versions are unaffected. Pick one of them instead.".into(),
            severity: Severity::Partial,
        },

        KlarwerkError::UnknownMethod(token) => HumanError {
            message: "That enhancement method doesn't exist.".into(),
            suggestion: format!(
                "Choose one of the listed methods (you asked for \"{token}\")."
            ),
            severity: Severity::ActionRequired,
        },

        KlarwerkError::NotFound(_) => HumanError {
            message: "That file or version is no longer available.".into(),
            suggestion: "Results are cleared whenever a new document is uploaded. Upload the document again.".into(),
            severity: Severity::ActionRequired,
        },

        KlarwerkError::Storage(_) => HumanError {
            message: "The enhanced images couldn't be stored.".into(),
            suggestion: "Check that there is free disk space, then upload the document again.".into(),
            severity: Severity::Permanent,
        },

        KlarwerkError::IntegrityMismatch { .. } => HumanError {
            message: "The stored copy of your upload has changed.".into(),
            suggestion: "Upload the document again to get a fresh set of versions.".into(),
            severity: Severity::ActionRequired,
        },

        KlarwerkError::Config(detail) => HumanError {
            message: "The configuration file has a problem.".into(),
            suggestion: format!("Fix or remove the configuration file. ({detail})"),
            severity: Severity::Permanent,
        },

        KlarwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "We're not allowed to open that file.".into(),
                    suggestion: "Check the file permissions, or copy it somewhere you own.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If it keeps happening, check the disk.".into(),
                    severity: Severity::Permanent,
                }
            }
        }

        KlarwerkError::Serialization(_) => HumanError {
            message: "Some saved settings couldn't be read.".into(),
            suggestion: "The configuration file may be damaged. Remove it to fall back to defaults.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// Describe a cleanup warning. Cleanup failures never block new work.
pub fn humanize_cleanup_warning(warning: &CleanupWarning) -> HumanError {
    HumanError {
        message: "Some old files couldn't be removed.".into(),
        suggestion: format!("This doesn't affect your new results. ({warning})"),
        severity: Severity::Warning,
    }
}
