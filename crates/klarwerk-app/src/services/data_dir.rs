// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

/// `explicit` if given, otherwise `$XDG_DATA_HOME/klarwerk` (falling back
/// to `~/.local/share/klarwerk`). Created if needed; creation failures
/// surface later when the store opens it.
pub fn resolve(explicit: Option<&Path>) -> PathBuf {
    let dir = match explicit {
        Some(path) => path.to_path_buf(),
        None => base_dir().join("klarwerk"),
    };
    std::fs::create_dir_all(&dir).ok();
    dir
}

fn base_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local").join("share");
    }
    PathBuf::from("/tmp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins_and_is_created() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let wanted = tmp.path().join("nested").join("data");
        assert_eq!(resolve(Some(&wanted)), wanted);
        assert!(wanted.is_dir());
    }
}
