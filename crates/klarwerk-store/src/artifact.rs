// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Backing-artifact storage: uploaded originals and encoded variants.
//
// Artifact names are relative, slash-separated paths such as
// `uploads/<id>_original.png` or `processed/<id>_soft_contrast_2x.jpg`.
// The returned handle is the name itself.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::storage::ArtifactSink;
use klarwerk_core::types::ArtifactHandle;
use tracing::{debug, instrument};

/// Sub-folder for uploaded originals.
pub const UPLOADS_DIR: &str = "uploads";
/// Sub-folder for encoded variants.
pub const PROCESSED_DIR: &str = "processed";

/// Full read/write/delete access to stored artifacts.
pub trait ArtifactStore: ArtifactSink {
    /// Stored bytes. `KlarwerkError::NotFound` if the artifact is gone.
    fn get(&self, handle: &ArtifactHandle) -> Result<Vec<u8>>;

    fn contains(&self, handle: &ArtifactHandle) -> bool;

    /// Delete one artifact. Deleting a missing artifact is `NotFound`.
    fn remove(&self, handle: &ArtifactHandle) -> Result<()>;

    /// Every stored artifact, sorted by name.
    fn list(&self) -> Result<Vec<ArtifactHandle>>;
}

/// Reject names that would escape the store (absolute, `..`, empty).
fn validate_name(name: &str) -> Result<()> {
    let path = Path::new(name);
    let all_normal = path.components().all(|c| matches!(c, Component::Normal(_)));
    if name.is_empty() || !all_normal {
        return Err(KlarwerkError::Storage(format!("invalid artifact name: {name:?}")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Keeps every artifact in process memory. Used by tests and the CLI's
/// one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.artifacts
            .lock()
            .map_err(|_| KlarwerkError::Storage("memory store lock poisoned".into()))
    }
}

impl ArtifactSink for MemoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<ArtifactHandle> {
        validate_name(name)?;
        self.lock()?.insert(name.to_owned(), bytes.to_vec());
        Ok(ArtifactHandle(name.to_owned()))
    }
}

impl ArtifactStore for MemoryStore {
    fn get(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        self.lock()?
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| KlarwerkError::NotFound(format!("artifact {handle}")))
    }

    fn contains(&self, handle: &ArtifactHandle) -> bool {
        self.lock().is_ok_and(|map| map.contains_key(handle.as_str()))
    }

    fn remove(&self, handle: &ArtifactHandle) -> Result<()> {
        self.lock()?
            .remove(handle.as_str())
            .map(|_| ())
            .ok_or_else(|| KlarwerkError::NotFound(format!("artifact {handle}")))
    }

    fn list(&self) -> Result<Vec<ArtifactHandle>> {
        Ok(self.lock()?.keys().cloned().map(ArtifactHandle).collect())
    }
}

// ---------------------------------------------------------------------------
// Directory store
// ---------------------------------------------------------------------------

/// Files under a root directory, with `uploads/` and `processed/` created up
/// front. Only those two folders are listed, so other files in the root
/// (such as `config.json`) survive cleanup.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open (creating if needed) a store rooted at `root`.
    #[instrument(skip_all, fields(root = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        for sub in [UPLOADS_DIR, PROCESSED_DIR] {
            fs::create_dir_all(root.join(sub))?;
        }
        debug!("directory store ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path backing `handle`.
    pub fn path_of(&self, handle: &ArtifactHandle) -> PathBuf {
        self.root.join(handle.as_str())
    }

    fn collect(&self, dir: &Path, out: &mut Vec<ArtifactHandle>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                self.collect(&path, out)?;
            } else if let Ok(relative) = path.strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(ArtifactHandle(name));
            }
        }
        Ok(())
    }
}

fn not_found_or(err: std::io::Error, handle: &ArtifactHandle) -> KlarwerkError {
    if err.kind() == ErrorKind::NotFound {
        KlarwerkError::NotFound(format!("artifact {handle}"))
    } else {
        KlarwerkError::Io(err)
    }
}

impl ArtifactSink for DirectoryStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<ArtifactHandle> {
        validate_name(name)?;
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(ArtifactHandle(name.to_owned()))
    }
}

impl ArtifactStore for DirectoryStore {
    fn get(&self, handle: &ArtifactHandle) -> Result<Vec<u8>> {
        validate_name(handle.as_str())?;
        fs::read(self.path_of(handle)).map_err(|err| not_found_or(err, handle))
    }

    fn contains(&self, handle: &ArtifactHandle) -> bool {
        validate_name(handle.as_str()).is_ok() && self.path_of(handle).is_file()
    }

    fn remove(&self, handle: &ArtifactHandle) -> Result<()> {
        validate_name(handle.as_str())?;
        fs::remove_file(self.path_of(handle)).map_err(|err| not_found_or(err, handle))
    }

    fn list(&self) -> Result<Vec<ArtifactHandle>> {
        let mut out = Vec::new();
        for sub in [UPLOADS_DIR, PROCESSED_DIR] {
            let dir = self.root.join(sub);
            if dir.is_dir() {
                self.collect(&dir, &mut out)?;
            }
        }
        out.sort();
        Ok(out)
    }
}
