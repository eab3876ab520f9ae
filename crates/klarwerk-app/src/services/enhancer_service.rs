// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Enhancer service — accepts an upload, clears the previous batch, builds the
// twelve-variant catalog and answers selection and preview queries.
//
// One batch runs at a time: submissions and cleanups take the batch lock, so
// a second upload waits for the first instead of wiping it mid-flight. The
// registry has its own lock so lookups never wait on a running batch.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::storage::ArtifactSink;
use klarwerk_core::types::{ArtifactMetadata, Primary, SubmissionId, SubmissionRecord, VariantToken};
use klarwerk_core::{EnhanceConfig, StorageConfig};
use klarwerk_document::image::codec;
use klarwerk_document::{BatchReport, CatalogBuilder, Orchestrator, VariantPipeline};
use klarwerk_store::integrity::{hash_bytes, verify_hash};
use klarwerk_store::{
    ArtifactStore, CleanupReport, DirectoryStore, MemoryStore, Registry, cleanup,
};
use tracing::{info, instrument, warn};

/// Name of the JSON configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Shared enhancement service. Cloning is cheap; all clones share state.
#[derive(Clone)]
pub struct EnhancerService {
    store: Arc<dyn ArtifactStore>,
    pipeline: Arc<dyn VariantPipeline>,
    registry: Arc<Mutex<Registry>>,
    batch: Arc<Mutex<()>>,
    config: EnhanceConfig,
}

impl EnhancerService {
    /// Build a service over `store` using the standard pipeline.
    pub fn new(config: EnhanceConfig, store: Arc<dyn ArtifactStore>) -> Result<Self> {
        let pipeline = Orchestrator::default().with_jpeg_quality(config.jpeg_quality);
        Self::with_pipeline(config, store, Arc::new(pipeline))
    }

    /// Build a service with a custom variant pipeline.
    pub fn with_pipeline(
        config: EnhanceConfig,
        store: Arc<dyn ArtifactStore>,
        pipeline: Arc<dyn VariantPipeline>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            pipeline,
            registry: Arc::new(Mutex::new(Registry::new())),
            batch: Arc::new(Mutex::new(())),
            config,
        })
    }

    /// Open the store described by `config.storage`. A directory store with
    /// no explicit root lives in `data_dir`.
    pub fn init(config: EnhanceConfig, data_dir: &Path) -> Result<Self> {
        let store: Arc<dyn ArtifactStore> = match &config.storage {
            StorageConfig::Memory => Arc::new(MemoryStore::new()),
            StorageConfig::Directory { root } => {
                let root = root.clone().unwrap_or_else(|| data_dir.to_path_buf());
                Arc::new(DirectoryStore::open(root)?)
            }
        };
        info!(storage = ?config.storage, "enhancer service initialised");
        Self::new(config, store)
    }

    /// An in-memory service with default settings, for when the data
    /// directory is unusable.
    pub fn fallback() -> Result<Self> {
        Self::new(EnhanceConfig::default(), Arc::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    // -- Locks ---------------------------------------------------------------

    fn lock_batch(&self) -> Result<MutexGuard<'_, ()>> {
        self.batch
            .lock()
            .map_err(|_| KlarwerkError::Storage("batch lock poisoned".into()))
    }

    fn lock_registry(&self) -> Result<MutexGuard<'_, Registry>> {
        self.registry
            .lock()
            .map_err(|_| KlarwerkError::Storage("registry lock poisoned".into()))
    }

    // -- Batches -------------------------------------------------------------

    /// Enhance one upload into a full catalog.
    ///
    /// Clears all previous artifacts and history first. The submission is
    /// always recorded, even when no variant succeeds (its primary is then
    /// the original). An empty upload is rejected with `Decode` before
    /// anything is cleared; otherwise only failing to store the original
    /// aborts the call.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn submit(&self, filename: &str, bytes: &[u8]) -> Result<(SubmissionId, BatchReport)> {
        if bytes.is_empty() {
            return Err(KlarwerkError::Decode(format!("{filename} is empty")));
        }
        let _batch = self.lock_batch()?;

        let cleaned = {
            let mut registry = self.lock_registry()?;
            cleanup(self.store.as_ref(), &mut registry)
        };
        if !cleaned.is_clean() {
            warn!(
                warnings = cleaned.warnings.len(),
                "previous batch not fully removed"
            );
        }

        let id = SubmissionId::new();
        let original_name = format!("uploads/{id}_original.{}", extension_of(filename));
        let original_artifact = self.store.put(&original_name, bytes)?;
        let original_hash = hash_bytes(bytes);

        let sink: &dyn ArtifactSink = self.store.as_ref();
        let report = CatalogBuilder::new(self.pipeline.as_ref())
            .parallel(self.config.parallel)
            .build_from_bytes(bytes, sink, &format!("processed/{id}"));

        let record = SubmissionRecord::new(
            id,
            filename.to_owned(),
            original_artifact,
            original_hash,
            report.catalog().clone(),
        );
        self.lock_registry()?.register(record);

        info!(
            %id,
            succeeded = report.success_count(),
            attempted = report.total_attempted(),
            primary = ?report.default_primary(),
            "submission processed"
        );
        Ok((id, report))
    }

    /// Delete every artifact and forget every submission.
    pub fn cleanup(&self) -> Result<CleanupReport> {
        let _batch = self.lock_batch()?;
        let mut registry = self.lock_registry()?;
        Ok(cleanup(self.store.as_ref(), &mut registry))
    }

    // -- Selection & history -------------------------------------------------

    /// Make `token` the presented variant of submission `id`.
    pub fn select(&self, id: SubmissionId, token: VariantToken) -> Result<SubmissionRecord> {
        self.lock_registry()?.select(id, token).cloned()
    }

    pub fn get(&self, id: SubmissionId) -> Result<SubmissionRecord> {
        self.lock_registry()?.get(id).cloned()
    }

    /// Every submission, oldest first.
    pub fn list(&self) -> Result<Vec<SubmissionRecord>> {
        Ok(self.lock_registry()?.list().into_iter().cloned().collect())
    }

    /// Newest submissions first, capped at `history_limit`.
    pub fn recent(&self) -> Result<Vec<SubmissionRecord>> {
        let limit = self.config.history_limit;
        Ok(self
            .lock_registry()?
            .recent(limit)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn submission_count(&self) -> Result<usize> {
        Ok(self.lock_registry()?.len())
    }

    // -- Artifacts -----------------------------------------------------------

    /// Byte size and pixel dimensions of a variant, read from the stored
    /// artifact on every call.
    pub fn variant_metadata(
        &self,
        id: SubmissionId,
        token: VariantToken,
    ) -> Result<ArtifactMetadata> {
        codec::probe(&self.variant_bytes(id, token)?)
    }

    /// Byte size and pixel dimensions of the uploaded original.
    pub fn original_metadata(&self, id: SubmissionId) -> Result<ArtifactMetadata> {
        codec::probe(&self.original_bytes(id)?)
    }

    pub fn variant_bytes(&self, id: SubmissionId, token: VariantToken) -> Result<Vec<u8>> {
        let handle = {
            let registry = self.lock_registry()?;
            let record = registry.get(id)?;
            record
                .catalog
                .get(&token)
                .map(|variant| variant.artifact.clone())
                .ok_or_else(|| {
                    KlarwerkError::NotFound(format!("variant {token} of submission {id}"))
                })?
        };
        self.store.get(&handle)
    }

    /// The uploaded bytes, checked against the hash taken at upload.
    pub fn original_bytes(&self, id: SubmissionId) -> Result<Vec<u8>> {
        let (handle, hash) = {
            let registry = self.lock_registry()?;
            let record = registry.get(id)?;
            (record.original_artifact.clone(), record.original_hash.clone())
        };
        let bytes = self.store.get(&handle)?;
        verify_hash(&bytes, &hash)?;
        Ok(bytes)
    }

    /// Bytes of whatever the submission currently presents.
    pub fn primary_bytes(&self, id: SubmissionId) -> Result<Vec<u8>> {
        match self.get(id)?.primary {
            Primary::Original => self.original_bytes(id),
            Primary::Variant(token) => self.variant_bytes(id, token),
        }
    }

    /// Download file name: `enhanced_<stem>_<token>.jpg` for a specific
    /// variant, `enhanced_<stem>.jpg` for the primary.
    pub fn download_name(&self, id: SubmissionId, token: Option<VariantToken>) -> Result<String> {
        let record = self.get(id)?;
        let stem = record.original_stem();
        Ok(match token {
            Some(token) => format!("enhanced_{stem}_{token}.jpg"),
            None => format!("enhanced_{stem}.jpg"),
        })
    }
}

/// Lowercased extension of an uploaded file name, `bin` if there is none.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_owned(), str::to_ascii_lowercase)
}

// -- Configuration ------------------------------------------------------------

/// Load `config.json` from the data directory, if present and valid.
pub fn load_config(data_dir: &Path) -> Option<EnhanceConfig> {
    load_config_from(&data_dir.join(CONFIG_FILE)).ok()
}

/// Load and validate a configuration file.
pub fn load_config_from(path: &Path) -> Result<EnhanceConfig> {
    let data = std::fs::read_to_string(path)?;
    EnhanceConfig::from_json(&data)
}

/// Write `config` as pretty JSON into the data directory.
pub fn persist_config(data_dir: &Path, config: &EnhanceConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(data_dir.join(CONFIG_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use klarwerk_core::types::{EnhancementMethod, ScaleFactor};
    use klarwerk_document::{EncodedVariant, RasterImage};

    use super::*;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let rgb = RgbImage::from_fn(width, height, |x, y| {
            if y % 5 == 1 && x % 7 < 4 {
                Rgb([40, 40, 50])
            } else {
                Rgb([(200 + (x % 9)) as u8, (195 + (y % 7)) as u8, 185])
            }
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut out, ImageFormat::Png)
            .expect("png");
        out.into_inner()
    }

    /// Runs only the allowed tokens; the rest fail.
    struct OnlyTokens {
        inner: Orchestrator,
        allowed: HashSet<VariantToken>,
    }

    impl VariantPipeline for OnlyTokens {
        fn run(&self, token: VariantToken, source: &RasterImage) -> Result<EncodedVariant> {
            if !self.allowed.contains(&token) {
                return Err(KlarwerkError::strategy(token.method, "disabled for this test"));
            }
            self.inner.run(token, source)
        }
    }

    fn memory_service() -> EnhancerService {
        EnhancerService::new(EnhanceConfig::default(), Arc::new(MemoryStore::new()))
            .expect("service")
    }

    fn service_allowing(tokens: &[VariantToken]) -> (EnhancerService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let pipeline = OnlyTokens {
            inner: Orchestrator::default(),
            allowed: tokens.iter().copied().collect(),
        };
        let service = EnhancerService::with_pipeline(
            EnhanceConfig::default(),
            store.clone(),
            Arc::new(pipeline),
        )
        .expect("service");
        (service, store)
    }

    #[test]
    fn smooth_quality_2x_doubles_dimensions() {
        let token: VariantToken = "smooth_quality_2x".parse().expect("token");
        let (service, _) = service_allowing(&[token]);

        let (id, report) = service.submit("page.png", &png(100, 150)).expect("submit");
        assert_eq!(report.total_attempted(), 12);
        assert_eq!(report.success_count(), 1);

        let meta = service.variant_metadata(id, token).expect("metadata");
        assert_eq!((meta.width, meta.height), (200, 300));
        let bytes = service.variant_bytes(id, token).expect("bytes");
        assert_eq!(meta.byte_size, bytes.len() as u64);
        assert_eq!(&bytes[..2], &[0xFF, 0xD8], "JPEG SOI marker");

        assert_eq!(service.get(id).expect("record").primary, Primary::Variant(token));
    }

    #[test]
    fn full_batch_on_small_upload() {
        let service = memory_service();
        let (id, report) = service.submit("scan.PNG", &png(16, 12)).expect("submit");
        assert_eq!(report.success_count(), 12);

        let record = service.get(id).expect("record");
        assert_eq!(record.catalog.len(), 12);
        assert_eq!(
            record.primary,
            Primary::Variant(VariantToken::new(EnhancementMethod::SmoothQuality, ScaleFactor::X1))
        );
        assert!(record.original_artifact.as_str().ends_with("_original.png"));

        for token in VariantToken::ALL {
            let meta = service.variant_metadata(id, token).expect("metadata");
            let f = token.scale.factor();
            assert_eq!((meta.width, meta.height), (16 * f, 12 * f), "{token}");
        }
        let original = service.original_metadata(id).expect("original");
        assert_eq!((original.width, original.height), (16, 12));
    }

    #[test]
    fn partial_failure_sets_first_success_as_primary() {
        let allowed = [VariantToken::ALL[4], VariantToken::ALL[10]];
        let (service, _) = service_allowing(&allowed);
        let (id, report) = service.submit("a.jpg", &png(10, 10)).expect("submit");

        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failures().count(), 10);
        assert_eq!(report.default_primary(), Primary::Variant(VariantToken::ALL[4]));

        let missing = VariantToken::ALL[0];
        let err = service.variant_metadata(id, missing).expect_err("failed token");
        assert!(err.is_not_found());
    }

    #[test]
    fn undecodable_upload_is_still_recorded() {
        let service = memory_service();
        let (id, report) = service
            .submit("notes.txt", b"plain text, not an image")
            .expect("submit");
        assert_eq!(report.success_count(), 0);
        assert!(
            report
                .failures()
                .all(|(_, err)| matches!(err, KlarwerkError::Decode(_)))
        );

        let record = service.get(id).expect("record");
        assert_eq!(record.primary, Primary::Original);
        let primary = service.primary_bytes(id).expect("primary");
        assert_eq!(primary, b"plain text, not an image");
    }

    #[test]
    fn select_changes_primary_and_rejects_unknowns() {
        let service = memory_service();
        let (id, _) = service.submit("doc.png", &png(8, 8)).expect("submit");
        let choice = VariantToken::new(EnhancementMethod::ProfessionalGentle, ScaleFactor::X3);

        let record = service.select(id, choice).expect("select");
        assert_eq!(record.primary, Primary::Variant(choice));
        let primary = service.primary_bytes(id).expect("primary");
        assert_eq!(primary, service.variant_bytes(id, choice).expect("variant"));

        let unknown = service.select(SubmissionId::new(), choice).expect_err("unknown");
        assert!(unknown.is_not_found());
    }

    #[test]
    fn new_submission_clears_the_previous_batch() {
        let (service, store) = service_allowing(&[VariantToken::ALL[0]]);
        let (first, _) = service.submit("one.png", &png(8, 8)).expect("first");
        let (second, _) = service.submit("two.png", &png(8, 8)).expect("second");

        assert!(service.get(first).expect_err("first cleared").is_not_found());
        assert!(
            service
                .variant_metadata(first, VariantToken::ALL[0])
                .expect_err("first variant gone")
                .is_not_found()
        );
        assert_eq!(service.submission_count().expect("count"), 1);
        assert_eq!(service.recent().expect("recent")[0].id, second);
        // Original + one variant of the second submission only.
        assert_eq!(store.list().expect("list").len(), 2);
    }

    #[test]
    fn explicit_cleanup_leaves_nothing() {
        let store = Arc::new(MemoryStore::new());
        let service =
            EnhancerService::new(EnhanceConfig::default(), store.clone()).expect("service");
        let (id, report) = service.submit("x.png", &png(6, 6)).expect("submit");
        assert_eq!(report.success_count(), 12);

        let report = service.cleanup().expect("cleanup");
        assert!(report.is_clean());
        assert_eq!(report.artifacts_removed, 13);
        assert!(store.list().expect("list").is_empty());
        assert!(service.get(id).expect_err("gone").is_not_found());
        assert!(service.primary_bytes(id).expect_err("gone").is_not_found());
        assert!(service.original_metadata(id).expect_err("gone").is_not_found());
        assert!(service.list().expect("list").is_empty());

        for token in VariantToken::ALL {
            let metadata = service.variant_metadata(id, token).expect_err("metadata");
            assert!(metadata.is_not_found(), "{token}");
            let bytes = service.variant_bytes(id, token).expect_err("bytes");
            assert!(bytes.is_not_found(), "{token}");
            let select = service.select(id, token).expect_err("select");
            assert!(select.is_not_found(), "{token}");
        }
    }

    #[test]
    fn empty_upload_keeps_the_previous_batch() {
        let (service, store) = service_allowing(&[VariantToken::ALL[0]]);
        let (id, _) = service.submit("first.png", &png(6, 6)).expect("submit");

        let err = service.submit("empty.png", b"").expect_err("empty upload");
        assert!(matches!(err, KlarwerkError::Decode(_)));

        assert_eq!(service.get(id).expect("still there").id, id);
        assert_eq!(store.list().expect("list").len(), 2);
        assert!(service.variant_bytes(id, VariantToken::ALL[0]).is_ok());
    }

    #[test]
    fn tampered_original_fails_integrity_check() {
        let (service, store) = service_allowing(&[]);
        let (id, _) = service.submit("x.png", &png(4, 4)).expect("submit");
        let handle = service.get(id).expect("record").original_artifact;
        store.put(handle.as_str(), b"something else").expect("overwrite");

        assert!(matches!(
            service.original_bytes(id),
            Err(KlarwerkError::IntegrityMismatch { .. })
        ));
    }

    #[test]
    fn download_names_follow_the_upload_stem() {
        let (service, _) = service_allowing(&[]);
        let (id, _) = service.submit("receipt 2024.jpeg", &png(4, 4)).expect("submit");
        let token = VariantToken::new(EnhancementMethod::SoftContrast, ScaleFactor::X2);
        assert_eq!(
            service.download_name(id, Some(token)).expect("name"),
            "enhanced_receipt 2024_soft_contrast_2x.jpg"
        );
        let primary_name = service.download_name(id, None).expect("name");
        assert_eq!(primary_name, "enhanced_receipt 2024.jpg");
    }

    #[test]
    fn directory_storage_uses_uploads_and_processed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = EnhanceConfig {
            storage: StorageConfig::Directory { root: None },
            ..EnhanceConfig::default()
        };
        let service = EnhancerService::init(config, tmp.path()).expect("init");
        let (id, _) = service.submit("page.png", &png(6, 6)).expect("submit");

        let record = service.get(id).expect("record");
        assert!(tmp.path().join(record.original_artifact.as_str()).is_file());
        let variant = record.catalog.iter().next().expect("variant");
        assert!(variant.artifact.as_str().starts_with("processed/"));
        assert!(tmp.path().join(variant.artifact.as_str()).is_file());
    }

    #[test]
    fn clones_share_state() {
        let service = memory_service();
        let clone = service.clone();
        let (id, _) = service.submit("a.png", &png(4, 4)).expect("submit");
        assert_eq!(clone.get(id).expect("via clone").id, id);
    }

    #[test]
    fn config_round_trips_through_data_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        assert!(load_config(tmp.path()).is_none());

        let config = EnhanceConfig {
            jpeg_quality: 80,
            parallel: true,
            ..EnhanceConfig::default()
        };
        persist_config(tmp.path(), &config).expect("persist");
        let loaded = load_config(tmp.path()).expect("load");
        assert_eq!(loaded.jpeg_quality, 80);
        assert!(loaded.parallel);
    }

    #[test]
    fn extension_is_normalised() {
        assert_eq!(extension_of("Scan.JPG"), "jpg");
        assert_eq!(extension_of("noext"), "bin");
        assert_eq!(extension_of("weird.j/pg"), "bin");
    }
}
