// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Selection registry and submission history.
//
// Records are keyed by submission id and also kept in insertion order so the
// history can be listed oldest-first or shown newest-first.

use std::collections::HashMap;

use chrono::Utc;
use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::{Primary, SubmissionId, SubmissionRecord, VariantToken};
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<SubmissionId, SubmissionRecord>,
    order: Vec<SubmissionId>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the history. Re-registering an id replaces the record
    /// but keeps its original position.
    #[instrument(skip_all, fields(id = %record.id, variants = record.catalog.len()))]
    pub fn register(&mut self, record: SubmissionRecord) -> SubmissionId {
        let id = record.id;
        if self.records.insert(id, record).is_none() {
            self.order.push(id);
        }
        debug!("submission registered");
        id
    }

    /// Make `token` the primary variant of `id`.
    ///
    /// Fails with `NotFound` if the submission is unknown or the token did
    /// not produce a variant for it.
    #[instrument(skip_all, fields(id = %id, token = %token))]
    pub fn select(&mut self, id: SubmissionId, token: VariantToken) -> Result<&SubmissionRecord> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| KlarwerkError::NotFound(format!("submission {id}")))?;
        if !record.catalog.contains(&token) {
            return Err(KlarwerkError::NotFound(format!(
                "variant {token} of submission {id}"
            )));
        }
        record.primary = Primary::Variant(token);
        record.selected_at = Utc::now();
        info!("primary variant selected");
        Ok(record)
    }

    pub fn get(&self, id: SubmissionId) -> Result<&SubmissionRecord> {
        self.records
            .get(&id)
            .ok_or_else(|| KlarwerkError::NotFound(format!("submission {id}")))
    }

    /// All records, oldest first.
    pub fn list(&self) -> Vec<&SubmissionRecord> {
        self.order.iter().filter_map(|id| self.records.get(id)).collect()
    }

    /// The last `n` records, newest first.
    pub fn recent(&self, n: usize) -> Vec<&SubmissionRecord> {
        self.order
            .iter()
            .rev()
            .take(n)
            .filter_map(|id| self.records.get(id))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Forget every record. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.order.len();
        self.records.clear();
        self.order.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use klarwerk_core::types::{ArtifactHandle, Catalog, EnhancementMethod, ScaleFactor, Variant};

    use super::*;

    fn catalog_of(tokens: &[VariantToken]) -> Catalog {
        let mut catalog = Catalog::new();
        for &token in tokens {
            catalog.insert(Variant {
                token,
                artifact: ArtifactHandle(format!("processed/x_{token}.jpg")),
                byte_size: 100,
                width: 10,
                height: 10,
            });
        }
        catalog
    }

    fn record(name: &str, tokens: &[VariantToken]) -> SubmissionRecord {
        SubmissionRecord::new(
            SubmissionId::new(),
            name.into(),
            ArtifactHandle(format!("uploads/{name}")),
            "00".into(),
            catalog_of(tokens),
        )
    }

    fn token(method: EnhancementMethod, scale: ScaleFactor) -> VariantToken {
        VariantToken::new(method, scale)
    }

    #[test]
    fn register_uses_catalog_default() {
        let mut registry = Registry::new();
        let soft = token(EnhancementMethod::SoftContrast, ScaleFactor::X2);
        let natural = token(EnhancementMethod::NaturalEnhance, ScaleFactor::X3);
        let id = registry.register(record("a.png", &[soft, natural]));
        // NaturalEnhance precedes SoftContrast in declared order.
        assert_eq!(registry.get(id).expect("get").primary, Primary::Variant(natural));
    }

    #[test]
    fn empty_catalog_presents_the_original() {
        let mut registry = Registry::new();
        let id = registry.register(record("broken.png", &[]));
        assert_eq!(registry.get(id).expect("get").primary, Primary::Original);
    }

    #[test]
    fn select_updates_primary_and_timestamp() {
        let mut registry = Registry::new();
        let a = token(EnhancementMethod::SmoothQuality, ScaleFactor::X1);
        let b = token(EnhancementMethod::ProfessionalGentle, ScaleFactor::X2);
        let id = registry.register(record("a.png", &[a, b]));
        let before = registry.get(id).expect("get").selected_at;

        let updated = registry.select(id, b).expect("select");
        assert_eq!(updated.primary, Primary::Variant(b));
        assert!(updated.selected_at >= before);
    }

    #[test]
    fn select_rejects_unknown_submission_and_missing_token() {
        let mut registry = Registry::new();
        let a = token(EnhancementMethod::SmoothQuality, ScaleFactor::X1);
        let id = registry.register(record("a.png", &[a]));

        assert!(registry.select(SubmissionId::new(), a).expect_err("unknown id").is_not_found());

        let missing = token(EnhancementMethod::SoftContrast, ScaleFactor::X3);
        assert!(registry.select(id, missing).expect_err("missing token").is_not_found());
        // Failed selection leaves the record untouched.
        assert_eq!(registry.get(id).expect("get").primary, Primary::Variant(a));
    }

    #[test]
    fn list_and_recent_ordering() {
        let mut registry = Registry::new();
        let ids: Vec<SubmissionId> = ["1.png", "2.png", "3.png"]
            .iter()
            .map(|name| registry.register(record(name, &[])))
            .collect();

        let listed: Vec<SubmissionId> = registry.list().iter().map(|r| r.id).collect();
        assert_eq!(listed, ids);

        let recent: Vec<SubmissionId> = registry.recent(2).iter().map(|r| r.id).collect();
        assert_eq!(recent, vec![ids[2], ids[1]]);
        assert_eq!(registry.recent(10).len(), 3);
    }

    #[test]
    fn clear_forgets_everything() {
        let mut registry = Registry::new();
        let id = registry.register(record("a.png", &[]));
        assert_eq!(registry.clear(), 1);
        assert!(registry.is_empty());
        assert!(registry.get(id).expect_err("cleared").is_not_found());
    }
}
