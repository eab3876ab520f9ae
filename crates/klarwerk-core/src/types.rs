// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Klarwerk enhancement pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::KlarwerkError;

/// Unique identifier for one uploaded document and its variant catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubmissionId {
    type Err = KlarwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| KlarwerkError::NotFound(format!("submission {s}")))
    }
}

// ---------------------------------------------------------------------------
// Enhancement methods and scale factors
// ---------------------------------------------------------------------------

/// The four enhancement strategies, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnhancementMethod {
    /// Light NL-means denoise, blended CLAHE, soft unsharp, gamma lift.
    SmoothQuality,
    /// Unsharp mask, contrast and sharpness enhancement.
    NaturalEnhance,
    /// Per-channel percentile stretch plus a light sharpening kernel.
    SoftContrast,
    /// Luma gamma + CLAHE, two-stage sharpen, slight saturation boost.
    ProfessionalGentle,
}

impl EnhancementMethod {
    pub const ALL: [Self; 4] = [
        Self::SmoothQuality,
        Self::NaturalEnhance,
        Self::SoftContrast,
        Self::ProfessionalGentle,
    ];

    /// Token prefix used at the boundary (`smooth_quality`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmoothQuality => "smooth_quality",
            Self::NaturalEnhance => "natural_enhance",
            Self::SoftContrast => "soft_contrast",
            Self::ProfessionalGentle => "professional_gentle",
        }
    }

    /// Short description for listings.
    pub fn description(&self) -> &'static str {
        match self {
            Self::SmoothQuality => "smooth quality improvement",
            Self::NaturalEnhance => "natural enhancement",
            Self::SoftContrast => "soft contrast without artifacts",
            Self::ProfessionalGentle => "professional gentle processing",
        }
    }
}

impl fmt::Display for EnhancementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnhancementMethod {
    type Err = KlarwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| KlarwerkError::UnknownMethod(s.to_owned()))
    }
}

/// Integer upscale applied before the enhancement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScaleFactor {
    X1,
    X2,
    X3,
}

impl ScaleFactor {
    pub const ALL: [Self; 3] = [Self::X1, Self::X2, Self::X3];

    pub fn factor(&self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X3 => 3,
        }
    }

    /// Token suffix (`""`, `"_2x"`, `"_3x"`).
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::X1 => "",
            Self::X2 => "_2x",
            Self::X3 => "_3x",
        }
    }

    /// Scale a pixel dimension, rounding to the nearest integer.
    pub fn apply(&self, dimension: u32) -> u32 {
        (dimension as f64 * self.factor() as f64).round() as u32
    }
}

// ---------------------------------------------------------------------------
// Variant tokens
// ---------------------------------------------------------------------------

/// One of the twelve (method, scale) pipeline configurations.
///
/// Ordering follows the catalog iteration order: methods in declared order,
/// and within each method the scales 1x, 2x, 3x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VariantToken {
    pub method: EnhancementMethod,
    pub scale: ScaleFactor,
}

impl VariantToken {
    pub const ALL: [Self; 12] = {
        let mut all = [Self::new(EnhancementMethod::SmoothQuality, ScaleFactor::X1); 12];
        let mut m = 0;
        while m < 4 {
            let mut s = 0;
            while s < 3 {
                all[m * 3 + s] = Self::new(EnhancementMethod::ALL[m], ScaleFactor::ALL[s]);
                s += 1;
            }
            m += 1;
        }
        all
    };

    pub const fn new(method: EnhancementMethod, scale: ScaleFactor) -> Self {
        Self { method, scale }
    }

    /// Parse a boundary token, falling back to `smooth_quality` for anything
    /// unrecognised.
    pub fn parse_lenient(token: &str) -> Self {
        token.parse().unwrap_or_default()
    }

    pub fn is_upscaled(&self) -> bool {
        self.scale != ScaleFactor::X1
    }
}

impl Default for VariantToken {
    fn default() -> Self {
        Self::new(EnhancementMethod::SmoothQuality, ScaleFactor::X1)
    }
}

impl fmt::Display for VariantToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.method, self.scale.suffix())
    }
}

impl FromStr for VariantToken {
    type Err = KlarwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, scale) = if let Some(base) = s.strip_suffix("_2x") {
            (base, ScaleFactor::X2)
        } else if let Some(base) = s.strip_suffix("_3x") {
            (base, ScaleFactor::X3)
        } else {
            (s, ScaleFactor::X1)
        };
        let method = base
            .parse::<EnhancementMethod>()
            .map_err(|_| KlarwerkError::UnknownMethod(s.to_owned()))?;
        Ok(Self::new(method, scale))
    }
}

impl TryFrom<String> for VariantToken {
    type Error = KlarwerkError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VariantToken> for String {
    fn from(token: VariantToken) -> Self {
        token.to_string()
    }
}

// ---------------------------------------------------------------------------
// Artifacts and variants
// ---------------------------------------------------------------------------

/// Opaque reference to a stored artifact (encoded image bytes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactHandle(pub String);

impl ArtifactHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size and pixel dimensions of a stored artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// Output of one successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub token: VariantToken,
    pub artifact: ArtifactHandle,
    pub byte_size: u64,
    pub width: u32,
    pub height: u32,
}

/// Successful variants of one submission, keyed by token in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog(BTreeMap<VariantToken, Variant>);

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variant: Variant) {
        self.0.insert(variant.token, variant);
    }

    pub fn get(&self, token: &VariantToken) -> Option<&Variant> {
        self.0.get(token)
    }

    pub fn contains(&self, token: &VariantToken) -> bool {
        self.0.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Variants in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Variant> {
        self.0.values()
    }

    pub fn tokens(&self) -> impl Iterator<Item = VariantToken> + '_ {
        self.0.keys().copied()
    }

    /// The default primary: first successful token in declared order.
    pub fn default_primary(&self) -> Primary {
        self.0
            .keys()
            .next()
            .map_or(Primary::Original, |token| Primary::Variant(*token))
    }
}

/// Which output a submission currently presents as "the" result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primary {
    /// No variant succeeded; the uploaded original stands in.
    Original,
    Variant(VariantToken),
}

/// One uploaded document with its catalog and current selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub original_name: String,
    pub original_artifact: ArtifactHandle,
    /// SHA-256 of the uploaded bytes.
    pub original_hash: String,
    pub uploaded_at: DateTime<Utc>,
    pub catalog: Catalog,
    pub primary: Primary,
    pub selected_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Build a record whose primary is the catalog default.
    pub fn new(
        id: SubmissionId,
        original_name: String,
        original_artifact: ArtifactHandle,
        original_hash: String,
        catalog: Catalog,
    ) -> Self {
        let now = Utc::now();
        let primary = catalog.default_primary();
        Self {
            id,
            original_name,
            original_artifact,
            original_hash,
            uploaded_at: now,
            catalog,
            primary,
            selected_at: now,
        }
    }

    /// File stem of the uploaded name (`scan.png` → `scan`).
    pub fn original_stem(&self) -> &str {
        std::path::Path::new(&self.original_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image")
    }
}
