// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folder batch mode: enhance every image in a directory with one token.

use std::fs;
use std::path::{Path, PathBuf};

use klarwerk_core::error::{KlarwerkError, Result};
use klarwerk_core::types::VariantToken;
use klarwerk_document::image::codec;
use klarwerk_document::{Orchestrator, VariantPipeline};
use tracing::{info, instrument, warn};

/// Extensions picked up from the input folder (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

/// Outcome of a folder run.
#[derive(Debug, Default)]
pub struct FolderReport {
    /// Output files written, in input name order.
    pub written: Vec<PathBuf>,
    /// Image files found in the input folder.
    pub total: usize,
    pub failures: Vec<(PathBuf, KlarwerkError)>,
}

impl FolderReport {
    pub fn processed(&self) -> usize {
        self.written.len()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Enhance every image in `input` with `token`, writing
/// `enhanced_<stem>.jpg` files into `output`.
///
/// Files that fail to read, decode or enhance are recorded and skipped. Only
/// an unreadable input folder or an uncreatable output folder fails the run.
#[instrument(
    skip_all,
    fields(input = %input.display(), output = %output.display(), token = %token)
)]
pub fn enhance_folder(
    input: &Path,
    output: &Path,
    token: VariantToken,
    quality: u8,
) -> Result<FolderReport> {
    fs::create_dir_all(output)?;

    let mut sources: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    sources.sort();

    let pipeline = Orchestrator::default().with_jpeg_quality(quality);
    let mut report = FolderReport {
        total: sources.len(),
        ..FolderReport::default()
    };

    for source in sources {
        match enhance_file(&pipeline, &source, output, token) {
            Ok(written) => {
                info!(file = %written.display(), "enhanced");
                report.written.push(written);
            }
            Err(err) => {
                warn!(file = %source.display(), error = %err, "skipping file");
                report.failures.push((source, err));
            }
        }
    }

    info!(
        processed = report.processed(),
        total = report.total,
        "folder run finished"
    );
    Ok(report)
}

fn enhance_file(
    pipeline: &dyn VariantPipeline,
    source: &Path,
    output: &Path,
    token: VariantToken,
) -> Result<PathBuf> {
    let bytes = fs::read(source)?;
    let raster = codec::decode_rgb(&bytes)?;
    let encoded = pipeline.run(token, &raster)?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            KlarwerkError::Storage(format!("unusable file name: {}", source.display()))
        })?;
    let target = output.join(format!("enhanced_{stem}.jpg"));
    fs::write(&target, &encoded.bytes)?;
    Ok(target)
}
