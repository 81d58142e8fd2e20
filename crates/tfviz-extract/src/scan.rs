//! Whole-file and whole-tree extraction.

use std::path::{Path, PathBuf};

use tfviz_model::ParsedConfig;
use tracing::debug;

use crate::locals::extract_locals;
use crate::resolve::{detect_conditionals, resolve_references};
use crate::resources::{SkippedBlock, extract_resources};

/// Extraction error.
///
/// Per the tool's best-effort contract, malformed source text is never an
/// error; only a missing or unreadable source tree is.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Source directory does not exist or is not a directory.
    #[error("source directory not found: {}", .0.display())]
    DirNotFound(PathBuf),
    /// Source directory contains no `.tf` files.
    #[error("no .tf files found in {}", .0.display())]
    NoSources(PathBuf),
    /// I/O error reading a source file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of scanning one source tree.
#[derive(Debug)]
pub struct ScanResult {
    /// The extracted configuration, tagged with the caller's tier label.
    pub config: ParsedConfig,
    /// Blocks that were recognized but could not be extracted.
    pub skipped: Vec<SkippedBlock>,
}

/// Run the full extraction pipeline over one source text.
///
/// Locals are extracted first (resources may reference locals, never the
/// reverse), then resources, then reference resolution and conditional
/// detection.
#[must_use]
pub fn parse_text(text: &str, tier: &str) -> ScanResult {
    let locals = extract_locals(text);
    let mut extraction = extract_resources(text);

    resolve_references(&mut extraction.resources, &locals);
    detect_conditionals(&mut extraction.resources, &locals);

    let mut config = ParsedConfig::new(tier);
    config.locals = locals;
    config.resources = extraction.resources;

    ScanResult {
        config,
        skipped: extraction.skipped,
    }
}

/// Parse a single `.tf` file.
pub fn parse_file(path: &Path, tier: &str) -> Result<ScanResult, ExtractError> {
    let text = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_text(&text, tier))
}

/// Parse all `.tf` files in a directory into one configuration.
///
/// Locals from every file are merged before any resource is resolved, so
/// cross-file references work; later files win on conflicting local names.
/// Resources keep per-file declaration order, files in name order.
pub fn parse_dir(dir: &Path, tier: &str) -> Result<ScanResult, ExtractError> {
    if !dir.is_dir() {
        return Err(ExtractError::DirNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = glob::glob(&dir.join("*.tf").to_string_lossy())
        .into_iter()
        .flatten()
        .flatten()
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(ExtractError::NoSources(dir.to_path_buf()));
    }

    let mut texts = Vec::with_capacity(paths.len());
    for path in &paths {
        let text = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
            path: path.clone(),
            source,
        })?;
        texts.push(text);
    }

    let mut config = ParsedConfig::new(tier);
    for text in &texts {
        config.locals.merge(extract_locals(text));
    }

    let mut skipped = Vec::new();
    for (path, text) in paths.iter().zip(&texts) {
        let mut extraction = extract_resources(text);
        debug!(
            path = %path.display(),
            resources = extraction.resources.len(),
            skipped = extraction.skipped.len(),
            "extracted file"
        );
        config.resources.append(&mut extraction.resources);
        skipped.append(&mut extraction.skipped);
    }

    resolve_references(&mut config.resources, &config.locals);
    detect_conditionals(&mut config.resources, &config.locals);

    Ok(ScanResult { config, skipped })
}
