//! Figure rendering with parallel HTTP requests to a Kroki service.
//!
//! DOT sources are POSTed to the service's `graphviz` endpoint, which runs
//! the actual layout. Rendering is parallel over the rayon thread pool and
//! returns partial results, so one failing figure does not discard the
//! rest. Output filenames carry a content hash, so re-rendering unchanged
//! figures overwrites byte-identical files.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use ureq::Agent;

/// Image format requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Svg,
    #[default]
    Png,
    Pdf,
}

impl OutputFormat {
    /// Kroki format path segment, also the file extension.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        }
    }

    /// Parse a format name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// One figure to render.
#[derive(Debug)]
pub struct FigureRequest {
    /// Output filename stem (without hash or extension).
    pub stem: String,
    /// DOT source.
    pub dot: String,
}

impl FigureRequest {
    pub fn new(stem: impl Into<String>, dot: impl Into<String>) -> Self {
        Self {
            stem: stem.into(),
            dot: dot.into(),
        }
    }

    /// First 12 hex characters of the content hash.
    ///
    /// The hash covers the DOT source, format, and DPI, so any change to
    /// what the service would produce changes the filename.
    fn content_hash(&self, format: OutputFormat, dpi: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"graphviz:");
        hasher.update(format.as_str().as_bytes());
        hasher.update(b":");
        hasher.update(dpi.to_string().as_bytes());
        hasher.update(b":");
        hasher.update(self.dot.as_bytes());
        let mut hash = hex::encode(hasher.finalize());
        hash.truncate(12);
        hash
    }

    fn filename(&self, format: OutputFormat, dpi: u32) -> String {
        format!(
            "{}_{}.{}",
            self.stem,
            self.content_hash(format, dpi),
            format.as_str()
        )
    }
}

/// A successfully rendered figure on disk.
#[derive(Debug)]
pub struct RenderedFigure {
    /// Stem from the originating request.
    pub stem: String,
    /// Path of the written file.
    pub path: PathBuf,
    /// Size of the written file in bytes.
    pub bytes: usize,
}

/// Single figure rendering error.
#[derive(Debug, thiserror::Error)]
#[error("figure {stem}: {kind}")]
pub struct FigureError {
    pub stem: String,
    pub kind: FigureErrorKind,
}

/// Kind of figure rendering error.
#[derive(Debug, thiserror::Error)]
pub enum FigureErrorKind {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(String),
}

/// Result of rendering figures with partial failures.
#[derive(Debug)]
pub struct PartialRenderResult {
    /// Successfully rendered figures.
    pub rendered: Vec<RenderedFigure>,
    /// Errors for figures that failed to render.
    pub errors: Vec<FigureError>,
}

/// Create HTTP agent with the specified timeout.
///
/// Use this to create a reusable agent for connection pooling when making
/// multiple render calls.
#[must_use]
pub fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Send one DOT source to Kroki and return the response body as bytes.
///
/// Handles HTTP errors by reading the response body for error details.
fn send_figure_request(
    agent: &Agent,
    figure: &FigureRequest,
    server_url: &str,
    format: OutputFormat,
) -> Result<Vec<u8>, FigureError> {
    let url = format!("{server_url}/graphviz/{}", format.as_str());

    let response = agent
        .post(&url)
        .header("Content-Type", "text/plain")
        .send(figure.dot.as_bytes())
        .map_err(|e| FigureError {
            stem: figure.stem.clone(),
            kind: FigureErrorKind::Http(e.to_string()),
        })?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(FigureError {
            stem: figure.stem.clone(),
            kind: FigureErrorKind::Http(format!("HTTP {status}: {error_body}")),
        });
    }

    body.read_to_vec().map_err(|e| FigureError {
        stem: figure.stem.clone(),
        kind: FigureErrorKind::Io(e.to_string()),
    })
}

/// Render a single figure and write it to the output directory.
fn render_one(
    agent: &Agent,
    figure: &FigureRequest,
    server_url: &str,
    output_dir: &Path,
    format: OutputFormat,
    dpi: u32,
) -> Result<RenderedFigure, FigureError> {
    let data = send_figure_request(agent, figure, server_url, format)?;

    let path = output_dir.join(figure.filename(format, dpi));
    std::fs::write(&path, &data).map_err(|e| FigureError {
        stem: figure.stem.clone(),
        kind: FigureErrorKind::Io(e.to_string()),
    })?;

    Ok(RenderedFigure {
        stem: figure.stem.clone(),
        path,
        bytes: data.len(),
    })
}

/// Render all figures in parallel using the Kroki service.
///
/// Uses the global rayon thread pool. Returns partial results, with
/// successfully rendered figures kept even when some fail.
#[must_use]
pub fn render_all(
    figures: &[FigureRequest],
    server_url: &str,
    output_dir: &Path,
    format: OutputFormat,
    dpi: u32,
    agent: &Agent,
) -> PartialRenderResult {
    if figures.is_empty() {
        return PartialRenderResult {
            rendered: Vec::new(),
            errors: Vec::new(),
        };
    }

    let server_url = server_url.trim_end_matches('/');

    let results: Vec<Result<RenderedFigure, FigureError>> = figures
        .par_iter()
        .map(|f| render_one(agent, f, server_url, output_dir, format, dpi))
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(figure) => rendered.push(figure),
            Err(error) => errors.push(error),
        }
    }

    PartialRenderResult { rendered, errors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("svg"), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::parse("png"), Some(OutputFormat::Png));
        assert_eq!(OutputFormat::parse("pdf"), Some(OutputFormat::Pdf));
        assert_eq!(OutputFormat::parse("gif"), None);
    }

    #[test]
    fn test_filename_hash_stable() {
        let a = FigureRequest::new("architecture", "digraph g { a -> b }");
        let b = FigureRequest::new("architecture", "digraph g { a -> b }");
        let c = FigureRequest::new("architecture", "digraph g { a -> c }");

        let name_a = a.filename(OutputFormat::Png, 300);
        assert_eq!(name_a, b.filename(OutputFormat::Png, 300));
        assert_ne!(name_a, c.filename(OutputFormat::Png, 300));
        assert!(name_a.starts_with("architecture_"));
        assert!(name_a.ends_with(".png"));
        // stem + '_' + 12 hash chars + ".png"
        assert_eq!(name_a.len(), "architecture".len() + 1 + 12 + 4);
    }

    #[test]
    fn test_filename_varies_with_format_and_dpi() {
        let figure = FigureRequest::new("architecture", "digraph g { a -> b }");
        let png = figure.filename(OutputFormat::Png, 300);
        let svg = figure.filename(OutputFormat::Svg, 300);
        let low = figure.filename(OutputFormat::Png, 96);
        assert_ne!(png, svg);
        assert_ne!(png, low);
    }

    #[test]
    fn test_render_all_empty() {
        let agent = create_agent(crate::consts::DEFAULT_TIMEOUT);
        let result = render_all(
            &[],
            "http://localhost:8000",
            Path::new("/tmp"),
            OutputFormat::Png,
            300,
            &agent,
        );
        assert!(result.rendered.is_empty());
        assert!(result.errors.is_empty());
    }
}
