//! Best-effort extraction of resources from Terraform source text.
//!
//! This crate scans plain `.tf` source text (not an AST) and produces the
//! [`tfviz_model`] types consumed by the diagram assembler:
//!
//! - [`extract_locals`]: flat literal bindings from the `locals {}` block
//! - [`extract_resources`]: `resource "<kind>" "<name>" {}` blocks with
//!   flat attributes and dependency references
//! - [`resolve_references`]: substitute `local.<name>` references
//! - [`detect_conditionals`]: mark resources gated by a `count` ternary
//! - [`parse_dir`] / [`parse_file`]: whole-tree orchestration
//!
//! # Failure semantics
//!
//! Extraction is pattern matching, not parsing. Malformed or unrecognized
//! fragments never raise; they yield no data, and blocks that could not be
//! extracted are reported as [`SkippedBlock`] entries so callers can surface
//! them. The only hard error is a missing or unreadable source directory
//! ([`ExtractError`]).

mod block;
mod locals;
mod resolve;
mod resources;
mod scan;

pub use locals::extract_locals;
pub use resolve::{detect_conditionals, resolve_references};
pub use resources::{Extraction, SkipReason, SkippedBlock, extract_resources};
pub use scan::{ExtractError, ScanResult, parse_dir, parse_file, parse_text};
