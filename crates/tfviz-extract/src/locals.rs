//! `locals {}` block extraction.

use std::sync::LazyLock;

use regex::Regex;
use tfviz_model::{LocalBindings, LocalValue};
use tracing::debug;

use crate::block::block_body;

/// Top-level `locals {` header.
static LOCALS_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^locals\s*\{").unwrap());

/// Flat `name = value` assignment within a block body.
static ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").unwrap());

/// Flat comparison expression, e.g. `var.ssl_provider == "acm"`.
static COMPARISON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\S+\s*==\s*"[^"]*"$"#).unwrap());

/// Extract local variable bindings from source text.
///
/// Scans for a single top-level `locals {}` block and parses flat
/// `name = literal` assignments line by line: quoted strings, booleans,
/// and integers. Flat comparison expressions (`x == "y"`) are kept
/// verbatim as strings, since conditional feature flags are declared that
/// way. Nested expressions, interpolation, and arithmetic are not handled.
///
/// Returns empty bindings when no `locals {}` block exists; absence is not
/// an error.
#[must_use]
pub fn extract_locals(text: &str) -> LocalBindings {
    let mut bindings = LocalBindings::new();

    let Some(header) = LOCALS_HEADER_RE.find(text) else {
        return bindings;
    };

    let open = header.end() - 1;
    let Some(body) = block_body(text, open) else {
        debug!("locals block never closes; ignoring");
        return bindings;
    };

    for line in body.lines() {
        let line = line.trim();
        let Some(captures) = ASSIGN_RE.captures(line) else {
            continue;
        };
        let name = &captures[1];
        let raw = captures[2].trim();

        if let Some(value) = parse_literal(raw) {
            bindings.insert(name, value);
        } else {
            debug!(name, raw, "skipping non-literal local assignment");
        }
    }

    bindings
}

/// Parse a flat literal right-hand side.
fn parse_literal(raw: &str) -> Option<LocalValue> {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') && !raw[1..raw.len() - 1].contains('"') {
        return Some(LocalValue::Str(raw[1..raw.len() - 1].to_owned()));
    }
    if let Ok(b) = raw.parse::<bool>() {
        return Some(LocalValue::Bool(b));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Some(LocalValue::Num(n));
    }
    if COMPARISON_RE.is_match(raw) {
        return Some(LocalValue::Str(raw.to_owned()));
    }
    None
}
