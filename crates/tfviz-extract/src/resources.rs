//! `resource "<kind>" "<name>" {}` block extraction.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tfviz_model::{AttrValue, Resource, ResourceId};
use tracing::warn;

use crate::block::block_body;

/// Two-part resource block header.
static RESOURCE_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"resource\s+"([^"]+)"\s+"([^"]+)"\s*\{"#).unwrap());

/// Flat `name = value` assignment.
static ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+)$").unwrap());

/// `local.<name>` reference as a whole value.
static LOCAL_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^local\.([A-Za-z_][A-Za-z0-9_]*)$").unwrap());

/// `<kind>.<name>` resource reference anywhere in a body.
///
/// The kind must contain an underscore (`aws_instance`, `aws_iam_role`),
/// which keeps `local.x`, `var.x`, and dotted strings like domain names
/// from matching.
static RESOURCE_REF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([a-z][a-z0-9]*_[a-z0-9_]+)\.([a-z_][A-Za-z0-9_-]*)\b").unwrap()
});

/// Why a recognized block header produced no [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The block's braces never balance before end of input.
    UnterminatedBlock,
}

/// A block header that was recognized but could not be extracted.
///
/// Extraction stays best-effort (skips are not errors), but skipped blocks
/// are reported instead of silently dropped so callers can surface them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedBlock {
    pub kind: String,
    pub name: String,
    pub reason: SkipReason,
}

impl fmt::Display for SkippedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            SkipReason::UnterminatedBlock => write!(
                f,
                "resource \"{}\" \"{}\": block never closes",
                self.kind, self.name
            ),
        }
    }
}

/// Result of a resource-extraction pass over one text.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Successfully extracted resources, in declaration order.
    pub resources: Vec<Resource>,
    /// Recognized headers whose blocks could not be extracted.
    pub skipped: Vec<SkippedBlock>,
}

/// Extract resource declarations from source text.
///
/// Headers are matched independently, so a malformed block does not affect
/// extraction of later well-formed blocks. Within each body, flat
/// `attribute = value` assignments at the top nesting level are extracted
/// (quoted strings, booleans, integers, `local.` references; anything else
/// is kept verbatim as a raw expression), and `<kind>.<name>` references
/// anywhere in the body become dependencies.
#[must_use]
pub fn extract_resources(text: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for header in RESOURCE_HEADER_RE.captures_iter(text) {
        let Some(whole) = header.get(0) else {
            continue;
        };
        let kind = &header[1];
        let name = &header[2];
        let open = whole.end() - 1;

        let Some(body) = block_body(text, open) else {
            let skipped = SkippedBlock {
                kind: kind.to_owned(),
                name: name.to_owned(),
                reason: SkipReason::UnterminatedBlock,
            };
            warn!(%skipped, "skipping resource block");
            extraction.skipped.push(skipped);
            continue;
        };

        let mut resource = Resource::new(kind, name);
        extract_attributes(body, &mut resource);
        extract_dependencies(body, &mut resource);
        extraction.resources.push(resource);
    }

    extraction
}

/// Extract flat attribute assignments at the top nesting level of a body.
fn extract_attributes(body: &str, resource: &mut Resource) {
    let mut depth = 0i32;

    for line in body.lines() {
        let line = line.trim();

        if depth == 0
            && let Some(captures) = ASSIGN_RE.captures(line)
        {
            let raw = captures[2].trim();
            // A value opening a nested block or list is not a flat assignment
            if !raw.ends_with('{') && !raw.starts_with('[') {
                resource
                    .attributes
                    .insert(captures[1].to_owned(), classify_value(raw));
            }
        }

        depth += brace_delta(line);
    }
}

/// Classify a raw attribute value into a typed [`AttrValue`].
fn classify_value(raw: &str) -> AttrValue {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') && !raw[1..raw.len() - 1].contains('"')
    {
        return AttrValue::Str(raw[1..raw.len() - 1].to_owned());
    }
    if let Some(captures) = LOCAL_REF_RE.captures(raw) {
        return AttrValue::Ref {
            name: captures[1].to_owned(),
            resolved: None,
        };
    }
    if let Ok(b) = raw.parse::<bool>() {
        return AttrValue::Bool(b);
    }
    if let Ok(n) = raw.parse::<i64>() {
        return AttrValue::Num(n);
    }
    AttrValue::Expr(raw.to_owned())
}

/// Collect `<kind>.<name>` references from a body as dependencies.
///
/// Covers both explicit `depends_on = [...]` lists and attribute
/// references like `aws_iam_role.allocator.name`. Self-references are
/// dropped.
fn extract_dependencies(body: &str, resource: &mut Resource) {
    let own_id = resource.id();

    for captures in RESOURCE_REF_RE.captures_iter(body) {
        let id = ResourceId::new(&captures[1], &captures[2]);
        if id != own_id {
            resource.depends_on.insert(id);
        }
    }
}

/// Net brace count of a line, ignoring braces inside quoted strings.
fn brace_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut in_string = false;

    for byte in line.bytes() {
        match byte {
            b'"' => in_string = !in_string,
            b'{' if !in_string => delta += 1,
            b'}' if !in_string => delta -= 1,
            _ => {}
        }
    }

    delta
}
