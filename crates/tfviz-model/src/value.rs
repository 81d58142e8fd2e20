//! Attribute and local-variable value types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal value bound in a `locals {}` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalValue {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Num(i64),
    /// String literal, or a flat comparison expression kept verbatim.
    Str(String),
}

impl fmt::Display for LocalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Num(n) => write!(f, "{n}"),
        }
    }
}

/// Local variable bindings, ordered by name.
///
/// Populated once before reference resolution; locals never reference
/// resources, so no cycle handling exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalBindings(BTreeMap<String, LocalValue>);

impl LocalBindings {
    /// Create an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LocalValue> {
        self.0.get(name)
    }

    /// Insert a binding, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: LocalValue) {
        self.0.insert(name.into(), value);
    }

    /// Merge bindings from another set; `other` wins on conflicts.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Iterate over bindings in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalValue)> {
        self.0.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A resource attribute value.
///
/// Extraction produces raw values; `resolve_references` later fills in
/// `resolved` on `Ref` values. An unresolvable reference keeps
/// `resolved: None` rather than a placeholder string, so consumers can
/// tell "resolved to a literal" from "never resolved" without string
/// comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AttrValue {
    /// Quoted string literal.
    Str(String),
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Num(i64),
    /// A `local.<name>` reference.
    Ref {
        /// Local variable name (without the `local.` prefix).
        name: String,
        /// Substituted value, once resolution has run and the name exists.
        resolved: Option<String>,
    },
    /// Any other expression, kept verbatim (e.g. a `count` ternary).
    Expr(String),
}

impl AttrValue {
    /// The string value, when one is available.
    ///
    /// `Str` yields its literal; a resolved `Ref` yields the substituted
    /// value. Everything else yields `None`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Ref { resolved, .. } => resolved.as_deref(),
            _ => None,
        }
    }

    /// Human-readable form for labels.
    ///
    /// Unresolved references fall back to the raw `local.<name>` text so
    /// labels stay legible when resolution failed.
    #[must_use]
    pub fn display_value(&self) -> String {
        match self {
            Self::Str(s) | Self::Expr(s) => s.clone(),
            Self::Bool(b) => b.to_string(),
            Self::Num(n) => n.to_string(),
            Self::Ref { name, resolved } => resolved
                .clone()
                .unwrap_or_else(|| format!("local.{name}")),
        }
    }

    /// True for a reference that resolution did not (or could not) fill in.
    #[must_use]
    pub fn is_unresolved_ref(&self) -> bool {
        matches!(self, Self::Ref { resolved: None, .. })
    }
}
