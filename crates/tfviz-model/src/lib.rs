//! Resource model for tfviz.
//!
//! Types shared between the extractor and the diagram assembler:
//! - [`AttrValue`]: typed attribute value (literal, reference, raw expression)
//! - [`LocalValue`] / [`LocalBindings`]: `locals {}` variable bindings
//! - [`Resource`]: a single extracted resource declaration
//! - [`ParsedConfig`]: all resources from one source tree, tagged with a tier
//!
//! Values extracted from source text start out raw; a later resolution pass
//! fills in `resolved` on [`AttrValue::Ref`] values. Nothing in this crate
//! reads files or knows about diagram rendering.

mod value;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use value::{AttrValue, LocalBindings, LocalValue};

/// Identifier of a resource: `<kind>.<name>`.
///
/// This is the form resources use to reference each other in source text
/// (e.g. `aws_iam_role.allocator`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Build an id from a kind and a name.
    #[must_use]
    pub fn new(kind: &str, name: &str) -> Self {
        Self(format!("{kind}.{name}"))
    }

    /// The `kind.name` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named resource declaration extracted from source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Declared resource type (e.g. `aws_instance`).
    pub kind: String,
    /// Resource name, unique within its kind.
    pub name: String,
    /// Flat attribute assignments from the block body.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttrValue>,
    /// Other resources referenced in the body.
    #[serde(default)]
    pub depends_on: BTreeSet<ResourceId>,
    /// True when creation is gated by a `count` ternary.
    #[serde(default)]
    pub is_conditional: bool,
    /// The gating predicate in human-readable form, when conditional.
    #[serde(default)]
    pub condition: Option<String>,
}

impl Resource {
    /// Create a resource with no attributes or dependencies.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            attributes: BTreeMap::new(),
            depends_on: BTreeSet::new(),
            is_conditional: false,
            condition: None,
        }
    }

    /// The `kind.name` identifier of this resource.
    #[must_use]
    pub fn id(&self) -> ResourceId {
        ResourceId::new(&self.kind, &self.name)
    }

    /// Look up an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }
}

/// All resources and local bindings extracted from one source tree.
///
/// The tier is an arbitrary caller-supplied label (e.g. `"infra"` vs
/// `"client"`) used by the assembler to group nodes and annotate
/// runtime-provisioned resources. Merging across trees is the caller's
/// job; a `ParsedConfig` always describes exactly one tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedConfig {
    /// Caller-supplied tier label.
    pub tier: String,
    /// Local variable bindings from the tree's `locals {}` block.
    #[serde(default)]
    pub locals: LocalBindings,
    /// Extracted resources, in declaration order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl ParsedConfig {
    /// Create an empty configuration for the given tier.
    #[must_use]
    pub fn new(tier: impl Into<String>) -> Self {
        Self {
            tier: tier.into(),
            locals: LocalBindings::new(),
            resources: Vec::new(),
        }
    }

    /// Find a resource by id within this configuration.
    #[must_use]
    pub fn find(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id() == id)
    }
}

/// Find a resource by id across several configurations.
///
/// Returns the owning configuration alongside the resource so callers can
/// tell which tier it came from. The first match wins.
#[must_use]
pub fn find_resource<'a>(
    configs: &'a [ParsedConfig],
    id: &ResourceId,
) -> Option<(&'a ParsedConfig, &'a Resource)> {
    configs
        .iter()
        .find_map(|c| c.find(id).map(|r| (c, r)))
}
