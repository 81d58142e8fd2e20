//! Visual categories for resource kinds.

use serde::{Deserialize, Serialize};

/// Visual category of a resource, driving shape and grouping hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Compute,
    Network,
    Storage,
    Observability,
    Security,
    /// Fallback for kinds matching no known pattern.
    Generic,
}

impl Category {
    /// Category name as used in serialized output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compute => "compute",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Observability => "observability",
            Self::Security => "security",
            Self::Generic => "generic",
        }
    }

    /// Graphviz shape hint for this category.
    #[must_use]
    pub fn shape(self) -> &'static str {
        match self {
            Self::Compute => "box",
            Self::Network => "ellipse",
            Self::Storage => "cylinder",
            Self::Observability => "note",
            Self::Security => "hexagon",
            Self::Generic => "box",
        }
    }
}

/// Ordered substring patterns mapping resource kinds to categories.
///
/// An explicit configuration object rather than module state, so callers
/// can supply custom mappings. Matching is first-pattern-wins over the
/// resource kind; kinds matching nothing get [`Category::Generic`], so
/// categorization is total over all inputs.
#[derive(Debug, Clone)]
pub struct CategoryMap {
    patterns: Vec<(String, Category)>,
}

impl CategoryMap {
    /// Create an empty map (everything categorizes as generic).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            patterns: Vec::new(),
        }
    }

    /// Append a substring pattern. Earlier patterns win.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>, category: Category) -> Self {
        self.patterns.push((pattern.into(), category));
        self
    }

    /// Categorize a resource kind.
    #[must_use]
    pub fn categorize(&self, kind: &str) -> Category {
        self.patterns
            .iter()
            .find(|(pattern, _)| kind.contains(pattern.as_str()))
            .map_or(Category::Generic, |(_, category)| *category)
    }
}

impl Default for CategoryMap {
    /// AWS patterns covering the resource kinds the figures draw.
    ///
    /// `iam` is listed before `instance` so `aws_iam_instance_profile`
    /// lands in security, not compute.
    fn default() -> Self {
        Self::empty()
            .with_pattern("iam", Category::Security)
            .with_pattern("security_group", Category::Network)
            .with_pattern("instance", Category::Compute)
            .with_pattern("lambda", Category::Compute)
            .with_pattern("cloudwatch", Category::Observability)
            .with_pattern("route53", Category::Network)
            .with_pattern("eip", Category::Network)
            .with_pattern("lb", Category::Network)
            .with_pattern("s3", Category::Storage)
            .with_pattern("ebs", Category::Storage)
            .with_pattern("db", Category::Storage)
    }
}
