//! Node and edge descriptors handed to the layout engine.

use serde::Serialize;

use crate::category::Category;

/// Annotation attached to a node label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Annotation {
    /// Creation is gated by a runtime predicate.
    Conditional {
        /// The predicate, in human-readable form.
        condition: String,
    },
    /// Provisioned at runtime rather than present from deployment.
    RuntimeProvisioned,
}

/// A single node in the diagram description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeDescriptor {
    /// Unique node identifier (`<tier>:<kind>.<name>`).
    pub id: String,
    /// Base display label.
    pub label: String,
    /// Visual category, driving the shape hint.
    pub category: Category,
    /// Tier the node's resource came from; nodes cluster by tier.
    pub tier: String,
    /// Label annotations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl NodeDescriptor {
    /// Label with annotations appended, one per line.
    #[must_use]
    pub fn display_label(&self) -> String {
        let mut label = self.label.clone();
        for annotation in &self.annotations {
            match annotation {
                Annotation::Conditional { condition } => {
                    label.push_str(&format!("\n(when {condition})"));
                }
                Annotation::RuntimeProvisioned => label.push_str("\n(runtime-provisioned)"),
            }
        }
        label
    }

    /// True when the node carries a conditional annotation.
    #[must_use]
    pub fn is_conditional(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::Conditional { .. }))
    }

    /// True when the node carries the runtime-provisioned annotation.
    #[must_use]
    pub fn is_runtime_provisioned(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::RuntimeProvisioned))
    }
}

/// Styling hint for an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl EdgeStyle {
    /// Graphviz `style` attribute value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Dashed => "dashed",
            Self::Dotted => "dotted",
        }
    }
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeDescriptor {
    /// Source node id.
    pub from: String,
    /// Target node id.
    pub to: String,
    /// Optional edge label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Styling hint.
    pub style: EdgeStyle,
}

/// The full rendering instruction set for one figure.
///
/// Purely a description; it has no lifecycle beyond being serialized to
/// DOT and handed to the layout engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramDescription {
    /// Figure title.
    pub title: String,
    /// Nodes, in assembly order (grouped by tier).
    pub nodes: Vec<NodeDescriptor>,
    /// Edges, in assembly order.
    pub edges: Vec<EdgeDescriptor>,
}
