//! Graphviz DOT serialization of a diagram description.

use std::fmt::Write as _;

use crate::descriptor::{DiagramDescription, EdgeStyle, NodeDescriptor};
use crate::preset::LayoutPreset;

/// Serialize a diagram description to Graphviz DOT.
///
/// Nodes are grouped into one cluster per tier, in first-appearance order.
/// The preset supplies font sizes and spacing; the layout is left to right
/// with orthogonal edge routing. Conditional nodes draw dashed in green,
/// runtime-provisioned nodes dotted in orange.
#[must_use]
pub fn to_dot(description: &DiagramDescription, preset: &LayoutPreset, dpi: u32) -> String {
    let mut out = String::new();

    out.push_str("digraph architecture {\n");
    let _ = writeln!(
        out,
        "  graph [rankdir=\"LR\", splines=\"ortho\", bgcolor=\"white\", pad=\"0.5\", \
         dpi={dpi}, fontname=\"Helvetica\", label=\"{}\", labelloc=\"t\", \
         fontsize={}, nodesep={}, ranksep={}];",
        escape(&description.title),
        preset.title_fontsize,
        preset.nodesep,
        preset.ranksep,
    );
    let _ = writeln!(
        out,
        "  node [fontname=\"Helvetica\", fontsize={}];",
        preset.node_fontsize
    );
    let _ = writeln!(
        out,
        "  edge [fontname=\"Helvetica\", fontsize={}];",
        preset.edge_fontsize
    );

    for (index, (tier, nodes)) in group_by_tier(&description.nodes).into_iter().enumerate() {
        let _ = writeln!(out, "  subgraph cluster_{index} {{");
        let _ = writeln!(out, "    label=\"{}\";", escape(tier));
        out.push_str("    style=\"rounded\";\n");
        for node in nodes {
            let _ = writeln!(out, "    {}", node_statement(node));
        }
        out.push_str("  }\n");
    }

    for edge in &description.edges {
        let mut attrs = format!("style=\"{}\"", edge.style.as_str());
        if let Some(label) = &edge.label {
            let _ = write!(attrs, ", label=\"{}\"", escape(label));
        }
        if edge.style == EdgeStyle::Dotted {
            attrs.push_str(", color=\"#fd7e14\"");
        }
        let _ = writeln!(
            out,
            "  \"{}\" -> \"{}\" [{attrs}];",
            escape(&edge.from),
            escape(&edge.to)
        );
    }

    out.push_str("}\n");
    out
}

fn node_statement(node: &NodeDescriptor) -> String {
    let mut attrs = format!(
        "label=\"{}\", shape=\"{}\"",
        escape(&node.display_label()),
        node.category.shape()
    );
    if node.is_conditional() {
        attrs.push_str(", style=\"dashed\", color=\"#28a745\", penwidth=2.0");
    } else if node.is_runtime_provisioned() {
        attrs.push_str(", style=\"dotted\", color=\"#fd7e14\", penwidth=2.0");
    }
    format!("\"{}\" [{attrs}];", escape(&node.id))
}

/// Tiers in first-appearance order, each with its nodes in input order.
fn group_by_tier(nodes: &[NodeDescriptor]) -> Vec<(&str, Vec<&NodeDescriptor>)> {
    let mut groups: Vec<(&str, Vec<&NodeDescriptor>)> = Vec::new();
    for node in nodes {
        match groups.iter_mut().find(|(tier, _)| *tier == node.tier) {
            Some((_, members)) => members.push(node),
            None => groups.push((&node.tier, vec![node])),
        }
    }
    groups
}

/// Escape a string for use inside a double-quoted DOT string.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::descriptor::{Annotation, EdgeDescriptor};

    fn node(id: &str, tier: &str, annotations: Vec<Annotation>) -> NodeDescriptor {
        NodeDescriptor {
            id: id.to_owned(),
            label: id.to_owned(),
            category: Category::Compute,
            tier: tier.to_owned(),
            annotations,
        }
    }

    fn description() -> DiagramDescription {
        DiagramDescription {
            title: "LabLink Architecture".to_owned(),
            nodes: vec![
                node("infra:aws_instance.allocator", "infra", vec![]),
                node(
                    "dynamic:aws_instance.client",
                    "dynamic",
                    vec![Annotation::RuntimeProvisioned],
                ),
            ],
            edges: vec![EdgeDescriptor {
                from: "dynamic:aws_instance.client".to_owned(),
                to: "infra:aws_instance.allocator".to_owned(),
                label: None,
                style: EdgeStyle::Dashed,
            }],
        }
    }

    #[test]
    fn test_graph_attributes_from_preset() {
        let dot = to_dot(&description(), &LayoutPreset::poster(), 300);
        assert!(dot.contains("rankdir=\"LR\""));
        assert!(dot.contains("splines=\"ortho\""));
        assert!(dot.contains("dpi=300"));
        assert!(dot.contains("fontsize=48"));
        assert!(dot.contains("nodesep=1.8, ranksep=2.5"));
        assert!(dot.contains("node [fontname=\"Helvetica\", fontsize=20];"));
        assert!(dot.contains("label=\"LabLink Architecture\""));
    }

    #[test]
    fn test_one_cluster_per_tier() {
        let dot = to_dot(&description(), &LayoutPreset::paper(), 300);
        assert!(dot.contains("subgraph cluster_0"));
        assert!(dot.contains("label=\"infra\";"));
        assert!(dot.contains("subgraph cluster_1"));
        assert!(dot.contains("label=\"dynamic\";"));
        assert!(!dot.contains("subgraph cluster_2"));
    }

    #[test]
    fn test_runtime_provisioned_node_styling() {
        let dot = to_dot(&description(), &LayoutPreset::paper(), 300);
        assert!(dot.contains(
            "\"dynamic:aws_instance.client\" [label=\"dynamic:aws_instance.client\\n\
             (runtime-provisioned)\", shape=\"box\", style=\"dotted\", \
             color=\"#fd7e14\", penwidth=2.0];"
        ));
    }

    #[test]
    fn test_conditional_node_styling() {
        let mut desc = description();
        desc.nodes[0].annotations = vec![Annotation::Conditional {
            condition: "ssl == \"acm\"".to_owned(),
        }];
        let dot = to_dot(&desc, &LayoutPreset::paper(), 300);
        assert!(dot.contains("style=\"dashed\", color=\"#28a745\", penwidth=2.0"));
        assert!(dot.contains("(when ssl == \\\"acm\\\")"));
    }

    #[test]
    fn test_edge_statement() {
        let dot = to_dot(&description(), &LayoutPreset::paper(), 300);
        assert!(dot.contains(
            "\"dynamic:aws_instance.client\" -> \"infra:aws_instance.allocator\" \
             [style=\"dashed\"];"
        ));
    }

    #[test]
    fn test_edge_label_and_dotted_color() {
        let mut desc = description();
        desc.edges[0].label = Some("boots".to_owned());
        desc.edges[0].style = EdgeStyle::Dotted;
        let dot = to_dot(&desc, &LayoutPreset::paper(), 300);
        assert!(dot.contains("[style=\"dotted\", label=\"boots\", color=\"#fd7e14\"];"));
    }

    #[test]
    fn test_empty_description() {
        let dot = to_dot(&DiagramDescription::default(), &LayoutPreset::paper(), 300);
        assert!(dot.starts_with("digraph architecture {"));
        assert!(dot.ends_with("}\n"));
        assert!(!dot.contains("subgraph"));
        assert!(!dot.contains("->"));
    }
}
