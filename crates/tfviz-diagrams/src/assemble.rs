//! Mapping from parsed configurations to a diagram description.

use tfviz_model::{ParsedConfig, Resource, find_resource};
use tracing::debug;

use crate::category::CategoryMap;
use crate::descriptor::{
    Annotation, DiagramDescription, EdgeDescriptor, EdgeStyle, NodeDescriptor,
};

/// Assembly options: the fixed visual-encoding policy for one figure.
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    /// Figure title.
    pub title: String,
    /// Category mapping for shape hints.
    pub categories: CategoryMap,
    /// Tier whose resources are annotated as runtime-provisioned.
    pub runtime_tier: Option<String>,
}

impl AssembleOptions {
    /// Options with default categories and no runtime tier.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            categories: CategoryMap::default(),
            runtime_tier: None,
        }
    }

    /// Annotate resources from the given tier as runtime-provisioned.
    #[must_use]
    pub fn runtime_tier(mut self, tier: impl Into<String>) -> Self {
        self.runtime_tier = Some(tier.into());
        self
    }

    /// Replace the category mapping.
    #[must_use]
    pub fn categories(mut self, categories: CategoryMap) -> Self {
        self.categories = categories;
        self
    }
}

/// Build the node descriptor for one resource.
///
/// The label combines name and kind, with the instance type appended when
/// present. A conditional resource gets its condition annotation; otherwise
/// a resource from the runtime tier gets the runtime-provisioned
/// annotation (conditional wins when both apply).
#[must_use]
pub fn build_node(resource: &Resource, tier: &str, options: &AssembleOptions) -> NodeDescriptor {
    let mut label = format!("{}\n{}", resource.name, resource.kind);
    if let Some(instance_type) = resource.attr("instance_type") {
        label.push_str(&format!("\n({})", instance_type.display_value()));
    }

    let mut annotations = Vec::new();
    if resource.is_conditional {
        annotations.push(Annotation::Conditional {
            condition: resource.condition.clone().unwrap_or_default(),
        });
    } else if options.runtime_tier.as_deref() == Some(tier) {
        annotations.push(Annotation::RuntimeProvisioned);
    }

    NodeDescriptor {
        id: node_id(tier, resource),
        label,
        category: options.categories.categorize(&resource.kind),
        tier: tier.to_owned(),
        annotations,
    }
}

/// Build edges for every resolvable `depends_on` reference.
///
/// Targets are looked up across all supplied configurations, so references
/// may cross tiers; cross-tier edges are dashed. References to resources
/// not found in any configuration are dropped without error — the
/// extractor's text-only scope means some references are expected to be
/// unresolvable.
#[must_use]
pub fn build_edges(configs: &[ParsedConfig]) -> Vec<EdgeDescriptor> {
    let mut edges = Vec::new();

    for config in configs {
        for resource in &config.resources {
            for dep in &resource.depends_on {
                let Some((target_config, target)) = find_resource(configs, dep) else {
                    debug!(from = %resource.id(), to = %dep, "dropping dangling reference");
                    continue;
                };

                let style = if target_config.tier == config.tier {
                    EdgeStyle::Solid
                } else {
                    EdgeStyle::Dashed
                };

                edges.push(EdgeDescriptor {
                    from: node_id(&config.tier, resource),
                    to: node_id(&target_config.tier, target),
                    label: None,
                    style,
                });
            }
        }
    }

    edges
}

/// Assemble one or more configurations into a diagram description.
#[must_use]
pub fn assemble(configs: &[ParsedConfig], options: &AssembleOptions) -> DiagramDescription {
    let nodes = configs
        .iter()
        .flat_map(|config| {
            config
                .resources
                .iter()
                .map(|resource| build_node(resource, &config.tier, options))
        })
        .collect();

    DiagramDescription {
        title: options.title.clone(),
        nodes,
        edges: build_edges(configs),
    }
}

fn node_id(tier: &str, resource: &Resource) -> String {
    format!("{tier}:{}", resource.id())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tfviz_model::{AttrValue, ResourceId};

    use super::*;
    use crate::category::Category;

    fn resource(kind: &str, name: &str) -> Resource {
        Resource::new(kind, name)
    }

    fn config_with(tier: &str, resources: Vec<Resource>) -> ParsedConfig {
        let mut config = ParsedConfig::new(tier);
        config.resources = resources;
        config
    }

    #[test]
    fn test_build_node_label_and_category() {
        let mut vm = resource("aws_instance", "allocator");
        vm.attributes.insert(
            "instance_type".to_owned(),
            AttrValue::Str("t3.large".to_owned()),
        );

        let node = build_node(&vm, "infra", &AssembleOptions::new("t"));

        assert_eq!(node.id, "infra:aws_instance.allocator");
        assert_eq!(node.label, "allocator\naws_instance\n(t3.large)");
        assert_eq!(node.category, Category::Compute);
        assert!(node.annotations.is_empty());
    }

    #[test]
    fn test_build_node_conditional_annotation() {
        let mut record = resource("aws_route53_record", "app");
        record.is_conditional = true;
        record.condition = Some("var.dns != \"none\"".to_owned());

        let node = build_node(&record, "infra", &AssembleOptions::new("t"));

        assert_eq!(
            node.annotations,
            vec![Annotation::Conditional {
                condition: "var.dns != \"none\"".to_owned(),
            }]
        );
    }

    #[test]
    fn test_build_node_runtime_tier_annotation() {
        let vm = resource("aws_instance", "client");
        let options = AssembleOptions::new("t").runtime_tier("dynamic");

        let node = build_node(&vm, "dynamic", &options);
        assert_eq!(node.annotations, vec![Annotation::RuntimeProvisioned]);

        let infra_node = build_node(&vm, "infra", &options);
        assert!(infra_node.annotations.is_empty());
    }

    #[test]
    fn test_conditional_wins_over_runtime_tier() {
        let mut vm = resource("aws_instance", "client");
        vm.is_conditional = true;
        vm.condition = Some("gpu_enabled".to_owned());
        let options = AssembleOptions::new("t").runtime_tier("dynamic");

        let node = build_node(&vm, "dynamic", &options);
        assert_eq!(node.annotations.len(), 1);
        assert!(node.is_conditional());
    }

    #[test]
    fn test_build_edges_within_tier() {
        let mut vm = resource("aws_instance", "allocator");
        vm.depends_on.insert(ResourceId::new("aws_iam_role", "allocator"));
        let configs = vec![config_with(
            "infra",
            vec![vm, resource("aws_iam_role", "allocator")],
        )];

        let edges = build_edges(&configs);

        assert_eq!(
            edges,
            vec![EdgeDescriptor {
                from: "infra:aws_instance.allocator".to_owned(),
                to: "infra:aws_iam_role.allocator".to_owned(),
                label: None,
                style: EdgeStyle::Solid,
            }]
        );
    }

    #[test]
    fn test_build_edges_across_tiers_dashed() {
        let mut client = resource("aws_instance", "client");
        client
            .depends_on
            .insert(ResourceId::new("aws_cloudwatch_log_group", "client_logs"));

        let configs = vec![
            config_with(
                "infra",
                vec![resource("aws_cloudwatch_log_group", "client_logs")],
            ),
            config_with("dynamic", vec![client]),
        ];

        let edges = build_edges(&configs);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].style, EdgeStyle::Dashed);
        assert_eq!(edges[0].from, "dynamic:aws_instance.client");
        assert_eq!(edges[0].to, "infra:aws_cloudwatch_log_group.client_logs");
    }

    #[test]
    fn test_build_edges_dangling_reference_dropped() {
        let mut vm = resource("aws_instance", "client");
        vm.depends_on
            .insert(ResourceId::new("aws_sqs_queue", "elsewhere"));
        let configs = vec![config_with("dynamic", vec![vm])];

        assert!(build_edges(&configs).is_empty());
    }

    #[test]
    fn test_assemble_orders_nodes_by_config() {
        let configs = vec![
            config_with("infra", vec![resource("aws_instance", "allocator")]),
            config_with("dynamic", vec![resource("aws_instance", "client")]),
        ];

        let description = assemble(&configs, &AssembleOptions::new("LabLink Architecture"));

        assert_eq!(description.title, "LabLink Architecture");
        let ids: Vec<_> = description.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["infra:aws_instance.allocator", "dynamic:aws_instance.client"]
        );
        assert!(description.edges.is_empty());
    }
}
