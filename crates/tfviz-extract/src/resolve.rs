//! Reference resolution and conditional-resource detection.

use tfviz_model::{AttrValue, LocalBindings, Resource};
use tracing::debug;

/// Substitute local-variable values into `local.<name>` references.
///
/// References whose name is absent from `locals` keep `resolved: None`;
/// the extractor cannot tell developer error from an intentionally
/// unresolved reference, so it leaves the marker for the caller to notice.
/// Running this twice is a no-op: already-resolved references are not
/// touched.
pub fn resolve_references(resources: &mut [Resource], locals: &LocalBindings) {
    for resource in resources.iter_mut() {
        for (attr, value) in &mut resource.attributes {
            if let AttrValue::Ref { name, resolved } = value
                && resolved.is_none()
            {
                match locals.get(name) {
                    Some(local) => *resolved = Some(local.to_string()),
                    None => debug!(
                        resource = %resource_label(&resource.kind, &resource.name),
                        attr = %attr,
                        local = %name,
                        "reference to unknown local left unresolved"
                    ),
                }
            }
        }
    }
}

/// Mark resources whose creation is gated by a `count` ternary.
///
/// A resource with a `count` attribute containing `? ... :` is marked
/// conditional, and the text before the `?` (trimmed, with `local.<name>`
/// tokens replaced by their resolved values) becomes the condition.
/// Resources without `count`, or whose `count` is not ternary-shaped, are
/// treated as unconditionally present. This is a heuristic: `for_each`,
/// nested conditionals, and function-call counts are not recognized and
/// read as unconditional.
pub fn detect_conditionals(resources: &mut [Resource], locals: &LocalBindings) {
    for resource in resources.iter_mut() {
        let Some(count) = resource.attr("count") else {
            continue;
        };

        let text = count.display_value();
        let Some(question) = text.find('?') else {
            continue;
        };
        if !text[question..].contains(':') {
            continue;
        }

        let condition = substitute_locals(text[..question].trim(), locals);
        resource.is_conditional = true;
        resource.condition = Some(condition);
    }
}

/// Replace `local.<name>` tokens with their bound values.
fn substitute_locals(expr: &str, locals: &LocalBindings) -> String {
    let mut result = expr.to_owned();
    for (name, value) in locals.iter() {
        result = result.replace(&format!("local.{name}"), &value.to_string());
    }
    result
}

fn resource_label(kind: &str, name: &str) -> String {
    format!("{kind}.{name}")
}
