//! # Rendering Seam
//!
//! Output-agnostic traversal of walked fields. A [`FieldRenderer`] turns each
//! descriptor into some output (markup, terminal lines, widgets) and the
//! driver here fixes the order: the banner comes first, then fields in walk
//! order. Within a union group the discriminant selector precedes the active
//! branch's fields.

use crate::walker::{ChoiceField, Field, TextField, UnionGroup};

/// Produces output for each kind of field descriptor.
pub trait FieldRenderer {
    /// Rendered form of one field or banner.
    type Output;

    /// Render a free-text input.
    fn render_text(&mut self, field: &TextField) -> Self::Output;

    /// Render a fixed-option selector.
    fn render_choice(&mut self, field: &ChoiceField) -> Self::Output;

    /// Render a union group. `children` holds the rendered discriminant
    /// followed by the rendered branch fields.
    fn render_group(&mut self, group: &UnionGroup, children: Vec<Self::Output>) -> Self::Output;

    /// Render the form-level submit failure banner.
    fn render_banner(&mut self, message: &str) -> Self::Output;
}

/// Render a single field, recursing into union groups.
pub fn render_field<R: FieldRenderer>(field: &Field, renderer: &mut R) -> R::Output {
    match field {
        Field::Text(text) => renderer.render_text(text),
        Field::Choice(choice) => renderer.render_choice(choice),
        Field::UnionGroup(group) => {
            let mut children = Vec::with_capacity(group.fields.len() + 1);
            children.push(renderer.render_choice(&group.discriminant));
            children.extend(render_fields(&group.fields, renderer));
            renderer.render_group(group, children)
        }
    }
}

/// Render a field list in order.
pub fn render_fields<R: FieldRenderer>(fields: &[Field], renderer: &mut R) -> Vec<R::Output> {
    fields.iter().map(|f| render_field(f, renderer)).collect()
}

/// Render a whole form: optional banner, then every field.
pub fn render_form<R: FieldRenderer>(
    fields: &[Field],
    banner: Option<&str>,
    renderer: &mut R,
) -> Vec<R::Output> {
    let mut out = Vec::with_capacity(fields.len() + 1);
    if let Some(message) = banner {
        out.push(renderer.render_banner(message));
    }
    out.extend(render_fields(fields, renderer));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_map::ErrorMap;
    use crate::node::Schema;
    use crate::walker::walk_form;
    use serde_json::json;

    /// Flattens everything into tagged strings.
    struct Tags;

    impl FieldRenderer for Tags {
        type Output = String;

        fn render_text(&mut self, field: &TextField) -> String {
            format!("text:{}", field.path)
        }

        fn render_choice(&mut self, field: &ChoiceField) -> String {
            format!("choice:{}", field.path)
        }

        fn render_group(&mut self, group: &UnionGroup, children: Vec<String>) -> String {
            format!("group:{}[{}]", group.path, children.join(","))
        }

        fn render_banner(&mut self, message: &str) -> String {
            format!("banner:{message}")
        }
    }

    fn fields() -> Vec<Field> {
        let schema = Schema::from_value(json!({
            "properties": {
                "host": {"type": "string"},
                "auth": {"type": "object", "oneOf": [
                    {"title": "Token", "properties": {"token": {"type": "string"}}}
                ]},
                "port": {"type": "string", "enum": ["80"]}
            }
        }))
        .unwrap();
        walk_form(&schema, &json!({}), &ErrorMap::new())
    }

    #[test]
    fn test_render_order_without_banner() {
        let out = render_form(&fields(), None, &mut Tags);
        assert_eq!(
            out,
            [
                "text:host",
                "group:auth[choice:$meta.auth.type,text:auth.token]",
                "choice:port",
            ]
        );
    }

    #[test]
    fn test_banner_renders_first() {
        let out = render_form(&fields(), Some("Submission failed"), &mut Tags);
        assert_eq!(out[0], "banner:Submission failed");
        assert_eq!(out.len(), 4);
    }
}
