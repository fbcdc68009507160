//! Form control state: values, options, validity and form data.
//!
//! The element's `value` attribute doubles as its live value, the way the
//! DOM `value` property shadows it once a control has been edited.

use super::arena::{Document, NodeId};

/// One successful control in [`Document::form_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct FormEntry {
    pub node: NodeId,
    pub name: String,
    pub value: String,
}

const SKIPPED_INPUT_TYPES: &[&str] = &["submit", "reset", "button", "image", "file"];

impl Document {
    /// Lower-cased `type` of an `<input>` (`text` when absent).
    pub fn input_type(&self, node: NodeId) -> Option<String> {
        if !self.is_tag(node, "input") {
            return None;
        }
        Some(
            self.get_attr(node, "type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "text".to_string()),
        )
    }

    /// `<option>` descendants of a `<select>`.
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|n| self.is_tag(*n, "option"))
            .collect()
    }

    /// Value of an `<option>`: its `value` attribute, else its text.
    pub fn option_value(&self, option: NodeId) -> String {
        match self.get_attr(option, "value") {
            Some(v) => v.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    /// Current value of a control, mirroring the DOM `value` property.
    pub fn value_of(&self, node: NodeId) -> String {
        if self.is_tag(node, "select") {
            let options = self.options(node);
            let chosen = options
                .iter()
                .find(|o| self.has_attr(**o, "selected"))
                .or(options.first());
            return chosen.map(|o| self.option_value(*o)).unwrap_or_default();
        }
        if self.is_tag(node, "textarea") {
            return match self.get_attr(node, "value") {
                Some(v) => v.to_string(),
                None => self.text_content(node),
            };
        }
        if self.input_type(node).is_some_and(|t| t == "checkbox" || t == "radio") {
            return self.get_attr(node, "value").unwrap_or("on").to_string();
        }
        self.get_attr(node, "value").unwrap_or_default().to_string()
    }

    /// Write a control's value. `<select>` marks the matching option.
    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if self.is_tag(node, "select") {
            self.select_option(node, value);
        } else {
            self.set_attr(node, "value", value);
        }
    }

    /// Mark the option whose value equals `value` as selected.
    pub fn select_option(&mut self, select: NodeId, value: &str) {
        for option in self.options(select) {
            let on = self.option_value(option) == value;
            self.set_flag(option, "selected", on);
        }
    }

    /// Whether a control currently passes validation.
    pub fn is_valid(&self, node: NodeId) -> bool {
        if !self.custom_validity(node).is_empty() {
            return false;
        }
        !(self.has_attr(node, "required") && self.value_of(node).is_empty())
    }

    /// Successful controls of a form in document order, like `FormData`.
    pub fn form_data(&self, form: NodeId) -> Vec<FormEntry> {
        let mut entries = Vec::new();
        for node in self.descendants(form) {
            let is_control = matches!(
                self.element_name(node).map(|n| n.as_ref()),
                Some("input" | "select" | "textarea")
            );
            if !is_control || self.has_attr(node, "disabled") {
                continue;
            }
            let Some(name) = self.get_attr(node, "name").filter(|n| !n.is_empty()) else {
                continue;
            };
            if let Some(kind) = self.input_type(node) {
                if SKIPPED_INPUT_TYPES.contains(&kind.as_str()) {
                    continue;
                }
                if (kind == "checkbox" || kind == "radio") && !self.has_attr(node, "checked") {
                    continue;
                }
            }
            entries.push(FormEntry {
                node,
                name: name.to_string(),
                value: self.value_of(node),
            });
        }
        entries
    }

    /// Named controls of a form carrying exactly `name`.
    pub fn named_controls(&self, form: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(form)
            .into_iter()
            .filter(|n| self.get_attr(*n, "name") == Some(name))
            .collect()
    }

    /// Set one declaration inside the inline `style` attribute.
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) {
        let mut declarations: Vec<(String, String)> = self
            .get_attr(node, "style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|decl| {
                let (name, value) = decl.split_once(':')?;
                Some((name.trim().to_string(), value.trim().to_string()))
            })
            .filter(|(name, _)| !name.is_empty() && name != property)
            .collect();
        declarations.push((property.to_string(), value.to_string()));
        let style = declarations
            .iter()
            .map(|(name, value)| format!("{name}: {value};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(node, "style", &style);
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::parse_html;

    #[test]
    fn test_select_value_defaults_to_first_option() {
        let mut doc = parse_html(
            r#"<select id="u"><option>rem</option><option value="px">Pixels</option></select>"#,
        );
        let select = doc.get_by_id("u").unwrap();
        assert_eq!(doc.value_of(select), "rem");

        doc.set_value(select, "px");
        assert_eq!(doc.value_of(select), "px");
        let selected: Vec<_> = doc
            .options(select)
            .into_iter()
            .filter(|o| doc.has_attr(*o, "selected"))
            .collect();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn test_textarea_value_falls_back_to_text() {
        let mut doc = parse_html(r#"<textarea id="t">a { b: c }</textarea>"#);
        let textarea = doc.get_by_id("t").unwrap();
        assert_eq!(doc.value_of(textarea), "a { b: c }");

        doc.set_value(textarea, "");
        assert_eq!(doc.value_of(textarea), "");
    }

    #[test]
    fn test_form_data_skips_unchecked_and_disabled() {
        let doc = parse_html(
            r#"<form id="f">
                <input name="a" value="1">
                <input name="b" value="2" disabled>
                <input type="checkbox" name="c">
                <input type="checkbox" name="d" checked>
                <input type="submit" name="e" value="go">
                <select name="f"><option>x</option></select>
            </form>"#,
        );
        let form = doc.get_by_id("f").unwrap();

        let entries: Vec<_> = doc
            .form_data(form)
            .into_iter()
            .map(|e| (e.name, e.value))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("a".to_string(), "1".to_string()),
                ("d".to_string(), "on".to_string()),
                ("f".to_string(), "x".to_string()),
            ]
        );
    }

    #[test]
    fn test_required_empty_is_invalid() {
        let mut doc = parse_html(r#"<input id="r" required value="">"#);
        let input = doc.get_by_id("r").unwrap();
        assert!(!doc.is_valid(input));

        doc.set_value(input, "x");
        assert!(doc.is_valid(input));
    }

    #[test]
    fn test_set_style_property_replaces_declaration() {
        let mut doc = parse_html(r#"<div id="fb" style="color: red; display: block"></div>"#);
        let div = doc.get_by_id("fb").unwrap();

        doc.set_style_property(div, "display", "none");

        assert_eq!(doc.get_attr(div, "style"), Some("color: red; display: none;"));
    }
}
