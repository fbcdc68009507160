//! Projection of form values into CSS text, DOM attributes and code slots.
//!
//! The generated stylesheet is rebuilt from scratch on every call. Only
//! values that are valid and differ from the [`InitialValues`] snapshot are
//! emitted, so resetting a field to its original value removes it again.

use std::collections::HashMap;
use std::fmt::Write;

use log::{debug, warn};
use url::Url;

use crate::binding::{BindingName, BindingTarget};
use crate::config::EditorOptions;
use crate::css::{Stylesheet, minimize_css, sanitize_property_value};
use crate::dom::{Document, NodeId};
use crate::form::{Form, css_value};

/// Attribute marking elements that mirror the generated CSS.
pub const CODE_SLOT_ATTR: &str = "data-theme-editor-code";

/// Attribute marking stylesheets prepended to code slot output.
pub const ASSET_ATTR: &str = "data-theme-editor-asset";

/// Attribute holding a selector that hides its element when it matches.
pub const HIDDEN_IF_ATTR: &str = "data-hidden-if";

/// Baseline values read from existing stylesheets when a form is bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitialValues {
    values: HashMap<String, String>,
}

impl InitialValues {
    /// Scan `<style>` elements in document order, then the linked sheets in
    /// `options`. Later rules overwrite earlier ones.
    pub fn scan(doc: &Document, form: &Form, options: &EditorOptions) -> Self {
        let mut sheets: Vec<Stylesheet> = doc
            .elements()
            .into_iter()
            .filter(|node| doc.is_tag(*node, "style"))
            .map(|node| Stylesheet::parse(&doc.text_content(node)))
            .collect();
        sheets.extend(options.stylesheets.iter().map(|sheet| Stylesheet::parse(&sheet.css)));

        let bindings: Vec<&BindingName> = form.named_fields().filter_map(|f| f.binding.as_ref()).collect();
        Self::from_sheets(&bindings, &sheets)
    }

    /// Build the snapshot for `bindings` from already parsed sheets.
    pub fn from_sheets(bindings: &[&BindingName], sheets: &[Stylesheet]) -> Self {
        let mut values = HashMap::new();
        for binding in bindings {
            let Some(property) = binding.property() else {
                continue;
            };
            let selectors = binding.selector_list();
            for rule in sheets.iter().flat_map(|sheet| &sheet.rules) {
                if !rule.selectors.iter().any(|s| selectors.contains(s)) {
                    continue;
                }
                if let Some(value) = rule.property(property) {
                    values.insert(binding.raw().to_string(), sanitize_property_value(value));
                }
            }
        }
        Self { values }
    }

    /// Snapshot value for a binding name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Render the form's changed property values as CSS text.
///
/// One block per selector, in the order selectors first appear:
///
/// ```text
/// .btn {
///     background-color: #ff0000;
/// }
/// ```
pub fn render_css(doc: &Document, form: NodeId, initial: &InitialValues) -> String {
    let mut buckets: Vec<(String, Vec<String>)> = Vec::new();

    for entry in doc.form_data(form) {
        let Ok(binding) = BindingName::parse(&entry.name) else {
            continue;
        };
        let BindingTarget::Property(property) = binding.target() else {
            continue;
        };
        let value = css_value(doc, entry.node);
        if value.is_empty() || !doc.is_valid(entry.node) {
            continue;
        }
        if initial.get(&entry.name) == Some(sanitize_property_value(&value).as_str()) {
            continue;
        }

        let declaration = format!("{property}: {value}");
        match buckets.iter_mut().find(|(sel, _)| sel.as_str() == binding.selector()) {
            Some((_, declarations)) => declarations.push(declaration),
            None => buckets.push((binding.selector().to_string(), vec![declaration])),
        }
    }

    let mut css = String::new();
    for (selector, declarations) in buckets {
        let _ = writeln!(css, "{selector} {{");
        for declaration in declarations {
            let _ = writeln!(css, "    {declaration};");
        }
        css.push_str("}\n");
    }
    css
}

/// Write attribute-bound values onto every matching element.
///
/// Attributes already holding the value are left alone. Returns the number
/// of attributes written.
pub fn project_attributes(doc: &mut Document, form: NodeId) -> usize {
    let mut writes = 0;
    for entry in doc.form_data(form) {
        let Ok(binding) = BindingName::parse(&entry.name) else {
            continue;
        };
        let Some(attribute) = binding.attribute() else {
            continue;
        };
        let targets = match doc.query_selector_all(binding.selector()) {
            Ok(targets) => targets,
            Err(err) => {
                warn!("attribute binding {binding}: {err}");
                continue;
            }
        };
        for node in targets {
            if doc.get_attr(node, attribute) != Some(entry.value.as_str()) {
                doc.set_attr(node, attribute, &entry.value);
                writes += 1;
            }
        }
    }
    if writes > 0 {
        debug!("wrote {writes} bound attribute(s)");
    }
    writes
}

/// Toggle `hidden` on every `[data-hidden-if]` element: set when its
/// selector matches at least one element.
pub fn update_visibility(doc: &mut Document) {
    for node in doc.elements_with_attr(HIDDEN_IF_ATTR) {
        let selector = doc.get_attr(node, HIDDEN_IF_ATTR).unwrap_or_default().to_string();
        match doc.query_selector(&selector) {
            Ok(found) => doc.set_flag(node, "hidden", found.is_some()),
            Err(err) => warn!("{HIDDEN_IF_ATTR}: {err}"),
        }
    }
}

/// Stylesheet text contributed by each `[data-theme-editor-asset]` element.
///
/// Assets with a non-empty attribute or text content are inlined and
/// minimized. Other assets become an `@import` of their absolute `href`.
pub fn collect_assets(doc: &Document, options: &EditorOptions) -> Vec<String> {
    let base = options.base_url.as_deref().and_then(|base| match Url::parse(base) {
        Ok(url) => Some(url),
        Err(err) => {
            warn!("invalid base URL {base:?}: {err}");
            None
        }
    });

    doc.elements_with_attr(ASSET_ATTR)
        .into_iter()
        .map(|node| {
            let text = doc.text_content(node);
            let flagged = doc.get_attr(node, ASSET_ATTR).is_some_and(|v| !v.is_empty());
            let href = doc.get_attr(node, "href").unwrap_or_default();

            if flagged || !text.is_empty() {
                let code = match options.stylesheet(href) {
                    Some(css) if doc.is_tag(node, "link") => css,
                    _ => text.as_str(),
                };
                return minimize_css(code);
            }
            if href.is_empty() {
                return String::new();
            }
            format!("@import url('{}');\n", resolve_href(base.as_ref(), href))
        })
        .collect()
}

fn resolve_href(base: Option<&Url>, href: &str) -> String {
    let resolved = match base {
        Some(base) => base.join(href),
        None => Url::parse(href),
    };
    match resolved {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}

/// Combine asset text and generated CSS the way code slots show it.
pub fn code_output(assets: &[String], css: &str) -> String {
    if assets.is_empty() {
        return css.to_string();
    }
    let css = if css.trim().is_empty() {
        css.to_string()
    } else {
        format!("\n\n{css}")
    };
    let mut parts = assets.to_vec();
    parts.push(css);
    parts.join("\n")
}

/// Write `code` into every code slot whose selector matches `form`.
///
/// `<pre>` and `<code>` receive text, `<textarea>` a value, anything else
/// parsed markup.
pub fn write_code_slots(doc: &mut Document, form: NodeId, code: &str) -> usize {
    let mut written = 0;
    for slot in doc.elements_with_attr(CODE_SLOT_ATTR) {
        let selector = doc.get_attr(slot, CODE_SLOT_ATTR).unwrap_or_default().to_string();
        match doc.matches(form, &selector) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                warn!("{CODE_SLOT_ATTR}: {err}");
                continue;
            }
        }
        let tag = doc.element_name(slot).map(|n| n.to_string()).unwrap_or_default();
        match tag.as_str() {
            "pre" | "code" => doc.set_text_content(slot, code),
            "textarea" => doc.set_value(slot, code),
            _ => doc.set_inner_html(slot, code),
        }
        written += 1;
    }
    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExternalStylesheet;
    use crate::dom::parse_html;

    fn snapshot(doc: &Document) -> InitialValues {
        let form = Form::capture(doc, doc.find_by_tag("form").unwrap()).unwrap();
        InitialValues::scan(doc, &form, &EditorOptions::default())
    }

    #[test]
    fn test_snapshot_matches_normalized_selectors() {
        let doc = parse_html(
            r#"<style>
                .btn, [data-x="y"] { color: #abc; }
                .card { padding: 1rem; }
                .card { padding: 2rem !important; }
            </style>
            <form>
                <input name='selector([data-x="y"])::property(color)'>
                <input name="selector(.card)::property(padding)">
                <input name="selector(.other)::property(color)">
            </form>"#,
        );
        let initial = snapshot(&doc);

        assert_eq!(initial.get(r#"selector([data-x="y"])::property(color)"#), Some("#aabbcc"));
        assert_eq!(initial.get("selector(.card)::property(padding)"), Some("2rem"));
        assert_eq!(initial.get("selector(.other)::property(color)"), None);
    }

    #[test]
    fn test_linked_sheets_are_scanned_after_style_elements() {
        let doc = parse_html(
            r#"<style>.a { margin: 1px }</style>
            <form><input name="selector(.a)::property(margin)"></form>"#,
        );
        let form = Form::capture(&doc, doc.find_by_tag("form").unwrap()).unwrap();
        let options = EditorOptions {
            stylesheets: vec![ExternalStylesheet {
                href: "theme.css".into(),
                css: ".a { margin: 2px }".into(),
            }],
            ..EditorOptions::default()
        };

        let initial = InitialValues::scan(&doc, &form, &options);
        assert_eq!(initial.get("selector(.a)::property(margin)"), Some("2px"));
    }

    #[test]
    fn test_render_groups_by_selector_in_first_seen_order() {
        let doc = parse_html(
            r#"<form id="f">
                <input name="selector(.b)::property(color)" value="red">
                <input name="selector(.a)::property(color)" value="blue">
                <input name="selector(.b)::property(margin)" value="2px">
                <input name="selector(.a)::attribute(title)" value="ignored">
                <input name="plain" value="ignored">
            </form>"#,
        );
        let form = doc.get_by_id("f").unwrap();

        let css = render_css(&doc, form, &InitialValues::default());
        assert_eq!(
            css,
            ".b {\n    color: red;\n    margin: 2px;\n}\n.a {\n    color: blue;\n}\n"
        );
    }

    #[test]
    fn test_render_skips_unchanged_invalid_and_empty_values() {
        let mut doc = parse_html(
            r##"<style>.btn { background-color: #fff }</style>
            <form id="f">
                <input id="bg" name="selector(.btn)::property(background-color)" value="#ffffff">
                <input id="fg" name="selector(.btn)::property(color)" value="red">
                <input name="selector(.btn)::property(border)" value="">
            </form>"##,
        );
        let form = doc.get_by_id("f").unwrap();
        let initial = snapshot(&doc);
        let fg = doc.get_by_id("fg").unwrap();
        doc.set_custom_validity(fg, "Invalid value");

        assert_eq!(render_css(&doc, form, &initial), "");

        let bg = doc.get_by_id("bg").unwrap();
        doc.set_value(bg, "#ff0000");
        assert_eq!(
            render_css(&doc, form, &initial),
            ".btn {\n    background-color: #ff0000;\n}\n"
        );
    }

    #[test]
    fn test_attribute_projection_is_idempotent() {
        let mut doc = parse_html(
            r#"<html data-theme="light"><body>
                <form id="f"><select name="selector(html)::attribute(data-theme)">
                    <option>light</option><option selected>dark</option>
                </select></form>
            </body></html>"#,
        );
        let form = doc.get_by_id("f").unwrap();

        assert_eq!(project_attributes(&mut doc, form), 1);
        let html = doc.find_by_tag("html").unwrap();
        assert_eq!(doc.get_attr(html, "data-theme"), Some("dark"));
        assert_eq!(project_attributes(&mut doc, form), 0);
    }

    #[test]
    fn test_visibility_follows_selector() {
        let mut doc = parse_html(
            r#"<div id="note" data-hidden-if="html[data-theme=dark]"></div>
               <div id="bad" data-hidden-if="[["></div>"#,
        );
        let note = doc.get_by_id("note").unwrap();

        update_visibility(&mut doc);
        assert!(!doc.has_attr(note, "hidden"));

        let html = doc.find_by_tag("html").unwrap();
        doc.set_attr(html, "data-theme", "dark");
        update_visibility(&mut doc);
        assert!(doc.has_attr(note, "hidden"));
        assert!(!doc.has_attr(doc.get_by_id("bad").unwrap(), "hidden"));
    }

    #[test]
    fn test_assets_inline_or_import() {
        let doc = parse_html(
            r#"<head>
                <style data-theme-editor-asset>
                    /* base */
                    body { margin: 0; }
                </style>
                <link rel="stylesheet" href="fonts.css" data-theme-editor-asset>
                <link rel="stylesheet" href="theme.css" data-theme-editor-asset="inline">
            </head>"#,
        );
        let options = EditorOptions {
            base_url: Some("https://example.com/site/".into()),
            stylesheets: vec![ExternalStylesheet {
                href: "theme.css".into(),
                css: ".t { color : red ; }".into(),
            }],
            ..EditorOptions::default()
        };

        let assets = collect_assets(&doc, &options);
        assert_eq!(
            assets,
            vec![
                "body{margin:0}".to_string(),
                "@import url('https://example.com/site/fonts.css');\n".to_string(),
                ".t{color:red}".to_string(),
            ]
        );
    }

    #[test]
    fn test_code_output_layout() {
        assert_eq!(code_output(&[], "a {}\n"), "a {}\n");
        assert_eq!(code_output(&["x{}".into()], "a {}\n"), "x{}\n\n\na {}\n");
        assert_eq!(code_output(&["x{}".into()], ""), "x{}\n");
    }

    #[test]
    fn test_code_slot_write_strategies() {
        let mut doc = parse_html(
            r##"<form id="f" class="theme"></form>
            <pre id="p" data-theme-editor-code=".theme"></pre>
            <textarea id="t" data-theme-editor-code="form"></textarea>
            <div id="d" data-theme-editor-code="#f"></div>
            <pre id="other" data-theme-editor-code=".nope"></pre>"##,
        );
        let form = doc.get_by_id("f").unwrap();

        let written = write_code_slots(&mut doc, form, "a { b: c; }");

        assert_eq!(written, 3);
        assert_eq!(doc.text_content(doc.get_by_id("p").unwrap()), "a { b: c; }");
        assert_eq!(doc.value_of(doc.get_by_id("t").unwrap()), "a { b: c; }");
        assert_eq!(doc.text_content(doc.get_by_id("d").unwrap()), "a { b: c; }");
        assert_eq!(doc.text_content(doc.get_by_id("other").unwrap()), "");
    }
}
