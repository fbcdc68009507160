//! WASM bindings for rendering theme stylesheets in the browser.
//!
//! This module exposes stateless rendering to JavaScript via wasm-bindgen:
//! the page's HTML goes in, the generated CSS comes out.

use wasm_bindgen::prelude::*;

use crate::binder::ThemeBinder;
use crate::dom::parse_html;
use crate::editor::FieldEvent;

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Render the stylesheet of every theme form in `html`.
///
/// `ids` and `values` are parallel arrays of field ids and the values to
/// give them before rendering. Returns the generated CSS of all forms.
#[wasm_bindgen]
pub fn render_stylesheet(html: &str, ids: Vec<String>, values: Vec<String>) -> Result<String, JsValue> {
    if ids.len() != values.len() {
        return Err(JsValue::from_str("ids and values differ in length"));
    }

    let mut doc = parse_html(html);
    let mut binder = ThemeBinder::default();
    let forms = binder
        .bind_all(&mut doc)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    for (id, value) in ids.iter().zip(&values) {
        let node = doc
            .get_by_id(id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {id}")))?;
        doc.set_value(node, value);
        binder
            .handle_field_event(&mut doc, node, FieldEvent::Change)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
    }

    Ok(forms
        .into_iter()
        .filter_map(|form| binder.editor(form))
        .map(|editor| editor.css())
        .collect())
}
