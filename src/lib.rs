//! # themeform
//!
//! Bind HTML form controls to CSS rule properties and DOM attributes, keep
//! grouped controls consistent, validate them, and regenerate a stylesheet
//! as the form is edited.
//!
//! ## Features
//!
//! - Binding names: `selector(.btn)::property(background-color)` and
//!   `selector(html)::attribute(data-theme)`
//! - Sync groups (`data-sync`) mirroring one value across a number field,
//!   a slider, a unit select and a hidden field, converting between units
//! - Constraint validation with shared feedback targets
//! - Minimal stylesheet output: only values that differ from the page's
//!   existing stylesheets are emitted
//!
//! ## Quick Start
//!
//! ```
//! use themeform::dom::parse_html;
//! use themeform::{EditorOptions, FieldEvent, ThemeEditor};
//!
//! let mut doc = parse_html(r##"
//!     <style>.btn { background-color: #fff; }</style>
//!     <form id="theme">
//!         <input type="color" id="bg" name="selector(.btn)::property(background-color)">
//!     </form>"##);
//! let form = doc.get_by_id("theme").unwrap();
//! let mut editor = ThemeEditor::bind(&mut doc, form, EditorOptions::default()).unwrap();
//!
//! let bg = doc.get_by_id("bg").unwrap();
//! doc.set_value(bg, "#ff0000");
//! let css = editor.handle_field_event(&mut doc, bg, FieldEvent::Input);
//! assert_eq!(css, ".btn {\n    background-color: #ff0000;\n}\n");
//! ```
//!
//! ## Binding every form on a page
//!
//! [`ThemeBinder`] owns one [`ThemeEditor`] per `form[data-theme-editor]`
//! and routes field events to the right one:
//!
//! ```
//! use themeform::dom::parse_html;
//! use themeform::{FieldEvent, ThemeBinder};
//!
//! let mut doc = parse_html(r#"<form data-theme-editor>
//!     <input id="gap" name="selector(.grid)::property(gap)" value="1rem">
//! </form>"#);
//! let mut binder = ThemeBinder::default();
//! let forms = binder.bind_all(&mut doc).unwrap();
//!
//! let gap = doc.get_by_id("gap").unwrap();
//! doc.set_value(gap, "2rem");
//! binder.handle_field_event(&mut doc, gap, FieldEvent::Change).unwrap();
//! assert!(binder.editor(forms[0]).unwrap().css().contains("gap: 2rem;"));
//! ```

pub mod binder;
pub mod binding;
pub mod config;
pub mod css;
pub mod dom;
pub mod editor;
pub mod error;
pub mod form;
pub mod project;
pub mod theme_data;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use binder::ThemeBinder;
pub use binding::{BindingName, BindingTarget};
pub use config::{EditorConfig, EditorOptions, ExternalStylesheet, ThemeCategory};
pub use editor::{FieldEvent, ThemeEditor};
pub use error::{Error, Result};
pub use form::{ControlKind, Form, FormField, MergedConstraints, SyncOutcome, Validation, ValueKind};
pub use project::InitialValues;
pub use theme_data::{ThemeData, ThemeMember, ThemeProperty, get_theme_data, set_theme_data};
