//! Benchmarks for binding theme forms and regenerating stylesheets.
//!
//! Run with: cargo bench

use std::fmt::Write;

use criterion::{Criterion, criterion_group, criterion_main};

use themeform::css::{StaticLayout, Stylesheet, UnitConverter};
use themeform::dom::{Document, parse_html};
use themeform::{EditorOptions, FieldEvent, ThemeEditor};

const THEME_PAGE: &str = include_str!("../tests/fixtures/theme.html");

/// A page with `count` selectors, each bound to a color and a synced
/// spacing group.
fn large_page(count: usize) -> String {
    let mut css = String::new();
    let mut fields = String::new();
    for i in 0..count {
        let _ = writeln!(css, ".c{i} {{ color: #000; margin: {i}px; }}");
        let _ = writeln!(
            fields,
            r#"<input type="color" id="color-{i}" name="selector(.c{i})::property(color)">
<input type="hidden" id="margin-{i}" name="selector(.c{i})::property(margin)" data-sync="m{i}">
<input type="number" min="0" max="100" data-sync="m{i}">
<select data-sync="m{i}"><option>px</option><option>rem</option></select>"#
        );
    }
    format!(
        "<!DOCTYPE html><html><head><style>{css}</style></head>\
         <body><form id=\"theme\" data-theme-editor>{fields}</form></body></html>"
    )
}

fn bind(html: &str) -> (Document, ThemeEditor) {
    let mut doc = parse_html(html);
    let form = doc.get_by_id("theme").unwrap();
    let editor = ThemeEditor::bind(&mut doc, form, EditorOptions::default()).unwrap();
    (doc, editor)
}

// ============================================================================
// Parsing Benchmarks
// ============================================================================

fn bench_parse_fixture(c: &mut Criterion) {
    c.bench_function("parse_fixture", |b| {
        b.iter(|| parse_html(THEME_PAGE));
    });
}

fn bench_parse_stylesheet(c: &mut Criterion) {
    let html = large_page(200);
    let start = html.find("<style>").unwrap() + "<style>".len();
    let end = html.find("</style>").unwrap();
    let css = &html[start..end];

    c.bench_function("parse_stylesheet", |b| {
        b.iter(|| Stylesheet::parse(css));
    });
}

// ============================================================================
// Editor Benchmarks
// ============================================================================

fn bench_bind_large_form(c: &mut Criterion) {
    let html = large_page(200);

    c.bench_function("bind_large_form", |b| {
        b.iter(|| bind(&html));
    });
}

fn bench_field_event(c: &mut Criterion) {
    let html = large_page(200);
    let (mut doc, mut editor) = bind(&html);
    let target = doc.get_by_id("color-100").unwrap();
    let mut toggle = false;

    c.bench_function("field_event", |b| {
        b.iter(|| {
            toggle = !toggle;
            doc.set_value(target, if toggle { "#ff0000" } else { "#000000" });
            editor.handle_field_event(&mut doc, target, FieldEvent::Input).len()
        });
    });
}

fn bench_unit_conversion(c: &mut Criterion) {
    let layout = StaticLayout::default();
    let units = UnitConverter::new(&layout, 16.0);

    c.bench_function("unit_conversion", |b| {
        b.iter(|| units.convert(std::hint::black_box(1.5), "rem", "vw"));
    });
}

criterion_group!(
    benches,
    // Parsing
    bench_parse_fixture,
    bench_parse_stylesheet,
    // Editor
    bench_bind_large_form,
    bench_field_event,
    bench_unit_conversion,
);
criterion_main!(benches);
