//! themeform - Render the theme stylesheet of an HTML page's theme forms

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::warn;

use themeform::dom::{Document, NodeId, parse_html};
use themeform::form::set_css_value;
use themeform::util::{decode_text, sniff_meta_charset};
use themeform::{
    EditorConfig, EditorOptions, ExternalStylesheet, FieldEvent, ThemeBinder, get_theme_data,
};

#[derive(Parser)]
#[command(name = "themeform")]
#[command(version, about = "Render the theme stylesheet of an HTML page's theme forms", long_about = None)]
#[command(after_help = "EXAMPLES:
    themeform page.html                               Print generated CSS
    themeform page.html --css theme.css               Diff against a linked stylesheet
    themeform page.html --set '#accent=#ff0000'       Edit a field by id
    themeform page.html --set 'selector(.btn)::property(color)=red'
    themeform page.html --theme-data                  Print theme data as JSON")]
struct Cli {
    /// Input HTML page
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Linked stylesheet to read initial values from (repeatable)
    #[arg(long = "css", value_name = "FILE")]
    stylesheets: Vec<PathBuf>,

    /// Set a field before rendering: `#id=VALUE` or `NAME=VALUE` (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    edits: Vec<String>,

    /// Editor configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base URL for resolving `data-theme-editor-asset` hrefs
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Print theme data as JSON instead of CSS
    #[arg(short, long)]
    theme_data: bool,

    /// Suppress log messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let bytes = fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let html = decode_text(&bytes, sniff_meta_charset(&bytes));
    let mut doc = parse_html(&html);

    let options = load_options(cli)?;
    let config = options.config.clone();
    let mut binder = ThemeBinder::new(options);
    let forms = binder.bind_all(&mut doc).map_err(|e| e.to_string())?;
    if forms.is_empty() {
        return Err("no form[data-theme-editor] found".to_string());
    }

    for edit in &cli.edits {
        let (field, value) = split_edit(edit)?;
        let controls = find_controls(&doc, field);
        if controls.is_empty() {
            return Err(format!("no field matches {field}"));
        }
        for &node in &controls {
            apply_edit(&mut doc, node, value);
        }
        for node in controls {
            if let Err(e) = binder.handle_field_event(&mut doc, node, FieldEvent::Change) {
                warn!("{field}: {e}");
            }
        }
    }

    if cli.theme_data {
        let data: Vec<_> = forms
            .iter()
            .map(|&form| get_theme_data(&doc, form, &config))
            .collect();
        let json = if let [single] = data.as_slice() {
            serde_json::to_string_pretty(single)
        } else {
            serde_json::to_string_pretty(&data)
        };
        println!("{}", json.map_err(|e| e.to_string())?);
        return Ok(());
    }

    for form in forms {
        if let Some(editor) = binder.editor(form) {
            print!("{}", editor.css());
        }
    }
    Ok(())
}

fn load_options(cli: &Cli) -> Result<EditorOptions, String> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path).map_err(|e| e.to_string())?,
        None => EditorConfig::default(),
    };

    let mut options = EditorOptions::with_config(config);
    options.base_url = cli.base_url.clone();
    for path in &cli.stylesheets {
        let bytes = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
        options.stylesheets.push(ExternalStylesheet {
            href: path.to_string_lossy().into_owned(),
            css: decode_text(&bytes, None).into_owned(),
        });
    }
    Ok(options)
}

/// Split `FIELD=VALUE`. Binding names end in `)`, so a `)=` marks the split
/// even when the selector itself contains `=`.
fn split_edit(edit: &str) -> Result<(&str, &str), String> {
    let split = match edit.find(")=") {
        Some(pos) if !edit.starts_with('#') => Some((&edit[..=pos], &edit[pos + 2..])),
        _ => edit.split_once('='),
    };
    split
        .filter(|(field, _)| !field.is_empty())
        .ok_or_else(|| format!("expected FIELD=VALUE, got {edit:?}"))
}

fn find_controls(doc: &Document, field: &str) -> Vec<NodeId> {
    if let Some(id) = field.strip_prefix('#') {
        return doc.get_by_id(id).into_iter().collect();
    }
    doc.elements()
        .into_iter()
        .filter(|&node| doc.get_attr(node, "name") == Some(field))
        .collect()
}

fn apply_edit(doc: &mut Document, node: NodeId, value: &str) {
    let checkable = doc
        .input_type(node)
        .is_some_and(|t| t == "checkbox" || t == "radio");
    if checkable {
        let on = doc.value_of(node) == value;
        doc.set_flag(node, "checked", on);
    } else {
        set_css_value(doc, node, value);
    }
}
