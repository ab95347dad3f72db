//! View engine
//!
//! Page templates rendered with Tera. Templates are embedded in the binary
//! and a directory may be configured whose files replace embedded ones of
//! the same name.

use rust_embed::RustEmbed;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use tera::{Context as TeraContext, Tera, Value};

use crate::models::wire;

mod error;

pub use error::ViewError;

/// Templates shipped with the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

pub struct ViewEngine {
    tera: Tera,
}

impl ViewEngine {
    /// Build from the embedded templates, then apply `override_dir` if given
    pub fn new(override_dir: Option<&Path>) -> Result<Self, ViewError> {
        let mut templates: HashMap<String, String> = HashMap::new();
        for name in EmbeddedTemplates::iter() {
            if let Some(file) = EmbeddedTemplates::get(&name) {
                let content = String::from_utf8_lossy(&file.data).into_owned();
                templates.insert(name.to_string(), content);
            }
        }

        if let Some(dir) = override_dir {
            let mut overrides = Vec::new();
            collect_templates(dir, dir, &mut overrides)?;
            for (name, content) in overrides {
                tracing::debug!("Template override: {}", name);
                templates.insert(name, content);
            }
        }

        Self::from_templates(templates)
    }

    fn from_templates(templates: HashMap<String, String>) -> Result<Self, ViewError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates)
            .map_err(|e| ViewError::Template(describe(&e)))?;
        tera.register_filter("date_fr", date_fr);
        tera.register_filter("time_hm", time_hm);
        Ok(Self { tera })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }

    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String, ViewError> {
        self.tera.render(template, context).map_err(|e| {
            ViewError::Template(format!("Failed to render '{}': {}", template, describe(&e)))
        })
    }

    /// Render, falling back to `error.html`, then to a built-in page
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("{}, trying error template", e);

                let mut error_context = context.clone();
                error_context.insert("error_message", "La page n'a pas pu être affichée.");
                error_context.insert("status", &500);

                match self.render("error.html", &error_context) {
                    Ok(html) => html,
                    Err(error_template_err) => {
                        tracing::warn!("{}, returning built-in error page", error_template_err);
                        simple_error_page(template)
                    }
                }
            }
        }
    }
}

/// Error message with its whole source chain
fn describe(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

/// Last-resort page when neither the template nor error.html renders
fn simple_error_page(template: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Erreur</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 600px;
            margin: 50px auto;
            padding: 20px;
            background: #fff7ed;
        }}
        .error-box {{
            background: white;
            border-left: 4px solid #ea580c;
            padding: 20px;
            border-radius: 4px;
        }}
        h1 {{ color: #ea580c; margin-top: 0; }}
    </style>
</head>
<body>
    <div class="error-box">
        <h1>Erreur d'affichage</h1>
        <p>La page <code>{}</code> n'a pas pu être affichée.</p>
        <p><a href="/">Retour à l'accueil</a></p>
    </div>
</body>
</html>"#,
        tera::escape_html(template)
    )
}

/// Collect `*.html` files below `current`, named relative to `base`
fn collect_templates(base: &Path, current: &Path, out: &mut Vec<(String, String)>) -> Result<(), ViewError> {
    if !current.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(current)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_templates(base, &path, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("html") {
            let name = path
                .strip_prefix(base)
                .map_err(|e| ViewError::Template(e.to_string()))?
                .to_string_lossy()
                .replace('\\', "/");
            out.push((name, fs::read_to_string(&path)?));
        }
    }
    Ok(())
}

/// `{{ value | date_fr }}`: `15/03/2024`, empty for missing or unparsable values
fn date_fr(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let formatted = value
        .as_str()
        .and_then(wire::parse_datetime)
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_default();
    Ok(Value::String(formatted))
}

/// `{{ value | time_hm }}`: `09:30` from `09:30:00`
fn time_hm(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let formatted = value
        .as_str()
        .and_then(wire::parse_time)
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default();
    Ok(Value::String(formatted))
}

/// Variables every page receives
#[derive(Debug, Clone, Serialize)]
pub struct PageVars {
    pub site_name: String,
    pub request_path: String,
    pub year: i32,
}

impl PageVars {
    pub fn new(site_name: impl Into<String>, request_path: impl Into<String>) -> Self {
        use chrono::Datelike;
        Self {
            site_name: site_name.into(),
            request_path: request_path.into(),
            year: chrono::Utc::now().year(),
        }
    }

    pub fn insert_into(&self, context: &mut TeraContext) {
        context.insert("site_name", &self.site_name);
        context.insert("request_path", &self.request_path);
        context.insert("year", &self.year);
    }
}
