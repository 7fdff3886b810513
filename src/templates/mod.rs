//! Page templates rendered with Tera
//!
//! The portfolio theme is embedded in the binary. A site can replace it by
//! pointing `templates_dir` at a directory with its own `index.html`,
//! `project.html` and `404.html`.

use anyhow::{anyhow, Context as _, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tera::{Context, Tera};

use crate::config::SiteConfig;

/// The three pages a portfolio consists of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Index,
    Project,
    NotFound,
}

impl PageKind {
    pub const ALL: [PageKind; 3] = [PageKind::Index, PageKind::Project, PageKind::NotFound];

    /// Get the template name for this page type
    pub fn template_name(&self) -> &'static str {
        match self {
            PageKind::Index => "index.html",
            PageKind::Project => "project.html",
            PageKind::NotFound => "404.html",
        }
    }
}

/// Turns a page model into HTML
pub trait RenderAdapter: Send + Sync {
    fn render(&self, kind: PageKind, model: &Context) -> Result<String>;
}

/// Site-wide values every template can use
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            language: config.language.clone(),
            root: config.root.clone(),
        }
    }
}

/// Tera-backed renderer
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
}

impl TemplateRenderer {
    /// Create a renderer with the embedded theme
    pub fn new(site: SiteData) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("project.html", include_str!("theme/project.html")),
            ("404.html", include_str!("theme/404.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("theme/partials/head.html"),
            ),
            ("partials/nav.html", include_str!("theme/partials/nav.html")),
            (
                "partials/footer.html",
                include_str!("theme/partials/footer.html"),
            ),
        ])?;

        Ok(Self::finish(tera, site))
    }

    /// Create a renderer from every `*.html` file under `dir`
    pub fn from_dir<P: AsRef<Path>>(dir: P, site: SiteData) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(anyhow!("Template directory not found: {:?}", dir));
        }

        let pattern = dir.join("**").join("*.html");
        let tera = Tera::new(&pattern.to_string_lossy())
            .with_context(|| format!("Failed to load templates from {:?}", dir))?;

        for kind in PageKind::ALL {
            let name = kind.template_name();
            if !tera.get_template_names().any(|n| n == name) {
                return Err(anyhow!("Template {} missing from {:?}", name, dir));
            }
        }

        tracing::debug!("Loaded template overrides from {:?}", dir);
        Ok(Self::finish(tera, site))
    }

    /// Pick embedded or on-disk templates according to the site config
    pub fn from_config(config: &SiteConfig, base_dir: &Path) -> Result<Self> {
        let site = SiteData::from(config);
        match &config.templates_dir {
            Some(dir) => Self::from_dir(base_dir.join(dir), site),
            None => Self::new(site),
        }
    }

    fn finish(mut tera: Tera, site: SiteData) -> Self {
        // Page models carry trusted HTML (about text, overlay bodies)
        tera.autoescape_on(vec![]);

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("skill_label", skill_label_filter);
        tera.register_filter("skill_icon", skill_icon_filter);

        Self { tera, site }
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        context
    }
}

impl RenderAdapter for TemplateRenderer {
    fn render(&self, kind: PageKind, model: &Context) -> Result<String> {
        let mut context = self.base_context();
        context.extend(model.clone());
        self.tera
            .render(kind.template_name(), &context)
            .with_context(|| format!("Failed to render {}", kind.template_name()))
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: "cloud_platforms" -> "Cloud Platforms", "ai_ml" -> "AI ML"
fn skill_label_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("skill_label", "value", String, value);
    Ok(tera::Value::String(skill_label(&s)))
}

/// Tera filter: Font Awesome icon class for a skill category
fn skill_icon_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("skill_icon", "value", String, value);
    Ok(tera::Value::String(skill_icon(&s).to_string()))
}

fn category_words(category: &str) -> impl Iterator<Item = &str> {
    category
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
}

fn skill_label(category: &str) -> String {
    category_words(category)
        .map(|word| {
            if word.chars().count() <= 2 {
                return word.to_uppercase();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn skill_icon(category: &str) -> &'static str {
    for word in category_words(category) {
        match word.to_lowercase().as_str() {
            "cloud" => return "fa-cloud",
            "warehouse" | "databases" | "database" => return "fa-database",
            "ai" | "ml" => return "fa-brain",
            "programming" | "languages" => return "fa-code",
            "infrastructure" | "devops" => return "fa-server",
            "specialties" => return "fa-star",
            "engineering" => return "fa-stream",
            _ => {}
        }
    }
    "fa-tools"
}
