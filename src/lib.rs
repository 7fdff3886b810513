//! folio: a personal portfolio site
//!
//! Static portfolio data and optional per-project markdown overlays are
//! rendered through Tera templates, either on request by a small axum server
//! or ahead of time into a directory of static files.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod model;
pub mod server;
pub mod store;
pub mod templates;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use content::{MarkdownRenderer, OverlayResolver};
use model::PageAssembler;
use store::ContentStore;
use templates::TemplateRenderer;

/// The main application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Overlay markdown directory
    pub content_dir: PathBuf,
    /// Static assets directory
    pub static_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
    /// Portfolio data, built once
    pub store: Arc<ContentStore>,
}

impl Folio {
    /// Create a new instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)
                .with_context(|| format!("Failed to load {:?}", config_path))?
        } else {
            config::SiteConfig::default()
        };

        let store = match &config.data_file {
            Some(file) => ContentStore::load(base_dir.join(file))?,
            None => ContentStore::builtin()?,
        };
        tracing::debug!(
            "Content store revision {} with {} projects",
            store.revision(),
            store.bundle().projects.len()
        );

        Ok(Self::with_store(base_dir, config, store))
    }

    /// Assemble an instance from parts
    pub fn with_store(base_dir: PathBuf, config: config::SiteConfig, store: ContentStore) -> Self {
        let content_dir = base_dir.join(&config.content_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            content_dir,
            static_dir,
            public_dir,
            store: Arc::new(store),
        }
    }

    /// Re-read configuration and data, keeping the output directory
    pub fn reload(&self) -> Result<Self> {
        let mut fresh = Self::new(&self.base_dir)?;
        fresh.public_dir = self.public_dir.clone();
        Ok(fresh)
    }

    /// Files and directories whose changes affect the rendered site
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![
            self.content_dir.clone(),
            self.static_dir.clone(),
            self.base_dir.join("_config.yml"),
        ];
        if let Some(dir) = &self.config.templates_dir {
            paths.push(self.base_dir.join(dir));
        }
        if let Some(file) = &self.config.data_file {
            paths.push(self.base_dir.join(file));
        }
        paths.retain(|p| p.exists());
        paths
    }

    /// Page assembler over this site's store and overlays
    pub fn assembler(&self) -> PageAssembler {
        let renderer = MarkdownRenderer::with_options(
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        );
        let overlays = OverlayResolver::with_renderer(&self.content_dir, renderer);
        PageAssembler::new(Arc::clone(&self.store), overlays)
    }

    /// Template renderer for this site
    pub fn renderer(&self) -> Result<TemplateRenderer> {
        TemplateRenderer::from_config(&self.config, &self.base_dir)
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<generator::BuildReport> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
