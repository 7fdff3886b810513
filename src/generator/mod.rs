//! Generator module - pre-renders every page into the public directory

use anyhow::{anyhow, bail, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::model::{PageAssembler, PageModel};
use crate::templates::RenderAdapter;
use crate::Folio;

/// Static assets are published under this directory of the output root
pub const STATIC_PREFIX: &str = "static";

/// Directory of the output root holding project pages
pub const PROJECT_DIR: &str = "project";

/// What a build produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// HTML pages written
    pub pages: usize,
    /// Static files copied
    pub assets: usize,
}

/// Static site generator
pub struct Generator {
    assembler: PageAssembler,
    renderer: Box<dyn RenderAdapter>,
    static_dir: PathBuf,
    public_dir: PathBuf,
}

impl Generator {
    /// Create a generator for a site. Fails if the templates cannot be loaded.
    pub fn new(folio: &Folio) -> Result<Self> {
        let renderer = folio.renderer()?;
        Ok(Self::with_parts(
            folio.assembler(),
            Box::new(renderer),
            folio.static_dir.clone(),
            folio.public_dir.clone(),
        ))
    }

    pub fn with_parts(
        assembler: PageAssembler,
        renderer: Box<dyn RenderAdapter>,
        static_dir: PathBuf,
        public_dir: PathBuf,
    ) -> Self {
        Self {
            assembler,
            renderer,
            static_dir,
            public_dir,
        }
    }

    /// Generate the entire site
    pub fn generate(&self) -> Result<BuildReport> {
        if !self.static_dir.is_dir() {
            bail!("Static directory not found: {:?}", self.static_dir);
        }
        if self.static_dir.starts_with(&self.public_dir)
            || self.assembler.overlays().content_dir().starts_with(&self.public_dir)
        {
            bail!(
                "Output directory {:?} would overwrite site sources",
                self.public_dir
            );
        }

        self.setup_output_dir()?;

        let mut report = BuildReport::default();

        // Home page
        let home = PageModel::Home(self.assembler.build_home_model());
        self.write_page(&home, &self.public_dir.join("index.html"))?;
        report.pages += 1;

        // Project pages
        let project_dir = self.public_dir.join(PROJECT_DIR);
        fs::create_dir_all(&project_dir)?;
        for id in self.assembler.list_known_project_ids() {
            let Some(detail) = self.assembler.build_project_model(id) else {
                continue;
            };
            let page = PageModel::Project(detail);
            self.write_page(&page, &project_dir.join(format!("{}.html", id)))?;
            report.pages += 1;
        }

        // Not-found page
        self.write_page(&PageModel::NotFound, &self.public_dir.join("404.html"))?;
        report.pages += 1;

        report.assets = self.copy_static_assets()?;

        Ok(report)
    }

    /// Remove any previous output and start from an empty directory
    fn setup_output_dir(&self) -> Result<()> {
        if self.public_dir.exists() {
            fs::remove_dir_all(&self.public_dir)?;
            tracing::debug!("Removed previous output {:?}", self.public_dir);
        }
        fs::create_dir_all(&self.public_dir)?;
        Ok(())
    }

    fn write_page(&self, page: &PageModel<'_>, output_path: &Path) -> Result<()> {
        let html = self.renderer.render(page.kind(), &page.to_context())?;
        fs::write(output_path, html)
            .map_err(|e| anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the static tree verbatim to `<public>/static`
    fn copy_static_assets(&self) -> Result<usize> {
        let dest_root = self.public_dir.join(STATIC_PREFIX);
        fs::create_dir_all(&dest_root)?;

        let mut copied = 0;
        for entry in WalkDir::new(&self.static_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            let relative = path.strip_prefix(&self.static_dir)?;
            let dest = dest_root.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest)?;
            } else {
                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(path, &dest)
                    .map_err(|e| anyhow!("Failed to copy {:?}: {}", path, e))?;
                copied += 1;
            }
        }

        tracing::debug!("Copied {} static files", copied);
        Ok(copied)
    }
}
