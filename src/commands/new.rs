//! Scaffold an overlay for a project

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::Folio;

/// Create `<content_dir>/<id>.md` for a project the store knows
pub fn create_overlay(folio: &Folio, id: &str) -> Result<PathBuf> {
    let Some(summary) = folio.store.find_project_summary(id) else {
        let known: Vec<&str> = folio.store.project_ids().collect();
        bail!("Unknown project: {}. Known: {}", id, known.join(", "));
    };

    let resolver = folio.assembler();
    let file_path = resolver.overlays().overlay_path(id);
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(resolver.overlays().content_dir())?;

    let now = chrono::Local::now();
    // JSON strings are valid YAML scalars, which keeps titles with ':' intact
    let content = format!(
        "---\ntitle: {}\ndate: {}\ndraft: true\n---\n\n# {}\n\n{}\n",
        serde_json::to_string(&summary.title)?,
        now.format("%Y-%m-%d"),
        summary.title,
        summary.description
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Run the new command
pub fn run(folio: &Folio, id: &str) -> Result<()> {
    let path = create_overlay(folio, id)?;
    println!("Created: {:?}", path);
    Ok(())
}
