//! List site content

use anyhow::Result;
use std::fmt::Write as _;

use crate::Folio;

/// List store content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    print!("{}", render(folio, content_type)?);
    Ok(())
}

fn render(folio: &Folio, content_type: &str) -> Result<String> {
    let bundle = folio.store.bundle();
    let mut out = String::new();

    match content_type {
        "project" | "projects" => {
            let assembler = folio.assembler();
            writeln!(out, "Projects ({}):", bundle.projects.len())?;
            for project in &bundle.projects {
                let status = assembler.overlays().status(&project.id);
                writeln!(
                    out,
                    "  {} - {} [{}] ({})",
                    project.id,
                    project.title,
                    project.period,
                    status.label()
                )?;
            }
        }
        "experience" => {
            writeln!(out, "Experience ({}):", bundle.experience.len())?;
            for entry in &bundle.experience {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    entry.company, entry.position, entry.period
                )?;
                for achievement in &entry.achievements {
                    writeln!(out, "    * {}", achievement)?;
                }
            }
        }
        "skill" | "skills" => {
            writeln!(out, "Skills ({}):", bundle.skills.len())?;
            for (category, skills) in &bundle.skills {
                writeln!(out, "  {}: {}", category, skills.join(", "))?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: projects, experience, skills",
                content_type
            );
        }
    }

    Ok(out)
}
