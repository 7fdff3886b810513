//! Markdown overlays - optional rich bodies for project pages
//!
//! A project may have `<content_dir>/<id>.md`. Resolution never fails: a
//! missing file and a broken file both turn into placeholder HTML so that
//! page rendering always gets a complete model.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{FrontMatter, FrontMatterError, MarkdownRenderer, ProjectDetail};
use crate::store::{self, ProjectSummary};

/// Shown when a project has no overlay file
pub const CONTENT_NOT_PREPARED: &str = "<p>프로젝트 상세 내용을 준비 중입니다.</p>";

/// Shown when an overlay file exists but cannot be used
pub const CONTENT_UNAVAILABLE: &str = "<p>프로젝트 상세 내용을 불러올 수 없습니다.</p>";

/// Overlay file extension
const OVERLAY_EXT: &str = "md";

/// Failures inside the resolver. Never leaves this module as an error.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("project id {0:?} cannot name an overlay file")]
    InvalidId(String),

    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed front-matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

/// What is on disk for a project, as reported by `folio list`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    Missing,
    Present,
    Broken,
}

impl OverlayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OverlayStatus::Missing => "no overlay",
            OverlayStatus::Present => "overlay",
            OverlayStatus::Broken => "broken overlay",
        }
    }
}

/// A parsed overlay document
struct Overlay {
    front_matter: FrontMatter,
    body: String,
}

/// Resolves project summaries into project details
pub struct OverlayResolver {
    content_dir: PathBuf,
    renderer: MarkdownRenderer,
    #[cfg(test)]
    lookups: std::sync::atomic::AtomicUsize,
}

impl OverlayResolver {
    pub fn new<P: AsRef<Path>>(content_dir: P) -> Self {
        Self::with_renderer(content_dir, MarkdownRenderer::new())
    }

    pub fn with_renderer<P: AsRef<Path>>(content_dir: P, renderer: MarkdownRenderer) -> Self {
        Self {
            content_dir: content_dir.as_ref().to_path_buf(),
            renderer,
            #[cfg(test)]
            lookups: Default::default(),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    /// `<content_dir>/<id>.md`
    pub fn overlay_path(&self, id: &str) -> PathBuf {
        self.content_dir.join(format!("{}.{}", id, OVERLAY_EXT))
    }

    /// Copy the summary and attach its overlay body or a placeholder
    pub fn resolve_detail(&self, summary: &ProjectSummary) -> ProjectDetail {
        let content = match self.load(&summary.id) {
            Ok(Some(overlay)) => {
                if overlay.front_matter.draft {
                    tracing::debug!("Overlay for {} is marked as draft", summary.id);
                }
                self.renderer.render(&overlay.body)
            }
            Ok(None) => CONTENT_NOT_PREPARED.to_string(),
            Err(e) => {
                tracing::warn!("Overlay for {} unavailable: {}", summary.id, e);
                CONTENT_UNAVAILABLE.to_string()
            }
        };

        ProjectDetail::new(summary.clone(), content)
    }

    /// Inspect the overlay of a project without rendering it
    pub fn status(&self, id: &str) -> OverlayStatus {
        match self.load(id) {
            Ok(Some(_)) => OverlayStatus::Present,
            Ok(None) => OverlayStatus::Missing,
            Err(_) => OverlayStatus::Broken,
        }
    }

    /// Read and split an overlay. `Ok(None)` means there is no file.
    fn load(&self, id: &str) -> Result<Option<Overlay>, OverlayError> {
        #[cfg(test)]
        self.lookups
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        if !store::is_valid_id(id) {
            return Err(OverlayError::InvalidId(id.to_string()));
        }

        let path = self.overlay_path(id);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(OverlayError::Io { path, source }),
        };

        let (front_matter, body) = FrontMatter::parse(&raw)
            .map_err(|source| OverlayError::FrontMatter {
                path: path.clone(),
                source,
            })?;

        Ok(Some(Overlay {
            front_matter,
            body: body.to_string(),
        }))
    }
}

#[cfg(test)]
impl OverlayResolver {
    /// Overlay lookups attempted so far
    pub(crate) fn lookups(&self) -> usize {
        self.lookups.load(std::sync::atomic::Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::store_with_ids;

    fn resolver_in(dir: &Path) -> OverlayResolver {
        OverlayResolver::new(dir)
    }

    #[test]
    fn test_missing_overlay_is_not_prepared() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert_eq!(detail.content, CONTENT_NOT_PREPARED);
        assert_eq!(&detail.summary, summary);
    }

    #[test]
    fn test_missing_content_dir_is_not_prepared() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(&dir.path().join("nope")).resolve_detail(summary);
        assert_eq!(detail.content, CONTENT_NOT_PREPARED);
    }

    #[test]
    fn test_overlay_body_is_rendered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Hi\n").unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert!(detail.content.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn test_front_matter_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.md"),
            "---\ntitle: Secret Title\n---\n\nBody paragraph.\n",
        )
        .unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert!(detail.content.contains("<p>Body paragraph.</p>"));
        assert!(!detail.content.contains("Secret Title"));
        // Front-matter never overrides the stored summary
        assert_eq!(detail.summary.title, "Project a");
    }

    #[test]
    fn test_well_formed_front_matter_of_any_shape_renders() {
        let blocks = [
            "draft: yes",
            "draft: sometimes",
            "title:\n  ko: 실시간 파이프라인\n  en: Real-time Pipeline",
            "summary: [a, b]",
            "tags:\n  - aws\n  - gcp\ndate: 2023-03-31",
        ];
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        for block in blocks {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("a.md"), format!("---\n{}\n---\n# Hi\n", block)).unwrap();
            let resolver = resolver_in(dir.path());

            let detail = resolver.resolve_detail(summary);
            assert!(detail.content.contains("<h1>Hi</h1>"), "block {:?}", block);
            assert_eq!(resolver.status("a"), OverlayStatus::Present);
        }
    }

    #[test]
    fn test_fenced_code_is_highlighted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("a.md"),
            "## Pipeline\n\n```python\nimport boto3\n```\n",
        )
        .unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert!(detail.content.contains("<h2>Pipeline</h2>"));
        assert!(detail.content.contains("codehilite"));
    }

    #[test]
    fn test_malformed_front_matter_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "---\ntitle: [broken\n---\n# Hi\n").unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert_eq!(detail.content, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_utf8_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), [0x23, 0x20, 0xff, 0xfe, 0x0a]).unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert_eq!(detail.content, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_unreadable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text
        fs::create_dir(dir.path().join("a.md")).unwrap();
        let store = store_with_ids(&["a"]);
        let summary = store.find_project_summary("a").unwrap();

        let detail = resolver_in(dir.path()).resolve_detail(summary);
        assert_eq!(detail.content, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_hand_built_summary_with_bad_id_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("secret.md"), "# Secret\n").unwrap();
        let store = store_with_ids(&["a"]);
        let mut summary = store.find_project_summary("a").unwrap().clone();
        summary.id = "../secret".to_string();

        let detail = resolver_in(&dir.path().join("projects")).resolve_detail(&summary);
        assert_eq!(detail.content, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_store_summary_is_not_mutated() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Hi\n").unwrap();
        let store = store_with_ids(&["a"]);
        let before = store.find_project_summary("a").unwrap().clone();

        let _ = resolver_in(dir.path()).resolve_detail(store.find_project_summary("a").unwrap());
        assert_eq!(store.find_project_summary("a").unwrap(), &before);
    }

    #[test]
    fn test_status() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("good.md"), "# Good\n").unwrap();
        fs::write(dir.path().join("bad.md"), "---\ntitle: open\n").unwrap();
        let resolver = resolver_in(dir.path());

        assert_eq!(resolver.status("good"), OverlayStatus::Present);
        assert_eq!(resolver.status("bad"), OverlayStatus::Broken);
        assert_eq!(resolver.status("none"), OverlayStatus::Missing);
    }
}
