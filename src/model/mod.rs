//! Page models - what each template receives
//!
//! The assembler is the only place that combines the content store with
//! overlay resolution. It does not cache, filter or sort.

use std::sync::Arc;
use tera::Context;

use crate::content::{OverlayResolver, ProjectDetail};
use crate::store::{ContentStore, PortfolioBundle};
use crate::templates::PageKind;

/// Builds page models from the store and the overlay resolver
pub struct PageAssembler {
    store: Arc<ContentStore>,
    overlays: OverlayResolver,
}

impl PageAssembler {
    pub fn new(store: Arc<ContentStore>, overlays: OverlayResolver) -> Self {
        Self { store, overlays }
    }

    pub fn overlays(&self) -> &OverlayResolver {
        &self.overlays
    }

    /// The home page payload, straight from the store
    pub fn build_home_model(&self) -> &PortfolioBundle {
        self.store.bundle()
    }

    /// A project detail, or `None` when the id is unknown.
    ///
    /// Unknown ids return before any path is built.
    pub fn build_project_model(&self, id: &str) -> Option<ProjectDetail> {
        let summary = self.store.find_project_summary(id)?;
        Some(self.overlays.resolve_detail(summary))
    }

    /// Every project id, in store order
    pub fn list_known_project_ids(&self) -> Vec<&str> {
        self.store.project_ids().collect()
    }
}

/// A page ready to hand to the render adapter
#[derive(Debug, Clone)]
pub enum PageModel<'a> {
    Home(&'a PortfolioBundle),
    Project(ProjectDetail),
    NotFound,
}

impl PageModel<'_> {
    pub fn kind(&self) -> PageKind {
        match self {
            PageModel::Home(_) => PageKind::Index,
            PageModel::Project(_) => PageKind::Project,
            PageModel::NotFound => PageKind::NotFound,
        }
    }

    /// Named values for the template
    pub fn to_context(&self) -> Context {
        let mut context = Context::new();
        match self {
            PageModel::Home(bundle) => {
                context.insert("personal_info", &bundle.personal_info);
                context.insert("about", &bundle.about);
                context.insert("experience", &bundle.experience);
                context.insert("projects", &bundle.projects);
                context.insert("skills", &bundle.skills);
            }
            PageModel::Project(detail) => {
                context.insert("project", detail);
            }
            PageModel::NotFound => {}
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CONTENT_NOT_PREPARED, CONTENT_UNAVAILABLE};
    use crate::store::tests::store_with_ids;
    use std::fs;

    fn assembler(dir: &std::path::Path, ids: &[&str]) -> PageAssembler {
        PageAssembler::new(Arc::new(store_with_ids(ids)), OverlayResolver::new(dir))
    }

    #[test]
    fn test_home_model_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = assembler(dir.path(), &["a", "b"]);
        let first = assembler.build_home_model().clone();
        let second = assembler.build_home_model().clone();
        assert_eq!(first, second);
        assert_eq!(
            PageModel::Home(&first).to_context().into_json(),
            PageModel::Home(&second).to_context().into_json()
        );
    }

    #[test]
    fn test_unknown_project_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = assembler(dir.path(), &["a"]);
        assert!(assembler.build_project_model("missing").is_none());
        assert!(assembler.build_project_model("A").is_none());
    }

    #[test]
    fn test_unknown_project_never_touches_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file as the content directory makes every overlay read
        // fail with a non-NotFound error, so any lookup would be visible
        let content_dir = dir.path().join("projects");
        fs::write(&content_dir, "not a directory").unwrap();
        let assembler = assembler(&content_dir, &["a"]);

        assert!(assembler.build_project_model("ghost").is_none());
        assert!(assembler.build_project_model("../ghost").is_none());
        assert!(assembler.build_project_model("").is_none());
        assert_eq!(assembler.overlays().lookups(), 0);

        // A known id does reach the resolver, and its read fails
        let known = assembler.build_project_model("a").unwrap();
        assert_eq!(known.content, CONTENT_UNAVAILABLE);
        assert_eq!(assembler.overlays().lookups(), 1);
    }

    #[test]
    fn test_project_model_resolves_overlay() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "# Hi\n").unwrap();
        fs::write(dir.path().join("c.md"), ";;;\n{ nope\n;;;\n").unwrap();
        let assembler = assembler(dir.path(), &["a", "b", "c"]);

        let a = assembler.build_project_model("a").unwrap();
        assert!(a.content.contains("<h1>Hi</h1>"));
        assert_eq!(a.id(), "a");

        let b = assembler.build_project_model("b").unwrap();
        assert_eq!(b.content, CONTENT_NOT_PREPARED);

        let c = assembler.build_project_model("c").unwrap();
        assert_eq!(c.content, CONTENT_UNAVAILABLE);
    }

    #[test]
    fn test_list_known_project_ids() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = assembler(dir.path(), &["z", "a", "m"]);
        assert_eq!(assembler.list_known_project_ids(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_home_context_keys() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = assembler(dir.path(), &["a"]);
        let json = PageModel::Home(assembler.build_home_model())
            .to_context()
            .into_json();
        for key in ["personal_info", "about", "experience", "projects", "skills"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["projects"][0]["id"], "a");
    }

    #[test]
    fn test_page_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = assembler(dir.path(), &["a"]);
        let detail = assembler.build_project_model("a").unwrap();
        assert_eq!(PageModel::Home(assembler.build_home_model()).kind(), PageKind::Index);
        assert_eq!(PageModel::Project(detail).kind(), PageKind::Project);
        assert_eq!(PageModel::NotFound.kind(), PageKind::NotFound);
    }
}
