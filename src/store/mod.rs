//! Content store - the read-only registry of portfolio data
//!
//! The data lives in one YAML document. The default document is compiled
//! into the binary; a site may point `data_file` at its own copy.

mod records;

pub use records::{ExperienceEntry, PersonalInfo, PortfolioBundle, ProjectSummary, SkillGroups};

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Data document embedded in the binary
const BUILTIN_DATA: &str = include_str!("portfolio.yml");

/// Errors raised while building the store. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read data file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse portfolio data: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("duplicate project id: {0}")]
    DuplicateId(String),

    #[error("project id {0:?} is not a URL-safe token")]
    InvalidId(String),
}

/// On-disk shape of the data document
#[derive(Debug, Deserialize)]
struct DataDocument {
    #[serde(default)]
    revision: u32,
    personal_info: PersonalInfo,
    #[serde(default)]
    about: String,
    #[serde(default)]
    experience: Vec<ExperienceEntry>,
    #[serde(default)]
    projects: Vec<ProjectSummary>,
    #[serde(default)]
    skills: SkillGroups,
}

/// Immutable portfolio data plus an id index over the projects
#[derive(Debug, Clone)]
pub struct ContentStore {
    revision: u32,
    bundle: PortfolioBundle,
    index: HashMap<String, usize>,
}

impl ContentStore {
    /// Build the store from the embedded data document
    pub fn builtin() -> Result<Self, StoreError> {
        Self::from_yaml(BUILTIN_DATA)
    }

    /// Build the store from a data document on disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_yaml(&content)?;
        tracing::debug!("Loaded portfolio data from {:?}", path);
        Ok(store)
    }

    /// Parse a data document
    pub fn from_yaml(content: &str) -> Result<Self, StoreError> {
        let doc: DataDocument = serde_yaml::from_str(content)?;
        let bundle = PortfolioBundle {
            personal_info: doc.personal_info,
            about: doc.about,
            experience: doc.experience,
            projects: doc.projects,
            skills: doc.skills,
        };
        Self::from_bundle(doc.revision, bundle)
    }

    /// Wrap an already built bundle, validating project ids
    pub fn from_bundle(revision: u32, bundle: PortfolioBundle) -> Result<Self, StoreError> {
        let mut index = HashMap::with_capacity(bundle.projects.len());
        for (pos, project) in bundle.projects.iter().enumerate() {
            if !is_valid_id(&project.id) {
                return Err(StoreError::InvalidId(project.id.clone()));
            }
            if index.insert(project.id.clone(), pos).is_some() {
                return Err(StoreError::DuplicateId(project.id.clone()));
            }
        }

        Ok(Self {
            revision,
            bundle,
            index,
        })
    }

    /// The full home page payload
    pub fn bundle(&self) -> &PortfolioBundle {
        &self.bundle
    }

    /// Exact, case-sensitive lookup by project id
    pub fn find_project_summary(&self, id: &str) -> Option<&ProjectSummary> {
        self.index.get(id).map(|&pos| &self.bundle.projects[pos])
    }

    /// Project ids in store order
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.bundle.projects.iter().map(|p| p.id.as_str())
    }

    /// Content revision of the data document
    pub fn revision(&self) -> u32 {
        self.revision
    }
}

/// Ids become file names, so only `[A-Za-z0-9_-]` is allowed
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A store with the given project ids and otherwise minimal data
    pub(crate) fn store_with_ids(ids: &[&str]) -> ContentStore {
        let bundle = PortfolioBundle {
            personal_info: PersonalInfo {
                name: "Test User".to_string(),
                title: "Engineer".to_string(),
                company: "Acme".to_string(),
                email: "test@example.com".to_string(),
                github: "https://github.com/test".to_string(),
                linkedin: "https://www.linkedin.com/in/test/".to_string(),
                location: "Nowhere".to_string(),
            },
            about: "<p>About me</p>".to_string(),
            experience: Vec::new(),
            projects: ids
                .iter()
                .map(|id| ProjectSummary {
                    id: id.to_string(),
                    title: format!("Project {}", id),
                    period: "2024.01 - 2024.02".to_string(),
                    description: format!("Description of {}", id),
                    tech_stack: vec!["Rust".to_string()],
                    image: String::new(),
                    highlights: Vec::new(),
                })
                .collect(),
            skills: SkillGroups::new(),
        };
        ContentStore::from_bundle(1, bundle).unwrap()
    }

    #[test]
    fn test_builtin_store_loads() {
        let store = ContentStore::builtin().unwrap();
        assert_eq!(store.revision(), 3);
        assert_eq!(store.bundle().personal_info.name, "SeungHo, Choi");
        assert_eq!(store.bundle().projects.len(), 7);
        assert_eq!(store.bundle().experience.len(), 1);
        assert_eq!(store.bundle().experience[0].achievements.len(), 6);
    }

    #[test]
    fn test_builtin_highlights_keep_commas() {
        let store = ContentStore::builtin().unwrap();
        let project = store
            .find_project_summary("realtime-multicloud-pipeline")
            .unwrap();
        assert_eq!(project.highlights[0], "일 4,000만 건 데이터 처리");
        assert_eq!(project.highlights.len(), 4);
    }

    #[test]
    fn test_skill_groups_keep_document_order() {
        let store = ContentStore::builtin().unwrap();
        let categories: Vec<_> = store.bundle().skills.keys().cloned().collect();
        assert_eq!(categories[0], "specialties");
        assert_eq!(categories[1], "cloud_platforms");
        assert_eq!(categories[3], "data warehouse");
        assert_eq!(categories.last().unwrap(), "ai_ml");
    }

    #[test]
    fn test_every_known_id_is_found() {
        let store = ContentStore::builtin().unwrap();
        let ids: Vec<String> = store.project_ids().map(str::to_string).collect();
        for id in &ids {
            let summary = store.find_project_summary(id).unwrap();
            assert_eq!(&summary.id, id);
        }
    }

    #[test]
    fn test_unknown_ids_are_absent() {
        let store = ContentStore::builtin().unwrap();
        assert!(store.find_project_summary("").is_none());
        assert!(store.find_project_summary("no-such-project").is_none());
        // No case-folding or trimming
        assert!(store.find_project_summary("COST-OPTIMIZATION").is_none());
        assert!(store.find_project_summary(" cost-optimization").is_none());
        assert!(store.find_project_summary("../cost-optimization").is_none());
    }

    #[test]
    fn test_project_ids_in_store_order() {
        let store = store_with_ids(&["b", "a", "c"]);
        let ids: Vec<_> = store.project_ids().collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let yaml = r#"
personal_info:
  name: A
  title: B
  company: C
  email: d@example.com
  github: https://github.com/a
  linkedin: https://linkedin.com/in/a
  location: E
projects:
  - id: same
    title: One
    period: "2024"
    description: first
  - id: same
    title: Two
    period: "2024"
    description: second
"#;
        let err = ContentStore::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(id) if id == "same"));
    }

    #[test]
    fn test_path_like_id_rejected() {
        let yaml = r#"
personal_info:
  name: A
  title: B
  company: C
  email: d@example.com
  github: https://github.com/a
  linkedin: https://linkedin.com/in/a
  location: E
projects:
  - id: ../secrets
    title: One
    period: "2024"
    description: first
"#;
        let err = ContentStore::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, StoreError::InvalidId(_)));
    }

    #[test]
    fn test_optional_fields_default() {
        let yaml = r#"
revision: 7
personal_info:
  name: A
  title: B
  company: C
  email: d@example.com
  github: https://github.com/a
  linkedin: https://linkedin.com/in/a
  location: E
projects:
  - id: bare
    title: Bare
    period: "2024"
    description: no extras
"#;
        let store = ContentStore::from_yaml(yaml).unwrap();
        assert_eq!(store.revision(), 7);
        let bare = store.find_project_summary("bare").unwrap();
        assert!(bare.highlights.is_empty());
        assert!(bare.tech_stack.is_empty());
        assert!(store.bundle().skills.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentStore::load(dir.path().join("missing.yml")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("llm-text-to-sql"));
        assert!(is_valid_id("a_b-1"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("a/b"));
        assert!(!is_valid_id("a.md"));
        assert!(!is_valid_id("프로젝트"));
    }
}
