//! Project detail model

use serde::Serialize;

use crate::store::ProjectSummary;

/// A project summary extended with its rendered overlay body.
///
/// Built fresh for every lookup from a copy of the stored summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub summary: ProjectSummary,

    /// Overlay HTML or one of the placeholders
    pub content: String,
}

impl ProjectDetail {
    pub fn new(summary: ProjectSummary, content: impl Into<String>) -> Self {
        Self {
            summary,
            content: content.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }
}
