//! Portfolio records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Who the portfolio belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub github: String,
    pub linkedin: String,
    pub location: String,
}

/// One position held, rendered in store order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub position: String,
    /// Free-text range such as "2020.07 - Present"
    pub period: String,
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// Skill category label -> skill labels.
///
/// IndexMap keeps the document order, which is also the display order.
pub type SkillGroups = IndexMap<String, Vec<String>>;

/// Static summary of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Lookup key, also the overlay file stem and the output file stem
    pub id: String,
    pub title: String,
    pub period: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// Everything the home page shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioBundle {
    pub personal_info: PersonalInfo,
    /// Trusted HTML fragment
    pub about: String,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
    #[serde(default)]
    pub skills: SkillGroups,
}
