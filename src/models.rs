//! Core data models used throughout Folio.
//!
//! Content records (projects, experience, skills, journey points) are what the
//! site renders and what the assistant is grounded on. The hero and roles are
//! site copy only. All of them serialize with camelCase keys to match the
//! public JSON API.

use serde::{Deserialize, Deserializer, Serialize};

/// A portfolio project case study.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub category: String,
    pub summary: String,
    pub full_description: String,
    pub tech_stack: Vec<String>,
    pub architecture: Option<String>,
    pub challenges: Option<String>,
    pub features: Vec<String>,
    pub is_published: bool,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Body of `POST /api/projects` and seed-file entries.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewProject {
    pub title: String,
    /// Derived from the title when absent.
    pub slug: Option<String>,
    pub category: String,
    pub summary: String,
    pub full_description: String,
    pub tech_stack: Vec<String>,
    pub architecture: Option<String>,
    pub challenges: Option<String>,
    pub features: Vec<String>,
    pub is_published: bool,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
}

/// Partial update for a project. Absent fields keep their stored value;
/// an empty string clears an optional text field.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub full_description: Option<String>,
    pub tech_stack: Option<Vec<String>>,
    pub architecture: Option<String>,
    pub challenges: Option<String>,
    pub features: Option<Vec<String>>,
    pub is_published: Option<bool>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub screenshot: Option<String>,
}

/// A role held at a company.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub role: String,
    pub duration: String,
    pub achievements: Vec<String>,
    pub tech_used: Vec<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewExperience {
    pub company: String,
    pub role: String,
    pub duration: String,
    pub achievements: Vec<String>,
    pub tech_used: Vec<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperiencePatch {
    pub company: Option<String>,
    pub role: Option<String>,
    pub duration: Option<String>,
    pub achievements: Option<Vec<String>>,
    pub tech_used: Option<Vec<String>>,
    pub order: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub category: String,
    pub summary: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSkill {
    pub name: String,
    pub category: String,
    pub summary: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub summary: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i64>,
}

/// One milestone on the technology journey timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPoint {
    pub id: String,
    pub title: String,
    /// Free text, e.g. `"2019"` or `"2021 - 2022"`.
    pub year: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct NewJourneyPoint {
    pub title: String,
    pub year: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub icon: Option<String>,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct JourneyPointPatch {
    pub title: Option<String>,
    pub year: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i64>,
}

/// The landing-page hero block. There is exactly one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub greeting: String,
    pub headline: String,
    /// Word of `headline` the site renders highlighted.
    pub highlight_word: String,
    pub description: String,
    pub cta_text: String,
    pub cta_link: String,
    pub updated_at: i64,
}

impl Default for Hero {
    fn default() -> Self {
        Self {
            greeting: "System Online // V.3.0".to_string(),
            headline: "Engineering the future with systems that speak for themselves.".to_string(),
            highlight_word: "systems".to_string(),
            description: "Senior Full-Stack Engineer specializing in scalable backend \
                          architecture, real-time systems, and experimental interfaces."
                .to_string(),
            cta_text: "Explore Projects".to_string(),
            cta_link: "#projects".to_string(),
            updated_at: 0,
        }
    }
}

/// Partial update for the hero. Absent or blank fields keep their value.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroPatch {
    pub greeting: Option<String>,
    pub headline: Option<String>,
    pub highlight_word: Option<String>,
    pub description: Option<String>,
    pub cta_text: Option<String>,
    pub cta_link: Option<String>,
}

/// Icon names the site knows how to render for a role card.
pub const ROLE_ICONS: &[&str] = &[
    "Server", "Database", "Globe", "Shield", "Wrench", "Briefcase", "Code", "Layers", "Zap",
    "Lock",
];

pub const DEFAULT_ROLE_ICON: &str = "Briefcase";

/// A "what I do" card shown beside the hero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: String,
    pub order: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRole {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: Option<String>,
    /// Appended after the existing roles when absent.
    pub order: Option<i64>,
    pub is_active: bool,
}

impl Default for NewRole {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            description: String::new(),
            icon: None,
            order: None,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RolePatch {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order: Option<i64>,
    pub is_active: Option<bool>,
}

/// The fixed schema the README extraction pipeline produces.
///
/// Always serializes to exactly these seven keys. Keys that are missing or
/// `null` in a model response default to empty values.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectFields {
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(deserialize_with = "null_as_default")]
    pub full_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tech_stack: Vec<String>,
    pub architecture: Option<String>,
    pub challenges: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Everything the assistant knows, rebuilt on every request.
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeContext {
    pub projects: Vec<Project>,
    pub experience: Vec<Experience>,
    pub skills: Vec<Skill>,
    pub journey: Vec<JourneyPoint>,
    /// Natural-language rendering of the four collections above.
    pub summary: String,
}

/// A logged visitor interaction (`visit`, `ai_chat`, `modal_open`, ...).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: String,
    pub metadata: serde_json::Value,
    pub ip_hash: Option<String>,
    pub created_at: i64,
}

/// Normalizes an optional text field: blank strings become `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
