//! Knowledge base assembly.
//!
//! Turns the content store into the natural-language context the assistant
//! is grounded on. The text is written for a language model to read, not for
//! machines to parse, so it uses light Markdown headings and `**Label**:`
//! lines.
//!
//! [`render_summary`] is a pure function of the four collections; the
//! async wrappers only add the store reads. Nothing is cached: every AI
//! request rebuilds the context from scratch.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::ProfileConfig;
use crate::content;
use crate::models::{Experience, JourneyPoint, KnowledgeContext, Project, Skill};

/// Number of journey entries included in the summary.
pub const JOURNEY_LIMIT: usize = 8;

/// Reads all published projects and all ordered experience, skills, and
/// journey points, and renders them into a [`KnowledgeContext`].
///
/// Store failures propagate; there is no retry.
pub async fn build_knowledge_base(
    pool: &SqlitePool,
    profile: &ProfileConfig,
) -> Result<KnowledgeContext> {
    let projects = content::list_published_projects(pool).await?;
    let experience = content::list_experience(pool).await?;
    let skills = content::list_skills(pool).await?;
    let journey = content::list_journey(pool).await?;

    let summary = render_summary(profile, &projects, &experience, &skills, &journey);

    Ok(KnowledgeContext {
        projects,
        experience,
        skills,
        journey,
        summary,
    })
}

/// Renders the focused context for one project, or `""` if no project has
/// this slug. Unpublished projects are included.
pub async fn get_project_context(pool: &SqlitePool, slug: &str) -> Result<String> {
    Ok(content::find_project_by_slug(pool, slug)
        .await?
        .map(|p| render_project_context(&p))
        .unwrap_or_default())
}

pub fn render_project_context(project: &Project) -> String {
    let mut out = String::new();
    out.push_str(&format!("Project: {}\n", project.title));
    out.push_str(&format!("Category: {}\n", project.category));
    out.push_str(&format!("Summary: {}\n", project.summary));
    out.push_str(&format!("Tech Stack: {}\n", project.tech_stack.join(", ")));

    if let Some(arch) = present(project.architecture.as_deref()) {
        out.push_str(&format!("\nArchitecture:\n{}\n", arch));
    }
    if let Some(challenges) = present(project.challenges.as_deref()) {
        out.push_str(&format!("\nEngineering Challenges:\n{}\n", challenges));
    }
    if let Some(desc) = present(Some(project.full_description.as_str())) {
        out.push_str(&format!("\nFull Description:\n{}\n", desc));
    }

    out.trim().to_string()
}

/// Renders the full knowledge-base text.
///
/// Sections, in order: profile header, current experience, skills grouped by
/// category, project details, the first [`JOURNEY_LIMIT`] journey entries, and
/// the configured capabilities.
pub fn render_summary(
    profile: &ProfileConfig,
    projects: &[Project],
    experience: &[Experience],
    skills: &[Skill],
    journey: &[JourneyPoint],
) -> String {
    let experience_line = experience
        .iter()
        .map(|e| format!("{} at {} ({})", e.role, e.company, e.duration))
        .collect::<Vec<_>>()
        .join("; ");

    let skills_block = group_skills(skills)
        .iter()
        .map(|(category, names)| format!("**{}**: {}", category, names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let projects_block = projects
        .iter()
        .map(render_project_details)
        .collect::<Vec<_>>()
        .join("\n");

    let journey_block = journey
        .iter()
        .take(JOURNEY_LIMIT)
        .map(|j| {
            if j.description.trim().is_empty() {
                format!("**{}**: {}", j.year, j.title)
            } else {
                format!("**{}**: {} - {}", j.year, j.title, j.description)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    let capabilities_block = profile
        .capabilities
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "# Professional Profile\n\n\
         ## Personal Information\n{}\n\n\
         ## Current Experience\n{}\n\n\
         ## Technical Skills & Proficiencies\n{}\n\n\
         ## Portfolio Projects (Detailed)\n{}\n\n\
         ## Technology Journey\n{}\n\n\
         ## Professional Capabilities\n{}",
        profile.headline,
        experience_line,
        skills_block,
        projects_block,
        journey_block,
        capabilities_block
    )
    .trim()
    .to_string()
}

fn render_project_details(p: &Project) -> String {
    let mut details = format!("\n### {}\n", p.title);
    details.push_str(&format!("**Category**: {}\n", p.category));
    details.push_str(&format!("**Summary**: {}\n", p.summary));
    details.push_str(&format!("**Tech Stack**: {}\n", p.tech_stack.join(", ")));

    if let Some(desc) = present(Some(p.full_description.as_str())) {
        details.push_str(&format!("**Description**: {}\n", desc));
    }
    if let Some(arch) = present(p.architecture.as_deref()) {
        details.push_str(&format!("**Architecture**: {}\n", arch));
    }
    if let Some(challenges) = present(p.challenges.as_deref()) {
        details.push_str(&format!("**Challenges**: {}\n", challenges));
    }
    if !p.features.is_empty() {
        details.push_str(&format!("**Key Features**: {}\n", p.features.join(", ")));
    }
    if let Some(url) = present(p.live_url.as_deref()) {
        details.push_str(&format!("**Live URL**: {}\n", url));
    }
    if let Some(url) = present(p.github_url.as_deref()) {
        details.push_str(&format!("**GitHub**: {}\n", url));
    }
    details
}

/// Groups skill names by category, categories in order of first appearance.
fn group_skills(skills: &[Skill]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for skill in skills {
        match groups.iter_mut().find(|(cat, _)| *cat == skill.category) {
            Some((_, names)) => names.push(skill.name.as_str()),
            None => groups.push((skill.category.as_str(), vec![skill.name.as_str()])),
        }
    }
    groups
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
