//! Bulk content loading from a TOML seed file.
//!
//! ```toml
//! [[projects]]
//! title = "Chat Engine"
//! category = "Backend"
//! techStack = ["Rust", "Redis"]
//! isPublished = true
//!
//! [[experience]]
//! company = "Acme"
//! role = "Senior Engineer"
//! duration = "2021 - Present"
//!
//! [[skills]]
//! name = "Rust"
//! category = "Backend"
//!
//! [[journey]]
//! title = "Started with Rust"
//! year = "2019"
//! type = "backend"
//!
//! [[roles]]
//! title = "Backend Engineering"
//! subtitle = "APIs and data"
//! description = "Services that stay up."
//! icon = "Server"
//!
//! [hero]
//! headline = "Building systems that speak for themselves."
//! ```
//!
//! Seeding replaces every existing content record, the hero included.
//! Analytics are kept.

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::path::Path;

use crate::content;
use crate::models::{HeroPatch, NewExperience, NewJourneyPoint, NewProject, NewRole, NewSkill};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SeedFile {
    pub projects: Vec<NewProject>,
    pub experience: Vec<NewExperience>,
    pub skills: Vec<NewSkill>,
    pub journey: Vec<NewJourneyPoint>,
    pub roles: Vec<NewRole>,
    /// Overrides applied on top of the default hero.
    pub hero: Option<HeroPatch>,
}

/// Number of records inserted per collection.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub projects: usize,
    pub experience: usize,
    pub skills: usize,
    pub journey: usize,
    pub roles: usize,
}

pub fn load_seed(path: &Path) -> Result<SeedFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    parse_seed(&content).with_context(|| format!("Failed to parse seed file: {}", path.display()))
}

pub fn parse_seed(content: &str) -> Result<SeedFile> {
    Ok(toml::from_str(content)?)
}

/// Clears all content and inserts the seed records in file order.
pub async fn apply_seed(pool: &SqlitePool, seed: SeedFile) -> Result<SeedReport> {
    content::clear_all(pool).await?;

    let mut report = SeedReport::default();
    for project in seed.projects {
        let title = project.title.clone();
        content::create_project(pool, project)
            .await
            .with_context(|| format!("Failed to seed project '{}'", title))?;
        report.projects += 1;
    }
    for entry in seed.experience {
        content::create_experience(pool, entry).await?;
        report.experience += 1;
    }
    for skill in seed.skills {
        content::create_skill(pool, skill).await?;
        report.skills += 1;
    }
    for point in seed.journey {
        content::create_journey_point(pool, point).await?;
        report.journey += 1;
    }
    for role in seed.roles {
        let title = role.title.clone();
        content::create_role(pool, role)
            .await
            .with_context(|| format!("Failed to seed role '{}'", title))?;
        report.roles += 1;
    }
    if let Some(hero) = seed.hero {
        content::update_hero(pool, hero).await?;
    }

    tracing::info!(
        projects = report.projects,
        experience = report.experience,
        skills = report.skills,
        journey = report.journey,
        roles = report.roles,
        "seed applied"
    );
    Ok(report)
}
