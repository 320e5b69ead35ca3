//! Content store queries.
//!
//! Single-record reads and writes for projects, experience, skills, journey
//! points, roles and the hero. Used by the HTTP handlers, the seed loader, the webhook
//! sync, and the knowledge base builder.

use anyhow::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{
    non_blank, Experience, ExperiencePatch, Hero, HeroPatch, JourneyPoint, JourneyPointPatch,
    NewExperience, NewJourneyPoint, NewProject, NewRole, NewSkill, Project, ProjectFields,
    ProjectPatch, Role, RolePatch, Skill, SkillPatch, DEFAULT_ROLE_ICON, ROLE_ICONS,
};

/// Lower-cases `name` and collapses every run of characters outside
/// `[a-z0-9]` into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for c in name.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// True when `err` is a SQLite unique-constraint violation (duplicate slug).
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}

fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

fn to_json_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

fn from_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

// ============ Projects ============

const PROJECT_COLUMNS: &str = "id, slug, title, category, summary, full_description, tech_stack, \
     architecture, challenges, features, is_published, live_url, github_url, screenshot, \
     created_at, updated_at";

fn project_from_row(row: &SqliteRow) -> Project {
    let tech_stack: String = row.get("tech_stack");
    let features: String = row.get("features");
    let is_published: i64 = row.get("is_published");
    Project {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        category: row.get("category"),
        summary: row.get("summary"),
        full_description: row.get("full_description"),
        tech_stack: from_json_list(&tech_stack),
        architecture: row.get("architecture"),
        challenges: row.get("challenges"),
        features: from_json_list(&features),
        is_published: is_published != 0,
        live_url: row.get("live_url"),
        github_url: row.get("github_url"),
        screenshot: row.get("screenshot"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Published projects in insertion order.
pub async fn list_published_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM projects WHERE is_published = 1 ORDER BY created_at ASC, rowid ASC",
        PROJECT_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(project_from_row).collect())
}

pub async fn find_project_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Project>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM projects WHERE slug = ?",
        PROJECT_COLUMNS
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(project_from_row))
}

pub async fn find_project(pool: &SqlitePool, id: &str) -> Result<Option<Project>> {
    let row = sqlx::query(&format!("SELECT {} FROM projects WHERE id = ?", PROJECT_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(project_from_row))
}

pub async fn count_projects(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Inserts a project. Fails with a unique violation if the slug is taken.
pub async fn create_project(pool: &SqlitePool, input: NewProject) -> Result<Project> {
    if input.title.trim().is_empty() {
        anyhow::bail!("title must not be empty");
    }
    let slug = match input.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => slugify(s),
        _ => slugify(&input.title),
    };
    if slug.is_empty() {
        anyhow::bail!("slug must contain at least one letter or digit");
    }

    let now = now_ts();
    let project = Project {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        slug,
        category: input.category,
        summary: input.summary,
        full_description: input.full_description,
        tech_stack: input.tech_stack,
        architecture: non_blank(input.architecture),
        challenges: non_blank(input.challenges),
        features: input.features,
        is_published: input.is_published,
        live_url: non_blank(input.live_url),
        github_url: non_blank(input.github_url),
        screenshot: non_blank(input.screenshot),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO projects (id, slug, title, category, summary, full_description, tech_stack,
            architecture, challenges, features, is_published, live_url, github_url, screenshot,
            created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&project.id)
    .bind(&project.slug)
    .bind(&project.title)
    .bind(&project.category)
    .bind(&project.summary)
    .bind(&project.full_description)
    .bind(to_json_list(&project.tech_stack))
    .bind(&project.architecture)
    .bind(&project.challenges)
    .bind(to_json_list(&project.features))
    .bind(project.is_published as i64)
    .bind(&project.live_url)
    .bind(&project.github_url)
    .bind(&project.screenshot)
    .bind(project.created_at)
    .bind(project.updated_at)
    .execute(pool)
    .await?;

    Ok(project)
}

/// Applies a partial update. Returns `None` if no project has this id.
pub async fn update_project(
    pool: &SqlitePool,
    id: &str,
    patch: ProjectPatch,
) -> Result<Option<Project>> {
    let Some(mut project) = find_project(pool, id).await? else {
        return Ok(None);
    };

    if let Some(title) = patch.title.filter(|t| !t.trim().is_empty()) {
        project.title = title;
    }
    if let Some(category) = patch.category {
        project.category = category;
    }
    if let Some(summary) = patch.summary {
        project.summary = summary;
    }
    if let Some(desc) = patch.full_description {
        project.full_description = desc;
    }
    if let Some(stack) = patch.tech_stack {
        project.tech_stack = stack;
    }
    if let Some(features) = patch.features {
        project.features = features;
    }
    if let Some(published) = patch.is_published {
        project.is_published = published;
    }
    if patch.architecture.is_some() {
        project.architecture = non_blank(patch.architecture);
    }
    if patch.challenges.is_some() {
        project.challenges = non_blank(patch.challenges);
    }
    if patch.live_url.is_some() {
        project.live_url = non_blank(patch.live_url);
    }
    if patch.github_url.is_some() {
        project.github_url = non_blank(patch.github_url);
    }
    if patch.screenshot.is_some() {
        project.screenshot = non_blank(patch.screenshot);
    }
    project.updated_at = now_ts();

    sqlx::query(
        r#"
        UPDATE projects SET title = ?, category = ?, summary = ?, full_description = ?,
            tech_stack = ?, architecture = ?, challenges = ?, features = ?, is_published = ?,
            live_url = ?, github_url = ?, screenshot = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&project.title)
    .bind(&project.category)
    .bind(&project.summary)
    .bind(&project.full_description)
    .bind(to_json_list(&project.tech_stack))
    .bind(&project.architecture)
    .bind(&project.challenges)
    .bind(to_json_list(&project.features))
    .bind(project.is_published as i64)
    .bind(&project.live_url)
    .bind(&project.github_url)
    .bind(&project.screenshot)
    .bind(project.updated_at)
    .bind(&project.id)
    .execute(pool)
    .await?;

    Ok(Some(project))
}

pub async fn delete_project(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Creates or updates the project keyed by `slug` from extracted fields and
/// publishes it. Fields the extraction schema does not cover (links,
/// screenshot, features) are left untouched on update, except `github_url`
/// which is replaced when `github_url` is given.
pub async fn upsert_project_by_slug(
    pool: &SqlitePool,
    slug: &str,
    fields: &ProjectFields,
    github_url: Option<&str>,
) -> Result<Project> {
    let now = now_ts();
    sqlx::query(
        r#"
        INSERT INTO projects (id, slug, title, category, summary, full_description, tech_stack,
            architecture, challenges, features, is_published, github_url, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, '[]', 1, ?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET
            title = excluded.title,
            category = excluded.category,
            summary = excluded.summary,
            full_description = excluded.full_description,
            tech_stack = excluded.tech_stack,
            architecture = excluded.architecture,
            challenges = excluded.challenges,
            is_published = 1,
            github_url = COALESCE(excluded.github_url, projects.github_url),
            updated_at = excluded.updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(slug)
    .bind(&fields.title)
    .bind(&fields.category)
    .bind(&fields.summary)
    .bind(&fields.full_description)
    .bind(to_json_list(&fields.tech_stack))
    .bind(non_blank(fields.architecture.clone()))
    .bind(non_blank(fields.challenges.clone()))
    .bind(github_url)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_project_by_slug(pool, slug)
        .await?
        .ok_or_else(|| anyhow::anyhow!("project {} missing after upsert", slug))
}

// ============ Experience ============

fn experience_from_row(row: &SqliteRow) -> Experience {
    let achievements: String = row.get("achievements");
    let tech_used: String = row.get("tech_used");
    Experience {
        id: row.get("id"),
        company: row.get("company"),
        role: row.get("role"),
        duration: row.get("duration"),
        achievements: from_json_list(&achievements),
        tech_used: from_json_list(&tech_used),
        order: row.get("sort_order"),
    }
}

pub async fn list_experience(pool: &SqlitePool) -> Result<Vec<Experience>> {
    let rows = sqlx::query(
        "SELECT id, company, role, duration, achievements, tech_used, sort_order \
         FROM experience ORDER BY sort_order ASC, created_at ASC, rowid ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(experience_from_row).collect())
}

pub async fn find_experience(pool: &SqlitePool, id: &str) -> Result<Option<Experience>> {
    let row = sqlx::query(
        "SELECT id, company, role, duration, achievements, tech_used, sort_order \
         FROM experience WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(experience_from_row))
}

pub async fn create_experience(pool: &SqlitePool, input: NewExperience) -> Result<Experience> {
    if input.company.trim().is_empty() || input.role.trim().is_empty() {
        anyhow::bail!("company and role must not be empty");
    }
    let now = now_ts();
    let exp = Experience {
        id: Uuid::new_v4().to_string(),
        company: input.company,
        role: input.role,
        duration: input.duration,
        achievements: input.achievements,
        tech_used: input.tech_used,
        order: input.order,
    };
    sqlx::query(
        "INSERT INTO experience (id, company, role, duration, achievements, tech_used, sort_order, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&exp.id)
    .bind(&exp.company)
    .bind(&exp.role)
    .bind(&exp.duration)
    .bind(to_json_list(&exp.achievements))
    .bind(to_json_list(&exp.tech_used))
    .bind(exp.order)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(exp)
}

pub async fn update_experience(
    pool: &SqlitePool,
    id: &str,
    patch: ExperiencePatch,
) -> Result<Option<Experience>> {
    let Some(mut exp) = find_experience(pool, id).await? else {
        return Ok(None);
    };
    if let Some(v) = patch.company {
        exp.company = v;
    }
    if let Some(v) = patch.role {
        exp.role = v;
    }
    if let Some(v) = patch.duration {
        exp.duration = v;
    }
    if let Some(v) = patch.achievements {
        exp.achievements = v;
    }
    if let Some(v) = patch.tech_used {
        exp.tech_used = v;
    }
    if let Some(v) = patch.order {
        exp.order = v;
    }
    sqlx::query(
        "UPDATE experience SET company = ?, role = ?, duration = ?, achievements = ?, \
         tech_used = ?, sort_order = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&exp.company)
    .bind(&exp.role)
    .bind(&exp.duration)
    .bind(to_json_list(&exp.achievements))
    .bind(to_json_list(&exp.tech_used))
    .bind(exp.order)
    .bind(now_ts())
    .bind(&exp.id)
    .execute(pool)
    .await?;
    Ok(Some(exp))
}

pub async fn delete_experience(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM experience WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============ Skills ============

fn skill_from_row(row: &SqliteRow) -> Skill {
    Skill {
        id: row.get("id"),
        name: row.get("name"),
        category: row.get("category"),
        summary: row.get("summary"),
        icon: row.get("icon"),
        order: row.get("sort_order"),
    }
}

pub async fn list_skills(pool: &SqlitePool) -> Result<Vec<Skill>> {
    let rows = sqlx::query(
        "SELECT id, name, category, summary, icon, sort_order FROM skills \
         ORDER BY sort_order ASC, name ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(skill_from_row).collect())
}

pub async fn find_skill(pool: &SqlitePool, id: &str) -> Result<Option<Skill>> {
    let row = sqlx::query(
        "SELECT id, name, category, summary, icon, sort_order FROM skills WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(skill_from_row))
}

pub async fn create_skill(pool: &SqlitePool, input: NewSkill) -> Result<Skill> {
    if input.name.trim().is_empty() || input.category.trim().is_empty() {
        anyhow::bail!("name and category must not be empty");
    }
    let now = now_ts();
    let skill = Skill {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        category: input.category,
        summary: input.summary,
        icon: non_blank(input.icon),
        order: input.order,
    };
    sqlx::query(
        "INSERT INTO skills (id, name, category, summary, icon, sort_order, created_at, \
         updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&skill.id)
    .bind(&skill.name)
    .bind(&skill.category)
    .bind(&skill.summary)
    .bind(&skill.icon)
    .bind(skill.order)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(skill)
}

pub async fn update_skill(pool: &SqlitePool, id: &str, patch: SkillPatch) -> Result<Option<Skill>> {
    let Some(mut skill) = find_skill(pool, id).await? else {
        return Ok(None);
    };
    if let Some(v) = patch.name {
        skill.name = v;
    }
    if let Some(v) = patch.category {
        skill.category = v;
    }
    if let Some(v) = patch.summary {
        skill.summary = v;
    }
    if patch.icon.is_some() {
        skill.icon = non_blank(patch.icon);
    }
    if let Some(v) = patch.order {
        skill.order = v;
    }
    sqlx::query(
        "UPDATE skills SET name = ?, category = ?, summary = ?, icon = ?, sort_order = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&skill.name)
    .bind(&skill.category)
    .bind(&skill.summary)
    .bind(&skill.icon)
    .bind(skill.order)
    .bind(now_ts())
    .bind(&skill.id)
    .execute(pool)
    .await?;
    Ok(Some(skill))
}

pub async fn delete_skill(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM skills WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============ Journey ============

fn journey_from_row(row: &SqliteRow) -> JourneyPoint {
    JourneyPoint {
        id: row.get("id"),
        title: row.get("title"),
        year: row.get("year"),
        description: row.get("description"),
        kind: row.get("kind"),
        icon: row.get("icon"),
        order: row.get("sort_order"),
    }
}

/// Journey points by `order`, newest year first among equal orders.
pub async fn list_journey(pool: &SqlitePool) -> Result<Vec<JourneyPoint>> {
    let rows = sqlx::query(
        "SELECT id, title, year, description, kind, icon, sort_order FROM journey_points \
         ORDER BY sort_order ASC, year DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(journey_from_row).collect())
}

pub async fn find_journey_point(pool: &SqlitePool, id: &str) -> Result<Option<JourneyPoint>> {
    let row = sqlx::query(
        "SELECT id, title, year, description, kind, icon, sort_order FROM journey_points \
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().map(journey_from_row))
}

pub async fn create_journey_point(
    pool: &SqlitePool,
    input: NewJourneyPoint,
) -> Result<JourneyPoint> {
    if input.title.trim().is_empty() || input.year.trim().is_empty() {
        anyhow::bail!("title and year must not be empty");
    }
    let now = now_ts();
    let point = JourneyPoint {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        year: input.year,
        description: input.description,
        kind: input.kind,
        icon: non_blank(input.icon),
        order: input.order,
    };
    sqlx::query(
        "INSERT INTO journey_points (id, title, year, description, kind, icon, sort_order, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&point.id)
    .bind(&point.title)
    .bind(&point.year)
    .bind(&point.description)
    .bind(&point.kind)
    .bind(&point.icon)
    .bind(point.order)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(point)
}

pub async fn update_journey_point(
    pool: &SqlitePool,
    id: &str,
    patch: JourneyPointPatch,
) -> Result<Option<JourneyPoint>> {
    let Some(mut point) = find_journey_point(pool, id).await? else {
        return Ok(None);
    };
    if let Some(v) = patch.title {
        point.title = v;
    }
    if let Some(v) = patch.year {
        point.year = v;
    }
    if let Some(v) = patch.description {
        point.description = v;
    }
    if let Some(v) = patch.kind {
        point.kind = v;
    }
    if patch.icon.is_some() {
        point.icon = non_blank(patch.icon);
    }
    if let Some(v) = patch.order {
        point.order = v;
    }
    sqlx::query(
        "UPDATE journey_points SET title = ?, year = ?, description = ?, kind = ?, icon = ?, \
         sort_order = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&point.title)
    .bind(&point.year)
    .bind(&point.description)
    .bind(&point.kind)
    .bind(&point.icon)
    .bind(point.order)
    .bind(now_ts())
    .bind(&point.id)
    .execute(pool)
    .await?;
    Ok(Some(point))
}

pub async fn delete_journey_point(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM journey_points WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============ Hero ============

const HERO_COLUMNS: &str =
    "greeting, headline, highlight_word, description, cta_text, cta_link, updated_at";

fn hero_from_row(row: &SqliteRow) -> Hero {
    Hero {
        greeting: row.get("greeting"),
        headline: row.get("headline"),
        highlight_word: row.get("highlight_word"),
        description: row.get("description"),
        cta_text: row.get("cta_text"),
        cta_link: row.get("cta_link"),
        updated_at: row.get("updated_at"),
    }
}

async fn save_hero(pool: &SqlitePool, hero: &Hero) -> Result<()> {
    sqlx::query(&format!(
        "INSERT INTO hero (id, {}) VALUES (1, ?, ?, ?, ?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET greeting = excluded.greeting, \
         headline = excluded.headline, highlight_word = excluded.highlight_word, \
         description = excluded.description, cta_text = excluded.cta_text, \
         cta_link = excluded.cta_link, updated_at = excluded.updated_at",
        HERO_COLUMNS
    ))
    .bind(&hero.greeting)
    .bind(&hero.headline)
    .bind(&hero.highlight_word)
    .bind(&hero.description)
    .bind(&hero.cta_text)
    .bind(&hero.cta_link)
    .bind(hero.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// The stored hero. Stores and returns the default one on first read.
pub async fn get_hero(pool: &SqlitePool) -> Result<Hero> {
    let row = sqlx::query(&format!("SELECT {} FROM hero WHERE id = 1", HERO_COLUMNS))
        .fetch_optional(pool)
        .await?;
    if let Some(row) = row {
        return Ok(hero_from_row(&row));
    }
    let hero = Hero {
        updated_at: now_ts(),
        ..Hero::default()
    };
    save_hero(pool, &hero).await?;
    Ok(hero)
}

/// Applies every non-blank field of `patch` to the hero.
pub async fn update_hero(pool: &SqlitePool, patch: HeroPatch) -> Result<Hero> {
    let mut hero = get_hero(pool).await?;
    let fields = [
        (patch.greeting, &mut hero.greeting),
        (patch.headline, &mut hero.headline),
        (patch.highlight_word, &mut hero.highlight_word),
        (patch.description, &mut hero.description),
        (patch.cta_text, &mut hero.cta_text),
        (patch.cta_link, &mut hero.cta_link),
    ];
    for (value, slot) in fields {
        if let Some(v) = non_blank(value) {
            *slot = v;
        }
    }
    hero.updated_at = now_ts();
    save_hero(pool, &hero).await?;
    Ok(hero)
}

// ============ Roles ============

pub fn is_role_icon(icon: &str) -> bool {
    ROLE_ICONS.contains(&icon)
}

fn role_from_row(row: &SqliteRow) -> Role {
    let is_active: i64 = row.get("is_active");
    Role {
        id: row.get("id"),
        title: row.get("title"),
        subtitle: row.get("subtitle"),
        description: row.get("description"),
        icon: row.get("icon"),
        order: row.get("sort_order"),
        is_active: is_active != 0,
    }
}

const ROLE_COLUMNS: &str = "id, title, subtitle, description, icon, sort_order, is_active";

/// Roles by `order`. With `active_only`, hidden roles are left out.
pub async fn list_roles(pool: &SqlitePool, active_only: bool) -> Result<Vec<Role>> {
    let filter = if active_only { "WHERE is_active = 1 " } else { "" };
    let rows = sqlx::query(&format!(
        "SELECT {} FROM roles {}ORDER BY sort_order ASC, created_at ASC, rowid ASC",
        ROLE_COLUMNS, filter
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().map(role_from_row).collect())
}

pub async fn find_role(pool: &SqlitePool, id: &str) -> Result<Option<Role>> {
    let row = sqlx::query(&format!("SELECT {} FROM roles WHERE id = ?", ROLE_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.as_ref().map(role_from_row))
}

pub async fn create_role(pool: &SqlitePool, input: NewRole) -> Result<Role> {
    if input.title.trim().is_empty()
        || input.subtitle.trim().is_empty()
        || input.description.trim().is_empty()
    {
        anyhow::bail!("title, subtitle and description must not be empty");
    }
    let icon = non_blank(input.icon).unwrap_or_else(|| DEFAULT_ROLE_ICON.to_string());
    if !is_role_icon(&icon) {
        anyhow::bail!("unknown role icon: {}", icon);
    }
    let order = match input.order {
        Some(order) => order,
        None => {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM roles")
                .fetch_one(pool)
                .await?
        }
    };

    let now = now_ts();
    let role = Role {
        id: Uuid::new_v4().to_string(),
        title: input.title,
        subtitle: input.subtitle,
        description: input.description,
        icon,
        order,
        is_active: input.is_active,
    };
    sqlx::query(
        "INSERT INTO roles (id, title, subtitle, description, icon, sort_order, is_active, \
         created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&role.id)
    .bind(&role.title)
    .bind(&role.subtitle)
    .bind(&role.description)
    .bind(&role.icon)
    .bind(role.order)
    .bind(role.is_active as i64)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(role)
}

pub async fn update_role(pool: &SqlitePool, id: &str, patch: RolePatch) -> Result<Option<Role>> {
    let Some(mut role) = find_role(pool, id).await? else {
        return Ok(None);
    };
    if let Some(v) = patch.title {
        role.title = v;
    }
    if let Some(v) = patch.subtitle {
        role.subtitle = v;
    }
    if let Some(v) = patch.description {
        role.description = v;
    }
    if let Some(v) = patch.icon {
        if !is_role_icon(&v) {
            anyhow::bail!("unknown role icon: {}", v);
        }
        role.icon = v;
    }
    if let Some(v) = patch.order {
        role.order = v;
    }
    if let Some(v) = patch.is_active {
        role.is_active = v;
    }
    sqlx::query(
        "UPDATE roles SET title = ?, subtitle = ?, description = ?, icon = ?, sort_order = ?, \
         is_active = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&role.title)
    .bind(&role.subtitle)
    .bind(&role.description)
    .bind(&role.icon)
    .bind(role.order)
    .bind(role.is_active as i64)
    .bind(now_ts())
    .bind(&role.id)
    .execute(pool)
    .await?;
    Ok(Some(role))
}

pub async fn delete_role(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes every content record. Used by the seed loader.
pub async fn clear_all(pool: &SqlitePool) -> Result<()> {
    for table in ["projects", "experience", "skills", "journey_points", "roles", "hero"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(pool)
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    fn new_project(title: &str, published: bool) -> NewProject {
        NewProject {
            title: title.to_string(),
            category: "Backend".to_string(),
            summary: "A summary".to_string(),
            tech_stack: vec!["Rust".to_string(), "SQLite".to_string()],
            is_published: published,
            ..Default::default()
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("portfolio-api"), "portfolio-api");
        assert_eq!(slugify("My_Cool.Repo"), "my-cool-repo");
        assert_eq!(slugify("Task Manager  Pro!"), "task-manager-pro");
        assert_eq!(slugify("--x--"), "x");
        assert_eq!(slugify("!!!"), "");
    }

    #[tokio::test]
    async fn test_create_and_find_project() {
        let pool = connect_in_memory().await.unwrap();
        let created = create_project(&pool, new_project("Chat Engine", true))
            .await
            .unwrap();
        assert_eq!(created.slug, "chat-engine");

        let found = find_project_by_slug(&pool, "chat-engine")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
        assert_eq!(found.tech_stack, vec!["Rust", "SQLite"]);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_unique_violation() {
        let pool = connect_in_memory().await.unwrap();
        create_project(&pool, new_project("Chat Engine", true))
            .await
            .unwrap();
        let err = create_project(&pool, new_project("Chat Engine", false))
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err), "{}", err);
    }

    #[tokio::test]
    async fn test_list_published_only() {
        let pool = connect_in_memory().await.unwrap();
        create_project(&pool, new_project("Public", true)).await.unwrap();
        create_project(&pool, new_project("Draft", false)).await.unwrap();

        let published = list_published_projects(&pool).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, "Public");
        assert_eq!(count_projects(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_update_project_partial() {
        let pool = connect_in_memory().await.unwrap();
        let mut input = new_project("Chat Engine", false);
        input.architecture = Some("Event sourced".to_string());
        let created = create_project(&pool, input).await.unwrap();

        let patch = ProjectPatch {
            is_published: Some(true),
            architecture: Some(String::new()),
            title: Some("  ".to_string()),
            ..Default::default()
        };
        let updated = update_project(&pool, &created.id, patch)
            .await
            .unwrap()
            .unwrap();
        assert!(updated.is_published);
        assert_eq!(updated.architecture, None);
        assert_eq!(updated.title, "Chat Engine");
        assert_eq!(updated.summary, "A summary");

        let missing = update_project(&pool, "nope", ProjectPatch::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_upsert_by_slug_preserves_links() {
        let pool = connect_in_memory().await.unwrap();
        let mut input = new_project("Portfolio API", false);
        input.live_url = Some("https://example.com".to_string());
        create_project(&pool, input).await.unwrap();

        let fields = ProjectFields {
            title: "Portfolio API".to_string(),
            summary: "Extracted".to_string(),
            tech_stack: vec!["Node.js".to_string()],
            category: "Backend".to_string(),
            ..Default::default()
        };
        let project = upsert_project_by_slug(&pool, "portfolio-api", &fields, None)
            .await
            .unwrap();
        assert!(project.is_published);
        assert_eq!(project.summary, "Extracted");
        assert_eq!(project.live_url.as_deref(), Some("https://example.com"));
        assert_eq!(count_projects(&pool).await.unwrap(), 1);

        let fresh = upsert_project_by_slug(
            &pool,
            "new-repo",
            &fields,
            Some("https://github.com/me/new-repo"),
        )
        .await
        .unwrap();
        assert_eq!(
            fresh.github_url.as_deref(),
            Some("https://github.com/me/new-repo")
        );
        assert_eq!(count_projects(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_skills_ordered_by_order_then_name() {
        let pool = connect_in_memory().await.unwrap();
        for (name, order) in [("Zig", 0), ("Axum", 0), ("Docker", -1)] {
            create_skill(
                &pool,
                NewSkill {
                    name: name.to_string(),
                    category: "Backend".to_string(),
                    order,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        let names: Vec<String> = list_skills(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Docker", "Axum", "Zig"]);
    }

    #[tokio::test]
    async fn test_experience_and_journey_crud() {
        let pool = connect_in_memory().await.unwrap();
        let exp = create_experience(
            &pool,
            NewExperience {
                company: "Acme".to_string(),
                role: "Backend Developer".to_string(),
                duration: "2024 - Present".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let updated = update_experience(
            &pool,
            &exp.id,
            ExperiencePatch {
                order: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.order, 3);
        assert!(delete_experience(&pool, &exp.id).await.unwrap());
        assert!(!delete_experience(&pool, &exp.id).await.unwrap());

        let point = create_journey_point(
            &pool,
            NewJourneyPoint {
                title: "First API".to_string(),
                year: "2021".to_string(),
                kind: "backend".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(list_journey(&pool).await.unwrap(), vec![point.clone()]);
        assert!(delete_journey_point(&pool, &point.id).await.unwrap());
    }

    fn new_role(title: &str) -> NewRole {
        NewRole {
            title: title.to_string(),
            subtitle: "Subtitle".to_string(),
            description: "Description".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_hero_defaults_then_partial_update() {
        let pool = connect_in_memory().await.unwrap();
        let hero = get_hero(&pool).await.unwrap();
        assert_eq!(hero.greeting, Hero::default().greeting);
        assert_eq!(hero.cta_link, "#projects");

        let updated = update_hero(
            &pool,
            HeroPatch {
                headline: Some("Systems that scale.".to_string()),
                greeting: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.headline, "Systems that scale.");
        assert_eq!(updated.greeting, Hero::default().greeting);
        assert_eq!(get_hero(&pool).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_roles_order_and_active_filter() {
        let pool = connect_in_memory().await.unwrap();
        let first = create_role(&pool, new_role("Backend")).await.unwrap();
        let second = create_role(&pool, new_role("Frontend")).await.unwrap();
        assert_eq!((first.order, second.order), (0, 1));
        assert_eq!(first.icon, DEFAULT_ROLE_ICON);

        let hidden = create_role(
            &pool,
            NewRole {
                order: Some(-1),
                is_active: false,
                ..new_role("Hidden")
            },
        )
        .await
        .unwrap();

        let titles = |roles: Vec<Role>| roles.into_iter().map(|r| r.title).collect::<Vec<_>>();
        assert_eq!(
            titles(list_roles(&pool, true).await.unwrap()),
            vec!["Backend", "Frontend"]
        );
        assert_eq!(
            titles(list_roles(&pool, false).await.unwrap()),
            vec!["Hidden", "Backend", "Frontend"]
        );

        let shown = update_role(
            &pool,
            &hidden.id,
            RolePatch {
                is_active: Some(true),
                icon: Some("Zap".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert!(shown.is_active);
        assert_eq!(find_role(&pool, &hidden.id).await.unwrap(), Some(shown));

        assert!(delete_role(&pool, &first.id).await.unwrap());
        assert!(!delete_role(&pool, &first.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_role_icon_must_be_known() {
        let pool = connect_in_memory().await.unwrap();
        let bad = NewRole {
            icon: Some("Rocket".to_string()),
            ..new_role("Backend")
        };
        assert!(create_role(&pool, bad).await.is_err());

        let role = create_role(&pool, new_role("Backend")).await.unwrap();
        let patch = RolePatch {
            icon: Some("Rocket".to_string()),
            ..Default::default()
        };
        assert!(update_role(&pool, &role.id, patch).await.is_err());
    }
}
