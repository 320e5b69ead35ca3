//! HTTP API server.
//!
//! Serves portfolio content, the AI assistant, the GitHub webhook and
//! analytics over a JSON API.
//!
//! # Endpoints
//!
//! | Method | Path | Auth | Description |
//! |--------|------|------|-------------|
//! | `GET`  | `/health` | | Health check (returns version) |
//! | `POST` | `/api/ai/ask` | | Ask the assistant a question |
//! | `POST` | `/api/webhooks/github` | signature | GitHub push webhook |
//! | `POST` | `/api/webhooks/simulate` | admin | Run README extraction on a supplied README |
//! | `GET`  | `/api/projects` | | Published projects |
//! | `POST` | `/api/projects` | admin | Create a project |
//! | `GET`  | `/api/projects/{key}` | | Project by slug |
//! | `PUT`/`DELETE` | `/api/projects/{key}` | admin | Update/delete a project by id |
//! | `GET`/`POST` | `/api/resume` | writes: admin | Experience entries |
//! | `GET` | `/api/resume/{id}` | | One entry by id |
//! | `PUT`/`DELETE` | `/api/resume/{id}` | admin | |
//! | `GET`/`POST` | `/api/skills` | writes: admin | Skills |
//! | `GET` | `/api/skills/{id}` | | One entry by id |
//! | `PUT`/`DELETE` | `/api/skills/{id}` | admin | |
//! | `GET`/`POST` | `/api/journey` | writes: admin | Journey timeline |
//! | `GET` | `/api/journey/{id}` | | One entry by id |
//! | `PUT`/`DELETE` | `/api/journey/{id}` | admin | |
//! | `GET`  | `/api/hero` | | Landing-page hero copy |
//! | `PUT`  | `/api/hero` | admin | Update non-blank hero fields |
//! | `GET`/`POST` | `/api/roles` | writes: admin | Active roles |
//! | `GET` | `/api/roles/{id}` | | One role by id, active or not |
//! | `PUT`/`DELETE` | `/api/roles/{id}` | admin | |
//! | `POST` | `/api/analytics/event` | | Log a visitor event |
//! | `GET`  | `/api/analytics/stats` | admin | Last 7 days of events by day |
//! | `GET`  | `/api/admin/dashboard` | admin | Counters and system status |
//!
//! # Authentication
//!
//! Admin routes require `Authorization: Bearer <token>` matching the env var
//! named by `[server].admin_token_env`. When that variable is unset or empty
//! every admin request is rejected.
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "userQuestion is required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `unauthorized` (401), `not_found` (404),
//! `conflict` (409), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the site frontend can
//! be served from a different origin.

use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::analytics::{self, DailyStats, STATS_WINDOW_DAYS};
use crate::assistant::{AiService, AskRequest};
use crate::config::Config;
use crate::content;
use crate::github::{self, PushDecision, PushEvent};
use crate::models::{
    Experience, ExperiencePatch, Hero, HeroPatch, JourneyPoint, JourneyPointPatch,
    NewExperience, NewJourneyPoint, NewProject, NewRole, NewSkill, Project, ProjectPatch, Role,
    RolePatch, Skill, SkillPatch,
};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pool: SqlitePool,
    pub ai: Arc<AiService>,
    /// Client for README downloads.
    pub http: reqwest::Client,
}

impl AppState {
    /// State with an assistant over the configured providers.
    pub fn new(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        let ai = AiService::from_config(&config.ai, &config.profile);
        Self::with_ai(config, pool, ai)
    }

    pub fn with_ai(config: Config, pool: SqlitePool, ai: AiService) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.github.fetch_timeout_secs))
            .build()?;
        Ok(Self {
            config: Arc::new(config),
            pool,
            ai: Arc::new(ai),
            http,
        })
    }
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and serves until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::connect(config).await?;
    crate::migrate::apply(&pool).await?;

    let bind_addr = config.server.bind.clone();
    if !config.server.is_production() {
        warn!(
            environment = %config.server.environment,
            "GitHub webhook signatures are NOT verified outside production"
        );
    }

    let state = AppState::new(config.clone(), pool)?;
    let app = build_router(state);

    info!(bind = %bind_addr, "Folio API listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/ai/ask", post(handle_ask))
        .route("/api/webhooks/github", post(handle_github_webhook))
        .route("/api/webhooks/simulate", post(handle_simulate))
        .route("/api/projects", get(list_projects).post(create_project))
        .route(
            "/api/projects/{key}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/api/resume", get(list_experience).post(create_experience))
        .route(
            "/api/resume/{id}",
            get(get_experience)
                .put(update_experience)
                .delete(delete_experience),
        )
        .route("/api/skills", get(list_skills).post(create_skill))
        .route(
            "/api/skills/{id}",
            get(get_skill).put(update_skill).delete(delete_skill),
        )
        .route("/api/journey", get(list_journey).post(create_journey_point))
        .route(
            "/api/journey/{id}",
            get(get_journey_point)
                .put(update_journey_point)
                .delete(delete_journey_point),
        )
        .route("/api/hero", get(get_hero).put(update_hero))
        .route("/api/roles", get(list_roles).post(create_role))
        .route(
            "/api/roles/{id}",
            get(get_role).put(update_role).delete(delete_role),
        )
        .route("/api/analytics/event", post(handle_log_event))
        .route("/api/analytics/stats", get(handle_stats))
        .route("/api/admin/dashboard", get(handle_dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Store and I/O failures become `internal`, except duplicate slugs which
/// are a `conflict`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        if content::is_unique_violation(&err) {
            return conflict("a record with this slug already exists");
        }
        let detail = format!("{:#}", err);
        error!(error = %detail, "request failed");
        internal("internal server error")
    }
}

fn app_error(status: StatusCode, code: &str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code: code.to_string(),
        message: message.into(),
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    app_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn unauthorized(message: impl Into<String>) -> AppError {
    app_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    app_error(StatusCode::NOT_FOUND, "not_found", message)
}

fn conflict(message: impl Into<String>) -> AppError {
    app_error(StatusCode::CONFLICT, "conflict", message)
}

fn internal(message: impl Into<String>) -> AppError {
    app_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
}

// ============ Admin guard ============

/// Extractor that admits only requests carrying the admin bearer token.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let expected = std::env::var(&state.config.server.admin_token_env).unwrap_or_default();
        if expected.is_empty() {
            warn!(
                env = %state.config.server.admin_token_env,
                "admin token not configured; rejecting admin request"
            );
            return Err(unauthorized("admin access is not configured"));
        }

        let supplied = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);

        match supplied {
            Some(token) if tokens_match(token, &expected) => Ok(AdminAuth),
            Some(_) => Err(unauthorized("invalid admin token")),
            None => Err(unauthorized("missing bearer token")),
        }
    }
}

/// Compares tokens in constant time by MACing both under the expected token.
fn tokens_match(supplied: &str, expected: &str) -> bool {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    mac.update(expected.as_bytes());
    let tag = mac.finalize().into_bytes();

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(expected.as_bytes()) else {
        return false;
    };
    mac.update(supplied.as_bytes());
    mac.verify_slice(&tag).is_ok()
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /api/ai/ask ============

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

/// Always 200 once the question is present: provider outages produce the
/// mock answer instead of an error.
async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError> {
    if request.user_question.trim().is_empty() {
        return Err(bad_request("userQuestion is required"));
    }
    let answer = state.ai.generate_response(&state.pool, &request).await;
    Ok(Json(AskResponse { answer }))
}

// ============ Webhooks ============

/// Handler for `POST /api/webhooks/github`.
///
/// The body is taken as raw bytes so the signature is computed over exactly
/// what GitHub sent.
async fn handle_github_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.config.server.is_production() {
        let secret = std::env::var(&state.config.github.secret_env).unwrap_or_default();
        if secret.is_empty() {
            error!(env = %state.config.github.secret_env, "webhook secret not configured");
            return Err(unauthorized("webhook secret not configured"));
        }
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok());
        if !github::verify_signature(secret.as_bytes(), &body, signature) {
            warn!("rejected webhook with invalid signature");
            return Err(unauthorized("invalid signature"));
        }
    } else {
        warn!(
            environment = %state.config.server.environment,
            "webhook signature verification skipped"
        );
    }

    let event: PushEvent = serde_json::from_slice(&body)
        .map_err(|e| bad_request(format!("invalid push payload: {}", e)))?;

    let branch = match github::classify_push(&event) {
        PushDecision::Ignore(message) => {
            info!(git_ref = %event.git_ref, message, "webhook ignored");
            return Ok(Json(json!({ "message": message })));
        }
        PushDecision::Sync { branch } => branch,
    };
    let repo = event
        .repository
        .ok_or_else(|| bad_request("repository is required"))?;

    info!(repo = %repo.full_name, %branch, "README changed, syncing project");
    let readme = github::fetch_readme(
        &state.http,
        &state.config.github.raw_base_url,
        &repo.full_name,
        &branch,
        Duration::from_secs(state.config.github.fetch_timeout_secs),
    )
    .await?;

    let (_, project) = github::sync_readme(
        &state.pool,
        &state.ai,
        &readme,
        &repo.name,
        repo.html_url.as_deref(),
    )
    .await?;

    Ok(Json(json!({ "success": true, "project": project.title })))
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct SimulateRequest {
    repo_name: String,
    readme_content: String,
}

/// Handler for `POST /api/webhooks/simulate`: the webhook pipeline minus
/// GitHub, for trying extraction from the admin panel.
async fn handle_simulate(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if request.repo_name.trim().is_empty() || request.readme_content.trim().is_empty() {
        return Err(bad_request("repoName and readmeContent are required"));
    }
    if content::slugify(&request.repo_name).is_empty() {
        return Err(bad_request("repoName must contain a letter or digit"));
    }

    let (fields, project) = github::sync_readme(
        &state.pool,
        &state.ai,
        &request.readme_content,
        &request.repo_name,
        None,
    )
    .await?;

    Ok(Json(json!({ "success": true, "data": fields, "project": project })))
}

// ============ Projects ============

async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<Project>>, AppError> {
    Ok(Json(content::list_published_projects(&state.pool).await?))
}

async fn get_project(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Project>, AppError> {
    content::find_project_by_slug(&state.pool, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("project not found: {}", slug)))
}

async fn create_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), AppError> {
    if input.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    let slug_source = match input.slug.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => input.title.as_str(),
    };
    if content::slugify(slug_source).is_empty() {
        return Err(bad_request("slug must contain at least one letter or digit"));
    }
    let project = content::create_project(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

async fn update_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    content::update_project(&state.pool, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("project not found: {}", id)))
}

async fn delete_project(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !content::delete_project(&state.pool, &id).await? {
        return Err(not_found(format!("project not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}

// ============ Experience ============

async fn list_experience(
    State(state): State<AppState>,
) -> Result<Json<Vec<Experience>>, AppError> {
    Ok(Json(content::list_experience(&state.pool).await?))
}

async fn get_experience(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Experience>, AppError> {
    content::find_experience(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("experience not found: {}", id)))
}

async fn create_experience(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<NewExperience>,
) -> Result<(StatusCode, Json<Experience>), AppError> {
    if input.company.trim().is_empty() || input.role.trim().is_empty() {
        return Err(bad_request("company and role must not be empty"));
    }
    let entry = content::create_experience(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_experience(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ExperiencePatch>,
) -> Result<Json<Experience>, AppError> {
    content::update_experience(&state.pool, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("experience not found: {}", id)))
}

async fn delete_experience(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !content::delete_experience(&state.pool, &id).await? {
        return Err(not_found(format!("experience not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}

// ============ Skills ============

async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, AppError> {
    Ok(Json(content::list_skills(&state.pool).await?))
}

async fn get_skill(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Skill>, AppError> {
    content::find_skill(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("skill not found: {}", id)))
}

async fn create_skill(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<NewSkill>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    if input.name.trim().is_empty() || input.category.trim().is_empty() {
        return Err(bad_request("name and category must not be empty"));
    }
    let skill = content::create_skill(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

async fn update_skill(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<SkillPatch>,
) -> Result<Json<Skill>, AppError> {
    content::update_skill(&state.pool, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("skill not found: {}", id)))
}

async fn delete_skill(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !content::delete_skill(&state.pool, &id).await? {
        return Err(not_found(format!("skill not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}

// ============ Journey ============

async fn list_journey(
    State(state): State<AppState>,
) -> Result<Json<Vec<JourneyPoint>>, AppError> {
    Ok(Json(content::list_journey(&state.pool).await?))
}

async fn get_journey_point(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JourneyPoint>, AppError> {
    content::find_journey_point(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("journey point not found: {}", id)))
}

async fn create_journey_point(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(input): Json<NewJourneyPoint>,
) -> Result<(StatusCode, Json<JourneyPoint>), AppError> {
    if input.title.trim().is_empty() || input.year.trim().is_empty() {
        return Err(bad_request("title and year must not be empty"));
    }
    let point = content::create_journey_point(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(point)))
}

async fn update_journey_point(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<JourneyPointPatch>,
) -> Result<Json<JourneyPoint>, AppError> {
    content::update_journey_point(&state.pool, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("journey point not found: {}", id)))
}

async fn delete_journey_point(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !content::delete_journey_point(&state.pool, &id).await? {
        return Err(not_found(format!("journey point not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}

// ============ Hero ============

async fn get_hero(State(state): State<AppState>) -> Result<Json<Hero>, AppError> {
    Ok(Json(content::get_hero(&state.pool).await?))
}

async fn update_hero(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(patch): Json<HeroPatch>,
) -> Result<Json<Hero>, AppError> {
    Ok(Json(content::update_hero(&state.pool, patch).await?))
}

// ============ Roles ============

fn check_role_icon(icon: Option<&str>) -> Result<(), AppError> {
    match icon.map(str::trim) {
        Some(icon) if !icon.is_empty() && !content::is_role_icon(icon) => {
            Err(bad_request(format!("unknown role icon: {}", icon)))
        }
        _ => Ok(()),
    }
}

async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(content::list_roles(&state.pool, true).await?))
}

async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Role>, AppError> {
    content::find_role(&state.pool, &id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("role not found: {}", id)))
}

async fn create_role(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(mut input): Json<NewRole>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    if input.title.trim().is_empty()
        || input.subtitle.trim().is_empty()
        || input.description.trim().is_empty()
    {
        return Err(bad_request("title, subtitle and description must not be empty"));
    }
    check_role_icon(input.icon.as_deref())?;
    input.icon = input.icon.map(|icon| icon.trim().to_string());
    let role = content::create_role(&state.pool, input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<RolePatch>,
) -> Result<Json<Role>, AppError> {
    if let Some(icon) = patch.icon.as_deref() {
        if !content::is_role_icon(icon) {
            return Err(bad_request(format!("unknown role icon: {}", icon)));
        }
    }
    content::update_role(&state.pool, &id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(format!("role not found: {}", id)))
}

async fn delete_role(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !content::delete_role(&state.pool, &id).await? {
        return Err(not_found(format!("role not found: {}", id)));
    }
    Ok(Json(json!({ "success": true })))
}

// ============ Analytics ============

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct LogEventRequest {
    event_type: String,
    metadata: Option<serde_json::Value>,
}

/// First address in `X-Forwarded-For`, else `X-Real-IP`.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

async fn handle_log_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LogEventRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if request.event_type.trim().is_empty() {
        return Err(bad_request("eventType is required"));
    }
    let metadata = request.metadata.unwrap_or_else(|| json!({}));
    let ip = client_ip(&headers);
    analytics::log_event(&state.pool, &request.event_type, &metadata, ip.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}

async fn handle_stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyStats>>, AppError> {
    Ok(Json(
        analytics::daily_stats(&state.pool, STATS_WINDOW_DAYS).await?,
    ))
}

// ============ GET /api/admin/dashboard ============

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    projects: i64,
    visits: i64,
    ai_interactions: i64,
    system_status: SystemStatus,
}

#[derive(Serialize)]
struct SystemStatus {
    database: &'static str,
    /// `online` when at least one provider has a credential, else `mock`.
    ai: &'static str,
    providers: Vec<String>,
}

async fn handle_dashboard(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let projects = content::count_projects(&state.pool).await?;
    let visits = analytics::count_events(&state.pool, "visit").await?;
    let ai_interactions = analytics::count_events(&state.pool, "ai_chat").await?;
    let providers = state.ai.chain().available();

    Ok(Json(DashboardResponse {
        projects,
        visits,
        ai_interactions,
        system_status: SystemStatus {
            database: "connected",
            ai: if providers.is_empty() { "mock" } else { "online" },
            providers,
        },
    }))
}
