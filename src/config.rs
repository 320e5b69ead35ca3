use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    /// `development`, `production` or `test`. Webhook signatures are only
    /// verified in `production`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Name of the env var holding the admin bearer token.
    #[serde(default = "default_admin_token_env")]
    pub admin_token_env: String,
}

fn default_environment() -> String {
    "development".to_string()
}
fn default_admin_token_env() -> String {
    "FOLIO_ADMIN_TOKEN".to_string()
}

impl ServerConfig {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
    #[serde(default = "default_chat_max_tokens")]
    pub chat_max_tokens: u32,
    #[serde(default = "default_extract_temperature")]
    pub extract_temperature: f32,
    #[serde(default = "default_extract_max_tokens")]
    pub extract_max_tokens: u32,
    /// Providers in priority order.
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_ai_timeout_secs(),
            chat_temperature: default_chat_temperature(),
            chat_max_tokens: default_chat_max_tokens(),
            extract_temperature: default_extract_temperature(),
            extract_max_tokens: default_extract_max_tokens(),
            providers: default_providers(),
        }
    }
}

fn default_ai_timeout_secs() -> u64 {
    30
}
fn default_chat_temperature() -> f32 {
    0.7
}
fn default_chat_max_tokens() -> u32 {
    1024
}
fn default_extract_temperature() -> f32 {
    0.3
}
fn default_extract_max_tokens() -> u32 {
    2048
}

fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            kind: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            base_url: None,
        },
        ProviderConfig {
            kind: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key_env: "GOOGLE_AI_KEY".to_string(),
            base_url: None,
        },
        ProviderConfig {
            kind: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: None,
        },
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// `groq`, `openai` or `gemini`.
    pub kind: String,
    pub model: String,
    pub api_key_env: String,
    /// Overrides the provider's public API root.
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubConfig {
    #[serde(default = "default_secret_env")]
    pub secret_env: String,
    #[serde(default = "default_raw_base_url")]
    pub raw_base_url: String,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            secret_env: default_secret_env(),
            raw_base_url: default_raw_base_url(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_secret_env() -> String {
    "GITHUB_WEBHOOK_SECRET".to_string()
}
fn default_raw_base_url() -> String {
    "https://raw.githubusercontent.com".to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProfileConfig {
    #[serde(default = "default_headline")]
    pub headline: String,
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            headline: default_headline(),
            capabilities: default_capabilities(),
        }
    }
}

fn default_headline() -> String {
    "I am a senior full-stack engineer with a strong focus on backend development and \
     scalable systems."
        .to_string()
}

fn default_capabilities() -> Vec<String> {
    [
        "Full-stack development with emphasis on backend architecture",
        "RESTful API design and implementation",
        "Database design and optimization",
        "Real-time systems with WebSockets",
        "AI integration with hosted LLM inference",
        "DevOps and deployment automation",
        "Authentication and security best practices",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Config {
    /// Config used by tests and one-off commands that only need a database.
    pub fn minimal(db_path: PathBuf) -> Self {
        Self {
            db: DbConfig { path: db_path },
            server: ServerConfig {
                bind: "127.0.0.1:5000".to_string(),
                environment: "test".to_string(),
                admin_token_env: default_admin_token_env(),
            },
            ai: AiConfig::default(),
            github: GithubConfig::default(),
            profile: ProfileConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.server.environment.as_str() {
        "development" | "production" | "test" => {}
        other => anyhow::bail!(
            "Unknown server.environment: '{}'. Must be development, production, or test.",
            other
        ),
    }

    if config.ai.timeout_secs == 0 {
        anyhow::bail!("ai.timeout_secs must be > 0");
    }
    if config.github.fetch_timeout_secs == 0 {
        anyhow::bail!("github.fetch_timeout_secs must be > 0");
    }

    for (name, t) in [
        ("ai.chat_temperature", config.ai.chat_temperature),
        ("ai.extract_temperature", config.ai.extract_temperature),
    ] {
        if !(0.0..=2.0).contains(&t) {
            anyhow::bail!("{} must be in [0.0, 2.0]", name);
        }
    }

    for provider in &config.ai.providers {
        match provider.kind.as_str() {
            "groq" | "openai" | "gemini" => {}
            other => anyhow::bail!(
                "Unknown AI provider kind: '{}'. Must be groq, openai, or gemini.",
                other
            ),
        }
        if provider.model.trim().is_empty() {
            anyhow::bail!("ai.providers: model must be set for '{}'", provider.kind);
        }
        if provider.api_key_env.trim().is_empty() {
            anyhow::bail!(
                "ai.providers: api_key_env must be set for '{}'",
                provider.kind
            );
        }
    }

    Ok(())
}
