//! LLM provider clients and the fallback chain.
//!
//! Defines the [`CompletionProvider`] trait and two HTTP implementations:
//! - **[`OpenAiCompatible`]**: `POST {base}/chat/completions`, used for Groq and OpenAI.
//! - **[`GeminiProvider`]**: `POST {base}/models/{model}:generateContent`.
//!
//! # Fallback chain
//!
//! [`ProviderChain`] holds one [`ProviderSlot`] per configured provider, in
//! priority order. For every request each slot is tried once, strictly in
//! sequence:
//!
//! ```text
//! NotAttempted ──▶ Unavailable (no usable credential) ──▶ next slot
//!              ──▶ Failed (transport, status, malformed, timeout) ──▶ next slot
//!              ──▶ Success ──▶ return text
//! all slots done ──▶ ProviderError::Exhausted
//! ```
//!
//! Slots resolve their credential from the environment on first use and
//! memoize the resulting client (or its absence) for the process lifetime.
//! A credential that is empty, contains `mock`, or looks like a
//! `your_..._here` template value counts as absent.

mod gemini;
mod openai;

pub use gemini::GeminiProvider;
pub use openai::OpenAiCompatible;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AiConfig, ProviderConfig};

/// A single completion request: optional system prompt plus one user turn.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text produced by the first provider that succeeded.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub provider: String,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request could not be sent or the body could not be decoded.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: String,
        status: reqwest::StatusCode,
        body: String,
    },
    /// The provider answered but not with usable text (no choices, empty content).
    #[error("malformed response from {provider}: {detail}")]
    Malformed { provider: String, detail: String },
    #[error("{provider} timed out after {elapsed:?}")]
    Timeout { provider: String, elapsed: Duration },
    #[error("no AI provider produced a response")]
    Exhausted,
}

/// A hosted language model that turns a [`CompletionRequest`] into text.
///
/// One call is one attempt; implementations must not retry internally.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short identifier used in logs (e.g. `"groq"`).
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Returns true for credentials that should be treated as "not configured".
pub fn is_placeholder_key(key: &str) -> bool {
    let key = key.trim();
    if key.is_empty() {
        return true;
    }
    let lower = key.to_ascii_lowercase();
    lower.contains("mock") || (lower.starts_with("your_") && lower.ends_with("_here"))
}

/// Builds the concrete provider for a config entry and credential.
pub fn create_provider(
    config: &ProviderConfig,
    api_key: String,
    timeout: Duration,
) -> Result<Arc<dyn CompletionProvider>, ProviderError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let provider: Arc<dyn CompletionProvider> = match config.kind.as_str() {
        "groq" => Arc::new(OpenAiCompatible::new(
            "groq",
            config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
            config.model.clone(),
            api_key,
            client,
        )),
        "openai" => Arc::new(OpenAiCompatible::new(
            "openai",
            config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            config.model.clone(),
            api_key,
            client,
        )),
        "gemini" => Arc::new(GeminiProvider::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            client,
        )),
        other => {
            return Err(ProviderError::Malformed {
                provider: other.to_string(),
                detail: "unknown provider kind".to_string(),
            })
        }
    };
    Ok(provider)
}

/// One position in the fallback chain.
pub struct ProviderSlot {
    name: String,
    config: Option<ProviderConfig>,
    handle: OnceLock<Option<Arc<dyn CompletionProvider>>>,
}

impl ProviderSlot {
    /// A slot that reads its credential from `config.api_key_env` on first use.
    pub fn from_config(config: ProviderConfig) -> Self {
        Self {
            name: config.kind.clone(),
            config: Some(config),
            handle: OnceLock::new(),
        }
    }

    /// A slot wrapping an already constructed provider.
    pub fn ready(provider: Arc<dyn CompletionProvider>) -> Self {
        let handle = OnceLock::new();
        let name = provider.name().to_string();
        let _ = handle.set(Some(provider));
        Self {
            name,
            config: None,
            handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the memoized client, initializing it on first call.
    /// `None` means the provider is unavailable.
    pub fn resolve(&self, timeout: Duration) -> Option<Arc<dyn CompletionProvider>> {
        self.handle
            .get_or_init(|| {
                let config = self.config.as_ref()?;
                init_from_env(config, timeout)
            })
            .clone()
    }
}

fn init_from_env(
    config: &ProviderConfig,
    timeout: Duration,
) -> Option<Arc<dyn CompletionProvider>> {
    let key = std::env::var(&config.api_key_env).unwrap_or_default();
    if is_placeholder_key(&key) {
        warn!(
            provider = %config.kind,
            env = %config.api_key_env,
            "API key not configured or placeholder; provider disabled"
        );
        return None;
    }

    match create_provider(config, key, timeout) {
        Ok(provider) => {
            info!(provider = %config.kind, model = %config.model, "AI provider initialized");
            Some(provider)
        }
        Err(e) => {
            warn!(provider = %config.kind, error = %e, "failed to initialize AI provider");
            None
        }
    }
}

/// Ordered providers tried one after another until one succeeds.
pub struct ProviderChain {
    slots: Vec<ProviderSlot>,
    attempt_timeout: Duration,
}

impl ProviderChain {
    pub fn new(slots: Vec<ProviderSlot>, attempt_timeout: Duration) -> Self {
        Self {
            slots,
            attempt_timeout,
        }
    }

    /// Builds the chain from `[ai]` config. No credentials are read yet.
    pub fn from_config(config: &AiConfig) -> Self {
        let slots = config
            .providers
            .iter()
            .cloned()
            .map(ProviderSlot::from_config)
            .collect();
        Self::new(slots, Duration::from_secs(config.timeout_secs))
    }

    /// Builds a chain over already constructed providers, in the given order.
    pub fn from_providers(
        providers: Vec<Arc<dyn CompletionProvider>>,
        attempt_timeout: Duration,
    ) -> Self {
        Self::new(
            providers.into_iter().map(ProviderSlot::ready).collect(),
            attempt_timeout,
        )
    }

    /// A chain with no providers; every request is exhausted immediately.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::from_secs(30))
    }

    pub fn slots(&self) -> &[ProviderSlot] {
        &self.slots
    }

    /// Names of the providers that currently have a usable credential.
    pub fn available(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.resolve(self.attempt_timeout).is_some())
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Runs the request through the chain. Provider failures are logged and
    /// absorbed; the only error returned is [`ProviderError::Exhausted`].
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion, ProviderError> {
        let mut attempted = 0usize;

        for slot in &self.slots {
            let Some(provider) = slot.resolve(self.attempt_timeout) else {
                debug!(provider = %slot.name(), "provider unavailable, skipping");
                continue;
            };

            attempted += 1;
            info!(provider = %slot.name(), "attempting AI completion");
            let started = Instant::now();

            let failure =
                match tokio::time::timeout(self.attempt_timeout, provider.complete(request)).await {
                    Ok(Ok(text)) if !text.trim().is_empty() => {
                        info!(
                            provider = %slot.name(),
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "AI completion succeeded"
                        );
                        return Ok(Completion {
                            text,
                            provider: slot.name().to_string(),
                        });
                    }
                    Ok(Ok(_)) => ProviderError::Malformed {
                        provider: slot.name().to_string(),
                        detail: "empty completion".to_string(),
                    },
                    Ok(Err(e)) => e,
                    Err(_) => ProviderError::Timeout {
                        provider: slot.name().to_string(),
                        elapsed: started.elapsed(),
                    },
                };

            warn!(
                provider = %slot.name(),
                error = %failure,
                "AI completion failed, advancing to next provider"
            );
        }

        warn!(attempted, "all AI providers exhausted");
        Err(ProviderError::Exhausted)
    }
}

/// POSTs JSON and decodes a JSON reply. Any non-2xx status is an error
/// carrying the response body.
pub(crate) async fn send_json<T: Serialize, R: DeserializeOwned>(
    provider: &str,
    request: reqwest::RequestBuilder,
    body: &T,
) -> Result<R, ProviderError> {
    let response = request.json(body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status {
            provider: provider.to_string(),
            status,
            body: response.text().await.unwrap_or_default(),
        });
    }
    Ok(response.json::<R>().await?)
}
