//! The visitor-facing assistant.
//!
//! [`AiService`] ties the knowledge base, prompt assembly and provider chain
//! together. Its entry points never fail: when no provider can answer, chat
//! returns a deterministic mock answer and extraction (see
//! [`crate::extract`]) falls back to a heuristic record.

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::config::{AiConfig, ProfileConfig};
use crate::knowledge;
use crate::prompt;
use crate::provider::{CompletionRequest, ProviderChain};

/// Body of `POST /api/ai/ask`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AskRequest {
    pub user_question: String,
    /// Overrides the user message sent to the model when non-empty.
    pub context: Option<String>,
    /// Slug of the project the visitor is looking at.
    pub project_id: Option<String>,
}

pub struct AiService {
    chain: ProviderChain,
    settings: AiConfig,
    profile: ProfileConfig,
}

impl AiService {
    pub fn new(chain: ProviderChain, settings: AiConfig, profile: ProfileConfig) -> Self {
        Self {
            chain,
            settings,
            profile,
        }
    }

    /// Builds the service with a chain over the configured providers.
    pub fn from_config(settings: &AiConfig, profile: &ProfileConfig) -> Self {
        Self::new(
            ProviderChain::from_config(settings),
            settings.clone(),
            profile.clone(),
        )
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn settings(&self) -> &AiConfig {
        &self.settings
    }

    /// Answers a visitor question grounded on the current portfolio content.
    pub async fn generate_response(&self, pool: &SqlitePool, request: &AskRequest) -> String {
        let kb = match knowledge::build_knowledge_base(pool, &self.profile).await {
            Ok(kb) => kb,
            Err(e) => {
                warn!(error = %e, "knowledge base unavailable; answering with mock response");
                return mock_response(&request.user_question);
            }
        };

        let project_context = match request.project_id.as_deref() {
            Some(slug) if !slug.trim().is_empty() => {
                match knowledge::get_project_context(pool, slug).await {
                    Ok(ctx) => ctx,
                    Err(e) => {
                        warn!(slug, error = %e, "project context lookup failed");
                        String::new()
                    }
                }
            }
            _ => String::new(),
        };

        let completion = CompletionRequest {
            system: Some(prompt::system_prompt(&kb.summary, &project_context)),
            user: prompt::user_message(request.context.as_deref(), &request.user_question)
                .to_string(),
            temperature: self.settings.chat_temperature,
            max_tokens: self.settings.chat_max_tokens,
        };

        match self.chain.complete(&completion).await {
            Ok(done) => {
                debug!(provider = %done.provider, chars = done.text.len(), "assistant answered");
                done.text
            }
            Err(e) => {
                warn!(error = %e, "answering with mock response");
                mock_response(&request.user_question)
            }
        }
    }
}

/// The fixed answer returned when no provider is available.
pub fn mock_response(question: &str) -> String {
    format!(
        "[MOCK RESPONSE] Hello! I see you're asking about \"{}\". Currently, the AI service is unavailable, so this is a placeholder answer. Please reach out directly for more details about my work.",
        question
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::NewProject;
    use crate::provider::testing::{chain_of, Script, ScriptedProvider};
    use std::time::Duration;

    fn service(chain: ProviderChain) -> AiService {
        AiService::new(chain, AiConfig::default(), ProfileConfig::default())
    }

    fn ask(question: &str) -> AskRequest {
        AskRequest {
            user_question: question.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_providers_returns_mock_with_question() {
        let pool = connect_in_memory().await.unwrap();
        let answer = service(ProviderChain::empty())
            .generate_response(&pool, &ask("What is your stack?"))
            .await;
        assert!(answer.starts_with("[MOCK RESPONSE]"));
        assert!(answer.contains("\"What is your stack?\""));
        assert!(answer.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_store_failure_returns_mock() {
        let pool = connect_in_memory().await.unwrap();
        pool.close().await;
        let provider = ScriptedProvider::new("a", Script::Reply("real answer".to_string()));
        let svc = service(chain_of(&[provider.clone()], Duration::from_secs(5)));

        let answer = svc.generate_response(&pool, &ask("hi")).await;
        assert_eq!(answer, mock_response("hi"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_prompt_carries_project_context_and_user_context() {
        let pool = connect_in_memory().await.unwrap();
        crate::content::create_project(
            &pool,
            NewProject {
                title: "Chat Engine".to_string(),
                category: "Backend".to_string(),
                architecture: Some("Event-sourced message log".to_string()),
                is_published: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let provider = ScriptedProvider::new("a", Script::Reply("It scales.".to_string()));
        let svc = service(chain_of(&[provider.clone()], Duration::from_secs(5)));
        let request = AskRequest {
            user_question: "How does it scale?".to_string(),
            context: Some("Visitor is reading the Chat Engine case study".to_string()),
            project_id: Some("chat-engine".to_string()),
        };

        let answer = svc.generate_response(&pool, &request).await;
        assert_eq!(answer, "It scales.");

        let sent = provider.last_request.lock().unwrap().clone().unwrap();
        let system = sent.system.unwrap();
        assert!(system.contains("=== Currently Discussing ==="));
        assert!(system.contains("Event-sourced message log"));
        assert_eq!(sent.user, "Visitor is reading the Chat Engine case study");
        assert_eq!(sent.max_tokens, 1024);
    }

    #[tokio::test]
    async fn test_unknown_project_adds_no_block() {
        let pool = connect_in_memory().await.unwrap();
        let provider = ScriptedProvider::new("a", Script::Reply("ok".to_string()));
        let svc = service(chain_of(&[provider.clone()], Duration::from_secs(5)));
        let request = AskRequest {
            user_question: "hi".to_string(),
            context: None,
            project_id: Some("nonexistent-slug".to_string()),
        };

        svc.generate_response(&pool, &request).await;
        let sent = provider.last_request.lock().unwrap().clone().unwrap();
        assert!(!sent.system.unwrap().contains("Currently Discussing"));
        assert_eq!(sent.user, "hi");
    }
}
