//! README to project extraction.
//!
//! Asks the provider chain to turn a repository README into a
//! [`ProjectFields`] record. The pipeline always produces a record:
//!
//! 1. Send the extraction prompt as a single user message.
//! 2. Strip Markdown code fences from the reply and parse it as JSON.
//! 3. On provider exhaustion or a parse failure, fall back to
//!    [`heuristic_project`], which needs nothing but the README and repo name.

use tracing::{info, warn};

use crate::config::AiConfig;
use crate::models::ProjectFields;
use crate::prompt;
use crate::provider::{CompletionRequest, ProviderChain};

/// Characters of README kept in the heuristic description.
const HEURISTIC_DESCRIPTION_CHARS: usize = 500;

/// Removes every ```` ```json ```` and ```` ``` ```` marker and trims.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses a model reply into [`ProjectFields`]. Missing keys default to
/// empty values; anything that is not a JSON object is an error.
pub fn parse_project_fields(reply: &str) -> Result<ProjectFields, serde_json::Error> {
    serde_json::from_str(&strip_code_fences(reply))
}

/// A record built from the repository name and README alone.
pub fn heuristic_project(readme: &str, repo_name: &str) -> ProjectFields {
    let mut title = String::with_capacity(repo_name.len());
    let mut chars = repo_name.chars();
    if let Some(first) = chars.next() {
        title.extend(first.to_uppercase());
        title.push_str(chars.as_str());
    }
    let title = title.replace('-', " ");

    let excerpt: String = readme.chars().take(HEURISTIC_DESCRIPTION_CHARS).collect();

    ProjectFields {
        title,
        summary: "Project synced from GitHub (AI Extraction Unavailable).".to_string(),
        full_description: format!("{}...", excerpt),
        tech_stack: vec![
            "TypeScript".to_string(),
            "Node.js".to_string(),
            "React".to_string(),
        ],
        architecture: Some("Standard MVC Architecture".to_string()),
        challenges: Some("Data synchronization and real-time updates.".to_string()),
        category: "Full Stack".to_string(),
    }
}

/// Extracts structured project data from a README. Never fails.
pub async fn parse_readme_to_project(
    chain: &ProviderChain,
    settings: &AiConfig,
    readme: &str,
    repo_name: &str,
) -> ProjectFields {
    let request = CompletionRequest {
        system: None,
        user: prompt::readme_extraction_prompt(readme, repo_name),
        temperature: settings.extract_temperature,
        max_tokens: settings.extract_max_tokens,
    };

    let reply = match chain.complete(&request).await {
        Ok(done) => done,
        Err(e) => {
            warn!(repo = repo_name, error = %e, "README extraction unavailable; using heuristic");
            return heuristic_project(readme, repo_name);
        }
    };

    match parse_project_fields(&reply.text) {
        Ok(fields) => {
            info!(
                repo = repo_name,
                provider = %reply.provider,
                title = %fields.title,
                "README extracted"
            );
            fields
        }
        Err(e) => {
            warn!(
                repo = repo_name,
                provider = %reply.provider,
                error = %e,
                "extraction reply was not valid JSON; using heuristic"
            );
            heuristic_project(readme, repo_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::{chain_of, Script, ScriptedProvider};
    use std::time::Duration;

    const VALID: &str = r#"{
        "title": "Realtime Chat",
        "summary": "Chat at scale",
        "fullDescription": "A websocket chat server.",
        "techStack": ["Rust", "Redis"],
        "architecture": "Fan-out via pub/sub",
        "challenges": null,
        "category": "Backend"
    }"#;

    #[test]
    fn test_parses_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        let fields = parse_project_fields(&fenced).unwrap();
        assert_eq!(fields.title, "Realtime Chat");
        assert_eq!(fields.tech_stack, vec!["Rust", "Redis"]);
        assert_eq!(fields.architecture.as_deref(), Some("Fan-out via pub/sub"));
        assert_eq!(fields.challenges, None);
    }

    #[test]
    fn test_missing_keys_default() {
        let fields = parse_project_fields(r#"{"title": "Only Title"}"#).unwrap();
        assert_eq!(fields.title, "Only Title");
        assert!(fields.tech_stack.is_empty());
        let value = serde_json::to_value(&fields).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_null_fields_default() {
        let fields = parse_project_fields(
            r#"{"title": null, "summary": null, "fullDescription": null,
                "techStack": null, "architecture": null, "category": null}"#,
        )
        .unwrap();
        assert_eq!(fields, ProjectFields::default());
    }

    #[test]
    fn test_rejects_prose() {
        assert!(parse_project_fields("Sure! Here is the project summary.").is_err());
    }

    #[test]
    fn test_heuristic_project() {
        let readme = "x".repeat(800);
        let fields = heuristic_project(&readme, "my-cool-repo");
        assert_eq!(fields.title, "My cool repo");
        assert_eq!(fields.category, "Full Stack");
        assert_eq!(fields.full_description.len(), 503);
        assert!(fields.full_description.ends_with("..."));
        assert_eq!(fields.tech_stack, vec!["TypeScript", "Node.js", "React"]);
    }

    #[tokio::test]
    async fn test_valid_reply_yields_schema_record() {
        let reply = format!("```json\n{}\n```", VALID);
        let provider = ScriptedProvider::new("a", Script::Reply(reply));
        let chain = chain_of(&[provider.clone()], Duration::from_secs(5));
        let fields =
            parse_readme_to_project(&chain, &AiConfig::default(), "# Chat", "realtime-chat").await;
        assert_eq!(fields.category, "Backend");

        let sent = provider.last_request.lock().unwrap().clone().unwrap();
        assert!(sent.system.is_none());
        assert!(sent.user.contains("Repo Name: realtime-chat"));
        assert_eq!(sent.max_tokens, 2048);
    }

    #[tokio::test]
    async fn test_reply_with_null_category_is_kept() {
        let reply = r#"{"title": "Realtime Chat", "summary": "Chat at scale",
            "fullDescription": "A websocket chat server.", "techStack": ["Rust"],
            "architecture": null, "challenges": null, "category": null}"#;
        let provider = ScriptedProvider::new("a", Script::Reply(reply.to_string()));
        let chain = chain_of(&[provider], Duration::from_secs(5));
        let fields = parse_readme_to_project(&chain, &AiConfig::default(), "readme", "demo").await;
        assert_eq!(fields.title, "Realtime Chat");
        assert_eq!(fields.tech_stack, vec!["Rust"]);
        assert_eq!(fields.category, "");
    }

    #[tokio::test]
    async fn test_invalid_reply_falls_back() {
        let provider = ScriptedProvider::new("a", Script::Reply("not json at all".to_string()));
        let chain = chain_of(&[provider], Duration::from_secs(5));
        let fields = parse_readme_to_project(&chain, &AiConfig::default(), "readme", "demo").await;
        assert_eq!(fields, heuristic_project("readme", "demo"));
    }

    #[tokio::test]
    async fn test_exhausted_chain_falls_back() {
        let fields =
            parse_readme_to_project(&ProviderChain::empty(), &AiConfig::default(), "readme", "demo")
                .await;
        assert_eq!(fields.title, "Demo");
        assert_eq!(fields.full_description, "readme...");
    }
}
