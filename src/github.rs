//! GitHub push webhook handling.
//!
//! A push to `main` or `master` that adds or modifies the root `README.md`
//! re-extracts the repository's project record:
//!
//! ```text
//! push payload ──▶ classify_push ──▶ fetch_readme ──▶ extract ──▶ upsert by slug
//! ```
//!
//! Signature verification ([`verify_signature`]) is HMAC-SHA256 over the raw
//! request body, compared in constant time. The HTTP handler decides whether
//! to call it based on the configured environment.

use anyhow::{bail, Context, Result};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use sqlx::SqlitePool;
use std::time::Duration;
use tracing::info;

use crate::assistant::AiService;
use crate::content;
use crate::extract;
use crate::models::{Project, ProjectFields};

type HmacSha256 = Hmac<Sha256>;

const README_PATH: &str = "README.md";

/// The subset of a GitHub `push` payload this service reads.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: Option<Repository>,
    pub commits: Vec<Commit>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub html_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Commit {
    pub added: Vec<String>,
    pub modified: Vec<String>,
}

/// What to do with a push event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushDecision {
    /// Nothing to sync; the message is returned to GitHub.
    Ignore(&'static str),
    Sync { branch: String },
}

/// Checks `X-Hub-Signature-256` (`sha256=<hex>`) against the body.
pub fn verify_signature(secret: &[u8], body: &[u8], header: Option<&str>) -> bool {
    let Some(hex_sig) = header.and_then(|h| h.strip_prefix("sha256=")) else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_sig.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Computes the header value GitHub would send for `body`.
pub fn sign(secret: &[u8], body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| anyhow::anyhow!("Invalid webhook secret"))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// `refs/heads/main` -> `main`; other refs yield `None`.
pub fn branch_from_ref(git_ref: &str) -> Option<&str> {
    match git_ref.strip_prefix("refs/heads/") {
        Some(branch @ ("main" | "master")) => Some(branch),
        _ => None,
    }
}

/// True when any commit adds or modifies the root README.
pub fn readme_changed(commits: &[Commit]) -> bool {
    commits.iter().any(|c| {
        c.added.iter().any(|p| p == README_PATH) || c.modified.iter().any(|p| p == README_PATH)
    })
}

pub fn classify_push(event: &PushEvent) -> PushDecision {
    let Some(branch) = branch_from_ref(&event.git_ref) else {
        return PushDecision::Ignore("Ignored: Not main branch");
    };
    if !readme_changed(&event.commits) {
        return PushDecision::Ignore("Ignored: README not modified");
    }
    if event
        .repository
        .as_ref()
        .map_or(true, |r| r.name.is_empty() || r.full_name.is_empty())
    {
        return PushDecision::Ignore("Ignored: Missing repository");
    }
    PushDecision::Sync {
        branch: branch.to_string(),
    }
}

/// Downloads `{raw_base_url}/{full_name}/{branch}/README.md`.
pub async fn fetch_readme(
    client: &reqwest::Client,
    raw_base_url: &str,
    full_name: &str,
    branch: &str,
    timeout: Duration,
) -> Result<String> {
    let url = format!(
        "{}/{}/{}/{}",
        raw_base_url.trim_end_matches('/'),
        full_name,
        branch,
        README_PATH
    );
    let response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        bail!("Failed to fetch README from {}: HTTP {}", url, status);
    }
    Ok(response.text().await?)
}

/// Extracts `readme` and upserts the project keyed by the repository slug.
pub async fn sync_readme(
    pool: &SqlitePool,
    ai: &AiService,
    readme: &str,
    repo_name: &str,
    github_url: Option<&str>,
) -> Result<(ProjectFields, Project)> {
    let mut fields =
        extract::parse_readme_to_project(ai.chain(), ai.settings(), readme, repo_name).await;
    let project = store_extracted(pool, &mut fields, repo_name, github_url).await?;
    Ok((fields, project))
}

/// Upserts extracted fields as a published project. An empty extracted
/// title falls back to the repository name.
pub async fn store_extracted(
    pool: &SqlitePool,
    fields: &mut ProjectFields,
    repo_name: &str,
    github_url: Option<&str>,
) -> Result<Project> {
    if fields.title.trim().is_empty() {
        fields.title = repo_name.to_string();
    }

    let slug = content::slugify(repo_name);
    if slug.is_empty() {
        bail!("Repository name '{}' produces an empty slug", repo_name);
    }

    let project = content::upsert_project_by_slug(pool, &slug, fields, github_url).await?;
    info!(slug = %project.slug, title = %project.title, "project synced from README");
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AiConfig, ProfileConfig};
    use crate::db::connect_in_memory;
    use crate::provider::testing::{chain_of, Script, ScriptedProvider};
    use crate::provider::ProviderChain;

    fn push(git_ref: &str, added: &[&str], modified: &[&str]) -> PushEvent {
        PushEvent {
            git_ref: git_ref.to_string(),
            repository: Some(Repository {
                name: "demo-repo".to_string(),
                full_name: "octo/demo-repo".to_string(),
                html_url: Some("https://github.com/octo/demo-repo".to_string()),
            }),
            commits: vec![Commit {
                added: added.iter().map(|s| s.to_string()).collect(),
                modified: modified.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn test_signature_roundtrip_and_mismatch() {
        let body = br#"{"ref":"refs/heads/main"}"#;
        let header = sign(b"s3cret", body).unwrap();
        assert!(header.starts_with("sha256="));
        assert!(verify_signature(b"s3cret", body, Some(&header)));
        assert!(!verify_signature(b"other", body, Some(&header)));
        assert!(!verify_signature(b"s3cret", b"tampered", Some(&header)));
        assert!(!verify_signature(b"s3cret", body, None));
        assert!(!verify_signature(b"s3cret", body, Some("sha1=abcd")));
        assert!(!verify_signature(b"s3cret", body, Some("sha256=not-hex")));
    }

    #[test]
    fn test_classify_push() {
        assert_eq!(
            classify_push(&push("refs/heads/feature-x", &["README.md"], &[])),
            PushDecision::Ignore("Ignored: Not main branch")
        );
        assert_eq!(
            classify_push(&push("refs/heads/main", &["src/lib.rs"], &["docs/README.md"])),
            PushDecision::Ignore("Ignored: README not modified")
        );
        assert_eq!(
            classify_push(&push("refs/heads/master", &[], &["README.md"])),
            PushDecision::Sync {
                branch: "master".to_string()
            }
        );
        assert_eq!(
            classify_push(&PushEvent {
                git_ref: "refs/heads/main".to_string(),
                repository: None,
                commits: push("refs/heads/main", &["README.md"], &[]).commits,
            }),
            PushDecision::Ignore("Ignored: Missing repository")
        );
    }

    #[test]
    fn test_payload_deserializes_with_ref_key() {
        let event: PushEvent = serde_json::from_str(
            r#"{"ref":"refs/heads/main","repository":{"name":"r","full_name":"o/r"},"commits":[{"modified":["README.md"]}]}"#,
        )
        .unwrap();
        assert_eq!(
            classify_push(&event),
            PushDecision::Sync {
                branch: "main".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sync_readme_upserts_published_project() {
        let pool = connect_in_memory().await.unwrap();
        let ai = AiService::new(
            ProviderChain::empty(),
            AiConfig::default(),
            ProfileConfig::default(),
        );

        let (fields, project) = sync_readme(
            &pool,
            &ai,
            "# Demo\nA demo project.",
            "Demo_Repo",
            Some("https://github.com/octo/Demo_Repo"),
        )
        .await
        .unwrap();
        assert_eq!(fields.title, "Demo_Repo");
        assert_eq!(project.slug, "demo-repo");
        assert!(project.is_published);
        assert_eq!(project.github_url.as_deref(), Some("https://github.com/octo/Demo_Repo"));

        // Second sync updates in place.
        sync_readme(&pool, &ai, "# Demo v2", "Demo_Repo", None).await.unwrap();
        assert_eq!(content::count_projects(&pool).await.unwrap(), 1);
        let stored = content::find_project_by_slug(&pool, "demo-repo").await.unwrap().unwrap();
        assert_eq!(stored.full_description, "# Demo v2...");
        assert_eq!(stored.github_url.as_deref(), Some("https://github.com/octo/Demo_Repo"));
    }

    #[tokio::test]
    async fn test_sync_readme_fills_empty_title() {
        let pool = connect_in_memory().await.unwrap();
        let provider = ScriptedProvider::new(
            "a",
            Script::Reply(r#"{"title": "", "summary": "s", "category": "Backend"}"#.to_string()),
        );
        let ai = AiService::new(
            chain_of(&[provider], Duration::from_secs(5)),
            AiConfig::default(),
            ProfileConfig::default(),
        );

        let (_, project) = sync_readme(&pool, &ai, "readme", "api-gateway", None).await.unwrap();
        assert_eq!(project.title, "api-gateway");
        assert_eq!(project.category, "Backend");
    }
}
