//! Visitor analytics.
//!
//! Events are append-only rows with a free-form type (`visit`, `ai_chat`,
//! `modal_open`, ...) and arbitrary JSON metadata. Client addresses are never
//! stored in clear: only their SHA-256 hex digest is kept.

use anyhow::{bail, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::AnalyticsEvent;

/// Window covered by [`daily_stats`] on the admin surface.
pub const STATS_WINDOW_DAYS: i64 = 7;

/// Event counts for one UTC day, serialized as `{"date": .., "<type>": n}`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyStats {
    pub date: String,
    #[serde(flatten)]
    pub counts: BTreeMap<String, i64>,
}

pub fn hash_ip(ip: &str) -> String {
    hex::encode(Sha256::digest(ip.as_bytes()))
}

/// Records one event. `ip` is hashed before it is stored.
pub async fn log_event(
    pool: &SqlitePool,
    event_type: &str,
    metadata: &serde_json::Value,
    ip: Option<&str>,
) -> Result<AnalyticsEvent> {
    let now = chrono::Utc::now().timestamp();
    insert_event(pool, event_type, metadata, ip.map(hash_ip), now).await
}

async fn insert_event(
    pool: &SqlitePool,
    event_type: &str,
    metadata: &serde_json::Value,
    ip_hash: Option<String>,
    created_at: i64,
) -> Result<AnalyticsEvent> {
    let event_type = event_type.trim();
    if event_type.is_empty() {
        bail!("eventType is required");
    }

    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO analytics_events (id, event_type, metadata_json, ip_hash, created_at) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(event_type)
    .bind(metadata.to_string())
    .bind(&ip_hash)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(AnalyticsEvent {
        id,
        event_type: event_type.to_string(),
        metadata: metadata.clone(),
        ip_hash,
        created_at,
    })
}

pub async fn count_events(pool: &SqlitePool, event_type: &str) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM analytics_events WHERE event_type = ?")
            .bind(event_type)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

/// Per-day counts of each event type over the last `days` days, oldest day
/// first. Days without events are omitted.
pub async fn daily_stats(pool: &SqlitePool, days: i64) -> Result<Vec<DailyStats>> {
    let since = chrono::Utc::now().timestamp() - days * 86_400;
    let rows = sqlx::query(
        r#"
        SELECT date(created_at, 'unixepoch') AS day, event_type, COUNT(*) AS n
        FROM analytics_events
        WHERE created_at >= ?
        GROUP BY day, event_type
        ORDER BY day ASC
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    let mut by_day: BTreeMap<String, BTreeMap<String, i64>> = BTreeMap::new();
    for row in &rows {
        let day: String = row.get("day");
        let event_type: String = row.get("event_type");
        let n: i64 = row.get("n");
        by_day.entry(day).or_default().insert(event_type, n);
    }

    Ok(by_day
        .into_iter()
        .map(|(date, counts)| DailyStats { date, counts })
        .collect())
}
