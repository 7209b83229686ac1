//! Best-score-per-handle storage.
//!
//! Each handle owns one row. A submission inserts the row, raises its score
//! when strictly higher, or leaves it alone. The leaderboard orders rows by
//! score descending, then by creation time ascending.

use std::cmp::Reverse;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::RwLock;

use starfall_core::score::{LeaderboardEntry, SubmitOutcome};
use starfall_core::time::timestamp_now;

use crate::config::{StoreBackend, StoreConfig};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store not configured")]
    NotConfigured,
    #[error("db select failed: {0}")]
    Select(String),
    #[error("db insert failed: {0}")]
    Insert(String),
    #[error("db update failed: {0}")]
    Update(String),
    #[error("db fetch failed: {0}")]
    Fetch(String),
}

impl StoreError {
    /// Short reason returned to clients; details stay in the logs.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NotConfigured => "store not configured",
            Self::Select(_) => "db select failed",
            Self::Insert(_) => "db insert failed",
            Self::Update(_) => "db update failed",
            Self::Fetch(_) => "db fetch failed",
        }
    }
}

/// Score storage selected by configuration.
pub enum ScoreStore {
    Memory(MemoryStore),
    Postgrest(PostgrestStore),
    /// Remote backend selected but credentials are missing.
    Unconfigured,
}

impl ScoreStore {
    pub fn from_config(config: &StoreConfig) -> Self {
        match config.backend {
            StoreBackend::Memory => Self::Memory(MemoryStore::new()),
            StoreBackend::Postgrest => {
                let (Some(url), Some(key)) = (&config.url, &config.service_key) else {
                    tracing::warn!("PostgREST store missing url or service key");
                    return Self::Unconfigured;
                };
                match PostgrestStore::new(
                    url,
                    key,
                    &config.table,
                    Duration::from_secs(config.request_timeout_secs),
                ) {
                    Ok(store) => Self::Postgrest(store),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to build PostgREST client");
                        Self::Unconfigured
                    },
                }
            },
        }
    }

    /// The backend actually serving requests, if any.
    pub fn backend(&self) -> Option<StoreBackend> {
        match self {
            Self::Memory(_) => Some(StoreBackend::Memory),
            Self::Postgrest(_) => Some(StoreBackend::Postgrest),
            Self::Unconfigured => None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend().map_or("unconfigured", |b| b.name())
    }

    /// Record `score` for an already-normalized `handle`.
    pub async fn submit(&self, handle: &str, score: u32) -> Result<SubmitOutcome, StoreError> {
        match self {
            Self::Memory(s) => Ok(s.submit(handle, score).await),
            Self::Postgrest(s) => s.submit(handle, score).await,
            Self::Unconfigured => Err(StoreError::NotConfigured),
        }
    }

    /// Top `limit` rows.
    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        match self {
            Self::Memory(s) => Ok(s.leaderboard(limit).await),
            Self::Postgrest(s) => s.leaderboard(limit).await,
            Self::Unconfigured => Err(StoreError::NotConfigured),
        }
    }
}

#[derive(Debug, Clone)]
struct ScoreRow {
    /// Insertion sequence; breaks ties between rows created in the same second.
    id: u64,
    handle: String,
    score: u32,
    created_at: String,
}

/// Process-local score table.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<ScoreRow>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn submit(&self, handle: &str, score: u32) -> SubmitOutcome {
        let mut rows = self.rows.write().await;
        if let Some(row) = rows.iter_mut().find(|r| r.handle == handle) {
            if score > row.score {
                row.score = score;
                return SubmitOutcome::Updated;
            }
            return SubmitOutcome::Unchanged;
        }
        let id = rows.len() as u64 + 1;
        rows.push(ScoreRow {
            id,
            handle: handle.to_string(),
            score,
            created_at: timestamp_now(),
        });
        SubmitOutcome::Inserted
    }

    pub async fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let mut rows = self.rows.read().await.clone();
        rows.sort_by_key(|r| (Reverse(r.score), r.id));
        rows.into_iter()
            .take(limit)
            .map(|r| LeaderboardEntry {
                handle: r.handle,
                score: r.score,
                created_at: r.created_at,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct ExistingRow {
    id: serde_json::Value,
    score: u32,
}

/// Scores table behind a PostgREST endpoint, authenticated with a service key.
pub struct PostgrestStore {
    client: reqwest::Client,
    table_url: String,
    service_key: String,
}

impl PostgrestStore {
    pub fn new(
        base_url: &str,
        service_key: &str,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            table_url: format!("{}/rest/v1/{table}", base_url.trim_end_matches('/')),
            service_key: service_key.to_string(),
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Read the body of a failed response for the logs.
    async fn failure(resp: reqwest::Response) -> String {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        format!("{status}: {text}")
    }

    pub async fn submit(&self, handle: &str, score: u32) -> Result<SubmitOutcome, StoreError> {
        let filter = format!("eq.{handle}");
        let resp = self
            .request(reqwest::Method::GET)
            .query(&[("handle", filter.as_str()), ("select", "id,score"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| StoreError::Select(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(StoreError::Select(Self::failure(resp).await));
        }
        let existing: Vec<ExistingRow> = resp
            .json()
            .await
            .map_err(|e| StoreError::Select(e.to_string()))?;

        let Some(current) = existing.into_iter().next() else {
            let resp = self
                .request(reqwest::Method::POST)
                .header("Prefer", "return=minimal")
                .json(&serde_json::json!({ "handle": handle, "score": score }))
                .send()
                .await
                .map_err(|e| StoreError::Insert(e.to_string()))?;
            if !resp.status().is_success() {
                return Err(StoreError::Insert(Self::failure(resp).await));
            }
            return Ok(SubmitOutcome::Inserted);
        };

        if score <= current.score {
            return Ok(SubmitOutcome::Unchanged);
        }

        let id = match &current.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let id_filter = format!("eq.{id}");
        let resp = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", id_filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({ "score": score }))
            .send()
            .await
            .map_err(|e| StoreError::Update(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(StoreError::Update(Self::failure(resp).await));
        }
        Ok(SubmitOutcome::Updated)
    }

    pub async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let limit = limit.to_string();
        let resp = self
            .request(reqwest::Method::GET)
            .query(&[
                ("select", "handle,score,created_at"),
                ("order", "score.desc"),
                ("order", "created_at.asc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| StoreError::Fetch(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(StoreError::Fetch(Self::failure(resp).await));
        }
        resp.json()
            .await
            .map_err(|e| StoreError::Fetch(e.to_string()))
    }
}
