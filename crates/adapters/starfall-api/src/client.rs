use std::time::Duration;

use reqwest::Url;

use starfall_core::score::{
    INTEGRITY_HEADER, INTEGRITY_VALUE, LeaderboardEntry, ScoreSubmission, SubmitOutcome,
    SubmitResponse,
};

use crate::config::ApiClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid service url: {0}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service answered with an error body.
    #[error("rejected ({status}): {reason}")]
    Rejected { status: u16, reason: String },
    #[error("unexpected response body")]
    UnexpectedResponse,
}

/// What the leaderboard panel should show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeaderboardView {
    /// Nothing fetched yet.
    #[default]
    Loading,
    Entries(Vec<LeaderboardEntry>),
    /// The last fetch failed. No stale rows are kept.
    Unavailable,
}

/// Client for the score submission and leaderboard endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    submit_url: Url,
    leaderboard_url: Url,
    origin: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::from_config(ApiClientConfig {
            base_url: base_url.to_string(),
            ..ApiClientConfig::default()
        })
    }

    pub fn from_config(config: ApiClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
        };
        let submit_url = join("/api/submit-score")?;
        let leaderboard_url = join("/api/leaderboard")?;
        let origin = config
            .origin
            .unwrap_or_else(|| base.origin().ascii_serialization());

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            submit_url,
            leaderboard_url,
            origin,
        })
    }

    /// POST one run to the service.
    pub async fn submit_score(
        &self,
        submission: &ScoreSubmission,
    ) -> Result<SubmitOutcome, ClientError> {
        let resp = self
            .client
            .post(self.submit_url.clone())
            .header("origin", &self.origin)
            .header(INTEGRITY_HEADER, INTEGRITY_VALUE)
            .json(submission)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        let body: SubmitResponse = resp
            .json()
            .await
            .map_err(|_| ClientError::UnexpectedResponse)?;
        body.outcome().ok_or(ClientError::UnexpectedResponse)
    }

    /// Fetch the top rows. Any failure reads as [`LeaderboardView::Unavailable`].
    pub async fn fetch_leaderboard(&self) -> LeaderboardView {
        match self.try_fetch_leaderboard().await {
            Ok(rows) => LeaderboardView::Entries(rows),
            Err(e) => {
                tracing::warn!(error = %e, "Leaderboard fetch failed");
                LeaderboardView::Unavailable
            },
        }
    }

    async fn try_fetch_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let resp = self.client.get(self.leaderboard_url.clone()).send().await?;
        if !resp.status().is_success() {
            return Err(rejection(resp).await);
        }
        resp.json().await.map_err(|_| ClientError::UnexpectedResponse)
    }
}

/// Turn an error response into [`ClientError::Rejected`], reading the
/// `{error}` body when there is one.
async fn rejection(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let reason = resp
        .json::<SubmitResponse>()
        .await
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| status.to_string());
    ClientError::Rejected {
        status: status.as_u16(),
        reason,
    }
}
