use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Json;

use starfall_core::score::{LEADERBOARD_LIMIT, LeaderboardEntry, SubmitResponse};

use crate::error::AppError;
use crate::origin;
use crate::state::AppState;
use crate::validation::{RawSubmission, validate};

/// POST /api/submit-score: record a run if it passes every check.
pub async fn submit_score(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    if let Err(e) = origin::check_request(&headers, &state.config.allowed_origins) {
        tracing::info!(reason = %e, "Submission refused");
        return Err(e.into());
    }

    let raw = RawSubmission::from_body(&body);
    let submission = match validate(&raw, &state.config.rules) {
        Ok(s) => s,
        Err(e) => {
            tracing::info!(reason = %e, handle = ?raw.handle, "Submission rejected");
            return Err(e.into());
        },
    };

    let outcome = state
        .store
        .submit(&submission.handle, submission.score)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Score store write failed");
            AppError::from(e)
        })?;

    tracing::info!(
        handle = %submission.handle,
        score = submission.score,
        duration = submission.duration,
        ?outcome,
        "Score submitted"
    );
    Ok(Json(SubmitResponse::from(outcome)))
}

/// GET /api/leaderboard: top scores, best first.
pub async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let rows = state
        .store
        .leaderboard(LEADERBOARD_LIMIT)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Leaderboard fetch failed");
            AppError::from(e)
        })?;
    Ok(Json(rows))
}
