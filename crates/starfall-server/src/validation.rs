use serde_json::Value;

use starfall_core::handle::{is_valid_handle, normalize_handle};
use starfall_core::score::ScoreSubmission;

use crate::config::ScoreRules;

/// Largest integer an IEEE double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Why a submission body was refused. The message is the wire reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing handle or score")]
    Missing,
    #[error("invalid handle format")]
    BadHandle,
    #[error("bad duration")]
    BadDuration,
    #[error("bad score")]
    BadScore,
    #[error("guardrail exceeded")]
    Guardrail,
}

/// Submission fields as they arrived, before any checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSubmission {
    pub handle: Option<String>,
    pub score: Option<f64>,
    pub duration: Option<f64>,
}

/// Numbers may arrive as JSON numbers or numeric strings. A blank string
/// counts as zero.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() { Some(0.0) } else { s.parse().ok() }
        },
        _ => None,
    }
}

/// Handles may arrive as bare numbers, which read as their decimal text.
/// Zero and every non-scalar read as missing.
fn as_handle(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

impl RawSubmission {
    /// Lenient parse: a body that is not a JSON object reads as empty.
    pub fn from_body(body: &[u8]) -> Self {
        let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        Self {
            handle: map.get("handle").and_then(as_handle),
            score: map.get("score").and_then(as_number),
            duration: map.get("duration").and_then(as_number),
        }
    }
}

/// Run every plausibility rule in order and return the normalized submission.
pub fn validate(raw: &RawSubmission, rules: &ScoreRules) -> Result<ScoreSubmission, ValidationError> {
    let handle = raw
        .handle
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or(ValidationError::Missing)?;
    let score = raw
        .score
        .filter(|s| s.is_finite())
        .ok_or(ValidationError::Missing)?;

    if !is_valid_handle(handle) {
        return Err(ValidationError::BadHandle);
    }

    let duration = raw.duration.ok_or(ValidationError::BadDuration)?;
    if !duration.is_finite()
        || duration <= 0.0
        || duration < rules.min_duration_secs
        || duration > rules.max_duration_secs
    {
        return Err(ValidationError::BadDuration);
    }

    if score.fract() != 0.0
        || score.abs() > MAX_SAFE_INTEGER
        || score < 0.0
        || score > f64::from(rules.max_score)
    {
        return Err(ValidationError::BadScore);
    }
    let score = score as u32;

    if u64::from(score) > rules.guardrail(duration) {
        return Err(ValidationError::Guardrail);
    }

    Ok(ScoreSubmission {
        handle: normalize_handle(handle),
        score,
        duration,
    })
}
