use serde::{Deserialize, Serialize};

/// Runs shorter than this are never submitted by the client and are rejected
/// by the server.
pub const MIN_SUBMIT_DURATION_SECS: f64 = 3.0;

/// Maximum number of rows returned by the leaderboard query.
pub const LEADERBOARD_LIMIT: usize = 20;

/// Header the game client sets on every submission so the service can tell
/// its own client apart from ad-hoc scripts.
pub const INTEGRITY_HEADER: &str = "x-requested-with";

/// Expected value of [`INTEGRITY_HEADER`].
pub const INTEGRITY_VALUE: &str = "dragonballer-game";

/// Final result of one run, as posted to the score service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub handle: String,
    pub score: u32,
    /// Run length in seconds.
    pub duration: f64,
}

/// What the service did with an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// First score for this handle.
    Inserted,
    /// Beat the stored best.
    Updated,
    /// Did not beat the stored best; nothing written.
    Unchanged,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// JSON body returned by `POST /api/submit-score`.
///
/// Success is `{"ok":true,"inserted":true}` (or `updated` / `unchanged`);
/// failure is `{"error":"<reason>"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default, skip_serializing_if = "is_false")]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inserted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub updated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unchanged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitResponse {
    pub fn outcome(&self) -> Option<SubmitOutcome> {
        if !self.ok {
            return None;
        }
        if self.inserted {
            Some(SubmitOutcome::Inserted)
        } else if self.updated {
            Some(SubmitOutcome::Updated)
        } else if self.unchanged {
            Some(SubmitOutcome::Unchanged)
        } else {
            None
        }
    }
}

impl From<SubmitOutcome> for SubmitResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            ok: true,
            inserted: outcome == SubmitOutcome::Inserted,
            updated: outcome == SubmitOutcome::Updated,
            unchanged: outcome == SubmitOutcome::Unchanged,
            error: None,
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub handle: String,
    pub score: u32,
    /// RFC 3339 creation time of the row. Earlier rows win score ties.
    pub created_at: String,
}

/// Collaborator invoked by the game state machine when a run ends.
///
/// Implementations must return immediately; the result of the submission
/// has no bearing on the simulation.
pub trait ScoreSubmitter: Send {
    fn submit(&self, submission: ScoreSubmission);
}
