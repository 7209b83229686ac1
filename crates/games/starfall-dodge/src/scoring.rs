use serde::{Deserialize, Serialize};

/// Score and running time for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreTracker {
    score: u32,
    elapsed: f32,
}

impl ScoreTracker {
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Count a coin pickup and return the new score.
    pub fn add_coin(&mut self) -> u32 {
        self.score = self.score.saturating_add(1);
        self.score
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }
}
