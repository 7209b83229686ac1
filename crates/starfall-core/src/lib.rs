pub mod handle;
pub mod powerup;
pub mod preferences;
pub mod score;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::sync::{Arc, Mutex};

    use crate::score::{ScoreSubmission, ScoreSubmitter};

    /// Build a submission with the given fields.
    pub fn make_submission(handle: &str, score: u32, duration: f64) -> ScoreSubmission {
        ScoreSubmission {
            handle: handle.to_string(),
            score,
            duration,
        }
    }

    /// `ScoreSubmitter` that records every call for later inspection.
    #[derive(Clone, Default)]
    pub struct RecordingSubmitter {
        calls: Arc<Mutex<Vec<ScoreSubmission>>>,
    }

    impl RecordingSubmitter {
        pub fn new() -> Self {
            Self::default()
        }

        /// All submissions received so far, oldest first.
        pub fn calls(&self) -> Vec<ScoreSubmission> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }
    }

    impl ScoreSubmitter for RecordingSubmitter {
        fn submit(&self, submission: ScoreSubmission) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(submission);
            }
        }
    }
}
