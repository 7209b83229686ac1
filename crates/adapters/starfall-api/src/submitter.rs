use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;

use starfall_core::score::{ScoreSubmission, ScoreSubmitter};

use crate::client::{ApiClient, LeaderboardView};

/// [`ScoreSubmitter`] that posts runs in the background.
///
/// Each submission runs on its own task: post the score, then refetch the
/// leaderboard and publish it to every [`watch::Receiver`] handed out by
/// [`RemoteSubmitter::subscribe`]. The game thread never waits on the network.
pub struct RemoteSubmitter {
    client: ApiClient,
    runtime: Handle,
    board: Arc<watch::Sender<LeaderboardView>>,
}

impl RemoteSubmitter {
    pub fn new(client: ApiClient, runtime: Handle) -> Self {
        let (board, _) = watch::channel(LeaderboardView::default());
        Self {
            client,
            runtime,
            board: Arc::new(board),
        }
    }

    /// Latest leaderboard view, updated after every submission or refresh.
    pub fn subscribe(&self) -> watch::Receiver<LeaderboardView> {
        self.board.subscribe()
    }

    /// Refetch the leaderboard without submitting anything.
    pub fn refresh(&self) {
        let client = self.client.clone();
        let board = Arc::clone(&self.board);
        self.runtime.spawn(async move {
            board.send_replace(client.fetch_leaderboard().await);
        });
    }
}

impl ScoreSubmitter for RemoteSubmitter {
    fn submit(&self, submission: ScoreSubmission) {
        let client = self.client.clone();
        let board = Arc::clone(&self.board);
        self.runtime.spawn(async move {
            match client.submit_score(&submission).await {
                Ok(outcome) => tracing::info!(
                    handle = %submission.handle,
                    score = submission.score,
                    ?outcome,
                    "Score submitted"
                ),
                Err(e) => tracing::warn!(
                    handle = %submission.handle,
                    score = submission.score,
                    error = %e,
                    "Score submission failed"
                ),
            }
            board.send_replace(client.fetch_leaderboard().await);
        });
    }
}
