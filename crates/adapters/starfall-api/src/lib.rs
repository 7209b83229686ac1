pub mod client;
pub mod config;
pub mod submitter;

pub use client::{ApiClient, ClientError, LeaderboardView};
pub use config::ApiClientConfig;
pub use submitter::RemoteSubmitter;
