/// Connection settings for the score service client.
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Service root, e.g. `https://dodge.example`.
    pub base_url: String,
    /// `Origin` sent with submissions. Derived from `base_url` when unset.
    pub origin: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            origin: None,
            timeout_secs: 10,
            user_agent: "starfall-api/0.1".to_string(),
        }
    }
}
