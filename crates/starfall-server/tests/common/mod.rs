use std::net::SocketAddr;
use std::time::Duration;

use starfall_server::build_app;
use starfall_server::config::{Budget, LimitsConfig, ServerConfig};

/// Budgets no test comes close to spending.
pub fn generous_limits() -> LimitsConfig {
    let roomy = Budget {
        burst: 1000,
        per_sec: 100.0,
    };
    LimitsConfig {
        submit: roomy,
        leaderboard: roomy,
        ..LimitsConfig::default()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with an in-memory store and a generous rate limit.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig {
            limits: generous_limits(),
            ..ServerConfig::default()
        })
        .await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config);

        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The page origin the server derives from its own `Host`.
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// POST a submission the way the game page does.
pub async fn submit(
    server: &TestServer,
    body: serde_json::Value,
) -> (reqwest::StatusCode, serde_json::Value) {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/submit-score", server.base_url()))
        .header("origin", server.origin())
        .header("x-requested-with", "dragonballer-game")
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

pub async fn leaderboard(server: &TestServer) -> Vec<serde_json::Value> {
    reqwest::get(format!("{}/api/leaderboard", server.base_url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}
