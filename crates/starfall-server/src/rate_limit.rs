//! Per-client request budgets for the API routes.
//!
//! Submissions and leaderboard reads draw from separate budgets so a page
//! polling the leaderboard never eats into the allowance for posting a run.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::Mutex;

use crate::config::{Budget, LimitsConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Which budget a request is charged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRoute {
    Submit,
    Leaderboard,
}

impl ApiRoute {
    fn label(self) -> &'static str {
        match self {
            ApiRoute::Submit => "submit",
            ApiRoute::Leaderboard => "leaderboard",
        }
    }
}

#[derive(Debug)]
struct Allowance {
    remaining: f64,
    touched: Instant,
}

impl Allowance {
    fn full(budget: &Budget, now: Instant) -> Self {
        Self {
            remaining: f64::from(budget.burst),
            touched: now,
        }
    }

    /// Credit the time since the last request, then try to take one request.
    fn spend(&mut self, budget: &Budget, now: Instant) -> bool {
        let earned = now.duration_since(self.touched).as_secs_f64() * budget.per_sec;
        self.remaining = (self.remaining + earned).min(f64::from(budget.burst));
        self.touched = now;
        if self.remaining < 1.0 {
            return false;
        }
        self.remaining -= 1.0;
        true
    }
}

/// One [`Budget`] applied independently to every client address.
pub struct ClientBudgets {
    budget: Budget,
    clients: Mutex<HashMap<IpAddr, Allowance>>,
}

impl ClientBudgets {
    pub fn new(budget: Budget) -> Self {
        Self {
            budget,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Charge one request to `ip`. `false` when its allowance is used up.
    pub async fn try_spend(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        clients
            .entry(ip)
            .or_insert_with(|| Allowance::full(&self.budget, now))
            .spend(&self.budget, now)
    }

    /// Drop clients not seen within `max_age`. Returns how many remain.
    pub async fn forget_idle(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        clients.retain(|_, a| now.duration_since(a.touched) < max_age);
        clients.len()
    }
}

/// The submission and leaderboard budgets.
pub struct ApiLimits {
    submit: ClientBudgets,
    leaderboard: ClientBudgets,
}

impl ApiLimits {
    pub fn new(config: &LimitsConfig) -> Self {
        Self {
            submit: ClientBudgets::new(config.submit),
            leaderboard: ClientBudgets::new(config.leaderboard),
        }
    }

    pub fn budgets(&self, route: ApiRoute) -> &ClientBudgets {
        match route {
            ApiRoute::Submit => &self.submit,
            ApiRoute::Leaderboard => &self.leaderboard,
        }
    }

    pub async fn forget_idle(&self, max_age: Duration) {
        let submit = self.submit.forget_idle(max_age).await;
        let leaderboard = self.leaderboard.forget_idle(max_age).await;
        tracing::debug!(submit, leaderboard, "Pruned idle rate-limit clients");
    }
}

/// Requests served without connection info (in-process tests) share the
/// loopback allowance.
fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

async fn charge(state: &AppState, route: ApiRoute, request: Request, next: Next) -> Response {
    let ip = client_ip(&request);
    if !state.limits.budgets(route).try_spend(ip).await {
        tracing::warn!(%ip, route = route.label(), "Rate limited");
        return AppError::TooManyRequests.into_response();
    }
    next.run(request).await
}

/// Route layer for `POST /api/submit-score`.
pub async fn limit_submissions(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    charge(&state, ApiRoute::Submit, request, next).await
}

/// Route layer for `GET /api/leaderboard`.
pub async fn limit_leaderboard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    charge(&state, ApiRoute::Leaderboard, request, next).await
}

/// Periodically drop idle clients so the maps don't grow without bound.
pub fn spawn_cleanup(state: AppState) {
    let max_age = Duration::from_secs(state.config.limits.idle_secs.max(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(max_age);
        loop {
            interval.tick().await;
            state.limits.forget_idle(max_age).await;
        }
    });
}
