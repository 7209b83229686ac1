use serde::Deserialize;

/// Top-level server configuration, loaded from `starfall.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    /// Origins allowed to submit scores. Empty means "derive from the
    /// request's `Host` header".
    pub allowed_origins: Vec<String>,
    pub store: StoreConfig,
    pub limits: LimitsConfig,
    pub rules: ScoreRules,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            web_root: "web".to_string(),
            allowed_origins: Vec::new(),
            store: StoreConfig::default(),
            limits: LimitsConfig::default(),
            rules: ScoreRules::default(),
        }
    }
}

/// Where scores are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local table; lost on restart.
    #[default]
    Memory,
    /// Hosted PostgREST endpoint (e.g. Supabase).
    Postgrest,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Postgrest => "postgrest",
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgrest" | "supabase" => Ok(StoreBackend::Postgrest),
            other => Err(format!("unknown store backend: {other}")),
        }
    }
}

/// Score storage section of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: Option<String>,
    pub service_key: Option<String>,
    pub table: String,
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            url: None,
            service_key: None,
            table: "scores".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Requests allowed per client: `burst` at once, refilled at `per_sec`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Budget {
    pub burst: u32,
    pub per_sec: f64,
}

/// Per-IP request budgets for the API.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// `POST /api/submit-score`. A run lasts seconds, so this stays small.
    pub submit: Budget,
    /// `GET /api/leaderboard`, polled by the title and game-over screens.
    pub leaderboard: Budget,
    /// Clients idle this long are forgotten.
    pub idle_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            submit: Budget {
                burst: 5,
                per_sec: 0.2,
            },
            leaderboard: Budget {
                burst: 20,
                per_sec: 2.0,
            },
            idle_secs: 600,
        }
    }
}

/// Plausibility rules applied to every submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoreRules {
    pub max_score: u32,
    pub min_duration_secs: f64,
    pub max_duration_secs: f64,
    /// Any score up to this is plausible regardless of duration.
    pub guardrail_floor: u32,
    /// Plausible coins per whole second of play.
    pub guardrail_per_sec: u32,
}

impl Default for ScoreRules {
    fn default() -> Self {
        Self {
            max_score: 158,
            min_duration_secs: starfall_core::score::MIN_SUBMIT_DURATION_SECS,
            max_duration_secs: 1000.0,
            guardrail_floor: 10,
            guardrail_per_sec: 5,
        }
    }
}

impl ScoreRules {
    /// Highest score plausible for a run of `duration` seconds.
    pub fn guardrail(&self, duration: f64) -> u64 {
        let whole_secs = duration.floor().max(0.0) as u64;
        u64::from(self.guardrail_floor).max(whole_secs * u64::from(self.guardrail_per_sec))
    }
}

impl ServerConfig {
    /// Check the configuration, returning every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            errors.push(format!(
                "listen_addr is not a valid socket address: {}",
                self.listen_addr
            ));
        }
        for (name, budget) in [
            ("submit", &self.limits.submit),
            ("leaderboard", &self.limits.leaderboard),
        ] {
            if budget.burst == 0 {
                errors.push(format!("limits.{name}.burst must be > 0"));
            }
            if budget.per_sec.is_nan() || budget.per_sec < 0.0 {
                errors.push(format!("limits.{name}.per_sec must be >= 0"));
            }
        }
        if self.rules.min_duration_secs > self.rules.max_duration_secs {
            errors.push("rules.min_duration_secs exceeds rules.max_duration_secs".to_string());
        }

        // Not fatal: requests report the store as unconfigured.
        if self.store.backend == StoreBackend::Postgrest
            && (self.store.url.is_none() || self.store.service_key.is_none())
        {
            tracing::warn!("postgrest store selected without url or service key");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Load config from `starfall.toml` if it exists, then apply env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("starfall.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from starfall.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse starfall.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No starfall.toml found, using defaults");
                ServerConfig::default()
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Apply overrides from an environment lookup.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("STARFALL_LISTEN_ADDR")
            && !addr.is_empty()
        {
            self.listen_addr = addr;
        }
        if let Some(root) = var("STARFALL_WEB_ROOT")
            && !root.is_empty()
        {
            self.web_root = root;
        }
        if let Some(origins) = var("ALLOWED_ORIGINS") {
            let parsed: Vec<String> = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
            if !parsed.is_empty() {
                self.allowed_origins = parsed;
            }
        }
        if let Some(url) = var("SUPABASE_URL")
            && !url.is_empty()
        {
            self.store.url = Some(url);
        }
        if let Some(key) = var("SUPABASE_SERVICE_ROLE_KEY")
            && !key.is_empty()
        {
            self.store.service_key = Some(key);
        }
        if let Some(val) = var("STARFALL_STORE_BACKEND") {
            match val.parse::<StoreBackend>() {
                Ok(backend) => self.store.backend = backend,
                Err(e) => tracing::warn!("Ignoring STARFALL_STORE_BACKEND: {e}"),
            }
        }
        for (prefix, budget) in [
            ("STARFALL_SUBMIT", &mut self.limits.submit),
            ("STARFALL_LEADERBOARD", &mut self.limits.leaderboard),
        ] {
            if let Some(val) = var(&format!("{prefix}_BURST"))
                && let Ok(n) = val.parse::<u32>()
            {
                budget.burst = n;
            }
            if let Some(val) = var(&format!("{prefix}_PER_SEC"))
                && let Ok(n) = val.parse::<f64>()
            {
                budget.per_sec = n;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
        assert_eq!(cfg.web_root, "web");
        assert!(cfg.allowed_origins.is_empty());
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.store.table, "scores");
        assert_eq!(cfg.rules.max_score, 158);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"
web_root = "/var/www"
allowed_origins = ["https://dodge.example"]

[store]
backend = "postgrest"
url = "https://xyz.supabase.co"
table = "scores_v2"

[limits.submit]
burst = 3
per_sec = 0.1
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.allowed_origins, vec!["https://dodge.example"]);
        assert_eq!(cfg.store.backend, StoreBackend::Postgrest);
        assert_eq!(cfg.store.table, "scores_v2");
        assert!(cfg.store.service_key.is_none());
        assert_eq!(
            cfg.limits.submit,
            Budget {
                burst: 3,
                per_sec: 0.1
            }
        );
        assert_eq!(cfg.limits.leaderboard, LimitsConfig::default().leaderboard);
        assert_eq!(cfg.rules.max_duration_secs, 1000.0);
    }

    #[test]
    fn env_overrides_apply() {
        let mut cfg = ServerConfig::default();
        cfg.apply_env(env(&[
            ("STARFALL_LISTEN_ADDR", "127.0.0.1:3000"),
            ("ALLOWED_ORIGINS", " https://a.example , ,https://b.example"),
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "secret"),
            ("STARFALL_STORE_BACKEND", "postgrest"),
            ("STARFALL_SUBMIT_BURST", "2"),
            ("STARFALL_LEADERBOARD_PER_SEC", "0.5"),
        ]));
        assert_eq!(cfg.listen_addr, "127.0.0.1:3000");
        assert_eq!(
            cfg.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(cfg.store.url.as_deref(), Some("https://xyz.supabase.co"));
        assert_eq!(cfg.store.service_key.as_deref(), Some("secret"));
        assert_eq!(cfg.store.backend, StoreBackend::Postgrest);
        assert_eq!(cfg.limits.submit.burst, 2);
        assert_eq!(cfg.limits.submit.per_sec, 0.2);
        assert_eq!(cfg.limits.leaderboard.per_sec, 0.5);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut cfg = ServerConfig::default();
        cfg.apply_env(env(&[
            ("STARFALL_STORE_BACKEND", "mongodb"),
            ("STARFALL_SUBMIT_BURST", "lots"),
            ("ALLOWED_ORIGINS", " , "),
        ]));
        assert_eq!(cfg.store.backend, StoreBackend::Memory);
        assert_eq!(cfg.limits.submit.burst, 5);
        assert!(cfg.allowed_origins.is_empty());
    }

    #[test]
    fn validate_accepts_default() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_collects_errors() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            limits: LimitsConfig {
                leaderboard: Budget {
                    burst: 0,
                    per_sec: -1.0,
                },
                ..LimitsConfig::default()
            },
            ..ServerConfig::default()
        };
        let errors = cfg.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&"limits.leaderboard.burst must be > 0".to_string()));
    }

    #[test]
    fn guardrail_floor_and_slope() {
        let rules = ScoreRules::default();
        assert_eq!(rules.guardrail(0.5), 10);
        assert_eq!(rules.guardrail(2.9), 10);
        assert_eq!(rules.guardrail(20.0), 100);
        assert_eq!(rules.guardrail(20.99), 100);
        assert_eq!(rules.guardrail(31.7), 155);
    }
}
