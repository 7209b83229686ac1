use serde::{Deserialize, Serialize};

/// A low-rate background spawn roll, made once per `interval` seconds of
/// running time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrickleRule {
    pub interval: f32,
    pub chance: f32,
}

/// Data-driven tuning for the dodge game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeConfig {
    /// Playfield width in pixels.
    pub playfield_width: f32,
    /// Playfield height in pixels.
    pub playfield_height: f32,

    pub player_width: f32,
    pub player_height: f32,
    /// Horizontal speed (px/s) at full input.
    pub player_speed: f32,
    /// Distance from the playfield bottom to the player's top edge.
    pub player_bottom_offset: f32,
    /// Gap kept between the player and either side wall.
    pub player_edge_margin: f32,

    /// Upper bound on a single tick's Δt (seconds).
    pub max_dt: f32,

    pub coin_radius: f32,
    pub coin_base_speed: f32,
    /// Extra coin fall speed per second of difficulty.
    pub coin_difficulty_speed: f32,
    pub coin_spawn_y: f32,
    pub coin_exit_margin: f32,

    pub meteor_radius_min: f32,
    /// Meteor radius is `min + U(0, range)`.
    pub meteor_radius_range: f32,
    pub meteor_speed_jitter: f32,
    /// Extra meteor spawn speed per second of difficulty.
    pub meteor_difficulty_speed: f32,
    /// Cosmetic rotation rate (rad/s).
    pub meteor_spin_rate: f32,
    pub meteor_spawn_y: f32,
    pub meteor_exit_margin: f32,
    pub meteor_base_speed: f32,
    /// Base speed added every `meteor_speed_step_interval` seconds.
    pub meteor_speed_step: f32,
    pub meteor_speed_step_interval: f32,

    pub powerup_radius: f32,
    pub powerup_fall_speed: f32,
    pub powerup_spawn_y: f32,
    pub powerup_exit_margin: f32,

    /// Spawns land in `[margin, width - margin]`.
    pub spawn_edge_margin: f32,
    /// Rolls below this spawn a meteor.
    pub meteor_threshold: f32,
    /// Rolls in `[meteor_threshold, coin_threshold)` spawn a coin; the rest a power-up.
    pub coin_threshold: f32,
    pub spawn_interval_base: f32,
    pub spawn_interval_difficulty: f32,
    pub spawn_interval_floor: f32,
    pub spawn_interval_jitter: f32,

    /// Difficulty timer ceiling (seconds).
    pub difficulty_cap: f32,

    /// Fall-speed multiplier while `slow` is active.
    pub slow_factor: f32,
    pub magnet_radius: f32,
    pub magnet_strength: f32,

    /// Enable the background trickle spawners.
    pub ambient_spawns: bool,
    pub ambient_coin: TrickleRule,
    pub ambient_powerup: TrickleRule,
    pub ambient_meteor: TrickleRule,
    pub ambient_meteor_speed_jitter: f32,
    pub ambient_meteor_difficulty_speed: f32,
}

impl Default for DodgeConfig {
    fn default() -> Self {
        Self {
            playfield_width: 600.0,
            playfield_height: 1100.0,

            player_width: 35.0,
            player_height: 72.0,
            player_speed: 360.0,
            player_bottom_offset: 120.0,
            player_edge_margin: 8.0,

            max_dt: 0.05,

            coin_radius: 24.0,
            coin_base_speed: 60.0,
            coin_difficulty_speed: 6.0,
            coin_spawn_y: -20.0,
            coin_exit_margin: 40.0,

            meteor_radius_min: 18.0,
            meteor_radius_range: 26.0,
            meteor_speed_jitter: 80.0,
            meteor_difficulty_speed: 8.0,
            meteor_spin_rate: 0.45,
            meteor_spawn_y: -40.0,
            meteor_exit_margin: 80.0,
            meteor_base_speed: 120.0,
            meteor_speed_step: 0.6,
            meteor_speed_step_interval: 1.5,

            powerup_radius: 22.0,
            powerup_fall_speed: 90.0,
            powerup_spawn_y: -20.0,
            powerup_exit_margin: 80.0,

            spawn_edge_margin: 30.0,
            meteor_threshold: 0.62,
            coin_threshold: 0.92,
            spawn_interval_base: 0.95,
            spawn_interval_difficulty: 0.02,
            spawn_interval_floor: 0.4,
            spawn_interval_jitter: 0.45,

            difficulty_cap: 120.0,

            slow_factor: 0.45,
            magnet_radius: 180.0,
            magnet_strength: 1800.0,

            ambient_spawns: true,
            ambient_coin: TrickleRule {
                interval: 1.0,
                chance: 0.12,
            },
            ambient_powerup: TrickleRule {
                interval: 2.5,
                chance: 0.06,
            },
            ambient_meteor: TrickleRule {
                interval: 0.65,
                chance: 0.03,
            },
            ambient_meteor_speed_jitter: 60.0,
            ambient_meteor_difficulty_speed: 6.0,
        }
    }
}

impl DodgeConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("STARFALL_DODGE_CONFIG")
            && let Some(config) = Self::from_file(&path)
        {
            return config;
        }
        if let Some(config) = Self::from_file("config/dodge.toml") {
            return config;
        }
        Self::default()
    }

    fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => {
                tracing::info!(path, "Loaded dodge config");
                Some(config)
            },
            Err(e) => {
                tracing::warn!(path, error = %e, "Failed to parse dodge config");
                None
            },
        }
    }

    /// Horizontal range the player's left edge may occupy.
    pub fn player_x_bounds(&self) -> (f32, f32) {
        let min = self.player_edge_margin;
        let max = self.playfield_width - self.player_width - self.player_edge_margin;
        (min, max.max(min))
    }

    /// Horizontal range spawned entities are centred in.
    pub fn spawn_x_bounds(&self) -> (f32, f32) {
        let min = self.spawn_edge_margin;
        let max = self.playfield_width - self.spawn_edge_margin;
        (min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuning() {
        let cfg = DodgeConfig::default();
        assert_eq!(cfg.playfield_width, 600.0);
        assert_eq!(cfg.max_dt, 0.05);
        assert_eq!(cfg.meteor_threshold, 0.62);
        assert_eq!(cfg.coin_threshold, 0.92);
        assert_eq!(cfg.spawn_interval_floor, 0.4);
        assert_eq!(cfg.difficulty_cap, 120.0);
    }

    #[test]
    fn player_bounds_leave_edge_margin() {
        let cfg = DodgeConfig::default();
        assert_eq!(cfg.player_x_bounds(), (8.0, 600.0 - 35.0 - 8.0));
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg: DodgeConfig = toml::from_str(
            r#"
playfield_width = 400.0
ambient_spawns = false

[ambient_coin]
interval = 2.0
chance = 0.5
"#,
        )
        .unwrap();
        assert_eq!(cfg.playfield_width, 400.0);
        assert!(!cfg.ambient_spawns);
        assert_eq!(cfg.ambient_coin.interval, 2.0);
        assert_eq!(cfg.playfield_height, 1100.0);
        assert_eq!(cfg.ambient_meteor, DodgeConfig::default().ambient_meteor);
    }
}
