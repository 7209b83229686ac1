use serde::{Deserialize, Serialize};

use crate::config::DodgeConfig;

/// Time-driven difficulty ramp.
///
/// `timer` climbs with running time up to the configured cap and scales
/// spawn cadence and fall speeds. `meteor_base_speed` steps up on its own
/// fixed cadence of game time, independent of frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub timer: f32,
    pub meteor_base_speed: f32,
    /// Running time banked toward the next base-speed step.
    step_accum: f32,
}

impl Difficulty {
    pub fn new(config: &DodgeConfig) -> Self {
        Self {
            timer: 0.0,
            meteor_base_speed: config.meteor_base_speed,
            step_accum: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32, config: &DodgeConfig) {
        self.timer = (self.timer + dt).min(config.difficulty_cap);

        if config.meteor_speed_step_interval > 0.0 {
            self.step_accum += dt;
            while self.step_accum >= config.meteor_speed_step_interval {
                self.step_accum -= config.meteor_speed_step_interval;
                self.meteor_base_speed += config.meteor_speed_step;
            }
        }
    }

    /// Minimum seconds between scheduled spawns at the current difficulty,
    /// before jitter.
    pub fn spawn_interval_floor(&self, config: &DodgeConfig) -> f32 {
        (config.spawn_interval_base - self.timer * config.spawn_interval_difficulty)
            .max(config.spawn_interval_floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_capped() {
        let cfg = DodgeConfig::default();
        let mut d = Difficulty::new(&cfg);
        for _ in 0..10_000 {
            d.advance(0.05, &cfg);
        }
        assert_eq!(d.timer, 120.0);
    }

    #[test]
    fn base_speed_steps_every_interval() {
        let cfg = DodgeConfig::default();
        let mut d = Difficulty::new(&cfg);
        // 1.45s: no step yet
        for _ in 0..29 {
            d.advance(0.05, &cfg);
        }
        assert_eq!(d.meteor_base_speed, 120.0);
        // 3.05s: two steps
        for _ in 0..32 {
            d.advance(0.05, &cfg);
        }
        assert!((d.meteor_base_speed - 121.2).abs() < 1e-4);
    }

    #[test]
    fn step_cadence_is_frame_rate_independent() {
        let cfg = DodgeConfig::default();
        let mut coarse = Difficulty::new(&cfg);
        let mut fine = Difficulty::new(&cfg);
        for _ in 0..200 {
            coarse.advance(0.05, &cfg);
        }
        for _ in 0..1000 {
            fine.advance(0.01, &cfg);
        }
        assert!((coarse.meteor_base_speed - fine.meteor_base_speed).abs() <= cfg.meteor_speed_step);
    }

    #[test]
    fn interval_floor_bottoms_out() {
        let cfg = DodgeConfig::default();
        let mut d = Difficulty::new(&cfg);
        assert!((d.spawn_interval_floor(&cfg) - 0.95).abs() < 1e-6);
        d.timer = 10.0;
        assert!((d.spawn_interval_floor(&cfg) - 0.75).abs() < 1e-6);
        d.timer = 120.0;
        assert_eq!(d.spawn_interval_floor(&cfg), 0.4);
    }
}
