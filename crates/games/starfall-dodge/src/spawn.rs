use std::f32::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DodgeConfig, TrickleRule};
use crate::difficulty::Difficulty;
use crate::entities::{Coin, Meteor, Powerup, Spawned};
use crate::powerups::PowerUpKind;

/// What a scheduled spawn roll produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnCategory {
    Meteor,
    Coin,
    Powerup,
}

/// Map a uniform roll in `[0, 1)` onto a category using the cumulative
/// thresholds. A roll equal to a threshold belongs to the later category.
pub fn choose_category(roll: f32, config: &DodgeConfig) -> SpawnCategory {
    if roll < config.meteor_threshold {
        SpawnCategory::Meteor
    } else if roll < config.coin_threshold {
        SpawnCategory::Coin
    } else {
        SpawnCategory::Powerup
    }
}

pub(crate) fn random_kind(rng: &mut impl Rng) -> PowerUpKind {
    PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())]
}

pub(crate) fn random_x(rng: &mut impl Rng, config: &DodgeConfig) -> f32 {
    let (min, max) = config.spawn_x_bounds();
    min + rng.random::<f32>() * (max - min)
}

pub(crate) fn new_meteor(rng: &mut impl Rng, x: f32, vy: f32, config: &DodgeConfig) -> Meteor {
    let r = config.meteor_radius_min + rng.random::<f32>() * config.meteor_radius_range;
    let rotation = rng.random::<f32>() * TAU;
    Meteor {
        x,
        y: config.meteor_spawn_y,
        r,
        vy,
        rotation,
    }
}

pub(crate) fn new_coin(x: f32, config: &DodgeConfig) -> Coin {
    Coin {
        x,
        y: config.coin_spawn_y,
        r: config.coin_radius,
        vy: config.coin_base_speed,
    }
}

pub(crate) fn new_powerup(x: f32, kind: PowerUpKind, config: &DodgeConfig) -> Powerup {
    Powerup {
        x,
        y: config.powerup_spawn_y,
        r: config.powerup_radius,
        kind,
    }
}

/// Background roll state for one trickle rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Trickle {
    accum: f32,
}

impl Trickle {
    /// Bank `dt` and return how many rolls fell due.
    fn due(&mut self, dt: f32, rule: &TrickleRule) -> u32 {
        if rule.interval <= 0.0 {
            return 0;
        }
        self.accum += dt;
        let mut n = 0;
        while self.accum >= rule.interval {
            self.accum -= rule.interval;
            n += 1;
        }
        n
    }
}

/// Decides when and what to spawn.
///
/// The main schedule fires whenever its countdown runs out and picks a
/// category by weighted roll. The ambient trickles are fixed-cadence
/// low-probability rolls layered on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnScheduler {
    /// Seconds until the next scheduled spawn.
    timer: f32,
    coin_trickle: Trickle,
    powerup_trickle: Trickle,
    meteor_trickle: Trickle,
}

impl Default for SpawnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl SpawnScheduler {
    /// A fresh run spawns on its first tick.
    pub fn new() -> Self {
        Self {
            timer: 0.0,
            coin_trickle: Trickle::default(),
            powerup_trickle: Trickle::default(),
            meteor_trickle: Trickle::default(),
        }
    }

    pub fn timer(&self) -> f32 {
        self.timer
    }

    /// Advance by `dt` and return everything that spawns this tick.
    pub fn update(
        &mut self,
        dt: f32,
        difficulty: &Difficulty,
        config: &DodgeConfig,
        rng: &mut impl Rng,
    ) -> Vec<Spawned> {
        let mut out = Vec::new();

        self.timer -= dt;
        if self.timer <= 0.0 {
            out.push(Self::scheduled(difficulty, config, rng));
            self.timer = difficulty.spawn_interval_floor(config)
                + rng.random::<f32>() * config.spawn_interval_jitter;
        }

        if config.ambient_spawns {
            self.ambient(dt, difficulty, config, rng, &mut out);
        }

        out
    }

    fn scheduled(
        difficulty: &Difficulty,
        config: &DodgeConfig,
        rng: &mut impl Rng,
    ) -> Spawned {
        let roll = rng.random::<f32>();
        let x = random_x(rng, config);
        match choose_category(roll, config) {
            SpawnCategory::Meteor => {
                let vy = difficulty.meteor_base_speed
                    + rng.random::<f32>() * config.meteor_speed_jitter
                    + difficulty.timer * config.meteor_difficulty_speed;
                Spawned::Meteor(new_meteor(rng, x, vy, config))
            },
            SpawnCategory::Coin => Spawned::Coin(new_coin(x, config)),
            SpawnCategory::Powerup => {
                let kind = random_kind(rng);
                Spawned::Powerup(new_powerup(x, kind, config))
            },
        }
    }

    fn ambient(
        &mut self,
        dt: f32,
        difficulty: &Difficulty,
        config: &DodgeConfig,
        rng: &mut impl Rng,
        out: &mut Vec<Spawned>,
    ) {
        for _ in 0..self.coin_trickle.due(dt, &config.ambient_coin) {
            if rng.random::<f32>() < config.ambient_coin.chance {
                let x = random_x(rng, config);
                out.push(Spawned::Coin(new_coin(x, config)));
            }
        }
        for _ in 0..self.powerup_trickle.due(dt, &config.ambient_powerup) {
            if rng.random::<f32>() < config.ambient_powerup.chance {
                let x = random_x(rng, config);
                let kind = random_kind(rng);
                out.push(Spawned::Powerup(new_powerup(x, kind, config)));
            }
        }
        for _ in 0..self.meteor_trickle.due(dt, &config.ambient_meteor) {
            if rng.random::<f32>() < config.ambient_meteor.chance {
                let x = random_x(rng, config);
                let vy = difficulty.meteor_base_speed
                    + rng.random::<f32>() * config.ambient_meteor_speed_jitter
                    + difficulty.timer * config.ambient_meteor_difficulty_speed;
                out.push(Spawned::Meteor(new_meteor(rng, x, vy, config)));
            }
        }
    }
}
