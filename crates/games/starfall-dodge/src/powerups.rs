use serde::{Deserialize, Serialize};

use starfall_core::powerup;

use crate::config::DodgeConfig;

/// Seconds a pickup arms its power-up for.
pub const POWERUP_DURATION: f32 = 5.0;

/// Dodge power-up types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Pulls nearby coins toward the player.
    Magnet,
    /// Turns a lethal meteor hit into an absorbed one.
    Shield,
    /// Scales every fall speed down.
    Slow,
}

impl powerup::PowerUpKind for PowerUpKind {
    fn duration(&self) -> f32 {
        POWERUP_DURATION
    }
}

impl PowerUpKind {
    /// Display and iteration order.
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::Magnet, PowerUpKind::Shield, PowerUpKind::Slow];
}

/// Active power-up countdown.
pub type ActivePowerUp = powerup::ActivePowerUp<PowerUpKind>;

/// Gameplay effects in force for one tick, read from the timers before any
/// entity moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Effects {
    pub slow_factor: f32,
    pub magnet: bool,
    pub shield: bool,
}

/// The three independent power-up timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupTimers {
    magnet: ActivePowerUp,
    shield: ActivePowerUp,
    slow: ActivePowerUp,
}

impl Default for PowerupTimers {
    fn default() -> Self {
        Self {
            magnet: ActivePowerUp::idle(PowerUpKind::Magnet),
            shield: ActivePowerUp::idle(PowerUpKind::Shield),
            slow: ActivePowerUp::idle(PowerUpKind::Slow),
        }
    }
}

impl PowerupTimers {
    fn timer(&self, kind: PowerUpKind) -> &ActivePowerUp {
        match kind {
            PowerUpKind::Magnet => &self.magnet,
            PowerUpKind::Shield => &self.shield,
            PowerUpKind::Slow => &self.slow,
        }
    }

    fn timer_mut(&mut self, kind: PowerUpKind) -> &mut ActivePowerUp {
        match kind {
            PowerUpKind::Magnet => &mut self.magnet,
            PowerUpKind::Shield => &mut self.shield,
            PowerUpKind::Slow => &mut self.slow,
        }
    }

    /// Set `kind` to the full duration, whether or not it was running.
    pub fn arm(&mut self, kind: PowerUpKind) {
        self.timer_mut(kind).rearm();
    }

    pub fn tick(&mut self, dt: f32) {
        self.magnet.tick(dt);
        self.shield.tick(dt);
        self.slow.tick(dt);
    }

    pub fn remaining(&self, kind: PowerUpKind) -> f32 {
        self.timer(kind).remaining
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.timer(kind).is_active()
    }

    pub fn effects(&self, config: &DodgeConfig) -> Effects {
        Effects {
            slow_factor: if self.slow.is_active() {
                config.slow_factor
            } else {
                1.0
            },
            magnet: self.magnet.is_active(),
            shield: self.shield.is_active(),
        }
    }

    /// Running timers in display order.
    pub fn active(&self) -> Vec<ActivePowerUp> {
        PowerUpKind::ALL
            .iter()
            .map(|&kind| self.timer(kind))
            .filter(|t| t.is_active())
            .cloned()
            .collect()
    }
}
