use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Trait for game-specific power-up kind enums.
pub trait PowerUpKind: Clone + Copy + PartialEq + Serialize + DeserializeOwned {
    /// Duration in seconds a pickup arms this power-up for.
    fn duration(&self) -> f32;
}

/// Countdown for one timed power-up, generic over the kind enum.
///
/// `remaining` never goes below zero. A pickup while already running resets
/// the countdown to the full duration rather than adding to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ActivePowerUp<K: PowerUpKind> {
    pub kind: K,
    pub remaining: f32,
}

impl<K: PowerUpKind> ActivePowerUp<K> {
    pub fn new(kind: K) -> Self {
        Self {
            remaining: kind.duration(),
            kind,
        }
    }

    /// An already-expired timer for `kind`.
    pub fn idle(kind: K) -> Self {
        Self {
            kind,
            remaining: 0.0,
        }
    }

    pub fn rearm(&mut self) {
        self.remaining = self.kind.duration();
    }

    pub fn tick(&mut self, dt: f32) {
        if self.remaining > 0.0 {
            self.remaining = (self.remaining - dt).max(0.0);
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn is_expired(&self) -> bool {
        !self.is_active()
    }
}
