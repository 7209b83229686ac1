use serde::{Deserialize, Serialize};

use crate::particles::ParticleBurst;
use crate::powerups::PowerUpKind;

/// Something that happened during a tick, for audio and effects collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A coin was picked up; `score` is the new total.
    CoinCollected { x: f32, y: f32, score: u32 },
    /// A meteor hit the player while shielded.
    MeteorAbsorbed { x: f32, y: f32 },
    PowerupCollected { kind: PowerUpKind, x: f32, y: f32 },
    /// An unshielded meteor hit ended the run.
    GameOver { score: u32, elapsed: f32 },
}

impl GameEvent {
    /// Cosmetic particle burst that accompanies this event, if any.
    pub fn particle_burst(&self) -> Option<ParticleBurst> {
        match *self {
            GameEvent::CoinCollected { x, y, .. } => Some(ParticleBurst {
                x,
                y,
                count: 14,
                color: 0xffd560,
            }),
            GameEvent::MeteorAbsorbed { x, y } => Some(ParticleBurst {
                x,
                y,
                count: 12,
                color: 0xdddddd,
            }),
            GameEvent::PowerupCollected { x, y, .. } => Some(ParticleBurst {
                x,
                y,
                count: 14,
                color: 0xaaffaa,
            }),
            GameEvent::GameOver { .. } => None,
        }
    }

    /// Feedback beep pitch (Hz) for the audio collaborator.
    pub fn tone_hz(&self) -> Option<f32> {
        match self {
            GameEvent::CoinCollected { .. } => Some(740.0),
            GameEvent::MeteorAbsorbed { .. } => Some(160.0),
            GameEvent::PowerupCollected { kind, .. } => Some(match kind {
                PowerUpKind::Magnet => 600.0,
                PowerUpKind::Shield => 200.0,
                PowerUpKind::Slow => 320.0,
            }),
            GameEvent::GameOver { .. } => None,
        }
    }
}
