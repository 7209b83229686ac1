use serde::{Deserialize, Serialize};

use starfall_core::preferences::PlayerSkin;

use crate::GamePhase;
use crate::collision::{Circle, Rect};
use crate::particles::Particle;
use crate::powerups::PowerUpKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeteorView {
    pub circle: Circle,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerupView {
    pub circle: Circle,
    pub kind: PowerUpKind,
}

/// A running power-up as the HUD shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveView {
    pub kind: PowerUpKind,
    pub remaining: f32,
    /// `remaining` rounded up to whole seconds.
    pub display_secs: u32,
}

impl ActiveView {
    pub fn new(kind: PowerUpKind, remaining: f32) -> Self {
        Self {
            kind,
            remaining,
            display_secs: remaining.max(0.0).ceil() as u32,
        }
    }
}

/// Read-only copy of everything the renderer draws for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub player: Rect,
    pub skin: PlayerSkin,
    pub coins: Vec<Circle>,
    pub meteors: Vec<MeteorView>,
    pub powerups: Vec<PowerupView>,
    pub particles: Vec<Particle>,
    pub score: u32,
    pub elapsed: f32,
    pub active: Vec<ActiveView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_seconds_round_up() {
        assert_eq!(ActiveView::new(PowerUpKind::Magnet, 5.0).display_secs, 5);
        assert_eq!(ActiveView::new(PowerUpKind::Magnet, 4.01).display_secs, 5);
        assert_eq!(ActiveView::new(PowerUpKind::Magnet, 0.2).display_secs, 1);
        assert_eq!(ActiveView::new(PowerUpKind::Magnet, 0.0).display_secs, 0);
    }
}
