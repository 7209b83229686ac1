use serde::{Deserialize, Serialize};

use starfall_core::preferences::PlayerSkin;

use crate::collision::{Circle, Rect, rect_circle_overlap};
use crate::config::DodgeConfig;
use crate::events::GameEvent;
use crate::input::Direction;
use crate::powerups::{Effects, PowerUpKind};
use crate::scoring::ScoreTracker;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub speed: f32,
    pub skin: PlayerSkin,
}

impl Player {
    /// Centred horizontally, `player_bottom_offset` above the floor.
    pub fn new(config: &DodgeConfig, skin: PlayerSkin) -> Self {
        Self {
            x: config.playfield_width / 2.0 - config.player_width / 2.0,
            y: config.playfield_height - config.player_bottom_offset,
            w: config.player_width,
            h: config.player_height,
            vx: 0.0,
            speed: config.player_speed,
            skin,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            w: self.w,
            h: self.h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    /// Base fall speed; difficulty is added each tick.
    pub vy: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meteor {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub vy: f32,
    /// Cosmetic, radians.
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Powerup {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub kind: PowerUpKind,
}

/// A newly spawned entity on its way into the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Spawned {
    Coin(Coin),
    Meteor(Meteor),
    Powerup(Powerup),
}

/// Inputs shared by every per-entity pass in one tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub dt: f32,
    pub effects: Effects,
    pub difficulty_timer: f32,
    pub config: &'a DodgeConfig,
}

/// Result of the meteor pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeteorOutcome {
    Clear,
    /// An unshielded hit. Entities after it were not processed.
    Lethal,
}

/// Owns every live entity, the player included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub player: Player,
    pub coins: Vec<Coin>,
    pub meteors: Vec<Meteor>,
    pub powerups: Vec<Powerup>,
}

impl EntityRegistry {
    pub fn new(config: &DodgeConfig, skin: PlayerSkin) -> Self {
        Self {
            player: Player::new(config, skin),
            coins: Vec::new(),
            meteors: Vec::new(),
            powerups: Vec::new(),
        }
    }

    pub fn spawn(&mut self, entity: Spawned) {
        match entity {
            Spawned::Coin(c) => self.coins.push(c),
            Spawned::Meteor(m) => self.meteors.push(m),
            Spawned::Powerup(p) => self.powerups.push(p),
        }
    }

    pub fn move_player(&mut self, direction: Direction, dt: f32, config: &DodgeConfig) {
        let (min_x, max_x) = config.player_x_bounds();
        let p = &mut self.player;
        p.vx = direction.sign() * p.speed;
        p.x = (p.x + p.vx * dt).clamp(min_x, max_x);
    }

    /// Fall, magnet pull, pickup and exit for every coin.
    pub fn update_coins(
        &mut self,
        ctx: &TickContext<'_>,
        score: &mut ScoreTracker,
        events: &mut Vec<GameEvent>,
    ) {
        let rect = self.player.rect();
        let (px, py) = rect.center();
        let cfg = ctx.config;
        let exit_y = cfg.playfield_height + cfg.coin_exit_margin;

        self.coins.retain_mut(|c| {
            c.y += (c.vy + ctx.difficulty_timer * cfg.coin_difficulty_speed)
                * ctx.dt
                * ctx.effects.slow_factor;

            if ctx.effects.magnet {
                let (dx, dy) = magnet_pull(px - c.x, py - c.y, ctx.dt, cfg);
                c.x += dx;
                c.y += dy;
            }

            let circle = Circle {
                x: c.x,
                y: c.y,
                r: c.r,
            };
            if rect_circle_overlap(&rect, &circle) {
                let total = score.add_coin();
                events.push(GameEvent::CoinCollected {
                    x: c.x,
                    y: c.y,
                    score: total,
                });
                false
            } else {
                c.y <= exit_y
            }
        });
    }

    /// Fall, spin and collide every meteor. Stops at the first lethal hit and
    /// leaves that meteor in place.
    pub fn update_meteors(
        &mut self,
        ctx: &TickContext<'_>,
        events: &mut Vec<GameEvent>,
    ) -> MeteorOutcome {
        let rect = self.player.rect();
        let cfg = ctx.config;
        let exit_y = cfg.playfield_height + cfg.meteor_exit_margin;

        let mut i = 0;
        while i < self.meteors.len() {
            let m = &mut self.meteors[i];
            m.y += m.vy * ctx.dt * ctx.effects.slow_factor;
            m.rotation += cfg.meteor_spin_rate * ctx.dt;

            let circle = Circle {
                x: m.x,
                y: m.y,
                r: m.r,
            };
            if rect_circle_overlap(&rect, &circle) {
                if !ctx.effects.shield {
                    return MeteorOutcome::Lethal;
                }
                events.push(GameEvent::MeteorAbsorbed { x: m.x, y: m.y });
                self.meteors.remove(i);
            } else if m.y > exit_y {
                self.meteors.remove(i);
            } else {
                i += 1;
            }
        }
        MeteorOutcome::Clear
    }

    /// Fall, pickup and exit for every power-up. Returns the kinds picked up
    /// this tick, in order.
    pub fn update_powerups(
        &mut self,
        ctx: &TickContext<'_>,
        events: &mut Vec<GameEvent>,
    ) -> Vec<PowerUpKind> {
        let rect = self.player.rect();
        let cfg = ctx.config;
        let exit_y = cfg.playfield_height + cfg.powerup_exit_margin;
        let mut picked = Vec::new();

        self.powerups.retain_mut(|u| {
            u.y += cfg.powerup_fall_speed * ctx.dt * ctx.effects.slow_factor;
            let circle = Circle {
                x: u.x,
                y: u.y,
                r: u.r,
            };
            if rect_circle_overlap(&rect, &circle) {
                picked.push(u.kind);
                events.push(GameEvent::PowerupCollected {
                    kind: u.kind,
                    x: u.x,
                    y: u.y,
                });
                false
            } else {
                u.y <= exit_y
            }
        });
        picked
    }
}

/// Displacement pulling a coin toward the player, given the vector from the
/// coin to the player's centre. Zero outside the magnet radius.
pub fn magnet_pull(dx: f32, dy: f32, dt: f32, config: &DodgeConfig) -> (f32, f32) {
    let mut dist = (dx * dx + dy * dy).sqrt();
    if dist == 0.0 {
        dist = 0.0001;
    }
    if dist >= config.magnet_radius {
        return (0.0, 0.0);
    }
    let strength = (1.0 - dist / config.magnet_radius) * config.magnet_strength;
    (dx / dist * strength * dt, dy / dist * strength * dt)
}
