//! Cosmetic particles. Nothing in the gameplay path reads these.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Downward acceleration applied to particles (px/s²).
const PARTICLE_GRAVITY: f32 = 240.0;

/// Request to spawn `count` particles at a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleBurst {
    pub x: f32,
    pub y: f32,
    pub count: u32,
    /// `0xRRGGBB`.
    pub color: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Seconds left; the renderer may use it as alpha.
    pub life: f32,
    pub size: f32,
    pub color: u32,
}

/// Owns live particles and their own RNG stream, so emitting effects never
/// shifts the gameplay random sequence.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    rng: StdRng,
}

impl ParticleSystem {
    pub fn new(seed: u64) -> Self {
        Self {
            particles: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn emit(&mut self, burst: &ParticleBurst) {
        for _ in 0..burst.count {
            let vx = (self.rng.random::<f32>() - 0.5) * 260.0;
            let vy = (self.rng.random::<f32>() - 1.2) * 260.0;
            let life = 0.5 + self.rng.random::<f32>() * 0.7;
            let size = 1.0 + self.rng.random::<f32>() * 3.0;
            self.particles.push(Particle {
                x: burst.x,
                y: burst.y,
                vx,
                vy,
                life,
                size,
                color: burst.color,
            });
        }
    }

    /// Advance every particle by `dt` and drop the dead ones.
    pub fn age(&mut self, dt: f32) {
        self.particles.retain_mut(|p| {
            p.life -= dt;
            if p.life <= 0.0 {
                return false;
            }
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy += PARTICLE_GRAVITY * dt;
            true
        });
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
