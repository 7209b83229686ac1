/// Largest Δt a single tick may cover, in seconds.
pub const MAX_DT: f32 = 0.05;

/// Clamp a raw frame delta into `[0, max_dt]`. NaN and negative deltas
/// (clock went backwards) become 0.
pub fn clamp_dt(raw: f32, max_dt: f32) -> f32 {
    if raw.is_nan() || raw <= 0.0 {
        0.0
    } else {
        raw.min(max_dt)
    }
}

/// Turns host frame timestamps into clamped simulation deltas.
///
/// The first frame after construction or [`FrameClock::reset`] yields 0 so a
/// long stall (tab hidden, pause menu) never lands in the simulation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(MAX_DT)
    }
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Feed the host's frame timestamp (milliseconds) and get this tick's Δt.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let raw = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_dt(raw, self.max_dt)
    }

    /// Forget the previous timestamp; the next tick yields 0.
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
