pub mod clock;
pub mod collision;
pub mod config;
pub mod difficulty;
pub mod entities;
pub mod events;
pub mod input;
pub mod particles;
pub mod powerups;
pub mod scoring;
pub mod snapshot;
pub mod spawn;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use starfall_core::preferences::{PlayerSkin, PreferencesStore};
use starfall_core::score::{MIN_SUBMIT_DURATION_SECS, ScoreSubmission, ScoreSubmitter};

use clock::{FrameClock, clamp_dt};
use collision::Circle;
use config::DodgeConfig;
use difficulty::Difficulty;
use entities::{EntityRegistry, MeteorOutcome, TickContext};
use events::GameEvent;
use input::Direction;
use particles::ParticleSystem;
use powerups::PowerupTimers;
use scoring::ScoreTracker;
use snapshot::{ActiveView, MeteorView, PowerupView, Snapshot};
use spawn::SpawnScheduler;

/// Handle submitted when the player never set one.
pub const DEFAULT_HANDLE: &str = "Anon";

/// Offset between the gameplay and particle RNG seeds.
const PARTICLE_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Lifecycle of the game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, before the first start.
    #[default]
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Everything owned by one run. Discarded and rebuilt on restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub score: ScoreTracker,
    pub difficulty: Difficulty,
    pub spawner: SpawnScheduler,
    pub powerups: PowerupTimers,
    pub entities: EntityRegistry,
}

impl RunState {
    pub fn new(config: &DodgeConfig, skin: PlayerSkin) -> Self {
        Self {
            score: ScoreTracker::default(),
            difficulty: Difficulty::new(config),
            spawner: SpawnScheduler::new(),
            powerups: PowerupTimers::default(),
            entities: EntityRegistry::new(config, skin),
        }
    }
}

/// Score and time of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub score: u32,
    pub elapsed: f32,
}

/// The dodge game: state machine around a deterministic per-tick simulation.
pub struct DodgeGame {
    config: DodgeConfig,
    phase: GamePhase,
    run: RunState,
    rng: StdRng,
    particles: ParticleSystem,
    clock: FrameClock,
    skin: PlayerSkin,
    handle: String,
    submitter: Option<Box<dyn ScoreSubmitter>>,
    submitted: bool,
}

impl DodgeGame {
    /// Same config and seed give the same run for the same inputs.
    pub fn new(config: DodgeConfig, seed: u64) -> Self {
        let skin = PlayerSkin::default();
        Self {
            run: RunState::new(&config, skin),
            phase: GamePhase::Idle,
            rng: StdRng::seed_from_u64(seed),
            particles: ParticleSystem::new(seed ^ PARTICLE_SEED_SALT),
            clock: FrameClock::new(config.max_dt),
            skin,
            handle: DEFAULT_HANDLE.to_string(),
            submitter: None,
            submitted: false,
            config,
        }
    }

    /// Apply the player's skin and handle. Takes effect from the next run.
    pub fn with_preferences(mut self, prefs: &impl PreferencesStore) -> Self {
        let prefs = prefs.preferences();
        self.skin = prefs.player;
        self.handle = prefs.handle.unwrap_or_else(|| DEFAULT_HANDLE.to_string());
        self
    }

    pub fn set_submitter(&mut self, submitter: Box<dyn ScoreSubmitter>) {
        self.submitter = Some(submitter);
    }

    pub fn config(&self) -> &DodgeConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn run(&self) -> &RunState {
        &self.run
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Idle → Running with a fresh run.
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }
        self.begin_run();
        true
    }

    /// Running ↔ Paused. Ignored in any other phase.
    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => {
                self.clock.reset();
                GamePhase::Running
            },
            other => other,
        };
        tracing::debug!(phase = ?self.phase, "Pause toggled");
    }

    /// GameOver → Running with a fully reset run.
    pub fn restart(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.begin_run();
        true
    }

    /// GameOver → Idle. The finished run stays visible until the next start.
    pub fn return_to_title(&mut self) -> bool {
        if self.phase != GamePhase::GameOver {
            return false;
        }
        self.phase = GamePhase::Idle;
        true
    }

    fn begin_run(&mut self) {
        self.run = RunState::new(&self.config, self.skin);
        self.particles.clear();
        self.clock.reset();
        self.submitted = false;
        self.phase = GamePhase::Running;
        tracing::info!(skin = self.skin.id(), "Run started");
    }

    /// Drive one tick from a host frame timestamp in milliseconds.
    pub fn frame(&mut self, now_ms: f64, direction: Direction) -> Vec<GameEvent> {
        let dt = self.clock.tick(now_ms);
        self.update(dt, direction)
    }

    /// Advance the simulation by `dt` seconds. Does nothing unless Running.
    pub fn update(&mut self, dt: f32, direction: Direction) -> Vec<GameEvent> {
        if self.phase != GamePhase::Running {
            return Vec::new();
        }
        let dt = clamp_dt(dt, self.config.max_dt);
        let mut events = Vec::new();

        let effects = self.run.powerups.effects(&self.config);

        self.run.score.advance(dt);
        self.run.difficulty.advance(dt, &self.config);

        for entity in
            self.run
                .spawner
                .update(dt, &self.run.difficulty, &self.config, &mut self.rng)
        {
            self.run.entities.spawn(entity);
        }

        self.run.entities.move_player(direction, dt, &self.config);

        let ctx = TickContext {
            dt,
            effects,
            difficulty_timer: self.run.difficulty.timer,
            config: &self.config,
        };

        self.run
            .entities
            .update_coins(&ctx, &mut self.run.score, &mut events);

        if self.run.entities.update_meteors(&ctx, &mut events) == MeteorOutcome::Lethal {
            self.emit_particles(&events);
            self.end_run(&mut events);
            return events;
        }

        let picked = self.run.entities.update_powerups(&ctx, &mut events);

        self.run.powerups.tick(dt);
        for kind in picked {
            self.run.powerups.arm(kind);
        }

        self.emit_particles(&events);
        self.particles.age(dt);

        events
    }

    fn emit_particles(&mut self, events: &[GameEvent]) {
        for burst in events.iter().filter_map(GameEvent::particle_burst) {
            self.particles.emit(&burst);
        }
    }

    fn end_run(&mut self, events: &mut Vec<GameEvent>) {
        self.phase = GamePhase::GameOver;
        let score = self.run.score.score();
        let elapsed = self.run.score.elapsed();
        tracing::info!(score, elapsed, "Run over");
        events.push(GameEvent::GameOver { score, elapsed });
        self.submit_result(score, elapsed);
    }

    fn submit_result(&mut self, score: u32, elapsed: f32) {
        if self.submitted {
            return;
        }
        self.submitted = true;

        let duration = f64::from(elapsed);
        if duration < MIN_SUBMIT_DURATION_SECS {
            tracing::debug!(duration, "Run too short, skipping submission");
            return;
        }
        let Some(submitter) = &self.submitter else {
            return;
        };
        submitter.submit(ScoreSubmission {
            handle: self.handle.clone(),
            score,
            duration,
        });
    }

    /// Result of the last run, once it has ended.
    pub fn final_result(&self) -> Option<FinalResult> {
        (self.phase == GamePhase::GameOver).then(|| FinalResult {
            score: self.run.score.score(),
            elapsed: self.run.score.elapsed(),
        })
    }

    /// Value copy of everything the renderer needs.
    pub fn snapshot(&self) -> Snapshot {
        let entities = &self.run.entities;
        Snapshot {
            phase: self.phase,
            player: entities.player.rect(),
            skin: entities.player.skin,
            coins: entities
                .coins
                .iter()
                .map(|c| Circle {
                    x: c.x,
                    y: c.y,
                    r: c.r,
                })
                .collect(),
            meteors: entities
                .meteors
                .iter()
                .map(|m| MeteorView {
                    circle: Circle {
                        x: m.x,
                        y: m.y,
                        r: m.r,
                    },
                    rotation: m.rotation,
                })
                .collect(),
            powerups: entities
                .powerups
                .iter()
                .map(|u| PowerupView {
                    circle: Circle {
                        x: u.x,
                        y: u.y,
                        r: u.r,
                    },
                    kind: u.kind,
                })
                .collect(),
            particles: self.particles.particles().to_vec(),
            score: self.run.score.score(),
            elapsed: self.run.score.elapsed(),
            active: self
                .run
                .powerups
                .active()
                .into_iter()
                .map(|a| ActiveView::new(a.kind, a.remaining))
                .collect(),
        }
    }

    /// MessagePack encoding of the phase and run state.
    pub fn serialize_state(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(&(self.phase, &self.run))
    }

    /// Replace the phase and run state with a previously serialized one.
    pub fn apply_state(&mut self, state: &[u8]) -> Result<(), rmp_serde::decode::Error> {
        let (phase, run) = rmp_serde::from_slice::<(GamePhase, RunState)>(state)?;
        self.phase = phase;
        self.run = run;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use starfall_core::preferences::Preferences;
    use starfall_core::test_helpers::RecordingSubmitter;

    use super::*;
    use crate::entities::{Coin, Meteor, Powerup, Spawned};
    use crate::powerups::PowerUpKind;

    /// No ambient spawns and only the opening scheduled spawn.
    fn quiet() -> DodgeConfig {
        DodgeConfig {
            ambient_spawns: false,
            spawn_interval_base: 1000.0,
            spawn_interval_floor: 1000.0,
            ..DodgeConfig::default()
        }
    }

    /// A running game with an empty field.
    fn running_game() -> DodgeGame {
        let mut game = DodgeGame::new(quiet(), 1);
        game.start();
        game.update(0.0, Direction::None);
        game.run.entities.coins.clear();
        game.run.entities.meteors.clear();
        game.run.entities.powerups.clear();
        game
    }

    fn player_centre(game: &DodgeGame) -> (f32, f32) {
        game.run.entities.player.rect().center()
    }

    fn drop_meteor_on_player(game: &mut DodgeGame) {
        let (x, y) = player_centre(game);
        game.run.entities.spawn(Spawned::Meteor(Meteor {
            x,
            y,
            r: 20.0,
            vy: 0.0,
            rotation: 0.0,
        }));
    }

    fn play_for(game: &mut DodgeGame, secs: f32) {
        let ticks = (secs / 0.05).round() as usize;
        for _ in 0..ticks {
            game.update(0.05, Direction::None);
            game.run.entities.meteors.clear();
        }
    }

    #[test]
    fn starts_idle_and_ignores_updates() {
        let mut game = DodgeGame::new(quiet(), 1);
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.update(0.05, Direction::Right).is_empty());
        assert_eq!(game.run().score.elapsed(), 0.0);
    }

    #[test]
    fn start_only_from_idle() {
        let mut game = DodgeGame::new(quiet(), 1);
        assert!(game.start());
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(!game.start());
    }

    #[test]
    fn dt_is_clamped() {
        let mut game = running_game();
        let before = game.run().score.elapsed();
        game.update(10.0, Direction::None);
        assert!((game.run().score.elapsed() - before - 0.05).abs() < 1e-6);
    }

    #[test]
    fn pause_freezes_everything() {
        let mut game = running_game();
        play_for(&mut game, 0.5);
        let before = game.serialize_state().unwrap();
        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(game.update(0.05, Direction::Left).is_empty());
        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.serialize_state().unwrap(), before);
    }

    #[test]
    fn pause_ignored_outside_a_run() {
        let mut game = DodgeGame::new(quiet(), 1);
        game.toggle_pause();
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn unshielded_meteor_ends_run() {
        let mut game = running_game();
        drop_meteor_on_player(&mut game);
        let events = game.update(0.02, Direction::None);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
        let result = game.final_result().unwrap();
        assert_eq!(result.score, 0);

        let frozen = game.serialize_state().unwrap();
        assert!(game.update(0.05, Direction::Right).is_empty());
        assert_eq!(game.serialize_state().unwrap(), frozen);
    }

    #[test]
    fn shield_absorbs_and_run_continues() {
        let mut game = running_game();
        game.run.powerups.arm(PowerUpKind::Shield);
        drop_meteor_on_player(&mut game);
        let events = game.update(0.02, Direction::None);
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::MeteorAbsorbed { .. }))
        );
        assert!(game.run().entities.meteors.is_empty());
        assert!(!game.snapshot().particles.is_empty());
    }

    #[test]
    fn shield_expiry_restores_lethality() {
        let mut game = running_game();
        game.run.powerups.arm(PowerUpKind::Shield);
        for _ in 0..101 {
            game.update(0.05, Direction::None);
        }
        assert!(!game.run().powerups.is_active(PowerUpKind::Shield));
        game.run.entities.meteors.clear();
        drop_meteor_on_player(&mut game);
        game.update(0.01, Direction::None);
        assert_eq!(game.phase(), GamePhase::GameOver);
    }

    #[test]
    fn coin_pickup_increments_score() {
        let mut game = running_game();
        let (x, y) = player_centre(&game);
        game.run.entities.spawn(Spawned::Coin(Coin {
            x,
            y,
            r: 24.0,
            vy: 60.0,
        }));
        let events = game.update(0.01, Direction::None);
        assert_eq!(game.run().score.score(), 1);
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::CoinCollected { score: 1, .. }))
        );
    }

    #[test]
    fn powerup_pickup_arms_full_duration() {
        let mut game = running_game();
        game.run.powerups.arm(PowerUpKind::Magnet);
        game.update(0.05, Direction::None);
        game.update(0.05, Direction::None);
        let (x, y) = player_centre(&game);
        game.run.entities.spawn(Spawned::Powerup(Powerup {
            x,
            y,
            r: 22.0,
            kind: PowerUpKind::Magnet,
        }));
        game.update(0.05, Direction::None);
        assert_eq!(game.run().powerups.remaining(PowerUpKind::Magnet), 5.0);
        let snap = game.snapshot();
        assert_eq!(snap.active.len(), 1);
        assert_eq!(snap.active[0].display_secs, 5);
    }

    #[test]
    fn player_moves_with_input() {
        let mut game = running_game();
        let x0 = game.run().entities.player.x;
        game.update(0.05, Direction::Left);
        assert!((game.run().entities.player.x - (x0 - 18.0)).abs() < 1e-4);
        game.update(0.05, Direction::from_raw(9));
        assert!((game.run().entities.player.x - (x0 - 18.0)).abs() < 1e-4);
    }

    #[test]
    fn restart_resets_run() {
        let mut game = running_game();
        assert!(!game.restart(), "restart only from GameOver");
        game.run.score.add_coin();
        play_for(&mut game, 1.0);
        drop_meteor_on_player(&mut game);
        game.update(0.01, Direction::None);
        assert_eq!(game.phase(), GamePhase::GameOver);

        assert!(game.restart());
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.run().score.score(), 0);
        assert_eq!(game.run().score.elapsed(), 0.0);
        assert_eq!(game.run().difficulty.timer, 0.0);
        assert!(game.run().powerups.active().is_empty());
    }

    #[test]
    fn title_only_reachable_after_game_over() {
        let recorder = RecordingSubmitter::new();
        let mut game = DodgeGame::new(quiet(), 1);
        game.set_submitter(Box::new(recorder.clone()));
        assert!(!game.return_to_title(), "already idle");
        game.start();
        play_for(&mut game, 10.0);

        assert!(!game.return_to_title());
        assert_eq!(game.phase(), GamePhase::Running);
        game.toggle_pause();
        assert!(!game.return_to_title());
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(!game.start(), "live run cannot be restarted from the title");

        game.toggle_pause();
        drop_meteor_on_player(&mut game);
        game.update(0.01, Direction::None);
        assert_eq!(recorder.calls().len(), 1);
        assert!(game.return_to_title());
        assert_eq!(game.phase(), GamePhase::Idle);
        assert!(game.start());
    }

    #[test]
    fn long_run_submits_once() {
        let recorder = RecordingSubmitter::new();
        let prefs = Preferences {
            handle: Some("@goku".into()),
            ..Preferences::default()
        };
        let mut game = DodgeGame::new(quiet(), 1).with_preferences(&prefs);
        game.set_submitter(Box::new(recorder.clone()));
        game.start();
        play_for(&mut game, 4.0);
        drop_meteor_on_player(&mut game);
        game.update(0.01, Direction::None);
        game.update(0.01, Direction::None);

        let calls = recorder.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].handle, "@goku");
        assert!(calls[0].duration >= 3.0);
    }

    #[test]
    fn short_run_skips_submission() {
        let recorder = RecordingSubmitter::new();
        let mut game = DodgeGame::new(quiet(), 1);
        game.set_submitter(Box::new(recorder.clone()));
        game.start();
        play_for(&mut game, 1.0);
        drop_meteor_on_player(&mut game);
        game.update(0.01, Direction::None);
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn default_handle_is_anon() {
        let game = DodgeGame::new(quiet(), 1).with_preferences(&Preferences::default());
        assert_eq!(game.handle(), DEFAULT_HANDLE);
    }

    #[test]
    fn same_seed_same_run() {
        let play = || {
            let mut game = DodgeGame::new(DodgeConfig::default(), 77);
            game.start();
            for i in 0..300 {
                let dir = Direction::from_raw((i % 3) - 1);
                game.update(0.033, dir);
            }
            game.serialize_state().unwrap()
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn state_round_trips_through_apply() {
        let mut game = running_game();
        play_for(&mut game, 1.0);
        let bytes = game.serialize_state().unwrap();
        let mut other = DodgeGame::new(quiet(), 99);
        other.apply_state(&bytes).unwrap();
        assert_eq!(other.phase(), GamePhase::Running);
        assert_eq!(other.run(), game.run());
    }

    #[test]
    fn frame_clock_drives_update() {
        let mut game = running_game();
        let t0 = game.run().score.elapsed();
        game.frame(1000.0, Direction::None);
        assert_eq!(game.run().score.elapsed(), t0, "first frame is zero");
        game.frame(1020.0, Direction::None);
        assert!((game.run().score.elapsed() - t0 - 0.02).abs() < 1e-5);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;
        use crate::entities::magnet_pull;

        fn direction() -> impl Strategy<Value = Direction> {
            prop_oneof![
                Just(Direction::Left),
                Just(Direction::None),
                Just(Direction::Right),
            ]
        }

        proptest! {
            #[test]
            fn difficulty_bounded_and_monotonic(
                seed in any::<u64>(),
                steps in prop::collection::vec((0.0f32..0.2, direction()), 1..300),
            ) {
                let mut game = DodgeGame::new(DodgeConfig::default(), seed);
                game.start();
                let mut last_timer = 0.0;
                let mut last_base = game.run().difficulty.meteor_base_speed;
                let mut last_score = 0;
                for (dt, dir) in steps {
                    game.update(dt, dir);
                    let d = &game.run().difficulty;
                    prop_assert!((0.0..=120.0).contains(&d.timer));
                    prop_assert!(d.timer >= last_timer);
                    prop_assert!(d.meteor_base_speed >= last_base);
                    let score = game.run().score.score();
                    prop_assert!(score >= last_score);
                    last_timer = d.timer;
                    last_base = d.meteor_base_speed;
                    last_score = score;
                    if game.phase() != GamePhase::Running {
                        break;
                    }
                }
            }

            #[test]
            fn player_stays_in_bounds(
                seed in any::<u64>(),
                steps in prop::collection::vec((0.0f32..0.2, direction()), 1..300),
            ) {
                let cfg = DodgeConfig::default();
                let (min_x, max_x) = cfg.player_x_bounds();
                let mut game = DodgeGame::new(cfg, seed);
                game.start();
                for (dt, dir) in steps {
                    game.update(dt, dir);
                    let x = game.run().entities.player.x;
                    prop_assert!(x >= min_x && x <= max_x);
                }
            }

            #[test]
            fn powerup_timers_never_negative(
                seed in any::<u64>(),
                steps in prop::collection::vec(0.0f32..0.2, 1..300),
            ) {
                let mut game = DodgeGame::new(DodgeConfig::default(), seed);
                game.start();
                game.run.powerups.arm(PowerUpKind::Slow);
                for dt in steps {
                    game.update(dt, Direction::None);
                    for kind in PowerUpKind::ALL {
                        let r = game.run().powerups.remaining(kind);
                        prop_assert!((0.0..=5.0).contains(&r));
                    }
                }
            }

            #[test]
            fn magnet_pulls_toward_player(
                dx in -179.0f32..179.0,
                dy in -179.0f32..179.0,
                dt in 0.001f32..0.05,
            ) {
                let cfg = DodgeConfig::default();
                let dist = (dx * dx + dy * dy).sqrt();
                prop_assume!(dist > 1.0 && dist < 179.0);
                let (mx, my) = magnet_pull(dx, dy, dt, &cfg);
                // Displacement points at the player.
                prop_assert!(mx * dx + my * dy > 0.0);
                let tol = 1e-4 * dist * mx.hypot(my) + 1e-6;
                prop_assert!((mx * dy - my * dx).abs() <= tol);
            }

            #[test]
            fn pause_resume_is_identity(
                seed in any::<u64>(),
                warmup in prop::collection::vec(0.0f32..0.05, 0..60),
            ) {
                let mut game = DodgeGame::new(DodgeConfig::default(), seed);
                game.start();
                for dt in warmup {
                    game.update(dt, Direction::None);
                }
                prop_assume!(game.phase() == GamePhase::Running);
                let before = game.serialize_state().unwrap();
                game.toggle_pause();
                game.update(0.05, Direction::Right);
                game.toggle_pause();
                prop_assert_eq!(game.serialize_state().unwrap(), before);
            }
        }
    }
}
