//! Quiz Shooter - an arcade shooter with timed trivia breaks
//!
//! Core modules:
//! - `sim`: Simulation step (movement, spawning, collisions, difficulty ramp)
//! - `app`: Screen state machine that owns the session and drives `sim`
//! - `input`: Keyboard mapping for the input layer
//! - `trivia`: Question bank and answer checking
//! - `config` / `settings`: Session configuration and stored preferences
//! - `highscores`: Leaderboard stub

pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod config;
pub mod highscores;
pub mod input;
pub mod settings;
pub mod sim;
mod storage;
pub mod trivia;

pub use app::{App, GamePhase, Snapshot};
pub use config::{ConfigError, Gender, SessionConfig};
pub use highscores::HighScores;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step (one 60 Hz frame, in milliseconds)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per host frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield (canvas) dimensions
    pub const PLAYFIELD_WIDTH: f32 = 800.0;
    pub const PLAYFIELD_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_SIZE: f32 = 64.0;
    /// Distance from the bottom edge to the player's top edge on reset
    pub const PLAYER_BOTTOM_OFFSET: f32 = 100.0;
    /// Player speed per sensitivity step (pixels per frame)
    pub const SPEED_PER_SENSITIVITY: f32 = 2.0;
    pub const MIN_SENSITIVITY: u8 = 1;
    pub const MAX_SENSITIVITY: u8 = 10;

    /// Bullets
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 20.0;
    pub const BULLET_SPEED: f32 = 10.0;
    pub const MAX_BULLETS: usize = 5;

    /// Enemies
    pub const ENEMY_SIZE: f32 = 64.0;
    pub const ENEMY_BASE_SPEED: f32 = 3.5;
    /// Extra enemy speed per danger level
    pub const DANGER_SPEED_STEP: f32 = 0.5;
    pub const DIVE_SPEED_FACTOR: f32 = 1.5;
    /// Vertical drop when a normal enemy bounces off a side wall
    pub const ENEMY_DROP: f32 = 30.0;
    pub const INITIAL_ENEMIES: usize = 8;
    pub const ENEMY_SPAWN_MIN_Y: f32 = 50.0;
    pub const ENEMY_SPAWN_Y_RANGE: f32 = 150.0;

    /// Session
    pub const INITIAL_LIVES: u8 = 3;
    pub const KILL_BONUS: u64 = 10;
    pub const ANSWER_BONUS: u64 = 50;

    /// Interval timers (milliseconds of simulated time)
    pub const DIFFICULTY_INTERVAL_MS: f64 = 30_000.0;
    pub const DIVE_INTERVAL_MS: f64 = 5_000.0;
    pub const TRIVIA_INTERVAL_MS: f64 = 35_000.0;
    /// Slack when comparing summed frame times against an interval, so
    /// 1800 steps of `FRAME_MS` count as a full 30 s
    pub const TIMER_EPSILON_MS: f64 = 1e-6;
    /// Delay between answering a question and play resuming
    pub const RESUME_DELAY_MS: f64 = 2_000.0;
}

/// Enemy speed for a danger level (pixels per frame)
#[inline]
pub fn enemy_speed(danger_level: u32) -> f32 {
    consts::ENEMY_BASE_SPEED + danger_level as f32 * consts::DANGER_SPEED_STEP
}
