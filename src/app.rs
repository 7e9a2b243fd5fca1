//! Screen state machine
//!
//! Owns the running session and decides when the simulation steps. The
//! simulation only ever advances in [`GamePhase::Playing`]; every other screen
//! freezes it until a transition brings play back.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::config::{ConfigError, SessionConfig};
use crate::consts::*;
use crate::highscores::HighScores;
use crate::input::{Axis, KeyAction, key_down_action, key_up_axis};
use crate::settings::{MUSIC_TRACKS, Settings};
use crate::sim::{EnemyBehavior, GameEvent, GameState, Rect, advance};
use crate::trivia::{Question, QuestionBank};

/// Which screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GamePhase {
    /// Title screen with name, gender and sensitivity inputs
    #[default]
    Home,
    /// Simulation running
    Playing,
    /// Frozen by the player
    Paused,
    /// Lives ran out
    GameOver,
    /// Frozen while a trivia question is up
    Question,
}

/// Things that can move the machine between screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Start,
    TogglePause,
    TriviaDue,
    /// The post-answer delay ran out
    ResumeElapsed,
    SessionEnded,
    /// Enter on the game-over screen
    Confirm,
    Quit,
}

/// The transition table. `None` means the trigger is ignored in `from`.
pub fn transition(from: GamePhase, trigger: Trigger) -> Option<GamePhase> {
    use GamePhase::*;
    match (from, trigger) {
        (Home, Trigger::Start) => Some(Playing),
        (Playing, Trigger::TogglePause) => Some(Paused),
        (Paused, Trigger::TogglePause) => Some(Playing),
        (Playing, Trigger::TriviaDue) => Some(Question),
        (Question, Trigger::ResumeElapsed) => Some(Playing),
        (Playing, Trigger::SessionEnded) => Some(GameOver),
        (GameOver, Trigger::Confirm) => Some(Home),
        (Playing | Paused | GameOver | Question, Trigger::Quit) => Some(Home),
        _ => None,
    }
}

/// The question on screen and how it was answered
#[derive(Debug, Clone, Serialize)]
pub struct ActiveQuestion {
    pub question: Question,
    /// `Some(correct)` once answered
    pub verdict: Option<bool>,
    /// Time left before play resumes, counted only after answering
    pub resume_in_ms: f64,
}

/// An enemy as the presentation layer sees it
#[derive(Debug, Clone, Serialize)]
pub struct EnemyView {
    pub rect: Rect,
    pub diving: bool,
}

/// Everything the presentation layer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub width: f32,
    pub height: f32,
    pub player: Option<Rect>,
    pub bullets: Vec<Rect>,
    pub enemies: Vec<EnemyView>,
    pub score: u64,
    pub danger_level: u32,
    pub lives: u8,
    pub question: Option<ActiveQuestion>,
    pub sound_enabled: bool,
    pub music: &'static str,
    pub high_score: Option<u64>,
}

/// The game as a whole: screens, session, preferences
pub struct App {
    phase: GamePhase,
    session: Option<GameState>,
    player_name: String,
    question: Option<ActiveQuestion>,
    bank: QuestionBank,
    settings: Settings,
    high_scores: HighScores,
    rng: Pcg32,
}

impl App {
    pub fn new(seed: u64, settings: Settings, high_scores: HighScores) -> Self {
        Self {
            phase: GamePhase::Home,
            session: None,
            player_name: String::new(),
            question: None,
            bank: QuestionBank::default(),
            settings,
            high_scores,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Replace the built-in question bank
    pub fn with_bank(mut self, bank: QuestionBank) -> Self {
        self.bank = bank;
        self
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> Option<&GameState> {
        self.session.as_ref()
    }

    pub fn question(&self) -> Option<&ActiveQuestion> {
        self.question.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    /// Apply a trigger through the transition table
    fn fire(&mut self, trigger: Trigger) -> bool {
        match transition(self.phase, trigger) {
            Some(next) => {
                log::info!("{:?} -> {:?} ({:?})", self.phase, next, trigger);
                self.phase = next;
                true
            }
            None => {
                log::debug!("Ignored {:?} in {:?}", trigger, self.phase);
                false
            }
        }
    }

    /// Start a new session from the home screen.
    ///
    /// The config is checked first; an invalid one leaves the app on the
    /// home screen and reports why. Returns `Ok(false)` when the current
    /// screen has no start, leaving any running session untouched.
    pub fn start(&mut self, config: &SessionConfig) -> Result<bool, ConfigError> {
        config.validate()?;
        if transition(self.phase, Trigger::Start).is_none() {
            log::debug!("Start ignored in {:?}", self.phase);
            return Ok(false);
        }

        let seed: u64 = self.rng.random();
        self.session = Some(GameState::new(
            seed,
            config.width,
            config.height,
            config.player_speed(),
        ));
        self.player_name = config.player_name().to_string();
        self.question = None;
        self.settings.remember(config);
        self.settings.save();
        self.fire(Trigger::Start);

        log::info!(
            "Session started for {} ({}, seed {}, speed {})",
            self.player_name,
            config.gender.map_or("-", |g| g.as_str()),
            seed,
            config.player_speed()
        );
        Ok(true)
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.fire(Trigger::TogglePause)
    }

    /// Abandon the session and return to the home screen
    pub fn quit(&mut self) {
        if self.fire(Trigger::Quit) {
            self.end_session();
        }
    }

    /// Leave the game-over screen
    pub fn confirm(&mut self) {
        if self.fire(Trigger::Confirm) {
            self.end_session();
        }
    }

    fn end_session(&mut self) {
        self.session = None;
        self.question = None;
    }

    pub fn toggle_sound(&mut self) -> bool {
        let enabled = self.settings.toggle_sound();
        self.settings.save();
        enabled
    }

    pub fn cycle_music(&mut self, direction: i32) -> &'static str {
        self.settings.cycle_music(direction);
        self.settings.save();
        self.settings.music_name()
    }

    /// Index of the backing track that should be looping right now.
    ///
    /// Music only plays over a running session with sound on.
    pub fn music_track(&self) -> Option<usize> {
        (self.phase == GamePhase::Playing && self.settings.sound_enabled)
            .then(|| self.settings.music_track % MUSIC_TRACKS.len())
    }

    /// Handle a key press. Returns any signals it caused (a fired shot).
    pub fn key_down(&mut self, key: &str) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let Some(action) = key_down_action(key) else {
            return events;
        };

        match (self.phase, action) {
            (GamePhase::Playing, KeyAction::Move { axis, sign }) => {
                if let Some(session) = self.session.as_mut() {
                    let player = &mut session.player;
                    match axis {
                        Axis::Horizontal => player.vel.x = sign * player.speed,
                        Axis::Vertical => player.vel.y = sign * player.speed,
                    }
                }
            }
            (GamePhase::Playing, KeyAction::Fire) => {
                if let Some(event) = self.session.as_mut().and_then(|s| s.fire()) {
                    events.push(event);
                }
            }
            (GamePhase::Playing | GamePhase::Paused, KeyAction::TogglePause) => {
                self.toggle_pause();
            }
            (GamePhase::GameOver, KeyAction::Confirm) => self.confirm(),
            _ => {}
        }
        events
    }

    /// Handle a key release; stops movement on that key's axis
    pub fn key_up(&mut self, key: &str) {
        let (Some(axis), Some(session)) = (key_up_axis(key), self.session.as_mut()) else {
            return;
        };
        match axis {
            Axis::Horizontal => session.player.vel.x = 0.0,
            Axis::Vertical => session.player.vel.y = 0.0,
        }
    }

    /// Answer the question on screen. Returns whether it was correct, or
    /// None if there is no unanswered question.
    pub fn answer(&mut self, selected: &str) -> Option<bool> {
        if self.phase != GamePhase::Question {
            return None;
        }
        let active = self.question.as_mut()?;
        if active.verdict.is_some() {
            return None;
        }

        let correct = active.question.is_correct(selected);
        active.verdict = Some(correct);
        active.resume_in_ms = RESUME_DELAY_MS;
        if correct {
            if let Some(session) = self.session.as_mut() {
                session.score += ANSWER_BONUS;
            }
        }
        log::info!(
            "Answered {:?}: {}",
            selected,
            if correct { "correct" } else { "wrong" }
        );
        Some(correct)
    }

    /// One fixed step of the frame driver.
    ///
    /// Steps the simulation while playing, counts down the post-answer delay
    /// while a question is up, and does nothing on other screens.
    pub fn frame(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        match self.phase {
            GamePhase::Playing => self.step_session(dt_ms),
            GamePhase::Question => {
                self.count_down_resume(dt_ms);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn step_session(&mut self, dt_ms: f64) -> Vec<GameEvent> {
        let Some(session) = self.session.as_mut() else {
            debug_assert!(false, "playing without a session");
            return Vec::new();
        };
        let events = advance(session, dt_ms);
        let (score, danger_level) = (session.score, session.danger_level);

        // Game over wins over a question due on the same tick
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::SessionEnded { .. }))
        {
            self.fire(Trigger::SessionEnded);
            if let Some(rank) = self
                .high_scores
                .add_score(&self.player_name, score, danger_level)
            {
                log::info!("New high score #{}: {}", rank, score);
                self.high_scores.save();
            }
        } else if events.contains(&GameEvent::TriviaDue) {
            match self.bank.draw(&mut self.rng).cloned() {
                Some(question) => {
                    self.question = Some(ActiveQuestion {
                        question,
                        verdict: None,
                        resume_in_ms: RESUME_DELAY_MS,
                    });
                    self.fire(Trigger::TriviaDue);
                }
                None => log::warn!("Trivia due but the question bank is empty"),
            }
        }
        events
    }

    fn count_down_resume(&mut self, dt_ms: f64) {
        let Some(active) = self.question.as_mut() else {
            return;
        };
        if active.verdict.is_none() {
            return;
        }
        active.resume_in_ms -= dt_ms;
        if active.resume_in_ms <= 0.0 {
            self.question = None;
            self.fire(Trigger::ResumeElapsed);
        }
    }

    /// The subset of `events` that should make a sound, given settings
    pub fn audible(&self, events: &[GameEvent]) -> Vec<GameEvent> {
        if !self.settings.sound_enabled {
            return Vec::new();
        }
        events
            .iter()
            .copied()
            .filter(|e| {
                matches!(
                    e,
                    GameEvent::Laser | GameEvent::Explosion { .. } | GameEvent::SessionEnded { .. }
                )
            })
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        let session = self.session.as_ref();
        Snapshot {
            phase: self.phase,
            width: session.map_or(PLAYFIELD_WIDTH, |s| s.width),
            height: session.map_or(PLAYFIELD_HEIGHT, |s| s.height),
            player: session.map(|s| s.player.rect()),
            bullets: session
                .map(|s| s.bullets.iter().map(|b| b.rect()).collect())
                .unwrap_or_default(),
            enemies: session
                .map(|s| {
                    s.enemies
                        .iter()
                        .map(|e| EnemyView {
                            rect: e.rect(),
                            diving: e.behavior == EnemyBehavior::Diving,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            score: session.map_or(0, |s| s.score),
            danger_level: session.map_or(1, |s| s.danger_level),
            lives: session.map_or(INITIAL_LIVES, |s| s.lives),
            question: self.question.clone(),
            sound_enabled: self.settings.sound_enabled,
            music: self.settings.music_name(),
            high_score: self.high_scores.top_score(),
        }
    }
}
