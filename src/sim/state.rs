//! Session state and entity types
//!
//! Everything a running session owns lives in [`GameState`]. Entities carry
//! stable ids so removals can be decided first and applied afterwards.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// Side-effect signals produced by the simulation for the outer layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A bullet was fired
    Laser,
    /// A bullet destroyed an enemy
    Explosion { enemy_id: u32 },
    /// An enemy rammed the player
    LifeLost { lives: u8 },
    /// Lives reached zero
    SessionEnded { score: u64 },
    /// Time for a trivia question
    TriviaDue,
    /// Difficulty ramp ticked
    DangerLevelUp { level: u32 },
    /// A normal enemy switched to diving
    EnemyDiving { enemy_id: u32 },
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Per-frame velocity, set by the input layer
    pub vel: Vec2,
    /// Magnitude used for velocity intents
    pub speed: f32,
}

impl Player {
    pub fn new(speed: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            speed,
        }
    }

    /// Move to the spawn point near the bottom centre and stop
    pub fn reset(&mut self, width: f32, height: f32) {
        self.pos = Vec2::new(
            width / 2.0 - PLAYER_SIZE / 2.0,
            height - PLAYER_BOTTOM_OFFSET,
        );
        self.vel = Vec2::ZERO;
    }

    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, Vec2::splat(PLAYER_SIZE))
    }
}

/// A player bullet travelling straight up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: u32,
    pub pos: Vec2,
}

impl Bullet {
    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, Vec2::new(BULLET_WIDTH, BULLET_HEIGHT))
    }
}

/// How an enemy moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyBehavior {
    /// Sweeps sideways, dropping a row at each wall
    #[default]
    Normal,
    /// Falls straight down until it leaves the playfield
    Diving,
}

/// A descending enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Vec2,
    /// Horizontal direction, +1 right / -1 left
    pub direction: f32,
    pub behavior: EnemyBehavior,
}

impl Enemy {
    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, Vec2::splat(ENEMY_SIZE))
    }
}

/// Interval timers, in milliseconds accumulated since each last fired
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pub difficulty_ms: f64,
    pub dive_ms: f64,
    pub trivia_ms: f64,
}

/// Complete session state (deterministic for a given seed and input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Session seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    /// Playfield dimensions
    pub width: f32,
    pub height: f32,
    pub player: Player,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub score: u64,
    pub lives: u8,
    pub danger_level: u32,
    pub timers: Timers,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Start a fresh session: full lives, zero score, initial enemy wave
    pub fn new(seed: u64, width: f32, height: f32, player_speed: f32) -> Self {
        let mut player = Player::new(player_speed);
        player.reset(width, height);

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            width,
            height,
            player,
            bullets: Vec::new(),
            enemies: Vec::new(),
            score: 0,
            lives: INITIAL_LIVES,
            danger_level: 1,
            timers: Timers::default(),
            time_ticks: 0,
            next_id: 1,
        };
        state.spawn_enemies(INITIAL_ENEMIES);
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lives are gone; nothing more will happen in this session
    pub fn is_over(&self) -> bool {
        self.lives == 0
    }

    /// Spawn `count` normal enemies at random spots in the upper band
    pub fn spawn_enemies(&mut self, count: usize) {
        for _ in 0..count {
            let id = self.next_entity_id();
            let x = self.rng.random::<f32>() * (self.width - ENEMY_SIZE);
            let y = self.rng.random::<f32>() * ENEMY_SPAWN_Y_RANGE + ENEMY_SPAWN_MIN_Y;
            log::debug!("Spawned enemy {} at ({:.0}, {:.0})", id, x, y);
            self.enemies.push(Enemy {
                id,
                pos: Vec2::new(x, y),
                direction: 1.0,
                behavior: EnemyBehavior::Normal,
            });
        }
    }

    /// Switch one randomly chosen normal enemy to diving.
    /// Returns its id, or None when every enemy is already diving.
    pub fn start_dive(&mut self) -> Option<u32> {
        let candidates: Vec<usize> = self
            .enemies
            .iter()
            .enumerate()
            .filter(|(_, e)| e.behavior == EnemyBehavior::Normal)
            .map(|(i, _)| i)
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let pick = candidates[self.rng.random_range(0..candidates.len())];
        let enemy = &mut self.enemies[pick];
        enemy.behavior = EnemyBehavior::Diving;
        Some(enemy.id)
    }

    /// Fire a bullet from the top centre of the player, if under the cap
    pub fn fire(&mut self) -> Option<GameEvent> {
        if self.is_over() || self.bullets.len() >= MAX_BULLETS {
            return None;
        }
        let id = self.next_entity_id();
        let pos = Vec2::new(
            self.player.pos.x + PLAYER_SIZE / 2.0 - BULLET_WIDTH / 2.0,
            self.player.pos.y,
        );
        self.bullets.push(Bullet { id, pos });
        Some(GameEvent::Laser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_defaults() {
        let state = GameState::new(7, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.danger_level, 1);
        assert_eq!(state.enemies.len(), INITIAL_ENEMIES);
        assert!(state.bullets.is_empty());
        assert_eq!(state.player.pos, Vec2::new(368.0, 500.0));
    }

    #[test]
    fn test_enemies_spawn_inside_upper_band() {
        let state = GameState::new(42, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        for enemy in &state.enemies {
            assert!(enemy.pos.x >= 0.0 && enemy.pos.x + ENEMY_SIZE <= PLAYFIELD_WIDTH);
            assert!(enemy.pos.y >= ENEMY_SPAWN_MIN_Y);
            assert!(enemy.pos.y < ENEMY_SPAWN_MIN_Y + ENEMY_SPAWN_Y_RANGE);
            assert_eq!(enemy.behavior, EnemyBehavior::Normal);
        }
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut state = GameState::new(3, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        state.fire();
        state.spawn_enemies(4);
        let mut ids: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        ids.extend(state.bullets.iter().map(|b| b.id));
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn test_fire_respects_cap() {
        let mut state = GameState::new(1, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        for _ in 0..MAX_BULLETS {
            assert_eq!(state.fire(), Some(GameEvent::Laser));
        }
        assert_eq!(state.fire(), None);
        assert_eq!(state.bullets.len(), MAX_BULLETS);
    }

    #[test]
    fn test_bullet_leaves_from_player_centre() {
        let mut state = GameState::new(1, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        state.fire();
        let bullet = &state.bullets[0];
        assert_eq!(bullet.pos.x, state.player.pos.x + 29.5);
        assert_eq!(bullet.pos.y, state.player.pos.y);
    }

    #[test]
    fn test_start_dive_picks_only_normal_enemies() {
        let mut state = GameState::new(9, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        for _ in 0..INITIAL_ENEMIES {
            assert!(state.start_dive().is_some());
        }
        assert!(
            state
                .enemies
                .iter()
                .all(|e| e.behavior == EnemyBehavior::Diving)
        );
        assert_eq!(state.start_dive(), None);
    }

    #[test]
    fn test_same_seed_same_wave() {
        let a = GameState::new(1234, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        let b = GameState::new(1234, PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT, 6.0);
        for (ea, eb) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(ea.pos, eb.pos);
        }
    }
}
