//! Session configuration
//!
//! Collected on the home screen and checked before a session is created.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Player gender, picked on the home screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Reasons a session refuses to start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("player name must not be empty")]
    EmptyName,
    #[error("a gender must be selected before starting")]
    MissingGender,
    #[error("sensitivity {0} is outside 1..=10")]
    SensitivityOutOfRange(u8),
    #[error("playfield {width}x{height} cannot fit the player ship and an enemy")]
    PlayfieldTooSmall { width: f32, height: f32 },
}

/// Everything needed to start a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub name: String,
    pub gender: Option<Gender>,
    /// Movement sensitivity slider value
    pub sensitivity: u8,
    pub width: f32,
    pub height: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            gender: None,
            sensitivity: 3,
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
        }
    }
}

impl SessionConfig {
    pub fn new(name: impl Into<String>, gender: Gender, sensitivity: u8) -> Self {
        Self {
            name: name.into(),
            gender: Some(gender),
            sensitivity,
            ..Default::default()
        }
    }

    /// Check every field, reporting the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.gender.is_none() {
            return Err(ConfigError::MissingGender);
        }
        if !(MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&self.sensitivity) {
            return Err(ConfigError::SensitivityOutOfRange(self.sensitivity));
        }
        // The player spawns PLAYER_BOTTOM_OFFSET above the bottom edge and
        // enemies need a full body width to sweep across
        let min_width = PLAYER_SIZE.max(ENEMY_SIZE) * 2.0;
        let min_height = ENEMY_SPAWN_MIN_Y + ENEMY_SPAWN_Y_RANGE + PLAYER_BOTTOM_OFFSET;
        if !(self.width >= min_width && self.height >= min_height) {
            return Err(ConfigError::PlayfieldTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Player name with surrounding whitespace removed
    pub fn player_name(&self) -> &str {
        self.name.trim()
    }

    /// Player speed in pixels per frame
    pub fn player_speed(&self) -> f32 {
        self.sensitivity as f32 * SPEED_PER_SENSITIVITY
    }
}
