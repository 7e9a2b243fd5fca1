//! Game settings and preferences
//!
//! Persisted separately from sessions in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::config::{Gender, SessionConfig};
use crate::storage;

const STORAGE_KEY: &str = "quiz_shooter_settings";

/// Background music tracks, in menu order
pub const MUSIC_TRACKS: [&str; 3] = [
    "Sound 1 (Default)",
    "Sound 2 (SLAVA!)",
    "Sound 3 (One Kiss)",
];

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // === Audio ===
    /// Sound effects and music on/off
    pub sound_enabled: bool,
    /// Index into MUSIC_TRACKS
    pub music_track: usize,

    // === Home screen ===
    /// Last used sensitivity
    pub sensitivity: u8,
    /// Last entered player name
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            music_track: 0,
            sensitivity: 3,
            player_name: String::new(),
            gender: None,
        }
    }
}

impl Settings {
    /// Flip sound on/off, returning the new state
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    /// Step through the music tracks, wrapping at either end
    pub fn cycle_music(&mut self, direction: i32) {
        let len = MUSIC_TRACKS.len() as i32;
        let current = (self.music_track as i32).rem_euclid(len);
        self.music_track = (current + direction).rem_euclid(len) as usize;
    }

    /// Display name of the selected track
    pub fn music_name(&self) -> &'static str {
        MUSIC_TRACKS[self.music_track % MUSIC_TRACKS.len()]
    }

    /// Session config pre-filled from the remembered home screen values
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            name: self.player_name.clone(),
            gender: self.gender,
            sensitivity: self.sensitivity,
            ..Default::default()
        }
    }

    /// Remember the home screen values of a started session
    pub fn remember(&mut self, config: &SessionConfig) {
        self.player_name = config.player_name().to_string();
        self.gender = config.gender;
        self.sensitivity = config.sensitivity;
    }

    /// Stored settings, or defaults when there are none
    pub fn load() -> Self {
        storage::load_json(STORAGE_KEY).unwrap_or_else(|| {
            log::info!("Using default settings");
            Self::default()
        })
    }

    pub fn save(&self) {
        storage::save_json(STORAGE_KEY, self);
    }
}
