//! Top-ten leaderboard
//!
//! Kept in LocalStorage in the browser; native runs keep it in memory only.

use serde::{Deserialize, Serialize};

use crate::storage;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

const STORAGE_KEY: &str = "quiz_shooter_highscores";

/// A single high score entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighScoreEntry {
    /// Player's name
    pub name: String,
    /// Player's score
    pub score: u64,
    /// Danger level reached
    pub danger_level: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would `score` make it onto the board?
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0
            && (self.entries.len() < MAX_HIGH_SCORES
                || self.entries.last().is_some_and(|lowest| score > lowest.score))
    }

    /// Record a finished session. Returns its 1-based rank, or None if it
    /// did not make the board.
    pub fn add_score(&mut self, name: &str, score: u64, danger_level: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        // Board is sorted by score, descending; ties rank behind earlier runs
        let index = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(
            index,
            HighScoreEntry {
                name: name.to_string(),
                score,
                danger_level,
            },
        );
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(index + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get the top score (if any)
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Stored leaderboard, or an empty one
    pub fn load() -> Self {
        match storage::load_json::<HighScores>(STORAGE_KEY) {
            Some(scores) => {
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        storage::save_json(STORAGE_KEY, self);
    }
}
