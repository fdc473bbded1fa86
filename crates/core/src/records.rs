//! Finished-game records
//!
//! JSON shape:
//!
//! ```text
//! {"records":[{"playerName":"ana","score":4210}, ...]}
//! ```
//!
//! Records are kept in the order the games ended; [`RecordBook::ranked`] gives
//! the leaderboard view. Storage is the caller's business, as with saves.

use serde::{Deserialize, Serialize};

use crate::save::SaveError;

/// Name used when a player leaves theirs blank
pub const ANONYMOUS_PLAYER: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub player_name: String,
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBook {
    #[serde(default)]
    records: Vec<GameRecord>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        if json.trim().is_empty() {
            return Err(SaveError::Empty);
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Append a finished game. A blank name is recorded as [`ANONYMOUS_PLAYER`].
    pub fn add(&mut self, player_name: &str, score: u32) {
        let name = player_name.trim();
        let player_name = if name.is_empty() {
            ANONYMOUS_PLAYER
        } else {
            name
        };
        self.records.push(GameRecord {
            player_name: player_name.to_string(),
            score,
        });
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Records in the order they were added
    pub fn records(&self) -> &[GameRecord] {
        &self.records
    }

    /// Highest score first; equal scores keep their insertion order
    pub fn ranked(&self) -> Vec<&GameRecord> {
        let mut ranked: Vec<&GameRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked
    }

    pub fn best(&self) -> Option<&GameRecord> {
        self.ranked().into_iter().next()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
