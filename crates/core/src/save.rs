//! Save records
//!
//! JSON shape:
//!
//! ```text
//! {"score":1230,
//!  "availableTokenNames":["Apple","Kiwi",...],
//!  "tiles":[{"x":1,"y":0,"tokenName":"Apple","isRowBomb":false,"isColorBomb":false}, ...],
//!  "buffs":[{"id":"wide-rows","stacks":2}]}
//! ```
//!
//! Older records without the special flags (or without `buffs`) load with
//! everything defaulted to false/empty. Writing and reading files is the
//! caller's business.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::buffs::BuffSaveEntry;
use crate::grid::Grid;
use crate::types::{Pos, Special, Tile, TokenKind};

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save record is empty")]
    Empty,
    #[error("malformed save record: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRecord {
    pub x: i32,
    pub y: i32,
    pub token_name: String,
    #[serde(default)]
    pub is_row_bomb: bool,
    #[serde(default)]
    pub is_color_bomb: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveData {
    #[serde(default)]
    pub score: u32,
    #[serde(default)]
    pub available_token_names: Vec<String>,
    #[serde(default)]
    pub tiles: Vec<TileRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buffs: Vec<BuffSaveEntry>,
}

impl SaveData {
    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        if json.trim().is_empty() {
            return Err(SaveError::Empty);
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Record every tile of `grid`, column by column from the bottom
    pub fn capture(grid: &Grid, score: u32, pool_names: Vec<String>) -> Self {
        let tiles = grid
            .positions()
            .filter_map(|pos| {
                grid.tile(pos).map(|tile| TileRecord {
                    x: pos.x as i32,
                    y: pos.y as i32,
                    token_name: tile.kind.as_str().to_string(),
                    is_row_bomb: tile.is_row_bomb(),
                    is_color_bomb: tile.is_color_bomb(),
                })
            })
            .collect();
        Self {
            score,
            available_token_names: pool_names,
            tiles,
            buffs: Vec::new(),
        }
    }

    /// Place the recorded tiles on an emptied `grid`.
    ///
    /// Records with unknown names, positions off the grid or on a corner are
    /// skipped and leave a gap. Returns how many were skipped.
    pub fn restore_into(&self, grid: &mut Grid) -> u32 {
        grid.clear();
        let mut skipped = 0;
        for record in &self.tiles {
            let Some(tile) = record.tile() else {
                warn!(name = %record.token_name, x = record.x, y = record.y, "unknown token in save, skipped");
                skipped += 1;
                continue;
            };
            let in_range = |v: i32| (0..i8::MAX as i32).contains(&v);
            let placed = in_range(record.x)
                && in_range(record.y)
                && grid.set(Pos::new(record.x as i8, record.y as i8), Some(tile));
            if !placed {
                warn!(x = record.x, y = record.y, "save tile outside playable cells, skipped");
                skipped += 1;
            }
        }
        skipped
    }
}

impl TileRecord {
    /// Decode the tile; a record flagged as both keeps the color bomb.
    pub fn tile(&self) -> Option<Tile> {
        let kind = TokenKind::from_str(&self.token_name)?;
        let special = if self.is_color_bomb {
            Special::ColorBomb
        } else if self.is_row_bomb {
            Special::RowBomb
        } else {
            Special::None
        };
        Some(Tile::new(kind).with_special(special))
    }
}
