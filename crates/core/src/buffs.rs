//! Buff book - stacking score modifiers
//!
//! A ready-made [`ScoreModifier`] holding the buffs picked during a run. The
//! multiplier starts at 1 and every active buff adds to it:
//!
//! | Kind | Applies when | Adds |
//! |------|--------------|------|
//! | `FruitScorePercent` | group kind is the target | `percent/100 x stacks` |
//! | `ColorBombTotalBonus` | a color bomb is involved | `percent/100 x stacks` |
//! | `ChainLayerBonusPercent` | chain depth > 1 | `percent/100 x (depth-1) x stacks` |
//! | `RowBombExtraWidth` | a row bomb is involved | `extra x stacks` rows of width |
//!
//! The final score is `base x multiplier` rounded half to even, never negative.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::modifier::{ModifiedScore, ScoreModifier, ScoreRequest};
use crate::types::TokenKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BuffKind {
    FruitScorePercent { target: TokenKind, percent: f32 },
    RowBombExtraWidth { extra: i32 },
    ColorBombTotalBonus { percent: f32 },
    ChainLayerBonusPercent { percent: f32 },
}

/// Catalog entry for one buff
#[derive(Debug, Clone, PartialEq)]
pub struct BuffDef {
    pub id: String,
    pub kind: BuffKind,
    pub stackable: bool,
    pub max_stacks: u32,
}

impl BuffDef {
    /// Stackable definition with the usual cap of 99
    pub fn new(id: impl Into<String>, kind: BuffKind) -> Self {
        Self {
            id: id.into(),
            kind,
            stackable: true,
            max_stacks: 99,
        }
    }

    pub fn unique(mut self) -> Self {
        self.stackable = false;
        self
    }

    pub fn max_stacks(mut self, max: u32) -> Self {
        self.max_stacks = max;
        self
    }
}

/// Persisted `{id, stacks}` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuffSaveEntry {
    pub id: String,
    pub stacks: u32,
}

#[derive(Debug, Clone, Default)]
pub struct BuffBook {
    /// Active buffs in pick order
    active: Vec<(BuffDef, u32)>,
}

impl BuffBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one stack of `def`.
    ///
    /// Returns false when the buff is already active and not stackable.
    /// Stackable buffs stop growing at `max(1, max_stacks)`.
    pub fn add(&mut self, def: BuffDef) -> bool {
        if let Some((known, stacks)) = self.active.iter_mut().find(|(d, _)| d.id == def.id) {
            if !known.stackable {
                return false;
            }
            *stacks = (*stacks + 1).min(known.max_stacks.max(1));
            debug!(id = %known.id, stacks = *stacks, "buff stacked");
            return true;
        }
        debug!(id = %def.id, "buff added");
        self.active.push((def, 1));
        true
    }

    pub fn stacks(&self, id: &str) -> u32 {
        self.active
            .iter()
            .find(|(d, _)| d.id == id)
            .map_or(0, |(_, s)| *s)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BuffDef, u32)> {
        self.active.iter().map(|(d, s)| (d, *s))
    }

    /// Drop every buff (new run)
    pub fn reset(&mut self) {
        self.active.clear();
    }

    pub fn save_entries(&self) -> Vec<BuffSaveEntry> {
        self.active
            .iter()
            .map(|(d, s)| BuffSaveEntry {
                id: d.id.clone(),
                stacks: *s,
            })
            .collect()
    }

    /// Replace the active set from saved entries.
    ///
    /// Ids missing from `catalog` are skipped; stacks are raised to at least 1.
    pub fn load_entries(&mut self, entries: &[BuffSaveEntry], catalog: &[BuffDef]) {
        self.active.clear();
        for entry in entries {
            if entry.id.is_empty() {
                continue;
            }
            let Some(def) = catalog.iter().find(|d| d.id == entry.id) else {
                warn!(id = %entry.id, "unknown buff in save, skipped");
                continue;
            };
            let stacks = entry.stacks.max(1);
            match self.active.iter_mut().find(|(d, _)| d.id == entry.id) {
                Some((_, s)) => *s = stacks,
                None => self.active.push((def.clone(), stacks)),
            }
        }
    }
}

impl ScoreModifier for BuffBook {
    fn apply(&self, request: &ScoreRequest, row_bomb_width: i32) -> ModifiedScore {
        if self.active.is_empty() {
            return ModifiedScore {
                score: request.base_score,
                row_bomb_width,
            };
        }

        let mut multiplier = 1.0f64;
        let mut extra_width = 0i32;
        for (def, stacks) in &self.active {
            let stacks = (*stacks).max(1);
            match def.kind {
                BuffKind::FruitScorePercent { target, percent } => {
                    if target == request.kind {
                        multiplier += percent as f64 / 100.0 * stacks as f64;
                    }
                }
                BuffKind::RowBombExtraWidth { extra } => {
                    if request.created_row_bomb {
                        extra_width = extra_width.saturating_add(extra.saturating_mul(stacks as i32));
                    }
                }
                BuffKind::ColorBombTotalBonus { percent } => {
                    if request.created_color_bomb {
                        multiplier += percent as f64 / 100.0 * stacks as f64;
                    }
                }
                BuffKind::ChainLayerBonusPercent { percent } => {
                    if request.chain_depth > 1 {
                        let layers = (request.chain_depth - 1) as f64;
                        multiplier += percent as f64 / 100.0 * layers * stacks as f64;
                    }
                }
            }
        }

        let row_bomb_width = if extra_width != 0 {
            row_bomb_width.saturating_add(extra_width).max(1)
        } else {
            row_bomb_width
        };
        let score = (request.base_score as f64 * multiplier).round_ties_even().max(0.0);

        ModifiedScore {
            score: score as u32,
            row_bomb_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(base: u32, kind: TokenKind) -> ScoreRequest {
        ScoreRequest {
            base_score: base,
            kind,
            created_row_bomb: false,
            created_color_bomb: false,
            chain_depth: 1,
        }
    }

    #[test]
    fn test_empty_book_is_identity() {
        let book = BuffBook::new();
        let out = book.apply(&request(60, TokenKind::Apple), 1);
        assert_eq!(out, ModifiedScore { score: 60, row_bomb_width: 1 });
    }

    #[test]
    fn test_fruit_percent_only_for_target() {
        let mut book = BuffBook::new();
        book.add(BuffDef::new(
            "apple-50",
            BuffKind::FruitScorePercent { target: TokenKind::Apple, percent: 50.0 },
        ));
        assert_eq!(book.apply(&request(30, TokenKind::Apple), 1).score, 45);
        assert_eq!(book.apply(&request(30, TokenKind::Kiwi), 1).score, 30);
    }

    #[test]
    fn test_rounds_half_to_even() {
        let mut book = BuffBook::new();
        book.add(BuffDef::new("chain", BuffKind::ChainLayerBonusPercent { percent: 25.0 }));
        let mut req = request(30, TokenKind::Pear);
        req.chain_depth = 2;
        // 30 * 1.25 = 37.5
        assert_eq!(book.apply(&req, 1).score, 38);
        req.base_score = 50;
        // 50 * 1.25 = 62.5
        assert_eq!(book.apply(&req, 1).score, 62);
        req.chain_depth = 1;
        assert_eq!(book.apply(&req, 1).score, 50);
    }

    #[test]
    fn test_color_bomb_bonus_needs_color_bomb() {
        let mut book = BuffBook::new();
        book.add(BuffDef::new("cb", BuffKind::ColorBombTotalBonus { percent: 100.0 }));
        let mut req = request(100, TokenKind::Grape);
        assert_eq!(book.apply(&req, 1).score, 100);
        req.created_color_bomb = true;
        assert_eq!(book.apply(&req, 1).score, 200);
    }

    #[test]
    fn test_row_width_accumulates_and_clamps() {
        let mut book = BuffBook::new();
        book.add(BuffDef::new("wide", BuffKind::RowBombExtraWidth { extra: 1 }));
        book.add(BuffDef::new("wide", BuffKind::RowBombExtraWidth { extra: 1 }));
        let mut req = request(60, TokenKind::Lemon);
        assert_eq!(book.apply(&req, 1).row_bomb_width, 1);
        req.created_row_bomb = true;
        assert_eq!(book.apply(&req, 1).row_bomb_width, 3);

        let mut narrow = BuffBook::new();
        narrow.add(BuffDef::new("narrow", BuffKind::RowBombExtraWidth { extra: -4 }));
        assert_eq!(narrow.apply(&req, 1).row_bomb_width, 1);
    }

    #[test]
    fn test_stacking_rules() {
        let mut book = BuffBook::new();
        let once = BuffDef::new("once", BuffKind::ColorBombTotalBonus { percent: 10.0 }).unique();
        assert!(book.add(once.clone()));
        assert!(!book.add(once));
        assert_eq!(book.stacks("once"), 1);

        let capped = BuffDef::new("capped", BuffKind::ColorBombTotalBonus { percent: 10.0 }).max_stacks(2);
        for _ in 0..5 {
            assert!(book.add(capped.clone()));
        }
        assert_eq!(book.stacks("capped"), 2);

        let zero_cap = BuffDef::new("zero", BuffKind::ColorBombTotalBonus { percent: 10.0 }).max_stacks(0);
        book.add(zero_cap.clone());
        book.add(zero_cap);
        assert_eq!(book.stacks("zero"), 1);
    }

    #[test]
    fn test_save_entries_reload_against_catalog() {
        let catalog = vec![
            BuffDef::new("a", BuffKind::RowBombExtraWidth { extra: 1 }),
            BuffDef::new("b", BuffKind::ChainLayerBonusPercent { percent: 5.0 }),
        ];
        let mut book = BuffBook::new();
        book.add(catalog[0].clone());
        book.add(catalog[0].clone());
        book.add(catalog[1].clone());
        let mut entries = book.save_entries();
        entries.push(BuffSaveEntry { id: "gone".into(), stacks: 3 });
        entries.push(BuffSaveEntry { id: String::new(), stacks: 1 });

        let json = serde_json::to_string(&entries).unwrap();
        let parsed: Vec<BuffSaveEntry> = serde_json::from_str(&json).unwrap();

        let mut restored = BuffBook::new();
        restored.load_entries(&parsed, &catalog);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.stacks("a"), 2);
        assert_eq!(restored.stacks("b"), 1);

        restored.reset();
        assert!(restored.is_empty());
    }
}
