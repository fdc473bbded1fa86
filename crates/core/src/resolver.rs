//! Group resolution - scoring, upgrades and removal for one match group
//!
//! | Detected size | Base | Effect |
//! |---------------|------|--------|
//! | 3 | 30 | all tiles removed |
//! | 4 | 60 | keeper becomes a row bomb, others removed |
//! | 5+ | 100 | keeper becomes a color bomb, others removed |
//!
//! A group that contains a row bomb fires it instead (see [`crate::special`]).
//! Only tiles still on the grid are touched, since an earlier group of the same
//! wave may already have cleared some of them.

use crate::detector::MatchGroup;
use crate::grid::Grid;
use crate::modifier::{ScoreModifier, ScoreRequest};
use crate::special::clear_row_with_width;
use crate::types::{
    Pos, Special, TokenKind, BASE_ROW_BOMB_WIDTH, COLOR_BOMB_SCORE, MATCH_3_SCORE,
    ROW_BOMB_FIRE_SCORE, ROW_BOMB_SCORE,
};

/// Base score and upgrade for a group of `size` tiles
pub fn base_score(size: usize) -> (u32, Special) {
    match size {
        0..=3 => (MATCH_3_SCORE, Special::None),
        4 => (ROW_BOMB_SCORE, Special::RowBomb),
        _ => (COLOR_BOMB_SCORE, Special::ColorBomb),
    }
}

/// What happened to one group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Every tile was already gone
    Skipped,
    Cleared {
        kind: TokenKind,
        size: u32,
        score: u32,
        created: Special,
        keeper: Option<Pos>,
    },
    RowBombFired {
        at: Pos,
        width: u32,
        cleared: u32,
        score: u32,
    },
}

impl GroupOutcome {
    pub fn score(&self) -> u32 {
        match *self {
            GroupOutcome::Skipped => 0,
            GroupOutcome::Cleared { score, .. } | GroupOutcome::RowBombFired { score, .. } => score,
        }
    }
}

/// Resolve one group against the grid.
///
/// `chain_depth` is passed to the modifier as `max(1, chain_depth)`.
pub fn resolve_group<M: ScoreModifier + ?Sized>(
    grid: &mut Grid,
    group: &MatchGroup,
    chain_depth: u32,
    modifier: &M,
) -> GroupOutcome {
    let survivors: Vec<Pos> = group
        .cells
        .iter()
        .copied()
        .filter(|&p| grid.tile(p).is_some())
        .collect();
    let Some(&first) = survivors.first() else {
        return GroupOutcome::Skipped;
    };
    let chain_depth = chain_depth.max(1);

    let bomb = survivors
        .iter()
        .copied()
        .find(|&p| grid.tile(p).is_some_and(|t| t.is_row_bomb()));
    if let Some(at) = bomb {
        let kind = grid.kind_at(at).unwrap_or(group.kind);
        let request = ScoreRequest {
            base_score: ROW_BOMB_FIRE_SCORE,
            kind,
            created_row_bomb: true,
            created_color_bomb: false,
            chain_depth,
        };
        let modified = modifier.apply(&request, BASE_ROW_BOMB_WIDTH);
        let width = modified.row_bomb_width.max(1);
        // The bomb sits on the centre row, so the band always takes it.
        let cleared = clear_row_with_width(grid, at.y, width);
        return GroupOutcome::RowBombFired {
            at,
            width: width as u32,
            cleared,
            score: modified.score,
        };
    }

    let kind = grid.kind_at(first).unwrap_or(group.kind);
    let (base, created) = base_score(group.len());
    let request = ScoreRequest {
        base_score: base,
        kind,
        created_row_bomb: created == Special::RowBomb,
        created_color_bomb: created == Special::ColorBomb,
        chain_depth,
    };
    let modified = modifier.apply(&request, BASE_ROW_BOMB_WIDTH);

    let keeper = (created != Special::None).then_some(first);
    for &pos in &survivors {
        if Some(pos) == keeper {
            if let Some(tile) = grid.tile(pos) {
                grid.set(pos, Some(tile.with_special(created)));
            }
        } else {
            grid.take(pos);
        }
    }

    GroupOutcome::Cleared {
        kind,
        size: group.len() as u32,
        score: modified.score,
        created,
        keeper,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifier::NoModifiers;
    use crate::types::Tile;

    fn row_group(grid: &mut Grid, y: i8, xs: std::ops::Range<i8>, kind: TokenKind) -> MatchGroup {
        let cells: Vec<Pos> = xs.map(|x| Pos::new(x, y)).collect();
        for &p in &cells {
            grid.set(p, Some(Tile::new(kind)));
        }
        MatchGroup { kind, cells }
    }

    #[test]
    fn test_base_score_table() {
        assert_eq!(base_score(3), (30, Special::None));
        assert_eq!(base_score(4), (60, Special::RowBomb));
        assert_eq!(base_score(5), (100, Special::ColorBomb));
        assert_eq!(base_score(9), (100, Special::ColorBomb));
    }

    #[test]
    fn test_five_keeps_color_bomb_on_first_tile() {
        let mut grid = Grid::new(8, 8);
        let group = row_group(&mut grid, 3, 1..6, TokenKind::Peach);
        let outcome = resolve_group(&mut grid, &group, 0, &NoModifiers);
        assert_eq!(outcome.score(), 100);
        assert!(grid.tile(Pos::new(1, 3)).unwrap().is_color_bomb());
        assert_eq!(grid.tile_count(), 1);
    }

    #[test]
    fn test_group_with_nothing_left_is_skipped() {
        let mut grid = Grid::new(8, 8);
        let group = row_group(&mut grid, 3, 1..4, TokenKind::Peach);
        grid.clear();
        assert_eq!(resolve_group(&mut grid, &group, 1, &NoModifiers), GroupOutcome::Skipped);
    }

    #[test]
    fn test_partially_cleared_group_keeps_detected_size() {
        let mut grid = Grid::new(8, 8);
        let group = row_group(&mut grid, 3, 1..5, TokenKind::Mango);
        grid.take(Pos::new(1, 3));
        match resolve_group(&mut grid, &group, 1, &NoModifiers) {
            GroupOutcome::Cleared { size, created, keeper, .. } => {
                assert_eq!(size, 4);
                assert_eq!(created, Special::RowBomb);
                assert_eq!(keeper, Some(Pos::new(2, 3)));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(grid.tile(Pos::new(2, 3)).unwrap().is_row_bomb());
        assert_eq!(grid.tile_count(), 1);
    }
}
