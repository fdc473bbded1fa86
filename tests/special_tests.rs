//! Special tile tests: row-bomb bands and color-bomb swaps

mod common;

use common::{grid_from_rows, kind, put_color_bomb, rows_of, stalemate_rows};
use fruit_cascade::core::special::band_rows;
use fruit_cascade::core::{
    clear_row_with_width, color_bomb_swap, resolve_group, GroupOutcome, MatchGroup, NoModifiers,
};
use fruit_cascade::types::{Pos, Special};

#[test]
fn test_non_positive_width_behaves_like_one() {
    let reference = {
        let mut grid = grid_from_rows(&stalemate_rows());
        let cleared = clear_row_with_width(&mut grid, 4, 1);
        (rows_of(&grid), cleared)
    };
    assert_eq!(reference.1, 8);

    for width in [0, -1, -7, i32::MIN] {
        let mut grid = grid_from_rows(&stalemate_rows());
        let cleared = clear_row_with_width(&mut grid, 4, width);
        assert_eq!((rows_of(&grid), cleared), reference, "width {}", width);
    }
}

#[test]
fn test_band_clips_at_board_edges() {
    let mut grid = grid_from_rows(&stalemate_rows());
    // Rows 0 and 1; row 0 has two corners.
    assert_eq!(clear_row_with_width(&mut grid, 0, 2), 6 + 8);
    assert!((0..8).all(|x| grid.tile(Pos::new(x, 1)).is_none()));
    assert!(grid.tile(Pos::new(1, 2)).is_some());

    assert_eq!(band_rows(7, 3, 8).as_slice(), &[7, 6, 5]);
}

#[test]
fn test_band_wider_than_board_clears_all() {
    let mut grid = grid_from_rows(&stalemate_rows());
    assert_eq!(clear_row_with_width(&mut grid, 3, 100), 60);
    assert_eq!(grid.tile_count(), 0);
}

#[test]
fn test_color_bomb_swap_needs_a_bomb() {
    let mut grid = grid_from_rows(&stalemate_rows());
    let before = grid.clone();
    assert!(color_bomb_swap(&mut grid, Pos::new(3, 3), Pos::new(4, 3)).is_none());
    assert_eq!(grid, before);
}

#[test]
fn test_color_bomb_targets_the_partner_kind() {
    let mut grid = grid_from_rows(&[
        "........",
        "........",
        "..K..K..",
        "........",
        "........",
        "..K.....",
        ".KB.....",
        ".....K..",
    ]);
    put_color_bomb(&mut grid, Pos::new(2, 1), kind('A'));
    // Already swapped: bomb at (2,1), Kiwi at (1,1).
    let blast = color_bomb_swap(&mut grid, Pos::new(1, 1), Pos::new(2, 1)).unwrap();
    assert_eq!(blast.target, Some(kind('K')));
    assert_eq!(blast.cleared, 2 + 4);
    assert_eq!(blast.bonus, 120);
    assert_eq!(grid.tile_count(), 0);
}

#[test]
fn test_five_run_makes_color_bomb_keeper() {
    let mut grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "........",
        "........",
        "........",
        ".GGGGG..",
        "........",
    ]);
    let group = MatchGroup {
        kind: kind('G'),
        cells: (1..=5).map(|x| Pos::new(x, 1)).collect(),
    };
    let outcome = resolve_group(&mut grid, &group, 0, &NoModifiers);
    assert_eq!(
        outcome,
        GroupOutcome::Cleared {
            kind: kind('G'),
            size: 5,
            score: 100,
            created: Special::ColorBomb,
            keeper: Some(Pos::new(1, 1)),
        }
    );
    assert_eq!(grid.tile_count(), 1);
    assert!(grid.tile(Pos::new(1, 1)).is_some_and(|t| t.is_color_bomb()));
}

#[test]
fn test_group_already_cleared_is_skipped() {
    let mut grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "........",
        "........",
        "........",
        ".AAA....",
        "........",
    ]);
    let group = MatchGroup {
        kind: kind('A'),
        cells: (1..=3).map(|x| Pos::new(x, 1)).collect(),
    };
    clear_row_with_width(&mut grid, 1, 1);
    assert_eq!(resolve_group(&mut grid, &group, 1, &NoModifiers), GroupOutcome::Skipped);
}
