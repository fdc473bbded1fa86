//! Match detection tests

mod common;

use std::collections::HashSet;

use common::{grid_from_rows, kind};
use fruit_cascade::core::{
    find_match_groups, has_any_match, resolve_group, Grid, GroupOutcome, NoModifiers, SimpleRng,
    TokenPool,
};
use fruit_cascade::types::{Pos, Special, Tile};

fn random_grid(seed: u32, pool_size: usize) -> Grid {
    let mut rng = SimpleRng::new(seed);
    let pool = TokenPool::pick(&mut rng, pool_size);
    let mut grid = Grid::new(8, 8);
    let positions: Vec<Pos> = grid.positions().collect();
    for pos in positions {
        grid.set(pos, Some(Tile::new(pool.draw(&mut rng))));
    }
    grid
}

fn sorted(cells: &[Pos]) -> Vec<Pos> {
    let mut cells = cells.to_vec();
    cells.sort();
    cells
}

#[test]
fn test_no_group_smaller_than_three() {
    for seed in 1..200 {
        let grid = random_grid(seed, 3);
        for group in find_match_groups(&grid) {
            assert!(group.len() >= 3, "seed {}: group of {}", seed, group.len());
            for &pos in &group.cells {
                assert_eq!(grid.kind_at(pos), Some(group.kind), "seed {}: mixed group", seed);
            }
        }
    }
}

#[test]
fn test_groups_never_share_a_cell() {
    for seed in 1..200 {
        let grid = random_grid(seed, 3);
        let groups = find_match_groups(&grid);
        let mut seen = HashSet::new();
        for group in &groups {
            for &pos in &group.cells {
                assert!(seen.insert(pos), "seed {}: {:?} in two groups", seed, pos);
            }
        }
        assert_eq!(has_any_match(&grid), !groups.is_empty());
    }
}

#[test]
fn test_t_shape_is_one_group_of_five() {
    let grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "...A....", // y = 4
        "...A....", // y = 3
        ".AAA....", // y = 2
        "........",
        "........",
    ]);
    let groups = find_match_groups(&grid);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].kind, kind('A'));
    assert_eq!(
        sorted(&groups[0].cells),
        sorted(&[
            Pos::new(1, 2),
            Pos::new(2, 2),
            Pos::new(3, 2),
            Pos::new(3, 3),
            Pos::new(3, 4),
        ])
    );
}

#[test]
fn test_cross_shape_merges() {
    let grid = grid_from_rows(&[
        "........",
        "........",
        "..K.....",
        ".KKK....",
        "..K.....",
        "........",
        "........",
        "........",
    ]);
    let groups = find_match_groups(&grid);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 5);
}

#[test]
fn test_separate_kinds_stay_separate() {
    let grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "........",
        "........",
        "BBB.....",
        "AAA.....",
        "........",
    ]);
    let groups = find_match_groups(&grid);
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g.len() == 3));
}

#[test]
fn test_empty_cells_and_corners_break_runs() {
    let grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "........",
        "........",
        "........",
        "AA.AA...",
        ".BB.....",
    ]);
    assert!(find_match_groups(&grid).is_empty());
}

#[test]
fn test_bottom_row_scenario() {
    let mut grid = grid_from_rows(&[
        "........",
        "........",
        "........",
        "........",
        "........",
        "........",
        "........",
        ".AAABCG.",
    ]);
    let groups = find_match_groups(&grid);
    assert_eq!(groups.len(), 1);
    assert_eq!(
        sorted(&groups[0].cells),
        vec![Pos::new(1, 0), Pos::new(2, 0), Pos::new(3, 0)]
    );

    let outcome = resolve_group(&mut grid, &groups[0], 1, &NoModifiers);
    assert_eq!(
        outcome,
        GroupOutcome::Cleared {
            kind: kind('A'),
            size: 3,
            score: 30,
            created: Special::None,
            keeper: None,
        }
    );
    for x in 1..=3 {
        assert!(grid.tile(Pos::new(x, 0)).is_none());
    }
    assert_eq!(grid.kind_at(Pos::new(4, 0)), Some(kind('B')));
    assert_eq!(grid.tile_count(), 3);
}
