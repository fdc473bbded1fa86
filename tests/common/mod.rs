//! Shared helpers for the integration tests

#![allow(dead_code)]

use fruit_cascade::core::{BoardConfig, Grid, PhaseDelays};
use fruit_cascade::types::{Pos, Special, Tile, TokenKind};

/// Kind for a letter: A Apple, B Banana, U Blueberry, C Cherry, G Grape,
/// K Kiwi, L Lemon, M Mango, O Orange, E Peach, P Pear, S Strawberry.
pub fn kind(letter: char) -> TokenKind {
    match letter.to_ascii_uppercase() {
        'A' => TokenKind::Apple,
        'B' => TokenKind::Banana,
        'U' => TokenKind::Blueberry,
        'C' => TokenKind::Cherry,
        'G' => TokenKind::Grape,
        'K' => TokenKind::Kiwi,
        'L' => TokenKind::Lemon,
        'M' => TokenKind::Mango,
        'O' => TokenKind::Orange,
        'E' => TokenKind::Peach,
        'P' => TokenKind::Pear,
        'S' => TokenKind::Strawberry,
        other => panic!("no kind for {:?}", other),
    }
}

/// Build a grid from rows written top row first.
///
/// `.` is empty (and must be used on corners), an uppercase letter is a plain
/// tile and a lowercase letter a row bomb of that kind.
pub fn grid_from_rows(rows: &[&str]) -> Grid {
    let height = rows.len() as u8;
    let width = rows[0].len() as u8;
    let mut grid = Grid::new(width, height);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.len() as u8, width, "ragged row {}", i);
        let y = (height as usize - 1 - i) as i8;
        for (x, c) in row.chars().enumerate() {
            if c == '.' {
                continue;
            }
            let special = if c.is_ascii_lowercase() {
                Special::RowBomb
            } else {
                Special::None
            };
            let pos = Pos::new(x as i8, y);
            assert!(grid.set(pos, Some(Tile::new(kind(c)).with_special(special))), "cannot place {:?}", pos);
        }
    }
    grid
}

/// Render a grid back to rows, top row first; row bombs lowercase, color bombs `*`
pub fn rows_of(grid: &Grid) -> Vec<String> {
    (0..grid.height() as i8)
        .rev()
        .map(|y| {
            (0..grid.width() as i8)
                .map(|x| match grid.tile(Pos::new(x, y)) {
                    None => '.',
                    Some(t) if t.is_color_bomb() => '*',
                    Some(t) => {
                        let c = letter_of(t.kind);
                        if t.is_row_bomb() {
                            c.to_ascii_lowercase()
                        } else {
                            c
                        }
                    }
                })
                .collect()
        })
        .collect()
}

pub fn letter_of(kind: TokenKind) -> char {
    "ABUCGKLMOEPS"
        .chars()
        .find(|&c| self::kind(c) == kind)
        .unwrap_or('?')
}

pub fn put_color_bomb(grid: &mut Grid, pos: Pos, kind: TokenKind) {
    assert!(grid.set(pos, Some(Tile::new(kind).with_special(Special::ColorBomb))));
}

/// Config with no phase delays
pub fn instant() -> BoardConfig {
    BoardConfig::default().with_delays(PhaseDelays::instant())
}

/// Full 8x8 layout coloured by `(x + y) mod 3`: no match and no swap that
/// could make one.
pub fn stalemate_rows() -> Vec<&'static str> {
    vec![
        ".CABCAB.", // y = 7
        "ABCABCAB", // y = 6
        "CABCABCA", // y = 5
        "BCABCABC", // y = 4
        "ABCABCAB", // y = 3
        "CABCABCA", // y = 2
        "BCABCABC", // y = 1
        ".BCABCA.", // y = 0
    ]
}
