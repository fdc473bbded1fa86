//! Special activation - row-bomb bands and color-bomb swaps

use arrayvec::ArrayVec;

use crate::detector::match_kind;
use crate::grid::Grid;
use crate::types::{
    Pos, TokenKind, COLOR_BOMB_SWAP_BONUS, DOUBLE_COLOR_BOMB_BONUS, MAX_BOARD_DIM,
};

/// Rows of a band, in clearing order
pub type Band = ArrayVec<i8, { MAX_BOARD_DIM as usize }>;

/// Rows cleared by a band of `width` rows centred on `center_y`.
///
/// Order is centre, -1, +1, -2, +2, ...; rows off the grid are dropped and a
/// width of zero or less counts as 1.
pub fn band_rows(center_y: i8, width: i32, height: u8) -> Band {
    let width = width.max(1);
    let height = height as i32;
    let center = center_y as i32;
    let mut rows = Band::new();

    let mut push = |y: i32| {
        if (0..height).contains(&y) && !rows.is_full() {
            rows.push(y as i8);
        }
    };
    push(center);
    // Beyond `height` steps every row is off the grid.
    for step in 1..width.min(height + 1) {
        push(center - step);
        push(center + step);
    }
    rows
}

/// Clear every tile in the band; returns the number of tiles removed.
pub fn clear_row_with_width(grid: &mut Grid, center_y: i8, width: i32) -> u32 {
    let mut cleared = 0;
    for y in band_rows(center_y, width, grid.height()) {
        for x in 0..grid.width() as i8 {
            if grid.take(Pos::new(x, y)).is_some() {
                cleared += 1;
            }
        }
    }
    cleared
}

/// Remove every plain or row-bomb tile of `kind`; other color bombs stay.
/// Returns the count.
pub fn clear_kind(grid: &mut Grid, kind: TokenKind) -> u32 {
    let targets: Vec<Pos> = grid
        .positions()
        .filter(|&p| match_kind(grid, p) == Some(kind))
        .collect();
    for &pos in &targets {
        grid.take(pos);
    }
    targets.len() as u32
}

/// Result of a swap that set off a color bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBombBlast {
    /// Kind wiped from the board; `None` when two bombs met
    pub target: Option<TokenKind>,
    pub cleared: u32,
    pub bonus: u32,
}

/// Fire a color bomb if one of the two (already swapped) cells holds one.
///
/// Bomb + normal tile: both go, then every tile of the normal tile's kind.
/// Bomb + bomb: the whole board goes. Returns `None` and leaves the grid
/// untouched when neither cell holds a color bomb.
pub fn color_bomb_swap(grid: &mut Grid, a: Pos, b: Pos) -> Option<ColorBombBlast> {
    let ta = grid.tile(a)?;
    let tb = grid.tile(b)?;

    match (ta.is_color_bomb(), tb.is_color_bomb()) {
        (false, false) => None,
        (true, true) => Some(ColorBombBlast {
            target: None,
            cleared: grid.clear(),
            bonus: DOUBLE_COLOR_BOMB_BONUS,
        }),
        (a_is_bomb, _) => {
            let target = if a_is_bomb { tb.kind } else { ta.kind };
            grid.take(a);
            grid.take(b);
            let cleared = 2 + clear_kind(grid, target);
            Some(ColorBombBlast {
                target: Some(target),
                cleared,
                bonus: COLOR_BOMB_SWAP_BONUS,
            })
        }
    }
}
