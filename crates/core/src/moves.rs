//! Move search - stalemate check and hints
//!
//! Every occupied cell is tried against its right and upper neighbour, which
//! covers each adjacent pair once. A swap counts when it lines up a run; only
//! when no such swap exists is a color bomb next to any tile offered, since
//! that swap always fires.

use crate::detector::has_any_match;
use crate::grid::Grid;
use crate::types::Pos;

/// First productive swap: a run-forming swap in scan order (columns left to
/// right, rows bottom up, right neighbour before upper neighbour), else the
/// first color bomb with an occupied neighbour.
pub fn find_move(grid: &Grid) -> Option<(Pos, Pos)> {
    find_matching_swap(grid).or_else(|| find_color_bomb_swap(grid))
}

fn find_matching_swap(grid: &Grid) -> Option<(Pos, Pos)> {
    let mut scratch = grid.clone();
    let (w, h) = (grid.width() as i8, grid.height() as i8);

    for x in 0..w {
        for y in 0..h {
            let here = Pos::new(x, y);
            if scratch.tile(here).is_none() {
                continue;
            }
            for next in [here.offset(1, 0), here.offset(0, 1)] {
                if next.x >= w || next.y >= h || scratch.tile(next).is_none() {
                    continue;
                }
                scratch.swap(here, next);
                let productive = has_any_match(&scratch);
                scratch.swap(here, next);
                if productive {
                    return Some((here, next));
                }
            }
        }
    }
    None
}

fn find_color_bomb_swap(grid: &Grid) -> Option<(Pos, Pos)> {
    grid.positions()
        .filter(|&p| grid.tile(p).is_some_and(|t| t.is_color_bomb()))
        .find_map(|bomb| {
            [(1, 0), (0, 1), (-1, 0), (0, -1)]
                .into_iter()
                .map(|(dx, dy)| bomb.offset(dx, dy))
                .find(|&next| grid.tile(next).is_some())
                .map(|next| (bomb, next))
        })
}

pub fn has_possible_moves(grid: &Grid) -> bool {
    find_move(grid).is_some()
}
