//! Match detection
//!
//! Rows are scanned left to right, then columns bottom to top. Every maximal
//! run of three or more tiles of one kind is merged into each group it shares a
//! cell with; a run touching two earlier groups joins them, so the groups of a
//! single pass are always disjoint. A horizontal and a vertical run that cross
//! therefore come out as one T/L-shaped group.
//!
//! Color bombs have left their fruit's match class: they never join a run and
//! only fire through a swap.
//!
//! Detection is a pure function of the grid.

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{Pos, TokenKind, MAX_BOARD_DIM, MIN_RUN};

/// Cells of one run; a run never exceeds a board edge.
pub type Run = ArrayVec<Pos, { MAX_BOARD_DIM as usize }>;

/// Connected set of matched cells sharing one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: TokenKind,
    /// Cells in detection order; the first surviving one is the keeper
    pub cells: Vec<Pos>,
}

impl MatchGroup {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.cells.contains(&pos)
    }
}

/// Call `f` with every maximal run of `MIN_RUN` or more equal kinds.
///
/// Order: rows bottom-up scanned left to right, then columns left to right
/// scanned bottom to top.
pub fn for_each_run<F>(grid: &Grid, mut f: F)
where
    F: FnMut(TokenKind, &Run),
{
    let (w, h) = (grid.width() as i8, grid.height() as i8);
    let mut run = Run::new();

    for y in 0..h {
        scan_line(grid, (0..w).map(|x| Pos::new(x, y)), &mut run, &mut f);
    }
    for x in 0..w {
        scan_line(grid, (0..h).map(|y| Pos::new(x, y)), &mut run, &mut f);
    }
}

fn scan_line<I, F>(grid: &Grid, line: I, run: &mut Run, f: &mut F)
where
    I: Iterator<Item = Pos>,
    F: FnMut(TokenKind, &Run),
{
    let mut current: Option<TokenKind> = None;
    run.clear();

    for pos in line {
        let kind = match_kind(grid, pos);
        if kind.is_some() && kind == current {
            run.push(pos);
            continue;
        }
        flush(current, run, f);
        run.clear();
        current = kind;
        if kind.is_some() {
            run.push(pos);
        }
    }
    flush(current, run, f);
}

/// Kind a cell matches as; `None` for empty cells and color bombs
#[inline]
pub fn match_kind(grid: &Grid, pos: Pos) -> Option<TokenKind> {
    grid.tile(pos)
        .filter(|tile| !tile.is_color_bomb())
        .map(|tile| tile.kind)
}

#[inline]
fn flush<F>(kind: Option<TokenKind>, run: &Run, f: &mut F)
where
    F: FnMut(TokenKind, &Run),
{
    if let Some(kind) = kind {
        if run.len() >= MIN_RUN {
            f(kind, run);
        }
    }
}

/// Find every match group on the grid.
pub fn find_match_groups(grid: &Grid) -> Vec<MatchGroup> {
    // Group slot owning each cell; merged-away slots become None.
    let mut owner: Vec<Option<usize>> = vec![None; grid.cells().len()];
    let mut slots: Vec<Option<MatchGroup>> = Vec::new();
    let width = grid.width() as usize;
    let cell_index = |p: Pos| p.y as usize * width + p.x as usize;

    for_each_run(grid, |kind, run| {
        let mut touched: ArrayVec<usize, { MAX_BOARD_DIM as usize }> = ArrayVec::new();
        for &pos in run {
            if let Some(slot) = owner[cell_index(pos)] {
                if !touched.contains(&slot) {
                    touched.push(slot);
                }
            }
        }

        let target = match touched.iter().min() {
            Some(&slot) => slot,
            None => {
                slots.push(Some(MatchGroup {
                    kind,
                    cells: Vec::with_capacity(run.len()),
                }));
                slots.len() - 1
            }
        };

        for &slot in touched.iter().filter(|&&s| s != target) {
            if let Some(absorbed) = slots[slot].take() {
                for &pos in &absorbed.cells {
                    owner[cell_index(pos)] = Some(target);
                }
                if let Some(group) = slots[target].as_mut() {
                    group.cells.extend(absorbed.cells);
                }
            }
        }

        if let Some(group) = slots[target].as_mut() {
            for &pos in run {
                let idx = cell_index(pos);
                if owner[idx] != Some(target) {
                    owner[idx] = Some(target);
                    group.cells.push(pos);
                }
            }
        }
    });

    slots.into_iter().flatten().collect()
}

/// True if at least one run of `MIN_RUN` exists.
pub fn has_any_match(grid: &Grid) -> bool {
    let mut found = false;
    for_each_run(grid, |_, _| found = true);
    found
}
