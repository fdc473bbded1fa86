//! Grid module - owns the tile slots of the board
//!
//! The grid is a `width x height` rectangle stored as a flat row-major array.
//! Coordinates: `(x, y)` where x grows to the right and y grows upward; `y = 0`
//! is the bottom row and gravity pulls toward it.
//!
//! The four corner cells are structural holes. [`Grid::set`] refuses to place a
//! tile there, so no code path can break that invariant.

use crate::types::{Cell, Pos, Tile, TokenKind, MAX_BOARD_DIM, MIN_BOARD_DIM};

/// Board grid with flat storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: u8,
    height: u8,
    /// Row-major cells (`y * width + x`)
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an empty grid; dimensions are clamped to the supported range
    pub fn new(width: u8, height: u8) -> Self {
        let width = width.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        let height = height.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    #[inline(always)]
    fn index(&self, pos: Pos) -> Option<usize> {
        if pos.x < 0 || pos.x >= self.width as i8 || pos.y < 0 || pos.y >= self.height as i8 {
            return None;
        }
        Some((pos.y as usize) * (self.width as usize) + (pos.x as usize))
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    /// True for the four structural corner cells
    pub fn is_corner(&self, pos: Pos) -> bool {
        let right = self.width as i8 - 1;
        let top = self.height as i8 - 1;
        (pos.x == 0 || pos.x == right) && (pos.y == 0 || pos.y == top)
    }

    /// In bounds and not a corner
    pub fn is_playable(&self, pos: Pos) -> bool {
        self.in_bounds(pos) && !self.is_corner(pos)
    }

    /// Lowest row a tile may occupy in column `x`
    pub fn floor(&self, x: i8) -> i8 {
        if x == 0 || x == self.width as i8 - 1 {
            1
        } else {
            0
        }
    }

    /// Cell at `pos`; `None` when out of bounds
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Tile at `pos`; `None` when empty or out of bounds
    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        self.get(pos).flatten()
    }

    pub fn kind_at(&self, pos: Pos) -> Option<TokenKind> {
        self.tile(pos).map(|t| t.kind)
    }

    /// Write a cell.
    ///
    /// Returns false (and leaves the grid untouched) when `pos` is out of
    /// bounds or when a tile would land on a corner. Clearing a corner is a
    /// no-op that succeeds.
    pub fn set(&mut self, pos: Pos, cell: Cell) -> bool {
        let Some(idx) = self.index(pos) else {
            return false;
        };
        if cell.is_some() && self.is_corner(pos) {
            return false;
        }
        self.cells[idx] = cell;
        true
    }

    /// Remove and return the tile at `pos`
    pub fn take(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.index(pos)?;
        self.cells[idx].take()
    }

    /// Exchange two playable cells. Returns false if either is not playable.
    pub fn swap(&mut self, a: Pos, b: Pos) -> bool {
        if !self.is_playable(a) || !self.is_playable(b) {
            return false;
        }
        match (self.index(a), self.index(b)) {
            (Some(ia), Some(ib)) => {
                self.cells.swap(ia, ib);
                true
            }
            _ => false,
        }
    }

    /// Empty every cell
    pub fn clear(&mut self) -> u32 {
        let mut removed = 0;
        for cell in &mut self.cells {
            if cell.take().is_some() {
                removed += 1;
            }
        }
        removed
    }

    pub fn tile_count(&self) -> u32 {
        self.cells.iter().filter(|c| c.is_some()).count() as u32
    }

    /// Number of playable cells without a tile
    pub fn empty_count(&self) -> u32 {
        self.positions()
            .filter(|&p| self.tile(p).is_none())
            .count() as u32
    }

    /// Every playable position, column by column from the bottom
    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        let (w, h) = (self.width as i8, self.height as i8);
        (0..w)
            .flat_map(move |x| (0..h).map(move |y| Pos::new(x, y)))
            .filter(move |&p| !self.is_corner(p))
    }

    /// Raw row-major cells
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(
            crate::types::DEFAULT_BOARD_WIDTH,
            crate::types::DEFAULT_BOARD_HEIGHT,
        )
    }
}
