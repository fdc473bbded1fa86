//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are plain data with no external dependencies, making them usable
//! in any context (board simulation, observers, remote-control protocol).
//!
//! # Board Geometry
//!
//! - **Default size**: 8 columns x 8 rows
//! - **Origin**: `(0, 0)` is the bottom-left cell; gravity pulls toward `y = 0`
//! - **Corners**: the four corner cells never hold a tile
//!
//! # Scoring Constants
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MATCH_3_SCORE` | 30 | Plain 3-match |
//! | `ROW_BOMB_SCORE` | 60 | 4-match (creates a row bomb) |
//! | `COLOR_BOMB_SCORE` | 100 | 5+-match (creates a color bomb) |
//! | `ROW_BOMB_FIRE_SCORE` | 60 | Row bomb consumed inside a match |
//! | `COLOR_BOMB_SWAP_BONUS` | 120 | Color bomb swapped with a normal tile |
//! | `DOUBLE_COLOR_BOMB_BONUS` | 300 | Two color bombs swapped together |
//!
//! # Phase Delays
//!
//! Presentation pacing between cascade phases, in milliseconds. They never
//! change the simulation outcome:
//!
//! | Constant | Value |
//! |----------|-------|
//! | `DETECT_DELAY_MS` | 250 |
//! | `COLLAPSE_DELAY_MS` | 200 |
//! | `REFILL_DELAY_MS` | 200 |
//!
//! # Examples
//!
//! ```
//! use fruit_cascade_types::{Pos, Special, Tile, TokenKind};
//!
//! // Parse from string (case-insensitive)
//! let apple = TokenKind::from_str("apple").unwrap();
//! assert_eq!(apple, TokenKind::Apple);
//! assert_eq!(apple.as_str(), "Apple");
//!
//! // Specials are mutually exclusive
//! let tile = Tile::new(apple).with_special(Special::RowBomb);
//! assert!(tile.is_row_bomb());
//! assert!(!tile.with_special(Special::ColorBomb).is_row_bomb());
//!
//! // 4-adjacency
//! assert!(Pos::new(2, 3).is_adjacent(Pos::new(2, 4)));
//! assert!(!Pos::new(2, 3).is_adjacent(Pos::new(3, 4)));
//! ```

/// Default board width in cells
pub const DEFAULT_BOARD_WIDTH: u8 = 8;

/// Default board height in cells
pub const DEFAULT_BOARD_HEIGHT: u8 = 8;

/// Smallest supported board edge (a run needs three cells)
pub const MIN_BOARD_DIM: u8 = 3;

/// Largest supported board edge (coordinates are `i8`)
pub const MAX_BOARD_DIM: u8 = 64;

/// Number of token kinds drawn into a run's active pool
pub const DEFAULT_POOL_SIZE: usize = 5;

/// Smallest pool a board accepts (fewer kinds never settle)
pub const MIN_POOL_SIZE: usize = 3;

/// Shortest run that counts as a match
pub const MIN_RUN: usize = 3;

/// Base score for a 3-match
pub const MATCH_3_SCORE: u32 = 30;

/// Base score for a 4-match (creates a row bomb)
pub const ROW_BOMB_SCORE: u32 = 60;

/// Base score for a 5+-match (creates a color bomb)
pub const COLOR_BOMB_SCORE: u32 = 100;

/// Base score when a row bomb fires inside a match group
pub const ROW_BOMB_FIRE_SCORE: u32 = 60;

/// Flat bonus for swapping a color bomb with a normal tile
pub const COLOR_BOMB_SWAP_BONUS: u32 = 120;

/// Flat bonus for swapping two color bombs
pub const DOUBLE_COLOR_BOMB_BONUS: u32 = 300;

/// Row-bomb band width before modifiers
pub const BASE_ROW_BOMB_WIDTH: i32 = 1;

/// Score distance between two score-milestone offers
pub const DEFAULT_SCORE_STEP: u32 = 2000;

/// Chain depth at which a chain offer is made
pub const DEFAULT_MIN_OFFER_CHAIN: u32 = 3;

/// Fixed driver timestep in milliseconds (16ms ≈ 60 FPS)
pub const TICK_MS: u32 = 16;

/// Pause before each detection pass
pub const DETECT_DELAY_MS: u32 = 250;

/// Pause between resolving groups and collapsing columns
pub const COLLAPSE_DELAY_MS: u32 = 200;

/// Pause between collapsing and refilling
pub const REFILL_DELAY_MS: u32 = 200;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_table_values() {
        assert_eq!(MATCH_3_SCORE, 30);
        assert_eq!(ROW_BOMB_SCORE, 60);
        assert_eq!(COLOR_BOMB_SCORE, 100);
        assert_eq!(ROW_BOMB_FIRE_SCORE, 60);
        assert_eq!(COLOR_BOMB_SWAP_BONUS, 120);
        assert_eq!(DOUBLE_COLOR_BOMB_BONUS, 300);
    }

    #[test]
    fn token_names_round_trip() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::from_str(kind.as_str()), Some(kind));
            assert_eq!(TokenKind::from_index(kind.index()), Some(kind));
        }
        assert_eq!(TokenKind::from_str("durian"), None);
    }

    #[test]
    fn special_setters_are_exclusive() {
        let tile = Tile::new(TokenKind::Kiwi).with_special(Special::ColorBomb);
        assert!(tile.is_color_bomb());
        let tile = tile.with_special(Special::RowBomb);
        assert!(tile.is_row_bomb());
        assert!(!tile.is_color_bomb());
        assert!(!Tile::new(TokenKind::Kiwi).is_special());
    }

    #[test]
    fn adjacency_is_four_way() {
        let p = Pos::new(3, 3);
        assert!(p.is_adjacent(Pos::new(4, 3)));
        assert!(p.is_adjacent(Pos::new(2, 3)));
        assert!(p.is_adjacent(Pos::new(3, 4)));
        assert!(p.is_adjacent(Pos::new(3, 2)));
        assert!(!p.is_adjacent(p));
        assert!(!p.is_adjacent(Pos::new(4, 4)));
        assert!(!p.is_adjacent(Pos::new(5, 3)));
    }
}

/// The fruit kinds a tile can carry
///
/// Every board draws a fixed-size subset of these at generation time (see
/// [`DEFAULT_POOL_SIZE`]). Matching compares kinds, nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    Apple,
    Banana,
    Blueberry,
    Cherry,
    Grape,
    Kiwi,
    Lemon,
    Mango,
    Orange,
    Peach,
    Pear,
    Strawberry,
}

impl TokenKind {
    /// Every kind, in index order
    pub const ALL: [TokenKind; 12] = [
        TokenKind::Apple,
        TokenKind::Banana,
        TokenKind::Blueberry,
        TokenKind::Cherry,
        TokenKind::Grape,
        TokenKind::Kiwi,
        TokenKind::Lemon,
        TokenKind::Mango,
        TokenKind::Orange,
        TokenKind::Peach,
        TokenKind::Pear,
        TokenKind::Strawberry,
    ];

    /// Parse a kind from its name (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use fruit_cascade_types::TokenKind;
    ///
    /// assert_eq!(TokenKind::from_str("Cherry"), Some(TokenKind::Cherry));
    /// assert_eq!(TokenKind::from_str("STRAWBERRY"), Some(TokenKind::Strawberry));
    /// assert_eq!(TokenKind::from_str("ColorBomb"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Display name, also used in save records and the wire protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Apple => "Apple",
            TokenKind::Banana => "Banana",
            TokenKind::Blueberry => "Blueberry",
            TokenKind::Cherry => "Cherry",
            TokenKind::Grape => "Grape",
            TokenKind::Kiwi => "Kiwi",
            TokenKind::Lemon => "Lemon",
            TokenKind::Mango => "Mango",
            TokenKind::Orange => "Orange",
            TokenKind::Peach => "Peach",
            TokenKind::Pear => "Pear",
            TokenKind::Strawberry => "Strawberry",
        }
    }

    /// Position in [`TokenKind::ALL`]
    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Special flag carried by a tile
///
/// A single enum keeps row-bomb and color-bomb mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Special {
    #[default]
    None,
    /// Created by a 4-match; clears a band of rows when consumed by a later match
    RowBomb,
    /// Created by a 5+-match; fires when swapped
    ColorBomb,
}

impl Special {
    /// Compact code used in snapshots (0 = none, 1 = row bomb, 2 = color bomb)
    pub fn code(&self) -> u8 {
        match self {
            Special::None => 0,
            Special::RowBomb => 1,
            Special::ColorBomb => 2,
        }
    }

    pub fn as_str(&self) -> Option<&'static str> {
        match self {
            Special::None => None,
            Special::RowBomb => Some("row_bomb"),
            Special::ColorBomb => Some("color_bomb"),
        }
    }
}

/// A tile occupying one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub kind: TokenKind,
    pub special: Special,
}

impl Tile {
    /// A normal tile of the given kind
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            special: Special::None,
        }
    }

    /// Same tile with its special flag replaced
    pub fn with_special(self, special: Special) -> Self {
        Self { special, ..self }
    }

    pub fn is_row_bomb(&self) -> bool {
        self.special == Special::RowBomb
    }

    pub fn is_color_bomb(&self) -> bool {
        self.special == Special::ColorBomb
    }

    pub fn is_special(&self) -> bool {
        self.special != Special::None
    }
}

/// A cell on the board
///
/// - `None`: empty (or a structural corner)
/// - `Some(Tile)`: occupied
pub type Cell = Option<Tile>;

/// Grid coordinate; `(0, 0)` is the bottom-left cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    pub x: i8,
    pub y: i8,
}

impl Pos {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// True if `other` shares an edge with `self`
    pub fn is_adjacent(&self, other: Pos) -> bool {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        dx + dy == 1
    }

    pub fn offset(&self, dx: i8, dy: i8) -> Pos {
        Pos::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl From<(i8, i8)> for Pos {
    fn from((x, y): (i8, i8)) -> Self {
        Pos::new(x, y)
    }
}

/// Cascade phases
///
/// The board is busy whenever it is not [`Phase::Idle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Idle,
    Detecting,
    Resolving,
    Collapsing,
    Refilling,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Detecting => "detecting",
            Phase::Resolving => "resolving",
            Phase::Collapsing => "collapsing",
            Phase::Refilling => "refilling",
        }
    }
}

/// Why the board suggests offering a buff choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OfferReason {
    /// Total score crossed the next milestone
    ScoreMilestone,
    /// A wave reached the minimum chain depth
    Chain,
}

/// Board-side events, drained by drivers and presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEvent {
    /// An accepted swap was applied to the grid
    Swapped { a: Pos, b: Pos },
    /// A swap produced no match and was undone
    SwapReverted { a: Pos, b: Pos },
    /// A detection pass found groups; `chain_depth` is the wave number
    GroupsDetected { count: u32, chain_depth: u32 },
    /// A plain group was removed (possibly leaving a special keeper)
    GroupCleared {
        kind: TokenKind,
        size: u32,
        score: u32,
        created: Special,
    },
    /// A row bomb fired inside a match group
    RowBombFired {
        at: Pos,
        width: u32,
        cleared: u32,
        score: u32,
    },
    /// A color bomb fired by swap; `target` is `None` for bomb+bomb
    ColorBombFired {
        target: Option<TokenKind>,
        cleared: u32,
        bonus: u32,
    },
    /// Columns collapsed; `moved` tiles fell
    Collapsed { moved: u32 },
    /// Empty cells received new tiles
    Refilled { spawned: u32 },
    /// The external buff layer should offer a choice
    OfferChoice(OfferReason),
    /// The cascade chain ended with no groups left
    Settled { score: u32 },
    /// No swap can produce a match
    GameOver { score: u32 },
}
