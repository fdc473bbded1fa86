//! Core board logic - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules: the grid, match detection, group
//! resolution, special tiles and the cascade state machine. It does no I/O
//! beyond `tracing` diagnostics, which makes it:
//!
//! - **Deterministic**: the same seed generates and refills identically
//! - **Testable**: phases can be run back to back without any delay
//! - **Portable**: usable by a terminal, a GUI or the remote-control adapter
//!
//! # Module Structure
//!
//! - [`grid`]: flat tile storage with the corner invariant
//! - [`detector`]: run detection and group merging (T/L shapes)
//! - [`resolver`]: base score, upgrades and removal for one group
//! - [`special`]: row-bomb bands and color-bomb swaps
//! - [`modifier`]: the scoring modifier port
//! - [`buffs`]: a stacking buff book implementing the port
//! - [`offers`]: when to offer a buff choice
//! - [`moves`]: stalemate check and hints
//! - [`board`]: the cascade state machine tying it all together
//! - [`save`]: JSON save records
//! - [`records`]: finished-game records (leaderboard)
//!
//! # Example
//!
//! ```
//! use fruit_cascade_core::{Board, BoardConfig, PhaseDelays};
//!
//! let config = BoardConfig::default()
//!     .with_seed(12345)
//!     .with_delays(PhaseDelays::instant());
//! let mut board = Board::plain(config);
//! board.init(None);
//!
//! // Run the initial cascade to completion
//! board.step();
//! assert!(!board.is_busy());
//!
//! if let Some((a, b)) = board.hint() {
//!     assert!(board.request_swap(a, b));
//!     board.step();
//! }
//! let save = board.teardown();
//! assert_eq!(save.tiles.len(), 60);
//! ```
//!
//! # Timing
//!
//! [`Board::tick`] takes elapsed milliseconds and honours the phase delays of
//! [`PhaseDelays`]; drivers call it every 16ms. Delays never change the result.

pub mod board;
pub mod buffs;
pub mod config;
pub mod detector;
pub mod grid;
pub mod modifier;
pub mod moves;
pub mod offers;
pub mod records;
pub mod resolver;
pub mod rng;
pub mod save;
pub mod snapshot;
pub mod special;

pub use fruit_cascade_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Fall};
pub use buffs::{BuffBook, BuffDef, BuffKind, BuffSaveEntry};
pub use config::{BoardConfig, PhaseDelays};
pub use detector::{find_match_groups, has_any_match, match_kind, MatchGroup};
pub use grid::Grid;
pub use modifier::{ModifiedScore, NoModifiers, ScoreModifier, ScoreRequest};
pub use moves::{find_move, has_possible_moves};
pub use offers::OfferTracker;
pub use records::{GameRecord, RecordBook};
pub use resolver::{resolve_group, GroupOutcome};
pub use rng::{SimpleRng, TokenPool};
pub use save::{SaveData, SaveError, TileRecord};
pub use snapshot::BoardSnapshot;
pub use special::{clear_row_with_width, color_bomb_swap, ColorBombBlast};
