//! Board module - the cascade state machine
//!
//! A [`Board`] owns the grid, the score and the active token pool, and drives
//! every change to them through explicit phases:
//!
//! ```text
//! Idle -> Detecting -> Resolving -> Collapsing -> Refilling -> Detecting -> ... -> Idle
//! ```
//!
//! - **Detecting**: find match groups. None after a plain swap reverts the
//!   swap; none otherwise settles the chain and runs the stalemate check.
//! - **Resolving**: score and clear every group of the wave.
//! - **Collapsing**: tiles fall; in the two corner columns row 1 is the floor.
//! - **Refilling**: empty playable cells get a kind drawn from the pool.
//!
//! Drivers either call [`Board::step`] to run a whole chain at once, or
//! [`Board::tick`] with elapsed time so the configured phase delays apply.
//! The board is busy from an accepted swap until it settles; swaps arriving
//! meanwhile are dropped.

use tracing::{debug, info, warn};

use crate::config::BoardConfig;
use crate::detector::{find_match_groups, MatchGroup};
use crate::grid::Grid;
use crate::modifier::{NoModifiers, ScoreModifier};
use crate::moves::find_move;
use crate::offers::OfferTracker;
use crate::resolver::{resolve_group, GroupOutcome};
use crate::rng::{SimpleRng, TokenPool};
use crate::save::SaveData;
use crate::snapshot::BoardSnapshot;
use crate::special::color_bomb_swap;
use crate::types::{BoardEvent, OfferReason, Phase, Pos, Tile, MIN_POOL_SIZE};

/// One tile moved by gravity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fall {
    pub from: Pos,
    pub to: Pos,
}

#[derive(Debug, Clone)]
pub struct Board<M = NoModifiers> {
    config: BoardConfig,
    grid: Grid,
    pool: TokenPool,
    rng: SimpleRng,
    modifier: M,
    offers: OfferTracker,
    score: u32,
    chain_depth: u32,
    phase: Phase,
    /// Delay left before the current phase runs (tick mode only)
    wait_ms: u32,
    /// Groups found by the last detection, consumed by Resolving
    pending_groups: Vec<MatchGroup>,
    /// Plain swap waiting for its first detection pass
    pending_swap: Option<(Pos, Pos)>,
    game_over: bool,
    events: Vec<BoardEvent>,
    falls: Vec<Fall>,
    spawns: Vec<Pos>,
    /// Accepted swaps so far
    move_id: u32,
}

impl Board<NoModifiers> {
    /// Board without score modifiers
    pub fn plain(config: BoardConfig) -> Self {
        Self::new(config, NoModifiers)
    }
}

impl<M: ScoreModifier> Board<M> {
    /// Create an empty, idle board. Call [`Board::init`] to fill it.
    pub fn new(config: BoardConfig, modifier: M) -> Self {
        let config = config.normalized();
        let mut rng = SimpleRng::new(config.seed);
        let pool = TokenPool::pick(&mut rng, config.pool_size);
        Self {
            grid: Grid::new(config.width, config.height),
            pool,
            rng,
            modifier,
            offers: OfferTracker::new(config.score_step, config.min_offer_chain),
            score: 0,
            chain_depth: 0,
            phase: Phase::Idle,
            wait_ms: 0,
            pending_groups: Vec::new(),
            pending_swap: None,
            game_over: false,
            events: Vec::new(),
            falls: Vec::new(),
            spawns: Vec::new(),
            move_id: 0,
            config,
        }
    }

    /// Create a board around a prepared grid. The board starts idle; call
    /// [`Board::recheck`] to run detection on it.
    pub fn with_grid(config: BoardConfig, modifier: M, grid: Grid) -> Self {
        let config = BoardConfig {
            width: grid.width(),
            height: grid.height(),
            ..config
        };
        let mut board = Self::new(config, modifier);
        board.grid = grid;
        board
    }

    /// Fill the board, from a save record when one is given and readable.
    ///
    /// Returns true when the save was used. A missing, empty or malformed
    /// record falls back to a freshly generated board.
    pub fn init(&mut self, save: Option<&str>) -> bool {
        let data = match save.map(SaveData::from_json) {
            Some(Ok(data)) => Some(data),
            Some(Err(err)) => {
                warn!(error = %err, "save record unusable, generating a fresh board");
                None
            }
            None => None,
        };
        self.init_from(data.as_ref())
    }

    /// Same as [`Board::init`] with an already parsed record
    pub fn init_from(&mut self, save: Option<&SaveData>) -> bool {
        self.reset_run();
        match save {
            Some(data) => {
                self.restore(data);
                true
            }
            None => {
                self.generate();
                false
            }
        }
    }

    fn reset_run(&mut self) {
        self.score = 0;
        self.chain_depth = 0;
        self.game_over = false;
        self.pending_groups.clear();
        self.pending_swap = None;
        self.events.clear();
        self.falls.clear();
        self.spawns.clear();
        self.move_id = 0;
        self.offers.reset();
    }

    fn generate(&mut self) {
        self.grid.clear();
        let positions: Vec<Pos> = self.grid.positions().collect();
        for pos in positions {
            let kind = self.pool.draw(&mut self.rng);
            self.grid.set(pos, Some(Tile::new(kind)));
        }
        debug!(pool = ?self.pool.kinds(), "board generated");
        // Matches left by generation cascade (and score) like any other wave.
        self.enter(Phase::Detecting, 0);
    }

    fn restore(&mut self, data: &SaveData) {
        // Fewer kinds than MIN_POOL_SIZE can refill into an endless cascade.
        match TokenPool::from_names(&data.available_token_names) {
            Some(pool) if pool.len() >= MIN_POOL_SIZE => self.pool = pool,
            Some(pool) => warn!(
                saved = ?pool.kinds(),
                "saved token pool too small, keeping the generated one"
            ),
            None => warn!("save has no usable token pool, keeping the generated one"),
        }
        self.score = data.score;
        self.offers.sync_to_score(self.score);
        let skipped = data.restore_into(&mut self.grid);
        debug!(tiles = data.tiles.len(), skipped, score = self.score, "board restored");

        if self.grid.empty_count() > 0 {
            self.enter(Phase::Collapsing, 0);
        } else {
            self.enter(Phase::Detecting, 0);
        }
    }

    /// Start a detection pass on an idle board
    pub fn recheck(&mut self) -> bool {
        if self.phase != Phase::Idle || self.game_over {
            return false;
        }
        self.pending_swap = None;
        self.enter(Phase::Detecting, 0);
        true
    }

    /// Request a swap of two adjacent tiles.
    ///
    /// Ignored (returns false) while busy or after game over, and when either
    /// cell is off the board, a corner, empty, or the cells are not 4-adjacent.
    pub fn request_swap(&mut self, a: Pos, b: Pos) -> bool {
        if self.phase != Phase::Idle || self.game_over {
            debug!(?a, ?b, phase = self.phase.as_str(), "swap ignored: board busy");
            return false;
        }
        if !a.is_adjacent(b) || self.grid.tile(a).is_none() || self.grid.tile(b).is_none() {
            debug!(?a, ?b, "swap ignored: not two adjacent tiles");
            return false;
        }
        if !self.grid.swap(a, b) {
            return false;
        }
        self.move_id = self.move_id.wrapping_add(1);
        self.events.push(BoardEvent::Swapped { a, b });

        if let Some(blast) = color_bomb_swap(&mut self.grid, a, b) {
            debug!(kind = ?blast.target, cleared = blast.cleared, "color bomb fired");
            self.events.push(BoardEvent::ColorBombFired {
                target: blast.target,
                cleared: blast.cleared,
                bonus: blast.bonus,
            });
            self.add_score(blast.bonus);
            self.enter(Phase::Collapsing, self.config.delays.collapse_ms);
            return true;
        }

        self.pending_swap = Some((a, b));
        self.enter(Phase::Detecting, self.config.delays.detect_ms);
        true
    }

    /// Run phases back to back until the board is idle.
    ///
    /// Returns false if there was nothing to run.
    pub fn step(&mut self) -> bool {
        let mut ran = false;
        while self.advance() {
            ran = true;
        }
        ran
    }

    /// Advance time by `elapsed_ms`, running every phase whose delay has passed.
    ///
    /// Returns true if at least one phase ran.
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let mut budget = elapsed_ms;
        let mut ran = false;
        while self.phase != Phase::Idle && !self.game_over {
            if self.wait_ms > budget {
                self.wait_ms -= budget;
                break;
            }
            budget -= self.wait_ms;
            self.wait_ms = 0;
            ran |= self.advance();
        }
        ran
    }

    /// Run exactly one phase, ignoring its delay
    pub fn advance(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        match self.phase {
            Phase::Idle => return false,
            Phase::Detecting => self.detect(),
            Phase::Resolving => self.resolve(),
            Phase::Collapsing => self.collapse(),
            Phase::Refilling => self.refill(),
        }
        true
    }

    fn enter(&mut self, phase: Phase, wait_ms: u32) {
        debug!(from = self.phase.as_str(), to = phase.as_str(), wait_ms, "phase");
        self.phase = phase;
        self.wait_ms = wait_ms;
    }

    fn detect(&mut self) {
        let groups = find_match_groups(&self.grid);

        if groups.is_empty() {
            if let Some((a, b)) = self.pending_swap.take() {
                self.grid.swap(a, b);
                self.events.push(BoardEvent::SwapReverted { a, b });
                self.enter(Phase::Idle, 0);
                return;
            }
            self.settle();
            return;
        }

        self.pending_swap = None;
        self.chain_depth += 1;
        self.events.push(BoardEvent::GroupsDetected {
            count: groups.len() as u32,
            chain_depth: self.chain_depth,
        });
        self.pending_groups = groups;
        self.enter(Phase::Resolving, 0);
    }

    fn settle(&mut self) {
        self.chain_depth = 0;
        self.events.push(BoardEvent::Settled { score: self.score });
        self.enter(Phase::Idle, 0);

        if find_move(&self.grid).is_none() {
            info!(score = self.score, "no productive swap left, game over");
            self.game_over = true;
            self.events.push(BoardEvent::GameOver { score: self.score });
        }
    }

    fn resolve(&mut self) {
        let groups = std::mem::take(&mut self.pending_groups);
        for group in &groups {
            let outcome = resolve_group(&mut self.grid, group, self.chain_depth, &self.modifier);
            let event = match outcome {
                GroupOutcome::Skipped => continue,
                GroupOutcome::Cleared {
                    kind,
                    size,
                    score,
                    created,
                    ..
                } => BoardEvent::GroupCleared {
                    kind,
                    size,
                    score,
                    created,
                },
                GroupOutcome::RowBombFired {
                    at,
                    width,
                    cleared,
                    score,
                } => BoardEvent::RowBombFired {
                    at,
                    width,
                    cleared,
                    score,
                },
            };
            self.events.push(event);
            self.add_score(outcome.score());
        }

        if self.offers.should_offer_on_chain(self.chain_depth) {
            self.events.push(BoardEvent::OfferChoice(OfferReason::Chain));
        }
        self.enter(Phase::Collapsing, self.config.delays.collapse_ms);
    }

    fn collapse(&mut self) {
        self.falls.clear();
        let (w, h) = (self.grid.width() as i8, self.grid.height() as i8);
        for x in 0..w {
            let floor = self.grid.floor(x);
            let mut write = floor;
            for y in floor..h {
                let from = Pos::new(x, y);
                let Some(tile) = self.grid.tile(from) else {
                    continue;
                };
                if y != write {
                    let to = Pos::new(x, write);
                    self.grid.take(from);
                    self.grid.set(to, Some(tile));
                    self.falls.push(Fall { from, to });
                }
                write += 1;
            }
        }
        self.events.push(BoardEvent::Collapsed {
            moved: self.falls.len() as u32,
        });
        self.enter(Phase::Refilling, self.config.delays.refill_ms);
    }

    fn refill(&mut self) {
        self.spawns.clear();
        let empty: Vec<Pos> = self
            .grid
            .positions()
            .filter(|&p| self.grid.tile(p).is_none())
            .collect();
        for pos in empty {
            let kind = self.pool.draw(&mut self.rng);
            self.grid.set(pos, Some(Tile::new(kind)));
            self.spawns.push(pos);
        }
        self.events.push(BoardEvent::Refilled {
            spawned: self.spawns.len() as u32,
        });
        self.enter(Phase::Detecting, self.config.delays.detect_ms);
    }

    fn add_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
        if self.offers.should_offer_on_score(self.score) {
            self.events.push(BoardEvent::OfferChoice(OfferReason::ScoreMilestone));
        }
    }

    /// First productive swap, if any
    pub fn hint(&self) -> Option<(Pos, Pos)> {
        find_move(&self.grid)
    }

    /// Drain events raised since the last call
    pub fn take_events(&mut self) -> Vec<BoardEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[BoardEvent] {
        &self.events
    }

    /// Falls of the last collapse, for animation
    pub fn last_falls(&self) -> &[Fall] {
        &self.falls
    }

    /// Cells filled by the last refill, for animation
    pub fn last_spawns(&self) -> &[Pos] {
        &self.spawns
    }

    pub fn snapshot_into(&self, out: &mut BoardSnapshot) {
        out.width = self.grid.width();
        out.height = self.grid.height();
        out.kinds.clear();
        out.specials.clear();
        for cell in self.grid.cells() {
            match cell {
                Some(tile) => {
                    out.kinds.push(tile.kind.index() + 1);
                    out.specials.push(tile.special.code());
                }
                None => {
                    out.kinds.push(0);
                    out.specials.push(0);
                }
            }
        }
        out.score = self.score;
        out.chain_depth = self.chain_depth;
        out.phase = self.phase;
        out.busy = self.is_busy();
        out.game_over = self.game_over;
        out.pool.clear();
        out.pool.extend_from_slice(self.pool.kinds());
        out.seed = self.config.seed;
        out.move_id = self.move_id;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let mut s = BoardSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Persistable record of the current board
    pub fn save(&self) -> SaveData {
        SaveData::capture(&self.grid, self.score, self.pool.names())
    }

    /// End the run and hand back its save record
    pub fn teardown(self) -> SaveData {
        debug!(score = self.score, moves = self.move_id, "board torn down");
        self.save()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn chain_depth(&self) -> u32 {
        self.chain_depth
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn move_id(&self) -> u32 {
        self.move_id
    }

    pub fn modifier(&self) -> &M {
        &self.modifier
    }

    /// Mutable access for the buff layer (e.g. adding a picked buff)
    pub fn modifier_mut(&mut self) -> &mut M {
        &mut self.modifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhaseDelays;
    use crate::types::TokenKind;

    fn instant() -> BoardConfig {
        BoardConfig::default().with_delays(PhaseDelays::instant())
    }

    #[test]
    fn test_new_board_is_empty_and_idle() {
        let board = Board::plain(instant());
        assert_eq!(board.phase(), Phase::Idle);
        assert_eq!(board.grid().tile_count(), 0);
        assert_eq!(board.pool().len(), 5);
    }

    #[test]
    fn test_init_fills_every_playable_cell() {
        let mut board = Board::plain(instant().with_seed(42));
        assert!(!board.init(None));
        board.step();
        assert_eq!(board.phase(), Phase::Idle);
        assert_eq!(board.grid().tile_count(), 60);
        assert!(board.grid().positions().all(|p| board.grid().tile(p).is_some()));
        assert_eq!(board.chain_depth(), 0);
    }

    #[test]
    fn test_tick_waits_for_delays() {
        let mut board = Board::plain(BoardConfig::default().with_seed(5));
        board.init(None);
        // Generation enters Detecting without delay.
        assert!(board.tick(0));

        let mut grid = Grid::new(8, 8);
        grid.set(Pos::new(3, 3), Some(Tile::new(TokenKind::Apple)));
        grid.set(Pos::new(4, 3), Some(Tile::new(TokenKind::Kiwi)));
        let mut board = Board::with_grid(BoardConfig::default(), NoModifiers, grid);
        assert!(board.request_swap(Pos::new(3, 3), Pos::new(4, 3)));
        assert!(!board.tick(249));
        assert_eq!(board.phase(), Phase::Detecting);
        assert!(board.tick(1));
        assert_eq!(board.phase(), Phase::Idle);
    }

    #[test]
    fn test_snapshot_codes() {
        let mut grid = Grid::new(8, 8);
        grid.set(
            Pos::new(2, 1),
            Some(Tile::new(TokenKind::Banana).with_special(crate::types::Special::ColorBomb)),
        );
        let board = Board::with_grid(instant(), NoModifiers, grid);
        let snap = board.snapshot();
        assert_eq!(snap.kind_code(2, 1), TokenKind::Banana.index() + 1);
        assert_eq!(snap.special_code(2, 1), 2);
        assert_eq!(snap.kind_code(0, 0), 0);
        assert!(snap.playable());
    }
}
