//! Board configuration

use crate::types::{
    TokenKind, COLLAPSE_DELAY_MS, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH,
    DEFAULT_MIN_OFFER_CHAIN, DEFAULT_POOL_SIZE, DEFAULT_SCORE_STEP, DETECT_DELAY_MS,
    MAX_BOARD_DIM, MIN_BOARD_DIM, MIN_POOL_SIZE, REFILL_DELAY_MS,
};

/// Pauses inserted by [`Board::tick`](crate::Board::tick) before each phase.
///
/// Presentation only: [`Board::step`](crate::Board::step) ignores them and the
/// outcome of a cascade never depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseDelays {
    pub detect_ms: u32,
    pub collapse_ms: u32,
    pub refill_ms: u32,
}

impl PhaseDelays {
    /// No pauses at all
    pub const fn instant() -> Self {
        Self {
            detect_ms: 0,
            collapse_ms: 0,
            refill_ms: 0,
        }
    }
}

impl Default for PhaseDelays {
    fn default() -> Self {
        Self {
            detect_ms: DETECT_DELAY_MS,
            collapse_ms: COLLAPSE_DELAY_MS,
            refill_ms: REFILL_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: u8,
    pub height: u8,
    /// Kinds drawn into the run's pool
    pub pool_size: usize,
    pub seed: u32,
    /// Score distance between milestone offers
    pub score_step: u32,
    /// Chain depth that triggers a chain offer
    pub min_offer_chain: u32,
    pub delays: PhaseDelays,
}

impl BoardConfig {
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_size(mut self, width: u8, height: u8) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_delays(mut self, delays: PhaseDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Same config with dimensions and pool size clamped to the supported range
    pub fn normalized(mut self) -> Self {
        self.width = self.width.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        self.height = self.height.clamp(MIN_BOARD_DIM, MAX_BOARD_DIM);
        self.pool_size = self.pool_size.clamp(MIN_POOL_SIZE, TokenKind::ALL.len());
        self.score_step = self.score_step.max(1);
        self
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BOARD_WIDTH,
            height: DEFAULT_BOARD_HEIGHT,
            pool_size: DEFAULT_POOL_SIZE,
            seed: 1,
            score_step: DEFAULT_SCORE_STEP,
            min_offer_chain: DEFAULT_MIN_OFFER_CHAIN,
            delays: PhaseDelays::default(),
        }
    }
}
