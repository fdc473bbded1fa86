use crate::types::{Phase, TokenKind};

/// Read-only view of a board for observers and the remote-control adapter
///
/// Cells are row-major from the bottom row (`y * width + x`). Kind codes are
/// 0 for empty and `TokenKind::index() + 1` otherwise; special codes follow
/// [`Special::code`](crate::types::Special::code).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    pub kinds: Vec<u8>,
    pub specials: Vec<u8>,
    pub score: u32,
    pub chain_depth: u32,
    pub phase: Phase,
    pub busy: bool,
    pub game_over: bool,
    pub pool: Vec<TokenKind>,
    pub seed: u32,
    pub move_id: u32,
}

impl BoardSnapshot {
    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.kinds.clear();
        self.specials.clear();
        self.score = 0;
        self.chain_depth = 0;
        self.phase = Phase::Idle;
        self.busy = false;
        self.game_over = false;
        self.pool.clear();
        self.seed = 0;
        self.move_id = 0;
    }

    /// Kind code at `(x, y)`; 0 when empty or out of range
    pub fn kind_code(&self, x: u8, y: u8) -> u8 {
        self.code_at(&self.kinds, x, y)
    }

    pub fn special_code(&self, x: u8, y: u8) -> u8 {
        self.code_at(&self.specials, x, y)
    }

    fn code_at(&self, codes: &[u8], x: u8, y: u8) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        codes
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Accepting swaps
    pub fn playable(&self) -> bool {
        !self.game_over && !self.busy
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            kinds: Vec::new(),
            specials: Vec::new(),
            score: 0,
            chain_depth: 0,
            phase: Phase::Idle,
            busy: false,
            game_over: false,
            pool: Vec::new(),
            seed: 0,
            move_id: 0,
        }
    }
}
