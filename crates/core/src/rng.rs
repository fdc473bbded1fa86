//! RNG module - seeded randomness and the active token pool
//!
//! Each run draws a fixed-size subset of [`TokenKind::ALL`] without
//! replacement; every generated or refilled tile is then drawn uniformly from
//! that pool. A simple LCG keeps runs reproducible from a seed.

use crate::types::TokenKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // A zero state would stay degenerate
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Value in `[0, max)`; `max == 0` yields 0
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        // High bits of an LCG are the better distributed ones
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// The kinds a run draws tiles from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPool {
    kinds: Vec<TokenKind>,
}

impl TokenPool {
    /// Pick `size` distinct kinds; `size` is clamped to `1..=ALL.len()`.
    pub fn pick(rng: &mut SimpleRng, size: usize) -> Self {
        let mut remaining = TokenKind::ALL.to_vec();
        let size = size.clamp(1, remaining.len());
        let mut kinds = Vec::with_capacity(size);
        while kinds.len() < size {
            let idx = rng.next_range(remaining.len() as u32) as usize;
            kinds.push(remaining.remove(idx));
        }
        Self { kinds }
    }

    /// Rebuild a pool from saved names. Unknown names and duplicates are
    /// dropped; `None` if nothing usable is left.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Option<Self> {
        let mut kinds = Vec::with_capacity(names.len());
        for name in names {
            match TokenKind::from_str(name.as_ref()) {
                Some(kind) if !kinds.contains(&kind) => kinds.push(kind),
                Some(_) => {}
                None => tracing::warn!(name = name.as_ref(), "unknown token name in pool"),
            }
        }
        (!kinds.is_empty()).then_some(Self { kinds })
    }

    pub fn draw(&self, rng: &mut SimpleRng) -> TokenKind {
        self.kinds[rng.next_range(self.kinds.len() as u32) as usize]
    }

    pub fn kinds(&self) -> &[TokenKind] {
        &self.kinds
    }

    pub fn names(&self) -> Vec<String> {
        self.kinds.iter().map(|k| k.as_str().to_string()).collect()
    }

    pub fn contains(&self, kind: TokenKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
