//! Scoring modifier port
//!
//! The board never computes a final score on its own. Each resolved group and
//! each row-bomb activation is described as a [`ScoreRequest`] and handed to a
//! [`ScoreModifier`], which returns the score to add and the row-bomb width to
//! use. The modifier is injected at construction; [`NoModifiers`] passes the
//! base numbers through.

use crate::types::TokenKind;

/// Inputs for one scoring step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreRequest {
    pub base_score: u32,
    /// Representative kind of the group
    pub kind: TokenKind,
    /// A row bomb was created or fired by this step
    pub created_row_bomb: bool,
    /// A color bomb was created by this step
    pub created_color_bomb: bool,
    /// Wave number, at least 1
    pub chain_depth: u32,
}

/// Modifier answer. `row_bomb_width` is clamped to at least 1 by the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifiedScore {
    pub score: u32,
    pub row_bomb_width: i32,
}

/// External score/effect adjustment
pub trait ScoreModifier {
    fn apply(&self, request: &ScoreRequest, row_bomb_width: i32) -> ModifiedScore;
}

/// Identity modifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoModifiers;

impl ScoreModifier for NoModifiers {
    fn apply(&self, request: &ScoreRequest, row_bomb_width: i32) -> ModifiedScore {
        ModifiedScore {
            score: request.base_score,
            row_bomb_width,
        }
    }
}

impl<M: ScoreModifier + ?Sized> ScoreModifier for &M {
    fn apply(&self, request: &ScoreRequest, row_bomb_width: i32) -> ModifiedScore {
        (**self).apply(request, row_bomb_width)
    }
}

impl<M: ScoreModifier + ?Sized> ScoreModifier for Box<M> {
    fn apply(&self, request: &ScoreRequest, row_bomb_width: i32) -> ModifiedScore {
        (**self).apply(request, row_bomb_width)
    }
}
