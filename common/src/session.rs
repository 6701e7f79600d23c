use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::board::Board;
use crate::geometry::Point;

/// Per-run memory of the automatic player. Created with the run and dropped
/// with it; nothing here outlives a single game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSession {
    /// Guesses that turned out to be mines. Never offered again this run.
    pub bad_moves: BTreeSet<Point>,
    /// Cells the solver itself has flagged.
    pub flagged_mines: BTreeSet<Point>,
}

impl SolverSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags every given cell that is not flagged yet. Idempotent.
    pub fn flag_mines<I>(&mut self, board: &mut Board, mines: I)
    where
        I: IntoIterator<Item = Point>,
    {
        for at in mines {
            if board.flag(at) {
                self.flagged_mines.insert(at);
            }
        }
    }

    pub fn mark_bad(&mut self, at: Point) {
        self.bad_moves.insert(at);
    }

    /// Unrevealed, unflagged, and never proven fatal.
    pub fn is_candidate(&self, board: &Board, at: Point) -> bool {
        board.at(at).is_hidden() && !self.bad_moves.contains(&at)
    }

    /// All candidate cells in row-major order.
    pub fn candidates<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = Point> + 'a {
        board
            .dimensions()
            .points()
            .filter(move |&at| self.is_candidate(board, at))
    }
}
