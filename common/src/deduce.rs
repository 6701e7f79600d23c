use std::collections::BTreeSet;

use crate::board::Board;
use crate::error::{Result, SolverError};
use crate::geometry::Point;
use crate::session::SolverSession;

/// Cells proven safe or proven mines, in row-major order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduction {
    pub safe: BTreeSet<Point>,
    pub mines: BTreeSet<Point>,
}

impl Deduction {
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.mines.is_empty()
    }

    /// The lowest row-major safe cell that is not a known bad move.
    pub fn first_safe(&self, bad_moves: &BTreeSet<Point>) -> Option<Point> {
        self.safe.difference(bad_moves).next().copied()
    }

    /// A cell in both sets means the board contradicts itself.
    pub fn ensure_consistent(&self) -> Result<()> {
        match self.safe.intersection(&self.mines).next() {
            Some(p) => Err(SolverError::ConstraintConflict {
                row: p.row,
                col: p.col,
            }),
            None => Ok(()),
        }
    }
}

/// Single-pass local rules over every clue cell.
///
/// With `remaining = number - flagged neighbors` and `hidden` the unrevealed,
/// unflagged neighbors:
/// - `remaining == |hidden|`: every hidden neighbor is a mine.
/// - `remaining == 0`: every hidden neighbor is safe.
pub fn deduce(board: &Board) -> Result<Deduction> {
    let dims = board.dimensions();
    let mut deduction = Deduction::default();

    for clue in board.clue_points() {
        let mut hidden = Vec::with_capacity(8);
        let mut flagged = 0;
        for n in dims.neighbors(clue) {
            let cell = board.at(n);
            if cell.flagged {
                flagged += 1;
            } else if !cell.revealed {
                hidden.push(n);
            }
        }
        if hidden.is_empty() {
            continue;
        }

        let remaining = board.at(clue).adjacent_mines as isize - flagged;
        if remaining == hidden.len() as isize {
            deduction.mines.extend(hidden);
        } else if remaining == 0 {
            deduction.safe.extend(hidden);
        }
    }

    deduction.ensure_consistent()?;
    Ok(deduction)
}

/// The pre-pass every selector starts with: deduce, then flag the mines.
pub fn deduce_and_flag(board: &mut Board, session: &mut SolverSession) -> Result<Deduction> {
    let deduction = deduce(board)?;
    if !deduction.mines.is_empty() {
        log::trace!("flagging {} deduced mines", deduction.mines.len());
    }
    session.flag_mines(board, deduction.mines.iter().copied());
    Ok(deduction)
}
