use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use strum::{Display, EnumIter, EnumString};

use crate::backtrack;
use crate::board::Board;
use crate::deduce::deduce_and_flag;
use crate::error::Result;
use crate::geometry::Point;
use crate::session::SolverSession;

/// Names of the available move selectors, as accepted on the command line.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    RuleBased,
    ExhaustiveFrontier,
    ScoredHeuristic,
    #[default]
    ConstraintBacktracking,
}

impl Strategy {
    pub fn selector(self) -> Selector {
        match self {
            Strategy::RuleBased => Selector::RuleBased(RuleBased),
            Strategy::ExhaustiveFrontier => {
                Selector::ExhaustiveFrontier(ExhaustiveFrontier::default())
            }
            Strategy::ScoredHeuristic => Selector::ScoredHeuristic(ScoredHeuristic),
            Strategy::ConstraintBacktracking => {
                Selector::ConstraintBacktracking(ConstraintBacktracking)
            }
        }
    }
}

/// Picks the next cell to reveal.
///
/// Every selector runs the local deduction first, flags what it proves to be
/// mines and plays a proven-safe cell if there is one. Only when nothing is
/// provably safe does the selector's own fallback run. Known bad moves are
/// never returned, even when a wrong manual flag makes them look safe.
pub trait MoveSelector {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>>;

    /// Called after `at` turned out to be a mine and was rolled back.
    fn forget(&mut self, _at: Point) {}

    fn next_move(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        let deduction = deduce_and_flag(board, session)?;
        if let Some(safe) = deduction.first_safe(&session.bad_moves) {
            return Ok(Some(safe));
        }
        self.fallback(board, session)
    }
}

/// Among candidates, the one with the most revealed neighbors; ties go to the
/// lowest row, then the lowest column.
pub fn probability_move(board: &Board, session: &SolverSession) -> Option<Point> {
    session
        .candidates(board)
        .max_by_key(|&p| (board.revealed_neighbor_count(p), Reverse(p)))
}

/// Local rules only, then the generic fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleBased;

impl MoveSelector for RuleBased {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        Ok(probability_move(board, session))
    }
}

/// Walks the board in row-major order, offering every unknown cell once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhaustiveFrontier {
    pub visited: BTreeSet<Point>,
}

impl MoveSelector for ExhaustiveFrontier {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        let next = session
            .candidates(board)
            .find(|at| !self.visited.contains(at));
        match next {
            Some(at) => {
                self.visited.insert(at);
                Ok(Some(at))
            }
            None => Ok(probability_move(board, session)),
        }
    }

    fn forget(&mut self, at: Point) {
        self.visited.remove(&at);
    }
}

/// Scores cells touching the revealed area by
/// `revealed - clue_sum / (8 * revealed)` and plays the best one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredHeuristic;

impl ScoredHeuristic {
    /// `None` for cells without a revealed neighbor.
    pub fn priority(board: &Board, at: Point) -> Option<f64> {
        let mut revealed = 0u32;
        let mut clue_sum = 0u32;
        for n in board.dimensions().neighbors(at) {
            let cell = board.at(n);
            if cell.revealed {
                revealed += 1;
                clue_sum += u32::from(cell.adjacent_mines);
            }
        }
        if revealed == 0 {
            return None;
        }
        let revealed = f64::from(revealed);
        Some(revealed - f64::from(clue_sum) / (8.0 * revealed))
    }
}

impl MoveSelector for ScoredHeuristic {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        let board = &*board;
        let best = session
            .candidates(board)
            .filter_map(|at| Some((Self::priority(board, at)?, at)))
            .min_by(|(a, pa), (b, pb)| b.total_cmp(a).then(pa.cmp(pb)))
            .map(|(_, at)| at);

        match best {
            Some(at) => Ok(Some(at)),
            None => Ok(probability_move(board, session)),
        }
    }
}

/// Bounded enumeration over the frontier before the generic fallback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintBacktracking;

impl MoveSelector for ConstraintBacktracking {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        let deduction = backtrack::search(board);
        session.flag_mines(board, deduction.mines.iter().copied());
        if let Some(safe) = deduction.first_safe(&session.bad_moves) {
            return Ok(Some(safe));
        }
        log::debug!("backtracking proved nothing safe, guessing");
        Ok(probability_move(board, session))
    }
}

/// One of the four selectors, dispatched statically so a run stays
/// serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    RuleBased(RuleBased),
    ExhaustiveFrontier(ExhaustiveFrontier),
    ScoredHeuristic(ScoredHeuristic),
    ConstraintBacktracking(ConstraintBacktracking),
}

impl Selector {
    pub fn strategy(&self) -> Strategy {
        match self {
            Selector::RuleBased(_) => Strategy::RuleBased,
            Selector::ExhaustiveFrontier(_) => Strategy::ExhaustiveFrontier,
            Selector::ScoredHeuristic(_) => Strategy::ScoredHeuristic,
            Selector::ConstraintBacktracking(_) => Strategy::ConstraintBacktracking,
        }
    }

    fn inner(&mut self) -> &mut dyn MoveSelector {
        match self {
            Selector::RuleBased(s) => s,
            Selector::ExhaustiveFrontier(s) => s,
            Selector::ScoredHeuristic(s) => s,
            Selector::ConstraintBacktracking(s) => s,
        }
    }
}

impl MoveSelector for Selector {
    fn fallback(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        self.inner().fallback(board, session)
    }

    fn forget(&mut self, at: Point) {
        self.inner().forget(at);
    }

    fn next_move(
        &mut self,
        board: &mut Board,
        session: &mut SolverSession,
    ) -> Result<Option<Point>> {
        self.inner().next_move(board, session)
    }
}
