//! Automatic minesweeper player.
//!
//! A [`Board`] holds the minefield and its reveal/flag state machine. Move
//! selectors combine local clue deduction, a bounded backtracking search over
//! the frontier, and guessing heuristics. An [`AutoPlayer`] steps a selector
//! against a board, rolling back any guess that hits a mine.

pub mod autoplay;
pub mod backtrack;
pub mod board;
pub mod config;
pub mod deduce;
pub mod error;
pub mod geometry;
pub mod session;
pub mod strategy;

pub use autoplay::{AutoPlayer, RunReport, StepOutcome, run_blocking};
pub use backtrack::{DeducedState, FrontierProblem, MAX_FRONTIER_SIZE};
pub use board::{Board, Cell, CellView, GameOutcome, RevealOutcome, Snapshot};
pub use config::SolverConfig;
pub use deduce::{Deduction, deduce, deduce_and_flag};
pub use error::{Result, SolverError};
pub use geometry::{Dimensions, Point};
pub use session::SolverSession;
pub use strategy::{
    ConstraintBacktracking, ExhaustiveFrontier, MoveSelector, RuleBased, ScoredHeuristic, Selector,
    Strategy, probability_move,
};
