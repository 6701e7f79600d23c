use itertools::Itertools;

use crate::board::Board;
use crate::deduce::Deduction;
use crate::geometry::Point;

/// Frontiers larger than this are cut down before searching.
pub const MAX_FRONTIER_SIZE: usize = 16;

/// "Exactly `residual` mines among `cells`", from one revealed clue.
/// `cells` are indices into [`FrontierProblem::frontier`], ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub cells: Vec<usize>,
    /// The clue's number minus its flagged neighbors. May be negative when
    /// flags are wrong, which makes the constraint unsatisfiable.
    pub residual: isize,
}

/// What every consistent assignment agrees on for one frontier cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeducedState {
    ForcedMine,   // A mine in every consistent assignment.
    ForcedSafe,   // Safe in every consistent assignment.
    Undetermined, // Differs between consistent assignments.
}

/// The bounded search input: a (possibly truncated) frontier and the clue
/// constraints restricted to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierProblem {
    pub frontier: Vec<Point>,
    pub constraints: Vec<Constraint>,
}

/// Tallies over every complete assignment that satisfied all constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub solutions: u64,
    /// For each frontier cell, in how many solutions it was a mine.
    pub mine_counts: Vec<u64>,
}

impl SearchOutcome {
    /// `None` when no assignment was consistent.
    pub fn state(&self, cell: usize) -> Option<DeducedState> {
        if self.solutions == 0 {
            return None;
        }
        Some(match self.mine_counts[cell] {
            0 => DeducedState::ForcedSafe,
            n if n == self.solutions => DeducedState::ForcedMine,
            _ => DeducedState::Undetermined,
        })
    }
}

/// Hidden cells next to at least one clue, row-major, cut to
/// [`MAX_FRONTIER_SIZE`].
///
/// Truncation ranks cells by revealed neighbor count and keeps the ones with
/// the fewest, ties in row-major order.
pub fn frontier(board: &Board) -> Vec<Point> {
    let dims = board.dimensions();
    let cells: Vec<Point> = board
        .hidden_points()
        .filter(|&p| dims.neighbors(p).any(|n| board.at(n).is_clue()))
        .collect();

    if cells.len() <= MAX_FRONTIER_SIZE {
        return cells;
    }

    log::trace!(
        "frontier of {} cells truncated to {}",
        cells.len(),
        MAX_FRONTIER_SIZE
    );
    cells
        .into_iter()
        .sorted_by_key(|&p| board.revealed_neighbor_count(p))
        .take(MAX_FRONTIER_SIZE)
        .sorted()
        .collect()
}

impl FrontierProblem {
    pub fn from_board(board: &Board) -> Self {
        let dims = board.dimensions();
        let frontier = frontier(board);

        let mut constraints = Vec::new();
        for clue in board.clue_points() {
            let mut flagged = 0;
            let mut cells = Vec::new();
            for n in dims.neighbors(clue) {
                if board.at(n).flagged {
                    flagged += 1;
                }
                if let Ok(i) = frontier.binary_search(&n) {
                    cells.push(i);
                }
            }
            if cells.is_empty() {
                continue;
            }
            cells.sort_unstable();
            constraints.push(Constraint {
                cells,
                residual: board.at(clue).adjacent_mines as isize - flagged,
            });
        }

        FrontierProblem {
            frontier,
            constraints,
        }
    }

    /// Enumerates mine/safe assignments of the frontier in order, pruning a
    /// branch as soon as a constraint whose cells are all assigned is broken.
    pub fn solve(&self) -> SearchOutcome {
        let n = self.frontier.len();

        // A constraint becomes fully assigned at its last cell; check it there.
        let mut closing = vec![Vec::new(); n];
        for (id, constraint) in self.constraints.iter().enumerate() {
            if let Some(&last) = constraint.cells.last() {
                closing[last].push(id);
            }
        }

        let mut search = Search {
            constraints: &self.constraints,
            closing,
            assignment: vec![false; n],
            outcome: SearchOutcome {
                solutions: 0,
                mine_counts: vec![0; n],
            },
        };
        search.backtrack(0);
        search.outcome
    }
}

struct Search<'a> {
    constraints: &'a [Constraint],
    closing: Vec<Vec<usize>>,
    assignment: Vec<bool>,
    outcome: SearchOutcome,
}

impl Search<'_> {
    fn backtrack(&mut self, index: usize) {
        if index == self.assignment.len() {
            self.outcome.solutions += 1;
            let counts = self.outcome.mine_counts.iter_mut();
            for (count, &mine) in counts.zip(&self.assignment) {
                if mine {
                    *count += 1;
                }
            }
            return;
        }

        for value in [true, false] {
            self.assignment[index] = value;
            if self.consistent_at(index) {
                self.backtrack(index + 1);
            }
        }
    }

    fn consistent_at(&self, index: usize) -> bool {
        self.closing[index].iter().all(|&id| {
            let constraint = &self.constraints[id];
            let mines = constraint
                .cells
                .iter()
                .filter(|&&cell| self.assignment[cell])
                .count();
            mines as isize == constraint.residual
        })
    }
}

/// Runs the bounded search on the board and returns the frontier cells every
/// consistent assignment agrees on. Both sets are empty when nothing is
/// consistent.
pub fn search(board: &Board) -> Deduction {
    let problem = FrontierProblem::from_board(board);
    let outcome = problem.solve();
    log::trace!(
        "backtracking over {} cells and {} constraints found {} solutions",
        problem.frontier.len(),
        problem.constraints.len(),
        outcome.solutions
    );

    let mut deduction = Deduction::default();
    for (i, &cell) in problem.frontier.iter().enumerate() {
        match outcome.state(i) {
            Some(DeducedState::ForcedMine) => {
                deduction.mines.insert(cell);
            }
            Some(DeducedState::ForcedSafe) => {
                deduction.safe.insert(cell);
            }
            Some(DeducedState::Undetermined) | None => {}
        }
    }
    deduction
}
