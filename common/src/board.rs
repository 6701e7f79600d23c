use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::error::{Result, SolverError};
use crate::geometry::{Dimensions, Point};

/// A single square of the minefield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub revealed: bool,
    pub flagged: bool,
    /// Mines among the up-to-8 neighbors, in `0..=8`.
    pub adjacent_mines: u8,
}

impl Cell {
    /// Revealed with a non-zero number: a source of constraints.
    pub fn is_clue(&self) -> bool {
        self.revealed && self.adjacent_mines > 0
    }

    /// Neither revealed nor flagged.
    pub fn is_hidden(&self) -> bool {
        !self.revealed && !self.flagged
    }
}

/// What a call to [`Board::reveal`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealOutcome {
    /// Game already over, cell already revealed, or cell flagged. Nothing changed.
    NoOp,
    Opened,
    HitMine,
    Won,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Won,
    Lost,
}

/// The read-only projection of a cell handed to a presentation layer.
/// `is_mine` stays `None` until the game is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub revealed: bool,
    pub flagged: bool,
    pub adjacent_mines: u8,
    pub is_mine: Option<bool>,
}

/// A frozen copy of a board, used to roll back a fatal guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    board: Board,
}

/// The minefield and its reveal/flag state machine.
///
/// Cells live in a flat arena addressed by `row * width + col`. Mines are
/// placed lazily on the first reveal, never under the clicked cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    dims: Dimensions,
    mine_count: usize,
    cells: Vec<Cell>,
    revealed_count: usize,
    game_over: bool,
    first_move: bool,
    mines_placed: bool,
}

impl Board {
    pub fn new(width: usize, height: usize, mine_count: usize) -> Result<Self> {
        if width == 0 || height == 0 || mine_count == 0 || mine_count >= width * height {
            return Err(SolverError::InvalidDimensions {
                width,
                height,
                mines: mine_count,
            });
        }
        Ok(Board {
            dims: Dimensions { width, height },
            mine_count,
            cells: vec![Cell::default(); width * height],
            revealed_count: 0,
            game_over: false,
            first_move: true,
            mines_placed: false,
        })
    }

    /// Builds a board with mines already placed from a text layout, one
    /// string per row:
    ///
    /// - `*` hidden mine, `F` flagged mine
    /// - `.` hidden safe cell, `f` flagged safe cell
    /// - `_` revealed safe cell (its number is computed, no cascade)
    pub fn from_layout(rows: &[&str]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if rows.iter().any(|row| row.chars().count() != width) {
            return Err(SolverError::InvalidLayout(
                "rows have different lengths".to_string(),
            ));
        }

        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            for ch in row.chars() {
                let cell = match ch {
                    '*' => Cell {
                        is_mine: true,
                        ..Cell::default()
                    },
                    'F' => Cell {
                        is_mine: true,
                        flagged: true,
                        ..Cell::default()
                    },
                    '.' => Cell::default(),
                    'f' => Cell {
                        flagged: true,
                        ..Cell::default()
                    },
                    '_' => Cell {
                        revealed: true,
                        ..Cell::default()
                    },
                    other => {
                        return Err(SolverError::InvalidLayout(format!(
                            "unexpected character {other:?}"
                        )));
                    }
                };
                cells.push(cell);
            }
        }

        let mine_count = cells.iter().filter(|c| c.is_mine).count();
        let mut board = Board::new(width, height, mine_count)?;
        board.cells = cells;
        board.revealed_count = board.cells.iter().filter(|c| c.revealed).count();
        board.first_move = false;
        board.mines_placed = true;
        board.calculate_adjacent_mines();
        if board.revealed_count == board.safe_cell_count() {
            board.game_over = true;
        }
        Ok(board)
    }

    /// Discards every cell and counter, keeping the dimensions.
    pub fn reset(&mut self) {
        self.cells = vec![Cell::default(); self.dims.cell_count()];
        self.revealed_count = 0;
        self.game_over = false;
        self.first_move = true;
        self.mines_placed = false;
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed_count
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_first_move(&self) -> bool {
        self.first_move
    }

    pub fn mines_placed(&self) -> bool {
        self.mines_placed
    }

    /// Cells that must be revealed to win.
    pub fn safe_cell_count(&self) -> usize {
        self.dims.cell_count() - self.mine_count
    }

    pub fn cell(&self, at: Point) -> Result<&Cell> {
        self.check(at)?;
        Ok(&self.cells[self.dims.index(at)])
    }

    /// Unchecked access for coordinates produced by the board's own geometry.
    pub(crate) fn at(&self, at: Point) -> &Cell {
        &self.cells[self.dims.index(at)]
    }

    pub fn neighbors_of(&self, at: Point) -> Result<Vec<Point>> {
        self.check(at)?;
        Ok(self.dims.neighbors(at).collect())
    }

    pub fn revealed_neighbor_count(&self, at: Point) -> usize {
        self.dims
            .neighbors(at)
            .filter(|&n| self.at(n).revealed)
            .count()
    }

    /// Every coordinate that is neither revealed nor flagged, row-major.
    pub fn hidden_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.dims.points().filter(|&p| self.at(p).is_hidden())
    }

    /// Revealed numbered cells, row-major.
    pub fn clue_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.dims.points().filter(|&p| self.at(p).is_clue())
    }

    pub fn cell_view(&self, at: Point) -> Result<CellView> {
        let cell = self.cell(at)?;
        Ok(CellView {
            revealed: cell.revealed,
            flagged: cell.flagged,
            adjacent_mines: cell.adjacent_mines,
            is_mine: self.game_over.then_some(cell.is_mine),
        })
    }

    /// Views of the whole grid, row-major.
    pub fn cell_views(&self) -> Vec<CellView> {
        self.dims
            .points()
            .map(|p| {
                let cell = self.at(p);
                CellView {
                    revealed: cell.revealed,
                    flagged: cell.flagged,
                    adjacent_mines: cell.adjacent_mines,
                    is_mine: self.game_over.then_some(cell.is_mine),
                }
            })
            .collect()
    }

    /// `None` while the game is running.
    pub fn outcome(&self) -> Option<GameOutcome> {
        if !self.game_over {
            return None;
        }
        if self.cells.iter().any(|c| c.revealed && c.is_mine) {
            Some(GameOutcome::Lost)
        } else {
            Some(GameOutcome::Won)
        }
    }

    /// Reveals a cell using the thread-local RNG for the first-move mine layout.
    pub fn reveal(&mut self, at: Point) -> Result<RevealOutcome> {
        self.reveal_with(at, &mut rand::rng())
    }

    /// Reveals a cell, cascading through zero cells.
    ///
    /// The first successful reveal places the mines, so it can never hit one.
    pub fn reveal_with<R: Rng + ?Sized>(
        &mut self,
        at: Point,
        rng: &mut R,
    ) -> Result<RevealOutcome> {
        self.check(at)?;
        let index = self.dims.index(at);

        if self.game_over || self.cells[index].revealed || self.cells[index].flagged {
            return Ok(RevealOutcome::NoOp);
        }

        if self.first_move {
            if !self.mines_placed {
                self.place_mines(index, rng);
            }
            self.first_move = false;
            self.mines_placed = true;
        }

        if self.cells[index].is_mine {
            self.cells[index].revealed = true;
            self.revealed_count += 1;
            self.game_over = true;
            return Ok(RevealOutcome::HitMine);
        }

        self.flood_reveal(index);

        if self.revealed_count == self.safe_cell_count() {
            self.game_over = true;
            return Ok(RevealOutcome::Won);
        }
        Ok(RevealOutcome::Opened)
    }

    /// Flips the flag on an unrevealed cell. Returns whether anything changed.
    pub fn toggle_flag(&mut self, at: Point) -> Result<bool> {
        self.check(at)?;
        let cell = &mut self.cells[self.dims.index(at)];
        if self.game_over || cell.revealed {
            return Ok(false);
        }
        cell.flagged = !cell.flagged;
        Ok(true)
    }

    /// Sets a flag if the cell is unrevealed and not yet flagged.
    pub(crate) fn flag(&mut self, at: Point) -> bool {
        let cell = &mut self.cells[self.dims.index(at)];
        if cell.revealed || cell.flagged {
            return false;
        }
        cell.flagged = true;
        true
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: Snapshot) {
        *self = snapshot.board;
    }

    fn check(&self, at: Point) -> Result<()> {
        if self.dims.contains(at) {
            Ok(())
        } else {
            Err(SolverError::InvalidCoordinate {
                row: at.row,
                col: at.col,
                width: self.dims.width,
                height: self.dims.height,
            })
        }
    }

    /// Samples `mine_count` distinct cells, never `excluded`.
    fn place_mines<R: Rng + ?Sized>(&mut self, excluded: usize, rng: &mut R) {
        let indices = 0..self.cells.len();
        let positions: Vec<usize> = indices.filter(|&i| i != excluded).collect();
        for &i in positions.choose_multiple(rng, self.mine_count) {
            self.cells[i].is_mine = true;
        }
        self.calculate_adjacent_mines();
    }

    fn calculate_adjacent_mines(&mut self) {
        let dims = self.dims;
        for index in 0..self.cells.len() {
            let count = dims
                .neighbors(dims.point(index))
                .filter(|&n| self.cells[dims.index(n)].is_mine)
                .count();
            self.cells[index].adjacent_mines = count as u8;
        }
    }

    /// Worklist flood fill: opens `start`, and keeps opening neighbors of
    /// every zero cell. The revealed check makes each cell open at most once.
    fn flood_reveal(&mut self, start: usize) {
        let dims = self.dims;
        let mut queue = VecDeque::from([start]);

        while let Some(index) = queue.pop_front() {
            let cell = &mut self.cells[index];
            if cell.revealed || cell.flagged {
                continue;
            }
            cell.revealed = true;
            self.revealed_count += 1;

            if cell.adjacent_mines == 0 {
                for neighbor in dims.neighbors(dims.point(index)) {
                    let n = dims.index(neighbor);
                    if !self.cells[n].revealed && !self.cells[n].flagged {
                        queue.push_back(n);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    #[test]
    fn test_board_initialization() {
        // A new board is untouched and waiting for the first move
        let board = Board::new(5, 4, 3).unwrap();
        assert_eq!(board.width(), 5);
        assert_eq!(board.height(), 4);
        assert_eq!(board.mine_count(), 3);
        assert_eq!(board.revealed_count(), 0);
        assert!(board.is_first_move());
        assert!(!board.mines_placed());
        assert!(!board.is_game_over());
        let views = board.cell_views();
        assert!(views.iter().all(|v| !v.revealed && v.is_mine.is_none()));
    }

    #[test]
    fn test_board_rejects_bad_mine_counts() {
        assert!(matches!(
            Board::new(3, 3, 9),
            Err(SolverError::InvalidDimensions { .. })
        ));
        assert!(Board::new(3, 3, 0).is_err());
        assert!(Board::new(0, 3, 1).is_err());
    }

    #[test]
    fn test_first_reveal_never_hits_mine() {
        // Dense boards make a fatal first click likely if the exclusion were missing
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(4, 4, 15).unwrap();
            let at = Point::new((seed % 4) as usize, (seed / 4 % 4) as usize);
            let outcome = board.reveal_with(at, &mut rng).unwrap();
            assert_eq!(outcome, RevealOutcome::Won, "seed {seed}");
            assert!(!board.cell(at).unwrap().is_mine);
        }
    }

    #[test]
    fn test_adjacent_counts_match_recomputation() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(9, 7, 12).unwrap();
            board.reveal_with(Point::new(3, 4), &mut rng).unwrap();

            let dims = board.dimensions();
            assert_eq!(board.cells.iter().filter(|c| c.is_mine).count(), 12);
            let mut pair_total = 0;
            for p in dims.points() {
                let cell = board.cell(p).unwrap();
                assert!(cell.adjacent_mines <= 8);
                let direct = dims.neighbors(p).filter(|&n| board.at(n).is_mine);
                assert_eq!(cell.adjacent_mines as usize, direct.count());
                pair_total += cell.adjacent_mines as usize;
            }
            // Every mine is counted once by each of its neighbors
            let from_mines: usize = dims
                .points()
                .filter(|&p| board.at(p).is_mine)
                .map(|p| dims.neighbors(p).count())
                .sum();
            assert_eq!(pair_total, from_mines);
        }
    }

    #[test]
    fn test_zero_reveal_opens_connected_region_and_rim() {
        let mut cascades = 0;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut board = Board::new(10, 10, 10).unwrap();
            let start = Point::new(5, 5);
            board.reveal_with(start, &mut rng).unwrap();
            if board.at(start).adjacent_mines != 0 {
                continue;
            }
            cascades += 1;

            // Independent BFS over zero cells
            let dims = board.dimensions();
            let mut expected = HashSet::from([start]);
            let mut queue = VecDeque::from([start]);
            while let Some(p) = queue.pop_front() {
                if board.at(p).adjacent_mines != 0 {
                    continue;
                }
                for n in dims.neighbors(p) {
                    if expected.insert(n) {
                        queue.push_back(n);
                    }
                }
            }

            let revealed: HashSet<Point> = dims
                .points()
                .filter(|&p| board.at(p).revealed)
                .collect();
            assert_eq!(revealed, expected, "seed {seed}");
            // Each cell was counted exactly once
            assert_eq!(board.revealed_count(), revealed.len());
            assert!(revealed.iter().all(|&p| !board.at(p).is_mine));
        }
        assert!(cascades > 0);
    }

    #[test]
    fn test_reveal_noops() {
        let mut board = Board::from_layout(&["*..", "...", "..."]).unwrap();
        let (mine, clue, corner) = (Point::new(0, 0), Point::new(0, 1), Point::new(2, 2));

        // Flagged cells stay closed
        assert!(board.toggle_flag(corner).unwrap());
        assert_eq!(board.reveal(corner).unwrap(), RevealOutcome::NoOp);

        // Revealing twice does nothing the second time
        assert_eq!(board.reveal(clue).unwrap(), RevealOutcome::Opened);
        let before = board.clone();
        assert_eq!(board.reveal(clue).unwrap(), RevealOutcome::NoOp);
        assert_eq!(board, before);

        // Nothing happens after the game ends
        assert_eq!(board.reveal(mine).unwrap(), RevealOutcome::HitMine);
        let before = board.clone();
        assert_eq!(board.reveal(corner).unwrap(), RevealOutcome::NoOp);
        assert_eq!(board, before);
        assert_eq!(board.outcome(), Some(GameOutcome::Lost));
    }

    #[test]
    fn test_invalid_coordinates_rejected_before_mutation() {
        let mut board = Board::new(3, 2, 1).unwrap();
        let before = board.clone();
        assert!(matches!(
            board.reveal(Point::new(2, 0)),
            Err(SolverError::InvalidCoordinate { row: 2, col: 0, .. })
        ));
        assert!(board.toggle_flag(Point::new(0, 3)).is_err());
        assert!(board.neighbors_of(Point::new(5, 5)).is_err());
        assert_eq!(board, before);
    }

    #[test]
    fn test_toggle_flag() {
        let mut board = Board::from_layout(&["*.", ".."]).unwrap();
        let at = Point::new(0, 0);
        assert!(board.toggle_flag(at).unwrap());
        assert!(board.cell(at).unwrap().flagged);
        assert!(board.toggle_flag(at).unwrap());
        assert!(!board.cell(at).unwrap().flagged);

        // Revealed cells cannot be flagged
        board.reveal(Point::new(1, 1)).unwrap();
        assert!(!board.toggle_flag(Point::new(1, 1)).unwrap());
        assert!(!board.cell(Point::new(1, 1)).unwrap().flagged);
    }

    #[test]
    fn test_win_ends_game_and_exposes_mines() {
        let board = Board::from_layout(&["*_", "__"]).unwrap();
        assert!(board.is_game_over());
        assert_eq!(board.outcome(), Some(GameOutcome::Won));

        let mut board = Board::from_layout(&["*.", "__"]).unwrap();
        let (mine, last) = (Point::new(0, 0), Point::new(0, 1));
        assert_eq!(board.cell_view(mine).unwrap().is_mine, None);
        assert_eq!(board.reveal(last).unwrap(), RevealOutcome::Won);
        assert_eq!(board.cell_view(mine).unwrap().is_mine, Some(true));
        assert_eq!(board.cell_view(last).unwrap().is_mine, Some(false));
    }

    #[test]
    fn test_snapshot_restore_is_exact() {
        let mut board = Board::from_layout(&["*..", "...", "..*"]).unwrap();
        board.reveal(Point::new(0, 2)).unwrap();
        let snapshot = board.snapshot();
        let before = board.clone();

        let mine = Point::new(2, 2);
        assert_eq!(board.reveal(mine).unwrap(), RevealOutcome::HitMine);
        assert!(board.is_game_over());

        board.restore(snapshot);
        assert_eq!(board, before);
        assert!(!board.is_game_over());
    }

    #[test]
    fn test_layout_parsing() {
        let board = Board::from_layout(&["*F.", "f_."]).unwrap();
        assert_eq!(board.mine_count(), 2);
        assert_eq!(board.revealed_count(), 1);
        assert!(board.at(Point::new(0, 1)).flagged);
        assert!(board.at(Point::new(1, 0)).flagged);
        assert_eq!(board.at(Point::new(1, 1)).adjacent_mines, 2);

        assert!(matches!(
            Board::from_layout(&["*.", "."]),
            Err(SolverError::InvalidLayout(_))
        ));
        assert!(Board::from_layout(&["*x"]).is_err());
    }

    #[test]
    fn test_reset() {
        let mut board = Board::from_layout(&["*.", ".."]).unwrap();
        board.reveal(Point::new(1, 1)).unwrap();
        board.reset();
        assert_eq!(board, Board::new(2, 2, 1).unwrap());
    }
}
