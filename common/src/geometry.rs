use serde::{Deserialize, Serialize};

/// A cell coordinate on the board.
///
/// Ordering is row-major (row first, then column), which is the tie-break
/// order every move selector relies on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Board dimensions, shared by everything that needs to walk the grid
/// without borrowing the cells themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: usize,
    pub height: usize,
}

impl Dimensions {
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, point: Point) -> bool {
        point.row < self.height && point.col < self.width
    }

    /// Flat arena index of `point`, `row * width + col`.
    pub fn index(&self, point: Point) -> usize {
        point.row * self.width + point.col
    }

    pub fn point(&self, index: usize) -> Point {
        Point {
            row: index / self.width,
            col: index % self.width,
        }
    }

    /// Every coordinate in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let width = self.width;
        (0..self.cell_count()).map(move |i| Point {
            row: i / width,
            col: i % width,
        })
    }

    /// All valid neighbor coordinates of `point`, clipped to the board edges.
    /// Yields up to 8 points in row-major order.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + use<> {
        let width = self.width as isize;
        let height = self.height as isize;

        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = point.row as isize + dr;
                let nc = point.col as isize + dc;

                if nr >= 0 && nr < height && nc >= 0 && nc < width {
                    Some(Point {
                        row: nr as usize,
                        col: nc as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}
