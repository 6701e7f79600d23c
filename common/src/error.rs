use thiserror::Error;

/// Everything the solver library can fail with.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("coordinate ({row}, {col}) is outside the {width}x{height} board")]
    InvalidCoordinate {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    #[error("a {width}x{height} board cannot hold {mines} mines")]
    InvalidDimensions {
        width: usize,
        height: usize,
        mines: usize,
    },

    #[error("invalid board layout: {0}")]
    InvalidLayout(String),

    /// The same cell was deduced both safe and a mine in one pass. Only an
    /// inconsistent board (for instance a wrong manual flag) can produce this.
    #[error("cell ({row}, {col}) deduced both safe and a mine")]
    ConstraintConflict { row: usize, col: usize },

    #[error("run codec: {0}")]
    Codec(#[from] bcs::Error),
}

pub type Result<T, E = SolverError> = std::result::Result<T, E>;
