use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::board::Board;
use crate::error::Result;
use crate::strategy::Strategy;

/// Settings for one automatic run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub strategy: Strategy,
    /// Pause between cycles when a driver plays the run out in real time.
    pub move_delay_ms: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            width: 10,
            height: 10,
            mines: 10,
            strategy: Strategy::default(),
            move_delay_ms: 500,
        }
    }
}

impl SolverConfig {
    pub fn move_delay(&self) -> Duration {
        Duration::from_millis(self.move_delay_ms)
    }

    /// A fresh board with these dimensions, or the reason it cannot exist.
    pub fn board(&self) -> Result<Board> {
        Board::new(self.width, self.height, self.mines)
    }

    pub fn validate(&self) -> Result<()> {
        self.board().map(|_| ())
    }
}
