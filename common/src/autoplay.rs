use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

use crate::board::{Board, GameOutcome, RevealOutcome};
use crate::deduce::deduce_and_flag;
use crate::error::Result;
use crate::geometry::Point;
use crate::session::SolverSession;
use crate::strategy::{MoveSelector, Selector, Strategy};

/// What one call to [`AutoPlayer::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The player is paused; nothing was touched.
    Paused,
    /// The cell was safe and the game goes on.
    Opened(Point),
    /// The cell was a mine. The board was restored to the start of the step
    /// and the cell will never be chosen again this run.
    RolledBack(Point),
    /// The chosen cell could not be revealed. Nothing changed.
    Skipped(Point),
    /// The run is over.
    Finished(GameOutcome),
}

/// The terminal notification of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunReport {
    pub outcome: GameOutcome,
    pub elapsed_seconds: f64,
}

/// Drives select → reveal cycles over one board.
///
/// Each [`step`](AutoPlayer::step) is one complete cycle; scheduling the next
/// one (and any delay between them) belongs to whoever calls it. A fatal guess
/// is rolled back instead of ending the game, so a wrong guess only ever
/// costs information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPlayer {
    board: Board,
    session: SolverSession,
    selector: Selector,
    paused: bool,
    finished: Option<GameOutcome>,
}

impl AutoPlayer {
    pub fn new(board: Board, strategy: Strategy) -> Self {
        AutoPlayer {
            board,
            session: SolverSession::new(),
            selector: strategy.selector(),
            paused: false,
            finished: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &SolverSession {
        &self.session
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn strategy(&self) -> Strategy {
        self.selector.strategy()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn finished(&self) -> Option<GameOutcome> {
        self.finished
    }

    /// Takes effect at the next cycle boundary.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Starts a new game on a fresh board of the same size, forgetting the
    /// previous run's memory.
    pub fn restart(&mut self, strategy: Strategy) {
        self.board.reset();
        self.session = SolverSession::new();
        self.selector = strategy.selector();
        self.paused = false;
        self.finished = None;
        log::debug!("restarted with {strategy}");
    }

    /// Manual reveal, bypassing the selector.
    pub fn reveal(&mut self, at: Point) -> Result<RevealOutcome> {
        self.board.reveal(at)
    }

    /// Manual flag toggle.
    pub fn toggle_flag(&mut self, at: Point) -> Result<bool> {
        self.board.toggle_flag(at)
    }

    /// Asks the selector for a move without playing it. Deduced mines are
    /// still flagged.
    pub fn next_move(&mut self) -> Result<Option<Point>> {
        let (board, session) = (&mut self.board, &mut self.session);
        self.selector.next_move(board, session)
    }

    /// Runs one full cycle: snapshot, deduce and flag, choose, reveal, and
    /// roll back if the reveal hit a mine.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<StepOutcome> {
        if self.paused {
            return Ok(StepOutcome::Paused);
        }
        if let Some(outcome) = self.finished.or_else(|| self.board.outcome()) {
            return Ok(self.finish(outcome));
        }

        let snapshot = self.board.snapshot();
        deduce_and_flag(&mut self.board, &mut self.session)?;

        let chosen = match self.next_move()? {
            Some(at) => at,
            None => {
                let candidates: Vec<Point> = self.session.candidates(&self.board).collect();
                match candidates.choose(rng) {
                    Some(&at) => {
                        log::debug!("no move from {}, random pick {at}", self.strategy());
                        at
                    }
                    None => {
                        let board = &self.board;
                        let outcome = if board.revealed_count() == board.safe_cell_count() {
                            GameOutcome::Won
                        } else {
                            GameOutcome::Lost
                        };
                        return Ok(self.finish(outcome));
                    }
                }
            }
        };

        match self.board.reveal_with(chosen, rng)? {
            RevealOutcome::HitMine => {
                self.board.restore(snapshot);
                self.session.mark_bad(chosen);
                self.selector.forget(chosen);
                log::debug!(
                    "{chosen} was a mine, rolled back ({} bad moves)",
                    self.session.bad_moves.len()
                );
                Ok(StepOutcome::RolledBack(chosen))
            }
            RevealOutcome::Won => Ok(self.finish(GameOutcome::Won)),
            RevealOutcome::Opened => Ok(StepOutcome::Opened(chosen)),
            RevealOutcome::NoOp => Ok(StepOutcome::Skipped(chosen)),
        }
    }

    fn finish(&mut self, outcome: GameOutcome) -> StepOutcome {
        if self.finished.is_none() {
            log::debug!(
                "run finished: {outcome:?} after {} bad moves",
                self.session.bad_moves.len()
            );
            self.finished = Some(outcome);
        }
        StepOutcome::Finished(outcome)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(bcs::from_bytes(bytes)?)
    }
}

/// Steps `player` until the run ends, sleeping `delay` between cycles.
///
/// `observer` sees the player after every cycle and may pause or resume it;
/// while paused the driver keeps waiting at the cycle boundary.
pub fn run_blocking<R, F>(
    player: &mut AutoPlayer,
    rng: &mut R,
    delay: Duration,
    mut observer: F,
) -> Result<RunReport>
where
    R: Rng + ?Sized,
    F: FnMut(&mut AutoPlayer, &StepOutcome),
{
    let started = Instant::now();
    loop {
        let outcome = player.step(rng)?;
        observer(player, &outcome);
        if let StepOutcome::Finished(outcome) = outcome {
            return Ok(RunReport {
                outcome,
                elapsed_seconds: started.elapsed().as_secs_f64(),
            });
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}
