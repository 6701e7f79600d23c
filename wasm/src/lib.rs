use minesolver as ms;
use std::str::FromStr;
use wasm_bindgen::prelude::*;

// Every export takes the serialized run and returns the updated bytes. The
// last byte appended by `reveal` and `step` says what happened.

const STEP_PAUSED: u8 = 0;
const STEP_OPENED: u8 = 1;
const STEP_ROLLED_BACK: u8 = 2;
const STEP_SKIPPED: u8 = 3;
const STEP_WON: u8 = 4;
const STEP_LOST: u8 = 5;

const CELL_HIDDEN: i8 = -1;
const CELL_FLAGGED: i8 = -2;
const CELL_MINE: i8 = -3;

fn load(bts: &[u8]) -> Result<ms::AutoPlayer, String> {
    ms::AutoPlayer::from_bytes(bts).map_err(|e| e.to_string())
}

fn store(player: &ms::AutoPlayer) -> Result<Vec<u8>, String> {
    player.to_bytes().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn create_run(width: u8, height: u8, mines: u16, strategy: &str) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let strategy = ms::Strategy::from_str(strategy)
        .map_err(|e| format!("unknown strategy {strategy:?}: {e}"))?;
    let board = ms::Board::new(width as usize, height as usize, mines as usize)
        .map_err(|e| e.to_string())?;
    store(&ms::AutoPlayer::new(board, strategy))
}

/// Starts over on a fresh board of the same size, possibly with another
/// strategy.
#[wasm_bindgen]
pub fn restart(bts: Vec<u8>, strategy: &str) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    let strategy = ms::Strategy::from_str(strategy)
        .map_err(|e| format!("unknown strategy {strategy:?}: {e}"))?;
    player.restart(strategy);
    store(&player)
}

#[wasm_bindgen]
pub fn reveal(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    let outcome = player
        .reveal(ms::Point { row, col })
        .map_err(|e| e.to_string())?;
    let mut xs = store(&player)?;
    xs.push(match outcome {
        ms::RevealOutcome::NoOp => STEP_SKIPPED,
        ms::RevealOutcome::Opened => STEP_OPENED,
        ms::RevealOutcome::HitMine => STEP_LOST,
        ms::RevealOutcome::Won => STEP_WON,
    });
    Ok(xs)
}

#[wasm_bindgen]
pub fn toggle_flag(bts: Vec<u8>, row: usize, col: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    player
        .toggle_flag(ms::Point { row, col })
        .map_err(|e| e.to_string())?;
    store(&player)
}

/// One solver cycle. The caller schedules the next one.
#[wasm_bindgen]
pub fn step(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    let mut rng = rand::rng();
    let outcome = player.step(&mut rng).map_err(|e| e.to_string())?;
    let mut xs = store(&player)?;
    xs.push(match outcome {
        ms::StepOutcome::Paused => STEP_PAUSED,
        ms::StepOutcome::Opened(_) => STEP_OPENED,
        ms::StepOutcome::RolledBack(_) => STEP_ROLLED_BACK,
        ms::StepOutcome::Skipped(_) => STEP_SKIPPED,
        ms::StepOutcome::Finished(ms::GameOutcome::Won) => STEP_WON,
        ms::StepOutcome::Finished(ms::GameOutcome::Lost) => STEP_LOST,
    });
    Ok(xs)
}

#[wasm_bindgen]
pub fn pause(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    let mut player = load(&bts)?;
    player.pause();
    store(&player)
}

#[wasm_bindgen]
pub fn resume(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    let mut player = load(&bts)?;
    player.resume();
    store(&player)
}

/// Row-major cell codes: the clue number for revealed cells, otherwise one
/// of the negative markers. Mines only show once the game is over.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let player = load(&bts)?;
    let views = player.board().cell_views();
    Ok(views.into_iter().map(cell_code).collect())
}

fn cell_code(view: ms::CellView) -> i8 {
    if view.flagged {
        CELL_FLAGGED
    } else if view.is_mine == Some(true) {
        CELL_MINE
    } else if !view.revealed {
        CELL_HIDDEN
    } else {
        view.adjacent_mines as i8
    }
}
