use minesolver::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Steps until the run ends. Every unfinished cycle opens a cell or records
/// a new bad move, so a run can never take more than `cells + 1` steps.
fn play_out(player: &mut AutoPlayer, seed: u64) -> Result<GameOutcome> {
    let mut rng = StdRng::seed_from_u64(seed);
    let limit = player.board().dimensions().cell_count() + 1;
    for _ in 0..limit {
        match player.step(&mut rng)? {
            StepOutcome::Finished(outcome) => return Ok(outcome),
            StepOutcome::Skipped(at) => panic!("seed {seed}: selector offered {at} twice"),
            StepOutcome::Paused => panic!("seed {seed}: paused without being asked"),
            StepOutcome::Opened(_) | StepOutcome::RolledBack(_) => {}
        }
    }
    panic!("seed {seed}: run did not finish within {limit} steps");
}

fn assert_session_sound(player: &AutoPlayer, seed: u64) {
    let board = player.board();
    for at in &player.session().bad_moves {
        let is_mine = board.cell(*at).unwrap().is_mine;
        assert!(is_mine, "seed {seed}: bad move {at} is safe");
    }
    for at in &player.session().flagged_mines {
        let is_mine = board.cell(*at).unwrap().is_mine;
        assert!(is_mine, "seed {seed}: flagged {at} is safe");
    }
}

#[test]
fn test_local_strategies_always_win() {
    // Local deduction never flags a safe cell, and every fatal guess is
    // rolled back, so these runs always clear the board
    for strategy in [
        Strategy::RuleBased,
        Strategy::ExhaustiveFrontier,
        Strategy::ScoredHeuristic,
    ] {
        for seed in 0..25 {
            let board = Board::new(10, 10, 10).unwrap();
            let mut player = AutoPlayer::new(board, strategy);
            let outcome = play_out(&mut player, seed).unwrap();

            assert_eq!(outcome, GameOutcome::Won, "{strategy} seed {seed}");
            assert_eq!(player.board().revealed_count(), 90);
            assert!(player.session().bad_moves.len() <= 10);
            assert_session_sound(&player, seed);
        }
    }
}

#[test]
fn test_backtracking_wins_when_frontier_fits_the_bound() {
    // At most 15 hidden cells after the first click: the search never truncates
    for (width, height, mines) in [(4, 4, 3), (5, 3, 4), (4, 4, 6)] {
        for seed in 0..40 {
            let board = Board::new(width, height, mines).unwrap();
            let mut player = AutoPlayer::new(board, Strategy::ConstraintBacktracking);
            let outcome = play_out(&mut player, seed).unwrap();

            assert_eq!(outcome, GameOutcome::Won, "{width}x{height} seed {seed}");
            assert_session_sound(&player, seed);
        }
    }
}

#[test]
fn test_backtracking_terminates_on_large_boards() {
    // A truncated frontier can mislead the search into flagging a safe cell,
    // which later surfaces as a conflict. Either way the run must stop.
    for seed in 0..15 {
        let board = Board::new(10, 10, 10).unwrap();
        let mut player = AutoPlayer::new(board, Strategy::ConstraintBacktracking);
        match play_out(&mut player, seed) {
            Ok(_) | Err(SolverError::ConstraintConflict { .. }) => {}
            Err(other) => panic!("seed {seed}: unexpected error {other}"),
        }
    }
}

#[test]
fn test_pause_and_resume_mid_run() {
    let board = Board::new(8, 8, 8).unwrap();
    let mut player = AutoPlayer::new(board, Strategy::ScoredHeuristic);
    let mut rng = StdRng::seed_from_u64(42);

    player.step(&mut rng).unwrap();
    player.pause();
    let frozen = player.clone();
    for _ in 0..3 {
        assert_eq!(player.step(&mut rng).unwrap(), StepOutcome::Paused);
    }
    assert_eq!(player, frozen);

    player.resume();
    assert_eq!(play_out(&mut player, 42).unwrap(), GameOutcome::Won);
}

#[test]
fn test_cell_views_hide_mines_until_game_over() {
    let board = Board::new(6, 6, 6).unwrap();
    let mut player = AutoPlayer::new(board, Strategy::RuleBased);
    let mut rng = StdRng::seed_from_u64(9);

    player.step(&mut rng).unwrap();
    if player.finished().is_none() {
        let views = player.board().cell_views();
        assert!(views.iter().all(|v| v.is_mine.is_none()));
    }

    play_out(&mut player, 9).unwrap();
    let views = player.board().cell_views();
    let mines = views.iter().filter(|v| v.is_mine == Some(true));
    assert_eq!(mines.count(), 6);
}
