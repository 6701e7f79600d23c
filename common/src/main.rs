use anyhow::Context;
use minesolver::*;
use std::str::FromStr;

fn main() -> anyhow::Result<()> {
    // --- 1. Configuration ---
    // Usage: minesolver [strategy] [width] [height] [mines]
    let config = parse_args(std::env::args().skip(1))?;
    config.validate()?;

    let board = config.board()?;
    let mut player = AutoPlayer::new(board, config.strategy);
    let mut rng = rand::rng();

    println!("--- Autonomous Minesweeper Bot ---");
    println!(
        "Strategy: {} on a {}x{} board with {} mines.",
        config.strategy, config.width, config.height, config.mines
    );
    println!("Fatal guesses are rolled back and never tried again.");
    print_board(player.board());

    // --- 2. Game Loop ---
    let mut move_count = 0;
    let delay = config.move_delay();
    let report = run_blocking(&mut player, &mut rng, delay, |player, outcome| {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);
        match outcome {
            StepOutcome::Opened(at) => println!("Bot reveals {at}."),
            StepOutcome::RolledBack(at) => {
                println!("Bot hit a mine at {at}. Rolling back and remembering it.")
            }
            StepOutcome::Skipped(at) => println!("Bot picked {at}, but it could not be revealed."),
            StepOutcome::Paused => println!("Paused."),
            StepOutcome::Finished(_) => println!("No moves left."),
        }
        print_board(player.board());
    })?;

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    match report.outcome {
        GameOutcome::Won => println!("Result: The bot won!"),
        GameOutcome::Lost => println!("Result: The bot could not finish the board."),
    }
    println!(
        "Solved in {:.2} seconds with {} fatal guesses.",
        report.elapsed_seconds,
        player.session().bad_moves.len()
    );
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<SolverConfig> {
    let mut config = SolverConfig::default();
    if let Some(name) = args.next() {
        config.strategy = Strategy::from_str(&name)
            .with_context(|| format!("unknown strategy {name:?}"))?;
    }
    if let Some(width) = args.next() {
        config.width = width.parse().context("width must be a number")?;
    }
    if let Some(height) = args.next() {
        config.height = height.parse().context("height must be a number")?;
    }
    if let Some(mines) = args.next() {
        config.mines = mines.parse().context("mines must be a number")?;
    }
    if args.next().is_some() {
        anyhow::bail!("usage: minesolver [strategy] [width] [height] [mines]");
    }
    Ok(config)
}

fn print_board(board: &Board) {
    // Print header
    print!("   ");
    for col in 0..board.width() {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(board.width()));

    // Print rows
    let views = board.cell_views();
    for (row, cells) in views.chunks(board.width()).enumerate() {
        print!("{:^2}|", row);
        for view in cells {
            let display = if view.flagged {
                " F ".to_string()
            } else if view.is_mine == Some(true) {
                " * ".to_string()
            } else if !view.revealed {
                " ■ ".to_string()
            } else {
                format!(" {} ", view.adjacent_mines)
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
