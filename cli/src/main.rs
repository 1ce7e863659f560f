use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use mineknow_core::{
    Agent, BoardCell, Cell, Game, GameConfig, GameState, MinefieldGenerator,
    RandomMinefieldGenerator, RevealOutcome, StartTile,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "mineknow", about = "Plays Minesweeper with a knowledge-based agent")]
struct Args {
    /// Board height in cells.
    #[arg(long, default_value_t = 8)]
    height: u8,

    /// Board width in cells.
    #[arg(long, default_value_t = 8)]
    width: u8,

    /// Number of mines to place.
    #[arg(long, default_value_t = 8)]
    mines: u16,

    /// How many games to play.
    #[arg(long, default_value_t = 1)]
    games: u32,

    /// Seed for mine placement and random guesses; taken from the clock when
    /// absent. Game `i` plays with `seed + i`.
    #[arg(long)]
    seed: Option<u64>,

    /// Emit one JSON summary line per game instead of the board rendering.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

#[derive(Debug, Serialize)]
struct GameSummary {
    seed: u64,
    won: bool,
    moves: usize,
    random_guesses: usize,
    safe_deductions: usize,
    mine_deductions: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    let base_seed = args.seed.unwrap_or_else(clock_seed);
    let config = GameConfig::new((args.height, args.width), args.mines);

    let mut wins = 0u32;
    for game_index in 0..args.games {
        let seed = base_seed.wrapping_add(u64::from(game_index));
        let summary = play_game(config, seed, args.json)?;

        if summary.won {
            wins += 1;
        }
        if args.json {
            println!("{}", serde_json::to_string(&summary)?);
        }
    }

    log::info!("won {wins} of {} game(s)", args.games);
    Ok(())
}

fn play_game(config: GameConfig, seed: u64, json: bool) -> Result<GameSummary> {
    let minefield =
        RandomMinefieldGenerator::new(seed, (0, 0), StartTile::Random).generate(config);
    let mut game = Game::new(minefield);
    let mut agent = Agent::new(config);
    // decouple guessing from mine placement
    let mut rng = SmallRng::seed_from_u64(seed ^ 0x6d69_6e65);

    let mut moves = 0usize;
    let mut random_guesses = 0usize;

    while !game.is_finished() {
        let cell = match agent.choose_safe_move() {
            Some(cell) => {
                log::debug!("playing known-safe cell {cell:?}");
                cell
            }
            None => match agent.choose_random_move(&mut rng) {
                Some(cell) => {
                    log::debug!("no safe move, guessing {cell:?}");
                    random_guesses += 1;
                    cell
                }
                None => {
                    log::info!("no moves left");
                    break;
                }
            },
        };
        moves += 1;

        let report = game.reveal(cell)?;
        if report.outcome == RevealOutcome::HitMine {
            log::info!("hit a mine at {cell:?}");
            break;
        }
        for (observed, count) in report.observations {
            agent.observe(observed, count)?;
        }

        // flag every cell the agent has proven mined
        let proven: Vec<Cell> = agent.known_mines().iter().copied().collect();
        for mine in proven {
            if !game.is_finished() && game.cell_at(mine) == BoardCell::Hidden {
                game.toggle_flag(mine)?;
            }
        }
    }

    let won = game.state() == GameState::Won;
    if !json {
        println!("{}", render_board(&game));
        println!(
            "{} in {moves} move(s) with {random_guesses} random guess(es), seed {seed}",
            if won { "won" } else { "lost" },
        );
    }

    Ok(GameSummary {
        seed,
        won,
        moves,
        random_guesses,
        safe_deductions: agent.known_safe().len(),
        mine_deductions: agent.known_mines().len(),
    })
}

/// Text rendering of the board, mines uncovered once the game is over.
fn render_board(game: &Game) -> String {
    let (rows, cols) = game.size();
    let ruler = "--".repeat(cols as usize) + "-";

    let mut out = String::new();
    out.push_str(&ruler);
    out.push('\n');
    for row in 0..rows {
        for col in 0..cols {
            let cell = (row, col);
            let glyph = match game.cell_at(cell) {
                BoardCell::Revealed(0) => ' ',
                BoardCell::Revealed(count) => char::from_digit(count.into(), 10).unwrap_or('?'),
                BoardCell::Flagged => 'F',
                BoardCell::Hidden if game.is_finished() && game.has_mine_at(cell) => 'X',
                BoardCell::Hidden => '.',
            };
            out.push('|');
            out.push(glyph);
        }
        out.push_str("|\n");
    }
    out.push_str(&ruler);
    out
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
