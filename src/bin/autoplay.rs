use std::io;
use std::time::Duration;

use clap::{Arg, Command};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use tilemax::position::Grid;
use tilemax::search::{SearchError, SearchSetting, Searcher};

struct GameSummary {
    moves: u32,
    max_tile: u16,
    mean_move_ms: f64,
}

fn main() -> io::Result<()> {
    let matches = Command::new("tilemax autoplay")
        .version("0.1")
        .arg(
            Arg::new("games")
                .short('g')
                .long("games")
                .env("GAMES")
                .help("Number of games to play")
                .num_args(1)
                .default_value("10")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("budget")
                .short('b')
                .long("budget-ms")
                .env("BUDGET_MS")
                .help("Wall-clock budget per move, in milliseconds")
                .num_args(1)
                .default_value("190")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("depth")
                .short('d')
                .long("depth")
                .env("DEPTH")
                .help("Cap iterative deepening at this depth instead of deepening until the budget runs out")
                .num_args(1)
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .env("SEED")
                .help("Seed for tile spawning, for reproducible runs")
                .num_args(1)
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("logfile")
                .short('l')
                .long("logfile")
                .env("LOGFILE")
                .value_name("autoplay.log")
                .help("Name of debug logfile")
                .num_args(1),
        )
        .get_matches();

    let log_dispatcher = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    if let Some(log_file) = matches.get_one::<String>("logfile") {
        log_dispatcher
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Debug)
                    .chain(fern::log_file(log_file)?),
            )
            .chain(
                fern::Dispatch::new()
                    .level(log::LevelFilter::Warn)
                    .chain(io::stderr()),
            )
            .apply()
            .unwrap()
    } else {
        log_dispatcher
            .level(log::LevelFilter::Warn)
            .chain(io::stderr())
            .apply()
            .unwrap()
    }

    let games = *matches.get_one::<u32>("games").unwrap();
    let budget = Duration::from_millis(*matches.get_one::<u64>("budget").unwrap());
    let mut rng = match matches.get_one::<u64>("seed") {
        Some(&seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    let mut settings = SearchSetting::default().time_budget(budget);
    if let Some(&depth) = matches.get_one::<u16>("depth") {
        settings = settings.depth_limit(depth);
    }

    let mut results = Vec::new();
    for game in 1..=games {
        match play_game(settings.clone(), &mut rng) {
            Ok(summary) => {
                println!(
                    "game {}: {} moves, best tile {}, {:.1} ms/move",
                    game, summary.moves, summary.max_tile, summary.mean_move_ms
                );
                results.push(summary);
            }
            Err(err) => {
                log::error!("game {} aborted: {}", game, err);
                break;
            }
        }
    }

    if !results.is_empty() {
        let mean_moves =
            results.iter().map(|summary| summary.moves as f64).sum::<f64>() / results.len() as f64;
        println!(
            "{} games, {:.0} moves on average",
            results.len(),
            mean_moves
        );
        for target in [512u16, 1024, 2048] {
            let reached = results
                .iter()
                .filter(|summary| summary.max_tile >= target)
                .count();
            println!("{:5}: {}/{}", target, reached, results.len());
        }
    }
    Ok(())
}

fn play_game(settings: SearchSetting, rng: &mut SmallRng) -> Result<GameSummary, SearchError> {
    let mut grid = Grid::default();
    for _ in 0..2 {
        grid = spawn_tile(&grid, rng).expect("a fresh grid has empty cells");
    }
    let mut searcher = Searcher::with_settings(settings);
    let mut moves = 0u32;
    let mut total_time = Duration::ZERO;
    loop {
        match searcher.choose_move(&grid) {
            Ok(direction) => {
                grid = grid.try_move(direction).map_err(SearchError::Board)?;
                moves += 1;
                total_time += searcher.stats().last_move_time;
                log::debug!(
                    "move {}: {} at depth {}, value {:.1}",
                    moves,
                    direction,
                    searcher.stats().depth_reached,
                    searcher.stats().last_move_value
                );
                match spawn_tile(&grid, rng) {
                    Some(next) => grid = next,
                    None => break,
                }
            }
            Err(SearchError::NoLegalMove) => break,
            Err(err) => return Err(err),
        }
    }
    Ok(GameSummary {
        moves,
        max_tile: grid.max_tile(),
        mean_move_ms: if moves == 0 {
            0.0
        } else {
            total_time.as_secs_f64() * 1000.0 / moves as f64
        },
    })
}

fn spawn_tile(grid: &Grid, rng: &mut SmallRng) -> Option<Grid> {
    let cells = grid.available_cells();
    let cell = *cells.choose(rng)?;
    let tile = if rng.gen::<f64>() < 0.9 { 2 } else { 4 };
    grid.insert_tile(cell, tile).ok()
}
