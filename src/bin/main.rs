use std::io;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use tilemax::dump;
use tilemax::position::{Direction, Grid};
use tilemax::search::{SearchError, Searcher};

fn main() {
    println!("play: Play a game through the command line");
    println!("watch: Watch the engine play a full game");
    println!("dump <depth>: Print a diagnostic search tree for a sample position");
    loop {
        let mut input = String::new();
        let bytes_read = io::stdin().read_line(&mut input).unwrap();
        if bytes_read == 0 {
            break;
        }
        let words = input.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }
        match words[0] {
            "play" => play_human(),
            "watch" => watch_game(),
            "dump" => {
                let depth = words.get(1).and_then(|word| word.parse().ok()).unwrap_or(2);
                dump_sample(depth);
            }
            s => println!("Unknown option \"{}\"", s),
        }
    }
}

fn play_human() {
    let mut rng = SmallRng::from_entropy();
    let mut grid = new_game(&mut rng);
    loop {
        println!("{}", grid);
        if grid.available_moves().is_empty() {
            println!("Game over! Best tile: {}", grid.max_tile());
            return;
        }
        println!("Type your move (0=right, 1=down, 2=left, 3=up):");
        let next = loop {
            let mut input = String::new();
            if io::stdin().read_line(&mut input).unwrap() == 0 {
                return;
            }
            let direction = input
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(Direction::from_index);
            match direction {
                Some(direction) => match grid.try_move(direction) {
                    Ok(next) => break next,
                    Err(err) => println!("{}, try again.", err),
                },
                None => println!("Move must be a value between 0 and 3."),
            }
        };
        grid = next;
        match spawn_tile(&grid, &mut rng) {
            Some(next) => grid = next,
            None => continue,
        }
    }
}

fn watch_game() {
    let mut rng = SmallRng::from_entropy();
    let mut grid = new_game(&mut rng);
    let mut searcher = Searcher::new();
    let mut moves = 0u32;
    loop {
        println!("{}", grid);
        match searcher.choose_move(&grid) {
            Ok(direction) => {
                let stats = searcher.stats();
                println!(
                    "{}: depth {}, value {:.1}, {:.0} ms, {} max / {} min / {} chance frames",
                    direction,
                    stats.depth_reached,
                    stats.last_move_value,
                    stats.last_move_time.as_secs_f64() * 1000.0,
                    stats.visits.max,
                    stats.visits.min,
                    stats.visits.expect,
                );
                grid = grid.try_move(direction).unwrap();
                moves += 1;
            }
            Err(SearchError::NoLegalMove) => break,
            Err(err) => {
                println!("search failed: {}", err);
                return;
            }
        }
        match spawn_tile(&grid, &mut rng) {
            Some(next) => grid = next,
            None => break,
        }
    }
    println!(
        "Game over after {} moves. Best tile: {}",
        moves,
        grid.max_tile()
    );
}

fn dump_sample(depth: u32) {
    let grid = Grid::from_list([2, 2, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 2]);
    match dump::dump(&grid, depth) {
        Ok(json) => println!("{}", json),
        Err(err) => println!("dump failed: {}", err),
    }
}

fn new_game(rng: &mut SmallRng) -> Grid {
    let mut grid = Grid::default();
    for _ in 0..2 {
        grid = spawn_tile(&grid, rng).expect("a fresh grid has empty cells");
    }
    grid
}

fn spawn_tile(grid: &Grid, rng: &mut SmallRng) -> Option<Grid> {
    let cells = grid.available_cells();
    let cell = *cells.choose(rng)?;
    let tile = if rng.gen::<f64>() < 0.9 { 2 } else { 4 };
    grid.insert_tile(cell, tile).ok()
}
