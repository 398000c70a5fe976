use crate::position::Grid;
use crate::search::Value;

/// Merge value per tile exponent: a tile is worth twice the value of the
/// tile it was merged from, plus itself. Tiles 0 and 2 are worth nothing.
const MERGE_VALUE: [i64; 16] = {
    let mut table = [0i64; 16];
    let mut exponent = 2;
    while exponent < 16 {
        table[exponent] = 2 * table[exponent - 1] + (1i64 << exponent);
        exponent += 1;
    }
    table
};

/// Total merge value accumulated in a tile.
pub fn tile_value(tile: u16) -> Value {
    if tile == 0 {
        0.0
    } else {
        MERGE_VALUE[tile.trailing_zeros() as usize] as Value
    }
}

pub fn max_tile(grid: &Grid) -> Value {
    grid.max_tile() as Value
}

pub fn combination(grid: &Grid) -> Value {
    grid.as_list().iter().map(|&tile| tile_value(tile)).sum()
}

pub fn empty_cells(grid: &Grid) -> Value {
    grid.available_cells().len() as Value - 16.0
}

/// Sum of the merge value of every row and column that is entirely
/// non-decreasing or non-increasing. Empty squares do not break a line's
/// monotonicity, and the first square never counts toward its value.
pub fn monotonic(grid: &Grid) -> Value {
    let tiles = grid.as_list();
    let mut total = 0.0;
    for y in 0..4 {
        total += line_merge_value([
            tiles[4 * y],
            tiles[4 * y + 1],
            tiles[4 * y + 2],
            tiles[4 * y + 3],
        ]);
    }
    for x in 0..4 {
        total += line_merge_value([tiles[x], tiles[x + 4], tiles[x + 8], tiles[x + 12]]);
    }
    total
}

fn line_merge_value(line: [u16; 4]) -> Value {
    let mut increasing = true;
    let mut decreasing = true;
    let mut sum = 0.0;
    for i in 1..4 {
        let tile = line[i];
        if tile == 0 {
            continue;
        }
        increasing = increasing && tile >= line[i - 1];
        decreasing = decreasing && tile <= line[i - 1];
        sum += tile_value(tile);
    }
    if increasing || decreasing {
        sum
    } else {
        0.0
    }
}
