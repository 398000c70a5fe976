use crate::evaluation::value_eval::tile_value;
use crate::position::{Cell, Grid};
use crate::search::Value;

/// Estimate how a spawn at `cell` would shift the player's prospects, by
/// inspecting the cell's four neighbors.
///
/// A spawn landing between an equal pair costs the merge that pair was
/// worth, so those placements sort toward the front of the opponent's
/// candidates. A neighboring 2 is worth a small bonus, since the spawn
/// itself is a 2 nine times out of ten.
pub fn monotonic_change(grid: &Grid, cell: Cell) -> Value {
    let x = cell.x() as i8;
    let y = cell.y() as i8;
    let neighbor = |dx: i8, dy: i8| -> u16 {
        let nx = x + dx;
        let ny = y + dy;
        if (0..4).contains(&nx) && (0..4).contains(&ny) {
            grid.cell_value(Cell::from_xy(nx as u8, ny as u8))
        } else {
            0
        }
    };
    let left = neighbor(-1, 0);
    let right = neighbor(1, 0);
    let above = neighbor(0, -1);
    let below = neighbor(0, 1);

    let mut change = 0.0;
    if left != 0 && left == right {
        change -= tile_value(left << 1);
    }
    if above != 0 && above == below {
        change -= tile_value(above << 1);
    }
    for tile in [left, right, above, below] {
        if tile == 2 {
            change += tile_value(4);
        }
    }
    change
}
