use crate::evaluation::value_eval::{
    combination, empty_cells, max_tile, monotonic, tile_value,
};
use crate::evaluation::{estimate, estimate_placement, policy_eval, Feature};
use crate::position::{Cell, Grid};
use crate::search::Value;

#[test]
fn tile_value_test() {
    // Doubling a tile is worth twice the source tile's value plus itself.
    assert_eq!(tile_value(0), 0.0);
    assert_eq!(tile_value(2), 0.0);
    assert_eq!(tile_value(4), 4.0);
    assert_eq!(tile_value(8), 16.0);
    assert_eq!(tile_value(16), 48.0);
    assert_eq!(tile_value(32), 128.0);
    assert_eq!(tile_value(2048), 20480.0);
}

#[test]
fn combination_test() {
    let grid = Grid::from_list([2, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(combination(&grid), 20.0);
    assert_eq!(combination(&Grid::from_list([0; 16])), 0.0);
}

#[test]
fn empty_cells_test() {
    let grid = Grid::from_list([2, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(empty_cells(&grid), -3.0);
    assert_eq!(empty_cells(&Grid::from_list([0; 16])), 0.0);
}

#[test]
fn max_tile_test() {
    let grid = Grid::from_list([2, 4, 128, 0, 0, 0, 0, 0, 0, 0, 0, 16, 0, 0, 0, 0]);
    assert_eq!(max_tile(&grid), 128.0);
}

#[test]
fn monotonic_rows_test() {
    // One increasing row; the first square of a line never counts.
    let grid = Grid::from_list([2, 4, 8, 16, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(monotonic(&grid), 68.0);

    // Neither increasing nor decreasing.
    let grid = Grid::from_list([4, 2, 8, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(monotonic(&grid), 0.0);
}

#[test]
fn monotonic_ignores_empty_squares_test() {
    let grid = Grid::from_list([0, 2, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(monotonic(&grid), 20.0);
}

#[test]
fn estimate_test() {
    let grid = Grid::from_list([2, 4, 8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let weights: &[(Feature, Value)] = &[(max_tile, 1.0), (empty_cells, 2.0)];
    assert_eq!(estimate(&grid, weights), 8.0 - 6.0);

    let empty: &[(Feature, Value)] = &[];
    assert_eq!(estimate(&grid, empty), 0.0);
}

#[test]
fn placement_splits_pair_test() {
    // A spawn at (1, 1) lands between two mergeable fours.
    let grid = Grid::from_list([0, 0, 0, 0, 4, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let change = policy_eval::monotonic_change(&grid, Cell::from_xy(1, 1));
    assert_eq!(change, -tile_value(8));
}

#[test]
fn placement_next_to_two_test() {
    let grid = Grid::from_list([2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let change = policy_eval::monotonic_change(&grid, Cell::from_xy(1, 0));
    assert_eq!(change, tile_value(4));
}

#[test]
fn estimate_placement_test() {
    let grid = Grid::from_list([0, 0, 0, 0, 4, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let weights = crate::search::DEFAULT_PLACEMENT_WEIGHTS;
    assert_eq!(
        estimate_placement(&grid, Cell::from_xy(1, 1), weights),
        0.25 * -tile_value(8)
    );
}
