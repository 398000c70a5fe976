use crate::position::{Cell, Direction, Grid, GridError};

#[test]
fn move_right_test() {
    let grid = Grid::from_list([2, 2, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 2]);
    assert_eq!(
        grid.slide(Direction::Right).as_list(),
        [0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 8, 2]
    );
}

#[test]
fn move_down_test() {
    let grid = Grid::from_list([0, 4, 8, 0, 2, 0, 2, 2, 0, 4, 0, 0, 8, 2, 2, 0]);
    assert_eq!(
        grid.slide(Direction::Down).as_list(),
        [0, 0, 0, 0, 0, 0, 0, 0, 2, 8, 8, 0, 8, 2, 4, 2]
    );
}

#[test]
fn merge_nearest_edge_first_test() {
    let grid = Grid::from_list([4, 4, 4, 4, 2, 2, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        grid.slide(Direction::Right).as_list(),
        [0, 0, 8, 8, 0, 0, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0]
    );
}

#[test]
fn list_round_trip_test() {
    let boards = [
        [0u16; 16],
        [2, 2, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 2],
        [2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2],
    ];
    for tiles in boards {
        let grid = Grid::from_list(tiles);
        assert_eq!(Grid::from_list(grid.as_list()), grid);
    }
}

#[test]
fn no_moves_on_stuck_board_test() {
    // Full board, no adjacent equal tiles.
    let grid = Grid::from_list([2, 4, 2, 4, 4, 2, 4, 2, 2, 4, 2, 4, 4, 2, 4, 2]);
    assert!(grid.available_moves().is_empty());
    for direction in Direction::ALL {
        assert_eq!(
            grid.try_move(direction),
            Err(GridError::InvalidMove(direction))
        );
    }
}

#[test]
fn invalid_move_test() {
    let grid = Grid::from_list([0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        grid.try_move(Direction::Right),
        Err(GridError::InvalidMove(Direction::Right))
    );
    assert!(grid.try_move(Direction::Left).is_ok());
}

#[test]
fn available_moves_exclude_no_ops_test() {
    let grid = Grid::from_list([0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let moves: Vec<Direction> = grid
        .available_moves()
        .iter()
        .map(|&(direction, _)| direction)
        .collect();
    assert_eq!(moves, [Direction::Down, Direction::Left]);
}

#[test]
fn insert_tile_test() {
    let grid = Grid::from_list([2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
    let inserted = grid.insert_tile(Cell::from_xy(1, 0), 4).unwrap();
    assert_eq!(inserted.cell_value(Cell::from_xy(1, 0)), 4);
    // The source grid is unchanged.
    assert_eq!(grid.cell_value(Cell::from_xy(1, 0)), 0);

    assert_eq!(
        grid.insert_tile(Cell::from_xy(0, 0), 2),
        Err(GridError::OccupiedCell(Cell::from_xy(0, 0)))
    );
}

#[test]
fn available_cells_test() {
    let grid = Grid::from_list([2, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 8]);
    let cells = grid.available_cells();
    assert_eq!(cells.len(), 13);
    assert!(!cells.contains(&Cell::from_xy(0, 0)));
    assert!(!cells.contains(&Cell::from_xy(1, 1)));
    assert!(!cells.contains(&Cell::from_xy(3, 3)));
    assert!(cells.contains(&Cell::from_xy(2, 2)));
}

#[test]
fn cell_coordinates_test() {
    let cell = Cell::from_xy(2, 3);
    assert_eq!(cell.x(), 2);
    assert_eq!(cell.y(), 3);
    assert_eq!(cell.index(), 14);
}
