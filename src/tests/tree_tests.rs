use crate::position::{Cell, Direction, Grid};
use crate::search::expectimax::Frame;
use crate::search::tree::{Node, Ply, SearchTree};
use crate::search::tt::TranspositionCache;
use crate::search::SearchSetting;

fn early_grid() -> Grid {
    Grid::from_list([2, 2, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 8, 0, 0, 2])
}

#[test]
fn advance_root_fresh_test() {
    let grid = early_grid();
    let tree = SearchTree::advance_root(None, &grid);
    assert_eq!(tree.get(tree.root()).grid, grid);
    assert_eq!(tree.get(tree.root()).ply, None);
    assert!(tree.get(tree.root()).children.is_none());
    assert_eq!(tree.len(), 1);
}

#[test]
fn advance_root_finds_grandchild_test() {
    // Mimic the tree as it stands after a move was chosen: the root is
    // the position before the opponent's placement, its children are the
    // placement choices, their children the chance outcomes.
    let pre_spawn = early_grid();
    let mut tree = SearchTree::new(pre_spawn);
    let root = tree.root();

    let cell = Cell::from_xy(2, 0);
    let place = tree.add(Node::new(Some(Ply::Place(cell)), pre_spawn));
    let other_place = tree.add(Node::new(
        Some(Ply::Place(Cell::from_xy(3, 0))),
        pre_spawn,
    ));
    let spawned_2 = pre_spawn.insert_tile(cell, 2).unwrap();
    let spawned_4 = pre_spawn.insert_tile(cell, 4).unwrap();
    let outcome_2 = tree.add(Node::new(Some(Ply::Spawn(2)), spawned_2));
    let outcome_4 = tree.add(Node::new(Some(Ply::Spawn(4)), spawned_4));
    tree.get_mut(place).children = Some(vec![outcome_2, outcome_4]);
    tree.get_mut(root).children = Some(vec![place, other_place]);
    tree.get_mut(outcome_4).value = 42.0;

    let tree = SearchTree::advance_root(Some(tree), &spawned_4);
    let new_root = tree.get(tree.root());
    assert_eq!(new_root.grid, spawned_4);
    assert_eq!(new_root.value, 42.0);
    // Former siblings were reclaimed along with the old root.
    assert_eq!(tree.len(), 1);
}

#[test]
fn advance_root_miss_starts_fresh_test() {
    let mut tree = SearchTree::new(early_grid());
    let root = tree.root();
    let place = tree.add(Node::new(
        Some(Ply::Place(Cell::from_xy(2, 0))),
        early_grid(),
    ));
    tree.get_mut(root).children = Some(vec![place]);

    let unrelated = Grid::from_list([0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2]);
    let tree = SearchTree::advance_root(Some(tree), &unrelated);
    assert_eq!(tree.get(tree.root()).grid, unrelated);
    assert!(tree.get(tree.root()).children.is_none());
}

#[test]
fn descend_test() {
    let grid = early_grid();
    let mut tree = SearchTree::new(grid);
    let root = tree.root();
    let moved = grid.slide(Direction::Right);
    let child = tree.add(Node::new(Some(Ply::Shift(Direction::Right)), moved));
    tree.get_mut(root).children = Some(vec![child]);

    assert!(!tree.descend(Ply::Shift(Direction::Left)));
    assert!(tree.descend(Ply::Shift(Direction::Right)));
    assert_eq!(tree.get(tree.root()).grid, moved);
}

#[test]
fn descend_on_unexpanded_root_test() {
    let mut tree = SearchTree::new(early_grid());
    assert!(!tree.descend(Ply::Shift(Direction::Right)));
}

#[test]
fn idempotent_expansion_test() {
    let mut tree = SearchTree::new(early_grid());
    let cache = TranspositionCache::new();
    let settings = SearchSetting::default();

    let mut frame = Frame::root(tree.root());
    frame.expand(&mut tree, &cache, &settings).unwrap();
    let first = tree.get(tree.root()).children.clone().unwrap();
    let nodes_after_first = tree.len();

    let mut frame = Frame::root(tree.root());
    frame.expand(&mut tree, &cache, &settings).unwrap();
    let second = tree.get(tree.root()).children.clone().unwrap();

    assert_eq!(first, second);
    assert_eq!(tree.len(), nodes_after_first);
}
