//! Diagnostic search-tree dump, for acceptance testing rather than play.
//!
//! A dump is a JSON array of records, one per node, root first. Each
//! record's key is `[move, board]`: the move is `null` for the root, a
//! direction index for player moves, an `[x, y]` pair for opponent
//! placements and a tile value for chance outcomes. Parsing a dump back
//! checks that every child reference resolves inside the document and
//! that every (movetype, children) pairing obeys the game's rules.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::{Cell, Direction, Grid, GridError};

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum MoveType {
    #[serde(rename = "PLAYER")]
    Player,
    #[serde(rename = "OPPONENT")]
    Opponent,
    #[serde(rename = "CHANCE")]
    Chance,
}

/// The move component of a key: a bare number (direction index or tile
/// value) or an `[x, y]` placement.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[serde(untagged)]
pub enum KeyMove {
    Tile(u16),
    Cell([u8; 2]),
}

/// `[move, board]` — identifies one node of the dumped tree.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Key(pub Option<KeyMove>, pub [u16; 16]);

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Debug)]
pub struct Record {
    pub key: Key,
    pub movetype: MoveType,
    pub children: Vec<Key>,
}

#[derive(Debug)]
pub enum DumpError {
    Json(serde_json::Error),
    UnknownChild(Key),
    MalformedKey(Key),
    Inconsistent { parent: Key, reason: &'static str },
    Board(GridError),
}

impl fmt::Display for DumpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DumpError::Json(err) => write!(f, "malformed dump: {}", err),
            DumpError::UnknownChild(key) => {
                write!(f, "child {:?} resolves to no record in the document", key)
            }
            DumpError::MalformedKey(key) => write!(f, "key {:?} has a malformed move", key),
            DumpError::Inconsistent { parent, reason } => {
                write!(f, "record {:?} is inconsistent: {}", parent, reason)
            }
            DumpError::Board(err) => write!(f, "board error: {}", err),
        }
    }
}

impl std::error::Error for DumpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DumpError::Json(err) => Some(err),
            DumpError::Board(err) => Some(err),
            _ => None,
        }
    }
}

/// Expand the complete game tree below `grid` to `depth` single plies
/// (one ply per move, not per turn) and serialize it. Leaves are emitted
/// with empty child lists so every reference resolves.
pub fn dump(grid: &Grid, depth: u32) -> Result<String, DumpError> {
    let mut records = Vec::new();
    let mut frontier = VecDeque::new();
    frontier.push_back((Key(None, grid.as_list()), MoveType::Player, *grid, 0u32));

    while let Some((key, movetype, grid, level)) = frontier.pop_front() {
        let mut children = Vec::new();
        if level < depth {
            match movetype {
                MoveType::Player => {
                    for (direction, next) in grid.available_moves() {
                        let child = Key(
                            Some(KeyMove::Tile(direction.index() as u16)),
                            next.as_list(),
                        );
                        children.push(child.clone());
                        frontier.push_back((child, MoveType::Opponent, next, level + 1));
                    }
                }
                MoveType::Opponent => {
                    for cell in grid.available_cells() {
                        let child =
                            Key(Some(KeyMove::Cell([cell.x(), cell.y()])), grid.as_list());
                        children.push(child.clone());
                        frontier.push_back((child, MoveType::Chance, grid, level + 1));
                    }
                }
                MoveType::Chance => {
                    let Some(KeyMove::Cell([x, y])) = key.0 else {
                        return Err(DumpError::MalformedKey(key));
                    };
                    for tile in [2u16, 4] {
                        let next = grid
                            .insert_tile(Cell::from_xy(x, y), tile)
                            .map_err(DumpError::Board)?;
                        let child = Key(Some(KeyMove::Tile(tile)), next.as_list());
                        children.push(child.clone());
                        frontier.push_back((child, MoveType::Player, next, level + 1));
                    }
                }
            }
        }
        records.push(Record {
            key,
            movetype,
            children,
        });
    }

    serde_json::to_string(&records).map_err(DumpError::Json)
}

pub fn parse(input: &str) -> Result<Vec<Record>, DumpError> {
    serde_json::from_str(input).map_err(DumpError::Json)
}

/// Check that the document is internally consistent: every child key
/// resolves, and each edge obeys the rules of the parent's move type.
pub fn validate(records: &[Record]) -> Result<(), DumpError> {
    let by_key: HashMap<&Key, &Record> = records
        .iter()
        .map(|record| (&record.key, record))
        .collect();
    for record in records {
        for child_key in &record.children {
            let child = by_key
                .get(child_key)
                .copied()
                .ok_or_else(|| DumpError::UnknownChild(child_key.clone()))?;
            check_edge(record, child)?;
        }
    }
    Ok(())
}

fn check_edge(parent: &Record, child: &Record) -> Result<(), DumpError> {
    let parent_grid = Grid::from_list(parent.key.1);
    let child_grid = Grid::from_list(child.key.1);
    match parent.movetype {
        MoveType::Player => {
            let Some(KeyMove::Tile(index)) = child.key.0 else {
                return Err(DumpError::MalformedKey(child.key.clone()));
            };
            let Some(direction) = Direction::from_index(index as usize) else {
                return Err(DumpError::MalformedKey(child.key.clone()));
            };
            let moved = parent_grid.try_move(direction).map_err(DumpError::Board)?;
            if moved != child_grid {
                return Err(DumpError::Inconsistent {
                    parent: parent.key.clone(),
                    reason: "player move does not produce the child grid",
                });
            }
            expect_movetype(child, MoveType::Opponent, parent)
        }
        MoveType::Opponent => {
            let Some(KeyMove::Cell([x, y])) = child.key.0 else {
                return Err(DumpError::MalformedKey(child.key.clone()));
            };
            if x >= 4 || y >= 4 {
                return Err(DumpError::MalformedKey(child.key.clone()));
            }
            if parent_grid.cell_value(Cell::from_xy(x, y)) != 0 {
                return Err(DumpError::Inconsistent {
                    parent: parent.key.clone(),
                    reason: "placement cell is occupied",
                });
            }
            if child_grid != parent_grid {
                return Err(DumpError::Inconsistent {
                    parent: parent.key.clone(),
                    reason: "a placement choice must not change the grid",
                });
            }
            expect_movetype(child, MoveType::Chance, parent)
        }
        MoveType::Chance => {
            let Some(KeyMove::Tile(tile)) = child.key.0 else {
                return Err(DumpError::MalformedKey(child.key.clone()));
            };
            if tile != 2 && tile != 4 {
                return Err(DumpError::MalformedKey(child.key.clone()));
            }
            let Some(KeyMove::Cell([x, y])) = parent.key.0 else {
                return Err(DumpError::MalformedKey(parent.key.clone()));
            };
            let inserted = parent_grid
                .insert_tile(Cell::from_xy(x, y), tile)
                .map_err(DumpError::Board)?;
            if inserted != child_grid {
                return Err(DumpError::Inconsistent {
                    parent: parent.key.clone(),
                    reason: "spawn does not produce the child grid",
                });
            }
            expect_movetype(child, MoveType::Player, parent)
        }
    }
}

fn expect_movetype(child: &Record, expected: MoveType, parent: &Record) -> Result<(), DumpError> {
    if child.movetype != expected {
        return Err(DumpError::Inconsistent {
            parent: parent.key.clone(),
            reason: "child movetype breaks the player/opponent/chance cycle",
        });
    }
    Ok(())
}
