//! Heuristic evaluation of grid positions.
//!
//! Scores are weighted sums of pure feature functions. `value_eval`
//! holds features over a whole grid, `policy_eval` the feature used to
//! order opponent placements before they are searched.

pub mod policy_eval;
pub mod value_eval;

use crate::position::{Cell, Grid};
use crate::search::Value;

/// A pure scoring function over a grid.
pub type Feature = fn(&Grid) -> Value;

/// A pure scoring function over a single empty cell of a grid.
pub type PlacementFeature = fn(&Grid, Cell) -> Value;

/// Weighted sum of feature values. An empty weight list yields 0.
pub fn estimate(grid: &Grid, weights: &[(Feature, Value)]) -> Value {
    weights
        .iter()
        .map(|(feature, weight)| weight * feature(grid))
        .sum()
}

/// Weighted sum of placement-feature values for one empty cell.
pub fn estimate_placement(grid: &Grid, cell: Cell, weights: &[(PlacementFeature, Value)]) -> Value {
    weights
        .iter()
        .map(|(feature, weight)| weight * feature(grid, cell))
        .sum()
}
