#[cfg(test)]
mod grid_tests;
#[cfg(test)]
mod heuristic_tests;
#[cfg(test)]
mod tree_tests;
