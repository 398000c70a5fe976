//! An expectiminimax search engine with alpha-beta pruning.
//!
//! This module contains the public-facing convenience API for the search.
//! The traversal itself is in `expectimax`: an explicit stack machine
//! driven by time-boxed iterative deepening, so a move computation can be
//! cancelled cooperatively between any two stack operations.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::evaluation::{policy_eval, value_eval, Feature, PlacementFeature};
use crate::position::{Direction, Grid, GridError};
use crate::search::tree::{Ply, SearchTree};
use crate::search::tt::TranspositionCache;

pub(crate) mod expectimax;
pub mod tree;
pub mod tt;

/// Type alias for position utility, used for scoring grids.
pub type Value = f64;

/// Sentinel for a position with no continuation, well below any
/// heuristic estimate.
pub const LOSS_VALUE: Value = -2048.0;

/// Tile values the chance ply can produce, with their probabilities.
pub const SPAWNS: [(u16, Value); 2] = [(2, 0.9), (4, 0.1)];

pub const DEFAULT_EVAL_WEIGHTS: &[(Feature, Value)] = &[
    (value_eval::combination, 0.75),
    (value_eval::empty_cells, 2.0),
    (value_eval::monotonic, 0.25),
];

pub const DEFAULT_SORT_WEIGHTS: &[(Feature, Value)] = &[
    (value_eval::combination, 0.75),
    (value_eval::empty_cells, 2.0),
    (value_eval::monotonic, 0.25),
];

pub const DEFAULT_PLACEMENT_WEIGHTS: &[(PlacementFeature, Value)] =
    &[(policy_eval::monotonic_change, 0.25)];

#[derive(Clone, Debug)]
pub struct SearchSetting {
    time_budget: Duration,
    max_depth: Option<u16>,
    eval_weights: &'static [(Feature, Value)],
    sort_weights: &'static [(Feature, Value)],
    placement_weights: &'static [(PlacementFeature, Value)],
    placement_bias: Value,
    chance_pruning: bool,
}

impl Default for SearchSetting {
    fn default() -> Self {
        SearchSetting {
            time_budget: Duration::from_millis(190),
            max_depth: None,
            eval_weights: DEFAULT_EVAL_WEIGHTS,
            sort_weights: DEFAULT_SORT_WEIGHTS,
            placement_weights: DEFAULT_PLACEMENT_WEIGHTS,
            placement_bias: 1.1,
            chance_pruning: true,
        }
    }
}

impl SearchSetting {
    /// Wall-clock budget for one move computation.
    pub fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    /// Stop deepening past this depth, even with time to spare.
    pub fn depth_limit(mut self, depth: u16) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn eval_weights(mut self, weights: &'static [(Feature, Value)]) -> Self {
        self.eval_weights = weights;
        self
    }

    pub fn sort_weights(mut self, weights: &'static [(Feature, Value)]) -> Self {
        self.sort_weights = weights;
        self
    }

    pub fn placement_weights(mut self, weights: &'static [(PlacementFeature, Value)]) -> Self {
        self.placement_weights = weights;
        self
    }

    /// Scale applied to the baseline estimate when ordering opponent
    /// placements.
    pub fn placement_bias(mut self, bias: Value) -> Self {
        self.placement_bias = bias;
        self
    }

    /// Skip a chance node's low-probability branch once the partial
    /// expectation is already outside the bounds. Disable for exact
    /// search.
    pub fn chance_pruning(mut self, enabled: bool) -> Self {
        self.chance_pruning = enabled;
        self
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SearchError {
    /// The grid has no legal moves; the game is over.
    NoLegalMove,
    /// A grid operation failed mid-search. The move computation is
    /// aborted, no partial result is returned.
    Board(GridError),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SearchError::NoLegalMove => write!(f, "no legal moves"),
            SearchError::Board(err) => write!(f, "board error: {}", err),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::NoLegalMove => None,
            SearchError::Board(err) => Some(err),
        }
    }
}

impl From<GridError> for SearchError {
    fn from(err: GridError) -> SearchError {
        SearchError::Board(err)
    }
}

/// Frames visited per node kind during the last move computation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct VisitCounts {
    pub max: u64,
    pub min: u64,
    pub expect: u64,
}

#[derive(Clone, Debug, Default)]
pub struct SearchStats {
    pub last_move_time: Duration,
    pub last_move_value: Value,
    /// Deepest fully completed iterative-deepening pass.
    pub depth_reached: u16,
    pub visits: VisitCounts,
}

/// One search session: settings, the persistent tree, and the
/// transposition cache. The cache starts empty and lives until the
/// searcher is dropped.
pub struct Searcher {
    settings: SearchSetting,
    tree: Option<SearchTree>,
    cache: TranspositionCache,
    stats: SearchStats,
}

impl Default for Searcher {
    fn default() -> Self {
        Searcher::new()
    }
}

impl Searcher {
    pub fn new() -> Searcher {
        Searcher::with_settings(SearchSetting::default())
    }

    pub fn with_settings(settings: SearchSetting) -> Searcher {
        Searcher {
            settings,
            tree: None,
            cache: TranspositionCache::new(),
            stats: SearchStats::default(),
        }
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Pick a move for `grid`, spending up to the configured time budget.
    ///
    /// Runs one full search pass per depth, starting at 1. When the
    /// timer fires mid-pass the unfinished pass is discarded and the
    /// previous completed pass's answer is returned; if not even the
    /// first pass completed, the first available move is played.
    pub fn choose_move(&mut self, grid: &Grid) -> Result<Direction, SearchError> {
        let start = Instant::now();
        let legal = grid.available_moves();
        if legal.is_empty() {
            return Err(SearchError::NoLegalMove);
        }

        let mut tree = SearchTree::advance_root(self.tree.take(), grid);
        let mut visits = VisitCounts::default();
        let timer = MoveTimer::start(self.settings.time_budget);
        let token = timer.token();

        let mut completed: Option<expectimax::PassOutcome> = None;
        let mut depth_reached = 0;
        let mut depth = 1;
        let deepening = loop {
            match expectimax::run_pass(
                &mut tree,
                &mut self.cache,
                &self.settings,
                depth,
                &token,
                &mut visits,
            ) {
                Err(err) => break Err(err),
                Ok(None) => break Ok(()),
                Ok(Some(outcome)) => {
                    if token.is_cancelled() {
                        break Ok(());
                    }
                    log::debug!(
                        "depth {} complete: value {:.1}, move {:?}, {} cache entries",
                        depth,
                        outcome.value,
                        outcome.best_move,
                        self.cache.len()
                    );
                    completed = Some(outcome);
                    depth_reached = depth;
                    depth += 1;
                    if self.settings.max_depth.is_some_and(|limit| depth > limit) {
                        break Ok(());
                    }
                }
            }
        };
        timer.stop();
        deepening.map_err(SearchError::Board)?;

        let (value, direction) = match completed {
            Some(outcome) => match outcome.best_move {
                Some(direction) => (outcome.value, direction),
                None => (outcome.value, legal[0].0),
            },
            None => (0.0, legal[0].0),
        };
        tree.descend(Ply::Shift(direction));
        self.tree = Some(tree);
        self.stats = SearchStats {
            last_move_time: start.elapsed(),
            last_move_value: value,
            depth_reached,
            visits,
        };
        Ok(direction)
    }
}

/// Pick a move for a single grid with a fresh search session.
pub fn best_move(grid: &Grid, budget: Duration) -> Result<(Direction, Value), SearchError> {
    let mut searcher = Searcher::with_settings(SearchSetting::default().time_budget(budget));
    let direction = searcher.choose_move(grid)?;
    Ok((direction, searcher.stats().last_move_value))
}

/// One-shot timer armed per move computation. The timer thread waits on
/// a channel; a timeout flips the shared flag, while dropping the sender
/// wakes the thread early so it can never touch the next move's search.
struct MoveTimer {
    armed: Sender<()>,
    flag: Arc<AtomicBool>,
    handle: thread::JoinHandle<()>,
}

impl MoveTimer {
    fn start(budget: Duration) -> MoveTimer {
        let flag = Arc::new(AtomicBool::new(false));
        let (armed, disarmed) = mpsc::channel();
        let timer_flag = Arc::clone(&flag);
        let handle = thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = disarmed.recv_timeout(budget) {
                timer_flag.store(true, Ordering::Release);
            }
        });
        MoveTimer {
            armed,
            flag,
            handle,
        }
    }

    fn token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.flag))
    }

    fn stop(self) {
        drop(self.armed);
        let _ = self.handle.join();
    }
}

/// Read-only view of the cancellation flag, checked by the search thread
/// at frame boundaries.
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
