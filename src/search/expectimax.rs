//! The expectiminimax traversal, written as an explicit stack machine.
//!
//! Levels cycle Max -> Min -> Expect: the player picks a direction, the
//! opponent picks an empty cell, chance picks the tile that fills it.
//! Each stack frame carries just enough state to resume after a child
//! returns, so the loop can poll the cancellation token once per stack
//! operation regardless of how deep the traversal is.

use crate::evaluation::{estimate, estimate_placement};
use crate::position::{Direction, GridError};
use crate::search::tree::{Node, NodeId, Ply, SearchTree};
use crate::search::tt::{CacheKey, TranspositionCache};
use crate::search::{CancelToken, SearchSetting, Value, VisitCounts, LOSS_VALUE, SPAWNS};

/// Result of one fully completed bounded-depth pass.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PassOutcome {
    pub value: Value,
    pub best_move: Option<Direction>,
}

/// Traversal state bound to one node for the duration of one visit.
/// `i` is `None` until the node's children have been expanded, then the
/// index of the child currently being searched.
pub(crate) enum Frame {
    Max {
        node: NodeId,
        alpha: Value,
        beta: Value,
        i: Option<usize>,
        best: Value,
        best_move: Option<Direction>,
    },
    Min {
        node: NodeId,
        alpha: Value,
        beta: Value,
        i: Option<usize>,
        best: Value,
    },
    Expect {
        node: NodeId,
        alpha: Value,
        beta: Value,
        i: Option<usize>,
        value: Value,
    },
}

enum Step {
    Pop(Value, Option<Ply>),
    Push(Frame),
}

/// Run one full traversal of the tree to `depth_limit`. Returns `None`
/// if the cancellation token fired before the pass finished; the
/// half-updated node values are only ever used for move ordering, so an
/// abandoned pass leaves the tree safe to search again.
pub(crate) fn run_pass(
    tree: &mut SearchTree,
    cache: &mut TranspositionCache,
    settings: &SearchSetting,
    depth_limit: u16,
    token: &CancelToken,
    counts: &mut VisitCounts,
) -> Result<Option<PassOutcome>, GridError> {
    // Three frames per full turn; min frames past this point are leaves.
    let cutoff = 3 * depth_limit as usize - 1;
    let mut stack = vec![Frame::root(tree.root())];
    counts.max += 1;
    let mut result: (Value, Option<Ply>) = (0.0, None);
    let mut best_move = None;

    while !stack.is_empty() {
        if token.is_cancelled() {
            return Ok(None);
        }
        let len = stack.len();
        let frame = stack.last_mut().expect("stack is non-empty");

        let step = if len > cutoff && matches!(frame, Frame::Min { .. }) {
            let node = frame.node();
            let value = estimate(&tree.get(node).grid, settings.eval_weights);
            tree.get_mut(node).value = value;
            Step::Pop(value, tree.get(node).ply)
        } else {
            if frame.index().is_some() {
                frame.update(&result);
            } else {
                frame.expand(tree, cache, settings)?;
            }
            frame.advance();
            let child_count = tree.get(frame.node()).children.as_ref().map_or(0, Vec::len);
            if frame.index() == Some(child_count) || frame.should_prune(settings) {
                let (value, ply) = frame.finalize(tree, cache);
                if len == 1 {
                    best_move = frame.best_move();
                }
                Step::Pop(value, ply)
            } else {
                Step::Push(frame.child(tree))
            }
        };

        match step {
            Step::Pop(value, ply) => {
                result = (value, ply);
                stack.pop();
            }
            Step::Push(child) => {
                counts.record(&child);
                stack.push(child);
            }
        }
    }

    Ok(Some(PassOutcome {
        value: result.0,
        best_move,
    }))
}

impl Frame {
    pub(crate) fn root(node: NodeId) -> Frame {
        Frame::Max {
            node,
            alpha: Value::NEG_INFINITY,
            beta: Value::INFINITY,
            i: None,
            best: Value::NEG_INFINITY,
            best_move: None,
        }
    }

    pub(crate) fn node(&self) -> NodeId {
        match self {
            Frame::Max { node, .. } | Frame::Min { node, .. } | Frame::Expect { node, .. } => *node,
        }
    }

    fn index(&self) -> Option<usize> {
        match self {
            Frame::Max { i, .. } | Frame::Min { i, .. } | Frame::Expect { i, .. } => *i,
        }
    }

    fn advance(&mut self) {
        match self {
            Frame::Max { i, .. } | Frame::Min { i, .. } | Frame::Expect { i, .. } => {
                *i = Some(i.map_or(0, |i| i + 1));
            }
        }
    }

    fn best_move(&self) -> Option<Direction> {
        match self {
            Frame::Max { best_move, .. } => *best_move,
            _ => None,
        }
    }

    /// Populate the node's children if this is its first ever visit, then
    /// order them for this pass: promising moves first for Max, dangerous
    /// placements first for Min. Cached results from earlier passes and
    /// turns stand in for the ordering estimate where available.
    pub(crate) fn expand(
        &mut self,
        tree: &mut SearchTree,
        cache: &TranspositionCache,
        settings: &SearchSetting,
    ) -> Result<(), GridError> {
        match self {
            Frame::Max { node, .. } => {
                if tree.get(*node).children.is_none() {
                    let grid = tree.get(*node).grid;
                    let children = grid
                        .available_moves()
                        .into_iter()
                        .map(|(direction, next)| {
                            tree.add(Node::new(Some(Ply::Shift(direction)), next))
                        })
                        .collect();
                    tree.get_mut(*node).children = Some(children);
                }
                sort_children(tree, *node, true, |tree, child| {
                    let child_node = tree.get(child);
                    cache
                        .get(&CacheKey::new(&child_node.grid, child_node.ply))
                        .unwrap_or_else(|| estimate(&child_node.grid, settings.sort_weights))
                });
            }
            Frame::Min { node, .. } => {
                let grid = tree.get(*node).grid;
                if tree.get(*node).children.is_none() {
                    let children = grid
                        .available_cells()
                        .into_iter()
                        .map(|cell| tree.add(Node::new(Some(Ply::Place(cell)), grid)))
                        .collect();
                    tree.get_mut(*node).children = Some(children);
                }
                let baseline = settings.placement_bias * estimate(&grid, settings.sort_weights);
                sort_children(tree, *node, false, |tree, child| {
                    let child_node = tree.get(child);
                    cache
                        .get(&CacheKey::new(&child_node.grid, child_node.ply))
                        .unwrap_or_else(|| {
                            let Some(Ply::Place(cell)) = child_node.ply else {
                                unreachable!()
                            };
                            baseline
                                + estimate_placement(&grid, cell, settings.placement_weights)
                        })
                });
            }
            Frame::Expect { node, .. } => {
                if tree.get(*node).children.is_none() {
                    let grid = tree.get(*node).grid;
                    let Some(Ply::Place(cell)) = tree.get(*node).ply else {
                        unreachable!()
                    };
                    let mut children = Vec::with_capacity(SPAWNS.len());
                    for (tile, _) in SPAWNS {
                        let next = grid.insert_tile(cell, tile)?;
                        children.push(tree.add(Node::new(Some(Ply::Spawn(tile)), next)));
                    }
                    tree.get_mut(*node).children = Some(children);
                }
            }
        }
        Ok(())
    }

    /// Fold a completed child's value into this frame's running state,
    /// tightening the bound it owns.
    fn update(&mut self, result: &(Value, Option<Ply>)) {
        match self {
            Frame::Max {
                alpha,
                best,
                best_move,
                ..
            } => {
                if result.0 > *best {
                    *best = result.0;
                    if let Some(Ply::Shift(direction)) = result.1 {
                        *best_move = Some(direction);
                    }
                    if *alpha < *best {
                        *alpha = *best;
                    }
                }
            }
            Frame::Min { beta, best, .. } => {
                if result.0 < *best {
                    *best = result.0;
                    if *beta > *best {
                        *beta = *best;
                    }
                }
            }
            Frame::Expect { value, i, .. } => {
                let index = i.expect("update only runs after expansion");
                *value += result.0 * SPAWNS[index].1;
            }
        }
    }

    /// The opponent will not allow a line the player can already beat,
    /// and the player will not enter one the opponent can already punish.
    /// A chance node may skip its low-probability branch once the partial
    /// expectation cannot recover to the bound.
    fn should_prune(&self, settings: &SearchSetting) -> bool {
        match self {
            Frame::Max { beta, best, .. } => *beta <= *best,
            Frame::Min { alpha, best, .. } => *alpha >= *best,
            Frame::Expect {
                alpha, i, value, ..
            } => {
                settings.chance_pruning && *i == Some(1) && *value / SPAWNS[0].1 <= *alpha
            }
        }
    }

    /// Record this frame's value on its node and in the cache, and hand
    /// it to the parent frame.
    fn finalize(
        &self,
        tree: &mut SearchTree,
        cache: &mut TranspositionCache,
    ) -> (Value, Option<Ply>) {
        let (node, value, cache_ply) = match self {
            Frame::Max { node, best, .. } => {
                let value = if best.is_finite() { *best } else { LOSS_VALUE };
                (*node, value, None)
            }
            Frame::Min { node, best, .. } => {
                let value = if best.is_finite() { *best } else { LOSS_VALUE };
                (*node, value, tree.get(*node).ply)
            }
            Frame::Expect { node, value, .. } => (*node, *value, tree.get(*node).ply),
        };
        tree.get_mut(node).value = value;
        cache.put(CacheKey::new(&tree.get(node).grid, cache_ply), value);
        (value, tree.get(node).ply)
    }

    /// Build the frame for the child at the current index, inheriting the
    /// bounds as they now stand.
    fn child(&self, tree: &SearchTree) -> Frame {
        let index = self.index().expect("child only runs after expansion");
        let child = tree.get(self.node()).children.as_ref().expect("expanded")[index];
        match self {
            Frame::Max { alpha, beta, .. } => Frame::Min {
                node: child,
                alpha: *alpha,
                beta: *beta,
                i: None,
                best: Value::INFINITY,
            },
            Frame::Min { alpha, beta, .. } => Frame::Expect {
                node: child,
                alpha: *alpha,
                beta: *beta,
                i: None,
                value: 0.0,
            },
            Frame::Expect { alpha, beta, .. } => Frame::Max {
                node: child,
                alpha: *alpha,
                beta: *beta,
                i: None,
                best: Value::NEG_INFINITY,
                best_move: None,
            },
        }
    }
}

fn sort_children(
    tree: &mut SearchTree,
    node: NodeId,
    descending: bool,
    key: impl Fn(&SearchTree, NodeId) -> Value,
) {
    let children = tree.get(node).children.clone().expect("expanded");
    let mut keyed: Vec<(Value, NodeId)> = children
        .iter()
        .map(|&child| (key(tree, child), child))
        .collect();
    if descending {
        keyed.sort_by(|a, b| b.0.partial_cmp(&a.0).expect("estimates are finite"));
    } else {
        keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("estimates are finite"));
    }
    tree.get_mut(node).children = Some(keyed.into_iter().map(|(_, child)| child).collect());
}

impl VisitCounts {
    pub(crate) fn record(&mut self, frame: &Frame) {
        match frame {
            Frame::Max { .. } => self.max += 1,
            Frame::Min { .. } => self.min += 1,
            Frame::Expect { .. } => self.expect += 1,
        }
    }
}
