//! The persistent search tree.
//!
//! Nodes live in an index-addressed arena owned by the tree, so stack
//! frames can refer to them without borrowing into the node graph.
//! The tree survives from one move to the next: advancing the root keeps
//! the subtree already explored for the position actually reached.

use std::mem;

use crate::position::{Cell, Direction, Grid};
use crate::search::Value;

/// One move of any of the three movers.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Ply {
    /// The player slides the tiles.
    Shift(Direction),
    /// The opponent picks an empty cell to fill.
    Place(Cell),
    /// Chance picks which tile value fills it.
    Spawn(u16),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// One ply's worth of state. `children` is `None` until the node is first
/// expanded; expansion happens at most once per node, since the grid is
/// immutable.
#[derive(Clone, Debug, Default)]
pub struct Node {
    pub ply: Option<Ply>,
    pub grid: Grid,
    pub value: Value,
    pub children: Option<Vec<NodeId>>,
}

impl Node {
    pub fn new(ply: Option<Ply>, grid: Grid) -> Node {
        Node {
            ply,
            grid,
            value: 0.0,
            children: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SearchTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SearchTree {
    pub fn new(grid: Grid) -> SearchTree {
        SearchTree {
            nodes: vec![Node::new(None, grid)],
            root: NodeId(0),
        }
    }

    /// Locate the subtree matching `grid` in an existing tree, or start a
    /// fresh one. A match is looked for among the root's grandchildren:
    /// one ply down for the opponent's placement, one more for the chance
    /// outcome. Promoting the match reclaims all its former siblings.
    pub fn advance_root(tree: Option<SearchTree>, grid: &Grid) -> SearchTree {
        if let Some(mut tree) = tree {
            if let Some(id) = tree.find_grandchild(grid) {
                tree.promote(id);
                return tree;
            }
        }
        SearchTree::new(*grid)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn find_grandchild(&self, grid: &Grid) -> Option<NodeId> {
        let root = self.get(self.root);
        for &child in root.children.iter().flatten() {
            for &grandchild in self.get(child).children.iter().flatten() {
                if self.get(grandchild).grid == *grid {
                    return Some(grandchild);
                }
            }
        }
        None
    }

    /// Make the root's direct child carrying `ply` the new root. Returns
    /// false if the root has no such child (e.g. it was never expanded).
    pub fn descend(&mut self, ply: Ply) -> bool {
        let target = self
            .get(self.root)
            .children
            .iter()
            .flatten()
            .copied()
            .find(|&child| self.get(child).ply == Some(ply));
        match target {
            Some(id) => {
                self.promote(id);
                true
            }
            None => false,
        }
    }

    /// Make `new_root` the root, compacting the arena down to the nodes
    /// still reachable from it.
    pub fn promote(&mut self, new_root: NodeId) {
        let mut old = mem::take(&mut self.nodes);
        self.root = Self::copy_subtree(&mut old, new_root, &mut self.nodes);
    }

    fn copy_subtree(old: &mut [Node], id: NodeId, dst: &mut Vec<Node>) -> NodeId {
        let node = mem::take(&mut old[id.index()]);
        let new_id = NodeId(dst.len() as u32);
        dst.push(node);
        if let Some(children) = dst[new_id.index()].children.take() {
            let children = children
                .iter()
                .map(|&child| Self::copy_subtree(old, child, dst))
                .collect();
            dst[new_id.index()].children = Some(children);
        }
        new_id
    }
}
