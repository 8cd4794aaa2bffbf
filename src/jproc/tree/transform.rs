//! Structural tree transforms
//!
//! Three transforms simplify a concrete parse tree into an AST:
//!
//! - `reduce_root`: a node with exactly one child is replaced by that child.
//! - `remove_root`: a node is replaced by its children, spliced in at its position.
//! - `delete_node`: a leaf is cut out; an inner node behaves like `remove_root`.
//!
//! Each has a plural form that applies it to every node matching a [`NodeMatch`], visited in
//! pre-order. Sibling order is always preserved and the levels of moved subtrees are
//! recomputed.

use super::node::{Node, NodeId};
use super::ParseTree;
use crate::jproc::ebnf::RuleKind;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// Transforms need a fully constructed tree
    Open,
    /// The node was already cut out of the tree
    Detached(NodeId),
    /// Removing the root would leave several roots
    RootHasSiblings(NodeId),
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::Open => write!(f, "Tree is still under construction"),
            TreeError::Detached(id) => write!(f, "Node {} is not part of the tree", id),
            TreeError::RootHasSiblings(id) => {
                write!(f, "Cannot remove root {}: it has several children", id)
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Selects nodes by kind or name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMatch<'a> {
    Kind(RuleKind),
    Name(&'a str),
    AnyOf(&'a [&'a str]),
}

impl NodeMatch<'_> {
    pub fn matches(&self, node: &Node) -> bool {
        match self {
            NodeMatch::Kind(kind) => node.kind() == *kind,
            NodeMatch::Name(name) => node.name() == *name,
            NodeMatch::AnyOf(names) => names.contains(&node.name()),
        }
    }
}

impl ParseTree {
    /// Node ids matching `m`, in pre-order.
    pub fn find_all(&self, m: NodeMatch<'_>) -> Vec<NodeId> {
        self.pre_order()
            .into_iter()
            .filter(|&id| m.matches(self.node(id)))
            .collect()
    }

    /// Replaces `id` by its only child. Returns `false` (and changes nothing) when the node
    /// does not have exactly one child.
    pub fn reduce_root(&mut self, id: NodeId) -> Result<bool, TreeError> {
        self.check_transformable(id)?;
        Ok(self.reduce_at(id))
    }

    pub fn reduce_roots(&mut self, m: NodeMatch<'_>) -> Result<usize, TreeError> {
        self.check_closed()?;
        let mut reduced = 0;
        for id in self.find_all(m) {
            if !self.nodes[id.0].detached && self.reduce_at(id) {
                reduced += 1;
            }
        }
        Ok(reduced)
    }

    /// Replaces `id` by its children.
    ///
    /// # Errors
    ///
    /// `RootHasSiblings` when `id` is the root and has more than one child.
    pub fn remove_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.check_transformable(id)?;
        self.remove_at(id)
    }

    /// Removes every node matching `m`. Fails without touching the tree when a match would
    /// be removed while it is the root and has several children.
    pub fn remove_roots(&mut self, m: NodeMatch<'_>) -> Result<usize, TreeError> {
        self.check_closed()?;
        self.check_root_chain(m)?;
        let mut removed = 0;
        for id in self.find_all(m) {
            if !self.nodes[id.0].detached {
                self.remove_at(id)?;
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Cuts `id` out of the tree. Leaves disappear with nothing in their place; inner nodes
    /// are replaced by their children.
    pub fn delete_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.remove_root(id)
    }

    pub fn delete_nodes(&mut self, m: NodeMatch<'_>) -> Result<usize, TreeError> {
        self.remove_roots(m)
    }

    fn reduce_at(&mut self, id: NodeId) -> bool {
        if self.nodes[id.0].children.len() != 1 {
            return false;
        }
        self.splice_out(id);
        true
    }

    fn remove_at(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.nodes[id.0].parent.is_none() && self.nodes[id.0].children.len() > 1 {
            return Err(TreeError::RootHasSiblings(id));
        }
        self.splice_out(id);
        Ok(())
    }

    /// Matches are removed in pre-order, so only the single-child chain below the root can
    /// ever become the root of a removal.
    fn check_root_chain(&self, m: NodeMatch<'_>) -> Result<(), TreeError> {
        let mut current = self.root;
        while let Some(id) = current {
            let node = &self.nodes[id.0];
            if !m.matches(node) {
                break;
            }
            current = match node.children.as_slice() {
                [] => None,
                [only] => Some(*only),
                _ => return Err(TreeError::RootHasSiblings(id)),
            };
        }
        Ok(())
    }

    fn check_closed(&self) -> Result<(), TreeError> {
        if self.is_closed() {
            Ok(())
        } else {
            Err(TreeError::Open)
        }
    }

    fn check_transformable(&self, id: NodeId) -> Result<(), TreeError> {
        self.check_closed()?;
        match self.get(id) {
            Some(node) if !node.detached => Ok(()),
            _ => Err(TreeError::Detached(id)),
        }
    }

    /// Puts the children of `id` where `id` was and detaches `id`.
    fn splice_out(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id.0].children);
        let parent = self.nodes[id.0].parent.take();
        let level = self.nodes[id.0].level;
        self.nodes[id.0].detached = true;

        for &child in &children {
            self.nodes[child.0].parent = parent;
            self.relevel(child, level);
        }

        match parent {
            Some(p) => {
                let siblings = &mut self.nodes[p.0].children;
                if let Some(pos) = siblings.iter().position(|&c| c == id) {
                    siblings.splice(pos..=pos, children);
                }
            }
            None => self.root = children.first().copied(),
        }
    }

    fn relevel(&mut self, id: NodeId, level: usize) {
        let mut stack = vec![(id, level)];
        while let Some((current, level)) = stack.pop() {
            self.nodes[current.0].level = level;
            stack.extend(
                self.nodes[current.0]
                    .children
                    .iter()
                    .map(|&c| (c, level + 1)),
            );
        }
    }
}
