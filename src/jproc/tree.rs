//! Parse trees
//!
//! A [`ParseTree`] is an arena of [`Node`]s addressed by [`NodeId`]. During parsing the
//! tree keeps an *active* cursor: entering a rule opens a child of the active node and
//! makes it active, closing it re-activates the parent, and leaves are appended to the
//! active node without moving the cursor.
//!
//! ```text
//! enter(program)       program*
//! leaf(lbrace)         program* ─ lbrace
//! enter(members)       program ─ lbrace, members*
//! close()              program* ─ lbrace, members
//! ```
//!
//! Structural transforms (see [`transform`]) work on closed trees only. Nodes they cut out
//! stay in the arena flagged as detached; traversals start at the root and never see them.

pub mod node;
pub mod transform;

pub use node::{Node, NodeId};
pub use transform::{NodeMatch, TreeError};

use crate::jproc::ebnf::RuleKind;
use crate::jproc::lexing::Token;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    active: Option<NodeId>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// # Panics
    ///
    /// On an id that does not belong to this tree.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Number of nodes reachable from the root.
    pub fn len(&self) -> usize {
        self.pre_order().len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Opens a child of the active node and makes it active.
    ///
    /// With no active node the new node becomes the root of an empty tree, or a child of the
    /// existing root. The root itself stays closed.
    pub fn enter(&mut self, name: &str, kind: RuleKind) -> NodeId {
        let parent = self.attach_point();
        let id = self.push_node(Node::new(name, kind, None, 0), parent);
        self.active = Some(id);
        id
    }

    /// Appends a closed leaf to the active node.
    pub fn leaf(&mut self, token: Token, kind: RuleKind) -> NodeId {
        let parent = self.attach_point();
        let name = token.name.clone();
        self.push_node(Node::new(&name, kind, Some(token), 0), parent)
    }

    /// Closes the active node and re-activates its parent. Returns the closed node.
    pub fn close(&mut self) -> Option<NodeId> {
        let id = self.active?;
        self.nodes[id.0].open = false;
        self.active = self.nodes[id.0].parent;
        Some(id)
    }

    /// Grafts `other` under the active node, preserving its shape.
    ///
    /// Used by the parser to commit the scratch tree of a successful option or repetition
    /// iteration. An empty `other` is a no-op.
    pub fn merge(&mut self, other: ParseTree) {
        let Some(other_root) = other.root else {
            return;
        };
        let offset = self.nodes.len();
        let parent = self.attach_point();
        let base = parent.map_or(0, |p| self.nodes[p.0].level + 1);

        for mut node in other.nodes {
            node.children.iter_mut().for_each(|c| c.0 += offset);
            node.parent = node.parent.map(|p| NodeId(p.0 + offset));
            node.level += base;
            self.nodes.push(node);
        }

        let grafted = NodeId(other_root.0 + offset);
        match parent {
            Some(p) => {
                self.nodes[grafted.0].parent = Some(p);
                self.nodes[p.0].children.push(grafted);
            }
            None => self.root = Some(grafted),
        }
    }

    /// True when construction has finished: no cursor and no open node.
    pub fn is_closed(&self) -> bool {
        self.active.is_none() && self.pre_order().iter().all(|id| !self.nodes[id.0].open)
    }

    /// Node ids reachable from the root, parents before children.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Node ids reachable from the root, children before parents.
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = self.root.map(|r| (r, false)).into_iter().collect();
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                order.push(id);
                continue;
            }
            stack.push((id, true));
            stack.extend(self.nodes[id.0].children.iter().rev().map(|&c| (c, false)));
        }
        order
    }

    /// Ids of the leaves under `id`, in source order.
    pub fn leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = &self.nodes[current.0];
            if node.is_leaf() {
                leaves.push(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        leaves
    }

    pub fn first_leaf(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = &self.nodes[current.0];
            if node.is_leaf() {
                return Some(current);
            }
            current = *node.children.first()?;
        }
    }

    /// Concatenated lexemes of the leaves under `id`.
    pub fn text(&self, id: NodeId) -> String {
        self.leaves(id)
            .into_iter()
            .map(|leaf| self.nodes[leaf.0].lexeme())
            .collect()
    }

    /// Compact structural dump: `(program (bind string number))`.
    pub fn to_sexp(&self) -> String {
        match self.root {
            Some(root) => self.sexp_of(root),
            None => "()".to_string(),
        }
    }

    pub fn sexp_of(&self, id: NodeId) -> String {
        let node = &self.nodes[id.0];
        if node.children.is_empty() {
            return node.name.clone();
        }
        let children: Vec<String> = node.children.iter().map(|&c| self.sexp_of(c)).collect();
        format!("({} {})", node.name, children.join(" "))
    }

    fn attach_point(&self) -> Option<NodeId> {
        self.active.or(self.root)
    }

    fn push_node(&mut self, mut node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        if let Some(p) = parent {
            node.parent = Some(p);
            node.level = self.nodes[p.0].level + 1;
            self.nodes[p.0].children.push(id);
        } else {
            self.root = Some(id);
        }
        self.nodes.push(node);
        id
    }
}
