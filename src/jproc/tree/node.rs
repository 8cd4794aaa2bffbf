//! Parse tree nodes

use crate::jproc::attributes::Attributes;
use crate::jproc::ebnf::RuleKind;
use crate::jproc::lexing::Token;
use serde::Serialize;
use std::fmt;

/// Index of a node in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) kind: RuleKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) token: Option<Token>,
    pub(crate) attrs: Attributes,
    pub(crate) children: Vec<NodeId>,
    #[serde(skip)]
    pub(crate) parent: Option<NodeId>,
    #[serde(skip)]
    pub(crate) open: bool,
    pub(crate) level: usize,
    /// Set once a transform has cut the node out of the tree
    #[serde(skip)]
    pub(crate) detached: bool,
}

impl Node {
    pub(crate) fn new(name: &str, kind: RuleKind, token: Option<Token>, level: usize) -> Self {
        let attrs = token.as_ref().map(|t| t.attrs.clone()).unwrap_or_default();
        Node {
            name: name.to_string(),
            kind,
            open: token.is_none(),
            token,
            attrs,
            children: Vec::new(),
            parent: None,
            level,
            detached: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Lexeme of a leaf, empty for inner nodes.
    pub fn lexeme(&self) -> &str {
        self.token.as_ref().map_or("", |t| t.lexeme.as_str())
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut Attributes {
        &mut self.attrs
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}
