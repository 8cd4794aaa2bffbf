//! Attributes and attribute grammars
//!
//! Attributes are values attached to tokens and tree nodes: source line and nesting depth
//! while scanning, canonical text for the printer, the enclosing scope for the semantic
//! pass. Which attributes exist, and how they are computed, is declared per
//! [`AttributeGrammar`].

pub mod attr;
pub mod attribute_grammar;

pub use attr::{Attr, AttrKind, AttrValue, Attributes};
pub use attribute_grammar::{AttrDecl, AttributeGrammar, FoldPolicy, NodeHook, RuleSet, TokenHook};
