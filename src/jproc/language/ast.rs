//! Parse tree to AST
//!
//! The parse tree mirrors the grammar, so it is full of single-child alternation nodes
//! (`member`, `value`, `key`...), list plumbing (`members`, `member_tail`, `next_member`)
//! and punctuation. Simplification leaves one node per construct:
//!
//! ```text
//! (document (program lbrace (members (member (bind (key string) colon (value (literal number))))
//!     member_tail) rbrace))
//!   => (program (bind string number))
//! ```
//!
//! Member pairs keep their form token, so the value of every pair is its second child.

use crate::jproc::ebnf::RuleKind;
use crate::jproc::tree::{NodeId, NodeMatch, ParseTree, TreeError};

const PLUMBING: [&str; 3] = ["members", "member_tail", "next_member"];
const PUNCTUATION: [&str; 4] = ["lbrace", "rbrace", "colon", "member_divider"];

pub fn simplify(tree: &mut ParseTree) -> Result<(), TreeError> {
    let reduced = tree.reduce_roots(NodeMatch::Kind(RuleKind::Alternation))?;
    let removed = tree.remove_roots(NodeMatch::AnyOf(&PLUMBING))?;
    let deleted = tree.delete_nodes(NodeMatch::AnyOf(&PUNCTUATION))?;
    log::trace!(
        "simplified tree: {} reduced, {} removed, {} deleted",
        reduced,
        removed,
        deleted
    );
    Ok(())
}

/// The value node of a member pair.
pub fn pair_value(tree: &ParseTree, pair: NodeId) -> Option<NodeId> {
    tree.children(pair).get(1).copied()
}
