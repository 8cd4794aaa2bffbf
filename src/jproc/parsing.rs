//! Parsing
//!
//! Turns a folded token sequence into a [`ParseTree`] using a finalized [`Grammar`]. The
//! parser itself lives on [`Rule::parse`](crate::jproc::rule::Rule::parse); this module adds
//! the whole-input entry point.

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parsed;

use crate::jproc::grammar::Grammar;
use crate::jproc::lexing::Token;
use crate::jproc::tree::ParseTree;

/// Parses the whole token sequence with the grammar's top rule.
///
/// Errors carry the full token sequence so they can render a source snippet. Tokens left
/// after the top rule completes are a `TrailingTokens` error.
pub fn build_tree(tokens: &[Token], grammar: &Grammar) -> Result<ParseTree, ParseError> {
    let top = grammar.top_rule().map_err(|_| {
        ParseError::new(
            grammar.top_name(),
            ParseErrorKind::UnknownRule {
                name: grammar.top_name().to_string(),
            },
            0,
        )
    })?;

    let mut tree = ParseTree::new();
    let parsed = top
        .parse(tokens, grammar, &mut tree)
        .map_err(|e| e.with_tokens(tokens))?;

    if let Some(extra) = parsed.remaining.first() {
        return Err(ParseError::new(
            top.name(),
            ParseErrorKind::TrailingTokens {
                actual: extra.name.clone(),
            },
            parsed.consumed,
        )
        .with_tokens(tokens));
    }

    log::debug!(
        "built tree with {} nodes from {} tokens",
        tree.len(),
        tokens.len()
    );
    Ok(tree)
}
