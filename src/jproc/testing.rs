//! Testing utilities
//!
//! Tests should take their programs from the sample files under `samples/` rather than
//! writing larger programs inline: the samples are kept valid and in canonical layout, so a
//! test failure points at the compiler and not at a typo in the fixture.
//!
//! ```rust,ignore
//! use jproc::jproc::testing::{sample, SAMPLE_PROGRAM};
//!
//! let source = sample("compact.json").unwrap();
//! ```
//!
//! Token factories build folded token sequences directly, for tests of the parser and the
//! tree transforms that should not depend on the lexer.

use crate::jproc::attributes::Attr;
use crate::jproc::lexing::Token;

/// The reference program, in canonical layout.
pub const SAMPLE_PROGRAM: &str = include_str!("../../samples/inventory.json");

/// The symbol names [`SAMPLE_PROGRAM`] defines, in table order.
pub const SAMPLE_SYMBOLS: [&str; 17] = [
    "title",
    "version",
    "enabled",
    "&doc",
    "threshold",
    "region",
    "matrix",
    "tags",
    "warehouse",
    "warehouse.name",
    "warehouse.label",
    "warehouse.nothing",
    "warehouse.limits",
    "warehouse.limits.low",
    "warehouse.limits.high",
    "warehouse.empty",
    "alias",
];

const SAMPLES: &[(&str, &str)] = &[
    ("inventory.json", SAMPLE_PROGRAM),
    ("compact.json", include_str!("../../samples/compact.json")),
    ("empty.json", include_str!("../../samples/empty.json")),
];

/// A sample program by file name.
pub fn sample(name: &str) -> Option<&'static str> {
    SAMPLES
        .iter()
        .find(|(file, _)| *file == name)
        .map(|(_, text)| *text)
}

pub fn sample_names() -> impl Iterator<Item = &'static str> {
    SAMPLES.iter().map(|(file, _)| *file)
}

/// A token carrying `Line` and `Indent`.
pub fn mk_token(name: &str, lexeme: &str, line: usize, indent: usize) -> Token {
    Token::new(name, lexeme)
        .with_attr(Attr::Line, line)
        .with_attr(Attr::Indent, indent)
}

/// Folded tokens from `(name, lexeme)` pairs, all on line 1.
pub fn mk_tokens(pairs: &[(&str, &str)]) -> Vec<Token> {
    pairs
        .iter()
        .map(|(name, lexeme)| mk_token(name, lexeme, 1, 0))
        .collect()
}

pub fn token_names(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.name.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_are_valid_programs() {
        for name in sample_names() {
            let text = sample(name).unwrap();
            assert!(crate::jproc::input::check(text).is_ok(), "{} is not valid", name);
        }
        assert!(sample("missing.json").is_none());
    }

    #[test]
    fn test_mk_token_attrs() {
        let token = mk_token("lbrace", "{", 3, 1);
        assert_eq!(token.line(), Some(3));
        assert_eq!(token.indent(), Some(1));
        assert_eq!(token_names(&mk_tokens(&[("colon", ":")])), vec!["colon"]);
    }
}
