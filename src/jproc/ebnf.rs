//! EBNF rule model
//!
//! A rule body is one of the classic EBNF production shapes plus two attribute-grammar
//! variants:
//!
//! ```text
//! terminal        name = /regex/
//! concatenation   name = a b c
//! alternation     name = a | b | c
//! repetition      name = { a }
//! option          name = [ a ]
//! attr terminal   a terminal produced by folding, matched by name only
//! attr production a concatenation whose node carries declared attributes
//! ```
//!
//! Terms are referenced by name and resolved against the owning grammar, so rule bodies
//! never own other rules.

use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Sentinel terminal that matches the empty string. Appears in FIRST sets of nullable rules.
pub const NULLABLE: &str = "<nullable>";

/// Sentinel placed in the FOLLOW set of the top rule.
pub const END_OF_INPUT: &str = "<end-of-input>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Terminal,
    Concatenation,
    Alternation,
    Repetition,
    Option,
    AttrTerminal,
    AttrProduction,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Terminal => "terminal",
            RuleKind::Concatenation => "concatenation",
            RuleKind::Alternation => "alternation",
            RuleKind::Repetition => "repetition",
            RuleKind::Option => "option",
            RuleKind::AttrTerminal => "attr_terminal",
            RuleKind::AttrProduction => "attr_production",
        }
    }

    /// Terminals and attribute terminals become leaves in a parse tree.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RuleKind::Terminal | RuleKind::AttrTerminal)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled regular expression attached to a rule.
///
/// Two regexes are kept: one anchored at the start of the input (used by the scanner to
/// measure the longest prefix match) and one anchored at both ends (used to test whole
/// lexemes).
#[derive(Debug, Clone)]
pub struct Matcher {
    pattern: String,
    prefix: Regex,
    whole: Regex,
}

impl Matcher {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher {
            pattern: pattern.to_string(),
            prefix: Regex::new(&format!(r"\A(?:{})", pattern))?,
            whole: Regex::new(&format!(r"\A(?:{})\z", pattern))?,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Length in bytes of the match at the start of `input`, if any.
    pub fn prefix_len(&self, input: &str) -> Option<usize> {
        self.prefix.find(input).map(|m| m.end())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.whole.is_match(text)
    }

    pub fn concatenation(parts: &[&Matcher]) -> Result<Self, regex::Error> {
        let pattern: String = parts
            .iter()
            .map(|m| format!("(?:{})", m.pattern))
            .collect();
        Matcher::new(&pattern)
    }

    pub fn alternation(parts: &[&Matcher]) -> Result<Self, regex::Error> {
        let pattern = parts
            .iter()
            .map(|m| format!("(?:{})", m.pattern))
            .collect::<Vec<_>>()
            .join("|");
        Matcher::new(&format!("(?:{})", pattern))
    }

    pub fn repetition(term: &Matcher) -> Result<Self, regex::Error> {
        Matcher::new(&format!("(?:{})*", term.pattern))
    }

    pub fn option(term: &Matcher) -> Result<Self, regex::Error> {
        Matcher::new(&format!("(?:{})?", term.pattern))
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// The right-hand side of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleBody {
    Terminal(Matcher),
    Concatenation(Vec<String>),
    Alternation(Vec<String>),
    Repetition(String),
    Option(String),
    AttrTerminal,
    AttrProduction(Vec<String>),
}

impl RuleBody {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleBody::Terminal(_) => RuleKind::Terminal,
            RuleBody::Concatenation(_) => RuleKind::Concatenation,
            RuleBody::Alternation(_) => RuleKind::Alternation,
            RuleBody::Repetition(_) => RuleKind::Repetition,
            RuleBody::Option(_) => RuleKind::Option,
            RuleBody::AttrTerminal => RuleKind::AttrTerminal,
            RuleBody::AttrProduction(_) => RuleKind::AttrProduction,
        }
    }

    /// Names referenced by this body, in order. Empty for terminals.
    pub fn terms(&self) -> &[String] {
        match self {
            RuleBody::Terminal(_) | RuleBody::AttrTerminal => &[],
            RuleBody::Concatenation(terms)
            | RuleBody::Alternation(terms)
            | RuleBody::AttrProduction(terms) => terms,
            RuleBody::Repetition(term) | RuleBody::Option(term) => std::slice::from_ref(term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_len_is_anchored() {
        let m = Matcher::new("[0-9]+").unwrap();
        assert_eq!(m.prefix_len("123abc"), Some(3));
        assert_eq!(m.prefix_len("abc123"), None);
    }

    #[test]
    fn test_whole_match_requires_full_text() {
        let m = Matcher::new("ab|abc").unwrap();
        assert!(m.is_match("abc"));
        assert!(!m.is_match("abcd"));
    }

    #[test]
    fn test_composite_matchers() {
        let a = Matcher::new("a").unwrap();
        let b = Matcher::new("b|c").unwrap();

        let concat = Matcher::concatenation(&[&a, &b]).unwrap();
        assert!(concat.is_match("ac"));
        assert!(!concat.is_match("a"));

        let alt = Matcher::alternation(&[&a, &b]).unwrap();
        assert!(alt.is_match("c"));
        assert!(!alt.is_match("ab"));

        let rep = Matcher::repetition(&a).unwrap();
        assert!(rep.is_match(""));
        assert!(rep.is_match("aaa"));

        let opt = Matcher::option(&b).unwrap();
        assert!(opt.is_match(""));
        assert!(!opt.is_match("bb"));
    }

    #[test]
    fn test_terms_of_each_body() {
        let rep = RuleBody::Repetition("item".to_string());
        assert_eq!(rep.terms(), &["item".to_string()]);
        assert!(RuleBody::AttrTerminal.terms().is_empty());
        assert_eq!(rep.kind(), RuleKind::Repetition);
        assert!(RuleKind::AttrTerminal.is_terminal());
    }
}
