//! LL(1) recursive descent
//!
//! Every rule kind has its own parsing behavior:
//!
//! - terminal: the next token's name must equal the rule name
//! - concatenation: every term in order, the first failure propagates
//! - alternation: the single term whose FIRST set contains the lookahead; with no such
//!   term a lone nullable term matches empty
//! - option: the term, parsed into a scratch tree that is merged on success; on failure
//!   the option matches empty only if the lookahead may follow it
//! - repetition: option semantics in a loop until an iteration consumes nothing or the
//!   input runs out
//!
//! The lookahead at the end of input is [`END_OF_INPUT`].

use super::error::{ParseError, ParseErrorKind};
use crate::jproc::ebnf::{RuleBody, END_OF_INPUT, NULLABLE};
use crate::jproc::grammar::Grammar;
use crate::jproc::lexing::Token;
use crate::jproc::rule::Rule;
use crate::jproc::tree::ParseTree;

/// Outcome of a successful parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed<'t> {
    pub consumed: usize,
    pub remaining: &'t [Token],
}

impl Rule {
    /// Parses a prefix of `tokens` with this rule, adding nodes under the tree's active
    /// node.
    pub fn parse<'t>(
        &self,
        tokens: &'t [Token],
        grammar: &Grammar,
        tree: &mut ParseTree,
    ) -> Result<Parsed<'t>, ParseError> {
        let parser = Parser { grammar, tokens };
        let consumed = parser.parse_rule(self, 0, tree)?;
        Ok(Parsed {
            consumed,
            remaining: &tokens[consumed..],
        })
    }
}

struct Parser<'g, 't> {
    grammar: &'g Grammar,
    tokens: &'t [Token],
}

impl<'g, 't> Parser<'g, 't> {
    fn parse_rule(
        &self,
        rule: &Rule,
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        log::trace!("{} at token {} ({})", rule.name(), pos, self.lookahead(pos));
        match rule.body() {
            RuleBody::Terminal(_) | RuleBody::AttrTerminal => self.parse_terminal(rule, pos, tree),
            body => {
                tree.enter(rule.name(), rule.kind());
                let end = match body {
                    RuleBody::Alternation(terms) => self.parse_alternation(rule, terms, pos, tree),
                    RuleBody::Option(term) => self.parse_option(rule, term, pos, tree),
                    RuleBody::Repetition(term) => self.parse_repetition(rule, term, pos, tree),
                    _ => self.parse_sequence(rule.terms(), pos, tree),
                }?;
                tree.close();
                Ok(end)
            }
        }
    }

    fn parse_terminal(
        &self,
        rule: &Rule,
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        if rule.name() == NULLABLE {
            return Ok(pos);
        }
        match self.tokens.get(pos) {
            Some(token) if token.name == rule.name() => {
                tree.leaf(token.clone(), rule.kind());
                Ok(pos + 1)
            }
            Some(token) => Err(ParseError::new(
                rule.name(),
                ParseErrorKind::TerminalMismatch {
                    expected: rule.name().to_string(),
                    actual: token.name.clone(),
                },
                pos,
            )),
            None => Err(ParseError::new(
                rule.name(),
                ParseErrorKind::ExhaustedInput {
                    expected: vec![rule.name().to_string()],
                },
                pos,
            )),
        }
    }

    fn parse_sequence(
        &self,
        terms: &[String],
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        let mut pos = pos;
        for term in terms {
            let term = self.resolve(term, pos)?;
            pos = self.parse_rule(term, pos, tree)?;
        }
        Ok(pos)
    }

    fn parse_alternation(
        &self,
        rule: &Rule,
        terms: &[String],
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        let lookahead = self.lookahead(pos);
        let candidates = terms
            .iter()
            .map(|t| self.resolve(t, pos))
            .collect::<Result<Vec<_>, _>>()?;
        let matching: Vec<&Rule> = candidates
            .iter()
            .copied()
            .filter(|c| c.first_set().contains(lookahead))
            .collect();

        match matching.as_slice() {
            [only] => self.parse_rule(only, pos, tree),
            [] => {
                let nullable: Vec<&Rule> =
                    candidates.into_iter().filter(|c| c.is_nullable()).collect();
                if let [only] = nullable.as_slice() {
                    return self.parse_rule(only, pos, tree);
                }
                let expected = expected_of(rule);
                let kind = match self.tokens.get(pos) {
                    Some(token) => ParseErrorKind::UnmatchedFirstSet {
                        expected,
                        actual: token.name.clone(),
                    },
                    None => ParseErrorKind::ExhaustedInput { expected },
                };
                Err(ParseError::new(rule.name(), kind, pos))
            }
            several => Err(ParseError::new(
                rule.name(),
                ParseErrorKind::FirstSetsNotDisjoint {
                    candidates: several.iter().map(|c| c.name().to_string()).collect(),
                    actual: lookahead.to_string(),
                },
                pos,
            )),
        }
    }

    fn parse_option(
        &self,
        rule: &Rule,
        term: &str,
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        let term = self.resolve(term, pos)?;
        let mut scratch = ParseTree::new();
        match self.parse_rule(term, pos, &mut scratch) {
            Ok(end) => {
                tree.merge(scratch);
                Ok(end)
            }
            Err(_) if rule.follow_set().contains(self.lookahead(pos)) => Ok(pos),
            Err(err) => Err(err),
        }
    }

    fn parse_repetition(
        &self,
        rule: &Rule,
        term: &str,
        pos: usize,
        tree: &mut ParseTree,
    ) -> Result<usize, ParseError> {
        let term = self.resolve(term, pos)?;
        let mut pos = pos;
        while pos < self.tokens.len() {
            let mut scratch = ParseTree::new();
            match self.parse_rule(term, pos, &mut scratch) {
                Ok(end) if end == pos => break,
                Ok(end) => {
                    tree.merge(scratch);
                    pos = end;
                }
                Err(_) if rule.follow_set().contains(self.lookahead(pos)) => break,
                Err(err) => return Err(err),
            }
        }
        Ok(pos)
    }

    fn lookahead(&self, pos: usize) -> &'t str {
        self.tokens.get(pos).map_or(END_OF_INPUT, |t| t.name.as_str())
    }

    fn resolve(&self, name: &str, pos: usize) -> Result<&'g Rule, ParseError> {
        self.grammar.get(name).ok_or_else(|| {
            ParseError::new(
                name,
                ParseErrorKind::UnknownRule {
                    name: name.to_string(),
                },
                pos,
            )
        })
    }
}

fn expected_of(rule: &Rule) -> Vec<String> {
    rule.first_set()
        .iter()
        .filter(|t| t.as_str() != NULLABLE)
        .cloned()
        .collect()
}
