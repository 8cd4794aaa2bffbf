//! Token folding
//!
//! Folding reduces a scanned token stream to the tokens the parse grammar consumes by
//! repeatedly merging adjacent tokens according to grammar rules:
//!
//! - *Alternation fold*: a maximal run of tokens whose names are terms of the alternation
//!   (or already carry its name) becomes one token named after the rule. A run that is a
//!   single token already carrying the rule's name is left as is, so the fold is
//!   idempotent.
//! - *Concatenation fold*: scanning left to right, every contiguous window whose names equal
//!   the rule's terms is replaced by one token.
//!
//! A [`FoldPlan`] lists folds in order and repeats the whole list until a round changes
//! nothing. How combined tokens get their attributes is up to a [`TokenCombiner`].

use super::token::Token;
use crate::jproc::ebnf::RuleKind;
use crate::jproc::grammar::{Grammar, GrammarError};
use crate::jproc::rule::Rule;
use std::collections::VecDeque;

/// Builds the token that replaces a folded run.
pub trait TokenCombiner {
    fn combine(&self, name: &str, parts: Vec<Token>) -> Token;
}

/// Concatenates lexemes and keeps the first part's attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatLexemes;

impl TokenCombiner for ConcatLexemes {
    fn combine(&self, name: &str, parts: Vec<Token>) -> Token {
        let attrs = parts.first().map(|t| t.attrs.clone()).unwrap_or_default();
        let lexeme: String = parts.iter().map(|t| t.lexeme.as_str()).collect();
        Token {
            name: name.to_string(),
            lexeme,
            attrs,
        }
    }
}

/// A pass over a token stream.
pub trait TokenMapper {
    /// Human readable name, used in logs
    fn name(&self) -> &str;

    /// Transforms the stream and reports how many folds were made.
    fn map(&self, tokens: Vec<Token>, combiner: &dyn TokenCombiner) -> (Vec<Token>, usize);
}

/// Folds runs of an alternation's terms.
#[derive(Debug, Clone)]
pub struct AlternationFold<'g> {
    rule: &'g Rule,
}

impl<'g> AlternationFold<'g> {
    pub fn new(rule: &'g Rule) -> Result<Self, GrammarError> {
        expect_kind(rule, RuleKind::Alternation)?;
        Ok(AlternationFold { rule })
    }
}

impl TokenMapper for AlternationFold<'_> {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn map(&self, tokens: Vec<Token>, combiner: &dyn TokenCombiner) -> (Vec<Token>, usize) {
        let name = self.rule.name();
        let terms = self.rule.terms();
        let belongs = |t: &Token| t.name == name || terms.iter().any(|term| *term == t.name);

        let mut out = Vec::with_capacity(tokens.len());
        let mut run: Vec<Token> = Vec::new();
        let mut folds = 0;
        for token in tokens {
            if belongs(&token) {
                run.push(token);
                continue;
            }
            folds += flush_run(name, &mut run, &mut out, combiner);
            out.push(token);
        }
        folds += flush_run(name, &mut run, &mut out, combiner);
        (out, folds)
    }
}

fn flush_run(
    name: &str,
    run: &mut Vec<Token>,
    out: &mut Vec<Token>,
    combiner: &dyn TokenCombiner,
) -> usize {
    match run.len() {
        0 => 0,
        1 if run[0].name == name => {
            out.append(run);
            0
        }
        _ => {
            out.push(combiner.combine(name, std::mem::take(run)));
            1
        }
    }
}

/// Folds windows matching a concatenation's terms.
#[derive(Debug, Clone)]
pub struct ConcatenationFold<'g> {
    rule: &'g Rule,
}

impl<'g> ConcatenationFold<'g> {
    pub fn new(rule: &'g Rule) -> Result<Self, GrammarError> {
        expect_kind(rule, RuleKind::Concatenation)?;
        Ok(ConcatenationFold { rule })
    }
}

impl TokenMapper for ConcatenationFold<'_> {
    fn name(&self) -> &str {
        self.rule.name()
    }

    fn map(&self, tokens: Vec<Token>, combiner: &dyn TokenCombiner) -> (Vec<Token>, usize) {
        let terms = self.rule.terms();
        if terms.is_empty() || terms == [self.rule.name()] {
            return (tokens, 0);
        }

        let mut out = Vec::with_capacity(tokens.len());
        let mut pending: VecDeque<Token> = tokens.into();
        let mut folds = 0;
        while !pending.is_empty() {
            let window_matches = pending.len() >= terms.len()
                && pending
                    .iter()
                    .zip(terms)
                    .all(|(token, term)| token.name == *term);
            if window_matches {
                let parts: Vec<Token> = pending.drain(..terms.len()).collect();
                out.push(combiner.combine(self.rule.name(), parts));
                folds += 1;
            } else if let Some(token) = pending.pop_front() {
                out.push(token);
            }
        }
        (out, folds)
    }
}

fn expect_kind(rule: &Rule, expected: RuleKind) -> Result<(), GrammarError> {
    if rule.kind() == expected {
        Ok(())
    } else {
        Err(GrammarError::UnexpectedRuleKind {
            name: rule.name().to_string(),
            expected,
            found: rule.kind(),
        })
    }
}

/// One step of a fold plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldStep {
    Alternation(String),
    Concatenation(String),
}

/// An ordered list of folds, repeated until the stream is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoldPlan {
    steps: Vec<FoldStep>,
}

impl FoldPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alternation(mut self, rule: &str) -> Self {
        self.steps.push(FoldStep::Alternation(rule.to_string()));
        self
    }

    pub fn concatenation(mut self, rule: &str) -> Self {
        self.steps.push(FoldStep::Concatenation(rule.to_string()));
        self
    }

    pub fn steps(&self) -> &[FoldStep] {
        &self.steps
    }

    /// Resolves every step against `grammar`, checking rule existence and shape.
    pub fn mappers<'g>(
        &self,
        grammar: &'g Grammar,
    ) -> Result<Vec<Box<dyn TokenMapper + 'g>>, GrammarError> {
        self.steps
            .iter()
            .map(|step| -> Result<Box<dyn TokenMapper + 'g>, GrammarError> {
                match step {
                    FoldStep::Alternation(name) => {
                        Ok(Box::new(AlternationFold::new(grammar.rule(name)?)?))
                    }
                    FoldStep::Concatenation(name) => {
                        Ok(Box::new(ConcatenationFold::new(grammar.rule(name)?)?))
                    }
                }
            })
            .collect()
    }

    /// Runs the plan until a whole round makes no fold.
    pub fn run(
        &self,
        grammar: &Grammar,
        mut tokens: Vec<Token>,
        combiner: &dyn TokenCombiner,
    ) -> Result<Vec<Token>, GrammarError> {
        let mappers = self.mappers(grammar)?;
        let mut round = 0;
        loop {
            round += 1;
            let mut folds = 0;
            for mapper in &mappers {
                let (next, made) = mapper.map(tokens, combiner);
                if made > 0 {
                    log::trace!("round {}: {} folds into {}", round, made, mapper.name());
                }
                tokens = next;
                folds += made;
            }
            if folds == 0 {
                return Ok(tokens);
            }
        }
    }
}

/// Folds one alternation rule over a stream.
pub fn fold_alternation(
    tokens: Vec<Token>,
    rule: &Rule,
    combiner: &dyn TokenCombiner,
) -> Result<Vec<Token>, GrammarError> {
    Ok(AlternationFold::new(rule)?.map(tokens, combiner).0)
}

/// Folds one concatenation rule over a stream.
pub fn fold_concatenation(
    tokens: Vec<Token>,
    rule: &Rule,
    combiner: &dyn TokenCombiner,
) -> Result<Vec<Token>, GrammarError> {
    Ok(ConcatenationFold::new(rule)?.map(tokens, combiner).0)
}
