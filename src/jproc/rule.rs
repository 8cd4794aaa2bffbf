//! Grammar rules
//!
//! A [`Rule`] couples a name with an EBNF body and the analysis results the parser needs:
//! FIRST and FOLLOW sets, a matcher when one can be composed, and the attributes the rule's
//! nodes carry. Rules are created through [`RuleSeq`](crate::jproc::grammar::RuleSeq), which
//! owns the bookkeeping for forward references; parsing lives in
//! [`parsing::parser`](crate::jproc::parsing::parser).

use crate::jproc::attributes::Attr;
use crate::jproc::ebnf::{Matcher, RuleBody, RuleKind, NULLABLE};
use crate::jproc::grammar::GrammarError;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    name: String,
    body: RuleBody,
    matcher: Option<Matcher>,
    first_set: BTreeSet<String>,
    follow_set: BTreeSet<String>,
    first_known: bool,
    partial: bool,
    synthesized_attrs: Vec<Attr>,
    inherited_attrs: Vec<Attr>,
}

impl Rule {
    /// Creates a terminal from a regular expression.
    ///
    /// A terminal's FIRST set is exactly its own name.
    pub fn new_terminal(name: &str, pattern: &str) -> Result<Self, GrammarError> {
        let matcher = Matcher::new(pattern).map_err(|e| GrammarError::InvalidPattern {
            name: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::terminal_with(name, RuleBody::Terminal(matcher.clone()), Some(matcher)))
    }

    /// Creates an attribute terminal: a token produced by folding, matched by name.
    pub fn new_attr_terminal(name: &str, synthesized: &[Attr]) -> Self {
        let mut rule = Self::terminal_with(name, RuleBody::AttrTerminal, None);
        rule.synthesized_attrs = synthesized.to_vec();
        rule
    }

    fn terminal_with(name: &str, body: RuleBody, matcher: Option<Matcher>) -> Self {
        Rule {
            name: name.to_string(),
            body,
            matcher,
            first_set: BTreeSet::from([name.to_string()]),
            follow_set: BTreeSet::new(),
            first_known: true,
            partial: false,
            synthesized_attrs: Vec::new(),
            inherited_attrs: Vec::new(),
        }
    }

    /// Creates a nonterminal. It starts partial; the owning sequence resolves it once every
    /// referenced name is defined.
    pub(crate) fn new_nonterminal(name: &str, body: RuleBody) -> Self {
        Rule {
            name: name.to_string(),
            body,
            matcher: None,
            first_set: BTreeSet::new(),
            follow_set: BTreeSet::new(),
            first_known: false,
            partial: true,
            synthesized_attrs: Vec::new(),
            inherited_attrs: Vec::new(),
        }
    }

    pub(crate) fn with_attrs(mut self, synthesized: &[Attr], inherited: &[Attr]) -> Self {
        self.synthesized_attrs = synthesized.to_vec();
        self.inherited_attrs = inherited.to_vec();
        self
    }

    /// Returns a terminal copy of this rule.
    ///
    /// Rules with a matcher become regex terminals; fully defined rules without one
    /// (recursive productions) become attribute terminals. Partial rules have no defined
    /// language yet and cannot be converted.
    pub(crate) fn to_terminal(&self) -> Result<Rule, GrammarError> {
        if self.partial {
            return Err(GrammarError::CannotMakeTerminal {
                name: self.name.clone(),
            });
        }
        let mut rule = match &self.matcher {
            Some(matcher) => Self::terminal_with(
                &self.name,
                RuleBody::Terminal(matcher.clone()),
                Some(matcher.clone()),
            ),
            None => Self::terminal_with(&self.name, RuleBody::AttrTerminal, None),
        };
        rule.synthesized_attrs = self.synthesized_attrs.clone();
        Ok(rule)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> RuleKind {
        self.body.kind()
    }

    pub fn body(&self) -> &RuleBody {
        &self.body
    }

    pub fn terms(&self) -> &[String] {
        self.body.terms()
    }

    pub fn matcher(&self) -> Option<&Matcher> {
        self.matcher.as_ref()
    }

    /// Tests a whole string against the rule's matcher. Rules without one never match.
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.as_ref().is_some_and(|m| m.is_match(text))
    }

    pub fn first_set(&self) -> &BTreeSet<String> {
        &self.first_set
    }

    pub fn follow_set(&self) -> &BTreeSet<String> {
        &self.follow_set
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }

    pub fn is_nullable(&self) -> bool {
        self.first_set.contains(NULLABLE)
    }

    pub fn synthesized_attrs(&self) -> &[Attr] {
        &self.synthesized_attrs
    }

    pub fn inherited_attrs(&self) -> &[Attr] {
        &self.inherited_attrs
    }

    pub(crate) fn first_known(&self) -> bool {
        self.first_known && !self.partial
    }

    pub(crate) fn set_first_set(&mut self, first: BTreeSet<String>) {
        self.first_set = first;
        self.first_known = true;
    }

    /// Drops a cached nonterminal FIRST set so it is recomputed on next request.
    pub(crate) fn forget_first_set(&mut self) {
        if !self.is_terminal() {
            self.first_known = false;
        }
    }

    pub(crate) fn set_follow_set(&mut self, follow: BTreeSet<String>) {
        self.follow_set = follow;
    }

    pub(crate) fn set_partial(&mut self, partial: bool) {
        if partial {
            self.first_known = false;
            self.first_set.clear();
            self.matcher = None;
        }
        self.partial = partial;
    }

    pub(crate) fn set_matcher(&mut self, matcher: Option<Matcher>) {
        self.matcher = matcher;
    }
}
