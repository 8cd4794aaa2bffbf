//! Grammars
//!
//! A [`Grammar`] is the finalized, immutable result of [`RuleSeq::build_cfg`]: every rule is
//! defined, FIRST and FOLLOW sets are final, and the top rule is fixed. Grammars are shared
//! behind `Arc` and reused across compilations.

pub mod error;
pub mod first_sets;
pub mod follow_sets;
pub mod rule_seq;

pub use error::GrammarError;
pub use follow_sets::FollowAnalysis;
pub use rule_seq::RuleSeq;

use crate::jproc::rule::Rule;
use indexmap::IndexMap;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct Grammar {
    name: String,
    top: String,
    rules: IndexMap<String, Rule>,
    terminals: Vec<String>,
    nonterminals: Vec<String>,
}

impl Grammar {
    pub(crate) fn new(name: &str, top: &str, rules: IndexMap<String, Rule>) -> Self {
        let (terminals, nonterminals): (Vec<&Rule>, Vec<&Rule>) =
            rules.values().partition(|r| r.is_terminal());
        Grammar {
            name: name.to_string(),
            top: top.to_string(),
            terminals: terminals.iter().map(|r| r.name().to_string()).collect(),
            nonterminals: nonterminals.iter().map(|r| r.name().to_string()).collect(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn top_name(&self) -> &str {
        &self.top
    }

    /// The rule parsing starts from.
    pub fn top_rule(&self) -> Result<&Rule, GrammarError> {
        self.rule(&self.top)
    }

    pub fn rule(&self, name: &str) -> Result<&Rule, GrammarError> {
        self.rules.get(name).ok_or_else(|| GrammarError::MissingRule {
            name: name.to_string(),
            referenced_by: None,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn terminal_names(&self) -> &[String] {
        &self.terminals
    }

    pub fn nonterminal_names(&self) -> &[String] {
        &self.nonterminals
    }

    pub fn first_set(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.rules.get(name).map(Rule::first_set)
    }

    pub fn follow_set(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.rules.get(name).map(Rule::follow_set)
    }
}
