//! Incremental grammar builder
//!
//! A [`RuleSeq`] collects rules in declaration order. Rules may reference names that are
//! defined later; such rules stay *partial* until every name they reach is defined. Once
//! the sequence is complete, [`RuleSeq::build_cfg`] finalizes FIRST and FOLLOW sets and
//! returns an immutable [`Grammar`].
//!
//! ```text
//! let mut seq = RuleSeq::new();
//! seq.make_concatenation_rule("pair", &["key", "colon", "value"])?;   // partial
//! seq.make_terminal_rule("key", "[a-z]+")?;
//! seq.make_terminal_rule("colon", ":")?;
//! seq.make_terminal_rule("value", "[0-9]+")?;                          // pair resolves
//! let grammar = seq.build_cfg("pairs", Some("pair"))?;
//! ```

use super::first_sets::first_set_of;
use super::follow_sets::compute_follow_sets;
use super::{Grammar, GrammarError};
use crate::jproc::attributes::Attr;
use crate::jproc::ebnf::{Matcher, RuleBody, NULLABLE};
use crate::jproc::rule::Rule;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct RuleSeq {
    rules: IndexMap<String, Rule>,
}

impl RuleSeq {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
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

    pub fn make_terminal_rule(&mut self, name: &str, pattern: &str) -> Result<&Rule, GrammarError> {
        let rule = Rule::new_terminal(name, pattern)?;
        self.insert(rule)
    }

    pub fn make_attr_terminal_rule(
        &mut self,
        name: &str,
        synthesized: &[Attr],
    ) -> Result<&Rule, GrammarError> {
        self.insert(Rule::new_attr_terminal(name, synthesized))
    }

    pub fn make_concatenation_rule(
        &mut self,
        name: &str,
        refs: &[&str],
    ) -> Result<&Rule, GrammarError> {
        self.insert(Rule::new_nonterminal(name, RuleBody::Concatenation(owned(refs))))
    }

    pub fn make_alternation_rule(
        &mut self,
        name: &str,
        refs: &[&str],
    ) -> Result<&Rule, GrammarError> {
        self.insert(Rule::new_nonterminal(name, RuleBody::Alternation(owned(refs))))
    }

    pub fn make_repetition_rule(&mut self, name: &str, term: &str) -> Result<&Rule, GrammarError> {
        self.insert(Rule::new_nonterminal(name, RuleBody::Repetition(term.to_string())))
    }

    pub fn make_option_rule(&mut self, name: &str, term: &str) -> Result<&Rule, GrammarError> {
        self.insert(Rule::new_nonterminal(name, RuleBody::Option(term.to_string())))
    }

    /// Defines a concatenation whose nodes carry the given attributes.
    pub fn make_attr_production_rule(
        &mut self,
        name: &str,
        refs: &[&str],
        synthesized: &[Attr],
        inherited: &[Attr],
    ) -> Result<&Rule, GrammarError> {
        let rule = Rule::new_nonterminal(name, RuleBody::AttrProduction(owned(refs)))
            .with_attrs(synthesized, inherited);
        self.insert(rule)
    }

    /// Replaces an existing rule with its terminal form.
    ///
    /// # Errors
    ///
    /// `MissingRule` for an unknown name, `CannotMakeTerminal` when the rule is still
    /// partial.
    pub fn make_terminal(&mut self, name: &str) -> Result<&Rule, GrammarError> {
        let rule = self.rules.get(name).ok_or_else(|| GrammarError::MissingRule {
            name: name.to_string(),
            referenced_by: None,
        })?;
        let terminal = rule.to_terminal()?;
        self.rules.insert(name.to_string(), terminal);
        // FIRST sets of everything that reached the old rule are stale now
        for rule in self.rules.values_mut() {
            rule.forget_first_set();
        }
        self.refresh();
        self.get_defined(name)
    }

    /// Copies a rule of a finalized grammar into this sequence as a terminal.
    pub fn import_terminal(
        &mut self,
        grammar: &Grammar,
        name: &str,
    ) -> Result<&Rule, GrammarError> {
        let terminal = grammar.rule(name)?.to_terminal()?;
        self.insert(terminal)
    }

    /// Returns FIRST(name), computing it if the rule is partial or not yet analysed.
    pub fn get_first_set(&mut self, name: &str) -> Result<BTreeSet<String>, GrammarError> {
        first_set_of(&mut self.rules, name, &mut HashSet::new())
    }

    /// Finalizes the sequence into an immutable grammar.
    ///
    /// Injects the [`NULLABLE`] terminal, rejects undefined references, finalizes FIRST
    /// sets and computes FOLLOW sets. The top rule defaults to the last rule defined.
    pub fn build_cfg(mut self, name: &str, top: Option<&str>) -> Result<Grammar, GrammarError> {
        let top = match top {
            Some(top) => top.to_string(),
            None => self
                .rules
                .keys()
                .rev()
                .find(|n| n.as_str() != NULLABLE)
                .cloned()
                .ok_or_else(|| GrammarError::UnknownTopRule {
                    name: String::new(),
                })?,
        };
        if !self.rules.contains_key(NULLABLE) {
            self.insert(Rule::new_terminal(NULLABLE, "")?)?;
        }
        if !self.rules.contains_key(&top) {
            return Err(GrammarError::UnknownTopRule { name: top });
        }

        for rule in self.rules.values() {
            if let Some(missing) = rule.terms().iter().find(|t| !self.rules.contains_key(*t)) {
                return Err(GrammarError::MissingRule {
                    name: missing.clone(),
                    referenced_by: Some(rule.name().to_string()),
                });
            }
        }

        let names: Vec<String> = self.rules.keys().cloned().collect();
        for rule_name in &names {
            self.get_first_set(rule_name)?;
        }

        let analysis = compute_follow_sets(&self.rules, &top);
        for (rule_name, follow) in analysis.sets {
            if let Some(rule) = self.rules.get_mut(&rule_name) {
                rule.set_follow_set(follow);
            }
        }

        log::debug!(
            "built grammar '{}': {} rules, top '{}'",
            name,
            self.rules.len(),
            top
        );
        Ok(Grammar::new(name, &top, self.rules))
    }

    fn insert(&mut self, rule: Rule) -> Result<&Rule, GrammarError> {
        if self.rules.contains_key(rule.name()) {
            return Err(GrammarError::DuplicateRule {
                name: rule.name().to_string(),
            });
        }
        let name = rule.name().to_string();
        self.rules.insert(name.clone(), rule);
        self.refresh();
        self.get_defined(&name)
    }

    fn get_defined(&self, name: &str) -> Result<&Rule, GrammarError> {
        self.rules.get(name).ok_or_else(|| GrammarError::MissingRule {
            name: name.to_string(),
            referenced_by: None,
        })
    }

    /// Recomputes partial flags and matchers after the rule set changed.
    ///
    /// A nonterminal is partial when it can reach an undefined name. Reachability is
    /// propagated backwards from the rules that reference an undefined name directly.
    fn refresh(&mut self) {
        let mut referrers: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut worklist: Vec<&str> = Vec::new();
        for rule in self.rules.values() {
            for term in rule.terms() {
                referrers.entry(term.as_str()).or_default().push(rule.name());
                if !self.rules.contains_key(term) {
                    worklist.push(rule.name());
                }
            }
        }

        let mut partial: HashSet<String> = HashSet::new();
        while let Some(name) = worklist.pop() {
            if partial.insert(name.to_string()) {
                if let Some(up) = referrers.get(name) {
                    worklist.extend(up.iter().copied());
                }
            }
        }

        let mut resolved = Vec::new();
        for rule in self.rules.values_mut() {
            let now_partial = partial.contains(rule.name());
            if rule.is_partial() != now_partial {
                rule.set_partial(now_partial);
                if !now_partial {
                    resolved.push(rule.name().to_string());
                }
            }
        }

        let mut matchers: HashMap<String, Option<Matcher>> = HashMap::new();
        for name in resolved {
            let matcher = compose_matcher(&self.rules, &name, &mut HashSet::new(), &mut matchers);
            if let Some(rule) = self.rules.get_mut(&name) {
                rule.set_matcher(matcher);
            }
        }
    }
}

/// Builds a nonterminal's matcher from its terms' matchers.
///
/// Recursive rules have no regular language and get no matcher; neither does any rule
/// with a term that lacks one.
fn compose_matcher(
    rules: &IndexMap<String, Rule>,
    name: &str,
    visiting: &mut HashSet<String>,
    memo: &mut HashMap<String, Option<Matcher>>,
) -> Option<Matcher> {
    if let Some(known) = memo.get(name) {
        return known.clone();
    }
    let rule = rules.get(name)?;
    if let RuleBody::Terminal(matcher) = rule.body() {
        return Some(matcher.clone());
    }
    if rule.is_terminal() || rule.is_partial() || !visiting.insert(name.to_string()) {
        return None;
    }

    let mut parts = Vec::new();
    for term in rule.terms() {
        match compose_matcher(rules, term, visiting, memo) {
            Some(m) => parts.push(m),
            None => {
                visiting.remove(name);
                memo.insert(name.to_string(), None);
                return None;
            }
        }
    }
    visiting.remove(name);

    let refs: Vec<&Matcher> = parts.iter().collect();
    let composed = match rule.body() {
        RuleBody::Concatenation(_) | RuleBody::AttrProduction(_) => Matcher::concatenation(&refs),
        RuleBody::Alternation(_) => Matcher::alternation(&refs),
        RuleBody::Repetition(_) => Matcher::repetition(refs[0]),
        RuleBody::Option(_) => Matcher::option(refs[0]),
        RuleBody::Terminal(_) | RuleBody::AttrTerminal => return None,
    };
    let matcher = composed.ok();
    memo.insert(name.to_string(), matcher.clone());
    matcher
}

fn owned(refs: &[&str]) -> Vec<String> {
    refs.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::ebnf::{RuleKind, END_OF_INPUT};

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_forward_reference_is_partial_until_defined() {
        let mut seq = RuleSeq::new();
        assert!(seq.make_concatenation_rule("pair", &["key", "value"]).unwrap().is_partial());
        seq.make_terminal_rule("key", "[a-z]+").unwrap();
        assert!(seq.get("pair").unwrap().is_partial());

        seq.make_terminal_rule("value", "[0-9]+").unwrap();
        let pair = seq.get("pair").unwrap();
        assert!(!pair.is_partial());
        assert!(pair.matches("ab12"));
    }

    #[test]
    fn test_recursive_rules_resolve_without_matcher() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("open", r"\(").unwrap();
        seq.make_terminal_rule("close", r"\)").unwrap();
        seq.make_option_rule("inner", "group").unwrap();
        seq.make_concatenation_rule("group", &["open", "inner", "close"]).unwrap();

        let group = seq.get("group").unwrap();
        assert!(!group.is_partial());
        assert!(group.matcher().is_none());
    }

    #[test]
    fn test_make_terminal_of_partial_rule_fails() {
        let mut seq = RuleSeq::new();
        seq.make_alternation_rule("literal", &["number", "word"]).unwrap();
        assert_eq!(
            seq.make_terminal("literal").unwrap_err(),
            GrammarError::CannotMakeTerminal {
                name: "literal".to_string()
            }
        );
        assert!(matches!(
            seq.make_terminal("nothing"),
            Err(GrammarError::MissingRule { .. })
        ));
    }

    #[test]
    fn test_make_terminal_uses_composed_matcher() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("digit", "[0-9]").unwrap();
        seq.make_repetition_rule("digits", "digit").unwrap();
        let digits = seq.make_terminal("digits").unwrap();

        assert_eq!(digits.kind(), RuleKind::Terminal);
        assert_eq!(digits.first_set(), &set(&["digits"]));
        assert!(digits.matches("123"));
    }

    #[test]
    fn test_duplicate_rule_is_rejected() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("a", "a").unwrap();
        assert_eq!(
            seq.make_terminal_rule("a", "b").unwrap_err(),
            GrammarError::DuplicateRule {
                name: "a".to_string()
            }
        );
    }

    #[test]
    fn test_first_set_of_partial_rule_is_provisional() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("a", "a").unwrap();
        seq.make_alternation_rule("either", &["a", "b"]).unwrap();
        assert_eq!(seq.get_first_set("either").unwrap(), set(&["a"]));

        seq.make_terminal_rule("b", "b").unwrap();
        assert_eq!(seq.get_first_set("either").unwrap(), set(&["a", "b"]));
    }

    #[test]
    fn test_build_cfg_rejects_missing_reference() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("a", "a").unwrap();
        seq.make_concatenation_rule("top", &["a", "ghost"]).unwrap();
        assert_eq!(
            seq.build_cfg("broken", None).unwrap_err(),
            GrammarError::MissingRule {
                name: "ghost".to_string(),
                referenced_by: Some("top".to_string())
            }
        );
    }

    #[test]
    fn test_build_cfg_defaults_top_to_last_rule() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("a", "a").unwrap();
        seq.make_terminal_rule("b", "b").unwrap();
        seq.make_option_rule("maybe_b", "b").unwrap();
        seq.make_concatenation_rule("top", &["a", "maybe_b"]).unwrap();
        let grammar = seq.build_cfg("tiny", None).unwrap();

        assert_eq!(grammar.top_name(), "top");
        assert_eq!(grammar.follow_set("top"), Some(&set(&[END_OF_INPUT])));
        assert_eq!(grammar.follow_set("maybe_b"), Some(&set(&[END_OF_INPUT])));
        assert_eq!(grammar.follow_set("a"), Some(&set(&["b", END_OF_INPUT])));
        assert!(grammar.contains(NULLABLE));
    }

    #[test]
    fn test_unknown_top_rule() {
        let mut seq = RuleSeq::new();
        seq.make_terminal_rule("a", "a").unwrap();
        assert!(matches!(
            seq.build_cfg("g", Some("nope")),
            Err(GrammarError::UnknownTopRule { .. })
        ));
    }
}
