//! FIRST set computation
//!
//! FIRST(rule) is the set of terminal names that can start a token sequence derived from
//! the rule, plus [`NULLABLE`] when the rule can derive nothing at all:
//!
//! - terminal: `{name}`
//! - concatenation: FIRST of the leading nullable run (minus the marker) plus FIRST of the
//!   first non-nullable term; `NULLABLE` only when every term is nullable
//! - alternation: union of the terms
//! - repetition, option: FIRST(term) ∪ {NULLABLE}
//!
//! Results are cached on non-partial rules. Partial rules are recomputed on every request
//! because their undefined references contribute nothing yet.

use crate::jproc::ebnf::{RuleBody, NULLABLE};
use crate::jproc::grammar::GrammarError;
use crate::jproc::rule::Rule;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet};

/// Computes (or fetches) the FIRST set of `name`.
///
/// `visiting` holds the rules whose FIRST set is currently being computed. A rule reached
/// again through it contributes nothing, which only happens for left recursion.
pub(crate) fn first_set_of(
    rules: &mut IndexMap<String, Rule>,
    name: &str,
    visiting: &mut HashSet<String>,
) -> Result<BTreeSet<String>, GrammarError> {
    let rule = rules.get(name).ok_or_else(|| GrammarError::MissingRule {
        name: name.to_string(),
        referenced_by: None,
    })?;
    if rule.first_known() {
        return Ok(rule.first_set().clone());
    }
    if !visiting.insert(name.to_string()) {
        return Ok(BTreeSet::new());
    }

    let body = rule.body().clone();
    let first = match body {
        RuleBody::Terminal(_) | RuleBody::AttrTerminal => BTreeSet::from([name.to_string()]),
        RuleBody::Concatenation(terms) | RuleBody::AttrProduction(terms) => {
            sequence_first(rules, &terms, visiting)?
        }
        RuleBody::Alternation(terms) => {
            let mut first = BTreeSet::new();
            for term in &terms {
                first.extend(term_first(rules, term, visiting)?);
            }
            first
        }
        RuleBody::Repetition(term) | RuleBody::Option(term) => {
            let mut first = term_first(rules, &term, visiting)?;
            first.insert(NULLABLE.to_string());
            first
        }
    };
    visiting.remove(name);

    if let Some(rule) = rules.get_mut(name) {
        if !rule.is_partial() {
            rule.set_first_set(first.clone());
        }
    }
    Ok(first)
}

/// FIRST of a term sequence, as used by concatenations and FOLLOW analysis.
fn sequence_first(
    rules: &mut IndexMap<String, Rule>,
    terms: &[String],
    visiting: &mut HashSet<String>,
) -> Result<BTreeSet<String>, GrammarError> {
    let mut first = BTreeSet::new();
    for term in terms {
        let mut term_first = term_first(rules, term, visiting)?;
        if !term_first.remove(NULLABLE) {
            first.extend(term_first);
            return Ok(first);
        }
        first.extend(term_first);
    }
    first.insert(NULLABLE.to_string());
    Ok(first)
}

/// FIRST of a referenced term. Undefined references are provisional and contribute nothing.
fn term_first(
    rules: &mut IndexMap<String, Rule>,
    term: &str,
    visiting: &mut HashSet<String>,
) -> Result<BTreeSet<String>, GrammarError> {
    if !rules.contains_key(term) {
        return Ok(BTreeSet::new());
    }
    first_set_of(rules, term, visiting)
}
