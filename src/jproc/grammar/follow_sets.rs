//! FOLLOW set computation
//!
//! FOLLOW(rule) is the set of terminal names that may appear immediately after the rule,
//! with [`END_OF_INPUT`] marking the end of the token stream. The computation runs in
//! stages over an explicit worklist:
//!
//! 1. Seed FOLLOW(top) with `END_OF_INPUT`.
//! 2. Resolve every *first-set dependency*: a term followed by other terms in a
//!    concatenation gains FIRST of what follows (up to the first non-nullable term); the
//!    body of a repetition gains its own FIRST set, since it may repeat.
//! 3. Collect *follow-set dependencies*: a term that ends a concatenation (or is followed
//!    only by nullable terms), or that is the body of an alternation, option or repetition,
//!    inherits FOLLOW of the containing rule.
//! 4. Stage the follow-set dependencies: each round partitions the pending rules into
//!    those whose dependencies are all resolved and the rest. A stalled round means a cycle;
//!    the remainder is then resolved together by fixed-point iteration.
//!
//! FIRST sets must be final before this runs.

use crate::jproc::ebnf::{RuleBody, END_OF_INPUT, NULLABLE};
use crate::jproc::rule::Rule;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;

/// The result of FOLLOW analysis.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FollowAnalysis {
    /// FOLLOW set of every rule, in declaration order
    pub sets: IndexMap<String, BTreeSet<String>>,
    /// Rules resolved in each stage, after stage 0
    pub stages: Vec<Vec<String>>,
    /// Rules on a dependency cycle, resolved by fixed-point iteration
    pub cyclic: Vec<String>,
}

pub(crate) fn compute_follow_sets(rules: &IndexMap<String, Rule>, top: &str) -> FollowAnalysis {
    let mut sets: IndexMap<String, BTreeSet<String>> = rules
        .keys()
        .map(|name| (name.clone(), BTreeSet::new()))
        .collect();
    if let Some(top_follow) = sets.get_mut(top) {
        top_follow.insert(END_OF_INPUT.to_string());
    }

    // term -> rules whose FOLLOW set flows into the term's FOLLOW set
    let mut dependencies: IndexMap<String, IndexSet<String>> = IndexMap::new();
    let mut depend = |term: &str, on: &str| {
        if term != on {
            dependencies
                .entry(term.to_string())
                .or_default()
                .insert(on.to_string());
        }
    };

    for rule in rules.values() {
        match rule.body() {
            RuleBody::Concatenation(terms) | RuleBody::AttrProduction(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let mut rest_nullable = true;
                    for next in &terms[i + 1..] {
                        let next_first = first_of(rules, next);
                        extend_without_nullable(&mut sets, term, next_first);
                        if !next_first.contains(NULLABLE) {
                            rest_nullable = false;
                            break;
                        }
                    }
                    if rest_nullable {
                        depend(term, rule.name());
                    }
                }
            }
            RuleBody::Alternation(terms) => {
                for term in terms {
                    depend(term, rule.name());
                }
            }
            RuleBody::Option(term) => depend(term, rule.name()),
            RuleBody::Repetition(term) => {
                extend_without_nullable(&mut sets, term, first_of(rules, term));
                depend(term, rule.name());
            }
            RuleBody::Terminal(_) | RuleBody::AttrTerminal => {}
        }
    }

    let (stages, cyclic) = stage_dependencies(&dependencies);
    for stage in &stages {
        for name in stage {
            absorb(&mut sets, name, &dependencies[name.as_str()]);
        }
    }

    let mut changed = !cyclic.is_empty();
    while changed {
        changed = false;
        for name in &cyclic {
            changed |= absorb(&mut sets, name, &dependencies[name.as_str()]);
        }
    }

    log::trace!(
        "follow sets: {} stages, {} cyclic rules",
        stages.len(),
        cyclic.len()
    );

    FollowAnalysis {
        sets,
        stages,
        cyclic,
    }
}

/// Orders follow-set dependencies into stages.
///
/// Rules with no follow-set dependency are complete after stage 0 and never appear here.
/// Returns the stages in resolution order and the rules left on a cycle.
pub(crate) fn stage_dependencies(
    dependencies: &IndexMap<String, IndexSet<String>>,
) -> (Vec<Vec<String>>, Vec<String>) {
    let mut pending: Vec<String> = dependencies.keys().cloned().collect();
    let mut stages = Vec::new();

    while !pending.is_empty() {
        let waiting: IndexSet<&str> = pending.iter().map(String::as_str).collect();
        let (ready, blocked): (Vec<String>, Vec<String>) =
            pending.iter().cloned().partition(|name| {
                dependencies[name.as_str()]
                    .iter()
                    .all(|dep| !waiting.contains(dep.as_str()))
            });
        if ready.is_empty() {
            return (stages, blocked);
        }
        stages.push(ready);
        pending = blocked;
    }
    (stages, Vec::new())
}

/// Unions FOLLOW of every dependency into FOLLOW(name). Reports whether the set grew.
fn absorb(
    sets: &mut IndexMap<String, BTreeSet<String>>,
    name: &str,
    dependencies: &IndexSet<String>,
) -> bool {
    let incoming: BTreeSet<String> = dependencies
        .iter()
        .filter_map(|dep| sets.get(dep.as_str()))
        .flatten()
        .cloned()
        .collect();
    match sets.get_mut(name) {
        Some(follow) => {
            let before = follow.len();
            follow.extend(incoming);
            follow.len() != before
        }
        None => false,
    }
}

fn first_of<'r>(rules: &'r IndexMap<String, Rule>, name: &str) -> &'r BTreeSet<String> {
    static EMPTY: BTreeSet<String> = BTreeSet::new();
    rules.get(name).map(Rule::first_set).unwrap_or(&EMPTY)
}

fn extend_without_nullable(
    sets: &mut IndexMap<String, BTreeSet<String>>,
    name: &str,
    first: &BTreeSet<String>,
) {
    if let Some(follow) = sets.get_mut(name) {
        follow.extend(first.iter().filter(|t| t.as_str() != NULLABLE).cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(pairs: &[(&str, &[&str])]) -> IndexMap<String, IndexSet<String>> {
        pairs
            .iter()
            .map(|(name, on)| {
                (
                    name.to_string(),
                    on.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_stages_follow_dependency_order() {
        let deps = deps(&[("c", &["b"]), ("b", &["a"]), ("d", &["top"])]);
        let (stages, cyclic) = stage_dependencies(&deps);

        assert_eq!(
            stages,
            vec![vec!["b".to_string(), "d".to_string()], vec!["c".to_string()]]
        );
        assert!(cyclic.is_empty());
    }

    #[test]
    fn test_cycle_is_reported_for_fixed_point() {
        let deps = deps(&[("a", &["b"]), ("b", &["a"]), ("c", &["x"])]);
        let (stages, cyclic) = stage_dependencies(&deps);

        assert_eq!(stages, vec![vec!["c".to_string()]]);
        assert_eq!(cyclic, vec!["a".to_string(), "b".to_string()]);
    }
}
