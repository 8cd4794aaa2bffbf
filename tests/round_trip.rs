//! Printer round trips
//!
//! Canonical source renders to itself byte for byte; anything else renders to canonical
//! source that renders to itself.

use jproc::jproc::config::CompilerConfig;
use jproc::jproc::language::definition::standard_tokenizer;
use jproc::jproc::language::printer::printer_grammar;
use jproc::jproc::testing::{sample, SAMPLE_PROGRAM};
use jproc::{compile, generate_code, render, tokenize};
use proptest::prelude::*;

fn printer() -> jproc::jproc::attributes::AttributeGrammar {
    printer_grammar(&standard_tokenizer().unwrap(), &CompilerConfig::default())
}

#[test]
fn test_sample_round_trips_byte_exact() {
    let rendered = render(SAMPLE_PROGRAM, &printer()).unwrap();
    assert_eq!(rendered, SAMPLE_PROGRAM);
}

#[test]
fn test_generate_code_from_environment() {
    let grammar = standard_tokenizer().unwrap();
    let env = compile(SAMPLE_PROGRAM, &grammar).unwrap().unwrap();
    assert_eq!(generate_code(&env, &printer()).unwrap(), SAMPLE_PROGRAM);
}

#[test]
fn test_compact_sample_rendering() {
    let rendered = render(sample("compact.json").unwrap(), &printer()).unwrap();
    insta::assert_snapshot!(rendered.trim_end());
}

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,6}".prop_map(|k| format!("\"{}\"", k))
}

fn literal_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,6}".prop_map(|s| format!("\"{}\"", s)),
        (-1000i64..1000).prop_map(|n| n.to_string()),
        Just("true".to_string()),
        Just("false".to_string()),
        Just("null".to_string()),
    ]
}

/// Arrays hold literals and arrays, never objects.
fn array_strategy() -> impl Strategy<Value = String> {
    let item = literal_strategy().prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|items| format!("[{}]", items.join(",")))
    });
    prop::collection::vec(item, 0..4).prop_map(|items| format!("[{}]", items.join(", ")))
}

fn object_text(members: Vec<(String, String)>) -> String {
    let members: Vec<String> = members
        .into_iter()
        .map(|(k, v)| format!("{}:{}", k, v))
        .collect();
    format!("{{{}}}", members.join(","))
}

fn value_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![literal_strategy(), array_strategy()];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop::collection::vec((key_strategy(), inner), 0..4).prop_map(object_text)
    })
}

/// Non-empty programs in compact layout.
fn program_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec((key_strategy(), value_strategy()), 1..5).prop_map(object_text)
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_folding_is_idempotent(program in program_strategy()) {
            let grammar = standard_tokenizer().unwrap();
            let tokens = tokenize(&program, &grammar).unwrap();
            let refolded = grammar.language().fold(tokens.clone(), &*grammar).unwrap();
            prop_assert_eq!(refolded, tokens);
        }

        #[test]
        fn test_rendering_is_idempotent(program in program_strategy()) {
            let printer = printer();
            let once = render(&program, &printer).unwrap();
            let twice = render(&once, &printer).unwrap();
            prop_assert_eq!(&twice, &once);
            prop_assert!(once.ends_with("}\n"), "rendered output must end with a closing brace and newline");
        }

        #[test]
        fn test_rendering_keeps_the_symbol_table(program in program_strategy()) {
            let grammar = standard_tokenizer().unwrap();
            let before = compile(&program, &grammar).unwrap();
            let after = compile(&render(&program, &printer()).unwrap(), &grammar).unwrap();
            prop_assert_eq!(
                before.map(|env| env.symbols),
                after.map(|env| env.symbols)
            );
        }
    }
}
