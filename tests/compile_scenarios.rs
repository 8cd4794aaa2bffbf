//! End-to-end compilation scenarios
//!
//! Programs come from the sample files where possible; error scenarios build token
//! sequences directly so they reach the parser without passing the JSON check.

use jproc::jproc::input::InputError;
use jproc::jproc::language::definition::standard_tokenizer;
use jproc::jproc::language::semantic::{SemanticError, SpecialForm, Value};
use jproc::jproc::lexing::NoHooks;
use jproc::jproc::parsing::ParseErrorKind;
use jproc::jproc::testing::{mk_tokens, sample, SAMPLE_PROGRAM, SAMPLE_SYMBOLS};
use jproc::{build_tree, compile, CompileError};
use rstest::rstest;

#[rstest]
#[case::bare("{}")]
#[case::spaced("{ }")]
#[case::multiline("{\n\n}\n")]
fn test_empty_program_compiles_to_nothing(#[case] source: &str) {
    let grammar = standard_tokenizer().unwrap();
    assert!(compile(source, &grammar).unwrap().is_none());
}

#[test]
fn test_empty_sample_compiles_to_nothing() {
    let grammar = standard_tokenizer().unwrap();
    assert!(compile(sample("empty.json").unwrap(), &grammar)
        .unwrap()
        .is_none());
}

#[test]
fn test_sample_symbol_table() {
    let grammar = standard_tokenizer().unwrap();
    let env = compile(SAMPLE_PROGRAM, &grammar).unwrap().unwrap();
    let symbols = &env.symbols;

    let names: Vec<&str> = symbols.names().collect();
    assert_eq!(names, SAMPLE_SYMBOLS.to_vec());

    assert_eq!(
        symbols.get("title"),
        Some(&Value::String("Inventory report".into()))
    );
    assert_eq!(symbols.get("version"), Some(&Value::Number(2.0)));
    assert_eq!(symbols.get("enabled"), Some(&Value::Boolean(true)));
    assert_eq!(
        symbols.get("&doc"),
        Some(&Value::Procedure {
            form: SpecialForm::Doc,
            args: vec![Value::String("Summarises stock levels per warehouse".into())],
        })
    );
    assert_eq!(symbols.get("threshold"), Some(&Value::Number(10.5)));
    assert_eq!(symbols.get("region"), Some(&Value::Unbound));
    assert_eq!(
        symbols.get("matrix"),
        Some(&Value::List(vec![
            Value::List(vec![Value::Number(1.0), Value::Number(2.0)]),
            Value::List(vec![Value::Number(3.0), Value::Number(4.0)]),
            Value::List(vec![]),
        ]))
    );
    assert_eq!(
        symbols.get("tags"),
        Some(&Value::List(vec![
            Value::String("a".into()),
            Value::String("b\"c".into()),
            Value::String(String::new()),
        ]))
    );
    assert_eq!(symbols.get("warehouse.label"), Some(&Value::String(String::new())));
    assert_eq!(symbols.get("warehouse.nothing"), Some(&Value::Unbound));
    assert_eq!(symbols.get("warehouse.limits.low"), Some(&Value::Number(-1.0)));
    assert_eq!(symbols.get("warehouse.limits.high"), Some(&Value::Number(1000.0)));
    assert_eq!(
        symbols.get("alias"),
        Some(&Value::VariableRef("warehouse".into()))
    );
    assert_eq!(symbols.get("warehouse"), Some(&Value::Scope));
    assert_eq!(symbols.get("warehouse.empty"), Some(&Value::Scope));
}

#[test]
fn test_compact_sample_scopes() {
    let grammar = standard_tokenizer().unwrap();
    let env = compile(sample("compact.json").unwrap(), &grammar)
        .unwrap()
        .unwrap();
    let names: Vec<&str> = env.symbols.names().collect();
    assert_eq!(
        names,
        vec![
            "id",
            "x",
            "nested",
            "nested.&doc",
            "nested.deep",
            "nested.deep.k",
            "list"
        ]
    );
    assert_eq!(
        env.symbols.get("nested.deep.k"),
        Some(&Value::String("v\\n".into()))
    );
    assert_eq!(
        env.symbols.get("x"),
        Some(&Value::List(vec![
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Unbound
        ]))
    );
}

#[rstest]
#[case::top_level("{\"&unknown\": 1}", "unknown", 1)]
#[case::nested("{\n  \"a\": {\n    \"&frobnicate\": [1]\n  }\n}", "frobnicate", 3)]
fn test_unknown_special_form(#[case] source: &str, #[case] name: &str, #[case] line: usize) {
    let grammar = standard_tokenizer().unwrap();
    let err = compile(source, &grammar).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownSpecialForm {
            name: name.into(),
            line: Some(line)
        }
    );
    assert!(err.to_string().contains(name));
}

#[rstest]
#[case::let_not_a_list(r#"{"&let": "x"}"#)]
#[case::ref_not_a_string(r#"{"o": {"&ref": 1}}"#)]
#[case::form_as_value(r#"{"a": "&doc"}"#)]
fn test_misused_forms_are_parse_errors(#[case] source: &str) {
    let grammar = standard_tokenizer().unwrap();
    let err = compile(source, &grammar).unwrap_err();
    assert!(matches!(err, CompileError::Parse(_)), "got {:?}", err);
}

#[test]
fn test_top_level_ref_is_misplaced() {
    let grammar = standard_tokenizer().unwrap();
    let err = compile(r#"{"&ref": "a"}"#, &grammar).unwrap_err();
    assert_eq!(
        err,
        CompileError::Semantic(SemanticError::MisplacedSpecialForm {
            form: SpecialForm::Ref,
            line: Some(1)
        })
    );
}

#[test]
fn test_object_inside_array_is_rejected_before_lexing() {
    let grammar = standard_tokenizer().unwrap();
    let err = compile(r#"{"a": [{"b": 1}]}"#, &grammar).unwrap_err();
    assert_eq!(
        err,
        CompileError::Input(InputError::ObjectInArray { path: "a[0]".into() })
    );
    assert!(err.to_string().contains("inside arrays"));
}

#[test]
fn test_missing_member_divider() {
    let grammar = standard_tokenizer().unwrap();
    let tokens = mk_tokens(&[
        ("lbrace", "{"),
        ("string", "\"a\""),
        ("colon", ":"),
        ("number", "1"),
        ("string", "\"b\""),
        ("colon", ":"),
        ("number", "2"),
        ("rbrace", "}"),
    ]);
    let err = build_tree(&tokens, grammar.language().program()).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::TerminalMismatch { ref actual, .. } if actual == "string"
    ));
    assert_eq!(err.index, 4);
    assert_eq!(err.line(), Some(1));
}

#[test]
fn test_truncated_token_sequence() {
    let grammar = standard_tokenizer().unwrap();
    let tokens = mk_tokens(&[("lbrace", "{"), ("string", "\"a\""), ("colon", ":")]);
    let err = build_tree(&tokens, grammar.language().program()).unwrap_err();
    assert!(err.is_exhausted_input());
    assert_eq!(err.index, 3);
}

#[test]
fn test_dropped_closing_bracket_leaves_array_unfolded() {
    let grammar = standard_tokenizer().unwrap();
    let language = grammar.language();

    let mut scanned = language.scan("{\"a\": [1, 2]}", &NoHooks).unwrap();
    let closing = scanned.iter().position(|t| t.is("rbracket")).unwrap();
    scanned.remove(closing);

    let folded = language.fold(scanned, grammar.as_ref()).unwrap();
    assert!(folded.iter().any(|t| t.is("lbracket")));
    assert!(!folded.iter().any(|t| t.is("array")));

    let err = build_tree(&folded, language.program()).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::UnmatchedFirstSet { ref actual, .. } if actual == "lbracket"
    ));
}

#[test]
fn test_parse_error_snippet_marks_offending_token() {
    let grammar = standard_tokenizer().unwrap();
    let tokens = mk_tokens(&[
        ("lbrace", "{"),
        ("string", "\"a\""),
        ("colon", ":"),
        ("colon", ":"),
    ]);
    let err = build_tree(&tokens, grammar.language().program()).unwrap_err();
    assert_eq!(err.snippet().unwrap(), "line 1: { \"a\" : :\n                ^");
}

#[test]
fn test_trailing_tokens_after_program() {
    let grammar = standard_tokenizer().unwrap();
    let tokens = mk_tokens(&[("empty_object", "{}"), ("rbrace", "}")]);
    let err = build_tree(&tokens, grammar.language().program()).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::TrailingTokens { .. }));
}
