//! The procedure language
//!
//! Programs are JSON objects whose members are either binds (`"key": value`) or special
//! forms (`"&let": [names]`, `"&ref": "name"`, `"&doc": "text"`). Three layers define the
//! syntax:
//!
//! 1. The *token grammar*: every scanned terminal plus the rules that fold runs of
//!    terminals into strings, arrays and empty containers.
//! 2. The *lexer spec*: which terminals each scanner mode recognizes. Objects, arrays and
//!    strings each get their own mode, so `,` is `member_divider` between members and
//!    `item_divider` between array items.
//! 3. The *program grammar*: the LL(1) grammar the parser runs over the folded tokens.
//!
//! ```text
//! document    = program | empty_object
//! program     = lbrace members rbrace
//! members     = member member_tail
//! member_tail = { next_member }
//! next_member = member_divider member
//! member      = bind | let_member | ref_member | doc_member
//! bind        = key colon value
//! let_member  = let_form colon params
//! ref_member  = ref_form colon string
//! doc_member  = doc_form colon string
//! params      = array | empty_array
//! key         = string | empty_string
//! value       = literal | array | empty_array | object | empty_object
//! literal     = string | empty_string | number | boolean | null
//! object      = lbrace members rbrace
//! ```
//!
//! The finalized language and the base tokenizer grammar are built once and cached.

use crate::jproc::attributes::{Attr, AttrDecl, AttributeGrammar};
use crate::jproc::grammar::{Grammar, GrammarError, RuleSeq};
use crate::jproc::language::Language;
use crate::jproc::lexing::{FoldPlan, LexMode, LexerSpec, ModeRule};
use once_cell::sync::OnceCell;
use std::sync::Arc;

pub const LANGUAGE: &str = "jproc";
pub const TOKENIZER: &str = "tokenizer";

/// Rule names referenced by hand-written passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sym {
    Document,
    Program,
    Object,
    Members,
    MemberTail,
    NextMember,
    Member,
    Bind,
    LetMember,
    RefMember,
    DocMember,
    Lbrace,
    Rbrace,
    Colon,
    MemberDivider,
    ItemDivider,
    String,
    EmptyString,
    Number,
    Boolean,
    Null,
    Array,
    EmptyArray,
    EmptyObject,
    LetForm,
    RefForm,
    DocForm,
    UnknownForm,
}

impl Sym {
    pub const ALL: [Sym; 28] = [
        Sym::Document,
        Sym::Program,
        Sym::Object,
        Sym::Members,
        Sym::MemberTail,
        Sym::NextMember,
        Sym::Member,
        Sym::Bind,
        Sym::LetMember,
        Sym::RefMember,
        Sym::DocMember,
        Sym::Lbrace,
        Sym::Rbrace,
        Sym::Colon,
        Sym::MemberDivider,
        Sym::ItemDivider,
        Sym::String,
        Sym::EmptyString,
        Sym::Number,
        Sym::Boolean,
        Sym::Null,
        Sym::Array,
        Sym::EmptyArray,
        Sym::EmptyObject,
        Sym::LetForm,
        Sym::RefForm,
        Sym::DocForm,
        Sym::UnknownForm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sym::Document => "document",
            Sym::Program => "program",
            Sym::Object => "object",
            Sym::Members => "members",
            Sym::MemberTail => "member_tail",
            Sym::NextMember => "next_member",
            Sym::Member => "member",
            Sym::Bind => "bind",
            Sym::LetMember => "let_member",
            Sym::RefMember => "ref_member",
            Sym::DocMember => "doc_member",
            Sym::Lbrace => "lbrace",
            Sym::Rbrace => "rbrace",
            Sym::Colon => "colon",
            Sym::MemberDivider => "member_divider",
            Sym::ItemDivider => "item_divider",
            Sym::String => "string",
            Sym::EmptyString => "empty_string",
            Sym::Number => "number",
            Sym::Boolean => "boolean",
            Sym::Null => "null",
            Sym::Array => "array",
            Sym::EmptyArray => "empty_array",
            Sym::EmptyObject => "empty_object",
            Sym::LetForm => "let_form",
            Sym::RefForm => "ref_form",
            Sym::DocForm => "doc_form",
            Sym::UnknownForm => "unknown_form",
        }
    }

    pub fn from_name(name: &str) -> Option<Sym> {
        Sym::ALL.iter().copied().find(|sym| sym.as_str() == name)
    }
}

const NUMBER: &str = r"-?(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?";

const TERMINALS: &[(&str, &str)] = &[
    ("ws", r"[ \t\r\n]+"),
    ("quote", "\""),
    ("item_quote", "\""),
    ("chars", r#"[^"\\]+"#),
    ("escape", r#"\\(?:["\\/bfnrt]|u[0-9a-fA-F]{4})"#),
    ("lbrace", r"\{"),
    ("rbrace", r"\}"),
    ("lbracket", r"\["),
    ("rbracket", r"\]"),
    ("item_lbracket", r"\["),
    ("item_rbracket", r"\]"),
    ("colon", ":"),
    ("member_divider", ","),
    ("item_divider", ","),
    ("number", NUMBER),
    ("item_number", NUMBER),
    ("boolean", "true|false"),
    ("item_boolean", "true|false"),
    ("null", "null"),
    ("item_null", "null"),
    ("let_form", r#""&let""#),
    ("ref_form", r#""&ref""#),
    ("doc_form", r#""&doc""#),
    ("unknown_form", r#""&[A-Za-z_][A-Za-z0-9_]*""#),
];

const ARRAY_ITEMS: &[&str] = &[
    "item_number",
    "item_string",
    "item_empty_string",
    "item_boolean",
    "item_null",
    "item_divider",
    "item_array",
    "item_empty_array",
];

/// Terminals the program grammar takes over from the token grammar unchanged.
const PRIMITIVES: &[Sym] = &[
    Sym::Lbrace,
    Sym::Rbrace,
    Sym::Colon,
    Sym::MemberDivider,
    Sym::Number,
    Sym::Boolean,
    Sym::Null,
    Sym::LetForm,
    Sym::RefForm,
    Sym::DocForm,
];

/// Tokens produced by folding.
const FOLDED: &[Sym] = &[
    Sym::String,
    Sym::EmptyString,
    Sym::Array,
    Sym::EmptyArray,
    Sym::EmptyObject,
];

pub fn token_grammar() -> Result<Grammar, GrammarError> {
    let mut seq = RuleSeq::new();
    for (name, pattern) in TERMINALS {
        seq.make_terminal_rule(name, pattern)?;
    }

    seq.make_alternation_rule("string_content", &["chars", "escape"])?;
    seq.make_concatenation_rule("string", &["quote", "string_content", "quote"])?;
    seq.make_concatenation_rule("empty_string", &["quote", "quote"])?;
    seq.make_concatenation_rule("item_string", &["item_quote", "string_content", "item_quote"])?;
    seq.make_concatenation_rule("item_empty_string", &["item_quote", "item_quote"])?;

    // array_items and item_array refer to each other
    seq.make_alternation_rule("array_items", ARRAY_ITEMS)?;
    seq.make_concatenation_rule("item_array", &["item_lbracket", "array_items", "item_rbracket"])?;
    seq.make_concatenation_rule("item_empty_array", &["item_lbracket", "item_rbracket"])?;
    seq.make_concatenation_rule("array", &["lbracket", "array_items", "rbracket"])?;
    seq.make_concatenation_rule("empty_array", &["lbracket", "rbracket"])?;
    seq.make_concatenation_rule("empty_object", &["lbrace", "rbrace"])?;

    let lexemes: Vec<&str> = PRIMITIVES
        .iter()
        .chain(FOLDED)
        .map(Sym::as_str)
        .collect();
    seq.make_alternation_rule("lexeme", &lexemes)?;
    seq.make_repetition_rule("token_stream", "lexeme")?;

    seq.build_cfg("tokens", Some("token_stream"))
}

pub fn program_grammar(tokens: &Grammar) -> Result<Grammar, GrammarError> {
    let folded_attrs = [Attr::Line, Attr::Indent, Attr::Render];
    let member_attrs = ([Attr::Render], [Attr::Scope]);

    let mut seq = RuleSeq::new();
    for sym in PRIMITIVES {
        seq.import_terminal(tokens, sym.as_str())?;
    }
    for sym in FOLDED {
        seq.make_attr_terminal_rule(sym.as_str(), &folded_attrs)?;
    }

    seq.make_alternation_rule(Sym::Document.as_str(), &["program", "empty_object"])?;
    seq.make_attr_production_rule(
        Sym::Program.as_str(),
        &["lbrace", "members", "rbrace"],
        &[Attr::Render],
        &[Attr::Scope],
    )?;
    seq.make_concatenation_rule(Sym::Members.as_str(), &["member", "member_tail"])?;
    seq.make_repetition_rule(Sym::MemberTail.as_str(), "next_member")?;
    seq.make_concatenation_rule(Sym::NextMember.as_str(), &["member_divider", "member"])?;
    seq.make_alternation_rule(
        Sym::Member.as_str(),
        &["bind", "let_member", "ref_member", "doc_member"],
    )?;

    let pairs: [(Sym, [&str; 3]); 4] = [
        (Sym::Bind, ["key", "colon", "value"]),
        (Sym::LetMember, ["let_form", "colon", "params"]),
        (Sym::RefMember, ["ref_form", "colon", "string"]),
        (Sym::DocMember, ["doc_form", "colon", "string"]),
    ];
    for (sym, terms) in &pairs {
        seq.make_attr_production_rule(sym.as_str(), terms, &member_attrs.0, &member_attrs.1)?;
    }

    seq.make_alternation_rule("params", &["array", "empty_array"])?;
    seq.make_alternation_rule("key", &["string", "empty_string"])?;
    seq.make_alternation_rule(
        "value",
        &["literal", "array", "empty_array", "object", "empty_object"],
    )?;
    seq.make_alternation_rule(
        "literal",
        &["string", "empty_string", "number", "boolean", "null"],
    )?;
    seq.make_attr_production_rule(
        Sym::Object.as_str(),
        &["lbrace", "members", "rbrace"],
        &[Attr::Render],
        &[Attr::Scope],
    )?;

    seq.build_cfg("program", Some(Sym::Document.as_str()))
}

fn object_mode(name: &str, nesting: bool) -> LexMode {
    LexMode {
        name: name.to_string(),
        nesting,
        rules: vec![
            ModeRule::skip("ws"),
            ModeRule::emit("let_form"),
            ModeRule::emit("ref_form"),
            ModeRule::emit("doc_form"),
            ModeRule::emit("unknown_form"),
            ModeRule::push("quote", "string"),
            ModeRule::push("lbrace", "object"),
            ModeRule::pop("rbrace"),
            ModeRule::push("lbracket", "array"),
            ModeRule::emit("colon"),
            ModeRule::emit("member_divider"),
            ModeRule::emit("number"),
            ModeRule::emit("boolean"),
            ModeRule::emit("null"),
        ],
    }
}

fn array_mode(name: &str, close: &str) -> LexMode {
    LexMode {
        name: name.to_string(),
        nesting: true,
        rules: vec![
            ModeRule::skip("ws"),
            ModeRule::push("item_quote", "item_string"),
            ModeRule::push("item_lbracket", "nested_array"),
            ModeRule::pop(close),
            ModeRule::emit("item_divider"),
            ModeRule::emit("item_number"),
            ModeRule::emit("item_boolean"),
            ModeRule::emit("item_null"),
        ],
    }
}

fn string_mode(name: &str, quote: &str) -> LexMode {
    LexMode {
        name: name.to_string(),
        nesting: false,
        rules: vec![
            ModeRule::emit("chars"),
            ModeRule::emit("escape"),
            ModeRule::pop(quote),
        ],
    }
}

pub fn lexer_spec() -> LexerSpec {
    LexerSpec {
        initial: "top".to_string(),
        modes: vec![
            object_mode("top", false),
            object_mode("object", true),
            array_mode("array", "rbracket"),
            array_mode("nested_array", "item_rbracket"),
            string_mode("string", "quote"),
            string_mode("item_string", "item_quote"),
        ],
    }
}

/// Folds in dependency order: string parts before strings, array items before arrays.
pub fn fold_plan() -> FoldPlan {
    FoldPlan::new()
        .alternation("string_content")
        .concatenation("string")
        .concatenation("empty_string")
        .concatenation("item_string")
        .concatenation("item_empty_string")
        .alternation("array_items")
        .concatenation("item_array")
        .concatenation("item_empty_array")
        .concatenation("array")
        .concatenation("empty_array")
        .concatenation("empty_object")
}

pub fn language() -> Result<Language, GrammarError> {
    let tokens = token_grammar()?;
    let program = program_grammar(&tokens)?;
    Language::new(LANGUAGE, tokens, program, &lexer_spec(), fold_plan())?
        .with_unknown_form(Sym::UnknownForm.as_str())
}

/// Line and indentation of every token, taken from the scan position and nesting depth.
pub fn tokenizer_grammar(language: Arc<Language>) -> AttributeGrammar {
    AttributeGrammar::new(TOKENIZER, language)
        .declare(AttrDecl::synthesized(Attr::Line).on_token(|_, ctx| Some(ctx.line.into())))
        .declare(AttrDecl::synthesized(Attr::Indent).on_token(|_, ctx| Some(ctx.depth.into())))
}

static STANDARD_LANGUAGE: OnceCell<Arc<Language>> = OnceCell::new();
static STANDARD_TOKENIZER: OnceCell<Arc<AttributeGrammar>> = OnceCell::new();

pub fn standard_language() -> Result<Arc<Language>, GrammarError> {
    STANDARD_LANGUAGE
        .get_or_try_init(|| {
            log::debug!("building the {} language", LANGUAGE);
            language().map(Arc::new)
        })
        .map(Arc::clone)
}

pub fn standard_tokenizer() -> Result<Arc<AttributeGrammar>, GrammarError> {
    STANDARD_TOKENIZER
        .get_or_try_init(|| standard_language().map(|l| Arc::new(tokenizer_grammar(l))))
        .map(Arc::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::ebnf::{RuleKind, END_OF_INPUT, NULLABLE};
    use crate::jproc::lexing::{ConcatLexemes, NoHooks};
    use std::collections::BTreeSet;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sym_names_round_trip() {
        for sym in Sym::ALL {
            assert_eq!(Sym::from_name(sym.as_str()), Some(sym));
        }
        assert_eq!(Sym::from_name("nope"), None);
    }

    #[test]
    fn test_program_grammar_sets() {
        let language = standard_language().unwrap();
        let g = language.program();

        assert_eq!(g.top_name(), "document");
        assert_eq!(g.follow_set("document"), Some(&set(&[END_OF_INPUT])));
        assert_eq!(g.first_set("member_tail"), Some(&set(&["member_divider", NULLABLE])));
        assert_eq!(g.follow_set("member_tail"), Some(&set(&["rbrace"])));
        assert_eq!(
            g.first_set("member"),
            Some(&set(&["doc_form", "empty_string", "let_form", "ref_form", "string"]))
        );
        assert_eq!(g.rule("string").unwrap().kind(), RuleKind::AttrTerminal);
        assert_eq!(g.rule("number").unwrap().kind(), RuleKind::Terminal);
    }

    #[test]
    fn test_recursive_fold_rules_have_no_matcher() {
        let tokens = token_grammar().unwrap();
        assert!(tokens.rule("array_items").unwrap().matcher().is_none());
        assert!(tokens.rule("string").unwrap().matches("\"abc\""));
        assert!(!tokens.rule("string").unwrap().matches("\"a\\n\""));
    }

    #[test]
    fn test_lexer_modes_split_dividers() {
        let language = standard_language().unwrap();
        let tokens = language.scan(r#"{"a": [1, 2], "b": 3}"#, &NoHooks).unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "lbrace", "quote", "chars", "quote", "colon", "lbracket", "item_number",
                "item_divider", "item_number", "rbracket", "member_divider", "quote", "chars",
                "quote", "colon", "number", "rbrace"
            ]
        );
    }

    #[test]
    fn test_known_forms_win_ties_over_unknown_form() {
        let language = standard_language().unwrap();
        let tokens = language.scan(r#"{"&let": [], "&lets": 1}"#, &NoHooks).unwrap();
        assert_eq!(tokens[1].name, "let_form");
        assert!(tokens.iter().any(|t| t.name == "unknown_form" && t.lexeme == "\"&lets\""));
    }

    #[test]
    fn test_fold_plan_builds_nested_arrays() {
        let language = standard_language().unwrap();
        let raw = language.scan(r#"{"m": [[1, 2], [], "x"]}"#, &NoHooks).unwrap();
        let folded = language.fold(raw, &ConcatLexemes).unwrap();
        let names: Vec<&str> = folded.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["lbrace", "string", "colon", "array", "rbrace"]);
        assert_eq!(folded[3].lexeme, r#"[[1,2],[],"x"]"#);
    }
}
