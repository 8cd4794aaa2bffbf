//! Standard pipelines
//!
//! Each builder returns a `String → X` transform over the given attribute grammar. Builders
//! that need an attribute derive the grammar declaring it when the one passed in lacks it:
//! [`to_symbols`] runs with `Scope`, [`to_text`] with `Render`.

use crate::jproc::attributes::{Attr, AttributeGrammar};
use crate::jproc::config::CompilerConfig;
use crate::jproc::language::printer::printer_grammar;
use crate::jproc::language::semantic::{semantic_grammar, SymbolTable};
use crate::jproc::lexing::Token;
use crate::jproc::transforms::stages::{
    AstSimplification, Evaluation, Folding, InputCheck, Rendering, SemanticAnalysis,
    SpecialFormCheck, Tokenization, TreeBuilding,
};
use crate::jproc::transforms::Transform;
use crate::jproc::tree::ParseTree;
use std::sync::Arc;

pub type LexingTransform = Transform<String, Vec<Token>>;
pub type TreeTransform = Transform<String, ParseTree>;
pub type SymbolsTransform = Transform<String, SymbolTable>;
pub type TextTransform = Transform<String, String>;

/// Input check, scan, fold, special-form check.
pub fn lexing(grammar: Arc<AttributeGrammar>) -> LexingTransform {
    Transform::start()
        .then(InputCheck::new())
        .then(Tokenization::new(grammar.clone()))
        .then(Folding::new(grammar.clone()))
        .then(SpecialFormCheck::new(grammar))
}

/// Lexing, then the full parse tree.
pub fn to_tree(grammar: Arc<AttributeGrammar>) -> TreeTransform {
    lexing(grammar.clone()).then(TreeBuilding::new(grammar))
}

/// The simplified tree, evaluated with the grammar's node hooks.
pub fn to_ast(grammar: Arc<AttributeGrammar>) -> TreeTransform {
    to_tree(grammar.clone())
        .then(AstSimplification::new())
        .then(Evaluation::new(grammar))
}

/// The symbol table. The empty program yields an empty table.
pub fn to_symbols(grammar: Arc<AttributeGrammar>) -> SymbolsTransform {
    let grammar = if grammar.declares(Attr::Scope) {
        grammar
    } else {
        Arc::new(semantic_grammar(&grammar))
    };
    to_ast(grammar).then(SemanticAnalysis::new())
}

/// Canonically formatted source, laid out by `config` unless the grammar already renders.
pub fn to_text(grammar: Arc<AttributeGrammar>, config: &CompilerConfig) -> TextTransform {
    let grammar = if grammar.declares(Attr::Render) {
        grammar
    } else {
        Arc::new(printer_grammar(&grammar, config))
    };
    to_tree(grammar.clone())
        .then(Evaluation::new(grammar))
        .then(Rendering::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::error::CompileError;
    use crate::jproc::language::definition::standard_tokenizer;
    use crate::jproc::language::semantic::Value;

    #[test]
    fn test_lexing_pipeline() {
        let tokens = lexing(standard_tokenizer().unwrap())
            .run(r#"{"&doc": "d"}"#.to_string())
            .unwrap();
        let names: Vec<&str> = tokens.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["lbrace", "doc_form", "colon", "string", "rbrace"]);
    }

    #[test]
    fn test_to_ast_carries_scope_when_declared() {
        let semantic = Arc::new(semantic_grammar(&standard_tokenizer().unwrap()));
        let tree = to_ast(semantic).run(r#"{"o": {"k": 1}}"#.to_string()).unwrap();
        assert_eq!(tree.to_sexp(), "(program (bind string (object (bind string number))))");
        let root = tree.root().unwrap();
        assert_eq!(tree.node(root).attrs().scope(), Some(""));
    }

    #[test]
    fn test_to_symbols_derives_semantic_grammar() {
        let symbols = to_symbols(standard_tokenizer().unwrap())
            .run(r#"{"o": {"k": true}}"#.to_string())
            .unwrap();
        assert_eq!(symbols.get("o.k"), Some(&Value::Boolean(true)));

        let empty = to_symbols(standard_tokenizer().unwrap())
            .run("{}".to_string())
            .unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_to_text_uses_config() {
        let config = CompilerConfig {
            indent_width: 1,
            trailing_newline: false,
        };
        let text = to_text(standard_tokenizer().unwrap(), &config)
            .run(r#"{"a":[1,[2]]}"#.to_string())
            .unwrap();
        assert_eq!(text, "{\n \"a\": [1, [2]]\n}");
    }

    #[test]
    fn test_pipelines_stop_at_invalid_input() {
        let err = to_text(standard_tokenizer().unwrap(), &CompilerConfig::default())
            .run("{\"a\": }".to_string())
            .unwrap_err();
        assert!(matches!(err, CompileError::Input(_)));
    }
}
