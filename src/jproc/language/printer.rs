//! Pretty-printer grammar
//!
//! Renders a parse tree back to canonical source text through the synthesized `Render`
//! attribute. Tokens render as their lexeme while scanning (array dividers become `", "`)
//! and folded tokens concatenate their parts' renderings, so arrays come out inline. Inner
//! nodes then render bottom-up:
//!
//! ```text
//! {                       program/object: "{\n" members "\n" pad "}"
//!   "a": 1,               member pair:    pad key ": " value
//!   "b": {                next_member:    ",\n" member
//!     "c": [1, 2]
//!   }
//! }                       document:       program "\n"
//! ```
//!
//! The pad of a member or closing brace comes from the `Indent` of its first token, which
//! is the structural nesting depth the scanner recorded.

use super::definition::Sym;
use crate::jproc::attributes::{Attr, AttrDecl, AttributeGrammar, FoldPolicy};
use crate::jproc::config::CompilerConfig;
use crate::jproc::lexing::Token;
use crate::jproc::tree::{NodeId, ParseTree};

pub const PRINTER: &str = "printer";

/// Derives the printer from `base`, which must carry `Indent` on its tokens.
pub fn printer_grammar(base: &AttributeGrammar, config: &CompilerConfig) -> AttributeGrammar {
    let config = config.clone();
    base.derive(PRINTER).declare(
        AttrDecl::synthesized(Attr::Render)
            .fold(FoldPolicy::Concat)
            .on_token(|token, _| Some(render_token(token).into()))
            .on_node(move |tree, id| Some(render_node(tree, id, &config).into())),
    )
}

fn render_token(token: &Token) -> &str {
    if token.is(Sym::ItemDivider.as_str()) {
        ", "
    } else {
        &token.lexeme
    }
}

fn render_node(tree: &ParseTree, id: NodeId, config: &CompilerConfig) -> String {
    let node = tree.node(id);
    match Sym::from_name(node.name()) {
        Some(Sym::Document) => {
            let mut text = child(tree, id, 0).to_string();
            if config.trailing_newline {
                text.push('\n');
            }
            text
        }
        Some(Sym::Program | Sym::Object) => format!(
            "{{\n{}\n{}}}",
            child(tree, id, 1),
            pad(tree, id, config)
        ),
        Some(Sym::Bind | Sym::LetMember | Sym::RefMember | Sym::DocMember) => format!(
            "{}{}: {}",
            pad(tree, id, config),
            child(tree, id, 0),
            child(tree, id, 2)
        ),
        Some(Sym::NextMember) => format!(",\n{}", child(tree, id, 1)),
        _ => node
            .children()
            .iter()
            .map(|&c| rendered(tree, c))
            .collect(),
    }
}

fn rendered(tree: &ParseTree, id: NodeId) -> &str {
    let node = tree.node(id);
    node.attrs().render().unwrap_or_else(|| node.lexeme())
}

fn child(tree: &ParseTree, id: NodeId, index: usize) -> &str {
    tree.children(id)
        .get(index)
        .map_or("", |&c| rendered(tree, c))
}

fn pad(tree: &ParseTree, id: NodeId, config: &CompilerConfig) -> String {
    let depth = tree
        .first_leaf(id)
        .and_then(|leaf| tree.node(leaf).attrs().indent())
        .unwrap_or(0);
    config.indent(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::compiler::render;
    use crate::jproc::language::definition::standard_tokenizer;

    fn printer(config: &CompilerConfig) -> AttributeGrammar {
        printer_grammar(&standard_tokenizer().unwrap(), config)
    }

    #[test]
    fn test_reformats_compact_source() {
        let text = render(
            r#"{"a":1,"b":[2,3],"c":{"d":[[true],[]],"e":{}}}"#,
            &printer(&CompilerConfig::default()),
        )
        .unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": 1,\n  \"b\": [2, 3],\n  \"c\": {\n    \"d\": [[true], []],\n    \"e\": {}\n  }\n}\n"
        );
    }

    #[test]
    fn test_indent_width_and_trailing_newline_follow_config() {
        let config = CompilerConfig {
            indent_width: 4,
            trailing_newline: false,
        };
        let text = render(r#"{"&doc": "x", "k": {"v": null}}"#, &printer(&config)).unwrap();
        assert_eq!(
            text,
            "{\n    \"&doc\": \"x\",\n    \"k\": {\n        \"v\": null\n    }\n}"
        );
    }

    #[test]
    fn test_empty_program_renders_braces() {
        let text = render("{ }", &printer(&CompilerConfig::default())).unwrap();
        assert_eq!(text, "{}\n");
    }
}
