//! Compiler entry points
//!
//! ```text
//! source ─ check ─ scan ─ fold ─ forms ─ parse ─┬─ simplify ─ Scope ─ analyze ─> Environment
//!                                               └─ Render ──────────────────────> text
//! ```
//!
//! Every entry point takes the attribute grammar to evaluate. `compile` needs `Scope` and
//! `render` needs `Render`; when the grammar passed in does not declare them, the semantic
//! or printer grammar is derived from it on the fly.

use crate::jproc::attributes::{Attr, AttributeGrammar};
use crate::jproc::config::CompilerConfig;
use crate::jproc::error::CompileError;
use crate::jproc::input::{self, InputKind};
use crate::jproc::language::semantic::{self, SymbolTable};
use crate::jproc::language::{ast, printer};
use crate::jproc::lexing::Token;
use crate::jproc::tree::ParseTree;
use std::borrow::Cow;

pub use crate::jproc::parsing::build_tree;

/// The result of compiling a non-empty program.
#[derive(Debug, Clone)]
pub struct Environment {
    /// The source the environment was compiled from
    pub source: String,
    /// The simplified tree, evaluated with `Scope`
    pub tree: ParseTree,
    pub symbols: SymbolTable,
}

/// Scans, folds and validates special forms.
///
/// Token attributes are the ones `grammar` declares token hooks for.
pub fn tokenize(source: &str, grammar: &AttributeGrammar) -> Result<Vec<Token>, CompileError> {
    let language = grammar.language();
    let scanned = language.scan(source, grammar)?;
    let count = scanned.len();
    let tokens = language.fold(scanned, grammar)?;
    log::debug!(
        "{}: {} scanned tokens folded into {}",
        grammar.name(),
        count,
        tokens.len()
    );
    language.check_forms(&tokens)?;
    Ok(tokens)
}

/// Compiles `source` into its symbol table.
///
/// Returns `Ok(None)` for the empty program `{}`.
pub fn compile(
    source: &str,
    grammar: &AttributeGrammar,
) -> Result<Option<Environment>, CompileError> {
    if input::check(source)? == InputKind::Empty {
        log::debug!("empty program, nothing to compile");
        return Ok(None);
    }

    let grammar = semantic_view(grammar);
    let tokens = tokenize(source, &grammar)?;
    let mut tree = build_tree(&tokens, grammar.language().program())?;
    ast::simplify(&mut tree)?;
    grammar.evaluate_tree(&mut tree);
    let symbols = semantic::analyze(&tree)?;

    Ok(Some(Environment {
        source: source.to_string(),
        tree,
        symbols,
    }))
}

/// Renders `source` in canonical layout.
pub fn render(source: &str, grammar: &AttributeGrammar) -> Result<String, CompileError> {
    input::check(source)?;
    let grammar = printer_view(grammar);
    let tokens = tokenize(source, &grammar)?;
    let mut tree = build_tree(&tokens, grammar.language().program())?;
    grammar.evaluate_tree(&mut tree);
    rendered_text(&tree)
}

/// Renders the source an environment was compiled from.
pub fn generate_code(
    env: &Environment,
    grammar: &AttributeGrammar,
) -> Result<String, CompileError> {
    render(&env.source, grammar)
}

/// The `Render` attribute of the root of an evaluated tree.
pub fn rendered_text(tree: &ParseTree) -> Result<String, CompileError> {
    let root = tree.root().map(|id| tree.node(id));
    match root.and_then(|node| node.attrs().render()) {
        Some(text) => Ok(text.to_string()),
        None => Err(CompileError::MissingAttribute {
            attr: Attr::Render,
            rule: root.map_or_else(String::new, |node| node.name().to_string()),
        }),
    }
}

fn semantic_view(grammar: &AttributeGrammar) -> Cow<'_, AttributeGrammar> {
    if grammar.declares(Attr::Scope) {
        Cow::Borrowed(grammar)
    } else {
        Cow::Owned(semantic::semantic_grammar(grammar))
    }
}

fn printer_view(grammar: &AttributeGrammar) -> Cow<'_, AttributeGrammar> {
    if grammar.declares(Attr::Render) {
        Cow::Borrowed(grammar)
    } else {
        Cow::Owned(printer::printer_grammar(grammar, &CompilerConfig::default()))
    }
}
