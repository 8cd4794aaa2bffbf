//! Pipeline stages
//!
//! Each stage wraps one compilation step. Stages that depend on the language or its
//! attribute declarations hold the attribute grammar they run with.

use crate::jproc::attributes::AttributeGrammar;
use crate::jproc::compiler::rendered_text;
use crate::jproc::error::CompileError;
use crate::jproc::input;
use crate::jproc::language::ast;
use crate::jproc::language::semantic::{analyze, SymbolTable};
use crate::jproc::lexing::Token;
use crate::jproc::parsing::build_tree;
use crate::jproc::transforms::Runnable;
use crate::jproc::tree::ParseTree;
use std::sync::Arc;

/// Rejects text that is not a JSON object, passing valid text through.
pub struct InputCheck;

impl InputCheck {
    pub fn new() -> Self {
        InputCheck
    }
}

impl Default for InputCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<String, String> for InputCheck {
    fn run(&self, input: String) -> Result<String, CompileError> {
        input::check(&input)?;
        Ok(input)
    }
}

/// Modal scanning with the grammar's token hooks.
pub struct Tokenization {
    grammar: Arc<AttributeGrammar>,
}

impl Tokenization {
    pub fn new(grammar: Arc<AttributeGrammar>) -> Self {
        Tokenization { grammar }
    }
}

impl Runnable<String, Vec<Token>> for Tokenization {
    fn run(&self, input: String) -> Result<Vec<Token>, CompileError> {
        Ok(self.grammar.language().scan(&input, self.grammar.as_ref())?)
    }
}

/// Applies the language's fold plan, combining attributes by the grammar's fold policies.
pub struct Folding {
    grammar: Arc<AttributeGrammar>,
}

impl Folding {
    pub fn new(grammar: Arc<AttributeGrammar>) -> Self {
        Folding { grammar }
    }
}

impl Runnable<Vec<Token>, Vec<Token>> for Folding {
    fn run(&self, input: Vec<Token>) -> Result<Vec<Token>, CompileError> {
        Ok(self.grammar.language().fold(input, self.grammar.as_ref())?)
    }
}

/// Fails on the first unknown special form.
pub struct SpecialFormCheck {
    grammar: Arc<AttributeGrammar>,
}

impl SpecialFormCheck {
    pub fn new(grammar: Arc<AttributeGrammar>) -> Self {
        SpecialFormCheck { grammar }
    }
}

impl Runnable<Vec<Token>, Vec<Token>> for SpecialFormCheck {
    fn run(&self, input: Vec<Token>) -> Result<Vec<Token>, CompileError> {
        self.grammar.language().check_forms(&input)?;
        Ok(input)
    }
}

/// Parses folded tokens with the program grammar.
pub struct TreeBuilding {
    grammar: Arc<AttributeGrammar>,
}

impl TreeBuilding {
    pub fn new(grammar: Arc<AttributeGrammar>) -> Self {
        TreeBuilding { grammar }
    }
}

impl Runnable<Vec<Token>, ParseTree> for TreeBuilding {
    fn run(&self, input: Vec<Token>) -> Result<ParseTree, CompileError> {
        let tree = build_tree(&input, self.grammar.language().program())?;
        log::debug!("built parse tree with {} nodes", tree.len());
        Ok(tree)
    }
}

pub struct AstSimplification;

impl AstSimplification {
    pub fn new() -> Self {
        AstSimplification
    }
}

impl Default for AstSimplification {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<ParseTree, ParseTree> for AstSimplification {
    fn run(&self, mut input: ParseTree) -> Result<ParseTree, CompileError> {
        ast::simplify(&mut input)?;
        Ok(input)
    }
}

/// Evaluates the grammar's node hooks over the tree.
pub struct Evaluation {
    grammar: Arc<AttributeGrammar>,
}

impl Evaluation {
    pub fn new(grammar: Arc<AttributeGrammar>) -> Self {
        Evaluation { grammar }
    }
}

impl Runnable<ParseTree, ParseTree> for Evaluation {
    fn run(&self, mut input: ParseTree) -> Result<ParseTree, CompileError> {
        self.grammar.evaluate_tree(&mut input);
        Ok(input)
    }
}

/// Reads the rendered text off the root of an evaluated tree.
pub struct Rendering;

impl Rendering {
    pub fn new() -> Self {
        Rendering
    }
}

impl Default for Rendering {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<ParseTree, String> for Rendering {
    fn run(&self, input: ParseTree) -> Result<String, CompileError> {
        rendered_text(&input)
    }
}

/// Builds the symbol table of a simplified tree evaluated with `Scope`.
pub struct SemanticAnalysis;

impl SemanticAnalysis {
    pub fn new() -> Self {
        SemanticAnalysis
    }
}

impl Default for SemanticAnalysis {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<ParseTree, SymbolTable> for SemanticAnalysis {
    fn run(&self, input: ParseTree) -> Result<SymbolTable, CompileError> {
        Ok(analyze(&input)?)
    }
}
