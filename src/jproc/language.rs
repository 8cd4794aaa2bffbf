//! Languages
//!
//! A [`Language`] bundles everything that is fixed once a surface syntax is defined: the
//! token grammar the scanner and the folds run against, the program grammar the parser
//! runs against, the compiled lexer, the fold plan, and the catch-all terminal used for
//! unknown special forms. A language is immutable and shared through `Arc` by every
//! attribute grammar layered on top of it.
//!
//! The concrete procedure language lives in [`definition`]; [`printer`], [`ast`] and
//! [`semantic`] implement its renderings.

pub mod ast;
pub mod definition;
pub mod printer;
pub mod semantic;

use crate::jproc::error::CompileError;
use crate::jproc::grammar::{Grammar, GrammarError};
use crate::jproc::lexing::{
    check_special_forms, FoldPlan, LexError, Lexer, LexerSpec, Token, TokenCombiner, TokenHooks,
};

#[derive(Debug, Clone)]
pub struct Language {
    name: String,
    tokens: Grammar,
    program: Grammar,
    lexer: Lexer,
    folds: FoldPlan,
    unknown_form: Option<String>,
}

impl Language {
    /// Compiles the lexer and checks the fold plan against the token grammar.
    ///
    /// # Errors
    ///
    /// Any [`GrammarError`] raised while resolving mode terminals or fold rules.
    pub fn new(
        name: &str,
        tokens: Grammar,
        program: Grammar,
        lexer: &LexerSpec,
        folds: FoldPlan,
    ) -> Result<Self, GrammarError> {
        let lexer = Lexer::new(&tokens, lexer)?;
        folds.mappers(&tokens)?;
        Ok(Language {
            name: name.to_string(),
            tokens,
            program,
            lexer,
            folds,
            unknown_form: None,
        })
    }

    /// Names the terminal that marks an unknown special form.
    pub fn with_unknown_form(mut self, terminal: &str) -> Result<Self, GrammarError> {
        self.tokens.rule(terminal)?;
        self.unknown_form = Some(terminal.to_string());
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &Grammar {
        &self.tokens
    }

    pub fn program(&self) -> &Grammar {
        &self.program
    }

    pub fn lexer(&self) -> &Lexer {
        &self.lexer
    }

    pub fn folds(&self) -> &FoldPlan {
        &self.folds
    }

    pub fn unknown_form(&self) -> Option<&str> {
        self.unknown_form.as_deref()
    }

    pub fn scan(&self, source: &str, hooks: &dyn TokenHooks) -> Result<Vec<Token>, LexError> {
        self.lexer.lex(source, hooks)
    }

    pub fn fold(
        &self,
        tokens: Vec<Token>,
        combiner: &dyn TokenCombiner,
    ) -> Result<Vec<Token>, GrammarError> {
        self.folds.run(&self.tokens, tokens, combiner)
    }

    pub fn check_forms(&self, tokens: &[Token]) -> Result<(), CompileError> {
        match &self.unknown_form {
            Some(terminal) => check_special_forms(tokens, terminal),
            None => Ok(()),
        }
    }
}
