//! Lexing
//!
//! Tokenization runs in three passes:
//!
//! 1. Scanning (`lexer`): a modal regex scanner turns source text into primitive tokens,
//!    synthesizing line and indentation attributes through token hooks.
//! 2. Folding (`folding`): a fold plan merges runs of primitive tokens into the tokens the
//!    parse grammar consumes (strings, arrays, empty containers).
//! 3. Validation (`special_forms`): unknown `&` forms are rejected.

pub mod folding;
pub mod lexer;
pub mod special_forms;
pub mod token;

pub use folding::{ConcatLexemes, FoldPlan, FoldStep, TokenCombiner, TokenMapper};
pub use lexer::{
    LexAction, LexError, LexMode, Lexer, LexerSpec, ModeRule, NoHooks, ScanContext, TokenHooks,
};
pub use special_forms::check_special_forms;
pub use token::Token;
