//! # jproc
//!
//! A grammar-driven compiler front-end for a JSON-superset procedure language.
//!
//! Source text is lexed by a modal scanner, folded into higher-level tokens, parsed by an
//! LL(1) recursive-descent parser into an arena parse tree, and then evaluated by attribute
//! grammars into either a symbol table or canonically formatted source.
//!
//! ## Testing
//!
//! Shared fixtures (the reference sample program, token factories) live in the
//! [testing module](jproc::testing).

pub mod jproc;

pub use jproc::compiler::{build_tree, compile, generate_code, render, tokenize, Environment};
pub use jproc::error::CompileError;
