//! Main module for jproc library functionality
//!
//! The layers, bottom-up:
//!
//! 1. `ebnf` and `rule`: the EBNF rule model.
//! 2. `grammar`: the `RuleSeq` builder, FIRST/FOLLOW computation and finalized grammars.
//! 3. `lexing`: modal scanning, token folding and special-form validation.
//! 4. `tree` and `parsing`: the arena parse tree and the LL(1) parser that fills it.
//! 5. `attributes`: attribute declarations evaluated on tokens and tree nodes.
//! 6. `language`: the concrete procedure language (grammars, printer, semantic pass).
//! 7. `transforms`, `executor` and `compiler`: composable stages and entry points.

pub mod attributes;
pub mod compiler;
pub mod config;
pub mod ebnf;
pub mod error;
pub mod executor;
pub mod grammar;
pub mod input;
pub mod language;
pub mod lexing;
pub mod parsing;
pub mod rule;
pub mod testing;
pub mod transforms;
pub mod tree;
