//! Special-form validation
//!
//! Special forms are quoted identifiers starting with `&` in key position (`"&let"`,
//! `"&ref"`, `"&doc"`). The scanner recognizes any `"&ident"`; identifiers that are not a
//! known form keep the catch-all terminal name and are rejected here, after folding.

use super::token::Token;
use crate::jproc::error::CompileError;

/// Fails on the first token named `unknown_terminal`.
pub fn check_special_forms(tokens: &[Token], unknown_terminal: &str) -> Result<(), CompileError> {
    match tokens.iter().find(|t| t.name == unknown_terminal) {
        Some(token) => Err(CompileError::UnknownSpecialForm {
            name: form_name(&token.lexeme).to_string(),
            line: token.line(),
        }),
        None => Ok(()),
    }
}

/// `"&name"` → `name`
pub fn form_name(lexeme: &str) -> &str {
    lexeme.trim_matches('"').trim_start_matches('&')
}
