//! Tokens
//!
//! A token is a named lexeme plus the attributes synthesized for it while scanning (line,
//! indentation, rendering). Folding combines runs of tokens into new tokens, so a token's
//! lexeme can span many scanned characters.

use crate::jproc::attributes::{Attr, AttrKind, AttrValue, Attributes};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub name: String,
    pub lexeme: String,
    #[serde(skip_serializing_if = "Attributes::is_empty")]
    pub attrs: Attributes,
}

impl Token {
    pub fn new(name: impl Into<String>, lexeme: impl Into<String>) -> Self {
        Token {
            name: name.into(),
            lexeme: lexeme.into(),
            attrs: Attributes::new(),
        }
    }

    pub fn with_attr(mut self, attr: Attr, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(AttrKind::Synthesized, attr, value.into());
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn line(&self) -> Option<usize> {
        self.attrs.line()
    }

    pub fn indent(&self) -> Option<usize> {
        self.attrs.indent()
    }

    pub fn render(&self) -> Option<&str> {
        self.attrs.render()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.name, self.lexeme)
    }
}
