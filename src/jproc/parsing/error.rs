//! Parse errors
//!
//! A [`ParseError`] names the rule that failed, what it expected, and the index of the
//! offending token. [`build_tree`](super::build_tree) attaches the full token sequence, which
//! lets the error reconstruct the offending source line:
//!
//! ```text
//! line 3:   "b" : [2, 3 "c"
//!                       ^^^
//! ```

use crate::jproc::lexing::Token;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    TerminalMismatch { expected: String, actual: String },
    UnmatchedFirstSet { expected: Vec<String>, actual: String },
    /// More than one alternative accepts the lookahead: the grammar is not LL(1)
    FirstSetsNotDisjoint { candidates: Vec<String>, actual: String },
    ExhaustedInput { expected: Vec<String> },
    TrailingTokens { actual: String },
    UnknownRule { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub rule: String,
    pub kind: ParseErrorKind,
    /// Index of the offending token (the token count for exhausted input)
    pub index: usize,
    tokens: Vec<Token>,
}

impl ParseError {
    pub fn new(rule: &str, kind: ParseErrorKind, index: usize) -> Self {
        ParseError {
            rule: rule.to_string(),
            kind,
            index,
            tokens: Vec::new(),
        }
    }

    /// Attaches the token sequence the error refers to.
    pub fn with_tokens(mut self, tokens: &[Token]) -> Self {
        self.tokens = tokens.to_vec();
        self
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn offending_token(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Line of the offending token, or of the last token when input ran out.
    pub fn line(&self) -> Option<usize> {
        self.offending_token()
            .or_else(|| self.tokens.last())
            .and_then(Token::line)
    }

    pub fn is_exhausted_input(&self) -> bool {
        matches!(self.kind, ParseErrorKind::ExhaustedInput { .. })
    }

    /// Reconstructs the offending line from the tokens on it and marks the offending token.
    ///
    /// Tokens are joined by single spaces, so the snippet shows token boundaries rather
    /// than the original spacing. Returns `None` without attached tokens or line numbers.
    pub fn snippet(&self) -> Option<String> {
        let line = self.line()?;
        let mut text = String::new();
        let mut marker = None;
        for (i, token) in self.tokens.iter().enumerate() {
            if token.line() != Some(line) {
                continue;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            if i == self.index {
                marker = Some((text.chars().count(), token.lexeme.chars().count().max(1)));
            }
            text.push_str(&token.lexeme);
        }
        let prefix = format!("line {}: ", line);
        let (start, width) = marker.unwrap_or((text.chars().count(), 1));
        Some(format!(
            "{}{}\n{}{}",
            prefix,
            text,
            " ".repeat(prefix.len() + start),
            "^".repeat(width)
        ))
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error in '{}': ", self.rule)?;
        match &self.kind {
            ParseErrorKind::TerminalMismatch { expected, actual } => {
                write!(f, "expected {}, found {}", expected, actual)?
            }
            ParseErrorKind::UnmatchedFirstSet { expected, actual } => {
                write!(f, "expected one of [{}], found {}", expected.join(", "), actual)?
            }
            ParseErrorKind::FirstSetsNotDisjoint { candidates, actual } => write!(
                f,
                "{} starts more than one alternative ({})",
                actual,
                candidates.join(", ")
            )?,
            ParseErrorKind::ExhaustedInput { expected } => {
                write!(f, "input ended, expected one of [{}]", expected.join(", "))?
            }
            ParseErrorKind::TrailingTokens { actual } => {
                write!(f, "unexpected {} after the end of the program", actual)?
            }
            ParseErrorKind::UnknownRule { name } => write!(f, "unknown rule '{}'", name)?,
        }
        if let Some(line) = self.line() {
            write!(f, " at line {}", line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::attributes::Attr;

    fn tok(name: &str, lexeme: &str, line: usize) -> Token {
        Token::new(name, lexeme).with_attr(Attr::Line, line)
    }

    #[test]
    fn test_snippet_marks_offending_token() {
        let tokens = vec![
            tok("lbrace", "{", 1),
            tok("string", "\"a\"", 2),
            tok("number", "1", 2),
        ];
        let err = ParseError::new(
            "bind",
            ParseErrorKind::TerminalMismatch {
                expected: "colon".into(),
                actual: "number".into(),
            },
            2,
        )
        .with_tokens(&tokens);

        assert_eq!(err.line(), Some(2));
        assert_eq!(err.snippet().unwrap(), "line 2: \"a\" 1\n            ^");
        assert!(err.to_string().contains("expected colon, found number at line 2"));
    }

    #[test]
    fn test_exhausted_input_points_past_last_token() {
        let tokens = vec![tok("lbrace", "{", 1)];
        let err = ParseError::new(
            "program",
            ParseErrorKind::ExhaustedInput {
                expected: vec!["rbrace".into()],
            },
            1,
        )
        .with_tokens(&tokens);

        assert!(err.is_exhausted_input());
        assert_eq!(err.snippet().unwrap(), "line 1: {\n         ^");
    }
}
