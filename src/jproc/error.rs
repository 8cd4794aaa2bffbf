//! Compilation errors
//!
//! Every layer reports its own error type; [`CompileError`] wraps them all and is the error
//! type of every pipeline stage, so `?` works across layer boundaries.

use crate::jproc::attributes::Attr;
use crate::jproc::config::ConfigError;
use crate::jproc::grammar::GrammarError;
use crate::jproc::input::InputError;
use crate::jproc::language::semantic::SemanticError;
use crate::jproc::lexing::LexError;
use crate::jproc::parsing::ParseError;
use crate::jproc::tree::TreeError;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Input(InputError),
    Grammar(GrammarError),
    Lex(LexError),
    Parse(ParseError),
    Tree(TreeError),
    Semantic(SemanticError),
    Config(ConfigError),
    /// A `"&name"` key whose name is not a known special form
    UnknownSpecialForm { name: String, line: Option<usize> },
    /// The tree root carries no value for an attribute the stage needs
    MissingAttribute { attr: Attr, rule: String },
    /// Serializing an output failed
    Output(String),
}

impl CompileError {
    /// Source line the error points at, when known.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Input(InputError::Malformed { line, .. }) => Some(*line),
            CompileError::Lex(LexError::UnexpectedCharacter { line, .. })
            | CompileError::Lex(LexError::UnterminatedInput { line, .. }) => Some(*line),
            CompileError::Parse(err) => err.line(),
            CompileError::UnknownSpecialForm { line, .. } => *line,
            CompileError::Semantic(
                SemanticError::InvalidParameter { line, .. }
                | SemanticError::MisplacedSpecialForm { line, .. }
                | SemanticError::MalformedLiteral { line, .. },
            ) => *line,
            _ => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Input(err) => write!(f, "Invalid input: {}", err),
            CompileError::Grammar(err) => write!(f, "Grammar error: {}", err),
            CompileError::Lex(err) => write!(f, "Lexing failed: {}", err),
            CompileError::Parse(err) => write!(f, "Parsing failed: {}", err),
            CompileError::Tree(err) => write!(f, "Tree transform failed: {}", err),
            CompileError::Semantic(err) => write!(f, "Semantic error: {}", err),
            CompileError::Config(err) => write!(f, "Configuration error: {}", err),
            CompileError::UnknownSpecialForm { name, line } => {
                write!(f, "Unknown special form '&{}'", name)?;
                match line {
                    Some(line) => write!(f, " at line {}", line),
                    None => Ok(()),
                }
            }
            CompileError::MissingAttribute { attr, rule } => {
                write!(f, "No '{}' attribute on '{}'", attr, rule)
            }
            CompileError::Output(msg) => write!(f, "Output failed: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Input(err) => Some(err),
            CompileError::Grammar(err) => Some(err),
            CompileError::Lex(err) => Some(err),
            CompileError::Parse(err) => Some(err),
            CompileError::Tree(err) => Some(err),
            CompileError::Semantic(err) => Some(err),
            CompileError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InputError> for CompileError {
    fn from(err: InputError) -> Self {
        CompileError::Input(err)
    }
}

impl From<GrammarError> for CompileError {
    fn from(err: GrammarError) -> Self {
        CompileError::Grammar(err)
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> Self {
        CompileError::Lex(err)
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Parse(err)
    }
}

impl From<TreeError> for CompileError {
    fn from(err: TreeError) -> Self {
        CompileError::Tree(err)
    }
}

impl From<SemanticError> for CompileError {
    fn from(err: SemanticError) -> Self {
        CompileError::Semantic(err)
    }
}

impl From<ConfigError> for CompileError {
    fn from(err: ConfigError) -> Self {
        CompileError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_form_display() {
        let err = CompileError::UnknownSpecialForm {
            name: "unknown".into(),
            line: Some(3),
        };
        assert_eq!(err.to_string(), "Unknown special form '&unknown' at line 3");
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_wrapped_errors_keep_their_line() {
        let err: CompileError = LexError::UnterminatedInput {
            mode: "string".into(),
            line: 7,
        }
        .into();
        assert_eq!(err.line(), Some(7));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_missing_attribute_display() {
        let err = CompileError::MissingAttribute {
            attr: Attr::Render,
            rule: "document".into(),
        };
        assert_eq!(err.to_string(), "No 'render' attribute on 'document'");
        assert_eq!(err.line(), None);
    }
}
