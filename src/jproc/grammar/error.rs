//! Grammar construction errors

use crate::jproc::ebnf::RuleKind;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule references a name that was never defined
    MissingRule {
        name: String,
        referenced_by: Option<String>,
    },
    /// A partial rule has no defined language and cannot be turned into a terminal
    CannotMakeTerminal { name: String },
    DuplicateRule { name: String },
    InvalidPattern { name: String, message: String },
    UnknownTopRule { name: String },
    UnknownLexMode { name: String },
    /// A rule was used where a different production shape is required
    UnexpectedRuleKind {
        name: String,
        expected: RuleKind,
        found: RuleKind,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::MissingRule {
                name,
                referenced_by: Some(by),
            } => write!(f, "Missing rule '{}' (referenced by '{}')", name, by),
            GrammarError::MissingRule {
                name,
                referenced_by: None,
            } => write!(f, "Missing rule '{}'", name),
            GrammarError::CannotMakeTerminal { name } => {
                write!(f, "Cannot make terminal from partial rule '{}'", name)
            }
            GrammarError::DuplicateRule { name } => write!(f, "Rule '{}' is already defined", name),
            GrammarError::InvalidPattern { name, message } => {
                write!(f, "Invalid pattern for terminal '{}': {}", name, message)
            }
            GrammarError::UnknownTopRule { name } => write!(f, "Unknown top rule '{}'", name),
            GrammarError::UnknownLexMode { name } => write!(f, "Unknown lexer mode '{}'", name),
            GrammarError::UnexpectedRuleKind {
                name,
                expected,
                found,
            } => write!(
                f,
                "Rule '{}' is a {} but a {} was expected",
                name, found, expected
            ),
        }
    }
}

impl std::error::Error for GrammarError {}
