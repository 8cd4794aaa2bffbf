//! Modal regex scanner
//!
//! The scanner is driven by a [`LexerSpec`]: a set of named modes, each listing terminal
//! names (whose regexes come from the token grammar) and what to do on a match. At every
//! position the longest match wins and ties go to the terminal listed first. Zero-length
//! matches never count.
//!
//! Modes form a stack. Pushing a mode enters a string or a bracketed region, popping leaves
//! it. Modes flagged as `nesting` count towards the structural depth handed to token hooks,
//! so indentation is derived from brace/bracket nesting and never from whitespace:
//!
//! ```text
//! {            depth 0 (before the push)
//!   "a": [     depth 1
//!   ]          depth 1 (after the pop)
//! }            depth 0
//! ```

use super::token::Token;
use crate::jproc::ebnf::Matcher;
use crate::jproc::grammar::{Grammar, GrammarError};
use std::fmt;

/// What the scanner does after matching a terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexAction {
    Emit,
    Skip,
    /// Emit the token, then enter the named mode
    Push(String),
    /// Emit the token, then return to the enclosing mode
    Pop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeRule {
    pub terminal: String,
    pub action: LexAction,
}

impl ModeRule {
    pub fn emit(terminal: &str) -> Self {
        Self::with(terminal, LexAction::Emit)
    }

    pub fn skip(terminal: &str) -> Self {
        Self::with(terminal, LexAction::Skip)
    }

    pub fn push(terminal: &str, mode: &str) -> Self {
        Self::with(terminal, LexAction::Push(mode.to_string()))
    }

    pub fn pop(terminal: &str) -> Self {
        Self::with(terminal, LexAction::Pop)
    }

    fn with(terminal: &str, action: LexAction) -> Self {
        ModeRule {
            terminal: terminal.to_string(),
            action,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexMode {
    pub name: String,
    /// Whether being inside this mode adds one level of structural depth
    pub nesting: bool,
    pub rules: Vec<ModeRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexerSpec {
    pub initial: String,
    pub modes: Vec<LexMode>,
}

/// Position information handed to token hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanContext {
    /// 1-based line of the token's first character
    pub line: usize,
    /// 1-based column of the token's first character
    pub column: usize,
    /// Structural nesting depth
    pub depth: usize,
}

/// Annotates tokens as they are scanned.
pub trait TokenHooks {
    fn annotate(&self, token: &mut Token, ctx: &ScanContext);
}

/// Hooks that leave tokens untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl TokenHooks for NoHooks {
    fn annotate(&self, _token: &mut Token, _ctx: &ScanContext) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    UnexpectedCharacter {
        found: char,
        line: usize,
        column: usize,
    },
    /// Input ended inside a string or bracketed region
    UnterminatedInput { mode: String, line: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnexpectedCharacter {
                found,
                line,
                column,
            } => write!(
                f,
                "Unexpected character {:?} at line {}, column {}",
                found, line, column
            ),
            LexError::UnterminatedInput { mode, line } => {
                write!(f, "Input ends inside {} (line {})", mode, line)
            }
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone)]
enum Action {
    Emit,
    Skip,
    Push(usize),
    Pop,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    terminal: String,
    matcher: Matcher,
    action: Action,
}

#[derive(Debug, Clone)]
struct CompiledMode {
    name: String,
    nesting: bool,
    rules: Vec<CompiledRule>,
}

/// A scanner compiled against a token grammar.
#[derive(Debug, Clone)]
pub struct Lexer {
    modes: Vec<CompiledMode>,
    initial: usize,
}

impl Lexer {
    /// Resolves every terminal of `spec` against `grammar`.
    ///
    /// # Errors
    ///
    /// `MissingRule` for an unknown terminal, `CannotMakeTerminal` for a rule without a
    /// regex, `UnknownLexMode` for a push into an undeclared mode.
    pub fn new(grammar: &Grammar, spec: &LexerSpec) -> Result<Self, GrammarError> {
        let mode_index = |name: &str| {
            spec.modes
                .iter()
                .position(|m| m.name == name)
                .ok_or_else(|| GrammarError::UnknownLexMode {
                    name: name.to_string(),
                })
        };

        let mut modes = Vec::with_capacity(spec.modes.len());
        for mode in &spec.modes {
            let mut rules = Vec::with_capacity(mode.rules.len());
            for mode_rule in &mode.rules {
                let rule = grammar.rule(&mode_rule.terminal)?;
                let matcher = rule
                    .matcher()
                    .filter(|_| rule.is_terminal())
                    .cloned()
                    .ok_or_else(|| GrammarError::CannotMakeTerminal {
                        name: rule.name().to_string(),
                    })?;
                let action = match &mode_rule.action {
                    LexAction::Emit => Action::Emit,
                    LexAction::Skip => Action::Skip,
                    LexAction::Push(target) => Action::Push(mode_index(target)?),
                    LexAction::Pop => Action::Pop,
                };
                rules.push(CompiledRule {
                    terminal: mode_rule.terminal.clone(),
                    matcher,
                    action,
                });
            }
            modes.push(CompiledMode {
                name: mode.name.clone(),
                nesting: mode.nesting,
                rules,
            });
        }

        Ok(Lexer {
            initial: mode_index(&spec.initial)?,
            modes,
        })
    }

    /// Scans `source` into tokens, running `hooks` on every emitted token.
    pub fn lex(&self, source: &str, hooks: &dyn TokenHooks) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut stack = vec![self.initial];
        let mut pos = 0;
        let mut line = 1;
        let mut column = 1;

        while pos < source.len() {
            let rest = &source[pos..];
            let mode = &self.modes[stack[stack.len() - 1]];
            let (len, rule) = longest_match(mode, rest).ok_or(LexError::UnexpectedCharacter {
                found: rest.chars().next().unwrap_or_default(),
                line,
                column,
            })?;

            let depth = match rule.action {
                Action::Push(target) => {
                    let depth = self.depth(&stack);
                    stack.push(target);
                    depth
                }
                Action::Pop => {
                    if stack.len() == 1 {
                        return Err(LexError::UnexpectedCharacter {
                            found: rest.chars().next().unwrap_or_default(),
                            line,
                            column,
                        });
                    }
                    stack.pop();
                    self.depth(&stack)
                }
                Action::Emit | Action::Skip => self.depth(&stack),
            };

            let lexeme = &rest[..len];
            if !matches!(rule.action, Action::Skip) {
                let mut token = Token::new(rule.terminal.as_str(), lexeme);
                hooks.annotate(&mut token, &ScanContext { line, column, depth });
                tokens.push(token);
            }

            for ch in lexeme.chars() {
                if ch == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
            }
            pos += len;
        }

        if stack.len() > 1 {
            return Err(LexError::UnterminatedInput {
                mode: self.modes[stack[stack.len() - 1]].name.clone(),
                line,
            });
        }
        log::trace!("scanned {} tokens over {} lines", tokens.len(), line);
        Ok(tokens)
    }

    fn depth(&self, stack: &[usize]) -> usize {
        stack.iter().filter(|&&m| self.modes[m].nesting).count()
    }
}

fn longest_match<'m>(mode: &'m CompiledMode, rest: &str) -> Option<(usize, &'m CompiledRule)> {
    let mut best: Option<(usize, &CompiledRule)> = None;
    for rule in &mode.rules {
        if let Some(len) = rule.matcher.prefix_len(rest).filter(|&len| len > 0) {
            if best.map_or(true, |(best_len, _)| len > best_len) {
                best = Some((len, rule));
            }
        }
    }
    best
}
