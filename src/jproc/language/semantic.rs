//! Semantic pass
//!
//! Builds the [`SymbolTable`] of a program from its simplified tree. Names are dotted paths
//! of the enclosing binds, carried down the tree by the inherited `Scope` attribute:
//!
//! ```text
//! {"db": {"host": "h", "&doc": "d"}, "&let": ["port"]}
//!
//!   db       => Scope
//!   db.host  => String("h")
//!   db.&doc  => Procedure(doc, ["d"])
//!   port     => Unbound
//! ```
//!
//! The pass first classifies every value node bottom-up, then walks the tree top-down:
//! binds store their value (`Scope` for a plain object), `&let` pre-registers its
//! parameters, `&doc` documents its scope, and an object holding `&ref` makes its bind a
//! variable reference.

use super::ast::pair_value;
use super::definition::Sym;
use crate::jproc::attributes::{Attr, AttrDecl, AttributeGrammar};
use crate::jproc::tree::{NodeId, ParseTree};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

pub const SEMANTIC: &str = "semantic";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialForm {
    Let,
    Ref,
    Doc,
}

impl SpecialForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialForm::Let => "let",
            SpecialForm::Ref => "ref",
            SpecialForm::Doc => "doc",
        }
    }
}

impl fmt::Display for SpecialForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    VariableRef(String),
    Procedure { form: SpecialForm, args: Vec<Value> },
    /// `null`, or a `&let` parameter nothing has bound yet
    Unbound,
    /// An object value; its members are bound under the object's name
    Scope,
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::VariableRef(_) => "variable reference",
            Value::Procedure { .. } => "procedure",
            Value::Unbound => "null",
            Value::Scope => "object",
        }
    }
}

/// Insertion-ordered map from dotted names to values.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SymbolTable {
    entries: IndexMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Binds `name`, keeping its position when it was registered before.
    pub fn insert(&mut self, name: String, value: Value) {
        self.entries.insert(name, value);
    }

    /// Registers `name` as unbound unless it already has a value.
    pub fn register_unbound(&mut self, name: String) {
        self.entries.entry(name).or_insert(Value::Unbound);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticError {
    /// A `&let` parameter that is not a string
    InvalidParameter { found: String, line: Option<usize> },
    MisplacedSpecialForm { form: SpecialForm, line: Option<usize> },
    MalformedLiteral { lexeme: String, line: Option<usize> },
    /// The tree was not evaluated with a grammar declaring `Scope`
    MissingScope { node: String },
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemanticError::InvalidParameter { found, line } => {
                write!(f, "&let parameters must be strings, found {}", found)?;
                write_line(f, *line)
            }
            SemanticError::MisplacedSpecialForm { form, line } => {
                write!(f, "&{} cannot appear at the top level", form)?;
                write_line(f, *line)
            }
            SemanticError::MalformedLiteral { lexeme, line } => {
                write!(f, "malformed literal {}", lexeme)?;
                write_line(f, *line)
            }
            SemanticError::MissingScope { node } => {
                write!(f, "no scope evaluated for '{}'", node)
            }
        }
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, line: Option<usize>) -> fmt::Result {
    match line {
        Some(line) => write!(f, " at line {}", line),
        None => Ok(()),
    }
}

impl std::error::Error for SemanticError {}

/// Derives the semantic grammar from `base`.
///
/// `Scope` is evaluated on the simplified tree: the root gets the empty scope, the value
/// of a bind gets the bind's scope extended by its key, and every other node inherits its
/// parent's scope.
pub fn semantic_grammar(base: &AttributeGrammar) -> AttributeGrammar {
    base.derive(SEMANTIC).declare(
        AttrDecl::inherited(Attr::Scope).on_node(|tree, id| Some(scope_for(tree, id).into())),
    )
}

fn scope_for(tree: &ParseTree, id: NodeId) -> String {
    let Some(parent) = tree.parent(id) else {
        return String::new();
    };
    let above = tree.node(parent).attrs().scope().unwrap_or_default();
    if tree.node(parent).name() == Sym::Bind.as_str() && pair_value(tree, parent) == Some(id) {
        let key = tree
            .children(parent)
            .first()
            .and_then(|&k| decode_string(tree.node(k).lexeme()).ok());
        if let Some(key) = key {
            return join(above, &key);
        }
    }
    above.to_string()
}

pub fn join(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", scope, name)
    }
}

/// Builds the symbol table of a simplified tree evaluated with `Scope`.
pub fn analyze(tree: &ParseTree) -> Result<SymbolTable, SemanticError> {
    let values = classify(tree)?;
    let mut table = SymbolTable::new();

    for id in tree.pre_order() {
        let node = tree.node(id);
        match Sym::from_name(node.name()) {
            Some(Sym::Bind) => {
                let key = pair_key(tree, id)?;
                let value = pair_value(tree, id).and_then(|v| values.get(&v));
                if let Some(value) = value {
                    table.insert(join(scope_of(tree, id)?, &key), value.clone());
                }
            }
            Some(Sym::LetMember) => {
                let scope = scope_of(tree, id)?;
                let params = match values.get(&id) {
                    Some(Value::Procedure { args, .. }) => args.as_slice(),
                    _ => &[],
                };
                for param in params {
                    match param {
                        Value::String(name) => table.register_unbound(join(scope, name)),
                        other => {
                            return Err(SemanticError::InvalidParameter {
                                found: other.kind().to_string(),
                                line: line_of(tree, id),
                            })
                        }
                    }
                }
            }
            Some(Sym::DocMember) => {
                if let Some(doc) = values.get(&id) {
                    table.insert(join(scope_of(tree, id)?, "&doc"), doc.clone());
                }
            }
            Some(Sym::RefMember) if node.parent() == tree.root() => {
                return Err(SemanticError::MisplacedSpecialForm {
                    form: SpecialForm::Ref,
                    line: line_of(tree, id),
                });
            }
            _ => {}
        }
    }

    log::debug!("symbol table with {} entries", table.len());
    Ok(table)
}

/// Values of literal, array, form and object nodes, computed bottom-up.
fn classify(tree: &ParseTree) -> Result<HashMap<NodeId, Value>, SemanticError> {
    let mut values = HashMap::new();
    for id in tree.post_order() {
        let node = tree.node(id);
        let malformed = || SemanticError::MalformedLiteral {
            lexeme: node.lexeme().to_string(),
            line: node.attrs().line(),
        };
        let form_arg = |values: &HashMap<NodeId, Value>| {
            pair_value(tree, id)
                .and_then(|v| values.get(&v))
                .cloned()
                .into_iter()
                .collect::<Vec<_>>()
        };

        let value = match Sym::from_name(node.name()) {
            Some(Sym::String | Sym::EmptyString) => {
                Value::String(decode_string(node.lexeme()).map_err(|_| malformed())?)
            }
            Some(Sym::Number) => Value::Number(node.lexeme().parse().map_err(|_| malformed())?),
            Some(Sym::Boolean) => Value::Boolean(node.lexeme() == "true"),
            Some(Sym::Null) => Value::Unbound,
            Some(Sym::Array | Sym::EmptyArray) => {
                let json: serde_json::Value =
                    serde_json::from_str(node.lexeme()).map_err(|_| malformed())?;
                from_json(json).ok_or_else(malformed)?
            }
            Some(Sym::LetMember) => {
                let args = match pair_value(tree, id).and_then(|v| values.get(&v)) {
                    Some(Value::List(items)) => items.clone(),
                    _ => Vec::new(),
                };
                Value::Procedure {
                    form: SpecialForm::Let,
                    args,
                }
            }
            Some(Sym::RefMember) => Value::Procedure {
                form: SpecialForm::Ref,
                args: form_arg(&values),
            },
            Some(Sym::DocMember) => Value::Procedure {
                form: SpecialForm::Doc,
                args: form_arg(&values),
            },
            Some(Sym::Object) => {
                let target = tree.children(id).iter().find_map(|c| match values.get(c) {
                    Some(Value::Procedure {
                        form: SpecialForm::Ref,
                        args,
                    }) => args.first().and_then(Value::as_str).map(str::to_string),
                    _ => None,
                });
                target.map_or(Value::Scope, Value::VariableRef)
            }
            Some(Sym::EmptyObject) => Value::Scope,
            _ => continue,
        };
        values.insert(id, value);
    }
    Ok(values)
}

fn from_json(json: serde_json::Value) -> Option<Value> {
    Some(match json {
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => Value::Number(n.as_f64()?),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_json).collect::<Option<_>>()?)
        }
        serde_json::Value::Null => Value::Unbound,
        serde_json::Value::Object(_) => return None,
    })
}

fn decode_string(lexeme: &str) -> Result<String, serde_json::Error> {
    serde_json::from_str(lexeme)
}

fn pair_key(tree: &ParseTree, pair: NodeId) -> Result<String, SemanticError> {
    let key = tree.children(pair).first().map(|&k| tree.node(k));
    let lexeme = key.map_or("", |k| k.lexeme());
    decode_string(lexeme).map_err(|_| SemanticError::MalformedLiteral {
        lexeme: lexeme.to_string(),
        line: line_of(tree, pair),
    })
}

fn scope_of(tree: &ParseTree, id: NodeId) -> Result<&str, SemanticError> {
    tree.node(id)
        .attrs()
        .scope()
        .ok_or_else(|| SemanticError::MissingScope {
            node: tree.node(id).name().to_string(),
        })
}

fn line_of(tree: &ParseTree, id: NodeId) -> Option<usize> {
    tree.first_leaf(id)
        .and_then(|leaf| tree.node(leaf).attrs().line())
}
