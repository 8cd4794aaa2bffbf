//! Attribute keys, values and per-node attribute storage

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Well-known attribute names.
///
/// Attributes are keyed by this enum rather than by free-form strings so that a typo in a
/// hook is a compile error instead of a silently missing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attr {
    /// 1-based source line of the first character of a token
    Line,
    /// Structural nesting depth (braces and brackets) at a token
    Indent,
    /// Canonical source text produced by the printer grammar
    Render,
    /// Dotted path of the enclosing binds
    Scope,
}

impl Attr {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attr::Line => "line",
            Attr::Indent => "indent",
            Attr::Render => "render",
            Attr::Scope => "scope",
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an attribute flows up (from children and tokens) or down (from the parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    Synthesized,
    Inherited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    Int(usize),
    Text(String),
}

impl AttrValue {
    pub fn as_int(&self) -> Option<usize> {
        match self {
            AttrValue::Int(n) => Some(*n),
            AttrValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Int(_) => None,
        }
    }
}

impl From<usize> for AttrValue {
    fn from(n: usize) -> Self {
        AttrValue::Int(n)
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Text(s) => f.write_str(s),
        }
    }
}

/// Synthesized and inherited attributes of a token or tree node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attributes {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    synthesized: BTreeMap<Attr, AttrValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    inherited: BTreeMap<Attr, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: AttrKind, attr: Attr) -> Option<&AttrValue> {
        match kind {
            AttrKind::Synthesized => self.synthesized.get(&attr),
            AttrKind::Inherited => self.inherited.get(&attr),
        }
    }

    pub fn set(&mut self, kind: AttrKind, attr: Attr, value: AttrValue) {
        match kind {
            AttrKind::Synthesized => self.synthesized.insert(attr, value),
            AttrKind::Inherited => self.inherited.insert(attr, value),
        };
    }

    pub fn synthesized(&self, attr: Attr) -> Option<&AttrValue> {
        self.synthesized.get(&attr)
    }

    pub fn inherited(&self, attr: Attr) -> Option<&AttrValue> {
        self.inherited.get(&attr)
    }

    pub fn set_synthesized(&mut self, attr: Attr, value: impl Into<AttrValue>) {
        self.synthesized.insert(attr, value.into());
    }

    pub fn set_inherited(&mut self, attr: Attr, value: impl Into<AttrValue>) {
        self.inherited.insert(attr, value.into());
    }

    pub fn synthesized_iter(&self) -> impl Iterator<Item = (&Attr, &AttrValue)> {
        self.synthesized.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.synthesized.is_empty() && self.inherited.is_empty()
    }

    pub fn line(&self) -> Option<usize> {
        self.synthesized(Attr::Line).and_then(AttrValue::as_int)
    }

    pub fn indent(&self) -> Option<usize> {
        self.synthesized(Attr::Indent).and_then(AttrValue::as_int)
    }

    pub fn render(&self) -> Option<&str> {
        self.synthesized(Attr::Render).and_then(AttrValue::as_text)
    }

    pub fn scope(&self) -> Option<&str> {
        self.inherited(Attr::Scope).and_then(AttrValue::as_text)
    }
}
