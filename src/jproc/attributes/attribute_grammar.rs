//! Attribute grammars
//!
//! An [`AttributeGrammar`] layers attribute declarations over a finalized [`Language`].
//! Each [`AttrDecl`] says which rules carry an attribute and how to compute it:
//!
//! - a *token hook* runs once per scanned token, with the scan position and nesting depth;
//! - a *node hook* runs once per tree node: synthesized attributes in post-order (children
//!   are done first), inherited ones in pre-order (the parent is done first);
//! - a *fold policy* decides what a folded token keeps of its parts' values.
//!
//! Several renderings of one language share the same grammars: [`AttributeGrammar::derive`]
//! copies the declarations into a sibling that reuses the `Arc<Language>`, so nothing is
//! re-analysed.

use super::attr::{Attr, AttrKind, AttrValue, Attributes};
use crate::jproc::language::Language;
use crate::jproc::lexing::{ScanContext, Token, TokenCombiner, TokenHooks};
use crate::jproc::tree::{NodeId, ParseTree};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

pub type TokenHook = Arc<dyn Fn(&Token, &ScanContext) -> Option<AttrValue> + Send + Sync>;
pub type NodeHook = Arc<dyn Fn(&ParseTree, NodeId) -> Option<AttrValue> + Send + Sync>;

/// What a folded token keeps of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldPolicy {
    /// Value of the first part that has one
    First,
    /// Concatenated text of every part, using the lexeme where a part has no value
    Concat,
    Drop,
}

/// The rule names an attribute applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSet {
    All,
    Only(BTreeSet<String>),
}

impl RuleSet {
    pub fn only(names: &[&str]) -> Self {
        RuleSet::Only(names.iter().map(|s| s.to_string()).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        match self {
            RuleSet::All => true,
            RuleSet::Only(names) => names.contains(name),
        }
    }
}

#[derive(Clone)]
pub struct AttrDecl {
    pub attr: Attr,
    pub kind: AttrKind,
    pub applies_to: RuleSet,
    pub token_hook: Option<TokenHook>,
    pub node_hook: Option<NodeHook>,
    pub fold: FoldPolicy,
}

impl AttrDecl {
    pub fn synthesized(attr: Attr) -> Self {
        Self::new(attr, AttrKind::Synthesized)
    }

    pub fn inherited(attr: Attr) -> Self {
        Self::new(attr, AttrKind::Inherited)
    }

    fn new(attr: Attr, kind: AttrKind) -> Self {
        AttrDecl {
            attr,
            kind,
            applies_to: RuleSet::All,
            token_hook: None,
            node_hook: None,
            fold: FoldPolicy::First,
        }
    }

    pub fn applies_to(mut self, rules: RuleSet) -> Self {
        self.applies_to = rules;
        self
    }

    pub fn on_token<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Token, &ScanContext) -> Option<AttrValue> + Send + Sync + 'static,
    {
        self.token_hook = Some(Arc::new(hook));
        self
    }

    pub fn on_node<F>(mut self, hook: F) -> Self
    where
        F: Fn(&ParseTree, NodeId) -> Option<AttrValue> + Send + Sync + 'static,
    {
        self.node_hook = Some(Arc::new(hook));
        self
    }

    pub fn fold(mut self, policy: FoldPolicy) -> Self {
        self.fold = policy;
        self
    }
}

impl fmt::Debug for AttrDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttrDecl")
            .field("attr", &self.attr)
            .field("kind", &self.kind)
            .field("applies_to", &self.applies_to)
            .field("token_hook", &self.token_hook.is_some())
            .field("node_hook", &self.node_hook.is_some())
            .field("fold", &self.fold)
            .finish()
    }
}

#[derive(Clone)]
pub struct AttributeGrammar {
    name: String,
    language: Arc<Language>,
    decls: Vec<AttrDecl>,
}

impl AttributeGrammar {
    pub fn new(name: &str, language: Arc<Language>) -> Self {
        AttributeGrammar {
            name: name.to_string(),
            language,
            decls: Vec::new(),
        }
    }

    /// Adds a declaration, replacing any earlier one for the same attribute.
    pub fn declare(mut self, decl: AttrDecl) -> Self {
        self.decls.retain(|d| d.attr != decl.attr);
        self.decls.push(decl);
        self
    }

    /// A sibling grammar over the same language with the same declarations.
    pub fn derive(&self, name: &str) -> Self {
        AttributeGrammar {
            name: name.to_string(),
            language: Arc::clone(&self.language),
            decls: self.decls.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn decls(&self) -> &[AttrDecl] {
        &self.decls
    }

    pub fn decl(&self, attr: Attr) -> Option<&AttrDecl> {
        self.decls.iter().find(|d| d.attr == attr)
    }

    pub fn declares(&self, attr: Attr) -> bool {
        self.decl(attr).is_some()
    }

    pub fn fold_policy(&self, attr: Attr) -> FoldPolicy {
        self.decl(attr).map_or(FoldPolicy::First, |d| d.fold)
    }

    /// Runs every node hook over a closed tree.
    ///
    /// Inherited attributes are evaluated first, top-down, then synthesized ones
    /// bottom-up. Leaves keep the attributes their tokens brought along.
    pub fn evaluate_tree(&self, tree: &mut ParseTree) {
        let hooked = |kind: AttrKind| -> Vec<(&AttrDecl, &NodeHook)> {
            self.decls
                .iter()
                .filter(|d| d.kind == kind)
                .filter_map(|d| d.node_hook.as_ref().map(|h| (d, h)))
                .collect()
        };

        let inherited = hooked(AttrKind::Inherited);
        if !inherited.is_empty() {
            for id in tree.pre_order() {
                apply_hooks(tree, id, &inherited);
            }
        }

        let synthesized = hooked(AttrKind::Synthesized);
        if !synthesized.is_empty() {
            for id in tree.post_order() {
                if !tree.node(id).is_leaf() {
                    apply_hooks(tree, id, &synthesized);
                }
            }
        }
    }
}

fn apply_hooks(tree: &mut ParseTree, id: NodeId, decls: &[(&AttrDecl, &NodeHook)]) {
    for (decl, hook) in decls {
        if !decl.applies_to.contains(tree.node(id).name()) {
            continue;
        }
        if let Some(value) = hook(tree, id) {
            tree.node_mut(id).attrs_mut().set(decl.kind, decl.attr, value);
        }
    }
}

impl TokenHooks for AttributeGrammar {
    fn annotate(&self, token: &mut Token, ctx: &ScanContext) {
        for decl in &self.decls {
            let Some(hook) = &decl.token_hook else {
                continue;
            };
            if decl.applies_to.contains(&token.name) {
                if let Some(value) = hook(token, ctx) {
                    token.attrs.set(decl.kind, decl.attr, value);
                }
            }
        }
    }
}

impl TokenCombiner for AttributeGrammar {
    fn combine(&self, name: &str, parts: Vec<Token>) -> Token {
        let lexeme: String = parts.iter().map(|t| t.lexeme.as_str()).collect();
        let present: BTreeSet<Attr> = parts
            .iter()
            .flat_map(|t| t.attrs.synthesized_iter().map(|(attr, _)| *attr))
            .collect();

        let mut attrs = Attributes::new();
        for attr in present {
            match self.fold_policy(attr) {
                FoldPolicy::First => {
                    if let Some(value) = parts.iter().find_map(|t| t.attrs.synthesized(attr)) {
                        attrs.set_synthesized(attr, value.clone());
                    }
                }
                FoldPolicy::Concat => {
                    let text: String = parts
                        .iter()
                        .map(|t| match t.attrs.synthesized(attr) {
                            Some(value) => value.to_string(),
                            None => t.lexeme.clone(),
                        })
                        .collect();
                    attrs.set_synthesized(attr, text);
                }
                FoldPolicy::Drop => {}
            }
        }

        Token {
            name: name.to_string(),
            lexeme,
            attrs,
        }
    }
}

impl fmt::Debug for AttributeGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeGrammar")
            .field("name", &self.name)
            .field("language", &self.language.name())
            .field("decls", &self.decls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jproc::ebnf::RuleKind;
    use crate::jproc::language::definition;

    fn base() -> AttributeGrammar {
        AttributeGrammar::new("test", definition::standard_language().unwrap())
    }

    #[test]
    fn test_token_hooks_respect_rule_set() {
        let grammar = base().declare(
            AttrDecl::synthesized(Attr::Indent)
                .applies_to(RuleSet::only(&["number"]))
                .on_token(|_, ctx| Some(ctx.depth.into())),
        );
        let ctx = ScanContext {
            line: 1,
            column: 1,
            depth: 2,
        };

        let mut number = Token::new("number", "1");
        grammar.annotate(&mut number, &ctx);
        let mut colon = Token::new("colon", ":");
        grammar.annotate(&mut colon, &ctx);

        assert_eq!(number.indent(), Some(2));
        assert_eq!(colon.indent(), None);
    }

    #[test]
    fn test_combine_follows_fold_policies() {
        let grammar = base()
            .declare(AttrDecl::synthesized(Attr::Line))
            .declare(AttrDecl::synthesized(Attr::Render).fold(FoldPolicy::Concat));
        let parts = vec![
            Token::new("item_lbracket", "[")
                .with_attr(Attr::Line, 2usize)
                .with_attr(Attr::Render, "["),
            Token::new("item_divider", ",")
                .with_attr(Attr::Line, 3usize)
                .with_attr(Attr::Render, ", "),
            Token::new("item_rbracket", "]").with_attr(Attr::Line, 3usize),
        ];

        let folded = grammar.combine("item_array", parts);
        assert_eq!(folded.lexeme, "[,]");
        assert_eq!(folded.line(), Some(2));
        assert_eq!(folded.render(), Some("[, ]"));
    }

    #[test]
    fn test_derive_shares_language_and_copies_decls() {
        let tokenizer = base().declare(AttrDecl::synthesized(Attr::Line));
        let derived = tokenizer
            .derive("derived")
            .declare(AttrDecl::inherited(Attr::Scope));

        assert!(Arc::ptr_eq(tokenizer.language(), derived.language()));
        assert!(derived.declares(Attr::Line));
        assert!(derived.declares(Attr::Scope));
        assert!(!tokenizer.declares(Attr::Scope));
    }

    #[test]
    fn test_inherited_before_synthesized() {
        let grammar = base()
            .declare(AttrDecl::inherited(Attr::Scope).on_node(|tree, id| {
                let parent = tree.node(id).parent();
                let above = parent
                    .and_then(|p| tree.node(p).attrs().scope())
                    .unwrap_or("");
                Some(format!("{}/{}", above, tree.node(id).name()).into())
            }))
            .declare(AttrDecl::synthesized(Attr::Render).on_node(|tree, id| {
                tree.node(id).attrs().scope().map(AttrValue::from)
            }));

        let mut tree = ParseTree::new();
        tree.enter("outer", RuleKind::Concatenation);
        tree.enter("inner", RuleKind::Concatenation);
        tree.leaf(Token::new("x", "x"), RuleKind::Terminal);
        tree.close();
        tree.close();
        grammar.evaluate_tree(&mut tree);

        let inner = tree.find_all(crate::jproc::tree::NodeMatch::Name("inner"))[0];
        assert_eq!(tree.node(inner).attrs().scope(), Some("/outer/inner"));
        assert_eq!(tree.node(inner).attrs().render(), Some("/outer/inner"));
    }
}
