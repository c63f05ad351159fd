//! Arena-backed syntax model for one TypeScript module.
//!
//! Only the parts of the module the migration cares about are materialized:
//! top-level imports, top-level classes, their decorators and property
//! members. Every node is addressed by a stable [`NodeId`]; structural edits
//! allocate new nodes or flag existing ones as removed, they never move or
//! renumber anything, so a snapshot of ids taken before editing stays valid.

use crate::model::span::Span;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable handle into a [`SyntaxArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxKind {
    Module,
    Import,
    Class,
    Decorator,
    Property,
    /// Text produced by the rewriter; has no counterpart in the original source.
    Synthetic,
}

/// One `{ imported as local }` entry of a named import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Module specifier without quotes, e.g. `@angular/core`.
    pub module: String,
    pub bindings: Vec<ImportBinding>,
    /// `import type { .. }`; such bindings do not exist at runtime.
    pub type_only: bool,
}

impl ImportDecl {
    pub fn provides(&self, imported: &str, module: &str) -> bool {
        !self.type_only && self.module == module && self.bindings.iter().any(|b| b.imported == imported)
    }
}

/// First-class view of a decorator argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorArg {
    /// Quoted string literal, stored verbatim including its quotes.
    StringLiteral(String),
    /// Any other expression, stored as source text.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorator {
    /// Callee name, last segment for member expressions (`core.Output` -> `Output`).
    pub name: String,
    pub args: Vec<DecoratorArg>,
}

impl Decorator {
    pub fn first_arg(&self) -> Option<&DecoratorArg> {
        self.args.first()
    }
}

/// Member accessibility keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Public,
    Protected,
    Private,
}

impl Scope {
    pub fn from_keyword(kw: &str) -> Option<Self> {
        match kw.trim() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Scope::Public => "public",
            Scope::Protected => "protected",
            Scope::Private => "private",
        })
    }
}

/// `new Ctor<T>(args)` as seen after unwrapping parentheses and type assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExpression {
    /// Constructor name as written locally, last segment for member expressions.
    pub constructor: String,
    /// Text between `<` and `>`, verbatim.
    pub type_args: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Initializer {
    /// Source text of the initializer expression.
    pub text: String,
    /// Set when the expression is a `new` expression.
    pub construct: Option<NewExpression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDecl {
    pub name: String,
    pub scope: Option<Scope>,
    pub is_static: bool,
    pub is_readonly: bool,
    pub has_override: bool,
    /// JSDoc blocks directly above the member, verbatim.
    pub docs: Vec<String>,
    pub initializer: Option<Initializer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: Option<String>,
    /// Span of the `{ ... }` body.
    pub body: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Module,
    Import(ImportDecl),
    Class(ClassDecl),
    Decorator(Decorator),
    Property(PropertyDecl),
    Synthetic(String),
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub span: Span,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
    pub removed: bool,
}

impl SyntaxNode {
    pub fn kind(&self) -> SyntaxKind {
        match self.data {
            NodeData::Module => SyntaxKind::Module,
            NodeData::Import(_) => SyntaxKind::Import,
            NodeData::Class(_) => SyntaxKind::Class,
            NodeData::Decorator(_) => SyntaxKind::Decorator,
            NodeData::Property(_) => SyntaxKind::Property,
            NodeData::Synthetic(_) => SyntaxKind::Synthetic,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxArena {
    nodes: Vec<SyntaxNode>,
}

impl SyntaxArena {
    /// Create an arena holding only the module root.
    pub fn new(module_span: Span) -> Self {
        Self {
            nodes: vec![SyntaxNode {
                span: module_span,
                parent: None,
                children: Vec::new(),
                data: NodeData::Module,
                removed: false,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.0]
    }

    /// Allocate a node as the last child of `parent`.
    pub fn alloc(&mut self, parent: NodeId, span: Span, data: NodeData) -> NodeId {
        let id = self.push(parent, span, data);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Allocate a node as the sibling directly following `anchor`.
    pub fn alloc_after(&mut self, anchor: NodeId, span: Span, data: NodeData) -> NodeId {
        let parent = self.nodes[anchor.0].parent.unwrap_or(NodeId(0));
        let id = self.push(parent, span, data);
        let siblings = &mut self.nodes[parent.0].children;
        let pos = siblings
            .iter()
            .position(|c| *c == anchor)
            .map(|p| p + 1)
            .unwrap_or(siblings.len());
        siblings.insert(pos, id);
        id
    }

    pub fn mark_removed(&mut self, id: NodeId) {
        self.nodes[id.0].removed = true;
    }

    fn push(&mut self, parent: NodeId, span: Span, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SyntaxNode {
            span,
            parent: Some(parent),
            children: Vec::new(),
            data,
            removed: false,
        });
        id
    }

    /// Live children of `id` with the given kind, in source order.
    pub fn children_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| {
                let n = &self.nodes[c.0];
                !n.removed && n.kind() == kind
            })
            .collect()
    }

    pub fn classes(&self) -> Vec<NodeId> {
        self.children_of_kind(self.root(), SyntaxKind::Class)
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> + '_ {
        self.nodes[0].children.iter().filter_map(|c| match &self.nodes[c.0] {
            SyntaxNode {
                data: NodeData::Import(decl),
                removed: false,
                ..
            } => Some(decl),
            _ => None,
        })
    }

    /// Last import node in module order, including ones added by the rewriter.
    pub fn last_import(&self) -> Option<NodeId> {
        self.children_of_kind(self.root(), SyntaxKind::Import)
            .last()
            .copied()
    }

    pub fn class(&self, id: NodeId) -> Option<&ClassDecl> {
        match &self.nodes[id.0].data {
            NodeData::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn property(&self, id: NodeId) -> Option<&PropertyDecl> {
        match &self.nodes[id.0].data {
            NodeData::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn decorator(&self, id: NodeId) -> Option<&Decorator> {
        match &self.nodes[id.0].data {
            NodeData::Decorator(d) => Some(d),
            _ => None,
        }
    }

    /// First live decorator of `owner` whose name is one of `names`.
    pub fn find_decorator(&self, owner: NodeId, names: &[&str]) -> Option<NodeId> {
        self.children_of_kind(owner, SyntaxKind::Decorator)
            .into_iter()
            .find(|d| {
                self.decorator(*d)
                    .is_some_and(|deco| names.contains(&deco.name.as_str()))
            })
    }

    /// Resolve a locally bound identifier to the name it was imported under.
    pub fn resolve_import_alias<'a>(&'a self, local: &'a str) -> &'a str {
        self.imports()
            .flat_map(|decl| decl.bindings.iter())
            .find(|b| b.local == local)
            .map(|b| b.imported.as_str())
            .unwrap_or(local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(name: &str) -> NodeData {
        NodeData::Property(PropertyDecl {
            name: name.into(),
            scope: None,
            is_static: false,
            is_readonly: false,
            has_override: false,
            docs: Vec::new(),
            initializer: None,
        })
    }

    #[test]
    fn alloc_after_keeps_handles_stable() {
        let mut arena = SyntaxArena::new(Span::new(0, 100));
        let class = arena.alloc(
            arena.root(),
            Span::new(0, 100),
            NodeData::Class(ClassDecl {
                name: Some("A".into()),
                body: Span::new(10, 100),
            }),
        );
        let a = arena.alloc(class, Span::new(12, 20), prop("a"));
        let b = arena.alloc(class, Span::new(22, 30), prop("b"));
        let snapshot = arena.children_of_kind(class, SyntaxKind::Property);

        let a2 = arena.alloc_after(a, Span::point(20), prop("a2"));
        arena.mark_removed(a);

        assert_eq!(snapshot, vec![a, b]);
        assert_eq!(arena.children_of_kind(class, SyntaxKind::Property), vec![a2, b]);
        assert_eq!(arena.property(a).map(|p| p.name.as_str()), Some("a"));
    }

    #[test]
    fn resolves_aliased_imports() {
        let mut arena = SyntaxArena::new(Span::new(0, 10));
        arena.alloc(
            arena.root(),
            Span::new(0, 10),
            NodeData::Import(ImportDecl {
                module: "@angular/core".into(),
                bindings: vec![ImportBinding {
                    imported: "EventEmitter".into(),
                    local: "Emitter".into(),
                }],
                type_only: false,
            }),
        );
        assert_eq!(arena.resolve_import_alias("Emitter"), "EventEmitter");
        assert_eq!(arena.resolve_import_alias("Subject"), "Subject");
    }
}
