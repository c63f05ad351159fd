//! TypeScript extractor.
//!
//! Parses a module with `tree-sitter-typescript` and lowers the parts the
//! migration needs into a [`SyntaxArena`]:
//! - top-level `import` statements (module specifier + named bindings);
//! - top-level classes, exported or not, with their decorators (decorators
//!   written before `export` belong to the export statement in the grammar and
//!   are folded into the class here);
//! - class property members with modifiers, JSDoc, decorators and initializer.
//!
//! Classes nested inside functions or namespaces are not collected.

use crate::{
    errors::{Error, Result},
    model::{
        span::Span,
        syntax::{
            ClassDecl, Decorator, DecoratorArg, ImportBinding, ImportDecl, Initializer,
            NewExpression, NodeData, NodeId, PropertyDecl, Scope, SyntaxArena,
        },
    },
};
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Language, Node, Parser, Tree};

/// Parse `code` into a tree-sitter tree.
pub fn parse_tree(path: &Path, code: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into();
    parser.set_language(&language)?;
    let tree = parser
        .parse(code, None)
        .ok_or_else(|| Error::TreeSitterParse(path.to_path_buf()))?;
    if tree.root_node().has_error() {
        warn!(path = %path.display(), "syntax errors in file, rewriting what could be parsed");
    }
    Ok(tree)
}

/// Parse and lower a module into a syntax arena.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn parse_module(path: &Path, code: &str) -> Result<SyntaxArena> {
    let tree = parse_tree(path, code)?;
    let root = tree.root_node();
    let mut arena = SyntaxArena::new(Span::new(0, code.len()));
    let module = arena.root();

    let mut w = root.walk();
    for node in root.named_children(&mut w) {
        match node.kind() {
            "import_statement" => {
                if let Some(decl) = lower_import(node, code) {
                    arena.alloc(module, span(node), NodeData::Import(decl));
                }
            }
            "class_declaration" | "abstract_class_declaration" => {
                lower_class(&mut arena, node, &[], code);
            }
            "export_statement" => {
                let outer = decorators_of(node);
                if let Some(decl) = node.child_by_field_name("declaration") {
                    if matches!(
                        decl.kind(),
                        "class_declaration" | "abstract_class_declaration"
                    ) {
                        lower_class(&mut arena, decl, &outer, code);
                    }
                }
            }
            _ => {}
        }
    }

    debug!(nodes = arena.len(), "module lowered");
    Ok(arena)
}

/* ------------------------- imports ------------------------- */

fn lower_import(node: Node, code: &str) -> Option<ImportDecl> {
    let source = node
        .child_by_field_name("source")
        .or_else(|| first_child_of_kind(node, "string"))?;
    let module = strip_quotes(text(code, source));

    let mut bindings = Vec::new();
    let mut type_only = false;
    let mut w = node.walk();
    for ch in node.children(&mut w) {
        match ch.kind() {
            "type" => type_only = true,
            "import_clause" => collect_named_imports(ch, code, &mut bindings),
            _ => {}
        }
    }

    Some(ImportDecl {
        module,
        bindings,
        type_only,
    })
}

fn collect_named_imports(clause: Node, code: &str, out: &mut Vec<ImportBinding>) {
    let mut w = clause.walk();
    for ch in clause.named_children(&mut w) {
        if ch.kind() != "named_imports" {
            continue;
        }
        let mut w2 = ch.walk();
        for spec in ch.named_children(&mut w2) {
            if spec.kind() != "import_specifier" {
                continue;
            }
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let imported = text(code, name).to_string();
            let local = spec
                .child_by_field_name("alias")
                .map(|a| text(code, a).to_string())
                .unwrap_or_else(|| imported.clone());
            out.push(ImportBinding { imported, local });
        }
    }
}

/* ------------------------- classes ------------------------- */

fn lower_class(arena: &mut SyntaxArena, node: Node, outer_decorators: &[Node], code: &str) {
    let Some(body) = node.child_by_field_name("body") else {
        return;
    };
    let name = node
        .child_by_field_name("name")
        .map(|n| text(code, n).to_string());

    let class_span = match outer_decorators.first() {
        Some(first) => Span::new(first.start_byte(), node.end_byte()),
        None => span(node),
    };
    let class_id = arena.alloc(
        arena.root(),
        class_span,
        NodeData::Class(ClassDecl {
            name,
            body: span(body),
        }),
    );

    for deco in outer_decorators.iter().copied().chain(decorators_of(node)) {
        if let Some(d) = lower_decorator(deco, code) {
            arena.alloc(class_id, span(deco), NodeData::Decorator(d));
        }
    }

    let mut docs: Vec<String> = Vec::new();
    let mut w = body.walk();
    for member in body.named_children(&mut w) {
        match member.kind() {
            "comment" => {
                let t = text(code, member);
                if t.starts_with("/**") {
                    docs.push(t.to_string());
                }
            }
            "public_field_definition" => {
                lower_property(arena, class_id, member, std::mem::take(&mut docs), code);
            }
            _ => docs.clear(),
        }
    }
}

fn lower_property(
    arena: &mut SyntaxArena,
    class_id: NodeId,
    node: Node,
    docs: Vec<String>,
    code: &str,
) {
    let Some(name_node) = node.child_by_field_name("name") else {
        return;
    };

    let mut decl = PropertyDecl {
        name: text(code, name_node).to_string(),
        scope: None,
        is_static: false,
        is_readonly: false,
        has_override: false,
        docs,
        initializer: None,
    };

    let mut w = node.walk();
    for ch in node.children(&mut w) {
        match ch.kind() {
            "accessibility_modifier" => decl.scope = Scope::from_keyword(text(code, ch)),
            "override_modifier" => decl.has_override = true,
            "readonly" => decl.is_readonly = true,
            "static" => decl.is_static = true,
            _ => {}
        }
    }

    if let Some(value) = node.child_by_field_name("value") {
        decl.initializer = Some(Initializer {
            text: text(code, value).to_string(),
            construct: describe_new_expression(value, code),
        });
    }

    let prop_id = arena.alloc(class_id, span(node), NodeData::Property(decl));
    for deco in decorators_of(node) {
        if let Some(d) = lower_decorator(deco, code) {
            arena.alloc(prop_id, span(deco), NodeData::Decorator(d));
        }
    }
}

/* ------------------------- decorators ------------------------- */

fn decorators_of(node: Node) -> Vec<Node> {
    let mut w = node.walk();
    let decorators: Vec<Node> = node
        .named_children(&mut w)
        .filter(|c| c.kind() == "decorator")
        .collect();
    decorators
}

fn lower_decorator(node: Node, code: &str) -> Option<Decorator> {
    let mut w = node.walk();
    let inner = node.named_children(&mut w).find(|c| c.kind() != "comment")?;

    match inner.kind() {
        "call_expression" => {
            let callee = inner.child_by_field_name("function")?;
            let args = inner
                .child_by_field_name("arguments")
                .map(|a| lower_arguments(a, code))
                .unwrap_or_default();
            Some(Decorator {
                name: last_segment(callee, code),
                args,
            })
        }
        "identifier" | "member_expression" => Some(Decorator {
            name: last_segment(inner, code),
            args: Vec::new(),
        }),
        other => {
            debug!(kind = other, "unsupported decorator shape");
            None
        }
    }
}

fn lower_arguments(args: Node, code: &str) -> Vec<DecoratorArg> {
    let mut w = args.walk();
    let lowered: Vec<DecoratorArg> = args
        .named_children(&mut w)
        .filter(|a| a.kind() != "comment")
        .map(|a| match a.kind() {
            "string" => DecoratorArg::StringLiteral(text(code, a).to_string()),
            _ => DecoratorArg::Expression(text(code, a).to_string()),
        })
        .collect();
    lowered
}

/* ------------------------- expressions ------------------------- */

/// Describe `node` as a `new` expression, looking through `( .. )`, `as`,
/// `satisfies` and `!` wrappers.
fn describe_new_expression(node: Node, code: &str) -> Option<NewExpression> {
    let node = unwrap_expression(node);
    if node.kind() != "new_expression" {
        return None;
    }
    let ctor = node.child_by_field_name("constructor")?;
    let type_args = node
        .child_by_field_name("type_arguments")
        .map(|t| strip_angle_brackets(text(code, t)));
    Some(NewExpression {
        constructor: last_segment(ctor, code),
        type_args,
    })
}

fn unwrap_expression(mut node: Node) -> Node {
    loop {
        match node.kind() {
            "parenthesized_expression" | "as_expression" | "satisfies_expression"
            | "non_null_expression" => {
                let mut w = node.walk();
                let inner = node.named_children(&mut w).find(|c| c.kind() != "comment");
                match inner {
                    Some(inner) => node = inner,
                    None => return node,
                }
            }
            _ => return node,
        }
    }
}

/* ------------------------- helpers ------------------------- */

/// `Output` for `Output`, `core.Output` and `ng.core.Output`.
fn last_segment(node: Node, code: &str) -> String {
    match node.kind() {
        "member_expression" => node
            .child_by_field_name("property")
            .map(|p| text(code, p).to_string())
            .unwrap_or_else(|| text(code, node).to_string()),
        _ => text(code, node).to_string(),
    }
}

fn strip_angle_brackets(s: &str) -> String {
    let t = s.trim();
    t.strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .unwrap_or(t)
        .trim()
        .to_string()
}

fn strip_quotes(s: &str) -> String {
    let t = s.trim();
    if t.len() >= 2
        && ((t.starts_with('"') && t.ends_with('"')) || (t.starts_with('\'') && t.ends_with('\'')))
    {
        t[1..t.len() - 1].to_string()
    } else {
        t.to_string()
    }
}

fn first_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut w = node.walk();
    let found = node.named_children(&mut w).find(|c| c.kind() == kind);
    found
}

fn span(node: Node) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

fn text<'a>(code: &'a str, node: Node) -> &'a str {
    &code[node.byte_range()]
}
