//! Source unit store: candidate files held as parsed, editable syntax arenas.
//!
//! A [`SourceUnit`] owns the original text, its arena and the journal of edits
//! recorded against it. Structural operations (`replace`, `remove`,
//! `append_member`, `insert_import`) update the arena and the journal together,
//! so the arena always reflects what serialization will produce.

use crate::{
    errors::{Error, Result},
    languages::typescript,
    model::{
        edit::EditJournal,
        span::Span,
        syntax::{ImportDecl, NodeData, NodeId, SyntaxArena, SyntaxKind},
    },
};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tracing::debug;

#[derive(Debug)]
pub struct SourceUnit {
    path: PathBuf,
    text: String,
    arena: SyntaxArena,
    journal: EditJournal,
    visited: HashSet<NodeId>,
}

impl SourceUnit {
    /// Parse `text` and wrap it as an editable unit.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();
        let arena = typescript::parse_module(&path, &text)?;
        Ok(Self {
            path,
            text,
            arena,
            journal: EditJournal::new(),
            visited: HashSet::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Original text, before any edit.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn arena(&self) -> &SyntaxArena {
        &self.arena
    }

    /// Mark a node as visited; `false` when it already was.
    pub fn begin_visit(&mut self, id: NodeId) -> bool {
        self.visited.insert(id)
    }

    pub fn is_modified(&self) -> bool {
        !self.journal.is_empty()
    }

    /// Replace a node's whole text with `text`. The old node is marked removed
    /// and the new text is registered as the sibling directly after it.
    pub fn replace(&mut self, id: NodeId, text: String) -> Result<NodeId> {
        let node = self.arena.node(id);
        if node.removed {
            return Err(Error::InvalidState("node already removed"));
        }
        let span = node.span;
        self.journal.replace(span, text.clone())?;
        self.arena.mark_removed(id);
        Ok(self.arena.alloc_after(id, span, NodeData::Synthetic(text)))
    }

    /// Remove a node from the text. Decorators take their trailing whitespace
    /// with them so the decorated member keeps its position on the line.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        let node = self.arena.node(id);
        if node.removed {
            return Err(Error::InvalidState("node already removed"));
        }
        let span = match node.kind() {
            SyntaxKind::Decorator => node.span.extend_over_trailing_ws(&self.text),
            _ => node.span,
        };
        self.journal.remove(span)?;
        self.arena.mark_removed(id);
        Ok(())
    }

    /// Append `member` (already indented, without leading newline) as the last
    /// member of a class body, separated from the previous member by a blank line.
    pub fn append_member(&mut self, class: NodeId, member: &str) -> Result<NodeId> {
        let body = self
            .arena
            .class(class)
            .ok_or(Error::InvalidState("append_member target is not a class"))?
            .body;
        let inner_start = (body.start_byte + 1).min(body.end_byte);
        let inner_end = body.end_byte.saturating_sub(1).max(inner_start);
        let inner = &self.text[inner_start..inner_end];
        let at = inner_start + inner.trim_end().len();

        let text = format!("\n\n{member}");
        self.journal.insert(at, text.clone())?;
        Ok(self
            .arena
            .alloc(class, Span::point(at), NodeData::Synthetic(text)))
    }

    /// Insert an import statement after the last original import (or at the top
    /// of the file) and register it, so later presence checks see it.
    pub fn insert_import(&mut self, decl: ImportDecl, statement: &str) -> Result<NodeId> {
        let last_original = self
            .arena
            .children_of_kind(self.arena.root(), SyntaxKind::Import)
            .into_iter()
            .filter(|id| !self.arena.node(*id).span.is_empty())
            .last();

        let (at, text) = match last_original {
            Some(id) => (self.arena.node(id).span.end_byte, format!("\n{statement}")),
            None => (0, format!("{statement}\n")),
        };
        self.journal.insert(at, text)?;

        let root = self.arena.root();
        let id = match self.arena.last_import() {
            Some(prev) => self
                .arena
                .alloc_after(prev, Span::point(at), NodeData::Import(decl)),
            None => self.arena.alloc(root, Span::point(at), NodeData::Import(decl)),
        };
        Ok(id)
    }

    /// Text with all recorded edits applied.
    pub fn serialize(&self) -> String {
        self.journal.apply(&self.text)
    }
}

/// All candidate units of a run, in tracking order.
#[derive(Debug, Default)]
pub struct SourceStore {
    units: Vec<SourceUnit>,
}

impl SourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and hold a file. Tracking the same path twice keeps the first unit.
    pub fn track(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Result<()> {
        let path = path.into();
        if self.get(&path).is_some() {
            debug!(path = %path.display(), "already tracked");
            return Ok(());
        }
        let unit = SourceUnit::parse(path, content)?;
        self.units.push(unit);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, path: &Path) -> Option<&SourceUnit> {
        self.units.iter().find(|u| u.path == path)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SourceUnit> {
        self.units.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::syntax::ImportBinding;
    use pretty_assertions::assert_eq;

    const SRC: &str = "import { Component } from '@angular/core';\n\n@Component({})\nexport class A {\n  @Output() x = y;\n}\n";

    fn output_import() -> ImportDecl {
        ImportDecl {
            module: "@angular/core".into(),
            bindings: vec![ImportBinding {
                imported: "output".into(),
                local: "output".into(),
            }],
            type_only: false,
        }
    }

    #[test]
    fn untouched_unit_serializes_verbatim() {
        let unit = SourceUnit::parse("a.ts", SRC).unwrap();
        assert!(!unit.is_modified());
        assert_eq!(unit.serialize(), SRC);
    }

    #[test]
    fn import_lands_after_last_import_and_is_visible() {
        let mut unit = SourceUnit::parse("a.ts", SRC).unwrap();
        unit.insert_import(output_import(), "import { output } from '@angular/core';")
            .unwrap();
        assert!(unit
            .arena()
            .imports()
            .any(|d| d.provides("output", "@angular/core")));
        assert!(unit.serialize().starts_with(
            "import { Component } from '@angular/core';\nimport { output } from '@angular/core';\n\n@Component"
        ));
    }

    #[test]
    fn imports_go_on_top_when_file_has_none() {
        let mut unit = SourceUnit::parse("b.ts", "export class B {}\n").unwrap();
        unit.insert_import(output_import(), "import { output } from '@angular/core';")
            .unwrap();
        unit.insert_import(output_import(), "import { other } from 'x';")
            .unwrap();
        assert_eq!(
            unit.serialize(),
            "import { output } from '@angular/core';\nimport { other } from 'x';\nexport class B {}\n"
        );
    }

    #[test]
    fn decorator_removal_and_member_append() {
        let mut unit = SourceUnit::parse("a.ts", SRC).unwrap();
        let class = unit.arena().classes()[0];
        let prop = unit.arena().children_of_kind(class, SyntaxKind::Property)[0];
        let deco = unit.arena().find_decorator(prop, &["Output"]).unwrap();

        assert!(unit.begin_visit(prop));
        assert!(!unit.begin_visit(prop));

        unit.remove(deco).unwrap();
        unit.append_member(class, "  z = 1;").unwrap();
        assert_eq!(
            unit.serialize(),
            "import { Component } from '@angular/core';\n\n@Component({})\nexport class A {\n  x = y;\n\n  z = 1;\n}\n"
        );
        assert!(unit.remove(deco).is_err());
    }

    #[test]
    fn replaced_last_member_stays_before_appended_one() {
        let src = "class A {\n  a = 1\n  b = 2\n}\n";
        let mut unit = SourceUnit::parse("a.ts", src).unwrap();
        let class = unit.arena().classes()[0];
        let props = unit.arena().children_of_kind(class, SyntaxKind::Property);

        unit.append_member(class, "  c = 3;").unwrap();
        unit.replace(props[1], "b = 20".to_string()).unwrap();
        assert_eq!(unit.serialize(), "class A {\n  a = 1\n  b = 20\n\n  c = 3;\n}\n");

        assert!(unit.replace(props[1], "again".to_string()).is_err());
        assert_eq!(
            unit.arena().children_of_kind(class, SyntaxKind::Property),
            vec![props[0]]
        );
    }

    #[test]
    fn store_tracks_each_path_once() {
        let mut store = SourceStore::new();
        store.track("a.ts", SRC).unwrap();
        store.track("a.ts", "changed").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(Path::new("a.ts")).unwrap().text(), SRC);
    }
}
