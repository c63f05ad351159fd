//! Class rewriter: walks one eligible class and migrates its `@Output()` members.
//!
//! Property members are snapshotted before the first edit; members added or
//! removed while rewriting are never visited. Each property goes
//! UNVISITED -> CLASSIFIED -> REWRITTEN exactly once.

use crate::{
    config::model::MigrateConfig,
    core::store::SourceUnit,
    errors::{Error, Result},
    model::syntax::{NodeId, PropertyDecl, SyntaxKind},
    rewrite::{
        ADAPTER_FN,
        classify::{
            ClassificationResult, InitializerShape, OutputPattern, ReplacementCall,
            RewritePolicy, classify,
        },
        imports::{ImportRequirement, ensure_import},
    },
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// One migrated (or deliberately skipped) property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertedOutput {
    pub name: String,
    pub pattern: OutputPattern,
    /// Name of the emitted member when it differs from `name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitted_as: Option<String>,
}

/// Per-class trace of what was converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassReport {
    pub name: Option<String>,
    pub converted: Vec<ConvertedOutput>,
    /// `@Output()` properties that could not be rewritten.
    pub skipped: Vec<String>,
    pub needed_adapter_import: bool,
}

impl ClassReport {
    pub fn converted_names(&self) -> impl Iterator<Item = &str> {
        self.converted.iter().map(|c| c.name.as_str())
    }
}

/// Class-level rewriting against one source unit.
pub struct ClassRewriter<'a> {
    cfg: &'a MigrateConfig,
    adapter_import: ImportRequirement,
}

impl<'a> ClassRewriter<'a> {
    pub fn new(cfg: &'a MigrateConfig) -> Self {
        Self {
            cfg,
            adapter_import: ImportRequirement::new(ADAPTER_FN, &cfg.framework.interop_module),
        }
    }

    /// Whether `class` carries one of the configured component markers.
    pub fn is_eligible(&self, unit: &SourceUnit, class: NodeId) -> bool {
        let markers: Vec<&str> = self
            .cfg
            .framework
            .class_markers
            .iter()
            .map(String::as_str)
            .collect();
        unit.arena().find_decorator(class, &markers).is_some()
    }

    /// Rewrite every `@Output()` property of `class`.
    #[tracing::instrument(level = "debug", skip_all, fields(class = class.index()))]
    pub fn rewrite(&self, unit: &mut SourceUnit, class: NodeId) -> Result<ClassReport> {
        let mut report = ClassReport {
            name: unit.arena().class(class).and_then(|c| c.name.clone()),
            ..ClassReport::default()
        };
        let marker = self.cfg.framework.output_marker.as_str();

        let snapshot = unit.arena().children_of_kind(class, SyntaxKind::Property);
        for prop_id in snapshot {
            let Some(deco_id) = unit.arena().find_decorator(prop_id, &[marker]) else {
                continue;
            };
            if !unit.begin_visit(prop_id) {
                continue;
            }

            let (prop, decorator) = match (
                unit.arena().property(prop_id),
                unit.arena().decorator(deco_id),
            ) {
                (Some(p), Some(d)) => (p.clone(), d.clone()),
                _ => return Err(Error::InvalidState("property snapshot out of sync")),
            };

            if prop.is_static {
                warn!(
                    path = %unit.path().display(),
                    property = %prop.name,
                    "static @{marker}() left unchanged"
                );
                report.skipped.push(prop.name.clone());
                continue;
            }

            let shape = InitializerShape::of(prop.initializer.as_ref(), unit.arena());
            let result = classify(&prop.name, &decorator, shape);
            debug!(property = %prop.name, pattern = %result.pattern, "classified");

            let Some(call) = result.initializer.clone() else {
                warn!(
                    path = %unit.path().display(),
                    property = %prop.name,
                    "@{marker}() without initializer left unchanged"
                );
                report.skipped.push(prop.name.clone());
                continue;
            };

            if result.needs_adapter_import {
                report.needed_adapter_import = true;
                ensure_import(unit, &self.adapter_import)?;
            }

            self.apply(unit, class, prop_id, deco_id, &prop, &result, &call)?;

            info!(
                path = %unit.path().display(),
                property = %prop.name,
                pattern = %result.pattern,
                "output converted"
            );
            report.converted.push(ConvertedOutput {
                name: prop.name.clone(),
                pattern: result.pattern,
                emitted_as: result.output_name.clone(),
            });
        }

        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn apply(
        &self,
        unit: &mut SourceUnit,
        class: NodeId,
        prop_id: NodeId,
        deco_id: NodeId,
        prop: &PropertyDecl,
        result: &ClassificationResult,
        call: &ReplacementCall,
    ) -> Result<()> {
        let name = result.output_name.as_deref().unwrap_or(&prop.name);
        let declaration = format!("{}{name} = {call}", modifiers(prop));

        match result.policy {
            RewritePolicy::ReplaceDeclaration => {
                unit.replace(prop_id, declaration)?;
            }
            RewritePolicy::StripDecorator => {
                let indent = unit
                    .arena()
                    .node(prop_id)
                    .span
                    .line_indent(unit.text())
                    .unwrap_or(self.cfg.rewrite.fallback_indent.as_str())
                    .to_string();
                unit.remove(deco_id)?;
                let member = self.appended_member(&indent, prop, &declaration);
                unit.append_member(class, &member)?;
            }
            RewritePolicy::Leave => {}
        }
        Ok(())
    }

    /// Docs of the original, the migration note, then `declaration;`.
    fn appended_member(&self, indent: &str, prop: &PropertyDecl, declaration: &str) -> String {
        let mut out = String::new();
        for doc in &prop.docs {
            out.push_str(indent);
            out.push_str(doc);
            out.push('\n');
        }
        out.push_str(&format!(
            "{indent}/**\n{indent} * {}\n{indent} */\n",
            self.cfg.rewrite.migration_comment
        ));
        out.push_str(indent);
        out.push_str(declaration);
        out.push(';');
        out
    }
}

/// `[scope ][override ][readonly ]` as declared on the original property.
fn modifiers(prop: &PropertyDecl) -> String {
    let mut out = String::new();
    if let Some(scope) = prop.scope {
        out.push_str(&format!("{scope} "));
    }
    if prop.has_override {
        out.push_str("override ");
    }
    if prop.is_readonly {
        out.push_str("readonly ");
    }
    out
}
