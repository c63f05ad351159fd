//! Import manager: idempotent "ensure `import { name } from 'module'`".
//!
//! Presence is checked structurally against the unit's import nodes, which
//! include statements added earlier in the same run, so asking twice (from
//! two classes of one file, say) still yields a single statement.

use crate::{
    core::store::SourceUnit,
    errors::Result,
    model::syntax::{ImportBinding, ImportDecl},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named binding required from a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRequirement {
    pub name: String,
    pub module: String,
}

impl ImportRequirement {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }

    pub fn statement(&self) -> String {
        format!("import {{ {} }} from '{}';", self.name, self.module)
    }

    fn decl(&self) -> ImportDecl {
        ImportDecl {
            module: self.module.clone(),
            bindings: vec![ImportBinding {
                imported: self.name.clone(),
                local: self.name.clone(),
            }],
            type_only: false,
        }
    }
}

pub fn has_import(unit: &SourceUnit, req: &ImportRequirement) -> bool {
    unit.arena()
        .imports()
        .any(|decl| decl.provides(&req.name, &req.module))
}

/// Ensure `req` is imported. Returns `true` when a statement was added.
pub fn ensure_import(unit: &mut SourceUnit, req: &ImportRequirement) -> Result<bool> {
    if has_import(unit, req) {
        debug!(name = %req.name, module = %req.module, "import already present");
        return Ok(false);
    }
    unit.insert_import(req.decl(), &req.statement())?;
    debug!(name = %req.name, module = %req.module, "import added");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn statement_format() {
        let req = ImportRequirement::new("outputFromObservable", "@angular/core/rxjs-interop");
        assert_eq!(
            req.statement(),
            "import { outputFromObservable } from '@angular/core/rxjs-interop';"
        );
    }

    #[test]
    fn existing_binding_is_not_duplicated() {
        let src = "import { Component, output } from '@angular/core';\nexport class A {}\n";
        let mut unit = SourceUnit::parse("a.ts", src).unwrap();
        let req = ImportRequirement::new("output", "@angular/core");
        assert!(!ensure_import(&mut unit, &req).unwrap());
        assert_eq!(unit.serialize(), src);
    }

    #[test]
    fn same_binding_from_other_module_does_not_count() {
        let src = "import { output } from './local';\nexport class A {}\n";
        let mut unit = SourceUnit::parse("a.ts", src).unwrap();
        let req = ImportRequirement::new("output", "@angular/core");
        assert!(ensure_import(&mut unit, &req).unwrap());
        assert!(!ensure_import(&mut unit, &req).unwrap());
        assert_eq!(
            unit.serialize(),
            "import { output } from './local';\nimport { output } from '@angular/core';\nexport class A {}\n"
        );
    }
}
