//! Expression classifier: decides which rewrite pattern applies to one
//! `@Output()` property and builds its replacement initializer.
//!
//! The decision is made over a typed view of the initializer
//! ([`InitializerShape`]) rather than over its raw text:
//!
//! | shape              | replacement                                      | policy  | adapter import |
//! |--------------------|--------------------------------------------------|---------|----------------|
//! | `PlainEmitter`     | `output<T>({ alias })`                           | replace | no             |
//! | `OwnedStream`      | `_name = outputFromObservable(this.name, {..})`  | strip   | yes            |
//! | `OtherExpression`  | `outputFromObservable(<expr>, { alias })`        | replace | yes            |
//! | `Uninitialized`    | nothing, the property is left as is              | leave   | no             |

use crate::{
    model::syntax::{Decorator, DecoratorArg, Initializer, SyntaxArena},
    rewrite::{ADAPTER_FN, OUTPUT_FN},
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::debug;

/// Legacy eager emitter constructor.
pub const EMITTER_CONSTRUCTOR: &str = "EventEmitter";

/// Manually managed subscribable kept on the class and wrapped by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamKind {
    Subject,
    BehaviorSubject,
    ReplaySubject,
    AsyncSubject,
}

impl StreamKind {
    pub fn from_constructor(name: &str) -> Option<Self> {
        match name {
            "Subject" => Some(Self::Subject),
            "BehaviorSubject" => Some(Self::BehaviorSubject),
            "ReplaySubject" => Some(Self::ReplaySubject),
            "AsyncSubject" => Some(Self::AsyncSubject),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitializerShape {
    PlainEmitter { type_arg: Option<String> },
    OwnedStream { kind: StreamKind },
    OtherExpression { text: String },
    Uninitialized,
}

impl InitializerShape {
    /// Reduce an initializer to its shape, resolving import aliases of the
    /// constructor through the module's imports.
    pub fn of(initializer: Option<&Initializer>, arena: &SyntaxArena) -> Self {
        let Some(init) = initializer else {
            return Self::Uninitialized;
        };
        let Some(construct) = &init.construct else {
            return Self::OtherExpression {
                text: init.text.clone(),
            };
        };

        let ctor = arena.resolve_import_alias(&construct.constructor);
        if ctor == EMITTER_CONSTRUCTOR {
            return Self::PlainEmitter {
                type_arg: construct.type_args.clone().filter(|t| !t.is_empty()),
            };
        }
        if let Some(kind) = StreamKind::from_constructor(ctor) {
            return Self::OwnedStream { kind };
        }
        Self::OtherExpression {
            text: init.text.clone(),
        }
    }
}

/// Rewrite pattern, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPattern {
    Emitter,
    OwnedStream,
    Observable,
    Uninitialized,
}

impl Display for OutputPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputPattern::Emitter => "emitter",
            OutputPattern::OwnedStream => "owned_stream",
            OutputPattern::Observable => "observable",
            OutputPattern::Uninitialized => "uninitialized",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewritePolicy {
    /// Remove the whole declaration and put the new one in its place.
    ReplaceDeclaration,
    /// Remove only the decorator and append a new sibling member.
    StripDecorator,
    /// Nothing can be emitted; keep the property untouched.
    Leave,
}

/// Writer for the replacement initializer: `callee<T>(source, { alias: a })`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementCall {
    pub callee: &'static str,
    pub type_arg: Option<String>,
    pub source: Option<String>,
    pub alias: Option<String>,
}

impl Display for ReplacementCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.callee)?;
        if let Some(t) = &self.type_arg {
            write!(f, "<{t}>")?;
        }
        f.write_str("(")?;
        if let Some(src) = &self.source {
            f.write_str(src)?;
        }
        if let Some(alias) = &self.alias {
            if self.source.is_some() {
                f.write_str(", ")?;
            }
            write!(f, "{{ alias: {alias} }}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    /// Name of the emitted member when it differs from the property name.
    pub output_name: Option<String>,
    pub initializer: Option<ReplacementCall>,
    pub policy: RewritePolicy,
    pub needs_adapter_import: bool,
    pub pattern: OutputPattern,
}

/// Alias carried by the decorator, if it is a string literal.
pub fn literal_alias(decorator: &Decorator) -> Option<String> {
    match decorator.first_arg()? {
        DecoratorArg::StringLiteral(lit) => Some(lit.clone()),
        DecoratorArg::Expression(expr) => {
            debug!(%expr, "non-literal output alias dropped");
            None
        }
    }
}

/// Decide the rewrite for one annotated property.
pub fn classify(
    property_name: &str,
    decorator: &Decorator,
    shape: InitializerShape,
) -> ClassificationResult {
    let alias = literal_alias(decorator);

    match shape {
        InitializerShape::PlainEmitter { type_arg } => ClassificationResult {
            output_name: None,
            initializer: Some(ReplacementCall {
                callee: OUTPUT_FN,
                type_arg,
                source: None,
                alias,
            }),
            policy: RewritePolicy::ReplaceDeclaration,
            needs_adapter_import: false,
            pattern: OutputPattern::Emitter,
        },
        InitializerShape::OwnedStream { .. } => ClassificationResult {
            output_name: Some(format!("_{property_name}")),
            initializer: Some(ReplacementCall {
                callee: ADAPTER_FN,
                type_arg: None,
                source: Some(format!("this.{property_name}")),
                alias: Some(alias.unwrap_or_else(|| format!("'{property_name}'"))),
            }),
            policy: RewritePolicy::StripDecorator,
            needs_adapter_import: true,
            pattern: OutputPattern::OwnedStream,
        },
        InitializerShape::OtherExpression { text } => ClassificationResult {
            output_name: None,
            initializer: Some(ReplacementCall {
                callee: ADAPTER_FN,
                type_arg: None,
                source: Some(text),
                alias,
            }),
            policy: RewritePolicy::ReplaceDeclaration,
            needs_adapter_import: true,
            pattern: OutputPattern::Observable,
        },
        InitializerShape::Uninitialized => ClassificationResult {
            output_name: None,
            initializer: None,
            policy: RewritePolicy::Leave,
            needs_adapter_import: false,
            pattern: OutputPattern::Uninitialized,
        },
    }
}
