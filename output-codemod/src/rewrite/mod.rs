//! Classification and rewriting of `@Output()` members.

pub mod class_rewriter;
pub mod classify;
pub mod imports;

/// Replacement for eagerly created emitters.
pub const OUTPUT_FN: &str = "output";
/// Adapter wrapping an existing subscribable.
pub const ADAPTER_FN: &str = "outputFromObservable";
