//! Language front-ends lowering source text into the syntax arena.

pub mod typescript;
