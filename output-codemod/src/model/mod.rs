pub mod edit;
pub mod span;
pub mod syntax;
