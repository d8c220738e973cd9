pub mod directive;
pub mod span;
pub mod syntax;
