// Rule catalogue: loading, validation and the read-only HTTP view.

pub mod handlers;
pub mod source;

pub use source::RuleSource;
