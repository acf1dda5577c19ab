// paramcheck-core/src/domain/condition/mod.rs
//
// Boolean condition language used by filter conditions and expected values:
// `(name=value and other>3) or flag!=off`.

pub mod ast;
pub mod evaluator;
pub mod lexer;
pub mod parser;

pub use ast::{Comparator, ConditionNode};
pub use evaluator::{FailedComparison, evaluate, failed_comparisons};
pub use parser::parse;
