// paramcheck-core/src/domain/knowledge/mod.rs
//
// The two reference tables (parameter definitions, validation rules) and
// what the engine derives from them: compiled rules and rule graphs.

pub mod base;
pub mod definition;
pub mod graph;
pub mod rule;

pub use base::{KnowledgeBase, RuleEntry};
pub use definition::{ParameterDefinition, ParameterType};
pub use graph::RuleGraph;
pub use rule::{CheckKind, CompiledRule, Expectation, LogicalRelation, ParamRef, ValidationRule};
