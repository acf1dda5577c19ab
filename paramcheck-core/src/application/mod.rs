// paramcheck-core/src/application/mod.rs

pub mod driver;
pub mod executor;
pub mod lint;
pub mod report;
pub mod sample;

// --- RE-EXPORTS (FACADE PATTERN) ---
// The CLI can write `use paramcheck_core::application::{ValidationDriver, lint_knowledge_base};`
// without knowing the internal file layout.

pub use driver::{ParameterValidation, ValidationDriver, ValidationScope};
pub use executor::{ExecutionOutcome, OrderVerdict, Reached, RuleExecutor, RuleState, RuleTrace};
pub use lint::{LintReport, UndefinedParameter, lint_knowledge_base};
pub use report::{RunStats, ValidationReport};
