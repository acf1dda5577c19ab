pub mod condition;
pub mod error;
pub mod finding;
pub mod group;
pub mod knowledge;
pub mod project;
pub mod value;

// Re-exports to keep imports short elsewhere
pub use error::DomainError;
pub use finding::{EngineDiagnostic, Mismatch, ValidationError};
pub use group::{MoGroup, ParameterContext};
pub use value::{MultiValue, ParameterValue, Scalar};
