// paramcheck-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParamCheckError {
    // --- DOMAIN ERRORS (expressions, rule graph, knowledge base) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, Parsing) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC / APPLICATION ERRORS ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

// Manual implementation to avoid duplicate enum variant but keep ergonomics
impl From<std::io::Error> for ParamCheckError {
    fn from(err: std::io::Error) -> Self {
        ParamCheckError::Infrastructure(InfrastructureError::Io(err))
    }
}
