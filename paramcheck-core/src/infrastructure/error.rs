// paramcheck-core/src/infrastructure/error.rs

use crate::domain::error::DomainError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(paramcheck::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    #[error("Cannot read '{path}': {source}")]
    #[diagnostic(code(paramcheck::infra::file_access))]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(paramcheck::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(paramcheck::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found: {0}")]
    #[diagnostic(
        code(paramcheck::infra::config_missing),
        help("Run `paramcheck init` to create a sample project.")
    )]
    ConfigNotFound(String),

    // --- TABLES ---
    #[error("CSV Error: {0}")]
    #[diagnostic(
        code(paramcheck::infra::csv),
        help("Check the delimiter and that every row has as many cells as the header.")
    )]
    CsvError(#[from] csv::Error),

    #[error("'{file}' lacks required column(s): {}", .columns.join(", "))]
    #[diagnostic(
        code(paramcheck::infra::missing_columns),
        help("Headers may be written in Chinese or in English snake_case.")
    )]
    MissingColumns { file: String, columns: Vec<String> },

    #[error("'{file}' line {line}, column '{column}': {reason}")]
    #[diagnostic(code(paramcheck::infra::invalid_cell))]
    InvalidCell {
        file: String,
        line: u64,
        column: String,
        reason: String,
    },

    // --- REPORTS ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(paramcheck::infra::json))]
    JsonError(#[from] serde_json::Error),

    // --- KNOWLEDGE BASE ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),
}

impl InfrastructureError {
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }
}
