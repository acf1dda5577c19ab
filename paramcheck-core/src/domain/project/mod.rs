// paramcheck-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{
    InstanceScope, KnowledgeConfig, KnowledgeFormat, ProjectConfig, ReportConfig, ReportFormat,
};
