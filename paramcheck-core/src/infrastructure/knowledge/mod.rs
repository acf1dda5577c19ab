// paramcheck-core/src/infrastructure/knowledge/mod.rs

pub mod csv_tables;
pub mod yaml_document;

pub use csv_tables::CsvKnowledgeSource;
pub use yaml_document::{KnowledgeDocument, YamlKnowledgeSource};

use crate::domain::project::{KnowledgeConfig, KnowledgeFormat};
use crate::infrastructure::config::Project;
use crate::ports::KnowledgeSource;

/// Picks the reader matching the configured storage format.
pub fn knowledge_source(project: &Project) -> Box<dyn KnowledgeSource> {
    let KnowledgeConfig {
        format,
        parameters,
        rules,
        path,
    } = &project.config.knowledge;
    // Paths are guaranteed by config validation; defaults keep this total.
    match format {
        KnowledgeFormat::Csv => Box::new(CsvKnowledgeSource::new(
            project.resolve(parameters.as_deref().unwrap_or("knowledge/parameters.csv")),
            project.resolve(rules.as_deref().unwrap_or("knowledge/rules.csv")),
        )),
        KnowledgeFormat::Yaml => Box::new(YamlKnowledgeSource {
            path: project.resolve(path.as_deref().unwrap_or("knowledge/kb.yaml")),
        }),
    }
}
