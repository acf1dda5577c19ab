// paramcheck-core/src/infrastructure/scaffold.rs
//
// Lays out the sample project created by `paramcheck init`.

use crate::application::sample::{SAMPLE_TABLES, knowledge};
use crate::domain::project::{KnowledgeConfig, ProjectConfig};
use crate::infrastructure::config::project::CONFIG_CANDIDATES;
use crate::infrastructure::data::write_mo_table;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::infrastructure::knowledge::csv_tables::{
    write_parameter_definitions, write_validation_rules,
};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Writes the sample project into `dir` and returns the files created.
/// Refuses to touch a directory that already holds a project.
#[instrument]
pub fn write_sample_project(dir: &Path, name: &str) -> Result<Vec<PathBuf>, InfrastructureError> {
    if let Some(existing) = CONFIG_CANDIDATES
        .iter()
        .map(|f| dir.join(f))
        .find(|p| p.exists())
    {
        return Err(InfrastructureError::ConfigError(format!(
            "{:?} already exists, not overwriting",
            existing
        )));
    }

    let config = ProjectConfig {
        name: name.to_string(),
        knowledge: KnowledgeConfig::default(),
        data_dir: "data".to_string(),
        instance_keys: vec!["f_site_id".to_string(), "f_cell_id".to_string()],
        instance_scope: Default::default(),
        report: Default::default(),
        strict: false,
    };
    let mut written = Vec::new();

    let config_path = dir.join(CONFIG_CANDIDATES[0]);
    atomic_write(&config_path, serde_yaml::to_string(&config)?)?;
    written.push(config_path);

    let (definitions, rules) = knowledge();
    let parameters = dir.join(config.knowledge.parameters.as_deref().unwrap_or("knowledge/parameters.csv"));
    write_parameter_definitions(&parameters, &definitions)?;
    written.push(parameters);
    let rule_file = dir.join(config.knowledge.rules.as_deref().unwrap_or("knowledge/rules.csv"));
    write_validation_rules(&rule_file, &rules)?;
    written.push(rule_file);

    for table in SAMPLE_TABLES {
        let path = dir.join(&config.data_dir).join(format!("{}.csv", table.mo_name));
        write_mo_table(&path, table.columns, table.rows)?;
        written.push(path);
    }

    info!(files = written.len(), "Sample project written");
    Ok(written)
}
