// paramcheck-core/src/infrastructure/config/project.rs

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use crate::domain::project::configuration::ProjectConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["paramcheck.yaml", "paramcheck_project.yaml"];

/// A loaded project: its configuration plus the directory relative paths
/// are resolved against.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub config: ProjectConfig,
}

impl Project {
    pub fn load(project_dir: &Path) -> Result<Self, InfrastructureError> {
        Ok(Self {
            root: project_dir.to_path_buf(),
            config: load_project_config(project_dir)?,
        })
    }

    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.config.data_dir)
    }

    pub fn report_path(&self) -> PathBuf {
        self.resolve(&self.config.report.path)
    }
}

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    // 1. Discovery
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project configuration");

    // 2. YAML base
    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 3. Layering: environment wins over the file
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    // 4. Fail fast on an unusable configuration
    config
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(format!("{:?}: {}", config_path, e)))?;

    Ok(config)
}

fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "no configuration file in {:?} (checked {:?})",
        root, CONFIG_CANDIDATES
    )))
}

/// Loads a typed YAML document from a file.
pub(crate) fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path).map_err(|e| InfrastructureError::file_access(path, e))?;
    Ok(serde_yaml::from_str(&content)?)
}

fn apply_env_overrides(config: &mut ProjectConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("PARAMCHECK_DATA_DIR") {
        info!(old = ?config.data_dir, new = ?val, "Overriding data dir via ENV");
        config.data_dir = val;
    }
    if let Some(val) = var("PARAMCHECK_REPORT_PATH") {
        info!(old = ?config.report.path, new = ?val, "Overriding report path via ENV");
        config.report.path = val;
    }
    if let Some(val) = var("PARAMCHECK_STRICT") {
        let strict = matches!(val.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on");
        info!(old = config.strict, new = strict, "Overriding strict mode via ENV");
        config.strict = strict;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_loads_alias_file_name() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("paramcheck_project.yaml"),
            "name: audit\ndata-dir: exports\n",
        )?;
        let project = Project::load(dir.path())?;
        assert_eq!(project.config.name, "audit");
        assert_eq!(project.data_dir(), dir.path().join("exports"));
        assert_eq!(project.report_path(), dir.path().join("target/report.txt"));
        Ok(())
    }

    #[test]
    fn test_missing_config_is_reported() -> Result<()> {
        let dir = tempdir()?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigNotFound(_)));
        Ok(())
    }

    #[test]
    fn test_invalid_config_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("paramcheck.yaml"), "name: ''\n")?;
        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, InfrastructureError::ConfigError(_)));
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut config: ProjectConfig = serde_yaml::from_str("name: audit")?;
        let env: HashMap<&str, &str> = HashMap::from([
            ("PARAMCHECK_DATA_DIR", "/srv/exports"),
            ("PARAMCHECK_STRICT", "TRUE"),
        ]);
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.data_dir, "/srv/exports");
        assert_eq!(config.report.path, "target/report.txt");
        assert!(config.strict);
        Ok(())
    }
}
