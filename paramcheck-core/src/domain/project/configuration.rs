// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Storage format of the knowledge base.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeFormat {
    /// Two tables: parameter definitions and validation rules.
    #[default]
    Csv,
    /// A single file with `parameters:` and `rules:` lists.
    Yaml,
}

/// Which instance keys a run covers.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum InstanceScope {
    /// Every instance key seen in any MO table.
    #[default]
    All,
    /// Only the instance keys present in every MO table.
    Common,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown report format: {}", s)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
#[validate(schema(function = "validate_knowledge_paths"))]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub format: KnowledgeFormat,
    pub parameters: Option<String>,
    pub rules: Option<String>,
    pub path: Option<String>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            format: KnowledgeFormat::Csv,
            parameters: Some("knowledge/parameters.csv".to_string()),
            rules: Some("knowledge/rules.csv".to_string()),
            path: None,
        }
    }
}

fn validate_knowledge_paths(config: &KnowledgeConfig) -> Result<(), ValidationError> {
    let complete = match config.format {
        KnowledgeFormat::Csv => config.parameters.is_some() && config.rules.is_some(),
        KnowledgeFormat::Yaml => config.path.is_some(),
    };
    if complete {
        return Ok(());
    }
    let mut err = ValidationError::new("knowledge_paths");
    err.message = Some(
        match config.format {
            KnowledgeFormat::Csv => "csv knowledge needs both `parameters` and `rules` paths",
            KnowledgeFormat::Yaml => "yaml knowledge needs a `path`",
        }
        .into(),
    );
    Err(err)
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct ReportConfig {
    #[validate(length(min = 1, message = "Report path cannot be empty"))]
    #[serde(default = "default_report_path")]
    pub path: String,
    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            format: ReportFormat::Text,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    #[validate(length(min = 1, message = "Project name cannot be empty"))]
    pub name: String,

    #[validate(nested)]
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    #[serde(rename = "data-dir", default = "default_data_dir")]
    pub data_dir: String,

    #[validate(length(min = 1, message = "At least one instance key column is required"))]
    #[serde(rename = "instance-keys", default = "default_instance_keys")]
    pub instance_keys: Vec<String>,

    #[serde(rename = "instance-scope", default)]
    pub instance_scope: InstanceScope,

    #[validate(nested)]
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub strict: bool,
}

fn default_data_dir() -> String {
    "data".to_string()
}
fn default_instance_keys() -> Vec<String> {
    vec!["f_site_id".to_string(), "f_cell_id".to_string()]
}
fn default_report_path() -> String {
    "target/report.txt".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_minimal_config_takes_defaults() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("name: audit")?;
        assert_eq!(config.data_dir, "data");
        assert_eq!(config.instance_keys, vec!["f_site_id", "f_cell_id"]);
        assert_eq!(config.instance_scope, InstanceScope::All);
        assert_eq!(config.knowledge, KnowledgeConfig::default());
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_full_config() -> Result<()> {
        let yaml = r#"
name: site-audit
knowledge:
  format: yaml
  path: knowledge/kb.yaml
data-dir: exports
instance-keys: [site]
instance-scope: common
report:
  path: out/report.json
  format: json
strict: true
"#;
        let config: ProjectConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.knowledge.format, KnowledgeFormat::Yaml);
        assert_eq!(config.instance_scope, InstanceScope::Common);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(config.strict);
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_validation_rejects_empty_keys_and_incomplete_knowledge() -> Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("name: a\ninstance-keys: []")?;
        assert!(config.validate().is_err());

        let config: ProjectConfig = serde_yaml::from_str("name: a\nknowledge:\n  format: yaml")?;
        assert!(config.validate().is_err());
        assert!(validate_knowledge_paths(&config.knowledge).is_err());
        Ok(())
    }
}
