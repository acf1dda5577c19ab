// paramcheck-core/src/infrastructure/knowledge/yaml_document.rs

use crate::domain::knowledge::{KnowledgeBase, ParameterDefinition, ValidationRule};
use crate::error::ParamCheckError;
use crate::infrastructure::config::project::load_fragment;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;
use crate::ports::KnowledgeSource;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Single-file form of the knowledge base.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct KnowledgeDocument {
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
    #[serde(default)]
    pub rules: Vec<ValidationRule>,
}

impl KnowledgeDocument {
    pub fn write(&self, path: &Path) -> Result<(), InfrastructureError> {
        atomic_write(path, serde_yaml::to_string(self)?)
    }
}

#[derive(Debug, Clone)]
pub struct YamlKnowledgeSource {
    pub path: PathBuf,
}

impl KnowledgeSource for YamlKnowledgeSource {
    #[instrument(skip(self), fields(path = ?self.path))]
    fn load(&self) -> Result<KnowledgeBase, ParamCheckError> {
        let doc: KnowledgeDocument = load_fragment(&self.path)?;
        info!(
            parameters = doc.parameters.len(),
            rules = doc.rules.len(),
            "Knowledge base loaded"
        );
        Ok(KnowledgeBase::new(doc.parameters, doc.rules)?)
    }
}
