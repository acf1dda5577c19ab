// paramcheck/src/commands/mod.rs

pub mod check;
pub mod eval;
pub mod init;
pub mod lint;

use anyhow::Context;
use paramcheck_core::domain::knowledge::KnowledgeBase;
use paramcheck_core::infrastructure::config::Project;
use paramcheck_core::infrastructure::knowledge::knowledge_source;
use paramcheck_core::ports::KnowledgeSource;
use std::path::Path;

/// Loads the project configuration and its knowledge base.
pub(crate) fn load_project(project_dir: &Path) -> anyhow::Result<(Project, KnowledgeBase)> {
    let project = Project::load(project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    let kb = knowledge_source(&project)
        .load()
        .context("Failed to load the knowledge base")?;
    Ok((project, kb))
}
