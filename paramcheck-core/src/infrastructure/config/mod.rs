pub mod project;

pub use crate::domain::project::ProjectConfig;
pub use project::{CONFIG_CANDIDATES, Project, load_project_config};
