// paramcheck-core/src/ports/source.rs

use crate::domain::group::MoGroup;
use crate::domain::knowledge::KnowledgeBase;
use crate::error::ParamCheckError;

/// Produces a loaded knowledge base (parameter definitions and rules).
pub trait KnowledgeSource: Send + Sync {
    fn load(&self) -> Result<KnowledgeBase, ParamCheckError>;
}

/// Produces the MO groups of an export: one group per (MO, instance key).
pub trait GroupSource: Send + Sync {
    fn load_groups(&self) -> Result<Vec<MoGroup>, ParamCheckError>;
}
