// paramcheck-core/src/ports/mod.rs

// What the application needs from the outside world, without knowing how it
// is stored: a knowledge base and the exported MO data.

pub mod source;

pub use source::{GroupSource, KnowledgeSource};
