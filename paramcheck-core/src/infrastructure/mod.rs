// paramcheck-core/src/infrastructure/mod.rs

pub mod config;
pub mod data;
pub mod error;
pub mod fs;
pub mod knowledge;
pub mod report;
pub mod scaffold;
pub mod table;
