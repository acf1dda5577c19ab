// paramcheck-core/src/lib.rs

// 1. Mandatory documentation for production code
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contracts for knowledge-base and MO-data sources.
pub mod ports;

// 2. Domain (business core)
// Value model, condition language, knowledge base, findings.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// CSV / YAML readers, project config, report writers.
// Depends on the Domain and the Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Rule executor, validation driver, lint, sample project.
// Depends on the Domain, the Infra and the Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::ParamCheckError;
