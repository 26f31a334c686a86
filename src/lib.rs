// src/lib.rs

pub mod assembler; // Five-phase workflow assembly + validation
pub mod axis; // size x container x object cell expansion
pub mod builder; // Per-phase stage construction
pub mod config;
pub mod constants;
pub mod emit; // Persist / submit routing
pub mod error;
pub mod generator;
pub mod model;
pub mod range; // Id ranges and the per-phase allocator
pub mod serde_helpers;
pub mod size;
pub mod summary; // Dry-run plan summary

pub use config::{EmitMode, RawRequest};
pub use emit::{ControllerClient, DocumentStore, PlanEmitter, SubmissionSink};
pub use error::{GroupError, PlanError};
pub use generator::{generate, generate_from_raw, GenerationReport};
pub use model::Workload;
