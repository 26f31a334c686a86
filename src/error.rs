//! Error types for workload plan generation.

use thiserror::Error;

/// Errors raised while turning a request into a workload plan
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("group {group}: malformed {axis} axis: {reason}")]
    MalformedAxis {
        group: usize,
        axis: &'static str,
        reason: String,
    },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(
        "group {group}: stage {stage} would run with 0 workers \
         ({objects} objects / {drivers} drivers); raise the object count or lower num_of_drivers"
    )]
    DegenerateWorkers {
        group: usize,
        stage: String,
        objects: u64,
        drivers: u64,
    },

    #[error("{kind} id range overflow after offset {offset} (+{count})")]
    RangeOverflow {
        kind: &'static str,
        offset: u64,
        count: u64,
    },

    #[error("invalid workload: {0}")]
    InvalidWorkload(String),

    #[error("invalid selector expression '{0}'")]
    InvalidSelector(String),

    #[error("emission failed: {0}")]
    Emit(String),
}

/// A failure scoped to one size group of a multi-group request
#[derive(Debug, Error)]
#[error("size group {index}: {source}")]
pub struct GroupError {
    pub index: usize,
    #[source]
    pub source: anyhow::Error,
}

impl GroupError {
    pub fn new(index: usize, source: impl Into<anyhow::Error>) -> Self {
        Self {
            index,
            source: source.into(),
        }
    }
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;
