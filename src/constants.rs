// src/constants.rs
//
// Central location for the defaults used throughout workgen
// Keeps naming and output conventions in one place

// =============================================================================
// Workload Identity Defaults
// =============================================================================

/// Workload name used when the request does not supply one
pub const DEFAULT_WORKLOAD_NAME: &str = "workload";

/// Workload description used when the request does not supply one
pub const DEFAULT_WORKLOAD_DESCRIPTION: &str = "workload description";

/// Name of the single work unit inside every normal-phase stage
pub const NORMAL_WORK_NAME: &str = "main";

// =============================================================================
// Output Defaults
// =============================================================================

/// Directory that persisted workload documents are written to
/// User can override via CLI: --output-dir, or env: WORKGEN_OUTPUT_DIR
pub const DEFAULT_OUTPUT_DIR: &str = "workload-configs";

/// Prefix of every persisted document's file name
pub const DOCUMENT_PREFIX: &str = "objSizes-";

/// Extension of persisted documents (serde_yaml output)
pub const DOCUMENT_EXTENSION: &str = "yaml";

// =============================================================================
// Stage Defaults
// =============================================================================

/// Worker count for init, cleanup and dispose works
pub const SINGLE_WORKER: u32 = 1;

/// Upper bound for a single operation ratio (percent)
pub const MAX_RATIO: u32 = 100;

// =============================================================================
// Controller Submission
// =============================================================================

/// Path (relative to the controller base URL) accepting a workload document
pub const CONTROLLER_SUBMIT_PATH: &str = "submit";

/// Path (relative to the controller base URL) that starts a submitted workload
pub const CONTROLLER_FIRE_PATH: &str = "fire";

/// Connect/request timeout for controller calls (seconds)
pub const CONTROLLER_TIMEOUT_SECS: u64 = 30;
