//! Unified error types for the zk-ceremony toolkit.
//!
//! Every pipeline error is terminal for the run: nothing is retried and
//! nothing is recovered locally. A ceremony is assembled once; after a failure
//! the operator fixes the root cause and re-invokes.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur during ceremony assembly.
#[derive(Error, Debug)]
pub enum CeremonyError {
    // --- Configuration ---

    /// The configuration file (`zk-ceremony.config.json`) was not found.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Ceremony or circuit input failed validation (e.g. start date after end date).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // --- Prerequisites ---

    /// A required external tool (e.g. `snarkjs`) is not installed.
    #[error("required tool '{name}' not found — install: {install}")]
    MissingTool { name: String, install: String },

    // --- Collection ---

    /// No eligible circuit files were found in the working directory.
    #[error("no .r1cs circuit files found in {0}")]
    Collection(PathBuf),

    // --- Metadata ---

    /// A required field is missing or malformed in an r1cs statistics report.
    #[error("metadata parse failed for '{label}': {reason}")]
    MetadataParse { label: String, reason: String },

    // --- Staging ---

    /// A powers-of-tau parameter file could not be downloaded.
    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    /// The external contribution routine (groth16 setup) failed.
    #[error("zkey computation failed: {0}")]
    Compute(String),

    /// A durable-storage write or existence check failed.
    #[error("storage operation failed for {path}: {reason}")]
    Upload { path: String, reason: String },

    // --- Registration ---

    /// The coordinator backend rejected or failed the registration call.
    #[error("ceremony registration failed: {0}")]
    Registration(String),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, CeremonyError>`.
pub type Result<T> = std::result::Result<T, CeremonyError>;
