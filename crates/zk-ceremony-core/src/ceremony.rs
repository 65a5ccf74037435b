//! Ceremony and circuit data model.
//!
//! A circuit record moves through three shapes as the pipeline enriches it:
//!
//! ```text
//! CollectedCircuit  (operator input + local r1cs path)
//!   └─ prepare ──▶ PreparedCircuit  (+ extracted metadata, pot exponent)
//!        └─ stage ──▶ Circuit  (+ staged file records, zeroed timings)
//! ```
//!
//! [`Circuit`] is the final registration payload record. Nothing is ever
//! removed from a record once written; a fatal error aborts the whole run
//! before registration instead.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, Result};

/// Ceremony-level input supplied by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonyInputData {
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl CeremonyInputData {
    /// Validate and construct ceremony input. The start date must precede
    /// the end date.
    pub fn new(
        title: String,
        description: String,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self> {
        if start_date >= end_date {
            return Err(CeremonyError::InvalidInput(format!(
                "ceremony start date {start_date} is not before end date {end_date}"
            )));
        }
        Ok(Self {
            title,
            description,
            start_date,
            end_date,
        })
    }

    /// Derive the URL-safe storage prefix from the title.
    ///
    /// The prefix is the ceremony's namespace root in durable storage.
    /// Uniqueness among concurrently staged ceremonies is checked by the
    /// coordinator backend, not locally.
    pub fn prefix(&self) -> String {
        slugify(&self.title)
    }
}

/// Per-circuit input collected from the operator, immutable once collected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitInputData {
    pub name: String,
    pub description: String,
    /// 1-based position in the ceremony; strictly increasing, no gaps.
    pub sequence_position: u32,
    /// Storage prefix derived from the circuit name.
    pub prefix: String,
    /// How long a later contributor may hold the circuit before timing out.
    pub max_contribution_wait_minutes: u32,
}

impl CircuitInputData {
    pub fn new(
        name: String,
        description: String,
        sequence_position: u32,
        max_contribution_wait_minutes: u32,
    ) -> Self {
        let prefix = slugify(&name);
        Self {
            name,
            description,
            sequence_position,
            prefix,
            max_contribution_wait_minutes,
        }
    }
}

/// Circuit statistics extracted from the r1cs report, plus the derived
/// powers-of-tau exponent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitMetadata {
    pub curve: String,
    pub wires: u64,
    pub constraints: u64,
    pub private_inputs: u64,
    pub public_inputs: u64,
    pub labels: u64,
    pub outputs: u64,
    /// Smallest exponent n with 2^n >= constraints.
    pub pot: u32,
}

/// Names, storage paths and content hashes of the three staged artifacts.
///
/// Populated only after the circuit has been fully staged; every field is
/// non-empty from then on. Hashes are SHA-256 digests of the artifact bytes,
/// rendered as 64 lowercase hex characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitFiles {
    pub r1cs_filename: String,
    pub r1cs_storage_path: String,
    pub r1cs_hash: String,
    pub pot_filename: String,
    pub pot_storage_path: String,
    pub pot_hash: String,
    pub initial_zkey_filename: String,
    pub initial_zkey_storage_path: String,
    pub initial_zkey_hash: String,
}

/// Running average timings, maintained by the later contribution phase.
/// Zeroed at setup time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitTimings {
    pub avg_contribution_ms: u64,
    pub avg_verification_ms: u64,
}

/// A fully-assembled circuit record, ready for registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circuit {
    #[serde(flatten)]
    pub input: CircuitInputData,
    pub metadata: CircuitMetadata,
    pub files: CircuitFiles,
    pub timings: CircuitTimings,
}

/// A circuit right after operator collection: input data plus the local
/// path of its r1cs file.
#[derive(Debug, Clone)]
pub struct CollectedCircuit {
    pub input: CircuitInputData,
    pub r1cs_path: PathBuf,
}

/// A collected circuit enriched with extracted metadata, ready for staging.
#[derive(Debug, Clone)]
pub struct PreparedCircuit {
    pub input: CircuitInputData,
    pub r1cs_path: PathBuf,
    pub metadata: CircuitMetadata,
}

/// The single registration request submitted to the coordinator backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CeremonyRegistration {
    pub ceremony: CeremonyInputData,
    pub prefix: String,
    pub circuits: Vec<Circuit>,
}

/// Acknowledgement returned by the coordinator backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    pub ceremony_id: String,
}

/// Lowercase a title and collapse every run of non-alphanumeric characters
/// into a single dash, trimming dashes at both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
