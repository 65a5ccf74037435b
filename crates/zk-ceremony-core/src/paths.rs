//! Typed storage path construction.
//!
//! The durable storage namespace is laid out as:
//!
//! ```text
//! <ceremony-prefix>/pot/powersOfTau28_hez_final_NN.ptau
//! <ceremony-prefix>/circuits/<circuit-prefix>/<circuit-prefix>.r1cs
//! <ceremony-prefix>/circuits/<circuit-prefix>/contributions/<circuit-prefix>_00000.zkey
//! ```
//!
//! Every path the pipeline uploads to is produced here, so the shape is
//! defined once and testable independent of the staging code.

use std::fmt;

/// Name of the canonical ceremony file for a given exponent, e.g.
/// `powersOfTau28_hez_final_09.ptau`.
pub fn ptau_filename(power: u32) -> String {
    format!("powersOfTau28_hez_final_{power:02}.ptau")
}

/// Name of a circuit's genesis contribution file, e.g. `multiplier_00000.zkey`.
pub fn initial_zkey_filename(circuit_prefix: &str) -> String {
    format!("{circuit_prefix}_00000.zkey")
}

/// A path inside the ceremony's durable storage namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builder for all storage paths under one ceremony's namespace.
#[derive(Debug, Clone)]
pub struct CeremonyPaths {
    prefix: String,
}

impl CeremonyPaths {
    pub fn new(ceremony_prefix: impl Into<String>) -> Self {
        Self {
            prefix: ceremony_prefix.into(),
        }
    }

    pub fn ceremony_prefix(&self) -> &str {
        &self.prefix
    }

    /// Shared parameter file for the given exponent.
    pub fn ptau(&self, power: u32) -> StoragePath {
        StoragePath(format!("{}/pot/{}", self.prefix, ptau_filename(power)))
    }

    /// A circuit's description file.
    pub fn r1cs(&self, circuit_prefix: &str) -> StoragePath {
        StoragePath(format!(
            "{}/circuits/{circuit_prefix}/{circuit_prefix}.r1cs",
            self.prefix
        ))
    }

    /// A circuit's genesis contribution artifact.
    pub fn initial_zkey(&self, circuit_prefix: &str) -> StoragePath {
        StoragePath(format!(
            "{}/circuits/{circuit_prefix}/contributions/{}",
            self.prefix,
            initial_zkey_filename(circuit_prefix)
        ))
    }
}
