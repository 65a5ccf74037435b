//! Driver for the external snarkjs toolchain.
//!
//! The pipeline treats snarkjs as a black box with two operations: produce
//! an r1cs statistics report, and compute a circuit's genesis zkey. Both are
//! exposed behind [`SetupEngine`] so tests can script their outcomes.

use std::path::Path;
use std::process::Command;

use async_trait::async_trait;

use crate::error::{CeremonyError, Result};

/// The cryptographic setup routines the pipeline depends on.
#[async_trait]
pub trait SetupEngine: Send + Sync {
    /// Produce the statistics report for an r1cs file.
    ///
    /// The returned string is the completion signal: when this resolves,
    /// the report is fully materialized and safe to parse.
    async fn r1cs_report(&self, r1cs_path: &Path) -> Result<String>;

    /// Compute the genesis zkey for a circuit from its r1cs and parameter
    /// file, writing it to `zkey_out`.
    async fn new_zkey(&self, r1cs_path: &Path, ptau_path: &Path, zkey_out: &Path) -> Result<()>;
}

/// Wrapper around the `snarkjs` CLI.
pub struct SnarkjsEngine {
    binary: String,
}

impl SnarkjsEngine {
    /// Create a new wrapper, verifying snarkjs is installed.
    pub fn new() -> Result<Self> {
        which::which("snarkjs").map_err(|_| CeremonyError::MissingTool {
            name: "snarkjs".into(),
            install: "npm install -g snarkjs".into(),
        })?;
        Ok(Self {
            binary: "snarkjs".into(),
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("snarkjs {}", args.join(" "));

        let output = Command::new(&self.binary).args(args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(CeremonyError::Compute(format!(
                "snarkjs {} failed:\nstdout: {stdout}\nstderr: {stderr}",
                args.first().unwrap_or(&"")
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl SetupEngine for SnarkjsEngine {
    async fn r1cs_report(&self, r1cs_path: &Path) -> Result<String> {
        self.run(&["r1cs", "info", &r1cs_path.display().to_string()])
    }

    async fn new_zkey(&self, r1cs_path: &Path, ptau_path: &Path, zkey_out: &Path) -> Result<()> {
        self.run(&[
            "groth16",
            "setup",
            &r1cs_path.display().to_string(),
            &ptau_path.display().to_string(),
            &zkey_out.display().to_string(),
        ])?;

        // snarkjs exits zero even for some setup failures that produce no
        // output file, so require the zkey to actually exist.
        if !zkey_out.exists() {
            return Err(CeremonyError::Compute(format!(
                "groth16 setup reported success but wrote no zkey at {}",
                zkey_out.display()
            )));
        }
        Ok(())
    }
}
