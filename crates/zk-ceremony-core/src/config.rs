//! Run configuration for the ceremony assembly pipeline.
//!
//! Every directory and endpoint the pipeline touches is an explicit config
//! value passed into the entry point — never implicit process-wide state —
//! so isolated test runs can point everything at temporary locations.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CeremonyError, Result};

/// Default public mirror hosting the Hermez powers-of-tau ceremony files.
pub const DEFAULT_PTAU_BASE_URL: &str =
    "https://hermez.s3-eu-west-1.amazonaws.com";

/// Configuration for one ceremony assembly run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupConfig {
    /// Directory scanned for `.r1cs` circuit files.
    pub working_dir: PathBuf,
    /// Directory receiving per-circuit metadata reports. Cleared at run start.
    pub metadata_dir: PathBuf,
    /// Local powers-of-tau cache. Persists across runs, never cleared by setup.
    pub ptau_dir: PathBuf,
    /// Directory receiving the computed initial zkeys. Cleared at run start.
    pub zkeys_dir: PathBuf,
    /// Base URL of the powers-of-tau mirror.
    pub ptau_base_url: String,
    /// Base URL of the durable object storage service.
    pub storage_base_url: String,
    /// Base URL of the coordinator backend API.
    pub api_base_url: String,
    /// Bearer token for the coordinator backend, if already obtained.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("."),
            metadata_dir: PathBuf::from("./metadata"),
            ptau_dir: PathBuf::from("./ptau"),
            zkeys_dir: PathBuf::from("./zkeys"),
            ptau_base_url: DEFAULT_PTAU_BASE_URL.into(),
            storage_base_url: "http://localhost:9000/ceremonies".into(),
            api_base_url: "http://localhost:3000/api".into(),
            api_token: None,
        }
    }
}

impl SetupConfig {
    /// Load config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| CeremonyError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| CeremonyError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load config from a JSON file, falling back to defaults if it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| CeremonyError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Recreate the run-scoped output directories (metadata, zkeys) empty,
    /// and make sure the persistent ptau cache directory exists.
    ///
    /// The ptau cache is deliberately never cleared here: cached parameter
    /// files are valid across ceremonies and expensive to re-download.
    pub fn prepare_dirs(&self) -> Result<()> {
        for dir in [&self.metadata_dir, &self.zkeys_dir] {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
            std::fs::create_dir_all(dir)?;
        }
        std::fs::create_dir_all(&self.ptau_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zk-ceremony.config.json");
        let mut config = SetupConfig::default();
        config.api_token = Some("secret".into());
        config.save(&path).unwrap();
        let loaded = SetupConfig::load(&path).unwrap();
        assert_eq!(loaded.ptau_base_url, config.ptau_base_url);
        assert_eq!(loaded.api_token.as_deref(), Some("secret"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = SetupConfig::load_or_default(Path::new("/tmp/nonexistent_zk_ceremony_config"))
            .unwrap();
        assert_eq!(config.ptau_base_url, DEFAULT_PTAU_BASE_URL);
    }

    #[test]
    fn test_prepare_dirs_clears_run_outputs_keeps_ptau() {
        let dir = tempfile::tempdir().unwrap();
        let config = SetupConfig {
            working_dir: dir.path().to_path_buf(),
            metadata_dir: dir.path().join("metadata"),
            ptau_dir: dir.path().join("ptau"),
            zkeys_dir: dir.path().join("zkeys"),
            ..SetupConfig::default()
        };
        std::fs::create_dir_all(&config.metadata_dir).unwrap();
        std::fs::write(config.metadata_dir.join("stale.log"), "old").unwrap();
        std::fs::create_dir_all(&config.ptau_dir).unwrap();
        std::fs::write(config.ptau_dir.join("powersOfTau28_hez_final_09.ptau"), "pot").unwrap();

        config.prepare_dirs().unwrap();

        assert!(!config.metadata_dir.join("stale.log").exists());
        assert!(config.zkeys_dir.exists());
        assert!(config
            .ptau_dir
            .join("powersOfTau28_hez_final_09.ptau")
            .exists());
    }
}
