//! The ceremony assembly pipeline.
//!
//! [`SetupPipeline`] drives the three phases that follow circuit collection:
//!
//! 1. **prepare** — extract metadata for every collected circuit. Purely
//!    local; nothing is written to durable storage, so a metadata failure
//!    aborts the run with zero remote side effects.
//! 2. **stage_all** — per circuit, in strict sequence order: resolve the
//!    ptau file, compute the genesis zkey, upload the three artifacts, and
//!    record their storage paths and content hashes.
//! 3. **register** — submit the assembled ceremony to the coordinator as a
//!    single request. This is the one commitment point; everything before
//!    it is discardable local state plus idempotent storage writes.
//!
//! Circuits are staged one at a time: circuit k+1 never starts before
//! circuit k has fully finished, because storage paths and the registration
//! payload assume total ordering.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::cache::{PtauCache, PtauSource};
use crate::ceremony::{
    CeremonyInputData, CeremonyRegistration, Circuit, CircuitFiles, CircuitTimings,
    CollectedCircuit, PreparedCircuit, RegistrationReceipt,
};
use crate::config::SetupConfig;
use crate::engine::SetupEngine;
use crate::error::{CeremonyError, Result};
use crate::metadata;
use crate::paths::{initial_zkey_filename, ptau_filename, CeremonyPaths};
use crate::registry::CeremonyRegistry;
use crate::storage::CeremonyStorage;

/// The assembly pipeline with all of its external collaborators.
pub struct SetupPipeline<E, P, S, R>
where
    E: SetupEngine,
    P: PtauSource,
    S: CeremonyStorage,
    R: CeremonyRegistry,
{
    config: SetupConfig,
    engine: E,
    cache: PtauCache<P>,
    storage: S,
    registry: R,
}

impl<E, P, S, R> SetupPipeline<E, P, S, R>
where
    E: SetupEngine,
    P: PtauSource,
    S: CeremonyStorage,
    R: CeremonyRegistry,
{
    pub fn new(config: SetupConfig, engine: E, source: P, storage: S, registry: R) -> Self {
        let cache = PtauCache::new(config.ptau_dir.clone(), source);
        Self {
            config,
            engine,
            cache,
            storage,
            registry,
        }
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn ptau_source(&self) -> &P {
        self.cache.source()
    }

    /// Extract metadata for every collected circuit, in sequence order.
    ///
    /// The engine returns the statistics report by value, which doubles as
    /// the completion signal: once it resolves, the report is fully
    /// materialized. A copy is written to the metadata directory for the
    /// operator's record before parsing.
    pub async fn prepare(&self, collected: Vec<CollectedCircuit>) -> Result<Vec<PreparedCircuit>> {
        let mut prepared = Vec::with_capacity(collected.len());
        for circuit in collected {
            let report = self.engine.r1cs_report(&circuit.r1cs_path).await?;

            let report_path = self
                .config
                .metadata_dir
                .join(format!("{}_metadata.log", circuit.input.prefix));
            tokio::fs::write(&report_path, &report).await?;

            let metadata = metadata::parse_report(&report)?;
            tracing::info!(
                "circuit '{}': {} constraints, pot 2^{}",
                circuit.input.name,
                metadata.constraints,
                metadata.pot
            );

            prepared.push(PreparedCircuit {
                input: circuit.input,
                r1cs_path: circuit.r1cs_path,
                metadata,
            });
        }
        Ok(prepared)
    }

    /// Stage every prepared circuit into durable storage, strictly in
    /// ascending sequence-position order.
    pub async fn stage_all(
        &self,
        ceremony_prefix: &str,
        mut prepared: Vec<PreparedCircuit>,
    ) -> Result<Vec<Circuit>> {
        prepared.sort_by_key(|c| c.input.sequence_position);
        for (i, circuit) in prepared.iter().enumerate() {
            if circuit.input.sequence_position != i as u32 + 1 {
                return Err(CeremonyError::InvalidInput(format!(
                    "circuit sequence positions must be contiguous from 1, found {} at index {i}",
                    circuit.input.sequence_position
                )));
            }
        }

        let paths = CeremonyPaths::new(ceremony_prefix);
        let mut staged = Vec::with_capacity(prepared.len());
        for circuit in prepared {
            staged.push(self.stage_circuit(&paths, circuit).await?);
        }
        Ok(staged)
    }

    /// Stage one circuit: ptau resolution, zkey computation, three uploads,
    /// three content hashes.
    async fn stage_circuit(
        &self,
        paths: &CeremonyPaths,
        circuit: PreparedCircuit,
    ) -> Result<Circuit> {
        let prefix = &circuit.input.prefix;
        let pot = circuit.metadata.pot;
        tracing::info!(
            "staging circuit {} '{}'",
            circuit.input.sequence_position,
            circuit.input.name
        );

        // 1. Local ptau file, downloading on a cold cache.
        let local_ptau = self.cache.ensure(pot).await?;

        // 2. Storage presence of the ptau object. Independent of the local
        // cache: a previous ceremony may have warmed the cache without this
        // namespace ever seeing an upload, or vice versa.
        let pot_storage_path = paths.ptau(pot);
        let pot_already_stored = self.storage.exists(&pot_storage_path).await?;

        // 3. Genesis zkey computation.
        let zkey_filename = initial_zkey_filename(prefix);
        let local_zkey = self.config.zkeys_dir.join(&zkey_filename);
        self.engine
            .new_zkey(&circuit.r1cs_path, &local_ptau, &local_zkey)
            .await?;

        // 4. The zkey path is unique per circuit, so its upload is
        // unconditional.
        let zkey_storage_path = paths.initial_zkey(prefix);
        self.storage.upload(&local_zkey, &zkey_storage_path).await?;

        // 5. The ptau object is shared across circuits; skip when present.
        if pot_already_stored {
            tracing::info!("{pot_storage_path} already stored, skipping upload");
        } else {
            self.storage.upload(&local_ptau, &pot_storage_path).await?;
        }

        // 6. The r1cs upload is unconditional as well.
        let r1cs_storage_path = paths.r1cs(prefix);
        self.storage
            .upload(&circuit.r1cs_path, &r1cs_storage_path)
            .await?;

        // 7. Content hashes over the local artifact bytes.
        let files = CircuitFiles {
            r1cs_filename: format!("{prefix}.r1cs"),
            r1cs_hash: hash_file(&circuit.r1cs_path).await?,
            r1cs_storage_path: r1cs_storage_path.into_string(),
            pot_filename: ptau_filename(pot),
            pot_hash: hash_file(&local_ptau).await?,
            pot_storage_path: pot_storage_path.into_string(),
            initial_zkey_filename: zkey_filename,
            initial_zkey_hash: hash_file(&local_zkey).await?,
            initial_zkey_storage_path: zkey_storage_path.into_string(),
        };

        Ok(Circuit {
            input: circuit.input,
            metadata: circuit.metadata,
            files,
            timings: CircuitTimings::default(),
        })
    }

    /// Submit the assembled ceremony to the coordinator.
    pub async fn register(
        &self,
        ceremony: CeremonyInputData,
        circuits: Vec<Circuit>,
    ) -> Result<RegistrationReceipt> {
        let prefix = ceremony.prefix();
        let registration = CeremonyRegistration {
            ceremony,
            prefix,
            circuits,
        };
        self.registry.register(&registration).await
    }
}

/// SHA-256 of a file's bytes as 64 lowercase hex characters, streamed so
/// multi-gigabyte ptau files never sit in memory whole.
pub async fn hash_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_file_matches_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.bin");
        std::fs::write(&path, b"abc").unwrap();

        let hash = hash_file(&path).await.unwrap();
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash.len(), 64);
    }

    #[tokio::test]
    async fn test_hash_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        std::fs::write(&path, b"").unwrap();

        let hash = hash_file(&path).await.unwrap();
        assert_eq!(
            hash,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
