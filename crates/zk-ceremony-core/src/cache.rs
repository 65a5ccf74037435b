//! Local powers-of-tau parameter cache.
//!
//! Parameter files are large and valid for any ceremony, so they are cached
//! in a directory that persists across runs. [`PtauCache::ensure`] is
//! idempotent: a cached exponent is never downloaded again, and repeated
//! calls within a run hit the same file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::{CeremonyError, Result};
use crate::paths::ptau_filename;

/// Remote source of canonical powers-of-tau files.
#[async_trait]
pub trait PtauSource: Send + Sync {
    /// Download the parameter file for `power` to `dest`.
    ///
    /// `dest` must be fully written when this returns `Ok`; a failed or
    /// partial transfer must return an error instead.
    async fn fetch(&self, power: u32, dest: &Path) -> Result<()>;
}

/// Downloads parameter files from a ceremony mirror over HTTP.
pub struct HttpPtauSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPtauSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl PtauSource for HttpPtauSource {
    async fn fetch(&self, power: u32, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ptau_filename(power));
        tracing::info!("downloading {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CeremonyError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CeremonyError::Download {
                url,
                reason: format!("HTTP {}", response.status()),
            });
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| CeremonyError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// The local cache directory and its download source.
pub struct PtauCache<S: PtauSource> {
    dir: PathBuf,
    source: S,
}

impl<S: PtauSource> PtauCache<S> {
    pub fn new(dir: impl Into<PathBuf>, source: S) -> Self {
        Self {
            dir: dir.into(),
            source,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Return the local path of the parameter file for `power`, downloading
    /// it first if no cached copy exists.
    ///
    /// Download failure is fatal and not retried: a partial parameter file
    /// would silently corrupt every zkey computed from it.
    pub async fn ensure(&self, power: u32) -> Result<PathBuf> {
        let filename = ptau_filename(power);
        let path = self.dir.join(&filename);

        if self.contains(power)? {
            tracing::info!("ptau 2^{power} already cached at {}", path.display());
            return Ok(path);
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        // Download to a .part file and rename, so an interrupted transfer
        // never leaves a plausible-looking cache entry behind.
        let partial = self.dir.join(format!("{filename}.part"));
        self.source.fetch(power, &partial).await?;
        tokio::fs::rename(&partial, &path).await?;

        tracing::info!("cached ptau 2^{power} at {}", path.display());
        Ok(path)
    }

    /// Whether a cached file for exactly `power` is present.
    ///
    /// Scans file names only; unrelated files in the cache directory are
    /// ignored rather than treated as errors.
    pub fn contains(&self, power: u32) -> Result<bool> {
        if !self.dir.exists() {
            return Ok(false);
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(found) = power_from_filename(&name.to_string_lossy()) {
                if found == power {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Extract the exponent from a canonical ptau file name, or `None` for any
/// other name (including in-flight `.part` files).
fn power_from_filename(name: &str) -> Option<u32> {
    let rest = name.strip_prefix("powersOfTau28_hez_final_")?;
    let digits = rest.strip_suffix(".ptau")?;
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSource {
        fetches: AtomicU32,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                fetches: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl PtauSource for CountingSource {
        async fn fetch(&self, power: u32, dest: &Path) -> Result<()> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            tokio::fs::write(dest, format!("ptau-{power}")).await?;
            Ok(())
        }
    }

    #[test]
    fn test_power_from_filename() {
        assert_eq!(power_from_filename("powersOfTau28_hez_final_09.ptau"), Some(9));
        assert_eq!(power_from_filename("powersOfTau28_hez_final_28.ptau"), Some(28));
        assert_eq!(power_from_filename("powersOfTau28_hez_final_09.ptau.part"), None);
        assert_eq!(power_from_filename("notes.txt"), None);
        assert_eq!(power_from_filename("powersOfTau28_hez_final_xx.ptau"), None);
    }

    #[tokio::test]
    async fn test_ensure_downloads_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PtauCache::new(dir.path(), CountingSource::new());

        let first = cache.ensure(9).await.unwrap();
        let second = cache.ensure(9).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 1);

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["powersOfTau28_hez_final_09.ptau"]);
    }

    #[tokio::test]
    async fn test_ensure_skips_download_for_warm_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ptau_filename(12)), "existing").unwrap();

        let cache = PtauCache::new(dir.path(), CountingSource::new());
        let path = cache.ensure(12).await.unwrap();

        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_unrelated_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();
        std::fs::write(dir.path().join("powersOfTau28_hez_final_10.ptau.part"), "x").unwrap();

        let cache = PtauCache::new(dir.path(), CountingSource::new());
        assert!(!cache.contains(10).unwrap());

        cache.ensure(10).await.unwrap();
        assert_eq!(cache.source.fetches.load(Ordering::SeqCst), 1);
        assert!(cache.contains(10).unwrap());
    }
}
