//! Download-and-hash of release artifacts.

use crate::core::path::ensure_dir;
use crate::core::{UpdateError, UpdateResult};
use crate::di::traits::ArtifactHasher;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client as HttpClient;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Staging file that is removed when dropped.
///
/// Covers every exit path of a hash pass, including a cancelled download.
struct StagingFile {
    path: PathBuf,
}

impl StagingFile {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove staging file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Calculate the SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> UpdateResult<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];

    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Streams artifacts to a staging file and hashes them
pub struct HashVerifier {
    http_client: HttpClient,
}

impl HashVerifier {
    /// Create a verifier with its own HTTP client
    pub fn new() -> UpdateResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent("update-server")
            .timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| UpdateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }

    /// Download `url` into `staging_path`, hash it, and remove the file
    pub async fn download_and_hash(&self, url: &str, staging_path: &Path) -> UpdateResult<String> {
        if let Some(parent) = staging_path.parent() {
            ensure_dir(parent)?;
        }

        let staging = StagingFile::new(staging_path.to_path_buf());
        self.download_to(url, staging.path()).await?;

        let hash = sha256_file(staging.path())?;
        tracing::debug!("Hashed {}: {}", url, hash);

        Ok(hash)
    }

    async fn download_to(&self, url: &str, path: &Path) -> UpdateResult<()> {
        tracing::trace!("Downloading {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| UpdateError::Download(format!("Failed to download {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(UpdateError::Download(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                UpdateError::Download(format!("Transfer of {} interrupted: {}", url, e))
            })?;
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl ArtifactHasher for HashVerifier {
    async fn hash_artifact(&self, url: &str, staging_path: &Path) -> UpdateResult<String> {
        self.download_and_hash(url, staging_path).await
    }
}
