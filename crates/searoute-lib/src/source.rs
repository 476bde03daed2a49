//! Where the packaged water mask comes from.
//!
//! Resolution order for the default location:
//! 1. Explicit location argument when provided.
//! 2. `SEAROUTE_MASK_PATH` environment variable.
//! 3. Platform-specific project data directory + `water_mask.bin`.

use std::env;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable overriding the mask location (path or URL).
pub const MASK_PATH_ENV: &str = "SEAROUTE_MASK_PATH";

/// Default filename for the packaged mask.
const MASK_FILENAME: &str = "water_mask.bin";

/// Asynchronous provider of raw mask bytes.
pub trait GridSource: Send + Sync {
    /// Fetch the complete encoded mask.
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}

/// Mask stored on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GridSource for FileSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            match tokio::fs::read(&self.path).await {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MaskNotFound {
                    path: self.path.clone(),
                }),
                Err(e) => Err(e.into()),
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Mask served over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl GridSource for HttpSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            debug!(url = %self.url, "requesting water mask");
            let response = self.client.get(&self.url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::MaskFetch {
                    url: self.url.clone(),
                    status: status.as_u16(),
                });
            }
            Ok(response.bytes().await?.to_vec())
        }
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Mask bytes already in memory, e.g. bundled with `include_bytes!`.
#[derive(Debug, Clone)]
pub struct StaticSource {
    bytes: Arc<[u8]>,
}

impl StaticSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl GridSource for StaticSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        let bytes = self.bytes.to_vec();
        async move { Ok(bytes) }
    }

    fn describe(&self) -> String {
        format!("<in-memory {} bytes>", self.bytes.len())
    }
}

/// Any of the built-in sources, chosen from a location string.
#[derive(Debug, Clone)]
pub enum MaskSource {
    File(FileSource),
    Http(HttpSource),
    Static(StaticSource),
}

impl MaskSource {
    /// `http://` and `https://` locations fetch over the network; anything
    /// else is a filesystem path.
    pub fn open(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            MaskSource::Http(HttpSource::new(location))
        } else {
            MaskSource::File(FileSource::new(location))
        }
    }
}

impl GridSource for MaskSource {
    fn fetch(&self) -> impl Future<Output = Result<Vec<u8>>> + Send {
        async move {
            match self {
                MaskSource::File(source) => source.fetch().await,
                MaskSource::Http(source) => source.fetch().await,
                MaskSource::Static(source) => source.fetch().await,
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            MaskSource::File(source) => source.describe(),
            MaskSource::Http(source) => source.describe(),
            MaskSource::Static(source) => source.describe(),
        }
    }
}

/// Resolve the default mask location using platform-specific project directories.
pub fn default_mask_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("org", "searoute", "searoute").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(MASK_FILENAME))
}

/// Pick the mask location: explicit argument, then environment, then default.
pub fn resolve_mask_location(explicit: Option<&str>) -> Result<String> {
    if let Some(location) = explicit {
        return Ok(location.to_string());
    }
    if let Ok(location) = env::var(MASK_PATH_ENV) {
        if !location.trim().is_empty() {
            return Ok(location);
        }
    }
    Ok(default_mask_path()?.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_detects_urls() {
        assert!(matches!(
            MaskSource::open("https://example.org/mask.bin"),
            MaskSource::Http(_)
        ));
        assert!(matches!(
            MaskSource::open("HTTP://example.org/mask.bin"),
            MaskSource::Http(_)
        ));
        assert!(matches!(
            MaskSource::open("/data/mask.bin"),
            MaskSource::File(_)
        ));
    }

    #[test]
    fn explicit_location_wins() {
        let location = resolve_mask_location(Some("/tmp/a.bin")).unwrap();
        assert_eq!(location, "/tmp/a.bin");
    }

    #[tokio::test]
    async fn missing_file_reports_mask_not_found() {
        let source = FileSource::new("/definitely/not/here/mask.bin");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, Error::MaskNotFound { .. }));
    }

    #[tokio::test]
    async fn static_source_returns_bytes() {
        let source = StaticSource::new(vec![1u8, 2, 3]);
        assert_eq!(source.fetch().await.unwrap(), vec![1, 2, 3]);
        assert!(source.describe().contains("3 bytes"));
    }
}
