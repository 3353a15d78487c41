//! Byte sources for the raster and CSV caches.
//!
//! A [`RemoteSource`] is the only collaborator that performs I/O on a cache
//! miss. The HTTP implementation is what runs in production; the file
//! implementation backs the offline `preview`/`stats` commands and local
//! deployments.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures_util::StreamExt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::FetchError;

/// Something that can produce the full encoded bytes of a dataset.
///
/// Uses `async_trait` so stores can hold an `Arc<dyn RemoteSource>`.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Human-readable location for logging (URL or path).
    fn location(&self) -> &str;

    /// Fetch the complete payload. No retries; one call is one attempt.
    async fn fetch(&self, timeout: Duration) -> Result<Bytes, FetchError>;
}

/// Build the appropriate source for a configured location.
///
/// `http://` and `https://` go over the network; anything else is read from
/// the local filesystem.
pub fn from_location(location: &str, client: reqwest::Client) -> Arc<dyn RemoteSource> {
    let resolved = Config::resolve_location(location);
    if resolved.starts_with("http://") || resolved.starts_with("https://") {
        Arc::new(HttpSource::with_client(&resolved, client))
    } else {
        Arc::new(FileSource::new(resolved))
    }
}

/// [`from_location`] with a fresh client, for one-off commands.
pub fn open(location: &str) -> Arc<dyn RemoteSource> {
    from_location(location, reqwest::Client::new())
}

/// GET a URL and return the body, mapping every failure to [`FetchError`].
pub async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Bytes, FetchError> {
    let classify = |e: reqwest::Error| {
        if e.is_timeout() {
            FetchError::Timeout {
                location: url.to_string(),
                timeout_secs: timeout.as_secs(),
            }
        } else {
            FetchError::Transport {
                location: url.to_string(),
                message: e.to_string(),
            }
        }
    };

    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(classify)?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            location: url.to_string(),
            status: status.as_u16(),
        });
    }

    // Content-Length is only a hint from the server; never reserve more than
    // the cap up front or a bogus header aborts the process.
    let total_size = resp.content_length();
    let hint = total_size.map_or(0, |t| t.min(PREALLOC_CAP));
    let mut body = BytesMut::with_capacity(hint as usize);
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(classify)?;
        body.extend_from_slice(&chunk);

        if let Some(total) = total_size {
            let downloaded = body.len() as u64;
            if downloaded % PROGRESS_STEP < chunk.len() as u64 {
                tracing::debug!(
                    location = url,
                    "Download progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    Ok(body.freeze())
}

const PROGRESS_STEP: u64 = 50 * 1024 * 1024;
const PREALLOC_CAP: u64 = 64 * 1024 * 1024;

/// Fetches over HTTP(S) with reqwest.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Share a client (and its connection pool) with other sources.
    pub fn with_client(url: &str, client: reqwest::Client) -> Self {
        Self {
            url: url.to_string(),
            client,
        }
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, timeout: Duration) -> Result<Bytes, FetchError> {
        fetch_bytes(&self.client, &self.url, timeout).await
    }
}

/// Reads a file from the local filesystem.
pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl RemoteSource for FileSource {
    fn location(&self) -> &str {
        &self.display
    }

    async fn fetch(&self, timeout: Duration) -> Result<Bytes, FetchError> {
        match tokio::time::timeout(timeout, tokio::fs::read(&self.path)).await {
            Ok(Ok(data)) => Ok(Bytes::from(data)),
            Ok(Err(e)) => Err(FetchError::Transport {
                location: self.display.clone(),
                message: e.to_string(),
            }),
            Err(_) => Err(FetchError::Timeout {
                location: self.display.clone(),
                timeout_secs: timeout.as_secs(),
            }),
        }
    }
}
