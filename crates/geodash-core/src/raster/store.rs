//! Process-wide cache of the raw raster bytes.

use bytes::Bytes;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::error::FetchError;
use crate::source::RemoteSource;

/// Holds the encoded raster exactly as downloaded.
///
/// Constructed once at startup and shared by handle. Assignment replaces the
/// whole buffer; readers only ever see a complete payload or nothing.
#[derive(Default)]
pub struct RasterStore {
    bytes: RwLock<Option<Bytes>>,
    /// Serializes miss-triggered fetches so concurrent misses share one download.
    fill: Mutex<()>,
}

impl RasterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bytes, if any. Never performs I/O.
    pub fn get(&self) -> Option<Bytes> {
        self.bytes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached bytes.
    pub fn set(&self, bytes: Bytes) {
        *self.bytes.write().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
    }

    pub fn is_loaded(&self) -> bool {
        self.bytes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Return cached bytes, fetching from `source` first if the store is empty.
    ///
    /// A failed fetch leaves the store empty so the next caller tries again.
    pub async fn fetch_if_empty(
        &self,
        source: &dyn RemoteSource,
        timeout: Duration,
    ) -> Result<Bytes, FetchError> {
        if let Some(bytes) = self.get() {
            return Ok(bytes);
        }

        let _guard = self.fill.lock().await;
        // Another request may have filled the store while we waited.
        if let Some(bytes) = self.get() {
            tracing::debug!("Raster cache filled by concurrent request");
            return Ok(bytes);
        }

        tracing::info!(source = source.location(), "Raster cache miss, downloading");
        let bytes = source.fetch(timeout).await?;
        tracing::info!(
            source = source.location(),
            size_bytes = bytes.len(),
            size_mb = %format!("{:.2}", bytes.len() as f64 / 1024.0 / 1024.0),
            "Raster cached"
        );
        self.set(bytes.clone());
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::CountingSource;
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_new_store_is_empty() {
        let store = RasterStore::new();
        assert!(store.get().is_none());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_set_replaces_bytes() {
        let store = RasterStore::new();
        store.set(Bytes::from_static(b"first"));
        store.set(Bytes::from_static(b"second"));
        assert_eq!(store.get().unwrap(), Bytes::from_static(b"second"));
    }

    #[tokio::test]
    async fn test_hit_does_not_fetch() {
        let store = RasterStore::new();
        store.set(Bytes::from_static(b"cached"));
        let source = CountingSource::ok(Bytes::from_static(b"remote"));

        let bytes = store.fetch_if_empty(&source, TIMEOUT).await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"cached"));
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_miss_fetches_once_and_caches() {
        let store = RasterStore::new();
        let source = CountingSource::ok(Bytes::from_static(b"remote"));

        store.fetch_if_empty(&source, TIMEOUT).await.unwrap();
        store.fetch_if_empty(&source, TIMEOUT).await.unwrap();
        assert_eq!(source.calls(), 1);
        assert_eq!(store.get().unwrap(), Bytes::from_static(b"remote"));
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_store_empty_and_retries_next_time() {
        let store = RasterStore::new();
        let source = CountingSource::failing();

        assert!(store.fetch_if_empty(&source, TIMEOUT).await.is_err());
        assert!(!store.is_loaded());
        assert!(store.fetch_if_empty(&source, TIMEOUT).await.is_err());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_misses_share_one_fetch() {
        let store = Arc::new(RasterStore::new());
        let source = Arc::new(
            CountingSource::ok(Bytes::from_static(b"remote"))
                .with_delay(Duration::from_millis(50)),
        );

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let source = source.clone();
            handles.push(tokio::spawn(async move {
                store.fetch_if_empty(source.as_ref(), TIMEOUT).await
            }));
        }
        for handle in handles {
            assert_eq!(
                handle.await.unwrap().unwrap(),
                Bytes::from_static(b"remote")
            );
        }
        assert_eq!(source.calls(), 1);
    }
}
