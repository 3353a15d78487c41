//! Preview and stats orchestration over the shared raster cache.
//!
//! The `try_*` methods surface every failure as a [`RasterError`]. The plain
//! `preview`/`stats` methods are the public boundary: they log the failure and
//! return the placeholder PNG or a [`StatsOutcome`] marker instead.

use bytes::Bytes;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::decimate::decimate;
use super::decode::{decode, format_to_string};
use super::normalize::normalize;
use super::preview::PreviewEncoder;
use super::stats::{self, StatsOutcome, StatsRecord};
use super::store::RasterStore;
use crate::config::RasterConfig;
use crate::error::{FetchError, RasterError, RasterResult};
use crate::source::RemoteSource;

/// Serves previews and statistics for one configured raster.
pub struct RasterService {
    store: Arc<RasterStore>,
    source: Arc<dyn RemoteSource>,
    config: RasterConfig,
    placeholder: Bytes,
}

impl RasterService {
    /// Create a service over `store`, fetching from `source` on a miss.
    ///
    /// The placeholder PNG is encoded once here so the fallback path does no
    /// work that could itself fail.
    pub fn new(
        store: Arc<RasterStore>,
        source: Arc<dyn RemoteSource>,
        config: RasterConfig,
    ) -> RasterResult<Self> {
        let placeholder = Bytes::from(PreviewEncoder::placeholder(config.placeholder_size)?);
        Ok(Self {
            store,
            source,
            config,
            placeholder,
        })
    }

    pub fn store(&self) -> &Arc<RasterStore> {
        &self.store
    }

    /// The fallback PNG served when a preview cannot be produced.
    pub fn placeholder(&self) -> &Bytes {
        &self.placeholder
    }

    /// Startup fetch: download with the long timeout and populate the store.
    pub async fn preload(&self) -> Result<usize, FetchError> {
        let timeout = Duration::from_secs(self.config.startup_timeout_secs);
        let bytes = self.source.fetch(timeout).await?;
        let size = bytes.len();
        self.store.set(bytes);
        tracing::info!(
            source = self.source.location(),
            size_bytes = size,
            size_mb = %format!("{:.2}", size as f64 / 1024.0 / 1024.0),
            "Raster preloaded"
        );
        Ok(size)
    }

    /// PNG preview of the cached raster. Never fails.
    ///
    /// Fetches on a cache miss. Any fetch, decode, or encode failure yields
    /// the placeholder.
    pub async fn preview(&self) -> Bytes {
        match self.try_preview().await {
            Ok(png) => png,
            Err(e) => {
                tracing::warn!("Raster preview failed, serving placeholder: {e}");
                self.placeholder.clone()
            }
        }
    }

    /// PNG preview of the cached raster, fetching on a miss.
    pub async fn try_preview(&self) -> RasterResult<Bytes> {
        let timeout = Duration::from_secs(self.config.lazy_timeout_secs);
        let raw = self
            .store
            .fetch_if_empty(self.source.as_ref(), timeout)
            .await?;
        let target = self.config.target_max_dimension;
        let png = run_blocking(move || render_preview(&raw, target)).await?;
        Ok(Bytes::from(png))
    }

    /// Statistics of the cached raster. Never fails and never fetches.
    pub async fn stats(&self) -> StatsOutcome {
        match self.try_stats().await {
            Ok(Some(record)) => StatsOutcome::Ready(record),
            Ok(None) => StatsOutcome::NotLoaded,
            Err(e) => {
                tracing::warn!("Raster stats failed: {e}");
                StatsOutcome::Unavailable
            }
        }
    }

    /// Statistics of the cached raster; `None` when the store is empty.
    pub async fn try_stats(&self) -> RasterResult<Option<StatsRecord>> {
        let Some(raw) = self.store.get() else {
            return Ok(None);
        };
        let target = self.config.target_max_dimension;
        run_blocking(move || {
            let image = decimate(decode(&raw)?, target);
            Ok(stats::compute(&image)?)
        })
        .await
        .map(Some)
    }
}

/// Decode → decimate → normalize → encode, synchronously.
pub fn render_preview(raw: &[u8], target: u32) -> RasterResult<Vec<u8>> {
    let start = Instant::now();

    let image = decode(raw)?;
    tracing::debug!(
        format = %format_to_string(image.format),
        width = image.width(),
        height = image.height(),
        bands = image.bands(),
        "Decoded raster"
    );

    let image = decimate(image, target);
    tracing::debug!(
        width = image.width(),
        height = image.height(),
        "Preview size"
    );

    let png = PreviewEncoder::encode(normalize(image))?;
    tracing::debug!(
        bytes = png.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Preview rendered"
    );
    Ok(png)
}

/// Run CPU-bound raster work on the blocking pool.
async fn run_blocking<T, F>(f: F) -> RasterResult<T>
where
    F: FnOnce() -> RasterResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RasterError::Worker(e.to_string()))?
}
