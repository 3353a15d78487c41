//! Geodash Core - cached raster previews, CSV data, and data chat.
//!
//! Geodash fetches one remote raster and one remote CSV, keeps both in process
//! memory, and serves a bounded-size preview, summary statistics, and the
//! cleaned rows. Questions about the data are answered by a chat model that is
//! given the CSV summary and raster statistics as context.
//!
//! # Architecture
//!
//! ```text
//! Raster bytes → Decode → Decimate → Normalize → PNG preview
//!                                  ↘ Stats
//! CSV bytes → Parse → Records / Summary
//! Summary + Stats + Question → Chat model → Reply
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use geodash_core::{Config, Geodash};
//!
//! #[tokio::main]
//! async fn main() -> geodash_core::Result<()> {
//!     let config = Config::load()?;
//!     let geodash = Geodash::new(config)?;
//!     geodash.preload().await;
//!
//!     let png = geodash.raster().preview().await;
//!     println!("Preview is {} bytes", png.len());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod dataset;
pub mod error;
pub mod llm;
pub mod raster;
pub mod source;

// Re-exports for convenient access
pub use config::Config;
pub use dataset::{Dataset, DatasetStore, Record};
pub use error::{
    ComputeError, ConfigError, DatasetError, DecodeError, FetchError, GeodashError, LlmError,
    RasterError, RasterResult, Result,
};
pub use llm::{DataAssistant, LlmProvider, LlmProviderFactory};
pub use raster::{RasterService, RasterStore, StatsOutcome, StatsRecord};
pub use source::{FileSource, HttpSource, RemoteSource};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Geodash backend - owns the caches and the chat assistant.
///
/// Built once at startup and shared (behind an `Arc`) by every request
/// handler.
pub struct Geodash {
    config: Config,
    raster: RasterService,
    dataset: DatasetStore,
    assistant: DataAssistant,
}

impl Geodash {
    /// Create a Geodash instance with sources and provider built from config.
    ///
    /// A missing API key is not fatal: chat requests then return the apology.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Geodash v{}", VERSION);

        let client = reqwest::Client::new();
        let raster_source = source::from_location(&config.sources.raster_url, client.clone());
        let csv_source = source::from_location(&config.sources.csv_url, client);

        let provider = match LlmProviderFactory::create(&config.llm) {
            Ok(provider) => Some(provider),
            Err(e) => {
                tracing::warn!("Chat disabled: {e}");
                None
            }
        };

        Self::with_parts(config, raster_source, csv_source, provider)
    }

    /// Create a Geodash instance from explicit collaborators.
    pub fn with_parts(
        config: Config,
        raster_source: Arc<dyn RemoteSource>,
        csv_source: Arc<dyn RemoteSource>,
        provider: Option<Box<dyn LlmProvider>>,
    ) -> Result<Self> {
        let raster = RasterService::new(
            Arc::new(RasterStore::new()),
            raster_source,
            config.raster.clone(),
        )?;
        let dataset = DatasetStore::new(csv_source, config.dataset.clone());
        let assistant = DataAssistant::new(provider, &config.llm);

        Ok(Self {
            config,
            raster,
            dataset,
            assistant,
        })
    }

    /// Best-effort startup load of the CSV and the raster.
    ///
    /// The two loads run concurrently and independently; a failure is logged
    /// and leaves that cache empty.
    pub async fn preload(&self) {
        let (csv, raster) = tokio::join!(self.dataset.load(), self.raster.preload());

        if let Err(e) = csv {
            tracing::warn!("CSV preload failed: {e}");
        }
        if let Err(e) = raster {
            tracing::warn!("Raster preload failed: {e}");
        }
    }

    pub fn raster(&self) -> &RasterService {
        &self.raster
    }

    pub fn dataset(&self) -> &DatasetStore {
        &self.dataset
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether chat requests reach a language model rather than the apology.
    pub fn chat_enabled(&self) -> bool {
        self.assistant.is_available()
    }

    /// Answer a question about the cached data. Never fails.
    ///
    /// Raster context comes from the cache only; a cold cache reports
    /// "Raster not loaded." rather than triggering a download.
    pub async fn chat(&self, message: &str) -> String {
        let csv_context = self.dataset.summary();
        let raster_context = self.raster.stats().await.to_string();
        self.assistant
            .answer(&csv_context, &raster_context, message)
            .await
    }
}
