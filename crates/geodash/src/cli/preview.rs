//! The `geodash preview` command: render a raster to a PNG file.

use clap::Args;
use geodash_core::{source, Config, RasterService, RasterStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the `preview` command.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Raster path or URL (defaults to `[sources] raster_url`)
    pub input: Option<String>,

    /// Where to write the PNG
    #[arg(short, long, default_value = "preview.png")]
    pub output: PathBuf,

    /// Longest edge to decimate towards (overrides `[raster] target_max_dimension`)
    #[arg(long)]
    pub target: Option<u32>,
}

/// Execute the preview command.
///
/// Unlike `/api/map`, failures are reported instead of replaced by the
/// placeholder.
pub async fn execute(args: PreviewArgs, config: Config) -> anyhow::Result<()> {
    let service = load_service(args.input.as_deref(), args.target, &config).await?;

    let png = service.try_preview().await?;
    std::fs::write(&args.output, &png)?;

    tracing::info!("Preview written to {}", args.output.display());
    println!("{}", args.output.display());
    Ok(())
}

/// Build a raster service for `input` (or the configured URL) and fill its cache.
pub(crate) async fn load_service(
    input: Option<&str>,
    target: Option<u32>,
    config: &Config,
) -> anyhow::Result<RasterService> {
    let location = input.unwrap_or(&config.sources.raster_url);
    let mut raster_config = config.raster.clone();
    if let Some(target) = target {
        anyhow::ensure!(target > 0, "--target must be greater than 0");
        raster_config.target_max_dimension = target;
    }

    let service = RasterService::new(
        Arc::new(RasterStore::new()),
        source::open(location),
        raster_config,
    )?;
    let size = service.preload().await?;
    tracing::info!("Loaded {location} ({:.1} MB)", size as f64 / (1024.0 * 1024.0));
    Ok(service)
}
