//! The `geodash stats` command: print summary statistics.

use clap::Args;
use geodash_core::{source, Config, DatasetStore};

/// Arguments for the `stats` command.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Raster path or URL (defaults to `[sources] raster_url`), or the CSV with `--dataset`
    pub input: Option<String>,

    /// Longest edge to decimate towards before computing statistics
    #[arg(long)]
    pub target: Option<u32>,

    /// Describe the CSV dataset instead of the raster
    #[arg(long)]
    pub dataset: bool,
}

/// Execute the stats command.
pub async fn execute(args: StatsArgs, config: Config) -> anyhow::Result<()> {
    if args.dataset {
        let location = args.input.as_deref().unwrap_or(&config.sources.csv_url);
        let store = DatasetStore::new(source::open(location), config.dataset.clone());
        let rows = store.load().await?;
        tracing::info!("Loaded {rows} row(s) from {location}");
        println!("{}", store.summary());
        return Ok(());
    }

    let service =
        super::preview::load_service(args.input.as_deref(), args.target, &config).await?;
    let record = service
        .try_stats()
        .await?
        .ok_or_else(|| anyhow::anyhow!("Raster cache is empty"))?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
