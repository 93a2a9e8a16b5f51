use anyhow::Context;
use tracing::info;

use crate::cache::{Cache, OnStale};
use crate::cli::{OutputFormat, StoreOpts};
use crate::remote::HttpSource;

#[derive(clap::Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub store: StoreOpts,

    /// Soft update: download the prebuilt snapshot instead of refreshing
    /// every record from the API
    #[arg(long)]
    pub soft: bool,
}

pub fn run(args: UpdateArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let config = args.store.cache_config();
    let canonical = config.local_path.clone();
    let mut cache = Cache::new(config);

    if args.soft {
        cache
            .download_snapshot()
            .context("downloading prebuilt snapshot")?;
        // The download just happened, so a stale result here is a
        // configuration problem, not something a refresh loop can fix.
        cache
            .load_passive(&canonical, OnStale::Auto)
            .context("loading downloaded snapshot")?;
    } else {
        let source =
            HttpSource::new(&args.store.api_url).context("connecting to the knowledgebase API")?;
        cache.refresh(&source).context("refreshing from remote")?;
    }

    let status = cache.status();
    info!(records = status.records, "cache updated");
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => {
            println!("Cache updated: {}", canonical.display());
            println!("  records:      {}", status.records);
            println!("  variants:     {}", status.variants);
            println!("  indexed rows: {}", status.indexed_rows);
            if let Some(at) = status.full_snapshot_at {
                println!("  snapshot at:  {}", at.to_rfc3339());
            }
        }
    }
    Ok(())
}
