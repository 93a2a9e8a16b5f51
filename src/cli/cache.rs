use anyhow::Context;

use crate::cache::{Cache, LoadOutcome, OnStale};
use crate::cli::{OutputFormat, StoreOpts};

#[derive(clap::Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub op: CacheOp,
}

#[derive(clap::Subcommand)]
pub enum CacheOp {
    /// Show the local snapshot's contents and freshness
    Status {
        #[command(flatten)]
        store: StoreOpts,
    },
}

pub fn run(args: CacheArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.op {
        CacheOp::Status { store } => {
            let config = store.cache_config();
            let canonical = config.local_path.clone();
            let mut cache = Cache::new(config);
            let outcome = cache
                .load_passive(&canonical, OnStale::Ignore)
                .context("loading cache")?;

            if outcome == LoadOutcome::NoCache {
                println!("No cache at {}", canonical.display());
                return Ok(());
            }

            let status = cache.status();
            match format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
                OutputFormat::Text => {
                    println!("Cache: {}", canonical.display());
                    println!("  records:      {}", status.records);
                    println!("  variants:     {}", status.variants);
                    println!("  indexed rows: {}", status.indexed_rows);
                    match status.full_snapshot_at {
                        Some(at) => println!("  snapshot at:  {}", at.to_rfc3339()),
                        None => println!("  snapshot at:  never (no full refresh recorded)"),
                    }
                    println!("  fresh:        {}", status.fresh);
                }
            }
        }
    }
    Ok(())
}
