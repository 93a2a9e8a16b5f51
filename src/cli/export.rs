use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};

use crate::cache::{Cache, OnStale};
use crate::cli::{KindArg, OutputFormat, StatusArg, StoreOpts};
use crate::core::types::{EvidenceStatus, RecordId, StatusFilter};
use crate::export::{record_document, write_vcf};

#[derive(clap::Args)]
pub struct ExportArgs {
    #[command(subcommand)]
    pub target: ExportTarget,
}

#[derive(clap::Subcommand)]
pub enum ExportTarget {
    /// Write the indexed variant set as VCF body lines
    Vcf {
        #[command(flatten)]
        store: StoreOpts,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write one record as a structured JSON document
    Json {
        #[command(flatten)]
        store: StoreOpts,

        /// Record kind
        #[arg(value_enum)]
        kind: KindArg,

        /// Record id
        id: u32,

        /// Statuses whose evidence/assertion children are visible
        /// (repeatable; all three by default)
        #[arg(long = "status", value_enum)]
        statuses: Vec<StatusArg>,
    },
}

pub fn run(args: ExportArgs, _format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    match args.target {
        ExportTarget::Vcf { store, output } => {
            let cache = load(&store)?;
            let written = match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating {}", path.display()))?;
                    write_vcf(cache.store(), cache.index(), &mut BufWriter::new(file))?
                }
                None => write_vcf(cache.store(), cache.index(), &mut io::stdout().lock())?,
            };
            writeln!(io::stderr(), "{written} variant line(s) written")?;
        }
        ExportTarget::Json {
            store,
            kind,
            id,
            statuses,
        } => {
            let cache = load(&store)?;
            let filter = if statuses.is_empty() {
                StatusFilter::default()
            } else {
                let statuses: Vec<EvidenceStatus> =
                    statuses.into_iter().map(EvidenceStatus::from).collect();
                StatusFilter::only(&statuses)
            };
            let doc = record_document(cache.store(), &RecordId::new(kind.into(), id), &filter)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

/// Exports never reach for the network; a usable local snapshot is required
fn load(opts: &StoreOpts) -> anyhow::Result<Cache> {
    let config = opts.cache_config();
    let canonical = config.local_path.clone();
    let mut cache = Cache::new(config);
    let outcome = cache
        .load_passive(&canonical, OnStale::Ignore)
        .context("loading cache")?;
    if outcome == crate::cache::LoadOutcome::NoCache {
        bail!("no cache at {}; run 'varkb update' first", canonical.display());
    }
    Ok(cache)
}
