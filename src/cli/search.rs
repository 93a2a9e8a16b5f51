use anyhow::{bail, Context};

use crate::cache::{Cache, LoadOutcome};
use crate::cli::{BuildArg, ModeArg, OnStaleArg, OutputFormat, StoreOpts};
use crate::core::query::CoordinateQuery;
use crate::core::types::{ReferenceBuild, StatusFilter};
use crate::export::record_document;
use crate::remote::HttpSource;
use crate::search::search_by_coordinates;

#[derive(clap::Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub store: StoreOpts,

    /// Chromosome
    #[arg(short, long)]
    pub chromosome: String,

    /// Interval start (1-based, inclusive)
    #[arg(long)]
    pub start: u64,

    /// Interval stop (1-based, inclusive)
    #[arg(long)]
    pub stop: u64,

    /// Variant allele; '*' matches any non-empty value
    #[arg(long)]
    pub alt: Option<String>,

    /// Reference allele; '*' matches any non-empty value
    #[arg(long = "ref")]
    pub ref_bases: Option<String>,

    /// Reference build of the query coordinates
    #[arg(long, value_enum, default_value = "grch37")]
    pub build: BuildArg,

    /// Interval matching semantics
    #[arg(short, long, value_enum, default_value = "any")]
    pub mode: ModeArg,

    /// What to do if the local snapshot is stale
    #[arg(long, value_enum, default_value = "ignore")]
    pub on_stale: OnStaleArg,
}

pub fn run(args: SearchArgs, format: OutputFormat, _verbose: bool) -> anyhow::Result<()> {
    let config = args.store.cache_config();
    let canonical = config.local_path.clone();
    let mut cache = Cache::new(config);

    let source =
        HttpSource::new(&args.store.api_url).context("connecting to the knowledgebase API")?;
    let outcome = cache
        .load(&canonical, args.on_stale.into(), &source)
        .context("loading cache")?;
    match outcome {
        LoadOutcome::NoCache => {
            bail!("no cache at {}; run 'varkb update' first", canonical.display())
        }
        LoadOutcome::Rejected => {
            bail!("cache at {} is stale; run 'varkb update'", canonical.display())
        }
        LoadOutcome::LoadedFresh | LoadOutcome::LoadedStale => {}
    }

    let mut query = CoordinateQuery::new(args.chromosome, args.start, args.stop);
    if let Some(alt) = args.alt {
        query = query.with_alt(alt);
    }
    if let Some(ref_bases) = args.ref_bases {
        query = query.with_ref(ref_bases);
    }
    let build: ReferenceBuild = args.build.into();
    query = query.with_build(build);

    let hits = search_by_coordinates(cache.store(), cache.index(), &query, args.mode.into())?;

    match format {
        OutputFormat::Json => {
            let filter = StatusFilter::default();
            let docs = hits
                .iter()
                .map(|record| record_document(cache.store(), &record.id, &filter))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        OutputFormat::Text => {
            if hits.is_empty() {
                println!("No records match {query}");
            } else {
                println!("{} record(s) match {query}:", hits.len());
                for record in hits {
                    println!("  {}\t{}", record.id, record.label());
                }
            }
        }
    }
    Ok(())
}
