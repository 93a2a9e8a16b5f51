//! Command-line interface for varkb.
//!
//! - **update**: refresh the local cache (soft = download snapshot, default = full remote refresh)
//! - **search**: run one coordinate query against the loaded cache
//! - **export**: write the cached variant set as VCF or a record as JSON
//! - **cache**: inspect the local snapshot
//!
//! ## Usage
//!
//! ```text
//! # Full refresh from the remote knowledgebase
//! varkb update
//!
//! # Download the prebuilt snapshot instead
//! varkb update --soft
//!
//! # Exact lookup of BRAF V600E
//! varkb search -c 7 --start 140453136 --stop 140453136 --alt T --mode exact
//!
//! # JSON output for scripting
//! varkb search -c 7 --start 140453136 --stop 140453136 --format json
//!
//! # Export the indexed variants
//! varkb export vcf -o variants.vcf
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cache::{CacheConfig, OnStale};
use crate::core::types::{EvidenceStatus, RecordKind, ReferenceBuild, SearchMode};

pub mod cache;
pub mod export;
pub mod search;
pub mod update;

#[derive(Parser)]
#[command(name = "varkb")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Local cache and coordinate search for a genomic-variant knowledgebase")]
#[command(
    long_about = "varkb keeps a local snapshot of a remote genomic-variant knowledgebase and \
answers coordinate queries against it.\n\nRecords load lazily: referenced genes, evidence items \
and assertions fetch on first access, at most once per identity. The coordinate index supports \
four interval-matching modes and a bulk sweep that answers sorted query batches in one pass."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the local cache from the remote knowledgebase
    Update(update::UpdateArgs),

    /// Run one coordinate query against the cache
    Search(search::SearchArgs),

    /// Export cached records
    Export(export::ExportArgs),

    /// Inspect the local cache
    Cache(cache::CacheArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Cache location and remote endpoints, shared by all commands
#[derive(clap::Args, Debug, Clone)]
pub struct StoreOpts {
    /// Local snapshot path (defaults to ~/.varkb/cache.bin.gz)
    #[arg(long)]
    pub cache_path: Option<PathBuf>,

    /// Remote API base URL
    #[arg(long, default_value = crate::remote::DEFAULT_API_URL)]
    pub api_url: String,

    /// Prebuilt snapshot download URL
    #[arg(long)]
    pub snapshot_url: Option<String>,

    /// Maximum snapshot age in days before it counts as stale
    #[arg(long, default_value_t = crate::cache::freshness::DEFAULT_STALENESS_DAYS)]
    pub staleness_days: i64,
}

impl StoreOpts {
    #[must_use]
    pub fn cache_config(&self) -> CacheConfig {
        let defaults = CacheConfig::default();
        let mut config = CacheConfig::new(
            self.cache_path.clone().unwrap_or(defaults.local_path),
            self.snapshot_url
                .clone()
                .unwrap_or(defaults.remote_snapshot_url),
        );
        config = config.with_staleness_days(self.staleness_days);
        config
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    Any,
    QueryEncompassing,
    RecordEncompassing,
    Exact,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Any => SearchMode::Any,
            ModeArg::QueryEncompassing => SearchMode::QueryEncompassing,
            ModeArg::RecordEncompassing => SearchMode::RecordEncompassing,
            ModeArg::Exact => SearchMode::Exact,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BuildArg {
    Grch37,
    Grch38,
    Ncbi36,
}

impl From<BuildArg> for ReferenceBuild {
    fn from(build: BuildArg) -> Self {
        match build {
            BuildArg::Grch37 => ReferenceBuild::Grch37,
            BuildArg::Grch38 => ReferenceBuild::Grch38,
            BuildArg::Ncbi36 => ReferenceBuild::Ncbi36,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OnStaleArg {
    Auto,
    Ignore,
    Update,
    Reject,
}

impl From<OnStaleArg> for OnStale {
    fn from(policy: OnStaleArg) -> Self {
        match policy {
            OnStaleArg::Auto => OnStale::Auto,
            OnStaleArg::Ignore => OnStale::Ignore,
            OnStaleArg::Update => OnStale::Update,
            OnStaleArg::Reject => OnStale::Reject,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum KindArg {
    Gene,
    Variant,
    Evidence,
    Assertion,
    Source,
}

impl From<KindArg> for RecordKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Gene => RecordKind::Gene,
            KindArg::Variant => RecordKind::Variant,
            KindArg::Evidence => RecordKind::Evidence,
            KindArg::Assertion => RecordKind::Assertion,
            KindArg::Source => RecordKind::Source,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum StatusArg {
    Accepted,
    Submitted,
    Rejected,
}

impl From<StatusArg> for EvidenceStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Accepted => EvidenceStatus::Accepted,
            StatusArg::Submitted => EvidenceStatus::Submitted,
            StatusArg::Rejected => EvidenceStatus::Rejected,
        }
    }
}
