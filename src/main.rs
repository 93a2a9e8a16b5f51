use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod core;
mod export;
mod index;
mod remote;
mod search;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("varkb=debug,info")
    } else {
        EnvFilter::new("varkb=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Update(args) => {
            cli::update::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Search(args) => {
            cli::search::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Export(args) => {
            cli::export::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Cache(args) => {
            cli::cache::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
