//! binq - download, verify and install single-binary tools

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use binq_cli::cmd;
use binq_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(global.default_log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Install(args) => cmd::install::install(args, global).await,
        Commands::Index(args) => cmd::index::index(args).await,
        Commands::New(args) => cmd::new::new(args, global),
        Commands::Revise(args) => cmd::revise::revise(args, global),
        Commands::Verify(args) => cmd::verify::verify(args, global).await,
        Commands::Register(args) => cmd::register::register(args, global),
        Commands::Modify(args) => cmd::modify::modify(args, global),
        Commands::Deregister(args) => cmd::deregister::deregister(args, global),
        Commands::Hash(args) => cmd::hash::hash(args),
    }
}
