mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{config, run};
use tracing_subscriber::EnvFilter;

/// Log to stderr at warn, info (-v) or debug (-vv); RUST_LOG takes precedence.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Run(args) => run::run(&cli, args),
        Commands::Config(args) => config::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
