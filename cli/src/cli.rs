use std::path::PathBuf;

/// Geocode, validate and map grid-expansion planning spreadsheets
#[derive(clap::Parser, Debug)]
#[command(name = "gridplan", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the whole pipeline on one or two input spreadsheets
    Run(RunArgs),

    /// Print a configuration file with every setting at its default
    Config(ConfigArgs),
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Input spreadsheets (.xlsx, .xls, .ods or .csv), concatenated in order
    #[arg(required = true, num_args = 1..=2, value_hint = clap::ValueHint::FilePath)]
    pub inputs: Vec<PathBuf>,

    /// Reference geography (GeoJSON or shapefile) with one feature per region
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub regions: Option<PathBuf>,

    /// JSON configuration file; flags given here take precedence
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output for records inside their declared region (.xlsx or .csv)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub valid: Option<PathBuf>,

    /// Output for all other records (.xlsx or .csv)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub invalid: Option<PathBuf>,

    /// Directory receiving the maps and the CSV exports
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Write to this file instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
