use anyhow::{Context, Result};
use gridplan::PipelineConfig;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ConfigArgs) -> Result<()> {
    let json = PipelineConfig::default().to_json_pretty()?;
    match &args.output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("[config] Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
