use anyhow::Result;
use gridplan::{run_with_nominatim, PipelineConfig};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    config.inputs = args.inputs.clone();
    if let Some(regions) = &args.regions { config.regions = regions.clone() }
    if let Some(valid) = &args.valid { config.valid_output = valid.clone() }
    if let Some(invalid) = &args.invalid { config.invalid_output = invalid.clone() }
    if let Some(out_dir) = &args.out_dir { config.map_dir = out_dir.clone() }

    let report = run_with_nominatim(&config)?;

    println!("[run] {} records: {} valid, {} invalid", report.records, report.valid, report.invalid);
    println!(
        "[run] invalid by reason: {} without coordinate, {} outside every region, {} in another region, {} unknown region",
        report.stats.no_coordinate, report.stats.outside, report.stats.mismatched, report.stats.unknown_region,
    );
    println!("[run] wrote {} and {}", report.valid_output.display(), report.invalid_output.display());
    for map in &report.maps {
        println!("[run] wrote map {}", map.display());
    }
    println!("[run] wrote {} CSV exports to {}", report.exports.len(), config.export_dir().display());

    Ok(())
}
