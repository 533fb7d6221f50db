//! The end-to-end run: load, validate, aggregate, render, write.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::aggregate::{aggregate_by_operator, aggregate_by_region};
use crate::config::{ColumnNames, PipelineConfig};
use crate::geocode::{Geocoder, Nominatim, RateLimiter};
use crate::io::{csv::write_csv, xlsx::write_workbook};
use crate::load::Loader;
use crate::region::Regions;
use crate::render::{write_aggregate_exports, write_operator_exports, MapRenderer};
use crate::table::records_to_frame;
use crate::types::Record;
use crate::validate::{validate, ValidationStats};

/// What a run produced.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub records: usize,
    pub valid: usize,
    pub invalid: usize,
    pub stats: ValidationStats,
    pub valid_output: PathBuf,
    pub invalid_output: PathBuf,
    pub maps: Vec<PathBuf>,
    pub exports: Vec<PathBuf>,
}

/// Create the directory if it doesn't exist; error if a non-directory exists there.
fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            bail!("[pipeline] Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("[pipeline] Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Write records as `.csv` or, for any other extension, `.xlsx`.
fn write_records(path: &Path, columns: &[String], records: &[Record], names: &ColumnNames) -> Result<()> {
    let mut df = records_to_frame(columns, records, names)?;
    let is_csv = path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv { write_csv(&mut df, path) } else { write_workbook(&df, path) }
}

/// Run every stage with the given geocoder.
pub fn run(config: &PipelineConfig, geocoder: &mut dyn Geocoder) -> Result<PipelineReport> {
    config.check()?;
    let names = &config.columns;

    // Reference geography first: without it nothing can be validated.
    let regions = Regions::from_path(&config.regions, &config.region_name_property)?;

    let set = Loader::new(names, &config.geocoder.country, geocoder)
        .with_csv_separator(config.csv_separator_byte())
        .load_all(&config.inputs)?;
    let records = set.len();

    let partition = validate(set.records, &regions);
    write_records(&config.valid_output, &set.columns, &partition.valid, names)?;
    write_records(&config.invalid_output, &set.columns, &partition.invalid, names)?;
    info!(
        valid = %config.valid_output.display(),
        invalid = %config.invalid_output.display(),
        "wrote validated tables"
    );

    let by_region = aggregate_by_region(&partition.valid, names);
    let by_operator = aggregate_by_operator(&partition.valid, names);

    let export_dir = config.export_dir();
    ensure_dir_exists(&export_dir)?;
    let links = write_operator_exports(
        &partition.valid, &set.columns, names, &export_dir, &config.render.combined_export,
    )?;
    let mut exports: Vec<PathBuf> = links.iter().map(|link| link.path.clone()).collect();
    exports.extend(write_aggregate_exports(&by_region, &by_operator, &export_dir)?);

    let renderer = MapRenderer::new(&regions, &partition.valid, &by_region, names, &config.render)
        .with_downloads(&links);
    let mut maps = Vec::with_capacity(config.maps.len());
    for spec in &config.maps {
        let path = config.map_dir.join(&spec.file_name);
        renderer.render(spec, &path)?;
        maps.push(path);
    }

    Ok(PipelineReport {
        records,
        valid: partition.valid.len(),
        invalid: partition.invalid.len(),
        stats: partition.stats,
        valid_output: config.valid_output.clone(),
        invalid_output: config.invalid_output.clone(),
        maps,
        exports,
    })
}

/// Run with the public Nominatim service, throttled per the configuration.
pub fn run_with_nominatim(config: &PipelineConfig) -> Result<PipelineReport> {
    let client = Nominatim::new(&config.geocoder).context("[pipeline] Failed to build geocoding client")?;
    let mut geocoder = RateLimiter::from_config(client, &config.geocoder);
    run(config, &mut geocoder)
}
