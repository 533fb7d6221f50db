//! Loading, numeric normalization and coordinate resolution.

mod normalize;

pub use normalize::{is_placeholder, parse_decimal, to_number};

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use polars::frame::DataFrame;
use tracing::{debug, info, warn};

use crate::config::ColumnNames;
use crate::geocode::Geocoder;
use crate::io::{csv::read_csv_strings, xlsx::read_workbook};
use crate::table::frame_to_records;
use crate::types::{LatLon, Record, RecordSet};

/// Read a spreadsheet (`.xlsx`, `.xlsm`, `.xls`, `.ods`) or `.csv` file as text columns.
pub fn read_table(path: &Path, csv_separator: u8) -> Result<DataFrame> {
    if !path.is_file() {
        bail!("[load] Input file not found: {}", path.display());
    }
    let ext = path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "txt" => read_csv_strings(path, csv_separator),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path),
        other => bail!("[load] Unsupported input format {:?}: {}", other, path.display()),
    }
}

/// Coordinate carried by the record's own latitude/longitude cells.
///
/// `None` when the record does not carry both cells; `Some(None)` when it does
/// but they do not parse to a valid position.
pub(crate) fn supplied_coordinate(record: &Record, names: &ColumnNames) -> Option<Option<LatLon>> {
    let lat = record.cell(&names.latitude).filter(|s| !is_placeholder(s))?;
    let lon = record.cell(&names.longitude).filter(|s| !is_placeholder(s))?;
    Some(match (parse_decimal(lat), parse_decimal(lon)) {
        (Some(lat), Some(lon)) => Some(LatLon::new(lat, lon)).filter(LatLon::is_valid),
        _ => None,
    })
}

/// Geocoding query for a record: its location if usable, else its region,
/// suffixed with the country. `None` if neither is usable.
pub fn geocode_query(record: &Record, country: &str) -> Option<String> {
    let place = match record.location.as_deref() {
        Some(location) if !is_placeholder(location) => location,
        _ if !is_placeholder(&record.region) => record.region.as_str(),
        _ => return None,
    };
    Some(format!("{}, {}", place.trim(), country))
}

/// Turns input tables into records with resolved coordinates.
pub struct Loader<'a, G: Geocoder + ?Sized> {
    names: &'a ColumnNames,
    country: &'a str,
    geocoder: &'a mut G,
    csv_separator: u8,
}

impl<'a, G: Geocoder + ?Sized> Loader<'a, G> {
    pub fn new(names: &'a ColumnNames, country: &'a str, geocoder: &'a mut G) -> Self {
        Self { names, country, geocoder, csv_separator: b',' }
    }

    pub fn with_csv_separator(mut self, separator: u8) -> Self {
        self.csv_separator = separator;
        self
    }

    /// Load every input in order and concatenate the results.
    pub fn load_all(&mut self, paths: &[PathBuf]) -> Result<RecordSet> {
        let mut merged: Option<RecordSet> = None;
        for path in paths {
            let set = self.load_path(path)?;
            merged = Some(match merged {
                Some(acc) => acc.concat(set),
                None => set,
            });
        }
        Ok(merged.unwrap_or_default())
    }

    /// Load one input file.
    pub fn load_path(&mut self, path: &Path) -> Result<RecordSet> {
        let df = read_table(path, self.csv_separator)?;
        info!(path = %path.display(), rows = df.height(), "loaded input table");
        self.load_frame(&df)
    }

    /// Build records from a table and resolve their coordinates.
    pub fn load_frame(&mut self, df: &DataFrame) -> Result<RecordSet> {
        let mut set = frame_to_records(df, self.names)?;
        let (mut supplied, mut looked_up, mut missed) = (0usize, 0usize, 0usize);

        for record in &mut set.records {
            record.coord = match supplied_coordinate(record, self.names) {
                Some(coord) => {
                    supplied += 1;
                    coord
                }
                None => {
                    looked_up += 1;
                    self.resolve(record)
                }
            };
            if record.coord.is_none() { missed += 1 }
        }

        info!(records = set.len(), supplied, looked_up, missed, "resolved coordinates");
        Ok(set)
    }

    /// Geocode one record. Failures become a missing coordinate.
    fn resolve(&mut self, record: &Record) -> Option<LatLon> {
        let Some(query) = geocode_query(record, self.country) else {
            debug!(operator = %record.operator, "no location or region to geocode");
            return None;
        };
        match self.geocoder.resolve(&query) {
            Ok(Some(coord)) if coord.is_valid() => {
                debug!(%query, lat = coord.lat, lon = coord.lon, "geocoded");
                Some(coord)
            }
            Ok(Some(coord)) => {
                warn!(%query, lat = coord.lat, lon = coord.lon, "geocoder returned an invalid position");
                None
            }
            Ok(None) => {
                debug!(%query, "no geocoding result");
                None
            }
            Err(err) => {
                warn!(%query, error = %err, "geocoding failed; leaving coordinate empty");
                None
            }
        }
    }
}
