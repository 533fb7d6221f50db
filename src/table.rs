//! Conversion between polars tables and records.

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame, DataType, PolarsResult};
use tracing::warn;

use crate::config::ColumnNames;
use crate::load::to_number;
use crate::types::{Measure, Measures, Record, RecordSet};

/// Build one record per row. Missing expected columns are reported and leave the
/// corresponding fields empty; coordinates are resolved later by the loader.
pub(crate) fn frame_to_records(df: &DataFrame, names: &ColumnNames) -> Result<RecordSet> {
    let columns: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    for expected in [&names.operator, &names.region, &names.length, &names.capacity, &names.cost] {
        if !columns.contains(expected) {
            warn!(column = %expected, "input table lacks expected column; values default to empty");
        }
    }

    let string_columns = df.get_columns().iter()
        .map(|column| column.cast(&DataType::String))
        .collect::<PolarsResult<Vec<_>>>()
        .context("[table] Failed to read input columns as text")?;
    let views = string_columns.iter()
        .map(|column| column.str())
        .collect::<PolarsResult<Vec<_>>>()
        .context("[table] Failed to read input columns as text")?;

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut record = Record::new(String::new(), String::new());
        for (name, view) in columns.iter().zip(&views) {
            if let Some(value) = view.get(row).filter(|v| !v.is_empty()) {
                record.set_cell(name.clone(), value);
            }
        }

        record.operator = record.cell(&names.operator).map(str::trim).unwrap_or_default().to_string();
        record.region = record.cell(&names.region).map(str::trim).unwrap_or_default().to_string();
        record.location = record.cell(&names.location).map(|s| s.trim().to_string());
        record.measures = Measures::new(
            to_number(record.cell(&names.length)),
            to_number(record.cell(&names.capacity)),
            to_number(record.cell(&names.cost)),
        );
        records.push(record);
    }

    Ok(RecordSet::new(columns, records))
}

/// Tabulate records: every source column (measures normalized) followed by the
/// resolved coordinates.
pub(crate) fn records_to_frame(columns: &[String], records: &[Record], names: &ColumnNames) -> Result<DataFrame> {
    fn latitudes(records: &[Record]) -> Vec<Option<f64>> {
        records.iter().map(|r| r.coord.map(|c| c.lat)).collect()
    }

    fn longitudes(records: &[Record]) -> Vec<Option<f64>> {
        records.iter().map(|r| r.coord.map(|c| c.lon)).collect()
    }

    fn measure_values(records: &[Record], measure: Measure) -> Vec<f64> {
        records.iter().map(|r| r.measures.get(measure)).collect()
    }

    let mut out: Vec<Column> = Vec::with_capacity(columns.len() + 2);
    for name in columns {
        let column = if let Some(measure) = names.measure_of(name) {
            Column::new(name.as_str().into(), measure_values(records, measure))
        } else if *name == names.latitude {
            Column::new(name.as_str().into(), latitudes(records))
        } else if *name == names.longitude {
            Column::new(name.as_str().into(), longitudes(records))
        } else {
            Column::new(
                name.as_str().into(),
                records.iter().map(|r| r.cell(name).map(str::to_string)).collect::<Vec<_>>(),
            )
        };
        out.push(column);
    }
    if !columns.contains(&names.latitude) {
        out.push(Column::new(names.latitude.as_str().into(), latitudes(records)));
    }
    if !columns.contains(&names.longitude) {
        out.push(Column::new(names.longitude.as_str().into(), longitudes(records)));
    }

    DataFrame::new(out).context("[table] Failed to tabulate records")
}
