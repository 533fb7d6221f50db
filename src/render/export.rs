use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ahash::AHashSet;
use anyhow::Result;
use regex::Regex;
use tracing::info;

use crate::aggregate::AggregateTable;
use crate::config::ColumnNames;
use crate::io::csv::write_csv;
use crate::table::records_to_frame;
use crate::types::Record;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("Invalid regex pattern"));

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`. Never empty.
pub fn safe_filename(name: &str) -> String {
    let safe = UNSAFE_CHARS.replace_all(name, "_");
    if safe.is_empty() { "_".to_string() } else { safe.into_owned() }
}

/// One downloadable CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLink {
    /// Text shown in the download selector.
    pub label: String,
    /// File name inside the export directory.
    pub file_name: String,
    pub path: PathBuf,
}

/// Operators in order of first appearance.
pub(crate) fn operators_in_order(records: &[Record]) -> Vec<&str> {
    let mut seen = AHashSet::new();
    records.iter()
        .map(|r| r.operator.as_str())
        .filter(|op| seen.insert(*op))
        .collect()
}

/// Write the combined export and one CSV per operator into `dir`.
///
/// The combined export comes first in the returned links, then operators in
/// order of first appearance. Colliding file names get a numeric suffix.
pub fn write_operator_exports(
    valid: &[Record],
    columns: &[String],
    names: &ColumnNames,
    dir: &Path,
    combined_stem: &str,
) -> Result<Vec<ExportLink>> {
    let mut links = Vec::new();
    let mut taken = AHashSet::new();

    let combined = format!("{}.csv", safe_filename(combined_stem));
    taken.insert(combined.clone());
    let path = dir.join(&combined);
    write_csv(&mut records_to_frame(columns, valid, names)?, &path)?;
    links.push(ExportLink { label: combined_stem.replace('_', " "), file_name: combined, path });

    for operator in operators_in_order(valid) {
        let stem = safe_filename(operator);
        let mut file_name = format!("{stem}.csv");
        let mut n = 2;
        while !taken.insert(file_name.clone()) {
            file_name = format!("{stem}_{n}.csv");
            n += 1;
        }

        let rows: Vec<Record> = valid.iter().filter(|r| r.operator == operator).cloned().collect();
        let path = dir.join(&file_name);
        write_csv(&mut records_to_frame(columns, &rows, names)?, &path)?;
        links.push(ExportLink { label: operator.to_string(), file_name, path });
    }

    info!(dir = %dir.display(), files = links.len(), "wrote operator exports");
    Ok(links)
}

/// Write `aggregates_by_region.csv` and `aggregates_by_operator.csv` into `dir`.
pub fn write_aggregate_exports(by_region: &AggregateTable, by_operator: &AggregateTable, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(2);
    for (table, file_name) in [(by_region, "aggregates_by_region.csv"), (by_operator, "aggregates_by_operator.csv")] {
        let path = dir.join(file_name);
        write_csv(&mut table.to_frame()?, &path)?;
        written.push(path);
    }
    Ok(written)
}
