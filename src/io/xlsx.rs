//! Spreadsheet reading (xlsx, xls, ods) and `.xlsx` writing.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::{AnyValue, Column, DataFrame};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook};

use crate::io::write_file;

/// Reads the first worksheet into a DataFrame of string columns.
/// The first row is the header; rows without any value are skipped.
pub(crate) fn read_workbook(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("[io::xlsx::read] Failed to open workbook: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("[io::xlsx::read] Workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("[io::xlsx::read] Failed to read first worksheet of {}", path.display()))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else { return Ok(DataFrame::empty()) };
    let names = header_names(header);

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for row in rows {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) { continue }
        for (i, column) in values.iter_mut().enumerate() {
            column.push(row.get(i).and_then(cell_to_string));
        }
    }

    let columns = names.into_iter()
        .zip(values)
        .map(|(name, column)| Column::new(name.into(), column))
        .collect::<Vec<_>>();
    DataFrame::new(columns)
        .with_context(|| format!("[io::xlsx::read] Failed to build table from {}", path.display()))
}

/// Header labels with blanks named `Unnamed: <i>` and repeats suffixed `.1`, `.2`, ...
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header.iter().enumerate()
        .map(|(i, cell)| {
            let base = cell_to_string(cell)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| format!("Unnamed: {i}"));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 { base } else { format!("{base}.{count}") };
            *count += 1;
            name
        })
        .collect()
}

/// Text form of a cell; empty and error cells have none.
fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) => Some(f.to_string()),
        Data::Int(i) => Some(i.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => Some(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Write a DataFrame as a single-sheet `.xlsx` workbook with a bold header row.
/// The creation timestamp is fixed so equal tables give equal files.
pub(crate) fn write_workbook(df: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let created = ExcelDateTime::from_ymd(2000, 1, 1)?;
    workbook.set_properties(&DocProperties::new().set_creation_datetime(&created));
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col_idx = u16::try_from(col_idx)
            .context("[io::xlsx::write] Too many columns for a worksheet")?;
        sheet.write_string_with_format(0, col_idx, column.name().as_str(), &bold)?;

        for row in 0..df.height() {
            let row_idx = u32::try_from(row + 1)
                .context("[io::xlsx::write] Too many rows for a worksheet")?;
            match column.get(row)? {
                AnyValue::Null => {}
                AnyValue::Float64(v) => { sheet.write_number(row_idx, col_idx, v)?; }
                AnyValue::String(s) => { sheet.write_string(row_idx, col_idx, s)?; }
                other => { sheet.write_string(row_idx, col_idx, other.to_string())?; }
            }
        }
    }

    let bytes = workbook.save_to_buffer()
        .with_context(|| format!("[io::xlsx::write] Failed to encode workbook {}", path.display()))?;
    write_file(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_names_fill_blanks_and_number_repeats() {
        let header = vec![
            Data::String("VNB-Name".into()),
            Data::Empty,
            Data::String("Kosten".into()),
            Data::String(" Kosten ".into()),
        ];
        assert_eq!(header_names(&header), vec!["VNB-Name", "Unnamed: 1", "Kosten", "Kosten.1"]);
    }

    #[test]
    fn numeric_cells_read_as_plain_text() {
        assert_eq!(cell_to_string(&Data::Float(1.5)).as_deref(), Some("1.5"));
        assert_eq!(cell_to_string(&Data::Float(2030.0)).as_deref(), Some("2030"));
        assert_eq!(cell_to_string(&Data::Int(7)).as_deref(), Some("7"));
        assert_eq!(cell_to_string(&Data::Empty), None);
    }

    #[test]
    fn written_workbook_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let df = DataFrame::new(vec![
            Column::new("VNB-Name".into(), vec![Some("Netz A".to_string()), None]),
            Column::new("Kosten in Mio.€".into(), vec![1.5f64, 0.0]),
        ]).unwrap();

        write_workbook(&df, &path).unwrap();
        let back = read_workbook(&path).unwrap();

        assert_eq!(back.height(), 2);
        let names: Vec<String> = back.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, vec!["VNB-Name", "Kosten in Mio.€"]);
        let costs = back.column("Kosten in Mio.€").unwrap();
        assert_eq!(costs.str().unwrap().get(0), Some("1.5"));
    }
}
