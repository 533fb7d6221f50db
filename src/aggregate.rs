//! Sums of the measures of valid records, per region and per operator.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use polars::prelude::{Column, DataFrame};
use tracing::info;

use crate::config::ColumnNames;
use crate::types::{Measure, Measures, Record};

/// Summed length, capacity and cost of a group.
pub type Totals = Measures;

/// One group and its totals.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub key: String,
    pub totals: Totals,
}

/// Totals keyed by region or operator, sorted by key.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    pub key_column: String,
    pub length_column: String,
    pub capacity_column: String,
    pub cost_column: String,
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    fn build<'a>(key_column: &str, names: &ColumnNames, keyed: impl Iterator<Item = (&'a str, Measures)>) -> Self {
        let mut sums: BTreeMap<&str, Totals> = BTreeMap::new();
        for (key, measures) in keyed {
            *sums.entry(key).or_default() += measures;
        }
        if sums.is_empty() {
            info!(key = key_column, "no valid records to aggregate");
        }

        Self {
            key_column: key_column.to_string(),
            length_column: names.length.clone(),
            capacity_column: names.capacity.clone(),
            cost_column: names.cost.clone(),
            rows: sums.into_iter()
                .map(|(key, totals)| AggregateRow { key: key.to_string(), totals })
                .collect(),
        }
    }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Totals of one group.
    pub fn get(&self, key: &str) -> Option<&Totals> {
        self.rows
            .binary_search_by(|row| row.key.as_str().cmp(key))
            .ok()
            .map(|i| &self.rows[i].totals)
    }

    /// Column name holding `measure`.
    pub fn measure_column(&self, measure: Measure) -> &str {
        match measure {
            Measure::Length => &self.length_column,
            Measure::Capacity => &self.capacity_column,
            Measure::Cost => &self.cost_column,
        }
    }

    /// Key column followed by length, capacity and cost.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = vec![
            Column::new(self.key_column.as_str().into(), self.rows.iter().map(|r| r.key.clone()).collect::<Vec<_>>()),
        ];
        for measure in [Measure::Length, Measure::Capacity, Measure::Cost] {
            let values: Vec<f64> = self.rows.iter().map(|row| row.totals.get(measure)).collect();
            columns.push(Column::new(self.measure_column(measure).into(), values));
        }
        DataFrame::new(columns).context("[aggregate] Failed to tabulate aggregates")
    }
}

/// Totals per declared region name.
pub fn aggregate_by_region(valid: &[Record], names: &ColumnNames) -> AggregateTable {
    AggregateTable::build(&names.region, names, valid.iter().map(|r| (r.region.as_str(), r.measures)))
}

/// Totals per operator name.
pub fn aggregate_by_operator(valid: &[Record], names: &ColumnNames) -> AggregateTable {
    AggregateTable::build(&names.operator, names, valid.iter().map(|r| (r.operator.as_str(), r.measures)))
}

/// Two-decimal rendering used for display.
pub fn format_value(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_records() -> Vec<Record> {
        vec![
            Record::new("Netz Süd", "Bayern").with_measures(Measures::new(10.0, 40.0, 1.5)),
            Record::new("Netz Ost", "Sachsen").with_measures(Measures::new(2.5, 0.0, 0.25)),
            Record::new("Netz Süd", "Bayern").with_measures(Measures::new(0.5, 10.0, 2.0)),
            Record::new("Netz Süd", "Sachsen").with_measures(Measures::new(1.0, 0.0, 0.0)),
        ]
    }

    #[test]
    fn sums_per_region_sorted_by_name() {
        let names = ColumnNames::default();
        let table = aggregate_by_region(&valid_records(), &names);

        let keys: Vec<_> = table.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["Bayern", "Sachsen"]);
        assert_eq!(table.get("Bayern"), Some(&Measures::new(10.5, 50.0, 3.5)));
        assert_eq!(table.get("Sachsen"), Some(&Measures::new(3.5, 0.0, 0.25)));
        assert_eq!(table.get("Hessen"), None);
    }

    #[test]
    fn sums_per_operator() {
        let names = ColumnNames::default();
        let table = aggregate_by_operator(&valid_records(), &names);
        assert_eq!(table.key_column, "VNB-Name");
        assert_eq!(table.get("Netz Süd").map(|t| t.cost), Some(3.5));
        assert_eq!(table.get("Netz Ost").map(|t| t.length), Some(2.5));
    }

    #[test]
    fn empty_input_keeps_columns() {
        let names = ColumnNames::default();
        let table = aggregate_by_region(&[], &names);
        assert!(table.is_empty());

        let df = table.to_frame().unwrap();
        assert_eq!(df.height(), 0);
        let header: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(header, vec!["Bundesland", "Leitungslänge in km", "Übertragungskapazität in MVA", "Kosten in Mio.€"]);
    }

    #[test]
    fn frame_holds_unrounded_sums() {
        let names = ColumnNames::default();
        let records = vec![
            Record::new("A", "Bayern").with_measures(Measures::new(0.0, 0.0, 0.5)),
            Record::new("A", "Bayern").with_measures(Measures::new(0.0, 0.0, 0.25)),
        ];
        let df = aggregate_by_region(&records, &names).to_frame().unwrap();
        assert_eq!(df.column("Kosten in Mio.€").unwrap().f64().unwrap().get(0), Some(0.75));
        assert_eq!(format_value(0.126), "0.13");
    }
}
