use std::collections::HashMap;

use ahash::RandomState;

use crate::load::is_placeholder;
use super::{coord::LatLon, measure::Measures};

/// One planned grid-expansion measure, as read from a source row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub operator: String,
    pub region: String,
    pub location: Option<String>,
    pub measures: Measures,
    pub coord: Option<LatLon>,
    /// Set by the validator: coordinate lies inside the declared region.
    pub valid: bool,
    cells: HashMap<String, String, RandomState>, // raw source cells by column name
}

impl Record {
    pub fn new(operator: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            region: region.into(),
            location: None,
            measures: Measures::default(),
            coord: None,
            valid: false,
            cells: HashMap::default(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_measures(mut self, measures: Measures) -> Self {
        self.measures = measures;
        self
    }

    pub fn with_coord(mut self, coord: LatLon) -> Self {
        self.coord = Some(coord);
        self
    }

    /// Raw source cell, if the source row had a non-empty value for `column`.
    pub fn cell(&self, column: &str) -> Option<&str> {
        self.cells.get(column).map(String::as_str)
    }

    pub fn set_cell(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Location description present and not a placeholder token.
    pub fn has_location(&self) -> bool {
        self.location.as_deref().is_some_and(|s| !is_placeholder(s))
    }
}

/// Records plus the ordered union of their source column names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Append `other` after `self`. Row order is kept and nothing is deduplicated;
    /// columns only present in `other` are added at the end.
    pub fn concat(mut self, other: RecordSet) -> RecordSet {
        for column in other.columns {
            if !self.columns.contains(&column) {
                self.columns.push(column);
            }
        }
        self.records.extend(other.records);
        self
    }
}
