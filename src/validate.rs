//! Geographic validation of resolved coordinates against declared regions.

use tracing::{debug, info};

use crate::region::Regions;
use crate::types::Record;

/// Outcome of checking one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    NoCoordinate,
    /// The declared region name is not part of the reference geography.
    UnknownRegion,
    /// Inside some other region than the declared one.
    Mismatched { actual: String },
    /// Inside no region at all.
    Outside,
}

/// Check one record. Valid iff it has a coordinate lying inside the region bearing
/// its declared name.
pub fn classify(record: &Record, regions: &Regions) -> Verdict {
    let Some(coord) = record.coord else { return Verdict::NoCoordinate };
    let point = coord.to_point();

    if regions.contains(&record.region, point) {
        return Verdict::Valid;
    }
    match regions.locate(point) {
        Some(actual) => Verdict::Mismatched { actual: actual.name.clone() },
        None if regions.get(&record.region).is_none() => Verdict::UnknownRegion,
        None => Verdict::Outside,
    }
}

/// Counts per verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStats {
    pub valid: usize,
    pub no_coordinate: usize,
    pub unknown_region: usize,
    pub mismatched: usize,
    pub outside: usize,
}

impl ValidationStats {
    fn count(&mut self, verdict: &Verdict) {
        match verdict {
            Verdict::Valid => self.valid += 1,
            Verdict::NoCoordinate => self.no_coordinate += 1,
            Verdict::UnknownRegion => self.unknown_region += 1,
            Verdict::Mismatched { .. } => self.mismatched += 1,
            Verdict::Outside => self.outside += 1,
        }
    }

    pub fn invalid(&self) -> usize {
        self.no_coordinate + self.unknown_region + self.mismatched + self.outside
    }
}

/// Records split by validity. Each side keeps input order.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub valid: Vec<Record>,
    pub invalid: Vec<Record>,
    pub stats: ValidationStats,
}

/// Set each record's `valid` flag and split the records accordingly.
pub fn validate(records: Vec<Record>, regions: &Regions) -> Partition {
    let mut partition = Partition::default();

    for mut record in records {
        let verdict = classify(&record, regions);
        partition.stats.count(&verdict);
        record.valid = verdict == Verdict::Valid;

        if record.valid {
            partition.valid.push(record);
        } else {
            debug!(
                operator = %record.operator,
                region = %record.region,
                location = record.location.as_deref().unwrap_or(""),
                ?verdict,
                "record failed validation"
            );
            partition.invalid.push(record);
        }
    }

    let stats = &partition.stats;
    info!(
        valid = stats.valid,
        invalid = stats.invalid(),
        no_coordinate = stats.no_coordinate,
        outside = stats.outside,
        mismatched = stats.mismatched,
        unknown_region = stats.unknown_region,
        "validated records"
    );
    partition
}
