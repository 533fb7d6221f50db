mod coord;
mod measure;
mod record;

pub use coord::LatLon;
pub use measure::{Measure, Measures};
pub use record::{Record, RecordSet};
