#![doc = "gridplan public API"]
mod aggregate;
mod config;
mod geocode;
mod io;
mod load;
mod pipeline;
mod region;
mod render;
mod table;
mod types;
mod validate;

#[doc(inline)]
pub use config::{ColumnNames, GeocoderConfig, MapSpec, PipelineConfig, RenderOptions};

#[doc(inline)]
pub use types::{LatLon, Measure, Measures, Record, RecordSet};

#[doc(inline)]
pub use io::Palette;

#[doc(inline)]
pub use geocode::{GeocodeError, Geocoder, Nominatim, RateLimiter};

#[doc(inline)]
pub use load::{geocode_query, is_placeholder, parse_decimal, read_table, to_number, Loader};

#[doc(inline)]
pub use region::{Region, Regions};

#[doc(inline)]
pub use validate::{classify, validate, Partition, ValidationStats, Verdict};

#[doc(inline)]
pub use aggregate::{aggregate_by_operator, aggregate_by_region, format_value, AggregateRow, AggregateTable, Totals};

#[doc(inline)]
pub use render::{safe_filename, write_aggregate_exports, write_operator_exports, ExportLink, MapRenderer};

#[doc(inline)]
pub use pipeline::{run, run_with_nominatim, PipelineReport};
