//! Format-specific reading and writing.
//!
//! Each module handles one file format:
//!
//! - `csv` - CSV tables (inputs, exports, aggregate tables)
//! - `xlsx` - spreadsheet input via calamine, `.xlsx` output
//! - `geojson` - named region polygons in, region features out
//! - `shp` - named region polygons from ESRI shapefiles
//! - `html` - map document writer and colour palettes
//!
//! Every output goes through [`PendingWrite`], so a failed run never leaves a
//! truncated file behind.

pub(crate) mod csv;
pub(crate) mod geojson;
pub(crate) mod html;
pub(crate) mod shp;
pub(crate) mod xlsx;

mod pending;

pub(crate) use pending::{write_file, PendingWrite};

pub use html::Palette;
