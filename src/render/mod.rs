//! Map documents and CSV exports for the valid records.

mod export;
mod map;
mod markers;

pub use export::{safe_filename, write_aggregate_exports, write_operator_exports, ExportLink};
pub use map::MapRenderer;
