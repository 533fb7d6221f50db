//! Reference geography: named regions and point-in-region queries.

mod bbox;
mod regions;

pub use regions::{Region, Regions};
