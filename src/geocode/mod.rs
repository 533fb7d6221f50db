//! Address lookup behind an injectable trait.

mod limiter;
mod nominatim;

pub use limiter::RateLimiter;
pub use nominatim::Nominatim;

use thiserror::Error;

use crate::types::LatLon;

/// Why a single lookup failed. Every variant is treated as transient by [`RateLimiter`].
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("request to geocoding service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoding service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed geocoding response: {0}")]
    Malformed(String),
}

/// Resolves a free-text place query to a position.
///
/// `Ok(None)` means the service knows no such place; errors are lookup failures.
pub trait Geocoder {
    fn resolve(&mut self, query: &str) -> Result<Option<LatLon>, GeocodeError>;
}

impl<G: Geocoder + ?Sized> Geocoder for &mut G {
    fn resolve(&mut self, query: &str) -> Result<Option<LatLon>, GeocodeError> {
        (**self).resolve(query)
    }
}
