use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::GeocoderConfig;
use crate::types::LatLon;
use super::{GeocodeError, Geocoder};

/// Client for the OpenStreetMap Nominatim search API (or a compatible server).
pub struct Nominatim {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Nominatim {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, base_url: config.base_url.clone() })
    }
}

impl Geocoder for Nominatim {
    fn resolve(&mut self, query: &str) -> Result<Option<LatLon>, GeocodeError> {
        let resp = self.client
            .get(&self.base_url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }
        parse_search_response(&resp.text()?)
    }
}

/// First hit of a search response, if any.
fn parse_search_response(body: &str) -> Result<Option<LatLon>, GeocodeError> {
    let places: Vec<Place> = serde_json::from_str(body)
        .map_err(|e| GeocodeError::Malformed(e.to_string()))?;
    let Some(place) = places.into_iter().next() else { return Ok(None) };

    let parse = |value: &str| value.trim().parse::<f64>()
        .map_err(|_| GeocodeError::Malformed(format!("non-numeric coordinate {value:?}")));
    Ok(Some(LatLon::new(parse(&place.lat)?, parse(&place.lon)?)))
}
