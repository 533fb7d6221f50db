use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Value};
use tracing::warn;

/// Reads `(name, boundary)` pairs from a GeoJSON FeatureCollection file.
pub(crate) fn read_named_polygons(path: &Path, name_property: &str) -> Result<Vec<(String, MultiPolygon<f64>)>> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read reference geography: {}", path.display()))?;
    parse_named_polygons(&bytes, name_property)
        .with_context(|| format!("[io::geojson] Invalid reference geography: {}", path.display()))
}

/// Parses `(name, boundary)` pairs from GeoJSON bytes.
/// Features without a name, or whose geometry is missing, null or non-areal,
/// are skipped with a warning.
pub(crate) fn parse_named_polygons(bytes: &[u8], name_property: &str) -> Result<Vec<(String, MultiPolygon<f64>)>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON is not a FeatureCollection"))?;

    let mut regions = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let Some(name) = feature["properties"][name_property].as_str() else {
            warn!(feature = idx, property = name_property, "skipping region feature without a name");
            continue;
        };
        let geometry = &feature["geometry"];
        let coords = || geometry["coordinates"].as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("Feature '{name}' has no coordinates"));
        let shape = match geometry["type"].as_str() {
            Some("Polygon") => MultiPolygon(vec![parse_polygon_coords(coords()?)?]),
            Some("MultiPolygon") => parse_multipolygon_coords(coords()?)?,
            other => {
                warn!(region = name, geometry = ?other, "skipping region without areal geometry");
                continue;
            }
        };
        regions.push((name.trim().to_string(), shape));
    }
    Ok(regions)
}

/// Parse GeoJSON MultiPolygon coordinates: `[polygon, ...]`.
fn parse_multipolygon_coords(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    coords.iter()
        .map(|polygon| {
            let rings = polygon.as_array()
                .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon is not an array"))?;
            parse_polygon_coords(rings)
        })
        .collect::<Result<Vec<_>>>()
        .map(MultiPolygon)
}

/// Parse GeoJSON Polygon coordinates: `[exterior, hole, hole, ...]`.
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let ring = ring.as_array().ok_or_else(|| anyhow!("Invalid Polygon: ring is not an array"))?;
        parse_ring_coords(ring)
    });
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring (exterior or interior): `[[x, y], [x, y], ...]`.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());

    for coord_pair in coords {
        if let Some(coord_array) = coord_pair.as_array() {
            if coord_array.len() >= 2 {
                let x = coord_array[0].as_f64()
                    .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
                let y = coord_array[1].as_f64()
                    .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
                points.push(Coord { x, y });
            }
        }
    }

    // Ensure ring is closed (first point == last point)
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}

/// Round to 1e-5 degrees (about a metre), enough for a web map.
#[inline]
fn round_coord(v: f64) -> f64 { (v * 1e5).round() / 1e5 }

/// GeoJSON geometry object for a MultiPolygon.
pub(crate) fn multipolygon_geometry(mp: &MultiPolygon<f64>) -> Value {
    let ring = |ls: &LineString<f64>| -> Vec<[f64; 2]> {
        ls.coords().map(|c| [round_coord(c.x), round_coord(c.y)]).collect()
    };
    let polygons: Vec<Vec<Vec<[f64; 2]>>> = mp.0.iter()
        .map(|polygon| {
            std::iter::once(ring(polygon.exterior()))
                .chain(polygon.interiors().iter().map(|ls| ring(ls)))
                .collect()
        })
        .collect();

    json!({ "type": "MultiPolygon", "coordinates": polygons })
}
