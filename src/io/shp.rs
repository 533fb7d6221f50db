use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{dbase::FieldValue, Reader, Shape};

/// Reads `(name, boundary)` pairs from a polygon shapefile.
/// Coordinates are taken as-is and must already be WGS84 lon/lat.
pub(crate) fn read_named_shapes(path: &Path, name_field: &str) -> Result<Vec<(String, MultiPolygon<f64>)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut items = Vec::new();
    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("[io::shp] Error reading shape+record")?;
        let name = match record.get(name_field) {
            Some(FieldValue::Character(Some(s))) => s.trim().to_string(),
            _ => bail!("[io::shp] Missing or invalid character field: {}", name_field),
        };
        let shape = match shape {
            Shape::Polygon(polygon) => shp_to_geo(&polygon),
            other => bail!("[io::shp] Found non-Polygon shape for region {}: {:?}", name, other.shapetype()),
        };
        items.push((name, shape));
    }
    Ok(items)
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>
fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    /// Get the signed area of a ring (negative for clockwise)
    fn signed_area(pts: &[Coord<f64>]) -> f64 {
        pts.windows(2).map(|w| w[0].x * w[1].y - w[1].x * w[0].y).sum::<f64>() / 2.0
    }

    // Shapefiles store each exterior (clockwise) followed by its holes.
    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        let mut coords: Vec<Coord<f64>> = ring.points().iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
            if first != last { coords.push(first) }
        }
        let is_exterior = signed_area(&coords) < 0.0;
        let ls = LineString(coords);

        if is_exterior {
            if let Some(ext) = current_exterior.take() {
                polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
            }
            current_exterior = Some(ls);
        } else {
            current_holes.push(ls);
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Contains, Point};
    use shapefile::{Point as ShpPoint, PolygonRing};

    fn ring(pts: &[(f64, f64)]) -> Vec<ShpPoint> {
        pts.iter().map(|&(x, y)| ShpPoint { x, y }).collect()
    }

    #[test]
    fn clockwise_rings_are_exteriors_and_holes_follow() {
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(ring(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)])),
            PolygonRing::Inner(ring(&[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0), (1.0, 1.0)])),
            PolygonRing::Outer(ring(&[(10.0, 10.0), (10.0, 11.0), (11.0, 11.0), (11.0, 10.0), (10.0, 10.0)])),
        ]);

        let shape = shp_to_geo(&polygon);
        assert_eq!(shape.0.len(), 2);
        assert_eq!(shape.0[0].interiors().len(), 1);
        assert!(shape.contains(&Point::new(3.0, 3.0)));
        assert!(!shape.contains(&Point::new(1.5, 1.5)));
        assert!(shape.contains(&Point::new(10.5, 10.5)));
    }
}
