use std::path::Path;

use ahash::AHashMap;
use anyhow::{bail, Context, Result};
use geo::{BoundingRect, Contains, MultiPolygon, Point};
use rstar::{RTree, AABB};
use tracing::{info, warn};

use crate::io::{geojson::read_named_polygons, shp::read_named_shapes};
use super::bbox::BoundingBox;

/// A named area of the reference geography (a federal state, by default).
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub shape: MultiPolygon<f64>,
}

/// Named regions with an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub struct Regions {
    regions: Vec<Region>,
    rtree: RTree<BoundingBox>,
    by_name: AHashMap<String, usize>,
}

impl Regions {
    /// Index the given regions. Names must be unique.
    pub fn new(items: Vec<(String, MultiPolygon<f64>)>) -> Result<Self> {
        let mut by_name = AHashMap::with_capacity(items.len());
        let mut regions = Vec::with_capacity(items.len());
        for (name, shape) in items {
            if by_name.insert(name.clone(), regions.len()).is_some() {
                bail!("[region] Duplicate region name in reference geography: {name:?}");
            }
            regions.push(Region { name, shape });
        }

        let boxes = regions.iter().enumerate()
            .filter_map(|(i, region)| match region.shape.bounding_rect() {
                Some(rect) => Some(BoundingBox::new(i, rect)),
                None => {
                    warn!(region = %region.name, "region has an empty boundary; nothing will lie inside it");
                    None
                }
            })
            .collect();

        Ok(Self { regions, rtree: RTree::bulk_load(boxes), by_name })
    }

    /// Load regions from a GeoJSON FeatureCollection or a polygon shapefile.
    pub fn from_path(path: &Path, name_property: &str) -> Result<Self> {
        if !path.is_file() {
            bail!("[region] Reference geography not found: {}", path.display());
        }
        let is_shp = path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("shp"));
        let items = if is_shp {
            read_named_shapes(path, name_property)?
        } else {
            read_named_polygons(path, name_property)?
        };

        let regions = Self::new(items)
            .with_context(|| format!("[region] Invalid reference geography: {}", path.display()))?;
        info!(path = %path.display(), regions = regions.len(), "loaded reference geography");
        Ok(regions)
    }

    #[inline] pub fn len(&self) -> usize { self.regions.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.regions.is_empty() }

    #[inline] pub fn iter(&self) -> impl Iterator<Item = &Region> { self.regions.iter() }

    /// Look up a region by its exact name.
    pub fn get(&self, name: &str) -> Option<&Region> {
        self.by_name.get(name).map(|&i| &self.regions[i])
    }

    /// The first region (in input order) whose interior contains the point.
    pub fn locate(&self, point: Point<f64>) -> Option<&Region> {
        let envelope = AABB::from_point([point.x(), point.y()]);
        self.rtree.locate_in_envelope_intersecting(&envelope)
            .map(BoundingBox::idx)
            .filter(|&i| self.regions[i].shape.contains(&point))
            .min()
            .map(|i| &self.regions[i])
    }

    /// Whether the named region exists and contains the point.
    pub fn contains(&self, name: &str, point: Point<f64>) -> bool {
        self.get(name).is_some_and(|region| region.shape.contains(&point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        let p: Polygon<f64> = polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size), (x: x0, y: y0),
        ];
        MultiPolygon(vec![p])
    }

    fn sample() -> Regions {
        Regions::new(vec![
            ("Bayern".into(), square(9.0, 47.0, 4.0)),
            ("Sachsen".into(), square(12.0, 50.5, 3.0)),
            ("Innen".into(), square(10.0, 48.0, 1.0)),
        ]).unwrap()
    }

    #[test]
    fn locate_returns_first_containing_region() {
        let regions = sample();
        assert_eq!(regions.locate(Point::new(11.5, 48.1)).map(|r| r.name.as_str()), Some("Bayern"));
        assert_eq!(regions.locate(Point::new(10.5, 48.5)).map(|r| r.name.as_str()), Some("Bayern"));
        assert_eq!(regions.locate(Point::new(13.5, 51.0)).map(|r| r.name.as_str()), Some("Sachsen"));
        assert!(regions.locate(Point::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn contains_checks_the_named_region_only() {
        let regions = sample();
        let munich = Point::new(11.5, 48.1);
        assert!(regions.contains("Bayern", munich));
        assert!(!regions.contains("Sachsen", munich));
        assert!(!regions.contains("Atlantis", munich));
        assert!(regions.contains("Innen", Point::new(10.5, 48.5)));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = Regions::new(vec![
            ("Bayern".into(), square(0.0, 0.0, 1.0)),
            ("Bayern".into(), square(5.0, 5.0, 1.0)),
        ]).unwrap_err();
        assert!(err.to_string().contains("Bayern"));
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regions.geo.json");
        std::fs::write(&path, r#"{"type": "FeatureCollection", "features": [
            { "type": "Feature", "properties": { "name": "Bayern" },
              "geometry": { "type": "Polygon", "coordinates": [[[9.0, 47.0], [13.0, 47.0], [13.0, 50.0], [9.0, 50.0], [9.0, 47.0]]] } },
            { "type": "Feature", "properties": { "name": "Leer" }, "geometry": null }
        ]}"#).unwrap();

        let regions = Regions::from_path(&path, "name").unwrap();
        assert_eq!(regions.len(), 1);
        assert!(regions.get("Leer").is_none());
        assert!(!regions.contains("Leer", Point::new(11.5, 48.1)));
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(Regions::from_path(Path::new("/nonexistent/regions.geo.json"), "name").is_err());
    }
}
