use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::info;

use crate::aggregate::{format_value, AggregateTable};
use crate::config::{ColumnNames, MapSpec, RenderOptions};
use crate::io::geojson::multipolygon_geometry;
use crate::io::html::{escape_html, script_json, ColorScale, HtmlWriter, NO_DATA};
use crate::region::Regions;
use crate::types::{Measure, Measures, Record};
use super::export::ExportLink;
use super::markers::{marker_groups, MarkerGroup};

const TILES: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const REGION_LAYER_LABEL: &str = "Bundesländer";

/// Region boundary and totals, shared by every map.
struct RegionEntry {
    name: String,
    geometry: Value,
    totals: Option<Measures>,
}

/// Renders map documents for a set of valid records.
///
/// Everything that does not depend on the mapped measure is prepared once in
/// [`MapRenderer::new`].
pub struct MapRenderer<'a> {
    options: &'a RenderOptions,
    regions: Vec<RegionEntry>,
    groups: Vec<MarkerGroup>,
    downloads: Vec<(String, String)>, // (label, href)
}

impl<'a> MapRenderer<'a> {
    pub fn new(
        regions: &Regions,
        valid: &[Record],
        region_totals: &AggregateTable,
        names: &ColumnNames,
        options: &'a RenderOptions,
    ) -> Self {
        let regions = regions.iter()
            .map(|region| RegionEntry {
                name: region.name.clone(),
                geometry: multipolygon_geometry(&region.shape),
                totals: region_totals.get(&region.name).copied(),
            })
            .collect();

        Self {
            options,
            regions,
            groups: marker_groups(valid, names, &options.popup_fields),
            downloads: Vec::new(),
        }
    }

    /// Offer these exports in the download selector.
    pub fn with_downloads(mut self, links: &[ExportLink]) -> Self {
        self.downloads = links.iter()
            .map(|link| (link.label.clone(), format!("{}/{}", self.options.export_subdir, link.file_name)))
            .collect();
        self
    }

    /// Write one map document coloured by `spec.measure`.
    pub fn render(&self, spec: &MapSpec, path: &Path) -> Result<()> {
        let scale = ColorScale::new(
            self.regions.iter().filter_map(|r| r.totals.map(|t| t.get(spec.measure))),
            spec.palette,
        );

        let features: Vec<Value> = self.regions.iter()
            .map(|region| {
                let fill = match (&scale, region.totals) {
                    (Some(scale), Some(totals)) => scale.color(totals.get(spec.measure)),
                    _ => NO_DATA,
                };
                json!({
                    "type": "Feature",
                    "properties": {
                        "name": region.name,
                        "fill": fill.to_string(),
                        "tooltip": escape_html(&region.name),
                        "popup": region_popup(&region.name, region.totals.as_ref()),
                    },
                    "geometry": region.geometry,
                })
            })
            .collect();
        let collection = json!({ "type": "FeatureCollection", "features": features });

        let title = format!("{} je Bundesland", spec.measure.label());
        let mut writer = HtmlWriter::new(path)?;
        writer.write_header(&title)?;
        self.write_panels(&mut writer)?;
        writer.write_script(&self.script(spec, &collection, scale.as_ref())?)?;
        writer.finish()?;

        info!(path = %path.display(), measure = ?spec.measure, operators = self.groups.len(), "wrote map");
        Ok(())
    }

    /// Toggle buttons and download selector, as enabled.
    fn write_panels(&self, writer: &mut HtmlWriter) -> Result<()> {
        if self.options.toggle_all_control {
            writeln!(writer, r#"<div class="overlay-panel toggle">
    <button type="button" onclick="toggleOperators(true)">Alle VNB einblenden</button>
    <button type="button" onclick="toggleOperators(false)">Alle VNB ausblenden</button>
</div>"#)?;
        }
        if self.options.download_selector && !self.downloads.is_empty() {
            writeln!(writer, r#"<div class="overlay-panel download">
    <label for="vnb-download">CSV herunterladen:</label>
    <select id="vnb-download">
        <option value="">VNB auswählen</option>"#)?;
            for (label, href) in &self.downloads {
                writeln!(writer, r#"        <option value="{}">{}</option>"#, escape_html(href), escape_html(label))?;
            }
            writeln!(writer, r#"    </select>
    <button type="button" onclick="downloadSelected()">Download</button>
</div>"#)?;
        }
        Ok(())
    }

    /// Leaflet script for one measure.
    fn script(&self, spec: &MapSpec, regions: &Value, scale: Option<&ColorScale>) -> Result<String> {
        let [lat, lon] = self.options.center;
        let mut js = String::new();

        writeln!(js, "var map = L.map('map').setView([{lat}, {lon}], {});", self.options.zoom)?;
        writeln!(js, "L.tileLayer('{TILES}', {{maxZoom: 19, attribution: '&copy; OpenStreetMap contributors'}}).addTo(map);")?;

        writeln!(js, "var regionData = {};", script_json(regions).context("[render] Failed to encode regions")?)?;
        js.push_str(r#"var regionLayer = L.geoJSON(regionData, {
    style: function (feature) {
        return {fillColor: feature.properties.fill, color: '#555555', weight: 1, fillOpacity: 0.7};
    },
    onEachFeature: function (feature, layer) {
        layer.bindTooltip(feature.properties.tooltip);
        layer.bindPopup(feature.properties.popup);
        layer.on({
            mouseover: function (e) { e.target.setStyle({weight: 3, color: '#222222', fillOpacity: 0.9}); },
            mouseout: function (e) { regionLayer.resetStyle(e.target); }
        });
    }
}).addTo(map);
"#);

        let legend = legend_html(spec.measure, scale);
        writeln!(js, "var legend = L.control({{position: 'bottomright'}});")?;
        writeln!(js, "legend.onAdd = function () {{ var div = L.DomUtil.create('div', 'legend'); div.innerHTML = {}; return div; }};",
            script_json(&legend).context("[render] Failed to encode legend")?)?;
        js.push_str("legend.addTo(map);\n");

        js.push_str("var overlays = {};\n");
        if self.options.region_layer_toggle {
            writeln!(js, "overlays[{}] = regionLayer;", script_json(REGION_LAYER_LABEL)?)?;
        }

        writeln!(js, "var markerGroups = {};", script_json(&self.groups).context("[render] Failed to encode markers")?)?;
        js.push_str(r#"var operatorLayers = [];
markerGroups.forEach(function (group) {
    var cluster = L.markerClusterGroup({
        maxClusterRadius: 120,
        disableClusteringAtZoom: 12,
        spiderfyOnMaxZoom: true,
        showCoverageOnHover: true,
        zoomToBoundsOnClick: true
    });
    group.markers.forEach(function (m) {
        L.circleMarker([m.lat, m.lon], {radius: 7, color: group.color, weight: 1, fillColor: group.color, fillOpacity: 0.8})
            .bindPopup(m.popup, {maxWidth: 400})
            .bindTooltip(m.tooltip)
            .addTo(cluster);
    });
    overlays[group.label] = cluster;
    operatorLayers.push(cluster);
});
L.control.layers(null, overlays, {collapsed: true}).addTo(map);
function toggleOperators(show) {
    operatorLayers.forEach(function (layer) {
        if (show) { map.addLayer(layer); } else { map.removeLayer(layer); }
    });
}
"#);

        if self.options.download_selector {
            js.push_str(r#"function downloadSelected() {
    var href = document.getElementById('vnb-download').value;
    if (!href) { return; }
    var a = document.createElement('a');
    a.href = href;
    a.download = href.split('/').pop();
    document.body.appendChild(a);
    a.click();
    document.body.removeChild(a);
}
"#);
        }
        Ok(js)
    }
}

/// Region popup: the three totals, or "Keine Daten".
fn region_popup(name: &str, totals: Option<&Measures>) -> String {
    let body = match totals {
        Some(totals) => Measure::DISPLAY_ORDER.iter()
            .map(|&m| format!("{}: {} {}", m.label(), format_value(totals.get(m)), m.unit()))
            .collect::<Vec<_>>()
            .join("<br>"),
        None => "Keine Daten".to_string(),
    };
    format!("<b>{}</b><br>{}", escape_html(name), body)
}

/// Legend body: one swatch per class plus the no-data swatch.
fn legend_html(measure: Measure, scale: Option<&ColorScale>) -> String {
    let mut html = format!("<b>{} ({})</b><br>", measure.label(), measure.unit());
    for (lo, hi, color) in scale.map(ColorScale::classes).unwrap_or_default() {
        html.push_str(&format!("<i style=\"background:{color}\"></i>{} – {}<br>", format_value(lo), format_value(hi)));
    }
    html.push_str(&format!("<i style=\"background:{NO_DATA}\"></i>Keine Daten"));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, MultiPolygon};
    use crate::aggregate::aggregate_by_region;
    use crate::io::Palette;
    use crate::types::LatLon;

    fn regions() -> Regions {
        let square = |x0: f64, y0: f64, size: f64| MultiPolygon(vec![polygon![
            (x: x0, y: y0), (x: x0 + size, y: y0), (x: x0 + size, y: y0 + size), (x: x0, y: y0 + size), (x: x0, y: y0),
        ]]);
        Regions::new(vec![
            ("Bayern".into(), square(9.0, 47.0, 4.0)),
            ("Sachsen".into(), square(12.0, 50.5, 3.0)),
        ]).unwrap()
    }

    fn valid() -> Vec<Record> {
        let mut r = Record::new("Netz <Süd>", "Bayern")
            .with_location("München")
            .with_measures(Measures::new(12.0, 40.0, 1.5))
            .with_coord(LatLon::new(48.1, 11.5));
        r.set_cell("Bundesland", "Bayern");
        r.set_cell("Kosten in Mio.€", "1,5");
        vec![r]
    }

    #[test]
    fn region_popup_lists_totals_or_no_data() {
        assert_eq!(
            region_popup("Bayern", Some(&Measures::new(12.0, 40.0, 1.5))),
            "<b>Bayern</b><br>Kosten: 1.50 Mio.€<br>Übertragungskapazität: 40.00 MVA<br>Leitungslänge: 12.00 km"
        );
        assert_eq!(region_popup("Sachsen", None), "<b>Sachsen</b><br>Keine Daten");
    }

    #[test]
    fn renders_regions_markers_and_controls() {
        let dir = tempfile::tempdir().unwrap();
        let names = ColumnNames::default();
        let options = RenderOptions::default();
        let regions = regions();
        let valid = valid();
        let totals = aggregate_by_region(&valid, &names);
        let link = ExportLink { label: "Alle VNBs".into(), file_name: "Alle_VNBs.csv".into(), path: dir.path().join("x") };

        let renderer = MapRenderer::new(&regions, &valid, &totals, &names, &options).with_downloads(&[link]);
        let path = dir.path().join("karte.html");
        renderer.render(&MapSpec::new(Measure::Cost, "karte.html", Palette::YlOrRd), &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("leaflet.markercluster.js"));
        assert!(html.contains(r##""fill":"#bd0026""##));
        assert!(html.contains(r##""fill":"#cccccc""##));
        assert!(html.contains("Keine Daten"));
        assert!(html.contains("VNB: Netz &lt;Süd&gt;"));
        assert!(!html.contains("Netz <Süd>"));
        assert!(html.contains("maxClusterRadius: 120"));
        assert!(html.contains("Alle VNB einblenden"));
        assert!(html.contains(r#"<option value="vnb_csv/Alle_VNBs.csv">Alle VNBs</option>"#));
        assert!(!html.contains("overlays[\"Bundesländer\"]"));
    }

    #[test]
    fn empty_inputs_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let names = ColumnNames::default();
        let options = RenderOptions { region_layer_toggle: true, download_selector: false, ..RenderOptions::default() };
        let regions = regions();
        let totals = aggregate_by_region(&[], &names);

        let renderer = MapRenderer::new(&regions, &[], &totals, &names, &options);
        let path = dir.path().join("leer.html");
        renderer.render(&MapSpec::new(Measure::Length, "leer.html", Palette::Greens), &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("var markerGroups = [];"));
        assert!(!html.contains("#006d2c"));
        assert!(html.contains("overlays[\"Bundesländer\"] = regionLayer;"));
        assert!(!html.contains("vnb-download"));
    }
}
