use serde::Serialize;

use crate::aggregate::format_value;
use crate::config::ColumnNames;
use crate::io::html::{category_color, escape_html};
use crate::load::is_placeholder;
use crate::types::Record;
use super::export::operators_in_order;

/// One circle marker, with popup and tooltip already escaped.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Marker {
    pub(crate) lat: f64,
    pub(crate) lon: f64,
    pub(crate) popup: String,
    pub(crate) tooltip: String,
}

/// Markers of one operator, shown as one overlay.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct MarkerGroup {
    /// Layer control label, escaped.
    pub(crate) label: String,
    pub(crate) color: String,
    pub(crate) markers: Vec<Marker>,
}

/// One group per operator, in order of first appearance. Records without a
/// usable location get no marker.
pub(crate) fn marker_groups(valid: &[Record], names: &ColumnNames, popup_fields: &[String]) -> Vec<MarkerGroup> {
    operators_in_order(valid).into_iter().enumerate()
        .map(|(i, operator)| MarkerGroup {
            label: format!("VNB: {}", escape_html(operator)),
            color: category_color(i).to_string(),
            markers: valid.iter()
                .filter(|r| r.operator == operator && r.has_location())
                .filter_map(|r| {
                    let coord = r.coord?;
                    Some(Marker {
                        lat: coord.lat,
                        lon: coord.lon,
                        popup: popup_html(r, names, popup_fields),
                        tooltip: escape_html(r.location.as_deref().unwrap_or_default()),
                    })
                })
                .collect(),
        })
        .collect()
}

/// Display text of one popup field, if the record has a usable value for it.
fn field_value(record: &Record, names: &ColumnNames, field: &str) -> Option<String> {
    if field == names.latitude {
        return record.coord.map(|c| c.lat.to_string());
    }
    if field == names.longitude {
        return record.coord.map(|c| c.lon.to_string());
    }
    let raw = record.cell(field).filter(|v| !is_placeholder(v))?;
    match names.measure_of(field) {
        Some(measure) => Some(format_value(record.measures.get(measure))),
        None => Some(raw.trim().to_string()),
    }
}

/// `<b>field:</b> value` lines for the configured fields, skipping missing ones.
pub(crate) fn popup_html(record: &Record, names: &ColumnNames, fields: &[String]) -> String {
    fields.iter()
        .filter_map(|field| {
            let value = field_value(record, names, field)?;
            Some(format!("<b>{}:</b> {}", escape_html(field), escape_html(&value)))
        })
        .collect::<Vec<_>>()
        .join("<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LatLon, Measures};

    fn record(operator: &str, location: &str) -> Record {
        let mut r = Record::new(operator, "Bayern")
            .with_location(location)
            .with_measures(Measures::new(0.0, 0.0, 1.5))
            .with_coord(LatLon::new(48.1, 11.5));
        r.set_cell("Bundesland", "Bayern");
        r.set_cell("Ort / Trasse", location);
        r.set_cell("Kosten in Mio.€", "1,5");
        r.set_cell("Netzebene", "k.A.");
        r
    }

    #[test]
    fn popup_skips_placeholders_and_escapes() {
        let names = ColumnNames::default();
        let fields: Vec<String> = ["Bundesland", "Ort / Trasse", "Netzebene", "Projektstatus", "Kosten in Mio.€", "latitude"]
            .iter().map(|s| s.to_string()).collect();
        let popup = popup_html(&record("A", "<b>Umspannwerk</b>"), &names, &fields);
        assert_eq!(
            popup,
            "<b>Bundesland:</b> Bayern<br><b>Ort / Trasse:</b> &lt;b&gt;Umspannwerk&lt;/b&gt;<br>\
             <b>Kosten in Mio.€:</b> 1.50<br><b>latitude:</b> 48.1"
        );
    }

    #[test]
    fn groups_follow_first_appearance_and_skip_unlocated() {
        let names = ColumnNames::default();
        let valid = vec![record("Netz B", "Ort 1"), record("Netz A", "k.A."), record("Netz B", "Ort 2")];
        let groups = marker_groups(&valid, &names, &[]);

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["VNB: Netz B", "VNB: Netz A"]);
        assert_eq!(groups[0].markers.len(), 2);
        assert!(groups[1].markers.is_empty());
        assert_eq!(groups[0].color, "#1f77b4");
        assert_eq!(groups[1].color, "#aec7e8");
        assert_eq!(groups[0].markers[1].tooltip, "Ort 2");
    }
}
