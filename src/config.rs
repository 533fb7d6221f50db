use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::io::Palette;
use crate::types::Measure;

/// Source column names. Defaults match the operators' planning spreadsheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub operator: String,
    pub region: String,
    pub location: String,
    pub length: String,
    pub capacity: String,
    pub cost: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            operator: "VNB-Name".to_string(),
            region: "Bundesland".to_string(),
            location: "Ort / Trasse".to_string(),
            length: "Leitungslänge in km".to_string(),
            capacity: "Übertragungskapazität in MVA".to_string(),
            cost: "Kosten in Mio.€".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
        }
    }
}

impl ColumnNames {
    /// Column holding the given measure.
    pub fn measure(&self, measure: Measure) -> &str {
        match measure {
            Measure::Length => &self.length,
            Measure::Capacity => &self.capacity,
            Measure::Cost => &self.cost,
        }
    }

    /// The measure stored in `column`, if it is one of the three measure columns.
    pub fn measure_of(&self, column: &str) -> Option<Measure> {
        [Measure::Length, Measure::Capacity, Measure::Cost]
            .into_iter()
            .find(|&m| self.measure(m) == column)
    }
}

/// Geocoding service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    /// Search endpoint of a Nominatim-compatible service.
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Minimum spacing between two requests.
    pub min_delay_ms: u64,
    /// Retries after the first failed attempt before a lookup counts as a miss.
    pub max_retries: u32,
    pub retry_wait_ms: u64,
    /// Appended to every query to disambiguate place names.
    pub country: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: concat!("gridplan/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 60,
            min_delay_ms: 1000,
            max_retries: 3,
            retry_wait_ms: 5000,
            country: "Deutschland".to_string(),
        }
    }
}

/// One map document: which aggregate drives the region colouring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSpec {
    pub measure: Measure,
    pub file_name: String,
    pub palette: Palette,
}

impl MapSpec {
    pub fn new(measure: Measure, file_name: impl Into<String>, palette: Palette) -> Self {
        Self { measure, file_name: file_name.into(), palette }
    }
}

/// Map rendering switches shared by every map document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Initial view as `[lat, lon]`.
    pub center: [f64; 2],
    pub zoom: u8,
    /// List the region layer in the layer control instead of always showing it.
    pub region_layer_toggle: bool,
    /// Buttons showing or hiding every operator group at once.
    pub toggle_all_control: bool,
    /// Selector offering the per-operator CSV exports for download.
    pub download_selector: bool,
    /// Fields listed in marker popups, in order.
    pub popup_fields: Vec<String>,
    /// Subdirectory of the map directory receiving the CSV exports.
    pub export_subdir: String,
    /// File stem of the export holding every valid record.
    pub combined_export: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let columns = ColumnNames::default();
        Self {
            center: [51.0, 10.0],
            zoom: 6,
            region_layer_toggle: false,
            toggle_all_control: true,
            download_selector: true,
            popup_fields: vec![
                columns.region.clone(),
                columns.location.clone(),
                "Netzebene".to_string(),
                "Art der Maßnahme".to_string(),
                "Netzkomponente".to_string(),
                "Projektstatus".to_string(),
                "Zeithorizont".to_string(),
                columns.length.clone(),
                columns.capacity.clone(),
                columns.cost.clone(),
                columns.operator.clone(),
                columns.latitude.clone(),
                columns.longitude.clone(),
            ],
            export_subdir: "vnb_csv".to_string(),
            combined_export: "Alle_VNBs".to_string(),
        }
    }
}

/// Everything one pipeline run needs. Loadable from JSON; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// One or two input spreadsheets, concatenated in order.
    pub inputs: Vec<PathBuf>,
    /// Reference geography (GeoJSON or shapefile).
    pub regions: PathBuf,
    /// GeoJSON property / shapefile attribute holding the region name.
    pub region_name_property: String,
    pub valid_output: PathBuf,
    pub invalid_output: PathBuf,
    pub map_dir: PathBuf,
    pub maps: Vec<MapSpec>,
    /// Field separator for CSV inputs.
    pub csv_separator: char,
    pub columns: ColumnNames,
    pub geocoder: GeocoderConfig,
    pub render: RenderOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            regions: PathBuf::from("2_deutschland.geo.json"),
            region_name_property: "name".to_string(),
            valid_output: PathBuf::from("output_geokodiert.xlsx"),
            invalid_output: PathBuf::from("output_failure.xlsx"),
            map_dir: PathBuf::from("."),
            maps: vec![
                MapSpec::new(Measure::Cost, "interaktive_karte_kosten.html", Palette::YlOrRd),
                MapSpec::new(Measure::Capacity, "interaktive_karte_uebertragung.html", Palette::Blues),
                MapSpec::new(Measure::Length, "interaktive_karte_leitung.html", Palette::Greens),
            ],
            csv_separator: ',',
            columns: ColumnNames::default(),
            geocoder: GeocoderConfig::default(),
            render: RenderOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open configuration file: {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse configuration file: {}", path.display()))
    }

    /// Pretty JSON rendering, e.g. as a starting point for a configuration file.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("[config] Failed to serialize configuration")
    }

    /// Reject configurations that cannot produce a run.
    pub fn check(&self) -> Result<()> {
        if self.inputs.is_empty() || self.inputs.len() > 2 {
            bail!("[config] Expected one or two input files, got {}", self.inputs.len());
        }
        if !self.csv_separator.is_ascii() {
            bail!("[config] CSV separator must be an ASCII character, got {:?}", self.csv_separator);
        }
        for spec in &self.maps {
            if spec.file_name.trim().is_empty() {
                bail!("[config] Map for {:?} has an empty file name", spec.measure);
            }
        }
        Ok(())
    }

    /// The CSV separator as a byte; `check` guarantees it is ASCII.
    pub(crate) fn csv_separator_byte(&self) -> u8 {
        u8::try_from(self.csv_separator).unwrap_or(b',')
    }

    /// Directory receiving the CSV exports.
    pub fn export_dir(&self) -> PathBuf {
        self.map_dir.join(&self.render.export_subdir)
    }
}
