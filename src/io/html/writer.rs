use std::{io::Write, path::Path};

use anyhow::Result;

use crate::io::PendingWrite;
use super::escape_html;

const LEAFLET: &str = "https://unpkg.com/leaflet@1.9.4/dist";
const MARKERCLUSTER: &str = "https://unpkg.com/leaflet.markercluster@1.5.3/dist";

pub(crate) struct HtmlWriter {
    sink: PendingWrite,
}

/// Implement std::io::Write so `write!` / `writeln!` work.
impl Write for HtmlWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.sink.write(buf) }

    fn flush(&mut self) -> std::io::Result<()> { self.sink.flush() }

    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> { self.sink.write_all(buf) }
}

impl HtmlWriter {
    /// Create a new HTML writer; the file appears only on `finish`.
    pub(crate) fn new(path: &Path) -> Result<Self> {
        Ok(Self { sink: PendingWrite::open(path)? })
    }

    /// Write the document head with the Leaflet assets and the map container.
    pub(crate) fn write_header(&mut self, title: &str) -> Result<()> {
        let title = escape_html(title);
        writeln!(self, r##"<!DOCTYPE html>
<html lang="de">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<link rel="stylesheet" href="{LEAFLET}/leaflet.css">
<link rel="stylesheet" href="{MARKERCLUSTER}/MarkerCluster.css">
<link rel="stylesheet" href="{MARKERCLUSTER}/MarkerCluster.Default.css">
<script src="{LEAFLET}/leaflet.js"></script>
<script src="{MARKERCLUSTER}/leaflet.markercluster.js"></script>"##)?;
        self.write_styles()?;
        writeln!(self, r##"</head>
<body>
<div id="map"></div>"##)?;
        Ok(())
    }

    /// Write CSS for the map container, legend and overlay controls.
    fn write_styles(&mut self) -> Result<()> {
        writeln!(self, r##"<style>
    html, body, #map {{ width: 100%; height: 100%; margin: 0; padding: 0; }}
    .legend {{ background: #ffffff; padding: 6px 8px; border-radius: 4px; font: 12px sans-serif; line-height: 18px; }}
    .legend i {{ width: 18px; height: 18px; float: left; margin-right: 8px; opacity: 0.7; }}
    .overlay-panel {{ position: fixed; left: 50px; z-index: 1000; }}
    .overlay-panel.download {{ bottom: 17px; background: #ffffff; padding: 8px; border-radius: 6px; }}
    .overlay-panel.toggle {{ bottom: 70px; }}
</style>"##)?;
        Ok(())
    }

    /// Wrap a script body in a `<script>` element.
    pub(crate) fn write_script(&mut self, body: &str) -> Result<()> {
        writeln!(self, "<script>\n{body}\n</script>")?;
        Ok(())
    }

    /// Close the document and replace the target file.
    pub(crate) fn finish(mut self) -> Result<()> {
        writeln!(self, "</body>\n</html>")?;
        self.sink.finalize()
    }
}
