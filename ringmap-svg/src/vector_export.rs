/*!
# Vector Export

Renders a [`GenomeMap`] onto an [`SvgCanvas`] and writes the document, with provenance comments
at the top and an optional JSON file of label bounds next to it.
*/

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use ringmap_core::bounds::save_json;
use ringmap_core::{GenomeMap, RenderOutput};

use crate::canvas::SvgCanvas;
use crate::html::image_map_page;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub font_family: String,
    /// Extra comment lines written after the header.
    pub provenance_comment: Option<String>,
    /// Add a generation timestamp comment. Off for byte-identical output.
    pub timestamp: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial, sans-serif".to_string(),
            provenance_comment: None,
            timestamp: true,
        }
    }
}

/// Vector export system
pub struct VectorExporter {
    config: ExportConfig,
}

impl VectorExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render `map` and return the SVG document with the render summary.
    pub fn render_svg(&self, map: &mut GenomeMap) -> (String, RenderOutput) {
        let (width, height) = map.canvas_size();
        let mut canvas = SvgCanvas::new(width, height, &self.config.font_family);
        let output = map.render(&mut canvas);
        let comments = self.comments(map, &output);
        (canvas.to_document(&comments), output)
    }

    /// Export to SVG format
    pub fn export_svg<P: AsRef<Path>>(&self, path: P, map: &mut GenomeMap) -> Result<RenderOutput> {
        let path = path.as_ref();
        let (document, output) = self.render_svg(map);
        let mut file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        file.write_all(document.as_bytes())
            .with_context(|| format!("Failed to write SVG to {}", path.display()))?;
        log::info!(
            "Wrote {} ({} labels shown, {} dropped)",
            path.display(),
            output.report.total - output.report.dropped,
            output.report.dropped
        );
        Ok(output)
    }

    /// Write the label bounds of a render as JSON, for image maps and hit testing.
    pub fn export_bounds_json<P: AsRef<Path>>(&self, path: P, output: &RenderOutput) -> Result<()> {
        save_json(&output.label_bounds, path.as_ref())
    }

    /// Write an HTML page that shows `image` with clickable areas for the linked labels.
    pub fn export_html<P: AsRef<Path>>(&self, path: P, image: &str, map: &GenomeMap, output: &RenderOutput) -> Result<()> {
        let path = path.as_ref();
        let (width, height) = map.canvas_size();
        let title = map.title.as_deref().unwrap_or("RingMap");
        let page = image_map_page(title, image, width, height, &output.label_bounds);
        std::fs::write(path, page).with_context(|| format!("Failed to write HTML to {}", path.display()))?;
        log::info!("Wrote image map page {}", path.display());
        Ok(())
    }

    fn comments(&self, map: &GenomeMap, output: &RenderOutput) -> Vec<String> {
        let mut comments = vec![format!(
            "RingMap v{} | {} bp | {} features in {} slots | {} of {} labels shown",
            ringmap_core::VERSION,
            map.sequence_length(),
            map.registry().feature_count(),
            map.registry().slot_count(),
            output.report.total - output.report.dropped,
            output.report.total
        )];
        if let Some(comment) = &self.config.provenance_comment {
            comments.push(comment.clone());
        }
        if self.config.timestamp {
            comments.push(format!("Generated: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")));
        }
        comments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringmap_core::{FeatureSpec, MapConfig, Strand};

    fn demo_map() -> GenomeMap {
        let mut map = GenomeMap::new(4000, MapConfig::default()).unwrap().with_title("pSmall");
        let mut spec = FeatureSpec::new(Strand::Direct, 1, 200, 1400);
        spec.label = Some("repA".to_string());
        map.add_feature(spec).unwrap();
        map
    }

    #[test]
    fn test_render_svg_contains_map() {
        let exporter = VectorExporter::new(ExportConfig { timestamp: false, ..Default::default() });
        let (svg, output) = exporter.render_svg(&mut demo_map());
        assert!(svg.contains(">repA</text>"));
        assert!(svg.contains(">pSmall</text>"));
        assert!(svg.contains("<!-- RingMap v"));
        assert!(!svg.contains("Generated:"));
        assert_eq!(output.report.total, 1);
    }

    #[test]
    fn test_export_html_links_labels() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let mut map = demo_map();
        let mut spec = FeatureSpec::new(Strand::Reverse, 1, 2000, 2600);
        spec.label = Some("parB".to_string());
        spec.hyperlink = Some("https://example.org/parB".to_string());
        map.add_feature(spec)?;

        let exporter = VectorExporter::new(ExportConfig { timestamp: false, ..Default::default() });
        let output = exporter.export_svg(dir.path().join("pSmall.svg"), &mut map)?;
        let html = dir.path().join("pSmall.html");
        exporter.export_html(&html, "pSmall.svg", &map, &output)?;

        let page = std::fs::read_to_string(html)?;
        assert!(page.contains("<title>pSmall</title>"));
        assert!(page.contains(r#"src="pSmall.svg""#));
        assert!(page.contains(r#"href="https://example.org/parB""#));
        assert_eq!(page.matches("<area ").count(), 1);
        Ok(())
    }

    #[test]
    fn test_timestamp_comment() {
        let exporter = VectorExporter::new(ExportConfig::default());
        let (svg, _) = exporter.render_svg(&mut demo_map());
        assert!(svg.contains("<!-- Generated: "));
    }
}
