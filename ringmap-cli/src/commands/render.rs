//! Render command implementation - feature tables to SVG maps

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use ringmap_core::{LegendPosition, MapConfig, Toggle};
use ringmap_svg::{ExportConfig, VectorExporter};

use crate::config::Config;
use crate::error::{CliError, CliResult};

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
    pub legend_position: Option<LegendPosition>,
    pub quality: Option<u8>,
    pub inner_labels: Option<Toggle>,
    pub positions: Option<Toggle>,
    pub labels: Option<Toggle>,
    pub border: bool,
    pub zoom: Option<f64>,
    pub zoom_center: Option<u32>,
    pub bounds_json: bool,
    pub html: bool,
    pub deterministic: bool,
}

impl RenderOptions {
    pub fn apply(&self, map: &MapConfig) -> MapConfig {
        let mut map = map.clone();
        if let Some(width) = self.width {
            map.width = width;
        }
        if let Some(height) = self.height {
            map.height = height;
        }
        if let Some(position) = self.legend_position {
            map.legend_position = position;
        }
        if let Some(quality) = self.quality {
            map.label_quality = quality;
        }
        if let Some(inner) = self.inner_labels {
            map.inner_labels = Some(inner);
        }
        if let Some(positions) = self.positions {
            map.feature_positions = positions;
        }
        if let Some(labels) = self.labels {
            map.global_labels = labels;
        }
        if self.border {
            map.show_border = true;
        }
        if let Some(zoom) = self.zoom {
            map.zoom = zoom;
        }
        if let Some(center) = self.zoom_center {
            map.zoom_center = Some(center);
        }
        map
    }
}

/// What one input produced.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub input: PathBuf,
    pub svg: PathBuf,
    pub bounds: Option<PathBuf>,
    pub html: Option<PathBuf>,
    pub labels_shown: usize,
    pub labels_dropped: usize,
    pub skipped_features: usize,
}

pub fn execute(config: &Config, inputs: Vec<PathBuf>, output: PathBuf, options: RenderOptions) -> CliResult<Vec<RenderedFile>> {
    if inputs.is_empty() {
        return Err(CliError::validation("No input tables given"));
    }
    let targets = output_paths(&inputs, &output)?;
    let map_config = options.apply(&config.map);
    let deterministic = options.deterministic || config.general.deterministic;
    let sidecars = Sidecars {
        bounds_json: options.bounds_json || config.export.bounds_json,
        html: options.html || config.export.html,
    };

    log::info!("Rendering {} table(s) into {}", inputs.len(), output.display());
    if deterministic {
        log::info!("Deterministic mode: timestamps disabled");
    }

    let results: Vec<CliResult<RenderedFile>> = inputs
        .par_iter()
        .zip(targets.par_iter())
        .map(|(input, svg)| {
            let export = ExportConfig {
                font_family: config.export.font_family.clone(),
                provenance_comment: Some(provenance(input)),
                timestamp: !deterministic,
            };
            render_one(input, svg, &map_config, export, options.title.as_deref(), sidecars)
        })
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(file) => {
                log::info!(
                    "{} -> {} ({} labels, {} dropped, {} features skipped)",
                    file.input.display(),
                    file.svg.display(),
                    file.labels_shown,
                    file.labels_dropped,
                    file.skipped_features
                );
                rendered.push(file);
            }
            Err(err) => {
                log::error!("{}", err);
                first_error.get_or_insert(err);
            }
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(rendered),
    }
}

/// Extra files written next to each SVG.
#[derive(Debug, Clone, Copy)]
struct Sidecars {
    bounds_json: bool,
    html: bool,
}

fn render_one(
    input: &Path,
    svg: &Path,
    map_config: &MapConfig,
    export: ExportConfig,
    title: Option<&str>,
    sidecars: Sidecars,
) -> CliResult<RenderedFile> {
    let import = super::load_table(input, map_config.clone())?;
    let mut map = import.map;
    if let Some(title) = title {
        map.title = Some(title.to_string());
    }

    let exporter = VectorExporter::new(export);
    let output = exporter
        .export_svg(svg, &mut map)
        .map_err(|e| CliError::rendering(format!("{:#}", e)))?;

    let bounds = if sidecars.bounds_json {
        let path = bounds_path(svg);
        exporter.export_bounds_json(&path, &output)?;
        Some(path)
    } else {
        None
    };
    let html = if sidecars.html {
        let path = svg.with_extension("html");
        let image = svg.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        exporter.export_html(&path, &image, &map, &output)?;
        Some(path)
    } else {
        None
    };

    Ok(RenderedFile {
        input: input.to_path_buf(),
        svg: svg.to_path_buf(),
        bounds,
        html,
        labels_shown: output.report.total - output.report.dropped,
        labels_dropped: output.report.dropped,
        skipped_features: import.skipped.len(),
    })
}

/// A single input may name its SVG file directly; otherwise `output` is a directory that
/// receives `<stem>.svg` for each input.
fn output_paths(inputs: &[PathBuf], output: &Path) -> CliResult<Vec<PathBuf>> {
    let is_svg_file = output.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
    if is_svg_file {
        if inputs.len() > 1 {
            return Err(CliError::validation(format!(
                "{} names a single SVG file but {} inputs were given; pass a directory instead",
                output.display(),
                inputs.len()
            )));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        return Ok(vec![output.to_path_buf()]);
    }

    std::fs::create_dir_all(output)
        .map_err(|e| CliError::io(format!("Failed to create output directory {}: {}", output.display(), e)))?;
    let mut targets: Vec<PathBuf> = Vec::with_capacity(inputs.len());
    for input in inputs {
        let stem = input
            .file_stem()
            .ok_or_else(|| CliError::validation(format!("{} has no file name", input.display())))?;
        let target = output.join(stem).with_extension("svg");
        if targets.contains(&target) {
            return Err(CliError::validation(format!(
                "Two inputs would both be written to {}",
                target.display()
            )));
        }
        targets.push(target);
    }
    Ok(targets)
}

fn bounds_path(svg: &Path) -> PathBuf {
    svg.with_extension("bounds.json")
}

fn provenance(input: &Path) -> String {
    let name = input.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    format!("Source: {}", name)
}
