//! Map configuration and size scaling
//!
//! Every size is derived from a 900×900 reference map and scaled by the ratio of the requested
//! map's smallest side to 900, then clamped to a fixed range. Out-of-range user input is clamped
//! with a warning and never rejected.

use serde::{Deserialize, Serialize};

use crate::legend::LegendPosition;
use crate::text::Font;
use crate::types::{Color, Toggle};

pub const DEFAULT_MAP_SIDE: f64 = 900.0;
pub const MIN_MAP_SIDE: u32 = 500;
pub const MAX_MAP_SIDE: u32 = 30_000;
pub const LARGE_MAP_SIDE: u32 = 2000;
pub const MAX_ZOOM: f64 = 30.0;
/// Feature thickness gained per unused slot, as a fraction of the scaled thickness (about 1/12).
pub const SLOT_GROWTH: f64 = 0.083;

/// A scaled size with its clamping range.
#[derive(Debug, Clone, Copy)]
struct SizeRule {
    base: f64,
    min: f64,
    max: f64,
}

const FEATURE_THICKNESS: SizeRule = SizeRule { base: 12.0, min: 0.5, max: 80.0 };
const BACKBONE_THICKNESS: SizeRule = SizeRule { base: 4.0, min: 0.1, max: 5.0 };
const SLOT_SPACING: SizeRule = SizeRule { base: 2.0, min: 0.1, max: 5.0 };
const TICK_LENGTH: SizeRule = SizeRule { base: 6.0, min: 1.0, max: 6.0 };
const TICK_THICKNESS: SizeRule = SizeRule { base: 2.0, min: 0.5, max: 2.0 };
const LABEL_LINE_LENGTH: SizeRule = SizeRule { base: 50.0, min: 2.0, max: 80.0 };
const LABEL_LINE_THICKNESS: SizeRule = SizeRule { base: 1.0, min: 0.5, max: 1.0 };
const ARROWHEAD_LENGTH: SizeRule = SizeRule { base: 5.0, min: 0.5, max: 18.0 };
const LABEL_FONT: SizeRule = SizeRule { base: 10.0, min: 1.0, max: 10.0 };
const TITLE_FONT: SizeRule = SizeRule { base: 15.0, min: 1.0, max: 100.0 };
const LEGEND_FONT: SizeRule = SizeRule { base: 13.0, min: 1.0, max: 100.0 };
const RULER_FONT: SizeRule = SizeRule { base: 8.0, min: 1.0, max: 8.0 };
const MAX_LABELS: SizeRule = SizeRule { base: 5000.0, min: 10.0, max: 50_000.0 };

impl SizeRule {
    fn scale(self, factor: f64) -> f64 {
        (self.base * factor).clamp(self.min, self.max)
    }

    fn scale_rounded(self, factor: f64) -> f64 {
        (self.base * factor + 0.5).floor().clamp(self.min, self.max)
    }
}

/// User-facing configuration, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map width in pixels
    pub width: u32,

    /// Map height in pixels
    pub height: u32,

    /// Added to the size ratio for feature, backbone, arrowhead and label font sizes
    pub size_adjustment: f64,

    /// Screen angle of base 1 in degrees, measured counter-clockwise from 3 o'clock
    pub origin_degrees: f64,

    /// Number of slot positions a requested slot number may address, per strand
    pub slots_per_strand: usize,

    /// Total slot capacity used by the feature thickness growth rule
    pub max_slots: usize,

    /// Draw reverse-strand labels inside the backbone; unset derives it from the map size
    pub inner_labels: Option<Toggle>,

    /// Append feature coordinates to label text
    pub feature_positions: Toggle,

    /// Feature labels for the whole map; `auto` labels zoomed views only
    pub global_labels: Toggle,

    /// Label placement effort, 1 (fast) to 10 (thorough)
    pub label_quality: u8,

    /// Move inner labels that cannot be placed to the outer ring
    pub move_inner_labels_to_outer: bool,

    pub draw_ticks: bool,
    pub show_shading: bool,
    pub shading_proportion: f64,

    /// Center features too short to see on their true position
    pub shift_small_features: bool,

    /// Minimum drawn arc length in pixels
    pub minimum_feature_length: f64,

    pub colored_label_background: bool,
    pub show_title: bool,

    /// Frame the canvas with a two pixel border
    pub show_border: bool,
    pub border_color: Color,

    pub draw_legend: bool,
    pub legend_position: LegendPosition,
    pub legend_allow_label_clash: bool,

    pub zoom: f64,
    pub zoom_center: Option<u32>,

    pub background_color: Color,
    pub backbone_color: Color,
    pub tick_color: Color,
    pub text_color: Color,

    pub label_font_size: Option<f64>,
    pub legend_font_size: Option<f64>,
    pub ruler_font_size: Option<f64>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 900,
            size_adjustment: 0.0,
            origin_degrees: 90.0,
            slots_per_strand: 6,
            max_slots: 12,
            inner_labels: None,
            feature_positions: Toggle::Hide,
            global_labels: Toggle::Show,
            label_quality: 8,
            move_inner_labels_to_outer: true,
            draw_ticks: true,
            show_shading: true,
            shading_proportion: 0.4,
            shift_small_features: true,
            minimum_feature_length: 1.0,
            colored_label_background: false,
            show_title: true,
            show_border: false,
            border_color: Color::BLACK,
            draw_legend: true,
            legend_position: LegendPosition::UpperRight,
            legend_allow_label_clash: false,
            zoom: 1.0,
            zoom_center: None,
            background_color: Color::WHITE,
            backbone_color: Color::GRAY,
            tick_color: Color::BLACK,
            text_color: Color::BLACK,
            label_font_size: None,
            legend_font_size: None,
            ruler_font_size: None,
        }
    }
}

/// Effort parameters of the label placement passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelQuality {
    pub spread_iterations: usize,
    pub clash_span: usize,
    pub radius_shift: u32,
}

impl LabelQuality {
    pub fn from_level(level: u8) -> Self {
        let (spread_iterations, clash_span, radius_shift) = match level.clamp(1, 10) {
            1 => (10, 10, 20),
            2 => (20, 40, 15),
            3 => (30, 60, 14),
            4 => (40, 80, 12),
            5 => (50, 100, 10),
            6 => (60, 120, 8),
            7 => (65, 130, 6),
            8 => (70, 140, 4),
            9 => (200, 150, 2),
            _ => (500, 1000, 1),
        };
        Self { spread_iterations, clash_span, radius_shift }
    }
}

/// Concrete sizes for one render, produced by [`MapConfig::scaled_for`].
#[derive(Debug, Clone, PartialEq)]
pub struct MapSizes {
    pub width: u32,
    pub height: u32,
    pub feature_thickness: f64,
    pub backbone_thickness: f64,
    pub slot_spacing: f64,
    pub tick_length: f64,
    pub tick_thickness: f64,
    pub label_line_length: f64,
    pub label_line_thickness: f64,
    pub arrowhead_length: f64,
    pub max_labels: usize,
    pub label_font: Font,
    pub title_font: Font,
    pub legend_font: Font,
    pub ruler_font: Font,
    pub inner_labels: Toggle,
    pub quality: LabelQuality,
}

impl MapConfig {
    /// Copy with every out-of-range value pulled into range.
    pub fn validated(&self) -> MapConfig {
        let mut config = self.clone();
        config.width = clamp_warn("width", self.width, MIN_MAP_SIDE, MAX_MAP_SIDE);
        config.height = clamp_warn("height", self.height, MIN_MAP_SIDE, MAX_MAP_SIDE);
        config.label_quality = clamp_warn("label_quality", self.label_quality, 1, 10);
        config.zoom = clamp_warn("zoom", self.zoom, 1.0, MAX_ZOOM);
        config.shading_proportion = clamp_warn("shading_proportion", self.shading_proportion, 0.0, 1.0);
        config.minimum_feature_length = clamp_warn("minimum_feature_length", self.minimum_feature_length, 0.0, 100.0);
        config.slots_per_strand = clamp_warn("slots_per_strand", self.slots_per_strand, 1, 64);
        config.max_slots = clamp_warn("max_slots", self.max_slots, 1, 128);
        config
    }

    pub fn size_ratio(&self) -> f64 {
        self.width.min(self.height) as f64 / DEFAULT_MAP_SIDE
    }

    /// Scale every size for this map. `used_slots` is the number of occupied slots; each unused
    /// slot out of `max_slots` thickens the features.
    pub fn scaled_for(&self, used_slots: usize) -> MapSizes {
        let config = self.validated();
        let ratio = config.size_ratio();
        let adjusted = ratio + config.size_adjustment;

        let mut feature_thickness = FEATURE_THICKNESS.scale(adjusted);
        let empty_slots = config.max_slots.saturating_sub(used_slots);
        feature_thickness += empty_slots as f64 * SLOT_GROWTH * feature_thickness;
        let feature_thickness = feature_thickness.clamp(FEATURE_THICKNESS.min, FEATURE_THICKNESS.max);

        let font_size = |user: Option<f64>, rule: SizeRule, factor: f64| match user {
            Some(size) => clamp_warn("font size", size, 1.0, 200.0),
            None => rule.scale_rounded(factor),
        };

        let smallest = config.width.min(config.height);
        let inner_labels = config.inner_labels.unwrap_or(if smallest >= LARGE_MAP_SIDE {
            Toggle::Show
        } else {
            Toggle::Auto
        });

        MapSizes {
            width: config.width,
            height: config.height,
            feature_thickness,
            backbone_thickness: BACKBONE_THICKNESS.scale(adjusted),
            slot_spacing: SLOT_SPACING.scale(ratio),
            tick_length: TICK_LENGTH.scale(ratio),
            tick_thickness: TICK_THICKNESS.scale(ratio),
            label_line_length: LABEL_LINE_LENGTH.scale(ratio),
            label_line_thickness: LABEL_LINE_THICKNESS.scale(ratio),
            arrowhead_length: ARROWHEAD_LENGTH.scale(adjusted),
            max_labels: MAX_LABELS.scale_rounded(ratio) as usize,
            label_font: Font::sans(font_size(config.label_font_size, LABEL_FONT, adjusted)),
            title_font: Font::sans(TITLE_FONT.scale_rounded(ratio)),
            legend_font: Font::sans(font_size(config.legend_font_size, LEGEND_FONT, ratio)),
            ruler_font: Font::sans(font_size(config.ruler_font_size, RULER_FONT, ratio)),
            inner_labels,
            quality: LabelQuality::from_level(config.label_quality),
        }
    }
}

fn clamp_warn<T: PartialOrd + Copy + std::fmt::Display>(name: &str, value: T, min: T, max: T) -> T {
    if value < min {
        log::warn!("{} {} is below the minimum, using {}", name, value, min);
        min
    } else if value > max {
        log::warn!("{} {} is above the maximum, using {}", name, value, max);
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_map_sizes() {
        let sizes = MapConfig::default().scaled_for(12);
        assert_eq!(sizes.width, 900);
        assert!((sizes.feature_thickness - 12.0).abs() < 1e-9);
        assert!((sizes.backbone_thickness - 4.0).abs() < 1e-9);
        assert!((sizes.label_line_length - 50.0).abs() < 1e-9);
        assert_eq!(sizes.max_labels, 5000);
        assert_eq!(sizes.label_font.size, 10.0);
        assert_eq!(sizes.title_font.size, 15.0);
        assert_eq!(sizes.inner_labels, Toggle::Auto);
    }

    #[test]
    fn test_empty_slots_thicken_features() {
        // two of twelve slots used: 12 + 10 * 0.083 * 12
        let sizes = MapConfig::default().scaled_for(2);
        assert!((sizes.feature_thickness - (12.0 + 10.0 * 0.083 * 12.0)).abs() < 1e-9);
    }

    #[test]
    fn test_growth_is_reclamped() {
        let config = MapConfig { width: 30_000, height: 30_000, ..MapConfig::default() };
        let sizes = config.scaled_for(0);
        assert_eq!(sizes.feature_thickness, 80.0);
        assert_eq!(sizes.max_labels, 50_000);
        assert_eq!(sizes.inner_labels, Toggle::Show);
        assert_eq!(sizes.label_font.size, 10.0);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let config = MapConfig { width: 100, height: 40_000, label_quality: 42, zoom: 0.1, ..MapConfig::default() };
        let valid = config.validated();
        assert_eq!(valid.width, MIN_MAP_SIDE);
        assert_eq!(valid.height, MAX_MAP_SIDE);
        assert_eq!(valid.label_quality, 10);
        assert_eq!(valid.zoom, 1.0);
        let sizes = config.scaled_for(12);
        assert_eq!(sizes.max_labels, (5000.0f64 * 500.0 / 900.0 + 0.5).floor() as usize);
    }

    #[test]
    fn test_quality_table() {
        assert_eq!(LabelQuality::from_level(5), LabelQuality { spread_iterations: 50, clash_span: 100, radius_shift: 10 });
        assert_eq!(LabelQuality::from_level(0), LabelQuality::from_level(1));
        assert_eq!(LabelQuality::from_level(200).radius_shift, 1);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: MapConfig = serde_json::from_str(r#"{"width": 1200, "inner_labels": "show"}"#).unwrap();
        assert_eq!(config.width, 1200);
        assert_eq!(config.height, 900);
        assert_eq!(config.inner_labels, Some(Toggle::Show));
    }
}
