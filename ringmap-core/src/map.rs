//! The map: a sequence, its features packed into slots, legends, and the render pass that
//! draws them.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bounds::LabelBounds;
use crate::canvas::{Canvas, TextAnchor};
use crate::config::{MapConfig, MapSizes};
use crate::context::LayoutContext;
use crate::error::{MapError, MapResult};
use crate::feature::Feature;
use crate::geometry::{Point, Rect};
use crate::label::LabelSide;
use crate::legend::{Legend, LegendItem, LegendPosition};
use crate::placement::{draw_labels, LabelPlacer, PlacementReport};
use crate::ruler::Ruler;
use crate::slot::SlotRegistry;
use crate::text::{ApproxTextMeasure, TextMeasure};
use crate::types::{BasePos, Color, Decoration, LabelMode, Strand};

pub const MAX_SEQUENCE_LENGTH: BasePos = 200_000_000;
const BORDER_THICKNESS: f64 = 2.0;

/// A single-range feature as supplied by callers and table readers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSpec {
    pub strand: Strand,
    /// 1-based slot on the strand.
    pub slot: i64,
    pub start: i64,
    pub stop: i64,
    pub color: Color,
    pub decoration: Decoration,
    pub opacity: f64,
    pub proportion_of_thickness: f64,
    pub radius_adjustment: f64,
    pub label: Option<String>,
    pub mouseover: Option<String>,
    pub hyperlink: Option<String>,
    pub label_mode: LabelMode,
    pub show_shading: bool,
}

impl Default for FeatureSpec {
    fn default() -> Self {
        Self {
            strand: Strand::Direct,
            slot: 1,
            start: 1,
            stop: 1,
            color: Color::BLACK,
            decoration: Decoration::Standard,
            opacity: 1.0,
            proportion_of_thickness: 1.0,
            radius_adjustment: 0.0,
            label: None,
            mouseover: None,
            hyperlink: None,
            label_mode: LabelMode::Show,
            show_shading: true,
        }
    }
}

impl FeatureSpec {
    pub fn new(strand: Strand, slot: i64, start: i64, stop: i64) -> Self {
        Self { strand, slot, start, stop, ..Default::default() }
    }
}

/// Everything a render pass produces besides the drawing itself.
#[derive(Debug, Clone, Default)]
pub struct RenderOutput {
    pub label_bounds: Vec<LabelBounds>,
    pub report: PlacementReport,
}

/// Occupancy of one slot as laid out for the current configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub strand: Strand,
    /// 1-based position on the strand.
    pub number: usize,
    pub features: usize,
    pub thickness: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct GenomeMap {
    sequence_length: BasePos,
    pub title: Option<String>,
    config: MapConfig,
    registry: SlotRegistry,
    legends: Vec<Legend>,
}

impl GenomeMap {
    pub fn new(sequence_length: i64, config: MapConfig) -> MapResult<Self> {
        if sequence_length < 1 || sequence_length > MAX_SEQUENCE_LENGTH as i64 {
            return Err(MapError::sequence_length(sequence_length, MAX_SEQUENCE_LENGTH));
        }
        Ok(Self {
            sequence_length: sequence_length as BasePos,
            title: None,
            config: config.validated(),
            registry: SlotRegistry::new(),
            legends: Vec::new(),
        })
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sequence_length(&self) -> BasePos {
        self.sequence_length
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn registry(&self) -> &SlotRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SlotRegistry {
        &mut self.registry
    }

    pub fn legends(&self) -> &[Legend] {
        &self.legends
    }

    pub fn add_legend(&mut self, legend: Legend) {
        self.legends.push(legend);
    }

    /// Canvas size after clamping, in pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        let sizes = self.config.scaled_for(self.registry.slot_count());
        (sizes.width, sizes.height)
    }

    /// Validate and place a single-range feature. Returns the 1-based slot that took it.
    pub fn add_feature(&mut self, spec: FeatureSpec) -> MapResult<usize> {
        let length = self.sequence_length;
        let in_range = |v: i64| v >= 1 && v <= length as i64;
        if !in_range(spec.start) || !in_range(spec.stop) {
            return Err(MapError::feature_range(spec.start, spec.stop, length));
        }

        let mut feature = Feature::new();
        feature.color = spec.color;
        feature.decoration = spec.decoration;
        feature.label_mode = spec.label_mode;
        feature.show_shading = spec.show_shading;
        feature.set_opacity(spec.opacity);
        feature.set_proportion_of_thickness(spec.proportion_of_thickness);
        feature.set_radius_adjustment(spec.radius_adjustment);
        feature.hyperlink = spec.hyperlink;
        feature.mouseover = spec.mouseover;
        let range = feature.add_range(spec.start as BasePos, spec.stop as BasePos);
        if let Some(label) = spec.label {
            range.with_label(label);
        }
        self.place_feature(spec.strand, spec.slot, feature)
    }

    /// Place a prepared feature in slot `slot` (1-based) of `strand`, spilling into later slots
    /// when it has no room. Returns the 1-based slot that took it.
    pub fn place_feature(&mut self, strand: Strand, slot: i64, feature: Feature) -> MapResult<usize> {
        let max = self.config.slots_per_strand;
        if slot < 1 || slot > max as i64 {
            return Err(MapError::invalid_slot(slot, max));
        }
        if let Some(range) = feature.ranges().iter().find(|r| !r.in_bounds(self.sequence_length)) {
            return Err(MapError::feature_range(range.start as i64, range.stop as i64, self.sequence_length));
        }
        Ok(self.registry.place(strand, (slot - 1) as usize, feature) + 1)
    }

    /// Slot occupancy with the thickness and center radius each slot gets at render time.
    pub fn slot_summary(&self) -> Vec<SlotSummary> {
        let sizes = self.config.scaled_for(self.registry.slot_count());
        let ctx = self.context(&sizes, &ApproxTextMeasure::default());
        self.registry
            .iter()
            .map(|(strand, index, slot)| SlotSummary {
                strand,
                number: index + 1,
                features: slot.len(),
                thickness: slot.thickness(sizes.feature_thickness),
                radius: self.registry.radius(&ctx, strand, index, sizes.feature_thickness),
            })
            .collect()
    }

    fn context(&self, sizes: &MapSizes, measure: &dyn TextMeasure) -> LayoutContext {
        let stack = self.registry.stack(sizes.feature_thickness, sizes.slot_spacing);
        LayoutContext::new(&self.config, sizes, self.sequence_length, self.title.as_deref(), stack, measure)
    }

    /// Draw the whole map onto `canvas`, back to front.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> RenderOutput {
        let sizes = self.config.scaled_for(self.registry.slot_count());
        let mut ctx = self.context(&sizes, canvas.as_measure());
        let zoomed = !ctx.draw_entire_plasmid;
        log::debug!(
            "Rendering {} bp map at {}x{} with {} slots",
            self.sequence_length,
            sizes.width,
            sizes.height,
            self.registry.slot_count()
        );

        if !self.config.draw_legend {
            self.legends.clear();
        }
        for legend in &mut self.legends {
            legend.check_size(ctx.width, ctx.height, canvas.as_measure());
        }

        canvas.fill_rect(ctx.background, ctx.background_color, 1.0);
        canvas.stroke_arc(ctx.center, ctx.backbone_radius, -PI / 2.0, 2.0 * PI, ctx.backbone_thickness, ctx.backbone_color, 1.0);

        let mut label_bounds = Vec::new();
        Ruler::for_context(&ctx).draw(&ctx, canvas, &mut label_bounds);

        self.registry.sort_features_by_start();
        for (strand, index, slot) in self.registry.iter() {
            let mut geometry = self.registry.geometry(&ctx, strand, index, sizes.feature_thickness);
            geometry.show_shading &= self.config.show_shading;
            slot.draw(&ctx, &geometry, canvas);
        }
        let (mut outer, mut inner) = (Vec::new(), Vec::new());
        let labels_on = self.config.global_labels.resolve(zoomed);
        if !labels_on {
            log::debug!("Feature labels are turned off for this view");
        }
        for (_, _, slot) in self.registry.iter().filter(|_| labels_on) {
            for label in slot.label_candidates(&mut ctx, canvas.as_measure()) {
                match label.side() {
                    LabelSide::Outer => outer.push(label),
                    LabelSide::Inner => inner.push(label),
                }
            }
        }

        let mut placer = LabelPlacer::new(&ctx, sizes.quality, sizes.max_labels);
        for legend in &self.legends {
            let shown = !legend.is_empty() && (!zoomed || legend.draw_when_zoomed);
            if shown && !legend.permits_label_clash() {
                placer.block(legend.bounds(ctx.width, ctx.height, canvas.as_measure()));
            }
        }
        let mut placed = placer.place(outer, inner);
        label_bounds.extend(draw_labels(&ctx, canvas, &mut placed));

        for legend in &self.legends {
            legend.draw(canvas, ctx.width, ctx.height, zoomed, ctx.background_color);
        }
        if let Some(warning) = placed.report.warning() {
            log::warn!("{}", warning);
            let mut info = Legend::new(LegendPosition::LowerLeft, ctx.legend_font.clone(), ctx.text_color);
            info.allow_label_clash = true;
            info.push(LegendItem::text_only(warning));
            if info.check_size(ctx.width, ctx.height, canvas.as_measure()) {
                info.draw(canvas, ctx.width, ctx.height, zoomed, ctx.background_color);
            }
        }
        if self.config.show_title {
            draw_title(&ctx, canvas);
        }
        if self.config.show_border {
            let half = 0.5 * BORDER_THICKNESS;
            let bg = ctx.background;
            let frame = Rect::new(bg.x + half, bg.y + half, bg.width - BORDER_THICKNESS, bg.height - BORDER_THICKNESS);
            canvas.stroke_rect(frame, self.config.border_color, BORDER_THICKNESS);
        }

        RenderOutput { label_bounds, report: placed.report }
    }
}

/// Title above the map center and the sequence length below it, whole-map views only.
fn draw_title(ctx: &LayoutContext, canvas: &mut dyn Canvas) {
    if !ctx.draw_entire_plasmid {
        return;
    }
    let x = ctx.center.x;
    if let Some(title) = &ctx.title {
        let m = canvas.measure(title, &ctx.title_font);
        let baseline = Point::new(x, ctx.title_rect.max_y() - 1.5 - m.descent);
        canvas.text(title, baseline, &ctx.title_font, ctx.text_color, TextAnchor::Middle);
    }
    let length = ctx.length_text();
    let m = canvas.measure(&length, &ctx.title_font);
    let baseline = Point::new(x, ctx.length_rect.max_y() - 1.5 - m.descent);
    canvas.text(&length, baseline, &ctx.title_font, ctx.text_color, TextAnchor::Middle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, RecordingCanvas};
    use crate::types::Toggle;

    fn map(length: i64) -> GenomeMap {
        GenomeMap::new(length, MapConfig::default()).unwrap()
    }

    #[test]
    fn test_sequence_length_limits() {
        assert!(GenomeMap::new(0, MapConfig::default()).is_err());
        assert!(GenomeMap::new(200_000_001, MapConfig::default()).is_err());
        assert_eq!(map(200_000_000).sequence_length(), 200_000_000);
    }

    #[test]
    fn test_add_feature_validates_range_and_slot() {
        let mut m = map(5000);
        let err = m.add_feature(FeatureSpec::new(Strand::Direct, 1, 0, 10)).unwrap_err();
        assert!(matches!(err, MapError::FeatureRange { .. }));
        let err = m.add_feature(FeatureSpec::new(Strand::Direct, 1, 10, 5001)).unwrap_err();
        assert!(err.is_feature_error());
        let err = m.add_feature(FeatureSpec::new(Strand::Direct, 7, 10, 20)).unwrap_err();
        assert_eq!(err, MapError::invalid_slot(7, 6));
        assert!(m.add_feature(FeatureSpec::new(Strand::Reverse, 0, 10, 20)).is_err());
        assert_eq!(m.registry().feature_count(), 0);
    }

    #[test]
    fn test_wrapping_feature_is_accepted() {
        let mut m = map(7000);
        assert_eq!(m.add_feature(FeatureSpec::new(Strand::Direct, 1, 6899, 10)).unwrap(), 1);
        assert_eq!(m.add_feature(FeatureSpec::new(Strand::Direct, 1, 5, 8)).unwrap(), 2);
    }

    #[test]
    fn test_slot_summary_orders_direct_first() {
        let mut m = map(5000);
        m.add_feature(FeatureSpec::new(Strand::Reverse, 1, 10, 20)).unwrap();
        m.add_feature(FeatureSpec::new(Strand::Direct, 2, 10, 20)).unwrap();
        let summary = m.slot_summary();
        assert_eq!(summary.len(), 2);
        assert_eq!((summary[0].strand, summary[0].number, summary[0].features), (Strand::Direct, 2, 1));
        assert_eq!((summary[1].strand, summary[1].number, summary[1].features), (Strand::Reverse, 1, 1));
        assert!(summary[1].radius < summary[0].radius);
    }

    #[test]
    fn test_unused_slot_numbers_do_not_shrink_features() {
        let mut high = map(5000);
        high.add_feature(FeatureSpec::new(Strand::Direct, 3, 10, 20)).unwrap();
        let mut low = map(5000);
        low.add_feature(FeatureSpec::new(Strand::Direct, 1, 10, 20)).unwrap();

        let high = high.slot_summary();
        let low = low.slot_summary();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].number, 3);
        // one used slot of twelve: 12 + 11 * 0.083 * 12
        assert!((high[0].thickness - 22.956).abs() < 1e-9, "thickness {}", high[0].thickness);
        assert!((high[0].thickness - low[0].thickness).abs() < 1e-9);
        assert!((high[0].radius - low[0].radius).abs() < 1e-9);
    }

    #[test]
    fn test_render_draws_background_first_and_title_last() {
        let mut m = map(5000).with_title("pDemo");
        let mut spec = FeatureSpec::new(Strand::Direct, 1, 100, 900);
        spec.label = Some("bla".to_string());
        m.add_feature(spec).unwrap();

        let mut canvas = RecordingCanvas::new();
        let output = m.render(&mut canvas);
        assert!(matches!(canvas.ops.first(), Some(DrawOp::FillRect { .. })));
        let texts: Vec<_> = canvas.texts().collect();
        assert!(texts.contains(&"bla"));
        assert_eq!(texts[texts.len() - 2..], ["pDemo", "5,000 bp"]);
        assert_eq!(output.report.total, 1);
        assert_eq!(output.report.dropped, 0);
    }

    #[test]
    fn test_linked_labels_produce_bounds() {
        let mut m = map(5000);
        let mut spec = FeatureSpec::new(Strand::Direct, 1, 100, 900);
        spec.label = Some("lacZ".to_string());
        spec.hyperlink = Some("https://example.org/lacZ".to_string());
        m.add_feature(spec).unwrap();
        let output = m.render(&mut RecordingCanvas::new());
        let feature_bounds: Vec<_> = output
            .label_bounds
            .iter()
            .filter(|b| b.kind == crate::bounds::BoundsKind::Feature)
            .collect();
        assert_eq!(feature_bounds.len(), 1);
        assert_eq!(feature_bounds[0].label, "lacZ");
        assert_eq!(feature_bounds[0].hyperlink.as_deref(), Some("https://example.org/lacZ"));
    }

    fn labelled_map(config: MapConfig) -> GenomeMap {
        let mut m = GenomeMap::new(5000, config).unwrap();
        let mut spec = FeatureSpec::new(Strand::Direct, 1, 100, 900);
        spec.label = Some("lacZ".to_string());
        spec.hyperlink = Some("https://example.org/lacZ".to_string());
        m.add_feature(spec).unwrap();
        m
    }

    #[test]
    fn test_global_labels_switch() {
        let mut hidden = labelled_map(MapConfig { global_labels: Toggle::Hide, ..MapConfig::default() });
        let mut canvas = RecordingCanvas::new();
        let output = hidden.render(&mut canvas);
        assert!(!canvas.texts().any(|t| t == "lacZ"));
        assert_eq!(output.report.total, 0);
        assert!(output.label_bounds.iter().all(|b| b.kind != crate::bounds::BoundsKind::Feature));

        // auto labels only zoomed views
        let mut whole = labelled_map(MapConfig { global_labels: Toggle::Auto, ..MapConfig::default() });
        let mut canvas = RecordingCanvas::new();
        whole.render(&mut canvas);
        assert!(!canvas.texts().any(|t| t == "lacZ"));

        let config = MapConfig { global_labels: Toggle::Auto, zoom: 2.0, zoom_center: Some(500), ..MapConfig::default() };
        let mut zoomed = labelled_map(config);
        let mut canvas = RecordingCanvas::new();
        let output = zoomed.render(&mut canvas);
        assert_eq!(output.report.total, 1);
        assert!(canvas.texts().any(|t| t.starts_with("lacZ")));
    }

    #[test]
    fn test_border_is_drawn_inside_the_canvas() {
        let mut canvas = RecordingCanvas::new();
        labelled_map(MapConfig::default()).render(&mut canvas);
        assert!(!canvas.ops.iter().any(|op| matches!(op, DrawOp::StrokeRect { .. })));

        let config = MapConfig { show_border: true, border_color: Color::rgb(255, 0, 0), ..MapConfig::default() };
        let mut canvas = RecordingCanvas::new();
        labelled_map(config).render(&mut canvas);
        let frames: Vec<_> = canvas
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect { rect, color, width } => Some((*rect, *color, *width)),
                _ => None,
            })
            .collect();
        assert_eq!(frames, vec![(Rect::new(1.0, 1.0, 898.0, 898.0), Color::rgb(255, 0, 0), 2.0)]);
    }

    #[test]
    fn test_legends_are_skipped_when_disabled() {
        let config = MapConfig { draw_legend: false, ..MapConfig::default() };
        let mut m = GenomeMap::new(5000, config).unwrap();
        let mut legend = Legend::new(LegendPosition::UpperRight, crate::text::Font::sans(13.0), Color::BLACK);
        legend.push(LegendItem::with_swatch("Promoter", Color::rgb(0, 128, 0)));
        m.add_legend(legend);
        let mut canvas = RecordingCanvas::new();
        m.render(&mut canvas);
        assert!(!canvas.texts().any(|t| t == "Promoter"));
    }
}
