//! Read-only map geometry shared by one render pass, plus the few values the label engine
//! derives while labels are created.

use std::f64::consts::PI;

use crate::config::{MapConfig, MapSizes};
use crate::geometry::{Point, Rect};
use crate::text::{Font, TextMeasure};
use crate::types::{BasePos, Color};

/// Zoom multipliers below this draw the whole circle.
pub const ZOOM_SHIFT: f64 = 1.01;
const MIN_BACKBONE_RADIUS: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct LayoutContext {
    pub sequence_length: BasePos,
    pub width: f64,
    pub height: f64,
    /// Circle center in canvas coordinates; moves off the canvas center when zoomed.
    pub center: Point,
    pub background: Rect,
    pub origin_degrees: f64,
    pub zoom: f64,
    pub draw_entire_plasmid: bool,

    pub backbone_radius: f64,
    pub backbone_thickness: f64,
    pub slot_spacing: f64,
    pub first_outer_radius: f64,
    pub first_inner_radius: f64,
    pub last_outer_radius: f64,
    pub last_inner_radius: f64,

    pub draw_ticks: bool,
    pub tick_length: f64,
    pub tick_thickness: f64,
    pub label_line_length: f64,
    pub label_line_thickness: f64,
    pub arrowhead_length: f64,
    pub minimum_feature_length: f64,
    pub shift_small_features: bool,
    pub shading_proportion: f64,

    pub inner_labels: bool,
    pub feature_positions: bool,
    pub move_inner_labels_to_outer: bool,
    pub colored_label_background: bool,

    pub label_font: Font,
    pub title_font: Font,
    pub legend_font: Font,
    pub ruler_font: Font,
    pub background_color: Color,
    pub backbone_color: Color,
    pub tick_color: Color,
    pub text_color: Color,

    pub title: Option<String>,
    pub title_rect: Rect,
    pub length_rect: Rect,

    smallest_dimension: f64,
    radius_shift_amount: f64,
}

/// Height of the slot stacks on either side of the backbone, each slot counting
/// `thickness + spacing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotStack {
    pub outer: f64,
    pub inner: f64,
}

impl LayoutContext {
    pub fn new(
        config: &MapConfig,
        sizes: &MapSizes,
        sequence_length: BasePos,
        title: Option<&str>,
        stack: SlotStack,
        measure: &dyn TextMeasure,
    ) -> Self {
        let config = config.validated();
        let width = sizes.width as f64;
        let height = sizes.height as f64;
        let smallest = width.min(height);

        let mut backbone_radius = 0.5 * smallest / 1.9;
        let max_radius = 0.80 * smallest / 2.0;
        if backbone_radius > max_radius {
            log::warn!("Backbone radius {:.1} is too large for the map, using {:.1}", backbone_radius, max_radius);
            backbone_radius = max_radius;
        }
        if backbone_radius < MIN_BACKBONE_RADIUS {
            log::warn!("Backbone radius {:.1} is too small, using {:.1}", backbone_radius, MIN_BACKBONE_RADIUS);
            backbone_radius = MIN_BACKBONE_RADIUS;
        }
        backbone_radius *= config.zoom;

        let first_outer_radius = backbone_radius + 0.5 * sizes.backbone_thickness + sizes.slot_spacing;
        let first_inner_radius = backbone_radius - 0.5 * sizes.backbone_thickness - sizes.slot_spacing;

        let canvas_center = Point::new(width / 2.0, height / 2.0);
        let draw_entire_plasmid = config.zoom < ZOOM_SHIFT;
        let mut ctx = Self {
            sequence_length,
            width,
            height,
            center: canvas_center,
            background: Rect::new(0.0, 0.0, width, height),
            origin_degrees: config.origin_degrees,
            zoom: config.zoom,
            draw_entire_plasmid,
            backbone_radius,
            backbone_thickness: sizes.backbone_thickness,
            slot_spacing: sizes.slot_spacing,
            first_outer_radius,
            first_inner_radius,
            last_outer_radius: first_outer_radius + stack.outer,
            last_inner_radius: first_inner_radius - stack.inner,
            draw_ticks: config.draw_ticks,
            tick_length: sizes.tick_length,
            tick_thickness: sizes.tick_thickness,
            label_line_length: sizes.label_line_length,
            label_line_thickness: sizes.label_line_thickness,
            arrowhead_length: sizes.arrowhead_length,
            minimum_feature_length: config.minimum_feature_length,
            shift_small_features: config.shift_small_features,
            shading_proportion: config.shading_proportion,
            inner_labels: sizes.inner_labels.resolve(!draw_entire_plasmid),
            feature_positions: config.feature_positions.resolve(!draw_entire_plasmid),
            move_inner_labels_to_outer: config.move_inner_labels_to_outer,
            colored_label_background: config.colored_label_background,
            label_font: sizes.label_font.clone(),
            title_font: sizes.title_font.clone(),
            legend_font: sizes.legend_font.clone(),
            ruler_font: sizes.ruler_font.clone(),
            background_color: config.background_color,
            backbone_color: config.backbone_color,
            tick_color: config.tick_color,
            text_color: config.text_color,
            title: title.map(str::to_string).filter(|t| !t.trim().is_empty() && config.show_title),
            title_rect: Rect::default(),
            length_rect: Rect::default(),
            smallest_dimension: f64::INFINITY,
            radius_shift_amount: sizes.quality.radius_shift as f64,
        };

        if !draw_entire_plasmid {
            // put the zoom center base on the canvas center
            let base = config.zoom_center.unwrap_or(1).clamp(1, sequence_length.max(1));
            let offset = Point::polar(Point::default(), backbone_radius, ctx.radians(base as f64));
            ctx.center = Point::new(canvas_center.x - offset.x, canvas_center.y - offset.y);
        }
        ctx.place_title(measure);
        ctx
    }

    /// Screen angle of a base; base 1 sits at the origin angle and bases advance clockwise.
    pub fn radians(&self, base: f64) -> f64 {
        base * 2.0 * PI / self.sequence_length as f64 - self.origin_degrees * PI / 180.0
    }

    /// Degrees of arc from the origin to `base`.
    pub fn degrees(&self, base: f64) -> f64 {
        base / self.sequence_length as f64 * 360.0
    }

    /// Sequence position nearest to a screen angle.
    pub fn base_at(&self, radians: f64) -> BasePos {
        let turn = (radians + self.origin_degrees * PI / 180.0).rem_euclid(2.0 * PI) / (2.0 * PI);
        ((turn * self.sequence_length as f64).round() as BasePos).clamp(1, self.sequence_length.max(1))
    }

    pub fn point_at(&self, radius: f64, radians: f64) -> Point {
        Point::polar(self.center, radius, radians)
    }

    /// Radius where outer label connectors start: past the outermost slot and its ticks.
    pub fn outer_label_start(&self) -> f64 {
        let ticks = if self.draw_ticks { self.tick_length + self.tick_thickness } else { 0.0 };
        self.last_outer_radius + ticks + self.slot_spacing
    }

    pub fn inner_label_start(&self) -> f64 {
        let ticks = if self.draw_ticks { self.tick_length + self.tick_thickness } else { 0.0 };
        self.last_inner_radius - ticks - self.slot_spacing
    }

    pub fn length_text(&self) -> String {
        format!("{} bp", format_thousands(self.sequence_length as u64))
    }

    /// Title above the map center and the sequence length below it.
    fn place_title(&mut self, measure: &dyn TextMeasure) {
        let c = self.center;
        if !self.draw_entire_plasmid {
            return;
        }
        match &self.title {
            Some(title) => {
                let m = measure.measure(title, &self.title_font);
                self.title_rect = Rect::new(c.x - m.width / 2.0 - 1.5, c.y - m.height - 1.5, m.width + 3.0, m.height + 3.0);
            }
            None => self.title_rect = Rect::new(c.x - 5.0, c.y - 5.0, 10.0, 10.0),
        }
        let m = measure.measure(&self.length_text(), &self.title_font);
        self.length_rect = Rect::new(c.x - m.width / 2.0 - 1.5, c.y - 1.5, m.width + 3.0, m.height + 3.0);
    }

    /// Track the smallest label side seen so far.
    pub fn note_label_size(&mut self, width: f64, height: f64) {
        self.smallest_dimension = self.smallest_dimension.min(width.min(height));
    }

    pub fn smallest_dimension(&self) -> f64 {
        if self.smallest_dimension.is_finite() {
            self.smallest_dimension
        } else {
            self.label_font.size
        }
    }

    /// Angular step of a label shift: half the smallest label side, as an angle at the outermost
    /// feature radius.
    pub fn radians_shift_amount(&self) -> f64 {
        (self.smallest_dimension() / 2.0) / self.last_outer_radius.max(1.0)
    }

    pub fn radius_shift_amount(&self) -> f64 {
        self.radius_shift_amount
    }

    /// Bases covered by `minimum_feature_length` pixels at `radius`.
    pub fn bases_per_min_feature(&self, radius: f64) -> f64 {
        self.minimum_feature_length * self.sequence_length as f64 / (2.0 * PI * radius.max(1.0))
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::ApproxTextMeasure;

    fn context(config: &MapConfig, length: BasePos) -> LayoutContext {
        let sizes = config.scaled_for(2);
        let stack = SlotStack { outer: sizes.feature_thickness + sizes.slot_spacing, inner: 0.0 };
        LayoutContext::new(config, &sizes, length, Some("pUC19"), stack, &ApproxTextMeasure::default())
    }

    #[test]
    fn test_ring_radii() {
        let ctx = context(&MapConfig::default(), 5000);
        assert!((ctx.backbone_radius - 0.5 * 900.0 / 1.9).abs() < 1e-9);
        assert!((ctx.first_outer_radius - (ctx.backbone_radius + 2.0 + 2.0)).abs() < 1e-9);
        assert!((ctx.first_inner_radius - (ctx.backbone_radius - 2.0 - 2.0)).abs() < 1e-9);
        assert!(ctx.last_outer_radius > ctx.first_outer_radius);
        assert_eq!(ctx.last_inner_radius, ctx.first_inner_radius);
        assert!(ctx.draw_entire_plasmid);
    }

    #[test]
    fn test_origin_at_top() {
        let ctx = context(&MapConfig::default(), 1000);
        assert!((ctx.radians(0.0) + PI / 2.0).abs() < 1e-12);
        assert!(ctx.radians(250.0).abs() < 1e-12);
        assert_eq!(ctx.base_at(0.0), 250);
        assert!((ctx.degrees(500.0) - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_title_and_length_boxes_straddle_center() {
        let ctx = context(&MapConfig::default(), 5000);
        assert!(ctx.title_rect.max_y() > ctx.center.y - 2.0 && ctx.title_rect.y < ctx.center.y);
        assert!(ctx.length_rect.y < ctx.center.y && ctx.length_rect.max_y() > ctx.center.y);
        assert_eq!(ctx.length_text(), "5,000 bp");
    }

    #[test]
    fn test_zoom_moves_center() {
        let config = MapConfig { zoom: 10.0, zoom_center: Some(250), ..MapConfig::default() };
        let ctx = context(&config, 1000);
        assert!(!ctx.draw_entire_plasmid);
        // base 250 sits at 3 o'clock, so the circle center moves left by one radius
        assert!((ctx.center.x - (450.0 - ctx.backbone_radius)).abs() < 1e-6);
        assert!((ctx.center.y - 450.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_center_base_lands_on_canvas_center() {
        let config = MapConfig { zoom: 4.0, zoom_center: Some(500), ..MapConfig::default() };
        let ctx = context(&config, 1000);
        assert!((ctx.center.y - (450.0 - ctx.backbone_radius)).abs() < 1e-6);
        let spot = Point::polar(ctx.center, ctx.backbone_radius, ctx.radians(500.0));
        assert!((spot.x - 450.0).abs() < 1e-6);
        assert!((spot.y - 450.0).abs() < 1e-6);

        // a center past the end is clamped to the last base
        let clamped = context(&MapConfig { zoom_center: Some(5000), ..config }, 1000);
        let spot = Point::polar(clamped.center, clamped.backbone_radius, clamped.radians(1000.0));
        assert!((spot.x - 450.0).abs() < 1e-6);
        assert!((spot.y - 450.0).abs() < 1e-6);
    }

    #[test]
    fn test_shift_amount_follows_smallest_label() {
        let mut ctx = context(&MapConfig::default(), 5000);
        ctx.note_label_size(40.0, 10.0);
        ctx.note_label_size(30.0, 12.0);
        assert_eq!(ctx.smallest_dimension(), 10.0);
        assert!((ctx.radians_shift_amount() - 5.0 / ctx.last_outer_radius).abs() < 1e-12);
        assert_eq!(ctx.radius_shift_amount(), 4.0);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000_000), "1,000,000");
    }
}
