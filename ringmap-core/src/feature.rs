//! Features and the ranges they are drawn from.
//!
//! A [`Feature`] carries display defaults; each [`FeatureRange`] copies them when it is created
//! and may override them afterwards. Ranges draw themselves as arcs in the slot ring that owns
//! their feature and produce at most one label candidate each.

use std::f64::consts::PI;

use crate::canvas::Canvas;
use crate::context::LayoutContext;
use crate::interval::CircularSpan;
use crate::label::{Label, LabelSide};
use crate::text::{Font, TextMeasure};
use crate::types::{BasePos, Color, Decoration, LabelMode, Strand};

const HIGHLIGHT_OPACITY: f64 = 0.3;
const SHADOW_OPACITY: f64 = 0.3;

/// Ring geometry handed to a range when it draws.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotGeometry {
    pub radius: f64,
    pub thickness: f64,
    pub show_shading: bool,
    pub minimum_feature_length: f64,
}

/// Arc in degrees of map rotation, measured clockwise from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub start_degrees: f64,
    pub extent_degrees: f64,
}

impl ArcSpan {
    pub fn length_at(&self, radius: f64) -> f64 {
        self.extent_degrees.to_radians() * radius
    }

    pub fn mid_degrees(&self) -> f64 {
        self.start_degrees + self.extent_degrees / 2.0
    }

    pub fn end_degrees(&self) -> f64 {
        self.start_degrees + self.extent_degrees
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRange {
    pub start: BasePos,
    pub stop: BasePos,
    pub color: Color,
    pub decoration: Decoration,
    pub label_mode: LabelMode,
    pub label: Option<String>,
    pub hyperlink: Option<String>,
    pub mouseover: Option<String>,
    pub font: Option<Font>,
    opacity: f64,
    proportion_of_thickness: f64,
    radius_adjustment: f64,
}

impl FeatureRange {
    fn from_feature(feature: &Feature, start: BasePos, stop: BasePos) -> Self {
        Self {
            start,
            stop,
            color: feature.color,
            decoration: feature.decoration,
            label_mode: feature.label_mode,
            label: None,
            hyperlink: feature.hyperlink.clone(),
            mouseover: feature.mouseover.clone(),
            font: feature.font.clone(),
            opacity: feature.opacity,
            proportion_of_thickness: feature.proportion_of_thickness,
            radius_adjustment: feature.radius_adjustment,
        }
    }

    pub fn span(&self) -> CircularSpan {
        CircularSpan::new(self.start, self.stop)
    }

    pub fn is_hidden(&self) -> bool {
        self.decoration == Decoration::Hidden
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn proportion_of_thickness(&self) -> f64 {
        self.proportion_of_thickness
    }

    pub fn set_proportion_of_thickness(&mut self, proportion: f64) {
        self.proportion_of_thickness = proportion.clamp(0.0, 1.0);
    }

    pub fn radius_adjustment(&self) -> f64 {
        self.radius_adjustment
    }

    pub fn set_radius_adjustment(&mut self, adjustment: f64) {
        self.radius_adjustment = adjustment.clamp(0.0, 1.0);
    }

    pub fn with_label<S: Into<String>>(&mut self, label: S) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn in_bounds(&self, sequence_length: BasePos) -> bool {
        (1..=sequence_length).contains(&self.start) && (1..=sequence_length).contains(&self.stop)
    }

    /// True arc covered by the range, before any minimum length inflation.
    pub fn arc(&self, ctx: &LayoutContext) -> ArcSpan {
        let start_degrees = ctx.degrees(self.start as f64 - 1.0);
        let extent_degrees = if self.start <= self.stop {
            ctx.degrees(self.stop as f64) - start_degrees
        } else {
            ctx.degrees(ctx.sequence_length as f64) - start_degrees + ctx.degrees(self.stop as f64)
        };
        ArcSpan { start_degrees, extent_degrees }
    }

    /// Arc as drawn at `radius`: ranges shorter than `minimum_length` pixels are widened to it,
    /// and centered on their true position when small features are shifted.
    pub fn drawn_arc(&self, ctx: &LayoutContext, radius: f64, minimum_length: f64) -> ArcSpan {
        let mut arc = self.arc(ctx);
        if arc.length_at(radius) < minimum_length {
            arc.extent_degrees = (minimum_length / radius).to_degrees();
            if ctx.shift_small_features {
                arc.start_degrees -= 0.5 * arc.extent_degrees;
            }
        }
        arc
    }

    /// Radius and thickness of the band after applying the thickness proportion and radius
    /// adjustment; the band never leaves its slot.
    pub fn band(&self, slot: &SlotGeometry) -> (f64, f64) {
        let t = slot.thickness;
        let p = self.proportion_of_thickness;
        let mut radius = slot.radius;
        if p < 1.0 {
            radius = slot.radius - 0.5 * t + t * self.radius_adjustment;
        }
        let max = slot.radius + 0.5 * t - 0.5 * t * p;
        let min = slot.radius - 0.5 * t + 0.5 * t * p;
        (radius.min(max).max(min), p * t)
    }

    pub fn draw(&self, ctx: &LayoutContext, slot: &SlotGeometry, canvas: &mut dyn Canvas) {
        if !self.in_bounds(ctx.sequence_length) {
            log::warn!(
                "Feature range {}..{} lies outside 1..{} and is not drawn",
                self.start,
                self.stop,
                ctx.sequence_length
            );
            return;
        }
        let (radius, thickness) = self.band(slot);
        if thickness <= 0.0 {
            return;
        }
        match self.decoration {
            Decoration::Hidden => {}
            Decoration::Standard => {
                let arc = self.drawn_arc(ctx, radius, slot.minimum_feature_length);
                self.draw_band(ctx, canvas, arc, radius, thickness, slot.show_shading);
            }
            Decoration::ClockwiseArrow | Decoration::CounterclockwiseArrow => {
                self.draw_arrow(ctx, canvas, radius, thickness, slot.show_shading);
            }
        }
    }

    fn draw_band(
        &self,
        ctx: &LayoutContext,
        canvas: &mut dyn Canvas,
        arc: ArcSpan,
        radius: f64,
        thickness: f64,
        shading: bool,
    ) {
        if arc.extent_degrees <= 0.0 {
            return;
        }
        let start = ctx.radians(0.0) + arc.start_degrees.to_radians();
        let extent = arc.extent_degrees.to_radians();
        canvas.stroke_arc(ctx.center, radius, start, extent, thickness, self.color, self.opacity);
        if shading {
            let band = thickness * ctx.shading_proportion;
            let offset = 0.5 * thickness - 0.5 * band;
            canvas.stroke_arc(ctx.center, radius + offset, start, extent, band, Color::WHITE, HIGHLIGHT_OPACITY * self.opacity);
            canvas.stroke_arc(ctx.center, radius - offset, start, extent, band, Color::BLACK, SHADOW_OPACITY * self.opacity);
        }
    }

    fn draw_arrow(&self, ctx: &LayoutContext, canvas: &mut dyn Canvas, radius: f64, thickness: f64, shading: bool) {
        let clockwise = self.decoration == Decoration::ClockwiseArrow;
        let arc = self.arc(ctx);
        let head_degrees = (ctx.arrowhead_length / radius).to_degrees();

        let (body, tip_degrees, base_degrees) = if arc.length_at(radius) < ctx.arrowhead_length && ctx.shift_small_features {
            // the whole range becomes a head centered on its midpoint
            let mid = arc.mid_degrees();
            let (tip, base) = if clockwise {
                (mid + head_degrees / 2.0, mid - head_degrees / 2.0)
            } else {
                (mid - head_degrees / 2.0, mid + head_degrees / 2.0)
            };
            (None, tip, base)
        } else {
            let body_extent = (arc.extent_degrees - head_degrees).max(0.0);
            if clockwise {
                let body = ArcSpan { start_degrees: arc.start_degrees, extent_degrees: body_extent };
                (Some(body), arc.end_degrees(), arc.start_degrees + body_extent)
            } else {
                let body = ArcSpan { start_degrees: arc.end_degrees() - body_extent, extent_degrees: body_extent };
                (Some(body), arc.start_degrees, arc.end_degrees() - body_extent)
            }
        };

        if let Some(body) = body {
            self.draw_band(ctx, canvas, body, radius, thickness, shading);
        }
        let to_radians = |degrees: f64| ctx.radians(0.0) + degrees.to_radians();
        let head = [
            ctx.point_at(radius + thickness / 2.0, to_radians(base_degrees)),
            ctx.point_at(radius, to_radians(tip_degrees)),
            ctx.point_at(radius - thickness / 2.0, to_radians(base_degrees)),
        ];
        canvas.fill_polygon(&head, self.color, self.opacity);
    }

    /// Text shown for this range, with coordinates appended when feature positions are on.
    pub fn label_text(&self, ctx: &LayoutContext) -> Option<String> {
        let text = self.label.as_deref().map(str::trim).filter(|t| !t.is_empty());
        if text.is_none() && self.hyperlink.is_none() && self.mouseover.is_none() {
            return None;
        }
        let text = text.unwrap_or_default();
        if !ctx.feature_positions {
            return Some(text.to_string());
        }
        let positions = if self.start == self.stop {
            self.start.to_string()
        } else if self.decoration == Decoration::CounterclockwiseArrow {
            format!("{}-{}", self.stop, self.start)
        } else {
            format!("{}-{}", self.start, self.stop)
        };
        Some(format!("{} {}", text, positions).trim().to_string())
    }

    /// Label candidate for this range, or `None` when it has nothing to show.
    pub fn label_candidate(
        &self,
        ctx: &mut LayoutContext,
        strand: Strand,
        measure: &dyn TextMeasure,
    ) -> Option<Label> {
        if self.label_mode == LabelMode::Hidden || self.is_hidden() || !self.in_bounds(ctx.sequence_length) {
            return None;
        }
        let text = self.label_text(ctx)?;
        let arc = self.arc(ctx);
        let mut midpoint = ctx.radians(0.0) + arc.mid_degrees().to_radians();
        midpoint = midpoint.rem_euclid(2.0 * PI);

        let side = if ctx.inner_labels && strand == Strand::Reverse {
            LabelSide::Inner
        } else {
            LabelSide::Outer
        };
        let mut label = Label::new(ctx, measure, side, &text, self.font.clone(), self.color, midpoint);
        label.force_label = self.label_mode.is_forced();
        label.hyperlink = self.hyperlink.clone();
        label.mouseover = self.mouseover.clone();
        label.base = ctx.base_at(midpoint);
        Some(label)
    }
}

/// An annotated region made of one or more ranges.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    strand: Strand,
    pub color: Color,
    pub decoration: Decoration,
    pub label_mode: LabelMode,
    pub show_shading: bool,
    pub font: Option<Font>,
    pub hyperlink: Option<String>,
    pub mouseover: Option<String>,
    opacity: f64,
    proportion_of_thickness: f64,
    radius_adjustment: f64,
    ranges: Vec<FeatureRange>,
}

impl Default for Feature {
    fn default() -> Self {
        Self {
            strand: Strand::Direct,
            color: Color::BLUE,
            decoration: Decoration::Standard,
            label_mode: LabelMode::Show,
            show_shading: true,
            font: None,
            hyperlink: None,
            mouseover: None,
            opacity: 1.0,
            proportion_of_thickness: 1.0,
            radius_adjustment: 0.0,
            ranges: Vec::new(),
        }
    }
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-range feature.
    pub fn with_range(start: BasePos, stop: BasePos) -> Self {
        let mut feature = Self::new();
        feature.add_range(start, stop);
        feature
    }

    /// Strand of the slot holding this feature.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub(crate) fn assign_strand(&mut self, strand: Strand) {
        self.strand = strand;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_proportion_of_thickness(&mut self, proportion: f64) {
        self.proportion_of_thickness = proportion.clamp(0.0, 1.0);
    }

    pub fn set_radius_adjustment(&mut self, adjustment: f64) {
        self.radius_adjustment = adjustment.clamp(0.0, 1.0);
    }

    pub fn force_label(&self) -> bool {
        self.label_mode.is_forced()
    }

    /// Add a range that inherits this feature's current display attributes.
    pub fn add_range(&mut self, start: BasePos, stop: BasePos) -> &mut FeatureRange {
        let range = FeatureRange::from_feature(self, start, stop);
        self.ranges.push(range);
        let last = self.ranges.len() - 1;
        &mut self.ranges[last]
    }

    pub fn ranges(&self) -> &[FeatureRange] {
        &self.ranges
    }

    pub fn ranges_mut(&mut self) -> &mut [FeatureRange] {
        &mut self.ranges
    }

    /// Smallest range start, or `None` for a feature without ranges.
    pub fn start(&self) -> Option<BasePos> {
        self.ranges.iter().map(|r| r.start).min()
    }

    pub fn draw(&self, ctx: &LayoutContext, slot: &SlotGeometry, canvas: &mut dyn Canvas) {
        let slot = SlotGeometry { show_shading: slot.show_shading && self.show_shading, ..*slot };
        for range in &self.ranges {
            range.draw(ctx, &slot, canvas);
        }
    }

    pub fn label_candidates(&self, ctx: &mut LayoutContext, measure: &dyn TextMeasure) -> Vec<Label> {
        self.ranges
            .iter()
            .filter_map(|range| range.label_candidate(ctx, self.strand, measure))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapConfig;
    use crate::context::SlotStack;
    use crate::text::ApproxTextMeasure;

    fn context(length: BasePos) -> LayoutContext {
        let config = MapConfig::default();
        let sizes = config.scaled_for(2);
        let stack = SlotStack { outer: 14.0, inner: 14.0 };
        LayoutContext::new(&config, &sizes, length, None, stack, &ApproxTextMeasure::default())
    }

    #[test]
    fn test_ranges_copy_feature_attributes() {
        let mut feature = Feature::new();
        feature.color = Color::rgb(255, 0, 0);
        feature.set_opacity(1.7);
        feature.label_mode = LabelMode::Forced;
        let range = feature.add_range(10, 20);
        assert_eq!(range.color, Color::rgb(255, 0, 0));
        assert_eq!(range.opacity(), 1.0);
        assert!(range.label_mode.is_forced());
        assert!(feature.force_label());
    }

    #[test]
    fn test_feature_start_is_smallest_range_start() {
        let mut feature = Feature::new();
        feature.add_range(300, 400);
        feature.add_range(100, 200);
        assert_eq!(feature.start(), Some(100));
        assert_eq!(Feature::new().start(), None);
    }

    #[test]
    fn test_wrapping_arc_extent() {
        let ctx = context(7000);
        let range = Feature::with_range(6899, 10).ranges()[0].clone();
        let arc = range.arc(&ctx);
        assert!((arc.start_degrees - 6898.0 / 7000.0 * 360.0).abs() < 1e-9);
        assert!((arc.extent_degrees - 112.0 / 7000.0 * 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_base_feature_is_inflated() {
        let ctx = context(1_000_000);
        let range = Feature::with_range(500_000, 500_000).ranges()[0].clone();
        let radius = ctx.first_outer_radius;
        let true_arc = range.arc(&ctx);
        assert!(true_arc.length_at(radius) < ctx.minimum_feature_length);
        let drawn = range.drawn_arc(&ctx, radius, ctx.minimum_feature_length);
        assert!((drawn.length_at(radius) - ctx.minimum_feature_length).abs() < 1e-9);
        // shifted back so the widened arc is centered on the base
        assert!((drawn.start_degrees - (true_arc.start_degrees - drawn.extent_degrees / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_band_stays_inside_slot() {
        let slot = SlotGeometry { radius: 100.0, thickness: 10.0, show_shading: false, minimum_feature_length: 1.0 };
        let mut range = Feature::with_range(1, 10).ranges()[0].clone();
        range.set_proportion_of_thickness(0.5);
        range.set_radius_adjustment(1.0);
        let (radius, thickness) = range.band(&slot);
        assert_eq!(thickness, 5.0);
        assert_eq!(radius, 102.5);
        range.set_radius_adjustment(0.0);
        assert_eq!(range.band(&slot).0, 97.5);
    }

    #[test]
    fn test_label_text_with_positions() {
        let mut ctx = context(5000);
        let mut range = Feature::with_range(100, 200).ranges()[0].clone();
        assert_eq!(range.label_text(&ctx), None);
        range.with_label("lacZ");
        assert_eq!(range.label_text(&ctx).as_deref(), Some("lacZ"));
        ctx.feature_positions = true;
        assert_eq!(range.label_text(&ctx).as_deref(), Some("lacZ 100-200"));
        range.decoration = Decoration::CounterclockwiseArrow;
        assert_eq!(range.label_text(&ctx).as_deref(), Some("lacZ 200-100"));
    }

    #[test]
    fn test_hidden_ranges_make_no_labels() {
        let mut ctx = context(5000);
        let measure = ApproxTextMeasure::default();
        let mut feature = Feature::new();
        feature.label_mode = LabelMode::Hidden;
        feature.add_range(100, 200).with_label("bla");
        assert!(feature.label_candidates(&mut ctx, &measure).is_empty());
    }

    #[test]
    fn test_label_candidate_sits_on_midpoint() {
        let mut ctx = context(4000);
        let measure = ApproxTextMeasure::default();
        let mut feature = Feature::new();
        feature.add_range(901, 1100).with_label("ori");
        let labels = feature.label_candidates(&mut ctx, &measure);
        assert_eq!(labels.len(), 1);
        // midpoint of 900..1100 is base 1000, a quarter turn past the top
        assert!(labels[0].line_start_radians().sin().abs() < 1e-9);
        assert!(labels[0].line_start_radians().cos() > 0.0);
        assert_eq!(labels[0].side(), LabelSide::Outer);
        assert_eq!(labels[0].base, 1000);
    }
}
