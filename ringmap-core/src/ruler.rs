//! Tick marks around the slot rings and the position labels of the major ticks.

use crate::bounds::{BoundsKind, LabelBounds};
use crate::canvas::{Canvas, TextAnchor};
use crate::context::LayoutContext;
use crate::geometry::{Point, Rect};
use crate::types::{BasePos, Strand};

const DESIRED_TICKS: f64 = 25.0;
const NICE_STEPS: [u64; 3] = [1, 2, 5];
/// Each major interval is split into ten minor ticks; this is the length divisor of each.
const TICK_HEIGHTS: [f64; 10] = [1.0, 5.0, 5.0, 5.0, 5.0, 2.0, 5.0, 5.0, 5.0, 5.0];
const TEXT_PADDING: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ruler {
    /// Bases between labelled ticks: 1, 2 or 5 times a power of ten.
    pub major: u64,
}

impl Ruler {
    /// Pick the smallest nice interval above the spacing that gives about 25 ticks per 200 px of
    /// ring radius.
    pub fn for_context(ctx: &LayoutContext) -> Self {
        let radius = ctx.last_inner_radius.max(1.0);
        let approx = ctx.sequence_length as f64 / (DESIRED_TICKS * radius / 200.0);
        Self { major: nice_interval(approx) }
    }

    pub fn minor(&self) -> f64 {
        self.major as f64 / TICK_HEIGHTS.len() as f64
    }

    /// `"500 bp"`, `"20 kbp"`, `"2 Mbp"`.
    pub fn label_for(&self, base: u64) -> String {
        if self.major >= 1_000_000 {
            format!("{} Mbp", base / 1_000_000)
        } else if self.major >= 1000 {
            format!("{} kbp", base / 1000)
        } else {
            format!("{} bp", base)
        }
    }

    /// Tick positions with their length divisor, one full turn.
    pub fn ticks(&self, sequence_length: BasePos) -> Vec<(f64, f64)> {
        let minor = self.minor();
        let mut ticks = Vec::new();
        let mut base = minor;
        while base - 0.5 < sequence_length as f64 {
            let index = (base / minor + 0.5).floor() as usize;
            ticks.push((base, TICK_HEIGHTS[index % TICK_HEIGHTS.len()]));
            base += minor;
        }
        ticks
    }

    /// Draw ticks outward from the outermost slot and inward from the innermost one, labelling
    /// the inner major ticks. Each label adds a ruler record to `bounds`.
    pub fn draw(&self, ctx: &LayoutContext, canvas: &mut dyn Canvas, bounds: &mut Vec<LabelBounds>) {
        if !ctx.draw_ticks {
            return;
        }
        let ticks = self.ticks(ctx.sequence_length);
        for strand in [Strand::Direct, Strand::Reverse] {
            let (start_radius, direction) = match strand {
                Strand::Direct => (ctx.last_outer_radius + 0.5 * ctx.tick_thickness, 1.0),
                Strand::Reverse => (ctx.last_inner_radius - 0.5 * ctx.tick_thickness, -1.0),
            };
            for &(base, height) in &ticks {
                let radians = ctx.radians(base);
                let start = ctx.point_at(start_radius, radians);
                let end = ctx.point_at(start_radius + direction * ctx.tick_length / height, radians);
                if !ctx.background.contains_point(start) || !ctx.background.contains_point(end) {
                    continue;
                }
                let thickness = if height == 1.0 { ctx.tick_thickness } else { ctx.tick_thickness * 0.5 };
                canvas.line(start, end, ctx.tick_color, thickness, 1.0);

                let whole = (base + 0.5).floor() as u64;
                if strand == Strand::Reverse && height == 1.0 && whole > 0 {
                    let text_radius = start_radius - TEXT_PADDING - ctx.tick_length - 0.5 * ctx.tick_thickness;
                    if let Some(record) = self.draw_label(ctx, canvas, whole, radians, text_radius) {
                        bounds.push(record);
                    }
                }
            }
        }
    }

    fn draw_label(
        &self,
        ctx: &LayoutContext,
        canvas: &mut dyn Canvas,
        base: u64,
        radians: f64,
        radius: f64,
    ) -> Option<LabelBounds> {
        let text = self.label_for(base);
        let metrics = canvas.measure(&text, &ctx.ruler_font);
        // pull the box inward until its nearest edge touches `radius`
        let (sin, cos) = radians.sin_cos();
        let reach = 0.5 * (cos.abs() * metrics.width + sin.abs() * metrics.height);
        if radius - reach <= 0.0 {
            return None;
        }
        let center = ctx.point_at(radius - reach, radians);
        let rect = Rect::centered(center, metrics.width, metrics.height);
        if !ctx.background.contains_rect(&rect) {
            return None;
        }
        let baseline = Point::new(rect.x, rect.max_y() - metrics.descent);
        canvas.text(&text, baseline, &ctx.ruler_font, ctx.tick_color, TextAnchor::Start);
        Some(LabelBounds::new(BoundsKind::Ruler, rect.inflate(1.5), text, base.min(BasePos::MAX as u64) as BasePos))
    }
}

/// Smallest value of the form 1, 2 or 5 times a power of ten that exceeds `approx`, capped at
/// 10 Mbp.
pub fn nice_interval(approx: f64) -> u64 {
    let mut magnitude = 1u64;
    while magnitude <= 10_000_000 {
        for step in NICE_STEPS {
            let candidate = step * magnitude;
            if approx < candidate as f64 {
                return candidate;
            }
        }
        magnitude *= 10;
    }
    10_000_000
}
