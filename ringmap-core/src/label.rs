//! Feature labels and the moves the placement engine makes with them.
//!
//! A label hangs off a connector line that starts just past the outermost (or innermost) slot
//! at the angle of its feature's midpoint. The engine may swing the far end of the line sideways
//! ([`Label::shift_radians_lower`], [`Label::shift_radians_higher`]) or push the text further
//! out along it ([`Label::extend_radius`]). Outer and inner labels share this type; [`LabelSide`]
//! selects the direction and the text anchoring.

use std::cmp::Ordering;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, TextAnchor};
use crate::context::LayoutContext;
use crate::geometry::{Point, Rect};
use crate::text::{Font, TextMeasure, TextMetrics};
use crate::types::{BasePos, Color};

const PLACED_PADDING: f64 = 2.0;
const SHIFT_PADDING: f64 = 3.0;
const DRAWN_PADDING: f64 = 1.5;
const LINE_BACKOFF_STEP: f64 = 0.1;
const BACKGROUND_OPACITY: f64 = 0.6;
const NEAR_VERTICAL: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSide {
    Outer,
    Inner,
}

impl LabelSide {
    /// +1 for labels growing away from the center, -1 for labels growing toward it.
    fn outward(self) -> f64 {
        match self {
            LabelSide::Outer => 1.0,
            LabelSide::Inner => -1.0,
        }
    }

    /// Bottom-left corner of a `width`×`height` text box attached at `anchor`, so that the box
    /// sits beyond the anchor when seen from the map center.
    fn text_corner(self, anchor: Point, radians: f64, width: f64, height: f64) -> Point {
        let (sin, cos) = radians.sin_cos();
        let (mut x, mut y) = (anchor.x, anchor.y);
        let lower_half = sin >= 0.0;
        let right_half = cos >= 0.0;
        let vertical = sin.abs() > NEAR_VERTICAL;

        match (self, lower_half, right_half) {
            (LabelSide::Outer, true, true) => {
                if vertical {
                    x -= sin * 0.5 * width;
                    y += height;
                } else {
                    y += 0.5 * height;
                }
            }
            (LabelSide::Outer, true, false) => {
                if vertical {
                    x += -width + sin * 0.5 * width;
                    y += height;
                } else {
                    x -= width;
                    y += 0.5 * height;
                }
            }
            (LabelSide::Outer, false, false) => {
                if vertical {
                    x += -width - sin * 0.5 * width;
                } else {
                    x -= width;
                    y += 0.5 * height;
                }
            }
            (LabelSide::Outer, false, true) => {
                if vertical {
                    x += sin * 0.5 * width;
                } else {
                    y += 0.5 * height;
                }
            }
            (LabelSide::Inner, true, true) => {
                if vertical {
                    x += -width + sin * 0.5 * width;
                } else {
                    x -= width;
                    y += 0.5 * height;
                }
            }
            (LabelSide::Inner, true, false) => {
                if vertical {
                    x -= sin * 0.5 * width;
                } else {
                    y += 0.5 * height;
                }
            }
            (LabelSide::Inner, false, false) => {
                if vertical {
                    x += -width - sin * 0.5 * width;
                    y += height;
                } else {
                    y += 0.5 * height;
                }
            }
            (LabelSide::Inner, false, true) => {
                if vertical {
                    x += -width - sin * 0.5 * width;
                    y += height;
                } else {
                    x -= width;
                    y += 0.5 * height;
                }
            }
        }
        Point::new(x, y)
    }
}

#[derive(Debug, Clone)]
pub struct Label {
    side: LabelSide,
    text: String,
    font: Font,
    color: Color,
    metrics: TextMetrics,

    line_start_radians: f64,
    line_end_radians: f64,
    line_start_radius: f64,
    line_end_radius: f64,
    extended_radius: bool,
    extended_line_start_radius: f64,
    extended_line_end_radius: f64,
    allowed_radians_delta: f64,
    placed_bounds: Rect,

    pub force_label: bool,
    pub fixed_in_place: bool,
    pub hyperlink: Option<String>,
    pub mouseover: Option<String>,
    /// Sequence position the connector points at.
    pub base: BasePos,
}

impl Label {
    /// Measure `text` and attach it at `line_start_radians`. Blank text becomes `"Untitled"`
    /// and a missing font falls back to the map label font.
    pub fn new(
        ctx: &mut LayoutContext,
        measure: &dyn TextMeasure,
        side: LabelSide,
        text: &str,
        font: Option<Font>,
        color: Color,
        line_start_radians: f64,
    ) -> Self {
        let text = if text.trim().is_empty() { "Untitled".to_string() } else { text.to_string() };
        let font = font.unwrap_or_else(|| ctx.label_font.clone());
        let metrics = measure.measure(&text, &font);
        ctx.note_label_size(metrics.width, metrics.height);

        let allowed_radians_delta = if line_start_radians.sin().abs() > 0.70 {
            2.0 * PI / 16.0
        } else {
            2.0 * PI / 10.0
        };

        let mut label = Self {
            side,
            text,
            font,
            color,
            metrics,
            line_start_radians,
            line_end_radians: line_start_radians,
            line_start_radius: 0.0,
            line_end_radius: 0.0,
            extended_radius: false,
            extended_line_start_radius: 0.0,
            extended_line_end_radius: 0.0,
            allowed_radians_delta,
            placed_bounds: Rect::default(),
            force_label: false,
            fixed_in_place: false,
            hyperlink: None,
            mouseover: None,
            base: 1,
        };
        let start = match side {
            LabelSide::Outer => ctx.outer_label_start(),
            LabelSide::Inner => ctx.inner_label_start(),
        };
        label.set_line_start_radius(ctx, start);
        label
    }

    /// Same text and feature angle, restarted on the outer ring.
    pub fn moved_to_outer(&self, ctx: &LayoutContext) -> Label {
        let mut label = self.clone();
        label.side = LabelSide::Outer;
        label.line_end_radians = label.line_start_radians;
        label.extended_radius = false;
        label.extended_line_start_radius = 0.0;
        label.extended_line_end_radius = 0.0;
        label.set_line_start_radius(ctx, ctx.outer_label_start());
        label
    }

    pub fn side(&self) -> LabelSide {
        self.side
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn metrics(&self) -> TextMetrics {
        self.metrics
    }

    pub fn line_start_radians(&self) -> f64 {
        self.line_start_radians
    }

    pub fn line_end_radians(&self) -> f64 {
        self.line_end_radians
    }

    pub fn line_start_radius(&self) -> f64 {
        self.line_start_radius
    }

    pub fn line_end_radius(&self) -> f64 {
        self.line_end_radius
    }

    pub fn is_extended(&self) -> bool {
        self.extended_radius
    }

    pub fn extended_line_start_radius(&self) -> f64 {
        self.extended_line_start_radius
    }

    pub fn extended_line_end_radius(&self) -> f64 {
        self.extended_line_end_radius
    }

    pub fn allowed_radians_delta(&self) -> f64 {
        self.allowed_radians_delta
    }

    pub fn bounds(&self) -> Rect {
        self.placed_bounds
    }

    /// Angle between where the connector starts and where the text hangs.
    pub fn radians_shift(&self) -> f64 {
        (self.line_start_radians - self.line_end_radians).abs()
    }

    /// Distance the text was pushed along the connector by radius extension.
    pub fn radial_displacement(&self) -> f64 {
        if self.extended_radius {
            (self.extended_line_end_radius - self.line_end_radius).abs()
        } else {
            0.0
        }
    }

    /// Point where the connector starts.
    pub fn line_start(&self, ctx: &LayoutContext) -> Point {
        ctx.point_at(self.line_start_radius, self.line_start_radians)
    }

    fn text_radius(&self) -> f64 {
        if self.extended_radius {
            self.extended_line_end_radius
        } else {
            self.line_end_radius
        }
    }

    pub fn set_line_start_radius(&mut self, ctx: &LayoutContext, radius: f64) {
        self.line_start_radius = radius;
        self.line_end_radius = radius + self.side.outward() * ctx.label_line_length;
        self.update_bounds(ctx, PLACED_PADDING);
    }

    /// Recompute the text box for the current line end, with `padding` on every side.
    pub fn update_bounds(&mut self, ctx: &LayoutContext, padding: f64) {
        let radius = self.text_radius() + self.side.outward() * ctx.label_line_thickness;
        self.placed_bounds = self.text_box(ctx, radius, padding);
    }

    fn text_box(&self, ctx: &LayoutContext, radius: f64, padding: f64) -> Rect {
        let anchor = ctx.point_at(radius, self.line_end_radians);
        let corner = self.side.text_corner(anchor, self.line_end_radians, self.metrics.width, self.metrics.height);
        Rect::new(
            corner.x - padding,
            corner.y - self.metrics.height - padding,
            self.metrics.width + 2.0 * padding,
            self.metrics.height + 2.0 * padding,
        )
    }

    pub fn clashes(&self, other: &Label) -> bool {
        self.placed_bounds.intersects(&other.placed_bounds)
    }

    pub fn clashes_with_any(&self, others: Others<'_>) -> bool {
        others.iter().any(|other| self.clashes(other))
    }

    pub fn shift_radians_lower(&mut self, ctx: &LayoutContext) -> bool {
        self.shift_radians_by(ctx, -ctx.radians_shift_amount())
    }

    pub fn shift_radians_higher(&mut self, ctx: &LayoutContext) -> bool {
        self.shift_radians_by(ctx, ctx.radians_shift_amount())
    }

    fn shift_radians_by(&mut self, ctx: &LayoutContext, step: f64) -> bool {
        let target = self.line_end_radians + step;
        if (self.line_start_radians - target).abs() < self.allowed_radians_delta {
            self.line_end_radians = target;
            self.update_bounds(ctx, SHIFT_PADDING);
            true
        } else {
            false
        }
    }

    /// Move one step back toward the feature angle unless that creates a clash. Returns true
    /// while the label is still on its way back.
    pub fn shift_radians_to_original(&mut self, ctx: &LayoutContext, others: Others<'_>) -> bool {
        let delta = self.line_start_radians - self.line_end_radians;
        if delta == 0.0 {
            return false;
        }
        if delta.abs() <= ctx.radians_shift_amount() {
            let previous = self.line_end_radians;
            self.line_end_radians = self.line_start_radians;
            self.update_bounds(ctx, SHIFT_PADDING);
            if self.clashes_with_any(others) {
                self.line_end_radians = previous;
                self.update_bounds(ctx, SHIFT_PADDING);
            }
            return false;
        }
        if delta < 0.0 {
            if !self.shift_radians_lower(ctx) {
                return false;
            }
            if self.clashes_with_any(others) {
                self.shift_radians_higher(ctx);
                return false;
            }
        } else {
            if !self.shift_radians_higher(ctx) {
                return false;
            }
            if self.clashes_with_any(others) {
                self.shift_radians_lower(ctx);
                return false;
            }
        }
        true
    }

    /// Push the text one radius step further along its connector. The move is undone and false
    /// returned when the text would leave the background.
    pub fn extend_radius(&mut self, ctx: &LayoutContext) -> bool {
        let step = self.side.outward() * ctx.radius_shift_amount();
        let (sin, cos) = self.line_end_radians.sin_cos();
        let saved = (self.extended_radius, self.extended_line_start_radius, self.extended_line_end_radius, self.placed_bounds);

        if self.extended_radius {
            self.extended_line_end_radius += step;
        } else {
            self.extended_radius = true;
            self.extended_line_start_radius = self.line_end_radius;
            self.extended_line_end_radius = self.line_end_radius + step;
        }
        self.placed_bounds.translate(cos * step, sin * step);

        if self.fits_in_background(ctx) {
            true
        } else {
            (self.extended_radius, self.extended_line_start_radius, self.extended_line_end_radius, self.placed_bounds) = saved;
            false
        }
    }

    /// Inside the canvas; inner labels of a whole-circle map must also keep clear of the title
    /// and length text.
    pub fn fits_in_background(&self, ctx: &LayoutContext) -> bool {
        if !ctx.background.contains_rect(&self.placed_bounds) {
            return false;
        }
        match self.side {
            LabelSide::Outer => true,
            LabelSide::Inner if ctx.draw_entire_plasmid => {
                !ctx.title_rect.intersects(&self.placed_bounds) && !ctx.length_rect.intersects(&self.placed_bounds)
            }
            LabelSide::Inner => true,
        }
    }

    /// Connector from the feature to the text. The far end backs off until it leaves the text box.
    pub fn draw_line(&self, ctx: &LayoutContext, canvas: &mut dyn Canvas) {
        let out = self.side.outward();
        let text_box = self.text_box(ctx, self.text_radius(), DRAWN_PADDING);
        let end_radians = self.line_end_radians;

        let mut end_radius = self.text_radius() + out * self.metrics.descent;
        let limit = if self.extended_radius { self.line_end_radius } else { self.line_start_radius };
        while text_box.contains_point(ctx.point_at(end_radius, end_radians)) && (end_radius - limit) * out > 0.0 {
            end_radius -= out * LINE_BACKOFF_STEP;
        }
        end_radius -= out * ctx.label_line_thickness;

        let start = self.line_start(ctx);
        let width = ctx.label_line_thickness;
        if self.extended_radius {
            let bend = ctx.point_at(self.line_end_radius, end_radians);
            canvas.line(start, bend, self.color, width, 1.0);
            canvas.line(bend, ctx.point_at(end_radius, end_radians), self.color, width, 1.0);
        } else {
            canvas.line(start, ctx.point_at(end_radius, end_radians), self.color, width, 1.0);
        }
    }

    /// Draw the text over a backing box and return the box, which becomes the label's bounds.
    pub fn draw_text(&mut self, ctx: &LayoutContext, canvas: &mut dyn Canvas) -> Rect {
        let text_box = self.text_box(ctx, self.text_radius(), DRAWN_PADDING);
        self.placed_bounds = text_box;
        let origin = Point::new(text_box.x + DRAWN_PADDING, text_box.max_y() - DRAWN_PADDING - self.metrics.descent);
        if ctx.colored_label_background {
            canvas.fill_rect(text_box, self.color, 1.0);
            canvas.text(&self.text, origin, &self.font, ctx.background_color, TextAnchor::Start);
        } else {
            canvas.fill_rect(text_box, ctx.background_color, BACKGROUND_OPACITY);
            canvas.text(&self.text, origin, &self.font, self.color, TextAnchor::Start);
        }
        text_box
    }
}

/// Every label of a list except one, for clash checks against the rest.
#[derive(Debug, Clone, Copy)]
pub struct Others<'a> {
    before: &'a [Label],
    after: &'a [Label],
}

impl<'a> Others<'a> {
    pub fn none() -> Self {
        Self { before: &[], after: &[] }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Label> + 'a {
        self.before.iter().chain(self.after.iter())
    }
}

/// Split `labels` into the label at `index` and all the others.
pub fn split_at_label(labels: &mut [Label], index: usize) -> Option<(&mut Label, Others<'_>)> {
    if index >= labels.len() {
        return None;
    }
    let (before, rest) = labels.split_at_mut(index);
    let (label, after) = rest.split_first_mut()?;
    Some((label, Others { before, after }))
}

pub fn by_start_radians(a: &Label, b: &Label) -> Ordering {
    a.line_start_radians.total_cmp(&b.line_start_radians)
}

pub fn by_radians_shift(a: &Label, b: &Label) -> Ordering {
    a.radians_shift().total_cmp(&b.radians_shift())
}

pub fn by_radial_displacement(a: &Label, b: &Label) -> Ordering {
    a.radial_displacement().total_cmp(&b.radial_displacement())
}

/// Forced labels sort last so they are drawn on top.
pub fn by_force(a: &Label, b: &Label) -> Ordering {
    a.force_label.cmp(&b.force_label)
}
