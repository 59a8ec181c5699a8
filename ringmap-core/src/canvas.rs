//! Drawing surface consumed by the render pass.
//!
//! Angles are screen radians: zero at 3 o'clock, increasing clockwise because y grows downward.

use crate::geometry::{Point, Rect};
use crate::text::{ApproxTextMeasure, Font, TextMeasure, TextMetrics};
use crate::types::Color;

/// Horizontal anchoring of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

pub trait Canvas: TextMeasure {
    /// This canvas as its own text measurement service.
    fn as_measure(&self) -> &dyn TextMeasure;

    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f64);

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64);

    /// Stroke an arc band of the given `thickness` centered on `radius`, with butt caps.
    #[allow(clippy::too_many_arguments)]
    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_radians: f64,
        extent_radians: f64,
        thickness: f64,
        color: Color,
        opacity: f64,
    );

    fn fill_polygon(&mut self, points: &[Point], color: Color, opacity: f64);

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64, opacity: f64);

    /// Draw `text` with its baseline at `origin.y`.
    fn text(&mut self, text: &str, origin: Point, font: &Font, color: Color, anchor: TextAnchor);
}

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect { rect: Rect, color: Color, opacity: f64 },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    Arc { center: Point, radius: f64, start_radians: f64, extent_radians: f64, thickness: f64, color: Color, opacity: f64 },
    Polygon { points: Vec<Point>, color: Color, opacity: f64 },
    Line { from: Point, to: Point, color: Color, width: f64, opacity: f64 },
    Text { text: String, origin: Point, font_size: f64, color: Color, anchor: TextAnchor },
}

/// Canvas that keeps every call instead of drawing. Used for layout inspection and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    pub ops: Vec<DrawOp>,
    measure: ApproxTextMeasure,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arcs(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Arc { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl TextMeasure for RecordingCanvas {
    fn measure(&self, text: &str, font: &Font) -> TextMetrics {
        self.measure.measure(text, font)
    }
}

impl Canvas for RecordingCanvas {
    fn as_measure(&self) -> &dyn TextMeasure {
        self
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f64) {
        self.ops.push(DrawOp::FillRect { rect, color, opacity });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.ops.push(DrawOp::StrokeRect { rect, color, width });
    }

    fn stroke_arc(
        &mut self,
        center: Point,
        radius: f64,
        start_radians: f64,
        extent_radians: f64,
        thickness: f64,
        color: Color,
        opacity: f64,
    ) {
        self.ops.push(DrawOp::Arc { center, radius, start_radians, extent_radians, thickness, color, opacity });
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color, opacity: f64) {
        self.ops.push(DrawOp::Polygon { points: points.to_vec(), color, opacity });
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64, opacity: f64) {
        self.ops.push(DrawOp::Line { from, to, color, width, opacity });
    }

    fn text(&mut self, text: &str, origin: Point, font: &Font, color: Color, anchor: TextAnchor) {
        self.ops.push(DrawOp::Text { text: text.to_string(), origin, font_size: font.size, color, anchor });
    }
}
