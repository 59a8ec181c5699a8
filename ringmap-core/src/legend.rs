//! Legends: boxes of stacked entries anchored to one of eleven canvas positions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, TextAnchor};
use crate::error::MapError;
use crate::geometry::{Point, Rect};
use crate::text::{Font, TextMeasure};
use crate::types::Color;

/// Space between the legend border and its items, and between the legend and the canvas edge.
pub const LEGEND_PADDING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    UpperLeft,
    UpperCenter,
    #[default]
    UpperRight,
    MiddleLeft,
    MiddleLeftOfCenter,
    MiddleCenter,
    MiddleRightOfCenter,
    MiddleRight,
    LowerLeft,
    LowerCenter,
    LowerRight,
}

impl LegendPosition {
    pub const ALL: [LegendPosition; 11] = [
        LegendPosition::UpperLeft,
        LegendPosition::UpperCenter,
        LegendPosition::UpperRight,
        LegendPosition::MiddleLeft,
        LegendPosition::MiddleLeftOfCenter,
        LegendPosition::MiddleCenter,
        LegendPosition::MiddleRightOfCenter,
        LegendPosition::MiddleRight,
        LegendPosition::LowerLeft,
        LegendPosition::LowerCenter,
        LegendPosition::LowerRight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LegendPosition::UpperLeft => "upper-left",
            LegendPosition::UpperCenter => "upper-center",
            LegendPosition::UpperRight => "upper-right",
            LegendPosition::MiddleLeft => "middle-left",
            LegendPosition::MiddleLeftOfCenter => "middle-left-of-center",
            LegendPosition::MiddleCenter => "middle-center",
            LegendPosition::MiddleRightOfCenter => "middle-right-of-center",
            LegendPosition::MiddleRight => "middle-right",
            LegendPosition::LowerLeft => "lower-left",
            LegendPosition::LowerCenter => "lower-center",
            LegendPosition::LowerRight => "lower-right",
        }
    }

    /// Top-left corner of a `width`×`height` legend on a canvas of the given size.
    fn origin(self, canvas_width: f64, canvas_height: f64, width: f64, height: f64) -> Point {
        let (cx, cy) = (canvas_width / 2.0, canvas_height / 2.0);
        let left = LEGEND_PADDING;
        let right = canvas_width - width - LEGEND_PADDING;
        let top = LEGEND_PADDING;
        let bottom = canvas_height - height - LEGEND_PADDING;
        let middle = cy - height / 2.0;
        let (x, y) = match self {
            LegendPosition::UpperLeft => (left, top),
            LegendPosition::UpperCenter => (cx - width / 2.0, top),
            LegendPosition::UpperRight => (right, top),
            LegendPosition::MiddleLeft => (left, middle),
            LegendPosition::MiddleLeftOfCenter => (cx - width, middle),
            LegendPosition::MiddleCenter => (cx - width / 2.0, middle),
            LegendPosition::MiddleRightOfCenter => (cx, middle),
            LegendPosition::MiddleRight => (right, middle),
            LegendPosition::LowerLeft => (left, bottom),
            LegendPosition::LowerCenter => (cx - width / 2.0, bottom),
            LegendPosition::LowerRight => (right, bottom),
        };
        Point::new(x, y)
    }
}

impl fmt::Display for LegendPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LegendPosition {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        LegendPosition::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| MapError::invalid_value("legend position", format!("'{}' is not a legend position", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub text: String,
    /// Color swatch drawn left of the text.
    pub swatch: Option<Color>,
    pub swatch_opacity: f64,
    pub font: Option<Font>,
    pub text_color: Option<Color>,
}

impl LegendItem {
    pub fn text_only<S: Into<String>>(text: S) -> Self {
        Self { text: text.into(), swatch: None, swatch_opacity: 1.0, font: None, text_color: None }
    }

    pub fn with_swatch<S: Into<String>>(text: S, color: Color) -> Self {
        Self { swatch: Some(color), ..Self::text_only(text) }
    }

    pub fn label(&self) -> &str {
        if self.text.trim().is_empty() {
            "Untitled"
        } else {
            &self.text
        }
    }

    fn font<'a>(&'a self, legend_font: &'a Font) -> &'a Font {
        self.font.as_ref().unwrap_or(legend_font)
    }

    pub fn height(&self, measure: &dyn TextMeasure, legend_font: &Font) -> f64 {
        measure.measure(self.label(), self.font(legend_font)).height
    }

    /// Text width plus one and a half swatch widths when a swatch is shown.
    pub fn width(&self, measure: &dyn TextMeasure, legend_font: &Font, swatch: f64) -> f64 {
        let text = measure.measure(self.label(), self.font(legend_font)).width;
        if self.swatch.is_some() {
            text + swatch * 1.5
        } else {
            text
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub position: LegendPosition,
    pub font: Font,
    pub text_color: Color,
    /// Fill behind the items; the map background when unset.
    pub background: Option<Color>,
    pub background_opacity: f64,
    pub alignment: ItemAlignment,
    pub allow_label_clash: bool,
    pub draw_when_zoomed: bool,
    items: Vec<LegendItem>,
    too_large: bool,
}

impl Legend {
    pub fn new(position: LegendPosition, font: Font, text_color: Color) -> Self {
        Self {
            position,
            font,
            text_color,
            background: None,
            background_opacity: 1.0,
            alignment: ItemAlignment::Left,
            allow_label_clash: false,
            draw_when_zoomed: true,
            items: Vec::new(),
            too_large: false,
        }
    }

    pub fn push(&mut self, item: LegendItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[LegendItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Shared swatch side: the tallest swatch item.
    pub fn swatch_height(&self, measure: &dyn TextMeasure) -> f64 {
        self.items
            .iter()
            .filter(|item| item.swatch.is_some())
            .map(|item| item.height(measure, &self.font))
            .fold(0.0, f64::max)
    }

    pub fn width(&self, measure: &dyn TextMeasure) -> f64 {
        let swatch = self.swatch_height(measure);
        let widest = self.items.iter().map(|item| item.width(measure, &self.font, swatch)).fold(0.0, f64::max);
        widest + 2.0 * LEGEND_PADDING
    }

    /// Item heights (swatch items use the shared swatch height), a half-height gap above every
    /// item after the first, and padding on both ends.
    pub fn height(&self, measure: &dyn TextMeasure) -> f64 {
        let swatch = self.swatch_height(measure);
        let content: f64 = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let h = self.item_height(item, measure, swatch);
                if i == 0 {
                    h
                } else {
                    h * 1.5
                }
            })
            .sum();
        content + 2.0 * LEGEND_PADDING
    }

    fn item_height(&self, item: &LegendItem, measure: &dyn TextMeasure, swatch: f64) -> f64 {
        if item.swatch.is_some() {
            swatch
        } else {
            item.height(measure, &self.font)
        }
    }

    pub fn bounds(&self, canvas_width: f64, canvas_height: f64, measure: &dyn TextMeasure) -> Rect {
        let (width, height) = (self.width(measure), self.height(measure));
        let origin = self.position.origin(canvas_width, canvas_height, width, height);
        Rect::new(origin.x, origin.y, width, height)
    }

    pub fn fits(&self, canvas_width: f64, canvas_height: f64, measure: &dyn TextMeasure) -> bool {
        self.width(measure) <= canvas_width && self.height(measure) <= canvas_height
    }

    /// Mark a legend that cannot fit the canvas: it is not drawn and labels may cover its area.
    pub fn check_size(&mut self, canvas_width: f64, canvas_height: f64, measure: &dyn TextMeasure) -> bool {
        self.too_large = !self.fits(canvas_width, canvas_height, measure);
        if self.too_large {
            log::warn!("A legend was removed because it is too large for the canvas");
        }
        !self.too_large
    }

    pub fn is_too_large(&self) -> bool {
        self.too_large
    }

    pub fn permits_label_clash(&self) -> bool {
        self.allow_label_clash || self.too_large
    }

    /// Draw the legend bottom-up. Returns false when nothing was drawn.
    pub fn draw(&self, canvas: &mut dyn Canvas, canvas_width: f64, canvas_height: f64, zoomed: bool, background: Color) -> bool {
        if self.items.is_empty() || self.too_large || (zoomed && !self.draw_when_zoomed) {
            return false;
        }
        let measure = canvas.as_measure();
        let bounds = self.bounds(canvas_width, canvas_height, measure);
        let swatch = self.swatch_height(measure);
        let placements: Vec<(&LegendItem, Point, f64)> = {
            let mut y = bounds.max_y() - LEGEND_PADDING;
            let x = bounds.x + LEGEND_PADDING;
            self.items
                .iter()
                .rev()
                .map(|item| {
                    let h = self.item_height(item, measure, swatch);
                    let placed = (item, Point::new(x, y), h);
                    y -= h * 1.5;
                    placed
                })
                .collect()
        };
        let inner_width = bounds.width - 2.0 * LEGEND_PADDING;

        canvas.fill_rect(bounds, self.background.unwrap_or(background), self.background_opacity);
        for (item, bottom_left, _) in placements {
            let font = item.font(&self.font).clone();
            let metrics = canvas.measure(item.label(), &font);
            let mut text_x = bottom_left.x - metrics.height / 12.0;
            let mut available = inner_width;
            if let Some(color) = item.swatch {
                let swatch_rect = Rect::new(bottom_left.x, bottom_left.y - swatch, swatch, swatch);
                canvas.fill_rect(swatch_rect, color, item.swatch_opacity);
                available -= swatch * 1.5;
                text_x = bottom_left.x + swatch * 1.5;
            }
            match self.alignment {
                ItemAlignment::Left => {}
                ItemAlignment::Center => text_x += available / 2.0 - metrics.width / 2.0,
                ItemAlignment::Right => text_x += available - metrics.width - metrics.height / 12.0,
            }
            let color = item.text_color.unwrap_or(self.text_color);
            let baseline = Point::new(text_x, bottom_left.y - metrics.descent);
            canvas.text(item.label(), baseline, &font, color, TextAnchor::Start);
        }
        true
    }
}
