//! Fonts and text measurement.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f64,
    pub bold: bool,
}

impl Font {
    pub fn new<S: Into<String>>(family: S, size: f64) -> Self {
        Self { family: family.into(), size, bold: false }
    }

    pub fn sans(size: f64) -> Self {
        Self::new("SansSerif", size)
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

impl Default for Font {
    fn default() -> Self {
        Self::sans(10.0)
    }
}

/// Extent of a laid-out string. `height` is `ascent + descent`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
    pub descent: f64,
}

/// Text measurement service borrowed by the layout engine.
pub trait TextMeasure {
    fn measure(&self, text: &str, font: &Font) -> TextMetrics;
}

/// Font-independent estimate: average glyph advance of 0.6 em, ascent 0.8 em, descent 0.2 em.
#[derive(Debug, Clone, Copy)]
pub struct ApproxTextMeasure {
    pub char_width: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self { char_width: 0.6, ascent: 0.8, descent: 0.2 }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, font: &Font) -> TextMetrics {
        let weight = if font.bold { 1.1 } else { 1.0 };
        let width = text.chars().count() as f64 * font.size * self.char_width * weight;
        let ascent = font.size * self.ascent;
        let descent = font.size * self.descent;
        TextMetrics { width, height: ascent + descent, ascent, descent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx_measure_scales_with_size() {
        let m = ApproxTextMeasure::default();
        let small = m.measure("gene", &Font::sans(10.0));
        let large = m.measure("gene", &Font::sans(20.0));
        assert!((small.width - 24.0).abs() < 1e-9);
        assert!((large.width - 2.0 * small.width).abs() < 1e-9);
        assert!((small.height - (small.ascent + small.descent)).abs() < 1e-9);
    }
}
