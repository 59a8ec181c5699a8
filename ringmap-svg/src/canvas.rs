//! SVG drawing surface.

use std::f64::consts::PI;
use std::fmt::Write as _;

use ringmap_core::{ApproxTextMeasure, Canvas, Color, Font, Point, Rect, TextAnchor, TextMeasure, TextMetrics};

/// Arcs at least this close to a full turn are written as circles.
const FULL_TURN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct SvgCanvas {
    width: f64,
    height: f64,
    font_family: String,
    elements: Vec<String>,
    measure: ApproxTextMeasure,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32, font_family: &str) -> Self {
        Self {
            width: width as f64,
            height: height as f64,
            font_family: font_family.to_string(),
            elements: Vec::new(),
            measure: ApproxTextMeasure::default(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Full document: XML header, the `comments`, then every element in drawing order.
    pub fn to_document(&self, comments: &[String]) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let _ = writeln!(
            out,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = self.width,
            h = self.height
        );
        for comment in comments {
            for line in comment.lines() {
                let _ = writeln!(out, "  <!-- {} -->", line.replace("--", "- -"));
            }
        }
        for element in &self.elements {
            let _ = writeln!(out, "  {}", element);
        }
        out.push_str("</svg>\n");
        out
    }
}

impl TextMeasure for SvgCanvas {
    fn measure(&self, text: &str, font: &Font) -> TextMetrics {
        self.measure.measure(text, font)
    }
}

impl Canvas for SvgCanvas {
    fn as_measure(&self) -> &dyn TextMeasure {
        self
    }

    fn fill_rect(&mut self, rect: Rect, color: Color, opacity: f64) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            color,
            opacity_attr("fill-opacity", opacity)
        ));
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f64) {
        self.elements.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            num(rect.x),
            num(rect.y),
            num(rect.width),
            num(rect.height),
            color,
            num(width)
        ));
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
        if radius <= 0.0 || thickness <= 0.0 || extent_radians == 0.0 {
            return;
        }
        let stroke = format!(
            r#"fill="none" stroke="{}" stroke-width="{}"{}"#,
            color,
            num(thickness),
            opacity_attr("stroke-opacity", opacity)
        );
        if extent_radians.abs() >= 2.0 * PI - FULL_TURN_EPSILON {
            self.elements.push(format!(
                r#"<circle cx="{}" cy="{}" r="{}" {}/>"#,
                num(center.x),
                num(center.y),
                num(radius),
                stroke
            ));
            return;
        }
        let from = Point::polar(center, radius, start_radians);
        let to = Point::polar(center, radius, start_radians + extent_radians);
        let large_arc = u8::from(extent_radians.abs() > PI);
        let sweep = u8::from(extent_radians > 0.0);
        self.elements.push(format!(
            r#"<path d="M {} {} A {r} {r} 0 {} {} {} {}" {} stroke-linecap="butt"/>"#,
            num(from.x),
            num(from.y),
            large_arc,
            sweep,
            num(to.x),
            num(to.y),
            stroke,
            r = num(radius)
        ));
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color, opacity: f64) {
        if points.len() < 3 {
            return;
        }
        let coords: Vec<String> = points.iter().map(|p| format!("{},{}", num(p.x), num(p.y))).collect();
        self.elements.push(format!(
            r#"<polygon points="{}" fill="{}"{}/>"#,
            coords.join(" "),
            color,
            opacity_attr("fill-opacity", opacity)
        ));
    }

    fn line(&mut self, from: Point, to: Point, color: Color, width: f64, opacity: f64) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"{}/>"#,
            num(from.x),
            num(from.y),
            num(to.x),
            num(to.y),
            color,
            num(width),
            opacity_attr("stroke-opacity", opacity)
        ));
    }

    fn text(&mut self, text: &str, origin: Point, font: &Font, color: Color, anchor: TextAnchor) {
        let anchor = match anchor {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        };
        let weight = if font.bold { r#" font-weight="bold""# } else { "" };
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}px"{} text-anchor="{}" fill="{}">{}</text>"#,
            num(origin.x),
            num(origin.y),
            escape(&self.font_family),
            num(font.size),
            weight,
            anchor,
            color,
            escape(text)
        ));
    }
}

/// Two decimals, without trailing zeros.
fn num(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn opacity_attr(name: &str, opacity: f64) -> String {
    if opacity >= 1.0 {
        String::new()
    } else {
        format!(r#" {}="{}""#, name, num(opacity.max(0.0)))
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
