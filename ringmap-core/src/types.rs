use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MapError;

/// Sequence position, 1-based.
pub type BasePos = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Direct,
    Reverse,
}

impl From<bool> for Strand {
    fn from(direct: bool) -> Self {
        if direct {
            Strand::Direct
        } else {
            Strand::Reverse
        }
    }
}

impl From<Strand> for bool {
    fn from(strand: Strand) -> Self {
        matches!(strand, Strand::Direct)
    }
}

impl From<Strand> for char {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Direct => '+',
            Strand::Reverse => '-',
        }
    }
}

impl FromStr for Strand {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "+" | "forward" | "direct" => Ok(Strand::Direct),
            "-" | "reverse" => Ok(Strand::Reverse),
            other => Err(MapError::invalid_value(
                "strand",
                format!("'{}' (expected forward, reverse, + or -)", other),
            )),
        }
    }
}

/// How a feature arc is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    #[default]
    Standard,
    ClockwiseArrow,
    CounterclockwiseArrow,
    Hidden,
}

/// Label visibility of a feature or range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    #[default]
    Show,
    Hidden,
    Forced,
}

impl LabelMode {
    pub fn is_forced(self) -> bool {
        matches!(self, LabelMode::Forced)
    }
}

/// Three-way switch used by the inner label and feature position modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Show,
    Hide,
    #[default]
    Auto,
}

impl Toggle {
    /// Resolves the switch; `Auto` turns on only for zoomed maps.
    pub fn resolve(self, zoomed: bool) -> bool {
        match self {
            Toggle::Show => true,
            Toggle::Hide => false,
            Toggle::Auto => zoomed,
        }
    }
}

impl FromStr for Toggle {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "show" | "true" | "yes" => Ok(Toggle::Show),
            "hide" | "false" | "no" => Ok(Toggle::Hide),
            "auto" => Ok(Toggle::Auto),
            other => Err(MapError::invalid_value("mode", format!("'{}' (expected show, hide or auto)", other))),
        }
    }
}

/// RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const NAVY: Color = Color::rgb(0, 0, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLUE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(MapError::invalid_value("color", format!("'{}' (expected #rrggbb)", s)));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
        Ok(Color::rgb(channel(0), channel(2), channel(4)))
    }
}

impl TryFrom<String> for Color {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_parsing() {
        assert_eq!("forward".parse::<Strand>().unwrap(), Strand::Direct);
        assert_eq!("+".parse::<Strand>().unwrap(), Strand::Direct);
        assert_eq!("Reverse".parse::<Strand>().unwrap(), Strand::Reverse);
        assert!("sideways".parse::<Strand>().is_err());
        assert_eq!(char::from(Strand::Reverse), '-');
    }

    #[test]
    fn test_color_hex() {
        let c: Color = "#ff9900".parse().unwrap();
        assert_eq!(c, Color::rgb(255, 153, 0));
        assert_eq!(c.to_hex(), "#ff9900");
        assert!("red".parse::<Color>().is_err());
    }

    #[test]
    fn test_toggle_resolution() {
        assert!(Toggle::Show.resolve(false));
        assert!(!Toggle::Hide.resolve(true));
        assert!(!Toggle::Auto.resolve(false));
        assert!(Toggle::Auto.resolve(true));
    }
}
