//! Final rectangles of drawn labels, kept for hit testing and image-map export.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::types::BasePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsKind {
    Ruler,
    Feature,
    Button,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelBounds {
    pub kind: BoundsKind,
    pub bounds: Rect,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hyperlink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mouseover: Option<String>,
    /// Sequence position nearest to the label.
    pub base: BasePos,
    /// Cleared by consumers that drop a record without removing it.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl LabelBounds {
    pub fn new<S: Into<String>>(kind: BoundsKind, bounds: Rect, label: S, base: BasePos) -> Self {
        Self { kind, bounds, label: label.into(), hyperlink: None, mouseover: None, base, active: true }
    }

    pub fn with_links(mut self, hyperlink: Option<String>, mouseover: Option<String>) -> Self {
        self.hyperlink = hyperlink;
        self.mouseover = mouseover;
        self
    }
}

/// Records whose rectangle contains the point, topmost (last drawn) first.
pub fn hit_test(records: &[LabelBounds], x: f64, y: f64) -> impl Iterator<Item = &LabelBounds> {
    records
        .iter()
        .rev()
        .filter(move |r| r.active && r.bounds.contains_point(Point::new(x, y)))
}

pub fn to_json(records: &[LabelBounds]) -> Result<String> {
    serde_json::to_string_pretty(records).context("Failed to serialize label bounds")
}

pub fn save_json(records: &[LabelBounds], path: &Path) -> Result<()> {
    let json = to_json(records)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write label bounds to {}", path.display()))?;
    log::info!("Wrote {} label bounds to {}", records.len(), path.display());
    Ok(())
}

pub fn load_json(path: &Path) -> Result<Vec<LabelBounds>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read label bounds from {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse label bounds in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<LabelBounds> {
        vec![
            LabelBounds::new(BoundsKind::Ruler, Rect::new(0.0, 0.0, 20.0, 10.0), "1 kbp", 1000),
            LabelBounds::new(BoundsKind::Feature, Rect::new(10.0, 5.0, 40.0, 12.0), "lacZ", 2500)
                .with_links(Some("https://example.org/lacZ".to_string()), None),
        ]
    }

    #[test]
    fn test_hit_test_prefers_last_drawn() {
        let records = sample();
        let hits: Vec<_> = hit_test(&records, 15.0, 8.0).map(|r| r.label.as_str()).collect();
        assert_eq!(hits, vec!["lacZ", "1 kbp"]);
        assert_eq!(hit_test(&records, 100.0, 100.0).count(), 0);
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bounds.json");
        let records = sample();
        save_json(&records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"kind\": \"feature\""));
        assert!(!text.contains("mouseover"));
        assert_eq!(load_json(&path).unwrap(), records);
    }
}
