//! RingMap Core Library
//!
//! Slot packing and radial label layout for circular genome maps, plus the map orchestrator and
//! the tab-delimited feature table reader. Drawing goes through the [`Canvas`] trait.

pub mod types;
pub mod error;
pub mod geometry;
pub mod interval;
pub mod text;
pub mod canvas;
pub mod config;
pub mod context;
pub mod feature;
pub mod slot;
pub mod label;
pub mod placement;
pub mod legend;
pub mod bounds;
pub mod ruler;
pub mod map;
pub mod io;

// Re-export commonly used types
pub use types::{BasePos, Color, Decoration, LabelMode, Strand, Toggle};
pub use error::{MapError, MapResult};
pub use geometry::{Point, Rect};
pub use text::{ApproxTextMeasure, Font, TextMeasure, TextMetrics};
pub use canvas::{Canvas, DrawOp, RecordingCanvas, TextAnchor};
pub use config::{LabelQuality, MapConfig, MapSizes};
pub use context::LayoutContext;
pub use feature::{Feature, FeatureRange};
pub use slot::{FeatureSlot, SlotRegistry};
pub use label::{Label, LabelSide};
pub use placement::{LabelPlacer, PlacementReport};
pub use legend::{Legend, LegendItem, LegendPosition};
pub use bounds::{BoundsKind, LabelBounds};
pub use map::{FeatureSpec, GenomeMap, RenderOutput, SlotSummary};

/// Version information for the RingMap core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
