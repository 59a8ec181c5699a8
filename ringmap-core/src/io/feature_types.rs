//! Feature type vocabulary of the tab-delimited format: named colors, and per type the arc
//! color, the decoration on each strand and the legend caption.

use crate::error::{MapError, MapResult};
use crate::types::{Color, Decoration, Strand};

pub const NAMED_COLORS: [(&str, Color); 21] = [
    ("black", Color::rgb(0, 0, 0)),
    ("silver", Color::rgb(192, 192, 192)),
    ("gray", Color::rgb(128, 128, 128)),
    ("white", Color::rgb(255, 255, 255)),
    ("maroon", Color::rgb(128, 0, 0)),
    ("red", Color::rgb(255, 0, 0)),
    ("pink", Color::rgb(255, 153, 204)),
    ("purple", Color::rgb(128, 0, 128)),
    ("fuchsia", Color::rgb(255, 0, 255)),
    ("orange", Color::rgb(255, 153, 0)),
    ("green", Color::rgb(0, 128, 0)),
    ("spring", Color::rgb(204, 255, 204)),
    ("lime", Color::rgb(0, 255, 0)),
    ("olive", Color::rgb(128, 128, 0)),
    ("yellow", Color::rgb(255, 255, 0)),
    ("navy", Color::rgb(0, 0, 128)),
    ("blue", Color::rgb(0, 0, 255)),
    ("azure", Color::rgb(51, 153, 255)),
    ("lightBlue", Color::rgb(102, 204, 255)),
    ("teal", Color::rgb(153, 255, 204)),
    ("aqua", Color::rgb(0, 255, 255)),
];

/// Look up a named color, case-insensitively.
pub fn named_color(name: &str) -> Option<Color> {
    NAMED_COLORS.iter().find(|(n, _)| n.eq_ignore_ascii_case(name)).map(|&(_, c)| c)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureType {
    pub key: &'static str,
    pub legend_name: &'static str,
    pub color: Color,
    /// `None` when the type cannot appear on that strand.
    pub direct: Option<Decoration>,
    pub reverse: Option<Decoration>,
}

impl FeatureType {
    pub fn decoration(&self, strand: Strand) -> Option<Decoration> {
        match strand {
            Strand::Direct => self.direct,
            Strand::Reverse => self.reverse,
        }
    }
}

const fn kind(key: &'static str, legend_name: &'static str, color: Color, arrow: bool) -> FeatureType {
    let (direct, reverse) = if arrow {
        (Decoration::ClockwiseArrow, Decoration::CounterclockwiseArrow)
    } else {
        (Decoration::Standard, Decoration::Standard)
    };
    FeatureType { key, legend_name, color, direct: Some(direct), reverse: Some(reverse) }
}

pub const FEATURE_TYPES: [FeatureType; 15] = [
    FeatureType {
        key: "forward_gene",
        legend_name: "Forward gene",
        color: Color::rgb(255, 0, 0),
        direct: Some(Decoration::ClockwiseArrow),
        reverse: None,
    },
    FeatureType {
        key: "reverse_gene",
        legend_name: "Reverse gene",
        color: Color::rgb(0, 0, 255),
        direct: None,
        reverse: Some(Decoration::CounterclockwiseArrow),
    },
    kind("origin_of_replication", "Origin of replication", Color::rgb(0, 0, 0), false),
    kind("promoter", "Promoter", Color::rgb(0, 128, 0), true),
    kind("terminator", "Terminator", Color::rgb(128, 0, 0), false),
    kind("regulatory_sequence", "Regulatory sequence", Color::rgb(128, 128, 0), false),
    kind("unique_restriction_site", "Unique restriction site", Color::rgb(128, 0, 128), false),
    kind("restriction_site", "Restriction site", Color::rgb(51, 153, 255), false),
    kind("open_reading_frame", "Open reading frame", Color::rgb(255, 153, 204), true),
    kind("predicted_gene", "Predicted gene", Color::rgb(255, 153, 0), true),
    kind("sequence_similarity", "Sequence similarity", Color::rgb(192, 192, 192), false),
    kind("score", "Score", Color::rgb(255, 0, 255), false),
    kind("score_II", "Score II", Color::rgb(128, 128, 128), false),
    kind("misc", "Miscellaneous", Color::rgb(128, 128, 128), false),
    kind("primer", "Primer", Color::rgb(153, 255, 204), true),
];

/// `gene` becomes `forward_gene` or `reverse_gene`; other names pass through.
pub fn resolve_type_name(name: &str, strand: Strand) -> String {
    if name.eq_ignore_ascii_case("gene") {
        match strand {
            Strand::Direct => "forward_gene".to_string(),
            Strand::Reverse => "reverse_gene".to_string(),
        }
    } else {
        name.to_string()
    }
}

pub fn lookup(name: &str) -> MapResult<&'static FeatureType> {
    FEATURE_TYPES
        .iter()
        .find(|t| t.key.eq_ignore_ascii_case(name))
        .ok_or_else(|| MapError::unknown_feature_type(name))
}

/// Color and decoration of `name` on `strand`.
pub fn style_for(name: &str, strand: Strand) -> MapResult<(&'static FeatureType, Decoration)> {
    let feature_type = lookup(name)?;
    let decoration = feature_type.decoration(strand).ok_or_else(|| MapError::unknown_feature_type(name))?;
    Ok((feature_type, decoration))
}
