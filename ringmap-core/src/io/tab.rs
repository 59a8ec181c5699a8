//! Tab-delimited feature tables.
//!
//! ```text
//! #pUC19
//! %2686
//! !strand  slot  start  stop  type      label
//! forward  1     146    469   gene      lacZ alpha
//! reverse  1     1626   2486  gene      bla
//! ```
//!
//! `#` sets the title, `%` the sequence length and `!` names the columns. Fields are separated
//! by tabs or by runs of two or more spaces. A field holding `-` or nothing takes its default.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::io::feature_types::{self, FEATURE_TYPES};
use crate::legend::{Legend, LegendItem};
use crate::map::{FeatureSpec, GenomeMap};
use crate::types::Strand;

pub const MAX_LABEL_LENGTH: usize = 50;
pub const MAX_MOUSEOVER_LENGTH: usize = 100;
pub const MAX_TITLE_LENGTH: usize = 50;
const LEGEND_BACKGROUND_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Strand,
    Slot,
    Start,
    Stop,
    Type,
    Opacity,
    Thickness,
    Radius,
    Label,
    Mouseover,
    Hyperlink,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    fn name(self) -> &'static str {
        match self {
            Column::Strand => "strand",
            Column::Slot => "slot",
            Column::Start => "start",
            Column::Stop => "stop",
            Column::Type => "type",
            Column::Opacity => "opacity",
            Column::Thickness => "thickness",
            Column::Radius => "radius",
            Column::Label => "label",
            Column::Mouseover => "mouseover",
            Column::Hyperlink => "hyperlink",
        }
    }

    const ALL: [Column; 11] = [
        Column::Strand,
        Column::Slot,
        Column::Start,
        Column::Stop,
        Column::Type,
        Column::Opacity,
        Column::Thickness,
        Column::Radius,
        Column::Label,
        Column::Mouseover,
        Column::Hyperlink,
    ];
    const REQUIRED: [Column; 5] = [Column::Strand, Column::Slot, Column::Start, Column::Stop, Column::Type];
}

/// One data line with its 1-based line number.
#[derive(Debug, Clone, PartialEq)]
pub struct TabRow {
    pub line: usize,
    pub strand: String,
    pub slot: i64,
    pub start: i64,
    pub stop: i64,
    pub feature_type: String,
    pub opacity: Option<f64>,
    pub thickness: Option<f64>,
    pub radius: Option<f64>,
    pub label: Option<String>,
    pub mouseover: Option<String>,
    pub hyperlink: Option<String>,
}

/// A parsed table before it becomes a map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabTable {
    pub title: Option<String>,
    pub length: Option<i64>,
    pub rows: Vec<TabRow>,
    /// Lines that could not be read; the rest of the table is still usable.
    pub errors: Vec<MapError>,
}

/// The map built from a feature table and the features that were left out.
#[derive(Debug, Clone)]
pub struct TableImport {
    pub map: GenomeMap,
    pub skipped: Vec<MapError>,
}

#[derive(Debug, Default)]
struct Header {
    columns: Vec<Option<Column>>,
}

impl Header {
    fn index(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == Some(column))
    }

    fn missing(&self) -> Option<Column> {
        Column::REQUIRED.into_iter().find(|c| self.index(*c).is_none())
    }
}

/// Read the lines of a table. Fails only on a bad length line or on data before a usable header.
pub fn parse_table(text: &str) -> MapResult<TabTable> {
    let mut table = TabTable::default();
    let mut header = Header::default();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        if let Some(title) = raw.strip_prefix('#') {
            table.title = Some(shorten(title.trim(), MAX_TITLE_LENGTH));
        } else if let Some(length) = raw.strip_prefix('%') {
            let length = length
                .trim()
                .parse::<i64>()
                .map_err(|_| MapError::parse(line_no, "There is a problem with the length value"))?;
            table.length = Some(length);
        } else if let Some(names) = raw.strip_prefix('!') {
            header.columns = split_fields(names, usize::MAX).iter().map(|name| Column::parse(name)).collect();
        } else {
            let fields = split_fields(raw, header.columns.len());
            if fields.len() >= 5 {
                if let Some(column) = header.missing() {
                    return Err(MapError::parse(
                        line_no,
                        format!("A \"{}\" column has not been defined", column.name()),
                    ));
                }
                match read_row(&header, &fields, line_no) {
                    Ok(row) => table.rows.push(row),
                    Err(err) => table.errors.push(err),
                }
            } else if fields.len() > 2 {
                table.errors.push(MapError::parse(line_no, "The contents of the line could not be parsed"));
            }
        }
    }
    log::debug!("Read {} feature lines, {} unreadable", table.rows.len(), table.errors.len());
    Ok(table)
}

fn read_row(header: &Header, fields: &[String], line: usize) -> MapResult<TabRow> {
    let field = |column: Column| header.index(column).and_then(|i| fields.get(i)).map(String::as_str);
    let required = |column: Column| {
        field(column).ok_or_else(|| MapError::parse(line, format!("Missing {} value", column.name())))
    };
    let integer = |column: Column| -> MapResult<i64> {
        let value = required(column)?;
        value
            .trim()
            .parse()
            .map_err(|_| MapError::parse(line, format!("'{}' is not a whole number", value)))
    };
    let optional = |column: Column| field(column).map(str::trim).filter(|v| !v.is_empty() && *v != "-");
    let decimal = |column: Column| -> MapResult<Option<f64>> {
        optional(column)
            .map(|v| v.parse().map_err(|_| MapError::parse(line, format!("'{}' is not a number", v))))
            .transpose()
    };

    Ok(TabRow {
        line,
        strand: required(Column::Strand)?.trim().to_string(),
        slot: integer(Column::Slot)?,
        start: integer(Column::Start)?,
        stop: integer(Column::Stop)?,
        feature_type: required(Column::Type)?.trim().to_string(),
        opacity: decimal(Column::Opacity)?,
        thickness: decimal(Column::Thickness)?,
        radius: decimal(Column::Radius)?,
        label: optional(Column::Label).map(|v| shorten(v, MAX_LABEL_LENGTH)),
        mouseover: optional(Column::Mouseover).map(|v| shorten(v, MAX_MOUSEOVER_LENGTH)),
        hyperlink: optional(Column::Hyperlink).map(str::to_string),
    })
}

impl TabRow {
    /// Resolve the strand and feature type into a placeable feature. Returns the type key too.
    pub fn to_spec(&self) -> MapResult<(FeatureSpec, &'static str)> {
        let strand: Strand = self.strand.parse().map_err(|_| {
            MapError::parse(self.line, "The strand value must be \"forward\" or \"reverse\"")
        })?;
        let name = feature_types::resolve_type_name(&self.feature_type, strand);
        let (feature_type, decoration) = feature_types::style_for(&name, strand)?;

        let mut spec = FeatureSpec::new(strand, self.slot, self.start, self.stop);
        spec.color = feature_type.color;
        spec.decoration = decoration;
        spec.opacity = self.opacity.unwrap_or(1.0);
        spec.proportion_of_thickness = self.thickness.unwrap_or(1.0);
        spec.radius_adjustment = self.radius.unwrap_or(0.0);
        spec.label = self.label.clone();
        spec.mouseover = self.mouseover.clone();
        spec.hyperlink = self.hyperlink.clone();
        spec.show_shading = !matches!(self.slot, 5 | 6);
        Ok((spec, feature_type.key))
    }
}

impl TabTable {
    /// Build the map. Features that fail validation are logged and returned in `skipped`.
    pub fn into_map(self, config: MapConfig) -> MapResult<TableImport> {
        let length = self.length.ok_or_else(|| MapError::invalid_value("length", "no sequence length line (%) was found"))?;
        let mut map = GenomeMap::new(length, config)?;
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            map = map.with_title(title);
        }

        let mut skipped = self.errors;
        let mut used_types = BTreeSet::new();
        for row in &self.rows {
            let placed = row.to_spec().and_then(|(spec, key)| map.add_feature(spec).map(|_| key));
            match placed {
                Ok(key) => {
                    used_types.insert(key);
                }
                Err(err) => {
                    log::warn!("Skipping feature on line {}: {}", row.line, err);
                    skipped.push(err);
                }
            }
        }

        if map.config().draw_legend && !used_types.is_empty() {
            map.add_legend(type_legend(map.config(), &used_types));
        }
        log::info!(
            "Loaded {} features into {} slots ({} skipped)",
            map.registry().feature_count(),
            map.registry().slot_count(),
            skipped.len()
        );
        Ok(TableImport { map, skipped })
    }
}

/// Empty legend styled for feature type swatches.
pub(crate) fn feature_legend(config: &MapConfig) -> Legend {
    let font = config.scaled_for(0).legend_font;
    let mut legend = Legend::new(config.legend_position, font, config.text_color);
    legend.allow_label_clash = config.legend_allow_label_clash;
    legend.background = Some(config.background_color);
    legend.background_opacity = LEGEND_BACKGROUND_OPACITY;
    legend
}

/// Swatch legend of the feature types in use, genes first and the rest in name order.
fn type_legend(config: &MapConfig, used: &BTreeSet<&'static str>) -> Legend {
    let mut legend = feature_legend(config);

    let genes = ["forward_gene", "reverse_gene"];
    let ordered = genes
        .iter()
        .filter(|key| used.contains(*key))
        .copied()
        .chain(used.iter().copied().filter(|key| !genes.contains(key)));
    for key in ordered {
        if let Some(t) = FEATURE_TYPES.iter().find(|t| t.key == key) {
            legend.push(LegendItem::with_swatch(t.legend_name, t.color));
        }
    }
    legend
}

pub fn read_tab_str(text: &str, config: MapConfig) -> MapResult<TableImport> {
    parse_table(text)?.into_map(config)
}

pub fn read_tab_file(path: &Path, config: MapConfig) -> Result<TableImport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    read_tab_str(&text, config).with_context(|| format!("Failed to load feature table {}", path.display()))
}

/// Split on tab runs. When that does not give `expected` fields, also split on runs of two or
/// more spaces.
pub(crate) fn split_fields(line: &str, expected: usize) -> Vec<String> {
    let by_tabs: Vec<String> = line
        .split('\t')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if by_tabs.len() == expected {
        return by_tabs;
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut gap = String::new();
    for ch in line.chars() {
        if ch.is_whitespace() {
            gap.push(ch);
            continue;
        }
        if !gap.is_empty() {
            let separates = gap.contains('\t') || gap.chars().count() >= 2;
            if separates {
                if !current.is_empty() {
                    fields.push(std::mem::take(&mut current));
                }
            } else if !current.is_empty() {
                current.push_str(&gap);
            }
            gap.clear();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        fields.push(current);
    }
    fields
}

pub(crate) fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut short: String = text.chars().take(max).collect();
        short.push_str("...");
        short
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Decoration;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const PUC19: &str = "#pUC19\n%2686\n!strand\tslot\tstart\tstop\ttype\tlabel\tmouseover\n\
forward\t1\t146\t469\tgene\tlacZ alpha\t-\n\
reverse\t1\t1626\t2486\tgene\tbla\tbeta-lactamase\n\
forward\t2\t2000\t200\tmisc\t-\t-\n";

    #[test]
    fn test_split_fields_on_tabs_and_spaces() {
        assert_eq!(split_fields("a\tb\t\tc", 3), vec!["a", "b", "c"]);
        assert_eq!(split_fields("forward  1   10  20  gene  lac Z", 6), vec!["forward", "1", "10", "20", "gene", "lac Z"]);
        assert_eq!(split_fields("  ", 5), Vec::<String>::new());
    }

    #[test]
    fn test_parse_table_reads_headers() {
        let table = parse_table(PUC19).unwrap();
        assert_eq!(table.title.as_deref(), Some("pUC19"));
        assert_eq!(table.length, Some(2686));
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0].label.as_deref(), Some("lacZ alpha"));
        assert_eq!(table.rows[0].mouseover, None);
        assert_eq!(table.rows[1].mouseover.as_deref(), Some("beta-lactamase"));
        assert_eq!(table.rows[2].stop, 200);
        assert!(table.errors.is_empty());
    }

    #[test]
    fn test_rows_become_styled_features() {
        let import = read_tab_str(PUC19, MapConfig::default()).unwrap();
        let map = &import.map;
        assert!(import.skipped.is_empty());
        assert_eq!(map.title.as_deref(), Some("pUC19"));
        assert_eq!(map.registry().feature_count(), 3);

        let reverse = &map.registry().slots(Strand::Reverse)[0].features()[0];
        assert_eq!(reverse.decoration, Decoration::CounterclockwiseArrow);
        assert_eq!(reverse.color, feature_types::named_color("blue").unwrap());

        let legend = &map.legends()[0];
        let names: Vec<_> = legend.items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(names, vec!["Forward gene", "Reverse gene", "Miscellaneous"]);
    }

    #[test]
    fn test_bad_features_are_skipped() {
        let text = "%1000\n!strand\tslot\tstart\tstop\ttype\n\
forward\t1\t10\t20\tpromoter\n\
forward\t1\t10\t2000\tpromoter\n\
forward\t9\t10\t20\tpromoter\n\
sideways\t1\t10\t20\tpromoter\n\
forward\t1\t30\t40\texon\n\
forward\tone\t30\t40\tmisc\n";
        let import = read_tab_str(text, MapConfig::default()).unwrap();
        assert_eq!(import.map.registry().feature_count(), 1);
        assert_eq!(import.skipped.len(), 5);
        assert!(import.skipped.contains(&MapError::feature_range(10, 2000, 1000)));
        assert!(import.skipped.contains(&MapError::invalid_slot(9, 6)));
        assert!(import.skipped.contains(&MapError::unknown_feature_type("exon")));
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let text = "%1000\n!strand\tslot\tstart\tstop\tlabel\nforward\t1\t10\t20\tx\n";
        assert!(matches!(parse_table(text), Err(MapError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_missing_length_is_fatal() {
        let text = "!strand\tslot\tstart\tstop\ttype\nforward\t1\t10\t20\tmisc\n";
        assert!(read_tab_str(text, MapConfig::default()).is_err());
        assert!(parse_table("%abc\n").is_err());
    }

    #[test]
    fn test_long_text_is_shortened() {
        let label = "x".repeat(60);
        let text = format!("%1000\n!strand\tslot\tstart\tstop\ttype\tlabel\nforward\t1\t10\t20\tmisc\t{}\n", label);
        let table = parse_table(&text).unwrap();
        let shortened = table.rows[0].label.as_deref().unwrap();
        assert_eq!(shortened.len(), MAX_LABEL_LENGTH + 3);
        assert!(shortened.ends_with("..."));
    }

    #[test]
    fn test_outer_slots_draw_flat() {
        let text = "%1000\n!strand\tslot\tstart\tstop\ttype\nforward\t5\t10\t20\tmisc\nforward\t1\t10\t20\tmisc\n";
        let import = read_tab_str(text, MapConfig::default()).unwrap();
        let slots = import.map.registry().slots(Strand::Direct);
        assert!(slots[0].features()[0].show_shading);
        assert!(!slots[4].features()[0].show_shading);
    }

    #[test]
    fn test_read_tab_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(PUC19.as_bytes()).unwrap();
        let import = read_tab_file(file.path(), MapConfig::default()).unwrap();
        assert_eq!(import.map.sequence_length(), 2686);

        let missing = read_tab_file(Path::new("/nonexistent/table.tab"), MapConfig::default());
        assert!(missing.unwrap_err().to_string().contains("Failed to read"));
    }
}
