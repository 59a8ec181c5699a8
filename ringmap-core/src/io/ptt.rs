//! NCBI protein tables (`.ptt`).
//!
//! ```text
//! Escherichia coli O157:H7 plasmid pO157, complete sequence - 1..92721
//! 100 proteins
//! Location   Strand  Length  PID       Gene  Synonym   Code  COG       Product
//! 190..1101  +       303     10955266  repA  ECO57p01  L     COG5527L  replication protein
//! ```
//!
//! The sequence length comes from the `1..<length>` range that ends one of the first lines, and
//! that line is the title. Every protein becomes a gene arc in slot 1 of its strand. Proteins
//! with a functional category code get a second arc in slot 2, colored by category.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::MapConfig;
use crate::error::{MapError, MapResult};
use crate::io::tab::{feature_legend, shorten, split_fields, TableImport, MAX_LABEL_LENGTH, MAX_MOUSEOVER_LENGTH};
use crate::legend::{Legend, LegendItem};
use crate::map::{FeatureSpec, GenomeMap};
use crate::types::{Color, Decoration, Strand};

pub const PROTEIN_LINK: &str = "https://www.ncbi.nlm.nih.gov/protein/";
pub const MAX_PTT_TITLE_LENGTH: usize = 80;
const TITLE_LINES: usize = 5;
const HEADER_LINES: usize = 8;
/// Maps at least this large spell out category names in the legend.
const LONG_LEGEND_DIMENSION: u32 = 2000;

const FORWARD_GENE: Color = Color::rgb(249, 0, 0);
const REVERSE_GENE: Color = Color::rgb(19, 19, 255);

/// A COG functional category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CogCategory {
    pub code: char,
    pub name: &'static str,
    pub color: Color,
}

const fn cog(code: char, name: &'static str, color: Color) -> CogCategory {
    CogCategory { code, name, color }
}

pub const COG_CATEGORIES: [CogCategory; 18] = [
    cog('J', "Translation, ribosomal structure and biogenesis", Color::rgb(152, 0, 0)),
    cog('K', "Transcription", Color::rgb(255, 175, 100)),
    cog('L', "DNA replication, recombination and repair", Color::rgb(245, 222, 188)),
    cog('D', "Cell division and chromosome partitioning", Color::rgb(51, 255, 153)),
    cog('O', "Posttranslational modification, protein turnover, chaperones", Color::rgb(150, 199, 35)),
    cog('M', "Cell envelope biogenesis, outer membrane", Color::rgb(240, 245, 60)),
    cog('N', "Cell motility and secretion", Color::rgb(62, 217, 157)),
    cog('P', "Inorganic ion transport and metabolism", Color::rgb(185, 255, 134)),
    cog('T', "Signal transduction mechanisms", Color::rgb(0, 128, 0)),
    cog('C', "Energy production and conversion", Color::rgb(185, 74, 125)),
    cog('G', "Carbohydrate transport and metabolism", Color::rgb(152, 26, 206)),
    cog('E', "Amino acid transport and metabolism", Color::rgb(255, 79, 255)),
    cog('F', "Nucleotide transport and metabolism", Color::rgb(255, 204, 204)),
    cog('H', "Coenzyme metabolism", Color::rgb(179, 225, 234)),
    cog('I', "Lipid metabolism", Color::rgb(100, 255, 250)),
    cog('Q', "Secondary metabolites biosynthesis, transport and catabolism", Color::rgb(0, 0, 139)),
    cog('R', "General function prediction only", Color::rgb(179, 179, 179)),
    cog('S', "Function unknown", Color::rgb(240, 240, 240)),
];

pub fn cog_category(code: &str) -> Option<&'static CogCategory> {
    let mut chars = code.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => COG_CATEGORIES.iter().find(|cat| cat.code.eq_ignore_ascii_case(&c)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Location,
    Strand,
    Length,
    Pid,
    Gene,
    Synonym,
    Code,
    Cog,
    Product,
}

impl Column {
    fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }

    fn name(self) -> &'static str {
        match self {
            Column::Location => "Location",
            Column::Strand => "Strand",
            Column::Length => "Length",
            Column::Pid => "PID",
            Column::Gene => "Gene",
            Column::Synonym => "Synonym",
            Column::Code => "Code",
            Column::Cog => "COG",
            Column::Product => "Product",
        }
    }

    const ALL: [Column; 9] = [
        Column::Location,
        Column::Strand,
        Column::Length,
        Column::Pid,
        Column::Gene,
        Column::Synonym,
        Column::Code,
        Column::Cog,
        Column::Product,
    ];
    const REQUIRED: [Column; 3] = [Column::Location, Column::Strand, Column::Pid];
}

/// One protein line with its 1-based line number. Text fields holding `-` are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct PttRow {
    pub line: usize,
    pub location: String,
    pub start: i64,
    pub stop: i64,
    pub strand: Strand,
    pub pid: Option<String>,
    pub gene: Option<String>,
    pub synonym: Option<String>,
    pub code: Option<String>,
    pub cog: Option<String>,
    pub product: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PttTable {
    pub title: Option<String>,
    pub length: Option<i64>,
    pub rows: Vec<PttRow>,
    pub errors: Vec<MapError>,
}

/// Digits of a `0..N` or `1..N` range closing the line.
fn range_end(line: &str) -> Option<&str> {
    let line = line.trim_end();
    let head = line.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &line[head.len()..];
    let head = head.strip_suffix("..")?;
    (!digits.is_empty() && head.ends_with(|c: char| c == '0' || c == '1')).then_some(digits)
}

/// First `start..stop` pair in a location field.
fn location_range(text: &str) -> Option<(i64, i64)> {
    let (head, tail) = text.split_once("..")?;
    let start = head.rsplit(|c: char| !c.is_ascii_digit()).next()?;
    let stop = tail.split(|c: char| !c.is_ascii_digit()).next()?;
    Some((start.parse().ok()?, stop.parse().ok()?))
}

fn is_header(fields: &[String]) -> bool {
    fields
        .windows(2)
        .any(|w| w[0].eq_ignore_ascii_case("Location") && w[1].eq_ignore_ascii_case("Strand"))
}

pub fn parse_ptt(text: &str) -> MapResult<PttTable> {
    let mut table = PttTable::default();
    let mut columns: Vec<Option<Column>> = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        if line_no <= TITLE_LINES && columns.is_empty() {
            if let Some(digits) = range_end(raw) {
                let length = digits
                    .parse::<i64>()
                    .map_err(|_| MapError::parse(line_no, "There is a problem with the length value"))?;
                table.length = Some(length);
                table.title = Some(shorten(raw.trim(), MAX_PTT_TITLE_LENGTH));
            }
        }

        if columns.is_empty() {
            if line_no <= HEADER_LINES {
                let names = split_fields(raw, usize::MAX);
                if is_header(&names) {
                    columns = names.iter().map(|name| Column::parse(name)).collect();
                }
            }
            continue;
        }

        let fields = split_fields(raw, columns.len());
        if fields.len() >= 5 {
            let index = |column: Column| columns.iter().position(|c| *c == Some(column));
            if let Some(column) = Column::REQUIRED.into_iter().find(|c| index(*c).is_none()) {
                return Err(MapError::parse(
                    line_no,
                    format!("A \"{}\" column has not been defined", column.name()),
                ));
            }
            match read_row(&columns, &fields, line_no) {
                Ok(row) => table.rows.push(row),
                Err(err) => table.errors.push(err),
            }
        } else if fields.len() > 2 {
            table.errors.push(MapError::parse(line_no, "The contents of the line could not be parsed"));
        }
    }
    log::debug!("Read {} proteins, {} unreadable lines", table.rows.len(), table.errors.len());
    Ok(table)
}

fn read_row(columns: &[Option<Column>], fields: &[String], line: usize) -> MapResult<PttRow> {
    let field = |column: Column| {
        columns
            .iter()
            .position(|c| *c == Some(column))
            .and_then(|i| fields.get(i))
            .map(|v| v.trim())
    };
    let text = |column: Column| field(column).filter(|v| !v.is_empty() && *v != "-").map(str::to_string);

    let location = field(Column::Location).ok_or_else(|| MapError::parse(line, "Missing Location value"))?;
    let (start, stop) = location_range(location)
        .ok_or_else(|| MapError::parse(line, format!("'{}' is not a start..stop location", location)))?;
    let strand = match field(Column::Strand) {
        Some("+") => Strand::Direct,
        Some("-") => Strand::Reverse,
        _ => return Err(MapError::parse(line, "The strand value must be \"+\" or \"-\"")),
    };

    Ok(PttRow {
        line,
        location: location.to_string(),
        start,
        stop,
        strand,
        pid: text(Column::Pid),
        gene: text(Column::Gene),
        synonym: text(Column::Synonym),
        code: text(Column::Code),
        cog: text(Column::Cog),
        product: text(Column::Product),
    })
}

impl PttRow {
    /// Gene name, else the locus synonym, else the protein id.
    pub fn label(&self) -> Option<String> {
        self.gene
            .as_ref()
            .or(self.synonym.as_ref())
            .or(self.pid.as_ref())
            .map(|v| shorten(v, MAX_LABEL_LENGTH))
    }

    pub fn mouseover(&self) -> String {
        let mut text = format!("{};", self.location);
        if let Some(cog) = &self.cog {
            text.push_str(&format!(" {};", cog));
        }
        if let Some(code) = &self.code {
            text.push_str(&format!(" (code={});", code));
        }
        if let Some(product) = &self.product {
            text.push_str(&format!(" {};", product));
        }
        shorten(&text, MAX_MOUSEOVER_LENGTH)
    }

    pub fn gene_spec(&self) -> FeatureSpec {
        let mut spec = FeatureSpec::new(self.strand, 1, self.start, self.stop);
        (spec.color, spec.decoration) = match self.strand {
            Strand::Direct => (FORWARD_GENE, Decoration::ClockwiseArrow),
            Strand::Reverse => (REVERSE_GENE, Decoration::CounterclockwiseArrow),
        };
        spec.label = self.label();
        spec.mouseover = Some(self.mouseover());
        spec.hyperlink = self.pid.as_ref().map(|pid| format!("{}{}", PROTEIN_LINK, pid));
        spec
    }

    /// Unlabelled category arc in slot 2, when the protein has a category code.
    pub fn category_spec(&self) -> Option<MapResult<(FeatureSpec, char)>> {
        let code = self.code.as_deref()?;
        Some(
            cog_category(code)
                .map(|category| {
                    let mut spec = FeatureSpec::new(self.strand, 2, self.start, self.stop);
                    spec.color = category.color;
                    (spec, category.code)
                })
                .ok_or_else(|| MapError::unknown_feature_type(code)),
        )
    }
}

impl PttTable {
    pub fn into_map(self, config: MapConfig) -> MapResult<TableImport> {
        let length = self.length.ok_or_else(|| {
            MapError::invalid_value("length", "no title line ending in a 1..<length> range was found")
        })?;
        let mut map = GenomeMap::new(length, config)?;
        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            map = map.with_title(title);
        }

        let mut skipped = self.errors;
        let mut categories = BTreeSet::new();
        let mut category_arcs = 0;
        for row in &self.rows {
            if let Err(err) = map.add_feature(row.gene_spec()) {
                log::warn!("Skipping protein on line {}: {}", row.line, err);
                skipped.push(err);
                continue;
            }
            match row.category_spec() {
                Some(Ok((spec, code))) => match map.add_feature(spec) {
                    Ok(_) => {
                        categories.insert(code);
                        category_arcs += 1;
                    }
                    Err(err) => skipped.push(err),
                },
                Some(Err(err)) => {
                    log::warn!("Line {}: {}; category arc skipped", row.line, err);
                    skipped.push(err);
                }
                None => {}
            }
        }

        if map.config().draw_legend {
            map.add_legend(category_legend(map.config(), &categories));
        }
        log::info!(
            "Loaded {} proteins and {} category arcs ({} skipped)",
            map.registry().feature_count() - category_arcs,
            category_arcs,
            skipped.len()
        );
        Ok(TableImport { map, skipped })
    }
}

/// Both gene swatches, then the categories in use in alphabetical order.
fn category_legend(config: &MapConfig, categories: &BTreeSet<char>) -> Legend {
    let mut legend = feature_legend(config);
    let long = config.width.min(config.height) >= LONG_LEGEND_DIMENSION;
    let (forward, reverse) = if long {
        ("Forward strand gene", "Reverse strand gene")
    } else {
        ("Forward", "Reverse")
    };
    legend.push(LegendItem::with_swatch(forward, FORWARD_GENE));
    legend.push(LegendItem::with_swatch(reverse, REVERSE_GENE));
    for category in categories.iter().filter_map(|code| COG_CATEGORIES.iter().find(|c| c.code == *code)) {
        let name = if long { category.name.to_string() } else { format!("COG {}", category.code) };
        legend.push(LegendItem::with_swatch(name, category.color));
    }
    legend
}

pub fn read_ptt_str(text: &str, config: MapConfig) -> MapResult<TableImport> {
    parse_ptt(text)?.into_map(config)
}

pub fn read_ptt_file(path: &Path, config: MapConfig) -> Result<TableImport> {
    let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    read_ptt_str(&text, config).with_context(|| format!("Failed to load protein table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    const PO157: &str = "Escherichia coli O157:H7 plasmid pO157, complete sequence - 1..92721\n\
3 proteins\n\
Location\tStrand\tLength\tPID\tGene\tSynonym\tCode\tCOG\tProduct\n\
190..1101\t+\t303\t10955266\trepA\tECO57p01\tL\tCOG5527L\treplication protein\n\
2001..2400\t-\t132\t10955267\t-\tECO57p02\t-\t-\thypothetical protein\n\
3000..3600\t+\t200\t10955268\t-\t-\tKL\t-\t-\n";

    #[test]
    fn test_title_range_gives_length() {
        assert_eq!(range_end("pX, complete sequence - 1..5386"), Some("5386"));
        assert_eq!(range_end("pX - 0..42  "), Some("42"));
        assert_eq!(range_end("pX - 2..5386"), None);
        assert_eq!(range_end("3 proteins"), None);
        assert_eq!(location_range("190..1101"), Some((190, 1101)));
        assert_eq!(location_range("complement(5..9)"), Some((5, 9)));
        assert_eq!(location_range("190-1101"), None);
    }

    #[test]
    fn test_parse_ptt_reads_proteins() {
        let table = parse_ptt(PO157).unwrap();
        assert_eq!(table.length, Some(92721));
        assert!(table.title.as_deref().unwrap().starts_with("Escherichia coli"));
        assert_eq!(table.rows.len(), 3);
        assert!(table.errors.is_empty());

        let rep = &table.rows[0];
        assert_eq!((rep.start, rep.stop, rep.strand), (190, 1101, Strand::Direct));
        assert_eq!(rep.label().as_deref(), Some("repA"));
        assert_eq!(rep.mouseover(), "190..1101; COG5527L; (code=L); replication protein;");
        assert_eq!(table.rows[1].label().as_deref(), Some("ECO57p02"));
        assert_eq!(table.rows[2].label().as_deref(), Some("10955268"));
    }

    #[test]
    fn test_proteins_become_gene_and_category_arcs() {
        let import = read_ptt_str(PO157, MapConfig::default()).unwrap();
        let map = &import.map;
        let direct = map.registry().slots(Strand::Direct);
        assert_eq!(direct[0].features().len(), 2);
        assert_eq!(direct[1].features().len(), 1);
        assert_eq!(direct[1].features()[0].color, Color::rgb(245, 222, 188));
        assert_eq!(map.registry().slots(Strand::Reverse)[0].features()[0].decoration, Decoration::CounterclockwiseArrow);

        // "KL" is not a single category
        assert_eq!(import.skipped, vec![MapError::unknown_feature_type("KL")]);

        let names: Vec<_> = map.legends()[0].items().iter().map(|i| i.text.as_str()).collect();
        assert_eq!(names, vec!["Forward", "Reverse", "COG L"]);
    }

    #[test]
    fn test_gene_links_to_protein() {
        let table = parse_ptt(PO157).unwrap();
        let spec = table.rows[0].gene_spec();
        assert_eq!(spec.hyperlink.as_deref(), Some("https://www.ncbi.nlm.nih.gov/protein/10955266"));
        assert_eq!(spec.slot, 1);
        assert_eq!(spec.color, FORWARD_GENE);
    }

    #[test]
    fn test_large_maps_spell_out_categories() {
        let config = MapConfig { width: 2000, height: 2400, ..MapConfig::default() };
        let import = read_ptt_str(PO157, config).unwrap();
        let names: Vec<_> = import.map.legends()[0].items().iter().map(|i| i.text.clone()).collect();
        assert_eq!(names[0], "Forward strand gene");
        assert_eq!(names[2], "DNA replication, recombination and repair");
    }

    #[test]
    fn test_missing_pid_column_is_fatal() {
        let text = "pX - 1..5000\nLocation\tStrand\tLength\tGene\tProduct\n10..20\t+\t3\tabc\tx\n";
        assert!(matches!(parse_ptt(text), Err(MapError::Parse { line: 3, .. })));
    }

    #[test]
    fn test_bad_lines_are_collected() {
        let text = "pX - 1..5000\nLocation\tStrand\tLength\tPID\tGene\n\
10..20\t*\t3\t1\tabc\n\
10-20\t+\t3\t2\tdef\n\
4000..6000\t+\t3\t3\tghi\n\
30..60\t-\t10\t4\tjkl\n";
        let import = read_ptt_str(text, MapConfig::default()).unwrap();
        assert_eq!(import.map.registry().feature_count(), 1);
        assert_eq!(import.skipped.len(), 3);
        assert!(import.skipped.contains(&MapError::feature_range(4000, 6000, 5000)));
    }

    #[test]
    fn test_missing_length_is_fatal() {
        let text = "pX\nLocation\tStrand\tLength\tPID\tGene\n10..20\t+\t3\t1\tabc\n";
        assert!(read_ptt_str(text, MapConfig::default()).is_err());
    }

    #[test]
    fn test_read_ptt_file() {
        let mut file = Builder::new().suffix(".ptt").tempfile().unwrap();
        file.write_all(PO157.as_bytes()).unwrap();
        let import = read_ptt_file(file.path(), MapConfig::default()).unwrap();
        assert_eq!(import.map.sequence_length(), 92721);
    }
}
