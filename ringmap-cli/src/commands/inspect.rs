//! Inspect command - slot occupancy of a feature table without rendering it

use std::fmt::Write as _;
use std::path::PathBuf;

use ringmap_core::{SlotSummary, Strand};
use serde::Serialize;

use crate::config::Config;
use crate::error::CliResult;

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub input: PathBuf,
    pub title: Option<String>,
    pub sequence_length: u32,
    pub features: usize,
    pub slots: Vec<SlotSummary>,
    /// Features that could not be placed, with the reason.
    pub skipped: Vec<String>,
}

impl InspectReport {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.input.display());
        if let Some(title) = &self.title {
            let _ = writeln!(out, "  title:    {}", title);
        }
        let _ = writeln!(out, "  length:   {} bp", self.sequence_length);
        let _ = writeln!(out, "  features: {} in {} slots", self.features, self.slots.len());
        let _ = writeln!(out, "  {:<8} {:>4} {:>9} {:>10} {:>9}", "strand", "slot", "features", "thickness", "radius");
        for slot in &self.slots {
            let strand = match slot.strand {
                Strand::Direct => "forward",
                Strand::Reverse => "reverse",
            };
            let _ = writeln!(
                out,
                "  {:<8} {:>4} {:>9} {:>10.2} {:>9.2}",
                strand, slot.number, slot.features, slot.thickness, slot.radius
            );
        }
        if !self.skipped.is_empty() {
            let _ = writeln!(out, "  skipped:  {}", self.skipped.len());
            for reason in &self.skipped {
                let _ = writeln!(out, "    {}", reason);
            }
        }
        out
    }
}

pub fn inspect(config: &Config, input: PathBuf) -> CliResult<InspectReport> {
    let import = super::load_table(&input, config.map.clone())?;
    let map = import.map;
    Ok(InspectReport {
        title: map.title.clone(),
        sequence_length: map.sequence_length(),
        features: map.registry().feature_count(),
        slots: map.slot_summary(),
        skipped: import.skipped.iter().map(|e| e.to_string()).collect(),
        input,
    })
}

pub fn execute(config: &Config, input: PathBuf, json: bool) -> CliResult<()> {
    let report = inspect(config, input)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
