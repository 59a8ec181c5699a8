//! Feature table input

pub mod feature_types;
pub mod ptt;
pub mod tab;

use std::path::Path;

use anyhow::Result;

use crate::config::MapConfig;

pub use feature_types::{named_color, FeatureType, FEATURE_TYPES};
pub use ptt::{parse_ptt, read_ptt_file, read_ptt_str, CogCategory, PttRow, PttTable, COG_CATEGORIES};
pub use tab::{parse_table, read_tab_file, read_tab_str, TabRow, TabTable, TableImport};

/// Read a feature table, choosing the reader by extension: `.ptt` files are NCBI protein tables,
/// anything else is a tab-delimited feature table.
pub fn read_table_file(path: &Path, config: MapConfig) -> Result<TableImport> {
    let is_ptt = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("ptt"));
    if is_ptt {
        read_ptt_file(path, config)
    } else {
        read_tab_file(path, config)
    }
}
