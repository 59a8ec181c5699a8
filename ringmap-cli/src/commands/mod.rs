//! Command implementations for the RingMap CLI

pub mod config;
pub mod inspect;
pub mod render;

use std::path::Path;

use ringmap_core::io::{read_table_file, TableImport};
use ringmap_core::MapConfig;

use crate::error::{CliError, CliResult};

/// Read a tab or PTT feature table into a map, reporting the features it had to leave out.
pub(crate) fn load_table(path: &Path, map_config: MapConfig) -> CliResult<TableImport> {
    if !path.exists() {
        return Err(CliError::file_not_found(path.to_path_buf()));
    }
    let import =
        read_table_file(path, map_config).map_err(|e| CliError::parse(path.display().to_string(), format!("{:#}", e)))?;
    for skipped in &import.skipped {
        log::warn!("{}: skipped feature: {}", path.display(), skipped);
    }
    Ok(import)
}
