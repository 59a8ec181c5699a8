//! Config command - print or write the TOML configuration

use std::path::PathBuf;

use crate::config::Config;
use crate::error::CliResult;

/// Print the default configuration (`example`) or the effective one, or write it to `output`.
pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> CliResult<()> {
    let content = if example { Config::example_toml()? } else { config.to_toml()? };
    match output {
        Some(path) => {
            std::fs::write(&path, content)?;
            log::info!("Wrote configuration to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_effective_config() -> CliResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ringmap.toml");
        let mut config = Config::default();
        config.map.label_quality = 10;

        execute(&config, false, Some(path.clone()))?;
        let written = Config::load_from_file(&path)?;
        assert_eq!(written.map.label_quality, 10);

        execute(&config, true, Some(path.clone()))?;
        let example = Config::load_from_file(&path)?;
        assert_eq!(example.map.label_quality, 8);
        Ok(())
    }
}
