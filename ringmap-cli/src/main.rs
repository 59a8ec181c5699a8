use std::path::PathBuf;

use clap::{Parser, Subcommand};
use env_logger::Env;
use ringmap_core::{LegendPosition, Toggle};

mod commands;
mod config;
mod error;

use commands::render::RenderOptions;
use config::Config;
use error::{print_error_and_exit, CliError, CliResult};

#[derive(Parser)]
#[command(name = "ringmap")]
#[command(about = "RingMap - circular genome map renderer")]
#[command(version)]
#[command(long_about = "
RingMap draws circular maps of plasmids and genomes from tab-delimited feature tables or
NCBI protein tables (.ptt), packing features into concentric slots and placing their labels
around the ring.

Examples:
  ringmap render pUC19.tab -o pUC19.svg
  ringmap render tables/*.tab -o maps/ --width 2000 --height 2000 --bounds-json
  ringmap render NC_002128.ptt -o pO157.svg --html --border
  ringmap inspect pUC19.tab
  ringmap config --example > ringmap.toml
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (default: ./ringmap.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Leave timestamps out so repeated renders are byte-identical
    #[arg(long, global = true)]
    pub deterministic: bool,

    /// Number of threads to use
    #[arg(short, long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render feature tables to SVG maps
    Render {
        /// Feature tables (.tab) or protein tables (.ptt) to render
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output SVG file (single input) or directory
        #[arg(short, long, required = true)]
        out: PathBuf,

        /// Width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Title drawn in the middle of the map, replacing the table's
        #[arg(long)]
        title: Option<String>,

        /// Legend position, e.g. upper-right or lower-left
        #[arg(long)]
        legend_position: Option<LegendPosition>,

        /// Label placement quality, 1 (fast) to 10 (thorough)
        #[arg(long)]
        quality: Option<u8>,

        /// Reverse-strand labels inside the backbone (show, hide or auto)
        #[arg(long)]
        inner_labels: Option<Toggle>,

        /// Append feature positions to labels (show, hide or auto)
        #[arg(long)]
        positions: Option<Toggle>,

        /// Feature labels (show, hide, or auto for zoomed views only)
        #[arg(long)]
        labels: Option<Toggle>,

        /// Frame the map with a border
        #[arg(long)]
        border: bool,

        /// Zoom multiplier, 1 to 30
        #[arg(long)]
        zoom: Option<f64>,

        /// Base to center the zoomed view on
        #[arg(long)]
        zoom_center: Option<u32>,

        /// Write <name>.bounds.json with the label rectangles next to each SVG
        #[arg(long)]
        bounds_json: bool,

        /// Write <name>.html with a clickable image map next to each SVG
        #[arg(long)]
        html: bool,
    },

    /// Show how the features of a table are packed into slots
    Inspect {
        /// Feature table
        input: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default or effective configuration as TOML
    Config {
        /// Print the default configuration instead of the effective one
        #[arg(long)]
        example: bool,

        /// Write to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn setup_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn run(cli: Cli) -> CliResult<()> {
    let config = Config::load(cli.config.as_deref())?;

    let threads = cli.threads.unwrap_or(config.general.threads).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| CliError::resource(format!("Failed to set thread count: {}", e)))?;
    log::debug!("Using {} threads", threads);

    match cli.command {
        Commands::Render {
            inputs,
            out,
            width,
            height,
            title,
            legend_position,
            quality,
            inner_labels,
            positions,
            labels,
            border,
            zoom,
            zoom_center,
            bounds_json,
            html,
        } => {
            let options = RenderOptions {
                width,
                height,
                title,
                legend_position,
                quality,
                inner_labels,
                positions,
                labels,
                border,
                zoom,
                zoom_center,
                bounds_json,
                html,
                deterministic: cli.deterministic,
            };
            commands::render::execute(&config, inputs, out, options)?;
        }

        Commands::Inspect { input, json } => {
            commands::inspect::execute(&config, input, json)?;
        }

        Commands::Config { example, output } => {
            commands::config::execute(&config, example, output)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if let Err(err) = run(cli) {
        print_error_and_exit(&err);
    }
}
