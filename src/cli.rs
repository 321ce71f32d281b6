use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidiform")]
#[command(author, version, about = "Video file metadata extraction, enrichment and export")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import video files and export their metadata
    Export {
        /// Video files to import, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Export format: json, csv or xml (defaults to the configured format)
        #[arg(short, long)]
        format: Option<String>,

        /// Look up each file's title online before exporting
        #[arg(long)]
        enrich: bool,

        /// Directory to write the export into (defaults to the configured directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the export instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Extract and display the metadata of a single file
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
