use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Static dependency graphs for Python projects.
///
/// pydeps discovers every `.py` file under a project root, extracts its import
/// declarations and resolves them to other files of the same project.
#[derive(Parser, Debug)]
#[command(
    name = "pydeps",
    version,
    about,
    long_about = None,
    propagate_version = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a project directory and print its dependency graph as JSON.
    Analyze {
        /// Path to the project root.
        path: PathBuf,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,

        /// Enable debug logging and print a run summary to stderr.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Serve the HTTP API (projects, notes, analysis).
    #[cfg(feature = "web")]
    Serve {
        /// Path to the TOML config file.
        #[arg(long, default_value = pydeps::config::CONFIG_FILE)]
        config: PathBuf,

        /// Address to listen on (overrides the config file).
        #[arg(long)]
        bind: Option<String>,

        /// Directory for the registry file (overrides the config file).
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Enable debug logging.
        #[arg(short, long)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Analyze { verbose, .. } => *verbose,
            #[cfg(feature = "web")]
            Commands::Serve { verbose, .. } => *verbose,
        }
    }
}
