//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Contract verifier and packager for the Linguo tutoring API
#[derive(Parser, Debug)]
#[command(name = "linguo-verify")]
#[command(version)]
#[command(about = "Verify the tutoring API contract and package the web app source")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every contract check against a running API
    Verify(VerifyArgs),

    /// List checks and their endpoint contracts
    List(ListArgs),

    /// Zip a source tree without dependency and build directories
    Package(PackageArgs),

    /// View stored verification runs
    Results(ResultsArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Server root URL (the /api prefix is added)
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Output format (table, json, json-pretty, csv, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Also write the report to this file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Store the run in the results directory
    #[arg(short, long)]
    pub save: bool,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show method, path, status and required fields per check
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for package command
#[derive(Parser, Debug)]
pub struct PackageArgs {
    /// Source directory to archive
    #[arg(short, long)]
    pub source: String,

    /// Archive path (default: <source>.zip next to the source)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Additional directory name to prune (repeatable)
    #[arg(long = "exclude-dir")]
    pub exclude_dirs: Vec<String>,

    /// Additional file name to skip (repeatable)
    #[arg(long = "exclude-file")]
    pub exclude_files: Vec<String>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Arguments for results command
#[derive(Parser, Debug)]
pub struct ResultsArgs {
    /// Number of runs to show
    #[arg(short, long, default_value = "10")]
    pub limit: usize,

    /// Print the full report of one stored run
    #[arg(long)]
    pub show: Option<String>,

    /// Export a run to a file (.json or .csv); the latest unless --show names one
    #[arg(short, long)]
    pub export: Option<String>,

    /// Delete a stored run
    #[arg(long, conflicts_with_all = ["show", "export"])]
    pub delete: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./linguo-verify.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,

        /// Configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (default: first file found in the standard locations)
        file: Option<String>,
    },

    /// Show environment variable help and current values
    Env,
}
