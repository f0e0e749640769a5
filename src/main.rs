//! Linguo Verify - contract verifier and source packager for the AI Linguo API
//!
//! A CLI tool that exercises a running tutoring backend end to end and reports
//! which endpoints honour their response contracts.
//!
//! ## Features
//!
//! - 13 checks across six groups: AI tutor, authentication, profile, chat
//!   sessions, vocabulary SRS and lessons/pronunciation
//! - Dependent checks short-circuit when an earlier check did not capture an id
//! - Critical failures (tutor, authentication, profile) drive the exit code
//! - Multiple output formats (Table, JSON, CSV, Summary)
//! - Stored runs with JSON/CSV export
//! - Zip packaging of the web app source without dependency and build folders
//!
//! ## Usage
//!
//! ```bash
//! # Verify a local server
//! linguo-verify verify --base-url http://localhost:3000
//!
//! # Machine-readable report, saved for later
//! linguo-verify verify --format json --save
//!
//! # List checks and their contracts
//! linguo-verify list --detailed
//!
//! # Package the web app
//! linguo-verify package --source ./ai-linguo
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::Path;
use tracing::{debug, info};

mod checks;
mod cli;
mod config;
mod contract;
mod executor;
mod http;
mod models;
mod output;
mod package;
mod results;
mod utils;

use cli::Args;
use config::{ConfigFile, EnvConfig, Overrides};
use executor::ContractVerifier;
use output::{OutputFormat, ResultFormatter};
use results::{ExportFormat, ResultsStorage, StoredRun};
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let verbose = args.verbose || EnvConfig::load().verbose_enabled();
    init_logger(LogLevel::resolve(args.log_level.as_deref(), verbose));

    match args.command {
        cli::Command::Verify(verify_args) => {
            let exit_code = run_verify(verify_args).await?;
            std::process::exit(exit_code);
        }
        cli::Command::List(list_args) => {
            list_checks(list_args);
        }
        cli::Command::Package(package_args) => {
            run_package(package_args)?;
        }
        cli::Command::Results(results_args) => {
            show_results(results_args)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args)?;
        }
    }

    Ok(())
}

async fn run_verify(args: cli::VerifyArgs) -> Result<i32> {
    let overrides = Overrides {
        base_url: args.base_url,
        timeout_secs: args.timeout,
        format: args.format,
    };
    let config = config::resolve(args.config.as_deref().map(Path::new), &overrides)?;
    let format = config.output_format()?;

    let verifier = ContractVerifier::new(
        &config.base_url,
        &config.api_prefix,
        config.timeout_secs,
        config.critical_keywords.clone(),
    )?;

    info!(
        "Verifying {} (timeout {}s)",
        verifier.api_base(),
        config.timeout_secs
    );

    let summary = verifier.run_all().await;

    let mut formatter = ResultFormatter::new(format);
    if args.no_color || !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }
    println!("{}", formatter.format_summary(&summary)?);

    if let Some(path) = &args.output {
        output::write_results_to_file(path, &summary, format)?;
        info!("Report written to {}", path);
    }

    if args.save {
        let storage = ResultsStorage::default_dir();
        let run = StoredRun::new(summary.clone());
        let path = storage.save(&run)?;
        eprintln!("💾 Saved run {} to {}", run.id, path.display());
    }

    Ok(summary.exit_code())
}

fn list_checks(args: cli::ListArgs) {
    let plan = checks::planned_checks();

    println!("Contract Checks ({} total):", plan.len());
    println!("{:-<72}", "");

    let mut current_group = None;
    for check in &plan {
        if current_group != Some(check.group) {
            println!("\n{}", check.group);
            if args.detailed {
                println!("  Prerequisites: {}", check.group.prerequisites());
            }
            current_group = Some(check.group);
        }

        if args.detailed {
            let rules = check.endpoint.contract();
            println!("  {}", check.name);
            println!("    Endpoint: {} {}", rules.method, rules.path);
            println!("    Contract: {}", check.endpoint.name());
            println!("    Expects:  HTTP {} ({:?} body)", rules.expected, rules.body);
            if !rules.required.is_empty() {
                println!("    Fields:   {}", rules.required.join(", "));
            }
            if !rules.item_fields.is_empty() {
                println!("    Items:    {}", rules.item_fields.join(", "));
            }
            if !check.requires.is_empty() {
                let requires: Vec<_> = check.requires.iter().map(|r| r.to_string()).collect();
                println!("    Requires: {}", requires.join(", "));
            }
        } else {
            println!("  {}", check.name);
        }
    }
}

fn run_package(args: cli::PackageArgs) -> Result<()> {
    let package_config = config::resolve_package(args.config.as_deref().map(Path::new))?;

    let mut options = package_config
        .options(&args.source)
        .exclude_dirs(args.exclude_dirs)
        .exclude_files(args.exclude_files);
    if let Some(output) = args.output {
        options = options.output(output);
    }

    debug!(
        "Excluded directories: {:?}, excluded files: {:?}",
        options.excluded_dirs, options.excluded_files
    );

    let report = package::package(&options)
        .with_context(|| format!("Failed to package {}", options.source.display()))?;

    for file in &report.files {
        debug!("  {}", file);
    }

    println!("✓ Created {}", report.output.display());
    println!("  Files: {}", report.files.len());
    println!("  Size: {} bytes", report.bytes);
    Ok(())
}

fn show_results(args: cli::ResultsArgs) -> Result<()> {
    let storage = ResultsStorage::default_dir();

    if let Some(run_id) = &args.delete {
        storage.delete(run_id)?;
        println!("✓ Deleted run {run_id}");
        return Ok(());
    }

    let selected = match &args.show {
        Some(run_id) => Some(storage.load(run_id)?),
        None => None,
    };

    if let Some(export) = &args.export {
        let path = Path::new(export);
        let format = ExportFormat::from_extension(path).ok_or_else(|| {
            anyhow::anyhow!("Cannot infer export format from {export} (use .json or .csv)")
        })?;
        let run = match selected {
            Some(run) => run,
            None => storage
                .latest()?
                .ok_or_else(|| anyhow::anyhow!("No stored runs to export"))?,
        };
        storage.export(&run, path, format)?;
        println!("✓ Exported run {} to {}", run.id, path.display());
        return Ok(());
    }

    if let Some(run) = selected {
        let formatter = ResultFormatter::new(OutputFormat::Table);
        println!("Run {} ({} {})", run.id, run.environment.os, run.environment.arch);
        println!("{}", formatter.format_summary(&run.summary)?);
        return Ok(());
    }

    let runs = storage.list_runs()?;
    if runs.is_empty() {
        println!("\n📭 No stored runs found in {}", storage.base_dir().display());
        println!("   Save one with: linguo-verify verify --save");
        return Ok(());
    }

    println!("\nStored Runs ({} total):", runs.len());
    println!("{:-<88}", "");
    println!(
        "{:<22} {:<20} {:>7} {:>8} {:>9}  {}",
        "ID", "Started", "Passed", "Rate", "Critical", "Target"
    );
    println!("{:-<88}", "");
    for run in runs.iter().take(args.limit) {
        println!(
            "{:<22} {:<20} {:>3}/{:<3} {:>7.1}% {:>9}  {}",
            run.id,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            run.passed,
            run.total,
            run.success_rate,
            run.critical_failures,
            run.base_url
        );
    }
    if runs.len() > args.limit {
        println!("... {} older runs not shown", runs.len() - args.limit);
    }

    Ok(())
}

fn manage_config(args: cli::ConfigArgs) -> Result<()> {
    match args.action {
        cli::ConfigAction::Init { output, force } => {
            let path = Path::new(&output);
            if path.exists() && !force {
                anyhow::bail!(
                    "Configuration file already exists: {output}. Use --force to overwrite."
                );
            }

            let config = ConfigFile::example();
            config.save(path)?;
            println!("✓ Configuration file created: {output}");
            println!("\nEdit the file to customize your settings.");
        }

        cli::ConfigAction::Show { format, config } => {
            let app = config::resolve(config.as_deref().map(Path::new), &Overrides::default())?;
            let effective = ConfigFile {
                app,
                ..ConfigFile::default()
            };
            let output = if format == "json" {
                serde_json::to_string_pretty(&effective)?
            } else {
                serde_yaml::to_string(&effective)?
            };
            println!("{output}");

            let (dirs, files) = config::default_exclusions();
            println!("# Built-in package exclusions");
            println!("#   directories: {}", dirs.join(", "));
            println!("#   files:       {}", files.join(", "));
            match ConfigFile::find() {
                Some(path) => println!("# Discovered config file: {}", path.display()),
                None => println!("# No config file found in the standard locations"),
            }
        }

        cli::ConfigAction::Validate { file } => {
            let path = file.unwrap_or_else(|| {
                ConfigFile::find()
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_else(|| "./linguo-verify.yaml".to_string())
            });

            match ConfigFile::load(&path) {
                Ok(_) => {
                    println!("✓ Configuration file is valid: {path}");
                }
                Err(e) => {
                    println!("✗ Configuration file is invalid: {path}");
                    println!("  Error: {e:#}");
                    return Err(e);
                }
            }
        }

        cli::ConfigAction::Env => {
            config::print_env_help();
            let env = EnvConfig::load();
            if env.has_any() {
                println!();
                env.print_summary();
            }
        }
    }

    Ok(())
}
