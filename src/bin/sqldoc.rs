//! sqldoc: SQL object documentation CLI
//!
//! # Usage
//!
//! ```bash
//! # Document a directory as reStructuredText
//! sqldoc build sql/ -o docs/objects.rst
//!
//! # Skip column extraction, emit JSON
//! sqldoc build sql/ --no-attributes --format json
//!
//! # Show what one file yields
//! sqldoc inspect sql/sales/orders.sql
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use sqldoc::extract::comment::TAGS;
use sqldoc::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sqldoc")]
#[command(version)]
#[command(about = "Reference documentation from SQL object scripts", long_about = None)]
#[command(after_help = "EXAMPLES:
    sqldoc build sql/ -o docs/objects.rst --title 'Warehouse Objects'
    sqldoc build sql/ --format json
    sqldoc inspect sql/sales/orders.sql")]
struct Cli {
    /// Config file (defaults to ./sqldoc.toml, then the user config dir)
    #[arg(long, global = true, env = "SQLDOC_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Document every .sql file under a directory
    Build {
        /// Source directory (falls back to `source` in the config)
        dir: Option<PathBuf>,

        /// Don't extract column lists from table DDL
        #[arg(long)]
        no_attributes: bool,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Output file path (stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,
    },
    /// Print the descriptor extracted from one file as JSON
    Inspect {
        /// The SQL file to inspect
        file: PathBuf,
    },
    /// Show the recognised comment tags
    Tags,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Rst,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Rst => OutputFormat::Rst,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Build {
            dir,
            no_attributes,
            format,
            output,
            title,
        } => {
            let mut config = DocConfig::load(cli.config.as_deref())?;
            if *no_attributes {
                config.include_table_attributes = false;
            }
            if let Some(format) = format {
                config.format = (*format).into();
            }
            if output.is_some() {
                config.output = output.clone();
            }
            if title.is_some() {
                config.title = title.clone();
            }
            let Some(dir) = dir.clone().or_else(|| config.source.clone()) else {
                bail!("no source directory given and none configured");
            };
            build(&dir, &config, cli.verbose)
        }
        Commands::Inspect { file } => {
            let config = DocConfig::load(cli.config.as_deref())?;
            inspect(file, &config)
        }
        Commands::Tags => {
            show_tags();
            Ok(())
        }
    }
}

fn build(dir: &Path, config: &DocConfig, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Source:".dimmed(), dir.display().to_string().yellow());
    }

    let doc = document_dir(dir, config)
        .with_context(|| format!("Failed to document '{}'", dir.display()))?;

    let text = match config.format {
        OutputFormat::Rst => doc.to_rst(),
        OutputFormat::Json => doc.to_json()?,
    };

    match &config.output {
        Some(path) => {
            fs::write(path, &text)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!(
                "{} Documented {} objects to {}",
                "✓".green(),
                doc.objects.len(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", text),
    }

    Ok(())
}

fn inspect(file: &Path, config: &DocConfig) -> Result<()> {
    let text = fs::read_to_string(file)
        .with_context(|| format!("Failed to read '{}'", file.display()))?;

    match try_extract(&text, config) {
        Ok(descriptor) => {
            let descriptor = descriptor.with_source(file);
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            Ok(())
        }
        Err(e) => bail!("{} is not documentable: {}", file.display(), e),
    }
}

fn show_tags() {
    println!("{}", "Recognised comment tags".cyan().bold());
    println!();
    println!("{}", "─".repeat(40).dimmed());
    for tag in TAGS {
        println!("  {}", tag.yellow());
    }
    println!();
    println!(
        "{}",
        "Tables are written one row per line, cells separated by '|'.".dimmed()
    );
}
