//! # grpc-bridge
//!
//! Generates a protobuf schema from resolved Jakarta REST declaration units.
//!
//! ## Usage
//!
//! ```bash
//! # Generate target/proto/<class>.proto from the current directory
//! grpc-bridge generate --package dev.example --class-name CC1
//!
//! # Preview without writing
//! grpc-bridge generate --dry-run
//!
//! # Write a default grpc-bridge.toml
//! grpc-bridge init
//!
//! # Check a schema on disk is current
//! grpc-bridge validate --path target/proto/CC1.proto
//! ```

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use grpc_bridge_cli::{
    config::{CliArgs, ConfigManager, CONFIG_FILENAME},
    error::{CliError, ParseError},
    generator::SchemaGenerator,
    writer::{FileWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "grpc-bridge")]
#[command(author, version, about = "Generate protobuf schemas from Jakarta REST declarations", long_about = None)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

/// Overrides shared by `generate` and `validate`.
#[derive(clap::Args)]
struct TargetArgs {
    /// Directory containing declaration units (*.json)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Schema package
    #[arg(long)]
    package: Option<String>,

    /// Class name used for the service and output file
    #[arg(long)]
    class_name: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only read declaration files matching this glob
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the protobuf schema
    Generate {
        #[command(flatten)]
        target: TargetArgs,

        /// Output directory; the schema goes to <output>/proto/<class>.proto
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Preview the schema without writing it
        #[arg(long)]
        dry_run: bool,

        /// Replace an existing schema file
        #[arg(long)]
        force: bool,
    },

    /// Initialize a new grpc-bridge configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Validate that a schema on disk is up-to-date
    Validate {
        /// Path to the schema file
        #[arg(short, long)]
        path: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    const CRATES: &[&str] = &["grpc_bridge", "grpc_bridge_cli"];
    let level = cli.verbose.tracing_level_filter();
    let allowlist = CRATES
        .iter()
        .map(|c| format!("{c}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("warn,{allowlist}")))
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Generate {
            target,
            output,
            dry_run,
            force,
        } => cmd_generate(target, output, dry_run, force),

        Commands::Init { output, force } => cmd_init(output, force),

        Commands::Validate { path, target } => cmd_validate(path, target),
    }
}

fn schema_generator(target: &TargetArgs, output: Option<PathBuf>) -> Result<SchemaGenerator, CliError> {
    let config = ConfigManager::load(target.config.as_deref())?;
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            input: target.input.clone(),
            output,
            package: target.package.clone(),
            class_name: target.class_name.clone(),
        },
    );
    Ok(SchemaGenerator::new(config))
}

fn cmd_generate(
    target: TargetArgs,
    output: Option<PathBuf>,
    dry_run: bool,
    force: bool,
) -> Result<(), CliError> {
    let generator = schema_generator(&target, output)?;

    println!("{}", "Scanning for declaration units...".cyan());
    let units = match generator.load_units(target.filter.as_deref()) {
        Err(CliError::Parse(error)) => {
            println!("{} invalid declaration files:", "Error:".red());
            println!("  {}", format_parse_error(&error));
            return Err(CliError::Parse(error));
        }
        other => other?,
    };
    println!("  Found {} unit(s)", units.len().to_string().green());

    println!("{}", "Synthesizing schema...".cyan());
    let output = generator.generate(&units)?;
    println!(
        "  {} rpc(s), {} message(s)",
        output.rpcs.to_string().green(),
        output.messages.to_string().green()
    );

    let writer = FileWriter::new(dry_run).with_overwrite(force);
    match writer.write(&output.path, &output.content)? {
        WriteResult::Written { path, bytes } => {
            println!("{} Written {} bytes to {}", "✓".green(), bytes, path.display());
        }
        WriteResult::Unchanged { path } => {
            println!(
                "{} {} already exists, left unchanged (use --force to replace)",
                "-".yellow(),
                path.display()
            );
        }
        WriteResult::DryRun { content, path } => {
            println!("{} Would write to {}:", "[dry-run]".yellow(), path.display());
            println!("{}", "─".repeat(60).dimmed());
            println!("{}", content);
            println!("{}", "─".repeat(60).dimmed());
        }
    }

    Ok(())
}

fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    ConfigManager::init(&output, force)?;
    println!("{} Created configuration file: {}", "✓".green(), output.display());
    Ok(())
}

fn cmd_validate(schema_path: PathBuf, target: TargetArgs) -> Result<(), CliError> {
    println!("{}", "Validating schema...".cyan());

    if !schema_path.exists() {
        return Err(CliError::Validation(format!(
            "Schema file not found: {}",
            schema_path.display()
        )));
    }
    let existing = std::fs::read_to_string(&schema_path)?;

    let generator = schema_generator(&target, None)?;
    let units = generator.load_units(target.filter.as_deref())?;
    let output = generator.generate(&units)?;

    if existing.trim() == output.content.trim() {
        println!("{} Schema is up-to-date", "✓".green());
        Ok(())
    } else {
        println!("{} Schema is out of date", "✗".red());
        println!("  Run 'grpc-bridge generate --force' to update");
        Err(CliError::Validation(format!(
            "{} is out of date",
            schema_path.display()
        )))
    }
}

fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}

fn format_parse_error(error: &ParseError) -> String {
    match error {
        ParseError::Syntax {
            file,
            line,
            column,
            message,
        } => format!("{}:{}:{}: {}", file.display(), line, column, message),
        ParseError::Multiple(errors) => errors
            .iter()
            .map(format_parse_error)
            .collect::<Vec<_>>()
            .join("\n  "),
    }
}
