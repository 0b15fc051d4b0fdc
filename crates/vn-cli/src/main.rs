use clap::{Parser, Subcommand, ValueEnum};
use similar::{ChangeTag, TextDiff};
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vn_core::{Settings, ValidationReport, Validator, load_config};

#[derive(Parser)]
#[command(name = "vnetctl")]
#[command(version, about = "Virtual network topology validation", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a topology and print its normalized form
    Validate {
        #[arg(short, long, default_value = "vnet.yaml")]
        file: PathBuf,
        /// Validator settings (supported machine types, VLAN link check scope)
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
        /// Show what normalization changed instead of the full output
        #[arg(long)]
        diff: bool,
    },
    /// Only report whether a topology is valid
    Check {
        #[arg(short, long, default_value = "vnet.yaml")]
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Validate {
            file,
            settings,
            format,
            diff,
        } => validate(&file, settings.as_deref(), format, diff),
        Commands::Check { file } => check(&file),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Validate `file`, returning the description as loaded alongside the report
fn run_validator(
    file: &Path,
    settings: Option<&Path>,
) -> anyhow::Result<(Value, ValidationReport)> {
    let config = load_config(file)?;
    let settings = match settings {
        Some(path) => {
            tracing::debug!("Loading validator settings from {}", path.display());
            Settings::from_file(path)?
        }
        None => Settings::default(),
    };

    let mut validator = Validator::new(&config).with_settings(settings);
    validator.run();
    eprintln!("{}", validator);

    Ok((config, validator.report()))
}

/// Progress and problems go to stderr so stdout carries only the document
fn validate(
    file: &Path,
    settings: Option<&Path>,
    format: Format,
    diff: bool,
) -> anyhow::Result<()> {
    eprintln!("🔍 Validating topology from {}", file.display());
    let (config, report) = run_validator(file, settings)?;

    if !report.is_successful() {
        for violation in &report.violations {
            eprintln!("❌ {}", violation);
        }
        anyhow::bail!("Topology validation failed. Please fix the problems above.");
    }
    eprintln!("✅ Topology validation passed");

    print!("{}", render_document(&config, &report, format, diff)?);
    Ok(())
}

/// The document `validate` writes to stdout: the normalized description, or
/// its diff against the description as loaded
fn render_document(
    config: &Value,
    report: &ValidationReport,
    format: Format,
    diff: bool,
) -> anyhow::Result<String> {
    if diff {
        let original = serde_yaml::to_string(config)?;
        let normalized = serde_yaml::to_string(&report.normalized)?;
        return Ok(render_diff(&original, &normalized));
    }

    let rendered = match format {
        Format::Yaml => serde_yaml::to_string(&report.normalized)?,
        Format::Json => serde_json::to_string_pretty(&report.normalized)? + "\n",
    };
    Ok(rendered)
}

fn check(file: &Path) -> anyhow::Result<()> {
    let (_, report) = run_validator(file, None)?;
    report.display();

    if !report.is_successful() {
        anyhow::bail!("{} violation(s) found", report.violations.len());
    }
    Ok(())
}

fn render_diff(original: &str, normalized: &str) -> String {
    let diff = TextDiff::from_lines(original, normalized);
    let mut output = String::new();

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => '-',
            ChangeTag::Insert => '+',
            ChangeTag::Equal => ' ',
        };
        output.push(sign);
        output.push_str(change.value());
    }

    output
}
