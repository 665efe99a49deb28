//! Check command - validates JSON documents against sigil schemas.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, bail};
use nu_ansi_term::Color;
use sigil_config::{CONFIG_FILENAME, SigilConfig, Target};
use sigil_schema::{SchemaNode, Scope, ValidateOptions, ValidationError, Validator};
use tracing::debug;

use crate::util::{display_path, load_schema, parse_document, parse_vars, read_input};

#[derive(clap::Args)]
pub struct Args {
    /// Path to JSON file to validate ("-" for stdin), or target names when
    /// using project mode. If omitted and Sigil.toml exists, runs project mode
    /// with default targets.
    #[arg(num_args = 0..)]
    pub files_or_targets: Vec<String>,

    /// Path to schema file. Without it, file mode looks the schema up in
    /// Sigil.toml by matching the file against target globs.
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// Name of the validated value in error messages
    #[arg(short, long, default_value = "value")]
    pub name: String,

    /// Pre-bound variable as NAME=JSON (repeatable)
    #[arg(long = "var", value_name = "NAME=JSON")]
    pub vars: Vec<String>,

    /// Quiet mode: suppress per-file/per-target output on success (prints a single summary line).
    #[arg(short, long)]
    pub quiet: bool,

    /// Run all targets defined in Sigil.toml
    #[arg(long)]
    pub all: bool,
}

/// Runs the check. Returns `Ok(false)` when any document is invalid.
pub fn run(args: Args) -> anyhow::Result<bool> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;

    if args.schema.is_none()
        && let Some(config_path) = SigilConfig::find_config_file(&current_dir)
    {
        run_project_mode(args, &config_path, &current_dir)
    } else if args.files_or_targets.is_empty() {
        eprintln!(
            "{}",
            Color::Red.paint("Error: No file specified and no Sigil.toml found")
        );
        eprintln!("Usage: sigil check <file> --schema <schema>");
        eprintln!("       sigil check [targets...] (with Sigil.toml)");
        Ok(false)
    } else {
        let Some(schema_path) = args.schema.clone() else {
            bail!("No schema specified; pass --schema <schema.json>");
        };
        run_file_mode(args, &schema_path)
    }
}

// =============================================================================
// File mode
// =============================================================================

fn run_file_mode(args: Args, schema_path: &Path) -> anyhow::Result<bool> {
    let [file] = args.files_or_targets.as_slice() else {
        bail!("File mode validates exactly one document");
    };

    let start = Instant::now();
    let validator = Validator::new();
    let schema = load_schema(schema_path)?;
    let file_opt = Some(file.as_str());
    let content = read_input(file_opt)?;
    let origin = display_path(file_opt);

    let document = Document {
        origin: origin.to_string(),
        content,
    };
    let result = check_document(&validator, &schema, &document, &args)?;
    let duration_s = start.elapsed().as_secs_f64();

    match result {
        Ok(()) => {
            if args.quiet {
                println!("sigil check: 1 file, ok in {duration_s:.2}s");
            } else {
                println!("{} {} is valid", Color::Green.bold().paint("✓"), origin);
            }
            Ok(true)
        }
        Err(error) => {
            if args.quiet {
                println!("sigil check: 1 file, 1 error in {duration_s:.2}s");
            }
            eprintln!("{}", format_error(&error));
            if !args.quiet {
                println!("{} {} is invalid", Color::Red.bold().paint("✗"), origin);
            }
            Ok(false)
        }
    }
}

// =============================================================================
// Project mode
// =============================================================================

fn run_project_mode(args: Args, config_path: &Path, current_dir: &Path) -> anyhow::Result<bool> {
    let start = Instant::now();
    let config = SigilConfig::load(config_path)
        .with_context(|| format!("Error loading {CONFIG_FILENAME}"))?;
    let config_dir = config_path.parent().unwrap_or(Path::new("."));
    debug!(config = %config_path.display(), "project mode");

    let target_names = match select_targets(&config, &args) {
        Selection::Targets(names) => names,
        Selection::File => {
            let file = current_dir.join(&args.files_or_targets[0]);
            let Some(schema_path) = config.schema_for_path(&file, config_dir) else {
                bail!(
                    "No target in {CONFIG_FILENAME} matches {}; pass --schema",
                    file.display()
                );
            };
            return run_file_mode(args, &schema_path);
        }
        Selection::Empty => {
            eprintln!(
                "{}",
                Color::Yellow.paint("No targets specified. Add default-targets to Sigil.toml or use --all")
            );
            print_available_targets(&config);
            return Ok(true);
        }
        Selection::Unknown(name) => {
            eprintln!(
                "{}",
                Color::Red.paint(format!("Error: Unknown target '{name}'"))
            );
            print_available_targets(&config);
            return Ok(false);
        }
    };

    let validator = Validator::new();
    let mut total_files = 0;
    let mut total_errors = 0;

    for name in &target_names {
        let Some(target) = config.get_target(name) else {
            continue;
        };
        if !args.quiet {
            println!(
                "\n{} Checking target: {}",
                Color::Blue.bold().paint("→"),
                Color::Cyan.paint(name.as_str())
            );
        }
        let report = check_target(&validator, target, config_dir, &args)?;
        if report.files == 0 && !args.quiet {
            println!(
                "  {}",
                Color::Yellow.paint(format!("No files matched for target '{name}'"))
            );
        }
        for (path, error) in &report.failures {
            eprintln!("{}", format_error(error));
            eprintln!("  {} {}", Color::Red.paint("✗"), path.display());
        }
        total_files += report.files;
        total_errors += report.failures.len();
    }

    let duration_s = start.elapsed().as_secs_f64();
    let target_count = target_names.len();
    if args.quiet {
        if total_errors == 0 {
            println!(
                "sigil check: {total_files} file(s), {target_count} target(s), ok in {duration_s:.2}s"
            );
        } else {
            println!(
                "sigil check: {total_files} file(s), {target_count} target(s), {total_errors} error(s) in {duration_s:.2}s"
            );
        }
    } else {
        println!();
        if total_errors == 0 {
            println!(
                "{} Checked {total_files} file(s) in {target_count} target(s) - all valid",
                Color::Green.bold().paint("✓"),
            );
        } else {
            println!(
                "{} Checked {total_files} file(s) in {target_count} target(s) - {total_errors} error(s)",
                Color::Red.bold().paint("✗"),
            );
        }
    }
    Ok(total_errors == 0)
}

#[derive(Debug, PartialEq)]
enum Selection {
    Targets(Vec<String>),
    /// The first argument is an existing file, not a target name. Its schema
    /// comes from the target whose globs match it.
    File,
    Empty,
    Unknown(String),
}

fn select_targets(config: &SigilConfig, args: &Args) -> Selection {
    let names: Vec<String> = if args.all {
        config.target_names().map(str::to_string).collect()
    } else if args.files_or_targets.is_empty() {
        config.default_targets().to_vec()
    } else {
        let first = &args.files_or_targets[0];
        if config.get_target(first).is_none() && Path::new(first).exists() {
            return Selection::File;
        }
        args.files_or_targets.clone()
    };

    if names.is_empty() {
        return Selection::Empty;
    }
    if let Some(unknown) = names.iter().find(|name| config.get_target(name).is_none()) {
        return Selection::Unknown(unknown.clone());
    }
    Selection::Targets(names)
}

fn print_available_targets(config: &SigilConfig) {
    println!("\nAvailable targets:");
    for name in config.target_names() {
        println!("  - {name}");
    }
}

#[derive(Debug, Default)]
struct TargetReport {
    files: usize,
    failures: Vec<(PathBuf, ValidationError)>,
}

fn check_target(
    validator: &Validator,
    target: &Target,
    config_dir: &Path,
    args: &Args,
) -> anyhow::Result<TargetReport> {
    let schema = load_schema(&target.schema_path(config_dir))?;
    let files = target.files(config_dir)?;
    let mut report = TargetReport {
        files: files.len(),
        failures: Vec::new(),
    };
    for path in files {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Error reading {}", path.display()))?;
        let document = Document {
            origin: path.display().to_string(),
            content,
        };
        if let Err(error) = check_document(validator, &schema, &document, args)? {
            report.failures.push((path, error));
        }
    }
    Ok(report)
}

// =============================================================================
// Shared
// =============================================================================

struct Document {
    origin: String,
    content: String,
}

/// Validate one document. The outer error is an I/O or parse failure, the
/// inner one a validation failure.
fn check_document(
    validator: &Validator,
    schema: &SchemaNode,
    document: &Document,
    args: &Args,
) -> anyhow::Result<Result<(), ValidationError>> {
    let value = parse_document(&document.content, &document.origin)?;
    let mut scope: Scope = parse_vars(&args.vars)?;
    let options = ValidateOptions::new().with_target_name(args.name.clone());
    debug!(document = %document.origin, "validating");
    Ok(validator.validate(schema, Some(&value), &mut scope, &options))
}

fn format_error(error: &ValidationError) -> String {
    let label = if error.is_schema_error() {
        Color::Magenta.bold().paint(format!("schema error[{}]", error.kind()))
    } else {
        Color::Red.bold().paint(format!("error[{}]", error.kind()))
    };
    format!(
        "{label}: {error}\n  {} {}",
        Color::DarkGray.paint("schema:"),
        error.schema()
    )
}
