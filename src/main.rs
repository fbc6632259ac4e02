//! schemalint CLI
//!
//! Entry point for the command-line tool.
//!
//! Exit codes:
//! - 0: No findings at or above the configured severity threshold
//! - 1: One or more findings at or above the threshold
//! - 2: Tool error (config error, parse failure, I/O error, etc.)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use schemalint::config::DEFAULT_CONFIG_FILE;
use schemalint::fix::aggregate_fixes;
use schemalint::ignore::load_ignore_file;
use schemalint::output::OutputFormat;
use schemalint::pipeline::{LintMode, LintOptions};
use schemalint::{Config, LintPipeline, RuleId, RuleRegistry};

#[derive(Parser, Debug)]
#[command(name = "schemalint")]
#[command(about = "Static analyzer for PostgreSQL migration scripts", long_about = None)]
struct Args {
    /// Migration files or directories (defaults to [lint] paths from config)
    paths: Vec<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, env = "SCHEMALINT_CONFIG")]
    config: Option<PathBuf>,

    /// Also run schema-scoped rules over the whole migration history
    #[arg(long)]
    schema: bool,

    /// Override output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Append corrective statements to the affected migration files
    #[arg(long)]
    fix: bool,

    /// Explain a specific rule (e.g., --explain schema/fk-without-index)
    #[arg(long)]
    explain: Option<String>,

    /// List every rule with its default severity
    #[arg(long)]
    list_rules: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(has_findings_above_threshold) => {
            if has_findings_above_threshold {
                std::process::exit(1);
            }
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            std::process::exit(2);
        }
    }
}

/// Run the lint pipeline.
///
/// Returns `Ok(true)` if findings at or above the severity threshold were found,
/// `Ok(false)` if no findings met the threshold, or `Err` on tool errors.
fn run(args: Args) -> Result<bool> {
    if let Some(rule_id) = args.explain {
        explain_rule(&rule_id)?;
        return Ok(false);
    }
    if args.list_rules {
        list_rules();
        return Ok(false);
    }

    let config = load_config(&args.config)?;

    let paths = if args.paths.is_empty() {
        config.lint.paths.clone()
    } else {
        args.paths
    };
    let mode = if args.schema {
        LintMode::Schema
    } else {
        config.lint.mode
    };

    let pipeline = LintPipeline::new(LintOptions {
        mode,
        batch_width: config.lint.batch_width,
        overrides: config.rule_overrides(),
        ignore: load_ignore_file(&config.lint.ignore_file),
    });

    let report = pipeline
        .lint_paths(&paths)
        .context("Failed to lint migrations")?;

    if args.fix {
        let fixes = aggregate_fixes(&report.results, pipeline.cache());
        for (path, content) in &fixes {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write fixes to {}", path.display()))?;
            eprintln!("schemalint: appended fixes to {}", path.display());
        }
    }

    let format = args.format.unwrap_or(config.output.format);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    format
        .reporter()
        .emit(&report, &mut handle)
        .context(format!("Failed to write {} report", format))?;

    Ok(config
        .fail_on()
        .is_some_and(|threshold| report.has_findings_at(threshold)))
}

/// Load configuration from file.
///
/// If `config_path` is `Some`, the user explicitly asked for that file and it
/// must exist and be valid. Otherwise the default path is tried; a missing
/// default file means defaults, and an invalid one falls back to defaults
/// with a warning.
fn load_config(config_path: &Option<PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::from_file(path).context("Failed to load configuration")
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default_path.exists() {
                tracing::debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(Config::default());
            }
            match Config::from_file(&default_path) {
                Ok(config) => Ok(config),
                Err(err) => {
                    tracing::warn!(
                        path = %default_path.display(),
                        error = %err,
                        "invalid configuration, using defaults"
                    );
                    Ok(Config::default())
                }
            }
        }
    }
}

fn explain_rule(rule_id: &str) -> Result<()> {
    let mut registry = RuleRegistry::new();
    registry.register_defaults();

    let rule = rule_id
        .parse::<RuleId>()
        .ok()
        .and_then(|id| registry.get_by_id(id));
    let Some(rule) = rule else {
        anyhow::bail!("Unknown rule: {}", rule_id);
    };

    println!("Rule: {}", rule.id());
    println!("Severity: {}", rule.default_severity());
    println!("Scope: {}", rule.scope());
    println!("Description: {}", rule.description());
    if let Some(url) = rule.docs_url() {
        println!("Docs: {}", url);
    }
    println!();
    println!("{}", rule.explain());

    Ok(())
}

fn list_rules() {
    let mut registry = RuleRegistry::new();
    registry.register_defaults();

    for rule in registry.iter() {
        println!(
            "{:<40} {:<8} {}",
            rule.id().as_str(),
            rule.default_severity().as_str(),
            rule.description()
        );
    }
}
