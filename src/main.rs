//! FinMentor - financial decision engine CLI
//!
//! Entry point for the `finmentor` binary: single and batch classification,
//! what-if scoring, artifact verification and configuration management.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{info, info_span};
use uuid::Uuid;

use finmentor_engine::artifacts::ArtifactStore;
use finmentor_engine::batch::run_batch;
use finmentor_engine::config::{self, EngineConfig};
use finmentor_engine::engine::what_if;
use finmentor_engine::error::{Error, Result};
use finmentor_engine::logging::{self, LogGuards};
use finmentor_engine::types::{FinancialProfile, RawFinancialInput};
use finmentor_engine::version;
use finmentor_engine::{DecisionEngine, DecisionReport};

mod cli;

use cli::{ArtifactsSubcommand, Cli, Commands, ConfigSubcommand, EngineArgs, FiguresArgs};

/// Envelope printed by `finmentor classify`
#[derive(Serialize)]
struct ClassifyOutput {
    request_id: Uuid,
    generated_at: DateTime<Utc>,
    report: DecisionReport,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that need no configuration get minimal logging
    match &cli.command {
        Commands::Version { json } => {
            let info = version::build_info();
            if *json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                print!("{}", info);
            }
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Score {
            income,
            expense,
            emi,
            savings,
        } => {
            logging::init_simple(tracing::Level::WARN)?;
            let score = what_if(*income, *expense, *emi, *savings)?;
            println!("{}", serde_json::to_string_pretty(&score)?);
            return Ok(());
        }
        _ => {}
    }

    let engine_args = match &cli.command {
        Commands::Classify { engine, .. } | Commands::Batch { engine, .. } => engine.clone(),
        Commands::Artifacts {
            subcommand: ArtifactsSubcommand::Verify { engine },
        } => engine.clone(),
        _ => EngineArgs::default(),
    };
    let config = load_config(&engine_args)?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = init_logging_from_config(&config, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        artifacts = %config.artifacts.dir,
        "Starting FinMentor engine"
    );

    match cli.command {
        Commands::Classify {
            input,
            figures,
            pretty,
            ..
        } => run_classify(&config, input, figures, pretty),
        Commands::Batch {
            input,
            output,
            threads,
            ..
        } => run_batch_command(&config, &input, output, threads, cli.quiet),
        Commands::Artifacts {
            subcommand: ArtifactsSubcommand::Verify { .. },
        } => run_verify(&config),
        Commands::Version { .. } | Commands::Config { .. } | Commands::Score { .. } => {
            // Already handled above
            Ok(())
        }
    }
}

/// Load configuration and apply CLI overrides
fn load_config(args: &EngineArgs) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(args.config.as_deref())?;
    if let Some(ref dir) = args.artifacts {
        config.set_artifact_dir(dir);
    }
    if args.no_verify {
        config.artifacts.verify_checksums = false;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging_from_config(config: &EngineConfig, verbose: u8, quiet: bool) -> Result<LogGuards> {
    logging::init_logging(&config.logging, verbose, quiet)
}

fn run_classify(
    config: &EngineConfig,
    input: Option<String>,
    figures: FiguresArgs,
    pretty: bool,
) -> Result<()> {
    let request_id = Uuid::new_v4();
    let span = info_span!("classify", request_id = %request_id);
    let _enter = span.enter();

    let engine = DecisionEngine::from_config(config)?;

    let report = match input {
        Some(path) => {
            let path = PathBuf::from(path);
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            let profile: FinancialProfile = serde_json::from_str(&content).map_err(|e| {
                Error::invalid_input("input", format!("{}: {}", path.display(), e))
            })?;
            engine.evaluate_profile(&profile)?
        }
        None => engine.evaluate(&figures_to_input(&figures)?)?,
    };

    info!(
        persona = %report.ensemble.label,
        score = report.health.score,
        "Household classified"
    );

    let output = ClassifyOutput {
        request_id,
        generated_at: Utc::now(),
        report,
    };
    let json = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", json);
    Ok(())
}

fn figures_to_input(figures: &FiguresArgs) -> Result<RawFinancialInput> {
    match (figures.income, figures.expense, figures.savings) {
        (Some(income), Some(expense), Some(savings)) => {
            Ok(RawFinancialInput::new(income, expense, figures.emi, savings)
                .with_discretionary(figures.discretionary))
        }
        _ => Err(Error::invalid_input(
            "input",
            "Provide --input FILE or all of --income, --expense and --savings.",
        )),
    }
}

fn run_batch_command(
    config: &EngineConfig,
    input: &str,
    output: Option<String>,
    threads: Option<u32>,
    quiet: bool,
) -> Result<()> {
    let engine = DecisionEngine::from_config(config)?;

    let input_path = PathBuf::from(input);
    let reader = File::open(&input_path)
        .map(BufReader::new)
        .map_err(|e| Error::IoRead {
            path: input_path.clone(),
            source: e,
        })?;

    let threads = threads
        .map(|t| t.max(1) as usize)
        .unwrap_or_else(|| config.batch.threads());

    let summary = match output {
        Some(path) => {
            let path = PathBuf::from(path);
            let file = File::create(&path).map_err(|e| Error::IoWrite {
                path: path.clone(),
                source: e,
            })?;
            run_batch(&engine, reader, BufWriter::new(file), threads)?
        }
        None => {
            let stdout = io::stdout();
            run_batch(&engine, reader, stdout.lock(), threads)?
        }
    };

    if !quiet {
        eprintln!(
            "Processed {} households: {} succeeded, {} failed",
            summary.total, summary.succeeded, summary.failed
        );
    }
    Ok(())
}

fn run_verify(config: &EngineConfig) -> Result<()> {
    let store = ArtifactStore::new(&config.artifacts, &config.ensemble);
    let artifacts = store.get_or_load()?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Artifact directory: {}", store.dir().display())?;
    for file in &artifacts.files {
        writeln!(
            stdout,
            "  {:<12} {:>8} bytes  sha256:{}  {}",
            file.file,
            file.size_bytes,
            file.sha256,
            if file.verified { "verified" } else { "unchecked" }
        )?;
    }
    writeln!(stdout, "All artifacts loaded.")?;
    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = EngineConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let written = config::init_config(path.as_deref(), force)?;
            println!("Configuration written to {}", written.display());
        }
        ConfigSubcommand::Validate { config } => {
            EngineConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
