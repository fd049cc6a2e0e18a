//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the FinMentor engine.

use clap::{Args, Parser, Subcommand};

/// FinMentor - financial decision engine
///
/// Classifies a household's monthly finances into a persona, scores its
/// financial health and suggests an action plan.
#[derive(Parser, Debug)]
#[command(name = "finmentor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by the commands that load artifacts
#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Path to configuration file
    #[arg(short, long, env = "FINMENTOR_CONFIG")]
    pub config: Option<String>,

    /// Artifact directory (overrides the configuration)
    #[arg(short, long)]
    pub artifacts: Option<String>,

    /// Skip manifest checksum verification
    #[arg(long)]
    pub no_verify: bool,
}

/// Monthly figures given directly on the command line
#[derive(Args, Debug, Clone, Default)]
pub struct FiguresArgs {
    /// Monthly income
    #[arg(long)]
    pub income: Option<f64>,

    /// Total monthly expenses
    #[arg(long)]
    pub expense: Option<f64>,

    /// Total monthly EMI payments
    #[arg(long, default_value_t = 0.0)]
    pub emi: f64,

    /// Declared monthly savings
    #[arg(long)]
    pub savings: Option<f64>,

    /// Discretionary part of the expenses
    #[arg(long, default_value_t = 0.0)]
    pub discretionary: f64,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify one household
    Classify {
        #[command(flatten)]
        engine: EngineArgs,

        /// JSON request document (use instead of the figure flags)
        #[arg(short, long, conflicts_with_all = ["income", "expense", "savings"])]
        input: Option<String>,

        #[command(flatten)]
        figures: FiguresArgs,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Classify a JSON-lines file, one household per line
    Batch {
        #[command(flatten)]
        engine: EngineArgs,

        /// Input file (JSON lines)
        #[arg(short, long)]
        input: String,

        /// Output file (JSON lines, stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Worker threads (overrides the configuration)
        #[arg(long)]
        threads: Option<u32>,
    },

    /// Recompute the health score for adjusted figures, without models
    Score {
        /// Monthly income
        #[arg(long)]
        income: f64,

        /// Total monthly expenses
        #[arg(long)]
        expense: f64,

        /// Total monthly EMI payments
        #[arg(long, default_value_t = 0.0)]
        emi: f64,

        /// Declared monthly savings
        #[arg(long, default_value_t = 0.0)]
        savings: f64,
    },

    /// Artifact management
    Artifacts {
        #[command(subcommand)]
        subcommand: ArtifactsSubcommand,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Display version and build information
    Version {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Artifact subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ArtifactsSubcommand {
    /// Load every enabled artifact and check the manifest checksums
    Verify {
        #[command(flatten)]
        engine: EngineArgs,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_classify_with_figures() {
        let cli = Cli::parse_from([
            "finmentor", "classify", "--income", "50000", "--expense", "20000", "--emi", "5000",
            "--savings", "15000",
        ]);
        match cli.command {
            Commands::Classify { input, figures, engine, pretty } => {
                assert!(input.is_none());
                assert_eq!(figures.income, Some(50000.0));
                assert_eq!(figures.emi, 5000.0);
                assert_eq!(figures.discretionary, 0.0);
                assert!(engine.artifacts.is_none());
                assert!(!pretty);
            }
            _ => panic!("Expected Classify command"),
        }
    }

    #[test]
    fn test_classify_input_conflicts_with_figures() {
        let result = Cli::try_parse_from([
            "finmentor", "classify", "--input", "req.json", "--income", "100",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_command() {
        let cli = Cli::parse_from([
            "finmentor", "batch", "--input", "in.jsonl", "--artifacts", "/models", "--threads", "4",
        ]);
        match cli.command {
            Commands::Batch { input, output, engine, threads } => {
                assert_eq!(input, "in.jsonl");
                assert!(output.is_none());
                assert_eq!(engine.artifacts.as_deref(), Some("/models"));
                assert_eq!(threads, Some(4));
            }
            _ => panic!("Expected Batch command"),
        }
    }

    #[test]
    fn test_score_defaults() {
        let cli = Cli::parse_from(["finmentor", "score", "--income", "1000", "--expense", "500"]);
        match cli.command {
            Commands::Score { emi, savings, .. } => {
                assert_eq!(emi, 0.0);
                assert_eq!(savings, 0.0);
            }
            _ => panic!("Expected Score command"),
        }
    }

    #[test]
    fn test_artifacts_verify() {
        let cli = Cli::parse_from(["finmentor", "artifacts", "verify", "--no-verify"]);
        match cli.command {
            Commands::Artifacts {
                subcommand: ArtifactsSubcommand::Verify { engine },
            } => assert!(engine.no_verify),
            _ => panic!("Expected Artifacts Verify command"),
        }
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::parse_from(["finmentor", "config", "init", "--force"]);
        match cli.command {
            Commands::Config {
                subcommand: ConfigSubcommand::Init { path, force },
            } => {
                assert!(path.is_none());
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["finmentor", "-vv", "version"]);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.quiet);
    }
}
