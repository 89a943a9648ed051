//! ServeCoach CLI: command-line interface for serve analysis.
//!
//! Usage:
//!   servecoach analyze <LANDMARKS>   Detect serve phases and print feedback
//!   servecoach validate <LANDMARKS>  Check a landmark stream before analysis
//!   servecoach prompt <EXPORT>       Print the coaching prompt for an export
//!   servecoach config                Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use servecoach_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "servecoach",
    about = "Volleyball serve phase detection and coaching feedback",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Use this config file instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a landmark stream and print coaching feedback
    Analyze {
        /// Path to the landmark JSONL file
        landmarks: PathBuf,

        /// Video frame rate (overrides config)
        #[arg(long)]
        fps: Option<u32>,

        /// Serving arm: right|left (overrides config)
        #[arg(long)]
        arm: Option<String>,

        /// Never measure the mirrored arm
        #[arg(long)]
        no_mirror_fallback: bool,

        /// Minimum landmark visibility (overrides config)
        #[arg(long)]
        min_visibility: Option<f64>,

        /// Write the diagnostic session export here
        #[arg(long)]
        export: Option<PathBuf>,

        /// Write the feedback report as JSON here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Request narrative coaching feedback from the configured service
        #[arg(long)]
        enrich: bool,
    },

    /// Validate a landmark stream
    Validate {
        /// Path to the landmark JSONL file
        landmarks: PathBuf,
    },

    /// Print the enrichment prompt for a saved session export
    Prompt {
        /// Path to a session export JSON file
        export: PathBuf,

        /// Feedback report JSON to embed (re-evaluated from the export if omitted)
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Persist the effective configuration to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    servecoach_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Analyze {
            landmarks,
            fps,
            arm,
            no_mirror_fallback,
            min_visibility,
            export,
            output,
            enrich,
        } => {
            if let Some(fps) = fps {
                config.analysis.frame_rate = fps;
            }
            if let Some(arm) = arm {
                config.analysis.serving_arm = arm;
            }
            if no_mirror_fallback {
                config.analysis.mirror_fallback = false;
            }
            if let Some(min_visibility) = min_visibility {
                config.analysis.min_visibility = min_visibility;
            }
            commands::analyze::run(
                &config,
                landmarks,
                commands::analyze::Outputs {
                    export,
                    report: output,
                },
                enrich,
            )
            .await
        }
        Commands::Validate { landmarks } => commands::validate::run(&config, landmarks),
        Commands::Prompt { export, report } => commands::prompt::run(export, report),
        Commands::Config { write } => commands::config::run(&config, cli.config, write),
    }
}
