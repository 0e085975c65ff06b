use acled_concat::cli::run::RunOptions;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "acled-concat")]
#[command(about = "Consolidate multiple ACLED CSV files into one unified dataset", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Directory containing ACLED source files
    source_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output file name, written into the source directory
    #[arg(long)]
    output: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Init {
        #[arg(long)]
        stdout: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "acled_concat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config {
            action: ConfigAction::Init { stdout },
        }) => {
            if let Err(e) = acled_concat::cli::config::init(stdout) {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        None => {
            let Some(source_dir) = cli.source_dir else {
                eprintln!("Error: missing source directory");
                eprintln!("Usage: acled-concat [--config <PATH>] [--output <NAME>] <SOURCE_DIR>");
                return ExitCode::FAILURE;
            };

            let options = RunOptions {
                source_dir,
                config_path: cli.config,
                output_filename: cli.output,
            };

            if let Err(e) = acled_concat::cli::run::run(&options) {
                error!("Failed to consolidate ACLED data: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
