// tsukiai - match purchase orders against invoice lines
// Data goes to stdout (or --output); summaries and logs go to stderr.

mod exit_codes;
mod logging;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_INPUT, EXIT_SUCCESS, EXIT_USAGE};
use recon::RunArgs;

#[derive(Parser)]
#[command(name = "tsukiai")]
#[command(about = "Reconcile purchase orders against invoices with typo-tolerant matching")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match every order against the invoice list and emit one diff row per order
    #[command(after_help = "\
Examples:
  tsukiai run --orders orders.csv --invoices invoices.json
  tsukiai run --orders orders.csv --invoices invoices.json -f csv -o diff.csv
  tsukiai run --input event.json --labels source
  tsukiai run --orders orders.json --invoices invoices.json -c monthly.recon.toml --workers 4

Exit codes:
  0  every order matched
  1  at least one order is UNMATCHED
  2  usage error
  3  input could not be read or parsed
  4  input has the wrong shape
  5  invalid config
  6  input file too large")]
    Run(RunArgs),

    /// Validate a recon config without running
    #[command(after_help = "\
Examples:
  tsukiai validate monthly.recon.toml")]
    Validate {
        /// Path to the .recon.toml config file
        config: PathBuf,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  tsukiai-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nengine:  tsukiai-recon ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
        )
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let quiet = matches!(&cli.command, Commands::Run(args) if args.quiet);
    logging::init(quiet);

    let result = match cli.command {
        Commands::Run(args) => recon::cmd_run(args),
        Commands::Validate { config } => recon::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INPUT, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
