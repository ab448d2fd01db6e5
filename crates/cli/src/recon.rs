//! `tsukiai run` and `tsukiai validate`: order/invoice reconciliation.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use tsukiai_recon::config::OutputFormat;
use tsukiai_recon::input::{invoices_from_json, orders_from_json};
use tsukiai_recon::load::load_order_csv;
use tsukiai_recon::model::{InvoiceRecord, OrderRecord};
use tsukiai_recon::{output, LabelStyle, ReconConfig, ReconError, ReconInput, ReconResult};

use crate::exit_codes::{recon_exit_code, EXIT_TOO_LARGE, EXIT_UNMATCHED};
use crate::CliError;

/// Largest input file accepted, in bytes.
pub const MAX_INPUT_BYTES: u64 = 1024 * 1024;

#[derive(Args)]
pub struct RunArgs {
    /// Orders file: CSV with a header row, or a JSON array of objects
    #[arg(long, requires = "invoices")]
    pub orders: Option<PathBuf>,

    /// Invoices file: JSON array of objects, or of arrays of objects
    #[arg(long, requires = "orders")]
    pub invoices: Option<PathBuf>,

    /// Combined `{"orders": [...], "invoices": [...]}` document
    #[arg(long, conflicts_with_all = ["orders", "invoices"])]
    pub input: Option<PathBuf>,

    /// Path to a .recon.toml config file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Output format (overrides config)
    #[arg(long, short = 'f')]
    pub format: Option<FormatArg>,

    /// Write output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Column naming for diff rows (overrides config)
    #[arg(long)]
    pub labels: Option<LabelsArg>,

    /// Worker threads for matching (overrides config)
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    pub workers: Option<u16>,

    /// Per-field edit distance tolerance (overrides config)
    #[arg(long)]
    pub max_distance: Option<usize>,

    /// Suppress the stderr summary
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Json,
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LabelsArg {
    /// order_vendor_name, invoice_vendor_name, ...
    Ascii,
    /// order_業者名, invoice_業者名, ...
    Source,
}

impl From<LabelsArg> for LabelStyle {
    fn from(arg: LabelsArg) -> Self {
        match arg {
            LabelsArg::Ascii => LabelStyle::Ascii,
            LabelsArg::Source => LabelStyle::Source,
        }
    }
}

fn recon_err(err: ReconError) -> CliError {
    CliError { code: recon_exit_code(&err), message: err.to_string(), hint: None }
}

pub fn cmd_run(args: RunArgs) -> Result<(), CliError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ReconConfig::default(),
    };
    apply_overrides(&mut config, &args);
    tracing::debug!(
        config = %config.name,
        max_distance = config.tolerance.max_distance,
        workers = config.engine.workers,
        "resolved config"
    );

    let input = load_input(&args)?;
    let result = tsukiai_recon::run(&config, &input);

    let bytes = match config.output.format {
        OutputFormat::Json => output::write_json(&result),
        OutputFormat::Csv => output::write_csv(&result.diff_rows, config.output.labels),
    }
    .map_err(recon_err)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes).map_err(|e| {
                CliError::io(format!("cannot write {}: {e}", path.display()))
            })?;
            if !args.quiet {
                eprintln!("wrote {}", path.display());
            }
        }
        None => {
            use std::io::Write;
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&bytes)
                .and_then(|_| handle.flush())
                .map_err(|e| CliError::io(e.to_string()))?;
        }
    }

    if !args.quiet {
        print_summary(&result);
    }

    // exit 1 with no message; the summary carries the count
    if result.summary.unmatched > 0 {
        return Err(CliError { code: EXIT_UNMATCHED, message: String::new(), hint: None });
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "valid: recon '{}' (max_distance {}, {} worker(s), {:?} labels)",
        config.name, config.tolerance.max_distance, config.engine.workers, config.output.labels,
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read config {}: {e}", path.display())))?;
    ReconConfig::from_toml(&text).map_err(|e| {
        recon_err(e).with_hint(format!("check {}", path.display()))
    })
}

fn apply_overrides(config: &mut ReconConfig, args: &RunArgs) {
    if let Some(format) = args.format {
        config.output.format = format.into();
    }
    if let Some(labels) = args.labels {
        config.output.labels = labels.into();
    }
    if let Some(workers) = args.workers {
        config.engine.workers = usize::from(workers);
    }
    if let Some(max_distance) = args.max_distance {
        config.tolerance.max_distance = max_distance;
    }
}

fn load_input(args: &RunArgs) -> Result<ReconInput, CliError> {
    if let Some(path) = &args.input {
        let text = read_capped(path)?;
        return ReconInput::from_json_str(&text).map_err(|e| with_path(e, path));
    }

    match (&args.orders, &args.invoices) {
        (Some(orders), Some(invoices)) => Ok(ReconInput {
            orders: load_orders(orders)?,
            invoices: load_invoices(invoices)?,
        }),
        _ => Err(CliError::args("missing input")
            .with_hint("pass --orders and --invoices, or --input with a combined document")),
    }
}

fn load_orders(path: &Path) -> Result<Vec<OrderRecord>, CliError> {
    let text = read_capped(path)?;
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        return load_order_csv(&text).map_err(|e| with_path(e, path));
    }
    let value = parse_json(&text, path)?;
    orders_from_json(&value).map_err(|e| with_path(e, path))
}

fn load_invoices(path: &Path) -> Result<Vec<InvoiceRecord>, CliError> {
    let text = read_capped(path)?;
    let value = parse_json(&text, path)?;
    invoices_from_json(&value).map_err(|e| with_path(e, path))
}

fn parse_json(text: &str, path: &Path) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(text).map_err(|e| with_path(ReconError::from(e), path))
}

fn with_path(err: ReconError, path: &Path) -> CliError {
    let code = recon_exit_code(&err);
    CliError { code, message: format!("{}: {err}", path.display()), hint: None }
}

/// Read a UTF-8 file, refusing anything over [`MAX_INPUT_BYTES`].
fn read_capped(path: &Path) -> Result<String, CliError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;

    if meta.len() > MAX_INPUT_BYTES {
        return Err(CliError {
            code: EXIT_TOO_LARGE,
            message: format!(
                "{}: {} bytes exceeds the {} byte limit",
                path.display(),
                meta.len(),
                MAX_INPUT_BYTES
            ),
            hint: Some("split the batch into smaller files".into()),
        });
    }

    std::fs::read_to_string(path)
        .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))
}

fn print_summary(result: &ReconResult) {
    let s = &result.summary;
    eprintln!(
        "recon '{}': {} order(s), {} matched, {} unmatched",
        result.meta.config_name, s.total_orders, s.matched, s.unmatched,
    );
    eprintln!(
        "invoices: {} total, {} used, {} unused, {} reused",
        s.invoices, s.invoices_used, s.invoices_unused, s.invoices_reused,
    );
}
