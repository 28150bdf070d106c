use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use fleet_arrears::extract::{DEFAULT_MIN_SHEET_ROWS, ExtractOptions, WorkbookExtraction};
use fleet_arrears::header::DEFAULT_HEADER_WINDOW;
use fleet_arrears::pipeline::{self, OutputFormat};
use fleet_arrears::{ExtractError, Result};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_logging() {
        eprintln!("error: {error}");
        return ExitCode::FAILURE;
    }
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            if error.is_client_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
        .map_err(|error| ExtractError::Logging(error.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Extract(args) => execute_extract(args),
    }
}

fn execute_extract(args: ExtractArgs) -> Result<()> {
    let options = args.options();
    let staging_dir = args.staging_dir.clone().unwrap_or_else(std::env::temp_dir);

    let extraction = read_input(&args, &staging_dir, options)?;
    let rows = pipeline::require_records(extraction)?;

    match &args.output {
        Some(path) => pipeline::write_records(path, &rows, args.output_format()),
        None => pipeline::write_json(io::stdout().lock(), &rows, args.pretty),
    }
}

fn read_input(
    args: &ExtractArgs,
    staging_dir: &Path,
    options: ExtractOptions,
) -> Result<WorkbookExtraction> {
    if args.input.as_os_str() == "-" {
        let extension = args.extension.as_deref().unwrap_or_default();
        return pipeline::extract_upload(&mut io::stdin().lock(), extension, staging_dir, options);
    }
    pipeline::extract_copy(&args.input, args.extension.as_deref(), staging_dir, options)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Extract vehicle-collections records from loosely formatted spreadsheets."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the record table from one workbook.
    Extract(ExtractArgs),
}

#[derive(clap::Args)]
struct ExtractArgs {
    /// Workbook path, or `-` to read the file from stdin.
    #[arg(long)]
    input: PathBuf,

    /// Declared file extension (xlsx, xlsm, xlsb, xls, ods). Required for stdin.
    #[arg(long, required_if_eq("input", "-"))]
    extension: Option<String>,

    /// Output file path. JSON goes to stdout when omitted.
    #[arg(long, required_if_eq("format", "xlsx"))]
    output: Option<PathBuf>,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = OutputKind::Json)]
    format: OutputKind,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Directory where inputs are staged during extraction.
    #[arg(long)]
    staging_dir: Option<PathBuf>,

    /// Leading rows of each sheet searched for the header.
    #[arg(long, default_value_t = DEFAULT_HEADER_WINDOW)]
    header_window: usize,

    /// Sheets with fewer rows than this are skipped.
    #[arg(long, default_value_t = DEFAULT_MIN_SHEET_ROWS)]
    min_rows: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    Json,
    Xlsx,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        ExtractOptions {
            header_window: self.header_window,
            min_sheet_rows: self.min_rows,
        }
    }

    fn output_format(&self) -> OutputFormat {
        match self.format {
            OutputKind::Json => OutputFormat::Json {
                pretty: self.pretty,
            },
            OutputKind::Xlsx => OutputFormat::Xlsx,
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputKind::Json => write!(f, "json"),
            OutputKind::Xlsx => write!(f, "xlsx"),
        }
    }
}
