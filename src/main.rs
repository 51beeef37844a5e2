use std::path::PathBuf;
use std::process::ExitCode;

use box_occupancy_lib::commands::{self, to_response, UploadError};
use box_occupancy_lib::{logger, AggregationMode, AppState, Settings};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::error;

#[derive(Parser)]
#[command(name = "box-occupancy", author, version, about = "Aggregate storage box occupancy from Excel exports", long_about = None)]
struct Cli {
    /// Pretty-print the JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dense per-box breakdown for the box grid
    Visualize {
        /// Workbook to process (.xls, .xlsx, .xlsm, .ods)
        file: PathBuf,
    },
    /// Status totals and frequency tables
    Report {
        file: PathBuf,
        /// Also write the tables to this .xlsx (a timestamped name is used when no path is given)
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        export: Option<String>,
    },
    /// List sheet names
    Sheets { file: PathBuf },
}

fn print_json(value: &Value, pretty: bool) {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match text {
        Ok(text) => println!("{}", text),
        Err(e) => error!(target: "box_occupancy::cli", error = %e, "could not serialize output"),
    }
}

fn exit_code(status: u16) -> ExitCode {
    match status {
        200 => ExitCode::SUCCESS,
        400..=499 => ExitCode::from(2),
        _ => ExitCode::from(1),
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };
    if let Err(e) = logger::init_logging(&settings.log_filter) {
        eprintln!("{}", e);
    }
    let state = AppState::new(settings);

    let (status, body) = match args.command {
        Commands::Visualize { file } => {
            to_response(commands::process_upload(&state, &file, AggregationMode::Visualization))
        }
        Commands::Report { file, export: None } => {
            to_response(commands::process_upload(&state, &file, AggregationMode::Reporting))
        }
        Commands::Report {
            file,
            export: Some(output),
        } => {
            let output = if output.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(output))
            };
            to_response(commands::export_report(&state, &file, output.as_deref()))
        }
        Commands::Sheets { file } => {
            to_response(commands::list_sheets(&file).map_err(UploadError::from))
        }
    };

    print_json(&body, args.pretty);
    exit_code(status)
}
