//! Print what the loader sees: per-sheet headers, the resolved column roles and
//! the first few decoded rows. Usage: dump_workbook <file> [rows]

use std::path::PathBuf;
use std::process::ExitCode;

use box_occupancy_lib::excel::load_workbook;
use box_occupancy_lib::services::{classify_header, resolve_columns};
use box_occupancy_lib::{logger, Settings};

const DEFAULT_ROWS: usize = 5;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: dump_workbook <file> [rows]");
        return ExitCode::from(2);
    };
    let max_rows = args
        .next()
        .and_then(|n| n.parse::<usize>().ok())
        .unwrap_or(DEFAULT_ROWS);

    let settings = Settings::from_env().unwrap_or_default();
    let _ = logger::init_logging(&settings.log_filter);

    let workbook = match load_workbook(&path, settings.header_row) {
        Ok(wb) => wb,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    for sheet in &workbook.sheets {
        println!("== {} ({} rows)", sheet.name, sheet.rows.len());
        for header in &sheet.headers {
            let role = classify_header(header)
                .map(|r| r.as_str())
                .unwrap_or("-");
            println!("  {:<40} {}", header, role);
        }
        for row in sheet.rows.iter().take(max_rows) {
            let cells: Vec<String> = row.cells.iter().map(|(_, v)| v.render()).collect();
            println!("  | {}", cells.join(" | "));
        }
    }

    match resolve_columns(&workbook.headers()) {
        Ok(roles) => match serde_json::to_string_pretty(&roles) {
            Ok(json) => println!("roles: {}", json),
            Err(e) => eprintln!("{}", e),
        },
        Err(e) => println!("roles: {}", e),
    }
    ExitCode::SUCCESS
}
