use calamine::{open_workbook_auto, Data, Range, Reader};
use rust_xlsxwriter::{Color, Format, Workbook as XlsxWorkbook, Worksheet, XlsxError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult};
use crate::models::{AggregateResult, ColumnRole, FrequencyTable};
use crate::services::classify_header;
use crate::types::{CellValue, RawRow, Sheet, Workbook};

/// Rows scanned when looking for the header row.
const HEADER_SCAN_ROWS: usize = 20;

/// Column index to Excel letter (0→A, 1→B, 25→Z, 26→AA).
fn col_index_to_letter(index: u32) -> String {
    let mut n = index;
    let mut s = String::new();
    loop {
        let r = (n % 26) as u8;
        s.insert(0, (b'A' + r) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    s
}

fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_text(cell: &Data) -> String {
    cell_to_value(cell).render().trim().to_string()
}

/// First row (0-based) within the scan window that carries both a Box and a
/// Status header.
pub fn detect_header_row(range: &Range<Data>) -> Option<usize> {
    range
        .rows()
        .take(HEADER_SCAN_ROWS)
        .position(|row| {
            let roles: Vec<ColumnRole> = row
                .iter()
                .filter_map(|c| classify_header(&cell_text(c)))
                .collect();
            roles.contains(&ColumnRole::Box) && roles.contains(&ColumnRole::Status)
        })
}

/// Header names for a sheet. Trailing blanks are trimmed, inner blanks get a
/// positional name and repeated names get a ".N" suffix. `first_col` is the
/// sheet column of `row[0]`.
fn build_headers(row: &[Data], first_col: u32) -> Vec<String> {
    let mut texts: Vec<String> = row.iter().map(cell_text).collect();
    while texts.last().map(|s| s.is_empty()).unwrap_or(false) {
        texts.pop();
    }
    let mut headers: Vec<String> = Vec::with_capacity(texts.len());
    for (i, text) in texts.into_iter().enumerate() {
        let base = if text.is_empty() {
            format!("Coluna {}", col_index_to_letter(first_col + i as u32))
        } else {
            text
        };
        let mut name = base.clone();
        let mut n = 1;
        while headers.contains(&name) {
            name = format!("{}.{}", base, n);
            n += 1;
        }
        headers.push(name);
    }
    headers
}

/// Fallback when no row names both Box and Status: the first row with the
/// most non-empty cells in the scan window. Title rows usually have one cell.
fn widest_row(range: &Range<Data>) -> usize {
    let mut best = (0usize, 0usize);
    for (i, row) in range.rows().take(HEADER_SCAN_ROWS).enumerate() {
        let filled = row.iter().filter(|c| !cell_text(c).is_empty()).count();
        if filled > best.1 {
            best = (i, filled);
        }
    }
    best.0
}

/// Turn one worksheet range into a sheet. `header_row` is 1-based; None means
/// detect, falling back to the widest leading row.
pub fn range_to_sheet(name: &str, range: &Range<Data>, header_row: Option<u32>) -> Option<Sheet> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let header_idx = match header_row {
        Some(row) => {
            let absolute = row.saturating_sub(1);
            if absolute < start_row {
                debug!(
                    target: "box_occupancy::excel",
                    sheet = name,
                    header_row = row,
                    first_row = start_row + 1,
                    "configured header row is above the used range, skipped"
                );
                return None;
            }
            (absolute - start_row) as usize
        }
        None => detect_header_row(range).unwrap_or_else(|| widest_row(range)),
    };
    let headers = range
        .rows()
        .nth(header_idx)
        .map(|row| build_headers(row, start_col))
        .unwrap_or_default();
    if headers.is_empty() {
        debug!(target: "box_occupancy::excel", sheet = name, "sheet has no header row, skipped");
        return None;
    }

    let mut sheet = Sheet::new(name, headers);
    for row in range.rows().skip(header_idx + 1) {
        let cells = sheet
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), row.get(i).map(cell_to_value).unwrap_or(CellValue::Empty)))
            .collect();
        sheet.rows.push(RawRow::new(cells));
    }
    debug!(
        target: "box_occupancy::excel",
        sheet = name,
        header_row = start_row as usize + header_idx + 1,
        columns = sheet.headers.len(),
        rows = sheet.rows.len(),
        "sheet decoded"
    );
    Some(sheet)
}

/// Get list of sheet names from workbook.
pub fn sheet_names(path: &Path) -> CoreResult<Vec<String>> {
    if !path.exists() {
        return Err(CoreError::processing("Arquivo não encontrado."));
    }
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read every sheet of an .xls/.xlsx/.xlsm/.ods file, in workbook order.
pub fn load_workbook(path: &Path, header_row: Option<u32>) -> CoreResult<Workbook> {
    if !path.exists() {
        return Err(CoreError::processing("Arquivo não encontrado."));
    }
    let mut workbook = open_workbook_auto(path)?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => {
                return Err(CoreError::processing_with_source(
                    format!("Não foi possível ler a aba '{}'", name),
                    e,
                ))
            }
        };
        if let Some(sheet) = range_to_sheet(name, &range, header_row) {
            sheets.push(sheet);
        }
    }
    let workbook = Workbook::new(sheets);
    info!(
        target: "box_occupancy::excel",
        path = %path.display(),
        sheets = workbook.sheets.len(),
        rows = workbook.row_count(),
        "workbook loaded"
    );
    Ok(workbook)
}

const FREQUENCY_HEADERS: &[&str] = &[
    "Variável",
    "Freq. absoluta",
    "Freq. relativa (%)",
    "Freq. acumulada (%)",
];

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x2563EB))
        .set_font_color(Color::RGB(0xFFFFFF))
}

fn hex_to_color(hex: &str) -> Option<Color> {
    u32::from_str_radix(hex.trim_start_matches('#'), 16)
        .ok()
        .map(Color::RGB)
}

fn write_summary_sheet(worksheet: &mut Worksheet, result: &AggregateResult) -> Result<(), XlsxError> {
    worksheet.set_name("Resumo")?;
    let header = header_format();
    for (col, title) in ["Situação", "Total", "Cor"].iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    worksheet.set_column_width(0, 30.0)?;
    let mut row = 1u32;
    for status in &result.statuses {
        let total = result.status_totals.get(status).copied().unwrap_or(0);
        worksheet.write_string(row, 0, status)?;
        worksheet.write_number(row, 1, total as f64)?;
        if let Some(hex) = result.status_colors.get(status) {
            let swatch = match hex_to_color(hex) {
                Some(color) => Format::new().set_background_color(color),
                None => Format::new(),
            };
            worksheet.write_string_with_format(row, 2, hex, &swatch)?;
        }
        row += 1;
    }
    row += 1;
    let bold = Format::new().set_bold();
    let totals = [
        ("Total geral", result.grand_total as f64),
        ("Boxes ocupados", result.occupied_box_count as f64),
        ("Total de boxes", result.total_boxes_reported as f64),
    ];
    for (label, value) in totals {
        worksheet.write_string_with_format(row, 0, label, &bold)?;
        worksheet.write_number(row, 1, value)?;
        row += 1;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

fn write_frequency_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    table: &FrequencyTable,
) -> Result<(), XlsxError> {
    worksheet.set_name(name)?;
    let header = header_format();
    let percent = Format::new().set_num_format("0.00");
    for (col, title) in FREQUENCY_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &header)?;
    }
    worksheet.set_column_width(0, 35.0)?;
    for col in 1..FREQUENCY_HEADERS.len() as u16 {
        worksheet.set_column_width(col, 20.0)?;
    }
    for (i, entry) in table.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &entry.variable)?;
        worksheet.write_number(row, 1, entry.absolute_freq as f64)?;
        worksheet.write_number_with_format(row, 2, entry.relative_freq, &percent)?;
        worksheet.write_number_with_format(row, 3, entry.cumulative_relative_freq, &percent)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    Ok(())
}

/// Timestamped file name in `dir`, with a numeric suffix when it already exists.
fn unique_report_path(dir: &Path) -> PathBuf {
    let now = chrono::Local::now();
    let stamp = now.format("%Y%m%d_%H%M%S");
    let mut p = dir.join(format!("Relatorio_{}.xlsx", stamp));
    let mut counter = 2u32;
    while p.exists() {
        p = dir.join(format!("Relatorio_{}_{}.xlsx", stamp, counter));
        counter += 1;
    }
    p
}

/// Write a reporting result (status summary plus every frequency table) to a
/// new .xlsx. Without `path_override` the file goes to `export_dir`, else to
/// Downloads/Desktop. Returns the saved path.
pub fn export_report_to_excel(
    result: &AggregateResult,
    path_override: Option<&Path>,
    export_dir: Option<&Path>,
) -> CoreResult<PathBuf> {
    let path = match path_override {
        Some(p) => {
            let mut pb = p.to_path_buf();
            if pb.extension().and_then(|e| e.to_str()) != Some("xlsx") {
                pb.set_extension("xlsx");
            }
            pb
        }
        None => {
            let dir = match export_dir {
                Some(dir) => dir.to_path_buf(),
                None => dirs::download_dir()
                    .or_else(dirs::desktop_dir)
                    .ok_or_else(|| CoreError::processing("Pasta Downloads/Desktop não encontrada."))?,
            };
            unique_report_path(&dir)
        }
    };

    let mut workbook = XlsxWorkbook::new();
    write_summary_sheet(workbook.add_worksheet(), result)?;

    let tables = [
        ("Codigos", &result.code_frequencies),
        ("Setores", &result.sector_frequencies),
        ("Tipos", &result.type_frequencies),
        ("Tipos no codigo top", &result.type_frequencies_for_top_code),
        ("Tipos no setor top", &result.type_frequencies_for_top_sector),
    ];
    for (name, table) in tables {
        if let Some(table) = table {
            write_frequency_sheet(workbook.add_worksheet(), name, table)?;
        }
    }
    if result.box_summaries.is_some() {
        warn!(target: "box_occupancy::excel", "per-box breakdown is not exported");
    }

    workbook.save(&path)?;
    info!(target: "box_occupancy::excel", path = %path.display(), "report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_from(rows: &[&[Data]]) -> Range<Data> {
        range_at((0, 0), rows)
    }

    /// Range whose first cell sits at `origin`, like calamine gives for
    /// sheets with empty leading rows or columns.
    fn range_at(origin: (u32, u32), rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let end = (origin.0 + height.max(1) - 1, origin.1 + width.max(1) - 1);
        let mut range = Range::new(origin, end);
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((origin.0 + r as u32, origin.1 + c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn letters() {
        assert_eq!(col_index_to_letter(0), "A");
        assert_eq!(col_index_to_letter(25), "Z");
        assert_eq!(col_index_to_letter(26), "AA");
    }

    #[test]
    fn header_row_detected_below_title_rows() {
        let range = range_from(&[
            &[s("Relatório de boxes"), Data::Empty],
            &[Data::Empty, Data::Empty],
            &[s("Box"), s("Situação")],
            &[Data::Float(1.0), s("Ativo")],
        ]);
        assert_eq!(detect_header_row(&range), Some(2));
        let sheet = range_to_sheet("Plan1", &range, None).unwrap();
        assert_eq!(sheet.headers, vec!["Box", "Situação"]);
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].get("Box"), Some(&CellValue::Number(1.0)));
    }

    #[test]
    fn widest_row_is_the_fallback_header() {
        let range = range_from(&[
            &[s("Relatório"), Data::Empty, Data::Empty],
            &[s("Caixa"), s("Estado"), s("Setor")],
            &[Data::Int(1), s("Ativo"), Data::Empty],
        ]);
        assert_eq!(detect_header_row(&range), None);
        let sheet = range_to_sheet("Plan1", &range, None).unwrap();
        assert_eq!(sheet.headers, vec!["Caixa", "Estado", "Setor"]);
    }

    #[test]
    fn explicit_header_row_skips_detection() {
        let range = range_from(&[
            &[s("Box"), s("Status")],
            &[s("Caixa"), s("Estado")],
            &[Data::Int(3), s("Ativo")],
        ]);
        let sheet = range_to_sheet("Plan1", &range, Some(2)).unwrap();
        assert_eq!(sheet.headers, vec!["Caixa", "Estado"]);
        assert_eq!(sheet.rows[0].get("Caixa"), Some(&CellValue::Number(3.0)));
    }

    #[test]
    fn blank_and_repeated_headers_are_named() {
        let headers = build_headers(&[s("Box"), Data::Empty, s("Box"), s("Status"), Data::Empty], 0);
        assert_eq!(headers, vec!["Box", "Coluna B", "Box.1", "Status"]);
    }

    #[test]
    fn explicit_header_row_is_a_sheet_row() {
        let range = range_at(
            (2, 0),
            &[&[s("Box"), s("Status")], &[Data::Int(1), s("Ativo")], &[Data::Int(2), s("Baixa")]],
        );
        let sheet = range_to_sheet("Plan1", &range, Some(3)).unwrap();
        assert_eq!(sheet.headers, vec!["Box", "Status"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[1].get("Status"), Some(&CellValue::Text("Baixa".into())));

        assert!(range_to_sheet("Plan1", &range, Some(1)).is_none());
    }

    #[test]
    fn positional_names_follow_sheet_columns() {
        let range = range_at(
            (0, 1),
            &[&[s("Box"), Data::Empty, s("Status")], &[Data::Int(1), s("x"), s("Ativo")]],
        );
        let sheet = range_to_sheet("Plan1", &range, None).unwrap();
        assert_eq!(sheet.headers, vec!["Box", "Coluna C", "Status"]);
    }

    #[test]
    fn short_rows_are_padded() {
        let range = range_from(&[&[s("Box"), s("Status"), s("Setor")], &[Data::Int(1)]]);
        let sheet = range_to_sheet("Plan1", &range, None).unwrap();
        assert_eq!(sheet.rows[0].cells.len(), 3);
        assert_eq!(sheet.rows[0].get("Setor"), Some(&CellValue::Empty));
    }

    #[test]
    fn error_cells_become_empty() {
        assert_eq!(
            cell_to_value(&Data::Error(calamine::CellErrorType::NA)),
            CellValue::Empty
        );
        assert_eq!(cell_to_value(&Data::Bool(true)), CellValue::Bool(true));
    }
}
