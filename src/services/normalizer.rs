//! Raw rows -> validated documents. Rows that fail the box invariant are
//! dropped, never repaired.

use crate::error::{CoreError, CoreResult, EmptyDatasetKind};
use crate::models::{ColumnRole, ColumnRoleMap, Document, MAX_BOX, MIN_BOX, NOT_INFORMED, NO_STATUS};
use crate::types::{CellValue, RawRow};
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info};

static NON_DIGITS: OnceLock<Regex> = OnceLock::new();

fn non_digits() -> &'static Regex {
    NON_DIGITS.get_or_init(|| Regex::new(r"\D").expect("non-digit regex"))
}

/// Counters gathered while filtering, reported in logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizationStats {
    pub rows_seen: usize,
    pub blank_rows: usize,
    pub invalid_box: usize,
    pub out_of_range: usize,
    pub kept: usize,
}

/// Parse a box cell: keep digits only, then read as an integer.
/// Returns None when the cell is absent or has no digits.
pub fn parse_box_number(cell: Option<&CellValue>) -> Option<u64> {
    let cell = cell?;
    let rendered = cell.render();
    let digits = non_digits().replace_all(&rendered, "");
    digits.parse::<u64>().ok()
}

fn in_box_range(n: u64) -> bool {
    (u64::from(MIN_BOX)..=u64::from(MAX_BOX)).contains(&n)
}

fn text_or(cell: Option<&CellValue>, sentinel: &str) -> String {
    match cell {
        Some(value) if !value.is_blank() => value.render().trim().to_string(),
        _ => sentinel.to_string(),
    }
}

fn optional_field(row: &RawRow, roles: &ColumnRoleMap, role: ColumnRole) -> Option<String> {
    roles
        .get(role)
        .map(|header| text_or(row.get(header), NOT_INFORMED))
}

/// Result of classifying one raw row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Blank,
    InvalidBox,
    OutOfRange(u64),
    Kept(Document),
}

/// Classify a single row: dropped for a reason, or kept as a document.
pub fn classify_row(row: &RawRow, roles: &ColumnRoleMap) -> RowOutcome {
    if row.is_blank() {
        return RowOutcome::Blank;
    }
    let Some(box_number) = parse_box_number(row.get(roles.box_header())) else {
        return RowOutcome::InvalidBox;
    };
    if !in_box_range(box_number) {
        return RowOutcome::OutOfRange(box_number);
    }
    RowOutcome::Kept(Document {
        box_number: box_number as u16,
        status: text_or(row.get(roles.status_header()), NO_STATUS),
        code: optional_field(row, roles, ColumnRole::Code),
        sector: optional_field(row, roles, ColumnRole::Sector),
        doc_type: optional_field(row, roles, ColumnRole::Type),
    })
}

/// Normalize a single row, or None if it must be dropped.
pub fn normalize_row(row: &RawRow, roles: &ColumnRoleMap) -> Option<Document> {
    match classify_row(row, roles) {
        RowOutcome::Kept(doc) => Some(doc),
        _ => None,
    }
}

/// Normalize every row in order. Fails with EmptyDataset when nothing survives.
pub fn normalize_rows<'a, I>(rows: I, roles: &ColumnRoleMap) -> CoreResult<(Vec<Document>, NormalizationStats)>
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut stats = NormalizationStats::default();
    let mut documents = Vec::new();

    for row in rows {
        stats.rows_seen += 1;
        match classify_row(row, roles) {
            RowOutcome::Blank => stats.blank_rows += 1,
            RowOutcome::InvalidBox => stats.invalid_box += 1,
            RowOutcome::OutOfRange(_) => stats.out_of_range += 1,
            RowOutcome::Kept(doc) => documents.push(doc),
        }
    }
    stats.kept = documents.len();

    info!(
        target: "box_occupancy::normalizer",
        rows = stats.rows_seen,
        kept = stats.kept,
        blank = stats.blank_rows,
        invalid_box = stats.invalid_box,
        out_of_range = stats.out_of_range,
        "rows normalized"
    );

    if documents.is_empty() {
        let kind = if stats.rows_seen == stats.blank_rows {
            EmptyDatasetKind::NoRows
        } else {
            EmptyDatasetKind::NoValidBoxes
        };
        debug!(target: "box_occupancy::normalizer", ?kind, "empty working set");
        return Err(CoreError::EmptyDataset(kind));
    }
    Ok((documents, stats))
}
