use crate::error::CoreResult;
use crate::models::{AggregateResult, AggregationMode};
use crate::services::{aggregate, normalize_rows, resolve_columns};
use crate::types::Workbook;
use tracing::info;

/// Decoded workbook -> aggregate snapshot. Pure; no I/O and no retained state.
///
/// Headers are resolved once over the union of all sheet headers, then rows
/// are normalized in sheet order followed by row order.
pub fn run_pipeline(workbook: &Workbook, mode: AggregationMode) -> CoreResult<AggregateResult> {
    info!(
        target: "box_occupancy::pipeline",
        sheets = workbook.sheets.len(),
        rows = workbook.row_count(),
        %mode,
        "pipeline started"
    );
    let headers = workbook.headers();
    let roles = resolve_columns(&headers)?;
    let (documents, _stats) = normalize_rows(workbook.rows(), &roles)?;
    Ok(aggregate(&documents, &roles, mode))
}
