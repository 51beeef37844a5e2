//! Caller-side entry points: upload validation, load + aggregate, export.
//! This is the layer a web handler or the CLI talks to.

use crate::config::Settings;
use crate::error::{CoreError, CoreResult};
use crate::excel;
use crate::models::{AggregateResult, AggregationMode};
use crate::services::run_pipeline;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const ALLOWED_EXTENSIONS: &[&str] = &["xls", "xlsx", "xlsm", "ods"];

#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(message.into()),
        }
    }
}

/// Per-process context. Holds configuration only; no dataset state survives a call.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub settings: Settings,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

pub fn allowed_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Check existence, extension and size before any parsing happens.
pub fn validate_excel_file(path: &Path, max_bytes: u64) -> CoreResult<ValidationResult> {
    if !path.exists() {
        return Ok(ValidationResult::rejected("Arquivo não encontrado."));
    }
    if !allowed_file(path) {
        return Ok(ValidationResult::rejected("Tipo de arquivo não permitido"));
    }
    let metadata = fs::metadata(path)?;
    if metadata.len() > max_bytes {
        return Ok(ValidationResult::rejected(format!(
            "Arquivo muito grande (máx. {}MB).",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(ValidationResult::ok())
}

/// Validate, decode and aggregate one uploaded workbook.
pub fn process_upload(state: &AppState, path: &Path, mode: AggregationMode) -> Result<AggregateResult, UploadError> {
    let validation = validate_excel_file(path, state.settings.max_upload_bytes)?;
    if let Some(message) = validation.error {
        warn!(target: "box_occupancy::commands", path = %path.display(), %message, "upload rejected");
        return Err(UploadError::Rejected(message));
    }
    let workbook = excel::load_workbook(path, state.settings.header_row)?;
    let result = run_pipeline(&workbook, mode)?;
    info!(
        target: "box_occupancy::commands",
        path = %path.display(),
        %mode,
        total = result.grand_total,
        "upload processed"
    );
    Ok(result)
}

pub fn list_sheets(path: &Path) -> CoreResult<Vec<String>> {
    excel::sheet_names(path)
}

#[derive(Debug, Serialize)]
pub struct ExportedReport {
    #[serde(rename = "arquivo")]
    pub path: PathBuf,
    #[serde(rename = "resultado")]
    pub result: AggregateResult,
}

/// Process in reporting mode and write the tables to an .xlsx.
pub fn export_report(state: &AppState, path: &Path, output: Option<&Path>) -> Result<ExportedReport, UploadError> {
    let result = process_upload(state, path, AggregationMode::Reporting)?;
    let written = excel::export_report_to_excel(&result, output, state.settings.export_dir.as_deref())?;
    Ok(ExportedReport {
        path: written,
        result,
    })
}

/// Failure of a whole upload: either rejected before parsing or a core error.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl UploadError {
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::Rejected(_) => 400,
            UploadError::Core(e) => e.status_code(),
        }
    }
}

/// Map an outcome to the (status, JSON body) pair a transport would send.
pub fn to_response<T: Serialize>(outcome: Result<T, UploadError>) -> (u16, Value) {
    match outcome {
        Ok(body) => match serde_json::to_value(body) {
            Ok(value) => (200, value),
            Err(e) => {
                let err = CoreError::from(e);
                (500, serde_json::json!({ "error": err.to_string() }))
            }
        },
        Err(err) => {
            if err.status_code() >= 500 {
                warn!(target: "box_occupancy::commands", error = %err, "request failed");
            }
            (err.status_code(), serde_json::json!({ "error": err.to_string() }))
        }
    }
}
