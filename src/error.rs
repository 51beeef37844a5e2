use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::ColumnRole;

pub type CoreResult<T> = Result<T, CoreError>;

/// Which flavour of "nothing to aggregate" the workbook produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyDatasetKind {
    /// The workbook had no non-blank data rows at all.
    NoRows,
    /// Rows exist but none carries a box number in 1..=7000.
    NoValidBoxes,
}

impl fmt::Display for EmptyDatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmptyDatasetKind::NoRows => f.write_str("A planilha não contém linhas de dados"),
            EmptyDatasetKind::NoValidBoxes => {
                f.write_str("Nenhuma linha com número de box válido (1 a 7000) foi encontrada")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(
        "Coluna(s) obrigatória(s) não encontrada(s): {}. Colunas disponíveis: {}",
        join_roles(.missing),
        .available.join(", ")
    )]
    Schema {
        missing: Vec<ColumnRole>,
        available: Vec<String>,
    },

    #[error("{0}")]
    EmptyDataset(EmptyDatasetKind),

    #[error("Erro ao processar Excel: {message}")]
    Processing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn join_roles(roles: &[ColumnRole]) -> String {
    roles
        .iter()
        .map(|role| role.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl CoreError {
    pub fn processing(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "box_occupancy::error", %message, "processing error");
        CoreError::Processing {
            message,
            source: None,
        }
    }

    pub fn processing_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        let message = message.into();
        error!(target: "box_occupancy::error", %message, source = %source, "processing error");
        CoreError::Processing {
            message,
            source: Some(Box::new(source)),
        }
    }

    /// Schema and empty-dataset failures are problems with the uploaded data
    /// (HTTP 400); anything else is unexpected (HTTP 500).
    pub fn is_client_error(&self) -> bool {
        matches!(self, CoreError::Schema { .. } | CoreError::EmptyDataset(_))
    }

    pub fn status_code(&self) -> u16 {
        if self.is_client_error() {
            400
        } else {
            500
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl From<calamine::Error> for CoreError {
    fn from(err: calamine::Error) -> Self {
        CoreError::processing_with_source("Não foi possível ler a planilha", err)
    }
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::processing_with_source("Erro de E/S", err)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::processing_with_source("Erro de serialização", err)
    }
}

impl From<rust_xlsxwriter::XlsxError> for CoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        CoreError::processing_with_source("Erro ao gravar relatório", err)
    }
}

/// Body returned to the caller on failure: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_missing_roles_and_headers() {
        let err = CoreError::Schema {
            missing: vec![ColumnRole::Box, ColumnRole::Status],
            available: vec!["Nome".to_string(), "Data".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("Box, Status"));
        assert!(message.contains("Nome, Data"));
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn empty_dataset_messages_differ_by_kind() {
        let no_rows = CoreError::EmptyDataset(EmptyDatasetKind::NoRows).to_string();
        let no_boxes = CoreError::EmptyDataset(EmptyDatasetKind::NoValidBoxes).to_string();
        assert_ne!(no_rows, no_boxes);
        assert!(no_boxes.contains("7000"));
    }

    #[test]
    fn processing_error_is_server_side() {
        let err = CoreError::processing("célula inválida");
        assert!(!err.is_client_error());
        assert_eq!(err.status_code(), 500);
        let body = serde_json::to_value(err.to_response()).unwrap();
        assert_eq!(body["error"], "Erro ao processar Excel: célula inválida");
    }
}
