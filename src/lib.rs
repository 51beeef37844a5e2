pub mod commands;
pub mod config;
pub mod error;
pub mod excel;
pub mod logger;
pub mod models;
pub mod services;
pub mod types;

pub use commands::AppState;
pub use config::Settings;
pub use error::{CoreError, CoreResult, EmptyDatasetKind, ErrorResponse};
pub use models::{AggregateResult, AggregationMode, ColumnRole, ColumnRoleMap, Document};
pub use services::run_pipeline;
pub use types::{CellValue, RawRow, Sheet, Workbook};
