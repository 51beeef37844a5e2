use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

pub const ENV_HEADER_ROW: &str = "BOX_OCCUPANCY_HEADER_ROW";
pub const ENV_MAX_UPLOAD_MB: &str = "BOX_OCCUPANCY_MAX_UPLOAD_MB";
pub const ENV_LOG: &str = "BOX_OCCUPANCY_LOG";
pub const ENV_EXPORT_DIR: &str = "BOX_OCCUPANCY_EXPORT_DIR";

const DEFAULT_MAX_UPLOAD_MB: u64 = 16;
const DEFAULT_LOG_FILTER: &str = "info";

/// Process-level settings. Read once at start-up and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// 1-based header row; None means detect per sheet.
    pub header_row: Option<u32>,
    pub max_upload_bytes: u64,
    pub log_filter: String,
    pub export_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header_row: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            export_dir: None,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> CoreResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| CoreError::processing(format!("Valor inválido para {}: '{}'", name, raw)))
}

impl Settings {
    /// Load `.env` (if any) then read settings from the environment.
    pub fn from_env() -> CoreResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut settings = Settings::default();

        if let Some(raw) = get(ENV_HEADER_ROW) {
            let row: u32 = parse_var(ENV_HEADER_ROW, &raw)?;
            if row == 0 {
                return Err(CoreError::processing(format!(
                    "{} é baseado em 1; recebido 0",
                    ENV_HEADER_ROW
                )));
            }
            settings.header_row = Some(row);
        }
        if let Some(raw) = get(ENV_MAX_UPLOAD_MB) {
            let mb: u64 = parse_var(ENV_MAX_UPLOAD_MB, &raw)?;
            settings.max_upload_bytes = mb.checked_mul(1024 * 1024).ok_or_else(|| {
                CoreError::processing(format!("Valor muito grande para {}: '{}'", ENV_MAX_UPLOAD_MB, raw))
            })?;
        }
        if let Some(raw) = get(ENV_LOG) {
            settings.log_filter = raw.trim().to_string();
        }
        if let Some(raw) = get(ENV_EXPORT_DIR) {
            settings.export_dir = Some(PathBuf::from(raw.trim()));
        }
        Ok(settings)
    }
}
