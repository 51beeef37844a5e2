use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic meaning a spreadsheet column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    Box,
    Status,
    Sector,
    Code,
    Type,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 5] = [
        ColumnRole::Box,
        ColumnRole::Status,
        ColumnRole::Sector,
        ColumnRole::Code,
        ColumnRole::Type,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::Box => "Box",
            ColumnRole::Status => "Status",
            ColumnRole::Sector => "Sector",
            ColumnRole::Code => "Code",
            ColumnRole::Type => "Type",
        }
    }

    pub fn is_mandatory(self) -> bool {
        matches!(self, ColumnRole::Box | ColumnRole::Status)
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role -> original header. Only built by the column resolver, so Box and
/// Status are always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRoleMap {
    pub(crate) box_header: String,
    pub(crate) status_header: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) sector_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code_header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) type_header: Option<String>,
}

impl ColumnRoleMap {
    pub fn box_header(&self) -> &str {
        &self.box_header
    }

    pub fn status_header(&self) -> &str {
        &self.status_header
    }

    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Box => Some(&self.box_header),
            ColumnRole::Status => Some(&self.status_header),
            ColumnRole::Sector => self.sector_header.as_deref(),
            ColumnRole::Code => self.code_header.as_deref(),
            ColumnRole::Type => self.type_header.as_deref(),
        }
    }

    pub fn has(&self, role: ColumnRole) -> bool {
        self.get(role).is_some()
    }
}
