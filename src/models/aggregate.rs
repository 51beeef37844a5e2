use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const MIN_BOX: u16 = 1;
pub const MAX_BOX: u16 = 7000;

/// Substituted when the status cell is blank.
pub const NO_STATUS: &str = "SEM STATUS";
/// Substituted when an optional classification cell is blank.
pub const NOT_INFORMED: &str = "NÃO INFORMADO";

/// Controls whether the dense per-box breakdown or the frequency tables are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMode {
    Visualization,
    Reporting,
}

impl fmt::Display for AggregationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationMode::Visualization => f.write_str("visualization"),
            AggregationMode::Reporting => f.write_str("reporting"),
        }
    }
}

impl FromStr for AggregationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visualization" | "visualizacao" => Ok(AggregationMode::Visualization),
            "reporting" | "relatorios" => Ok(AggregationMode::Reporting),
            other => Err(format!("Unknown aggregation mode: {}", other)),
        }
    }
}

/// Normalized row. `box_number` is always within MIN_BOX..=MAX_BOX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub box_number: u16,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoxSummary {
    pub total: u64,
    #[serde(rename = "situacoes")]
    pub status_counts: BTreeMap<String, u64>,
    #[serde(rename = "percentuais")]
    pub status_percentages: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    #[serde(rename = "variavel")]
    pub variable: String,
    #[serde(rename = "freq_absoluta")]
    pub absolute_freq: u64,
    #[serde(rename = "freq_relativa")]
    pub relative_freq: f64,
    #[serde(rename = "freq_relativa_acumulada")]
    pub cumulative_relative_freq: f64,
}

/// Ranked tabulation, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most frequent value (first-seen wins on ties).
    pub fn top(&self) -> Option<&FrequencyRow> {
        self.rows.first()
    }
}

/// Full response of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// Distinct statuses, first-seen order. Drives the palette.
    #[serde(rename = "colunas_situacoes")]
    pub statuses: Vec<String>,
    #[serde(rename = "totais_por_situacao")]
    pub status_totals: BTreeMap<String, u64>,
    #[serde(rename = "mapa_cores")]
    pub status_colors: BTreeMap<String, String>,
    #[serde(rename = "total_geral")]
    pub grand_total: u64,
    #[serde(rename = "boxes_ocupados")]
    pub occupied_box_count: usize,
    /// Distinct box count in both modes.
    #[serde(rename = "total_boxes")]
    pub total_boxes_reported: usize,

    #[serde(rename = "boxes_data", skip_serializing_if = "Option::is_none")]
    pub box_summaries: Option<BTreeMap<u16, BoxSummary>>,

    #[serde(rename = "freq_cod", skip_serializing_if = "Option::is_none")]
    pub code_frequencies: Option<FrequencyTable>,
    #[serde(rename = "freq_setor", skip_serializing_if = "Option::is_none")]
    pub sector_frequencies: Option<FrequencyTable>,
    #[serde(rename = "freq_tipo", skip_serializing_if = "Option::is_none")]
    pub type_frequencies: Option<FrequencyTable>,
    #[serde(rename = "cod_top", skip_serializing_if = "Option::is_none")]
    pub top_code: Option<String>,
    #[serde(rename = "freq_tipo_cod_top", skip_serializing_if = "Option::is_none")]
    pub type_frequencies_for_top_code: Option<FrequencyTable>,
    #[serde(rename = "setor_top", skip_serializing_if = "Option::is_none")]
    pub top_sector: Option<String>,
    #[serde(rename = "freq_tipo_setor_top", skip_serializing_if = "Option::is_none")]
    pub type_frequencies_for_top_sector: Option<FrequencyTable>,
}
