//! Aggregation over the normalized working set.

use crate::models::{
    AggregateResult, AggregationMode, BoxSummary, ColumnRole, ColumnRoleMap, Document,
    FrequencyTable, MAX_BOX, MIN_BOX,
};
use crate::services::frequency::frequency_table;
use crate::services::palette::assign_colors;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::info;

/// Distinct statuses in first-seen order.
pub fn distinct_statuses(documents: &[Document]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for doc in documents {
        if !seen.iter().any(|s| s == &doc.status) {
            seen.push(doc.status.clone());
        }
    }
    seen
}

pub fn status_totals(documents: &[Document]) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for doc in documents {
        *totals.entry(doc.status.clone()).or_insert(0) += 1;
    }
    totals
}

pub fn occupied_box_count(documents: &[Document]) -> usize {
    documents
        .iter()
        .map(|d| d.box_number)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Dense per-box breakdown for every box in MIN_BOX..=MAX_BOX.
/// Percentages are count / total * 100 without rounding.
pub fn box_summaries(documents: &[Document]) -> BTreeMap<u16, BoxSummary> {
    let mut counts: HashMap<u16, BTreeMap<String, u64>> = HashMap::new();
    for doc in documents {
        *counts
            .entry(doc.box_number)
            .or_default()
            .entry(doc.status.clone())
            .or_insert(0) += 1;
    }

    (MIN_BOX..=MAX_BOX)
        .map(|box_number| {
            let summary = match counts.remove(&box_number) {
                None => BoxSummary::default(),
                Some(status_counts) => {
                    let total: u64 = status_counts.values().sum();
                    let status_percentages = status_counts
                        .iter()
                        .map(|(status, count)| {
                            (status.clone(), *count as f64 / total as f64 * 100.0)
                        })
                        .collect();
                    BoxSummary {
                        total,
                        status_counts,
                        status_percentages,
                    }
                }
            };
            (box_number, summary)
        })
        .collect()
}

fn field_values<'a>(
    documents: &'a [Document],
    field: fn(&Document) -> Option<&str>,
) -> impl Iterator<Item = &'a str> {
    documents.iter().filter_map(field)
}

fn code_of(doc: &Document) -> Option<&str> {
    doc.code.as_deref()
}

fn sector_of(doc: &Document) -> Option<&str> {
    doc.sector.as_deref()
}

fn type_of(doc: &Document) -> Option<&str> {
    doc.doc_type.as_deref()
}

/// Type frequencies among documents whose `field` equals its most frequent value.
fn drill_down(
    documents: &[Document],
    field: fn(&Document) -> Option<&str>,
    table: &FrequencyTable,
) -> Option<(String, FrequencyTable)> {
    let top = table.top()?.variable.clone();
    let subset = documents
        .iter()
        .filter(|doc| field(doc) == Some(top.as_str()))
        .filter_map(type_of);
    let types = frequency_table(subset);
    Some((top, types))
}

/// Aggregate a non-empty working set.
pub fn aggregate(
    documents: &[Document],
    roles: &ColumnRoleMap,
    mode: AggregationMode,
) -> AggregateResult {
    let statuses = distinct_statuses(documents);
    let status_totals = status_totals(documents);
    let status_colors = assign_colors(&statuses);
    let grand_total = documents.len() as u64;
    let occupied = occupied_box_count(documents);

    let mut result = AggregateResult {
        statuses,
        status_totals,
        status_colors,
        grand_total,
        occupied_box_count: occupied,
        total_boxes_reported: occupied,
        box_summaries: None,
        code_frequencies: None,
        sector_frequencies: None,
        type_frequencies: None,
        top_code: None,
        type_frequencies_for_top_code: None,
        top_sector: None,
        type_frequencies_for_top_sector: None,
    };

    match mode {
        AggregationMode::Visualization => {
            result.box_summaries = Some(box_summaries(documents));
        }
        AggregationMode::Reporting => {
            let has_type = roles.has(ColumnRole::Type);
            if roles.has(ColumnRole::Code) {
                let table = frequency_table(field_values(documents, code_of));
                if has_type {
                    if let Some((top, types)) = drill_down(documents, code_of, &table) {
                        result.top_code = Some(top);
                        result.type_frequencies_for_top_code = Some(types);
                    }
                }
                result.code_frequencies = Some(table);
            }
            if roles.has(ColumnRole::Sector) {
                let table = frequency_table(field_values(documents, sector_of));
                if has_type {
                    if let Some((top, types)) = drill_down(documents, sector_of, &table) {
                        result.top_sector = Some(top);
                        result.type_frequencies_for_top_sector = Some(types);
                    }
                }
                result.sector_frequencies = Some(table);
            }
            if has_type {
                result.type_frequencies = Some(frequency_table(field_values(documents, type_of)));
            }
        }
    }

    info!(
        target: "box_occupancy::aggregator",
        %mode,
        documents = result.grand_total,
        statuses = result.statuses.len(),
        occupied_boxes = result.occupied_box_count,
        "aggregation complete"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::resolve_columns;

    fn doc(box_number: u16, status: &str) -> Document {
        Document {
            box_number,
            status: status.to_string(),
            code: None,
            sector: None,
            doc_type: None,
        }
    }

    fn classified(box_number: u16, code: &str, sector: &str, doc_type: &str) -> Document {
        Document {
            box_number,
            status: "Ativo".to_string(),
            code: Some(code.to_string()),
            sector: Some(sector.to_string()),
            doc_type: Some(doc_type.to_string()),
        }
    }

    fn sample() -> Vec<Document> {
        vec![
            doc(1, "Ativo"),
            doc(1, "Arquivado"),
            doc(1, "Ativo"),
            doc(5, "Emprestado"),
            doc(7000, "Ativo"),
        ]
    }

    #[test]
    fn totals_are_consistent() {
        let docs = sample();
        let roles = resolve_columns(&["Box", "Status"]).unwrap();
        let result = aggregate(&docs, &roles, AggregationMode::Visualization);
        assert_eq!(result.statuses, vec!["Ativo", "Arquivado", "Emprestado"]);
        assert_eq!(result.status_totals["Ativo"], 3);
        assert_eq!(result.status_totals.values().sum::<u64>(), result.grand_total);
        assert_eq!(result.grand_total, docs.len() as u64);
        assert_eq!(result.occupied_box_count, 3);
        assert_eq!(result.total_boxes_reported, 3);
        assert_eq!(result.status_colors.len(), 3);
    }

    #[test]
    fn visualization_builds_dense_box_map() {
        let docs = sample();
        let summaries = box_summaries(&docs);
        assert_eq!(summaries.len(), 7000);
        assert_eq!(summaries[&2], BoxSummary::default());
        assert_eq!(summaries[&7000].total, 1);

        let first = &summaries[&1];
        assert_eq!(first.total, 3);
        assert_eq!(first.status_counts["Ativo"], 2);
        let pct_sum: f64 = first.status_percentages.values().sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
        assert!((first.status_percentages["Arquivado"] - 100.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn reporting_skips_box_map_and_absent_fields() {
        let docs = sample();
        let roles = resolve_columns(&["Box", "Status"]).unwrap();
        let result = aggregate(&docs, &roles, AggregationMode::Reporting);
        assert!(result.box_summaries.is_none());
        assert!(result.code_frequencies.is_none());
        assert!(result.sector_frequencies.is_none());
        assert!(result.type_frequencies.is_none());
    }

    #[test]
    fn reporting_drills_into_top_code_and_sector() {
        let docs = vec![
            classified(1, "C1", "RH", "Ofício"),
            classified(2, "C1", "RH", "Memorando"),
            classified(3, "C1", "TI", "Ofício"),
            classified(3, "C2", "TI", "Contrato"),
            classified(4, "C2", "TI", "Contrato"),
        ];
        let roles = resolve_columns(&["Box", "Status", "Cod", "Setor", "Tipo"]).unwrap();
        let result = aggregate(&docs, &roles, AggregationMode::Reporting);

        let codes = result.code_frequencies.as_ref().unwrap();
        assert_eq!(codes.rows[0].variable, "C1");
        assert_eq!(codes.rows[0].absolute_freq, 3);
        assert_eq!(result.top_code.as_deref(), Some("C1"));
        let by_code = result.type_frequencies_for_top_code.as_ref().unwrap();
        assert_eq!(by_code.rows[0].variable, "Ofício");
        assert_eq!(by_code.rows[0].absolute_freq, 2);
        assert_eq!(by_code.rows.iter().map(|r| r.absolute_freq).sum::<u64>(), 3);

        assert_eq!(result.top_sector.as_deref(), Some("TI"));
        let by_sector = result.type_frequencies_for_top_sector.as_ref().unwrap();
        assert_eq!(by_sector.rows[0].variable, "Contrato");
        assert_eq!(by_sector.rows[0].absolute_freq, 2);

        let types = result.type_frequencies.as_ref().unwrap();
        assert_eq!(types.rows.iter().map(|r| r.absolute_freq).sum::<u64>(), 5);
    }

    #[test]
    fn drill_down_returns_top_value_with_its_types() {
        let docs = vec![
            classified(1, "C2", "RH", "Contrato"),
            classified(2, "C1", "RH", "Ofício"),
            classified(3, "C1", "TI", "Ofício"),
        ];
        let codes = frequency_table(docs.iter().filter_map(code_of));
        let (top, types) = drill_down(&docs, code_of, &codes).unwrap();
        assert_eq!(top, "C1");
        assert_eq!(types.rows.len(), 1);
        assert_eq!(types.rows[0].variable, "Ofício");
        assert_eq!(types.rows[0].relative_freq, 100.0);

        assert!(drill_down(&docs, code_of, &FrequencyTable::default()).is_none());
    }

    #[test]
    fn no_drill_down_without_type_column() {
        let mut docs = vec![classified(1, "C1", "RH", "x")];
        docs[0].doc_type = None;
        let roles = resolve_columns(&["Box", "Status", "Cod"]).unwrap();
        let result = aggregate(&docs, &roles, AggregationMode::Reporting);
        assert!(result.code_frequencies.is_some());
        assert!(result.top_code.is_none());
        assert!(result.type_frequencies_for_top_code.is_none());
    }
}
