//! Header -> semantic role classification by case-insensitive substring rules.

use crate::error::{CoreError, CoreResult};
use crate::models::{ColumnRole, ColumnRoleMap};
use tracing::{debug, info};

type Matcher = fn(&str) -> bool;

/// Ordered rule table; the first rule matching a header decides its role.
/// Headers are upper-cased and trimmed before matching.
const ROLE_RULES: &[(ColumnRole, Matcher)] = &[
    (ColumnRole::Box, |h| h.contains("BOX")),
    (ColumnRole::Status, |h| {
        h.contains("STATUS") || h.contains("SITUAÇÃO") || h.contains("SITUACAO")
    }),
    (ColumnRole::Sector, |h| h.contains("SETOR")),
    (ColumnRole::Code, |h| h.contains("COD") && !h.contains("TIPO")),
    (ColumnRole::Type, |h| h.contains("TIPO")),
];

fn normalize_header(header: &str) -> String {
    header.trim().to_uppercase()
}

/// Role a single header falls into, if any.
pub fn classify_header(header: &str) -> Option<ColumnRole> {
    let normalized = normalize_header(header);
    ROLE_RULES
        .iter()
        .find(|(_, matches)| matches(&normalized))
        .map(|(role, _)| *role)
}

/// Resolve headers (original order) into a role map. First header per role wins.
pub fn resolve_columns<S: AsRef<str>>(headers: &[S]) -> CoreResult<ColumnRoleMap> {
    let mut found: [Option<String>; 5] = Default::default();
    for header in headers {
        let header = header.as_ref();
        let Some(role) = classify_header(header) else {
            continue;
        };
        let slot = &mut found[role_index(role)];
        if slot.is_none() {
            debug!(target: "box_occupancy::resolver", header, role = %role, "column resolved");
            *slot = Some(header.to_string());
        }
    }

    let missing: Vec<ColumnRole> = ColumnRole::ALL
        .iter()
        .copied()
        .filter(|role| role.is_mandatory() && found[role_index(*role)].is_none())
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Schema {
            missing,
            available: headers.iter().map(|h| h.as_ref().to_string()).collect(),
        });
    }

    let [box_header, status_header, sector_header, code_header, type_header] = found;
    let map = ColumnRoleMap {
        box_header: box_header.unwrap_or_default(),
        status_header: status_header.unwrap_or_default(),
        sector_header,
        code_header,
        type_header,
    };
    info!(
        target: "box_occupancy::resolver",
        box_column = %map.box_header,
        status_column = %map.status_header,
        sector = map.has(ColumnRole::Sector),
        code = map.has(ColumnRole::Code),
        doc_type = map.has(ColumnRole::Type),
        "columns resolved"
    );
    Ok(map)
}

fn role_index(role: ColumnRole) -> usize {
    match role {
        ColumnRole::Box => 0,
        ColumnRole::Status => 1,
        ColumnRole::Sector => 2,
        ColumnRole::Code => 3,
        ColumnRole::Type => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_rule_precedence() {
        assert_eq!(classify_header(" nº do box "), Some(ColumnRole::Box));
        assert_eq!(classify_header("Situação"), Some(ColumnRole::Status));
        assert_eq!(classify_header("SITUACAO ATUAL"), Some(ColumnRole::Status));
        assert_eq!(classify_header("status"), Some(ColumnRole::Status));
        assert_eq!(classify_header("Setor Responsável"), Some(ColumnRole::Sector));
        assert_eq!(classify_header("Código"), None);
        assert_eq!(classify_header("Codigo"), Some(ColumnRole::Code));
        assert_eq!(classify_header("Tipo Documento"), Some(ColumnRole::Type));
        assert_eq!(classify_header("Observações"), None);
    }

    #[test]
    fn header_with_cod_and_tipo_is_type() {
        assert_eq!(classify_header("Cod. Tipo"), Some(ColumnRole::Type));
        assert_eq!(classify_header("TIPO_COD"), Some(ColumnRole::Type));
    }

    #[test]
    fn box_rule_wins_over_later_rules() {
        assert_eq!(classify_header("Status do Box"), Some(ColumnRole::Box));
    }

    #[test]
    fn first_header_per_role_wins() {
        let map = resolve_columns(&["Box", "Status", "Box Antigo", "Situação"]).unwrap();
        assert_eq!(map.box_header(), "Box");
        assert_eq!(map.status_header(), "Status");
        assert!(!map.has(ColumnRole::Code));
    }

    #[test]
    fn optional_roles_resolved_when_present() {
        let map = resolve_columns(&["CAIXA BOX", "STATUS", "COD", "SETOR", "TIPO"]).unwrap();
        assert_eq!(map.get(ColumnRole::Code), Some("COD"));
        assert_eq!(map.get(ColumnRole::Sector), Some("SETOR"));
        assert_eq!(map.get(ColumnRole::Type), Some("TIPO"));
    }

    #[test]
    fn missing_mandatory_roles_fail_with_schema_error() {
        let err = resolve_columns(&["Nome", "Setor"]).unwrap_err();
        match err {
            CoreError::Schema { missing, available } => {
                assert_eq!(missing, vec![ColumnRole::Box, ColumnRole::Status]);
                assert_eq!(available, vec!["Nome", "Setor"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let err = resolve_columns(&["Box", "Setor"]).unwrap_err();
        assert!(matches!(err, CoreError::Schema { ref missing, .. } if missing == &[ColumnRole::Status]));
    }
}
