pub mod builtin;
pub mod schema;

use crate::error::FintakeError;
use crate::parsing::normalize::fold_text;
use schema::MappingDef;
use std::collections::HashMap;
use std::path::Path;

/// Load a mapping from a JSON file.
pub fn load_mapping(path: &Path) -> Result<MappingDef, FintakeError> {
    let content = std::fs::read_to_string(path).map_err(|e| FintakeError::MappingLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_mapping(&content, path)
}

/// Parse a mapping from a JSON string, reporting errors against `source`.
pub fn parse_mapping(json: &str, source: &Path) -> Result<MappingDef, FintakeError> {
    let mapping: MappingDef = serde_json::from_str(json).map_err(|e| FintakeError::MappingLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_mapping(&mapping)?;
    Ok(mapping)
}

/// Parse a mapping from a JSON string (no file path context).
pub fn parse_mapping_str(json: &str) -> Result<MappingDef, FintakeError> {
    let mapping: MappingDef = serde_json::from_str(json)?;
    validate_mapping(&mapping)?;
    Ok(mapping)
}

/// Validate that a mapping is well-formed.
pub fn validate_mapping(mapping: &MappingDef) -> Result<(), FintakeError> {
    if mapping.rules.is_empty() {
        return Err(FintakeError::MappingInvalid("rules must not be empty".into()));
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (idx, rule) in mapping.rules.iter().enumerate() {
        if rule.aliases.is_empty() {
            return Err(FintakeError::MappingInvalid(format!(
                "rule #{} ({}) has no aliases",
                idx + 1,
                rule.field
            )));
        }

        for alias in &rule.aliases {
            let folded = fold_text(alias);
            if folded.is_empty() {
                return Err(FintakeError::MappingInvalid(format!(
                    "rule #{} ({}) has a blank alias",
                    idx + 1,
                    rule.field
                )));
            }
            if let Some(&other) = seen.get(&folded) {
                if other != idx {
                    return Err(FintakeError::MappingInvalid(format!(
                        "alias '{}' appears in rule #{} ({}) and rule #{} ({})",
                        alias,
                        other + 1,
                        mapping.rules[other].field,
                        idx + 1,
                        rule.field
                    )));
                }
            }
            seen.insert(folded, idx);
        }

        if rule.exclude.iter().any(|e| fold_text(e).is_empty()) {
            return Err(FintakeError::MappingInvalid(format!(
                "rule #{} ({}) has a blank exclude entry",
                idx + 1,
                rule.field
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineField;
    use schema::{SignPolicy, WriteMode};

    #[test]
    fn test_parse_valid_mapping() {
        let json = r#"{
            "name": "Test",
            "version": "1.0",
            "rules": [
                { "field": "revenue", "aliases": ["ventas"] },
                { "field": "taxes", "aliases": ["impuesto"], "sign": "negative" },
                { "field": "equity", "aliases": ["patrimonio"], "mode": "overwrite" }
            ]
        }"#;
        let m = parse_mapping_str(json).unwrap();
        assert_eq!(m.rules.len(), 3);
        assert_eq!(m.rules[0].field, LineField::Revenue);
        assert_eq!(m.rules[0].sign, SignPolicy::AsIs);
        assert_eq!(m.rules[0].mode, WriteMode::Accumulate);
        assert_eq!(m.rules[1].sign, SignPolicy::Negative);
        assert_eq!(m.rules[2].mode, WriteMode::Overwrite);
    }

    #[test]
    fn test_empty_rules_rejected() {
        let json = r#"{ "name": "Bad", "version": "1.0", "rules": [] }"#;
        assert!(parse_mapping_str(json).is_err());
    }

    #[test]
    fn test_rule_without_aliases_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [ { "field": "revenue", "aliases": [] } ]
        }"#;
        assert!(parse_mapping_str(json).is_err());
    }

    #[test]
    fn test_blank_alias_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [ { "field": "revenue", "aliases": ["  "] } ]
        }"#;
        assert!(parse_mapping_str(json).is_err());
    }

    #[test]
    fn test_alias_shared_between_rules_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [
                { "field": "revenue", "aliases": ["Facturación"] },
                { "field": "other_income", "aliases": ["facturacion"] }
            ]
        }"#;
        let err = parse_mapping_str(json).unwrap_err();
        assert!(err.to_string().contains("appears in rule #1"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{
            "name": "Bad",
            "version": "1.0",
            "rules": [ { "field": "goodwill", "aliases": ["plusvalía"] } ]
        }"#;
        assert!(parse_mapping_str(json).is_err());
    }
}
