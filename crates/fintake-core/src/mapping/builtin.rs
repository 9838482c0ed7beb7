use crate::error::FintakeError;
use crate::mapping::schema::MappingDef;

const DEFAULT_JSON: &str = include_str!("../../../../mappings/default.json");

/// Available predefined mappings.
pub const PRESETS: &[&str] = &["default"];

/// Load a predefined mapping by name.
pub fn load_preset(name: &str) -> Result<MappingDef, FintakeError> {
    match name {
        "default" => {
            let mapping: MappingDef = serde_json::from_str(DEFAULT_JSON)?;
            Ok(mapping)
        }
        _ => Err(FintakeError::MappingInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::validate_mapping;
    use crate::model::LineField;

    #[test]
    fn test_load_default_preset() {
        let m = load_preset("default").unwrap();
        assert!(!m.rules.is_empty());
        validate_mapping(&m).unwrap();
    }

    #[test]
    fn test_unknown_preset() {
        assert!(load_preset("xyz").is_err());
    }

    #[test]
    fn test_default_preset_priority_groups() {
        let m = load_preset("default").unwrap();
        let pos = |f: LineField| m.rules.iter().position(|r| r.field == f).unwrap();
        assert!(pos(LineField::GrossProfit) < pos(LineField::Taxes));
        assert!(pos(LineField::Taxes) < pos(LineField::CostOfGoodsSold));
        assert!(pos(LineField::CostOfGoodsSold) < pos(LineField::Revenue));
        assert!(pos(LineField::OperatingExpenses) < pos(LineField::Revenue));
        assert!(pos(LineField::Revenue) < pos(LineField::CurrentAssets));
        assert!(pos(LineField::CurrentAssets) < pos(LineField::TotalAssets));
    }
}
