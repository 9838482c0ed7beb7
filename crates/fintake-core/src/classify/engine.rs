use crate::error::FintakeError;
use crate::mapping::builtin;
use crate::mapping::schema::{MappingDef, SignPolicy, WriteMode};
use crate::model::LineField;
use crate::parsing::normalize::fold_text;
use rust_decimal::Decimal;

/// The destination of a classified row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub field: LineField,
    pub sign: SignPolicy,
    pub mode: WriteMode,
}

impl Classification {
    /// Apply the rule's sign policy to a source value.
    pub fn signed(&self, value: Decimal) -> Decimal {
        match self.sign {
            SignPolicy::AsIs => value,
            SignPolicy::Negative => -value.abs(),
            SignPolicy::Positive => value.abs(),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    classification: Classification,
    aliases: Vec<String>,
    exclude: Vec<String>,
}

impl CompiledRule {
    fn matches(&self, folded: &str) -> bool {
        self.aliases.iter().any(|a| folded.contains(a.as_str()))
            && !self.exclude.iter().any(|e| folded.contains(e.as_str()))
    }
}

/// Ordered keyword classifier compiled from a mapping.
#[derive(Debug, Clone)]
pub struct Classifier {
    name: String,
    rules: Vec<CompiledRule>,
}

impl Classifier {
    pub fn from_mapping(mapping: &MappingDef) -> Self {
        let rules = mapping
            .rules
            .iter()
            .map(|rule| CompiledRule {
                classification: Classification {
                    field: rule.field,
                    sign: rule.sign,
                    mode: rule.mode,
                },
                aliases: rule.aliases.iter().map(|a| fold_text(a)).collect(),
                exclude: rule.exclude.iter().map(|e| fold_text(e)).collect(),
            })
            .collect();
        Self {
            name: mapping.name.clone(),
            rules,
        }
    }

    /// Classifier for the built-in `default` preset.
    pub fn builtin() -> Result<Self, FintakeError> {
        Ok(Self::from_mapping(&builtin::load_preset("default")?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// First rule matching the description, in priority order.
    pub fn classify(&self, description: &str) -> Option<Classification> {
        let folded = fold_text(description);
        self.rules
            .iter()
            .find(|rule| rule.matches(&folded))
            .map(|rule| rule.classification)
    }
}
