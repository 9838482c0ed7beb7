use fintake_core::error::FintakeError;
use fintake_core::mapping::schema::{LineRuleDef, SignPolicy, WriteMode};
use fintake_core::mapping::{builtin, load_mapping};
use fintake_core::model::LineField;
use std::collections::HashMap;
use std::path::Path;

pub fn list() -> Result<(), FintakeError> {
    println!("Available built-in mappings:\n");
    for name in builtin::PRESETS {
        let mapping = builtin::load_preset(name)?;
        println!(
            "  {:<10} {} (v{}, {} rules)",
            name,
            mapping.name,
            mapping.version,
            mapping.rules.len()
        );
        if let Some(ref desc) = mapping.description {
            println!("             {desc}");
        }
        println!();
    }
    Ok(())
}

fn describe_rule(rule: &LineRuleDef) -> String {
    let sign = match rule.sign {
        SignPolicy::AsIs => "",
        SignPolicy::Negative => ", stored negative",
        SignPolicy::Positive => ", stored positive",
    };
    let mode = match rule.mode {
        WriteMode::Accumulate => "adds up",
        WriteMode::Overwrite => "last line wins",
    };
    format!("{} ({mode}{sign})", rule.field)
}

pub fn show(preset: &str) -> Result<(), FintakeError> {
    let mapping = builtin::load_preset(preset)?;

    println!("{} (version {})\n", mapping.name, mapping.version);
    if let Some(ref desc) = mapping.description {
        println!("{desc}\n");
    }
    println!("Rules are tried top to bottom; the first match decides the field.\n");

    for (i, rule) in mapping.rules.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, describe_rule(rule));
        println!("      matches: {}", rule.aliases.join(", "));
        if !rule.exclude.is_empty() {
            println!("      unless:  {}", rule.exclude.join(", "));
        }
        if let Some(ref note) = rule.note {
            println!("      note:    {note}");
        }
    }
    println!();

    Ok(())
}

pub fn schema() -> Result<(), FintakeError> {
    print!(
        r#"JSON Mapping Schema
===================

A mapping file tells fintake which statement field a spreadsheet line
belongs to. Each line's description is lowercased and stripped of accents,
then compared against the rules in file order; the first rule with a
matching alias (and no matching exclusion) wins. Lines matching no rule
are kept as unmapped.

Top-level fields:
  name          (string, required)  Human-readable name of the mapping
  description   (string, optional)  What this mapping is for
  version       (string, required)  Version identifier (e.g., "2025.1")
  rules         (array, required)   Ordered list of line rules (see below)

Each rule in the "rules" array:
  field         (string, required)  Target statement field, one of:
{fields}
  aliases       (array, required)   Substrings that select this rule.
                                    Matching ignores case and accents.
  exclude       (array, optional)   Substrings that veto the rule even when
                                    an alias matches.
  sign          (string, optional)  "as_is" (default), "negative" (store
                                    -|value|, for costs) or "positive".
  mode          (string, optional)  "accumulate" (default, lines add up) or
                                    "overwrite" (for totals and singleton
                                    balance-sheet lines).
  note          (string, optional)  Free-form comment.

Put specific rules before broad ones: "costo de ventas" must come before
"ventas" or cost lines would be read as revenue.

Example:
{{
  "name": "Retail chart of accounts",
  "version": "1",
  "rules": [
    {{ "field": "cost_of_goods_sold", "aliases": ["costo de mercaderías"], "sign": "negative" }},
    {{ "field": "revenue", "aliases": ["ventas netas", "ventas"], "exclude": ["por cobrar"] }},
    {{ "field": "equity", "aliases": ["patrimonio"], "exclude": ["pasivo"], "mode": "overwrite" }}
  ]
}}
"#,
        fields = field_list()
    );
    Ok(())
}

fn field_list() -> String {
    LineField::ALL
        .chunks(4)
        .map(|chunk| {
            let keys: Vec<&str> = chunk.iter().map(|f| f.key()).collect();
            format!("                                      {}", keys.join(", "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn validate(file: &Path) -> Result<(), FintakeError> {
    let mapping = load_mapping(file)?;

    println!("Mapping '{}' (v{}) is valid.", mapping.name, mapping.version);
    println!("  Rules: {}", mapping.rules.len());

    // Potential issues (warnings, not errors)
    let mut warnings = Vec::new();
    let mut per_field: HashMap<LineField, Vec<usize>> = HashMap::new();
    for (i, rule) in mapping.rules.iter().enumerate() {
        per_field.entry(rule.field).or_default().push(i + 1);
    }
    for field in LineField::ALL {
        match per_field.get(&field) {
            None => warnings.push(format!("no rule targets '{field}'")),
            Some(rules) if rules.len() > 1 => warnings.push(format!(
                "'{field}' is targeted by rules {}; only the first match per line applies",
                rules
                    .iter()
                    .map(|r| format!("#{r}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
            Some(_) => {}
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }

    Ok(())
}
