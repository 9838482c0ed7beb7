use regex::Regex;
use std::sync::LazyLock;

/// Fold a line description for keyword matching.
///
/// Steps:
/// 1. Lowercase
/// 2. Strip Spanish/Portuguese accents ("explotación" -> "explotacion")
/// 3. Collapse runs of whitespace into a single space and trim
pub fn fold_text(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut folded = String::with_capacity(lower.len());
    let mut prev_space = true;
    for c in lower.chars() {
        let c = match c {
            'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            c if c.is_whitespace() => ' ',
            c => c,
        };
        if c == ' ' {
            if !prev_space {
                folded.push(' ');
            }
            prev_space = true;
        } else {
            folded.push(c);
            prev_space = false;
        }
    }
    if folded.ends_with(' ') {
        folded.pop();
    }
    folded
}

static CURRENCY_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(?\s*(?:MM\$|M\$|US\$|\bCLP\b|\bUSD\b|\bEUR\b|€|\$)\s*\)?").unwrap()
});

/// Clean a header cell into a period label: currency annotations such as
/// "M$" or "(USD)" are removed and whitespace trimmed.
pub fn clean_period_label(raw: &str) -> String {
    let stripped = CURRENCY_ANNOTATION.replace_all(raw, " ");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

static USD_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)US\$|\bUSD\b").unwrap());
static EUR_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)€|\bEUR\b").unwrap());
static CLP_MARK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\$|\bCLP\b").unwrap());

/// Currency code implied by an annotation in header text, if any.
///
/// Codes only count as whole words, so names like "Eurofarma" do not match.
pub fn detect_currency(text: &str) -> Option<&'static str> {
    if USD_MARK.is_match(text) {
        Some("USD")
    } else if EUR_MARK.is_match(text) {
        Some("EUR")
    } else if CLP_MARK.is_match(text) {
        Some("CLP")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents_and_case() {
        assert_eq!(fold_text("Ingresos de Explotación"), "ingresos de explotacion");
        assert_eq!(fold_text("  Costo   de\tVentas "), "costo de ventas");
        assert_eq!(fold_text("Año"), "ano");
    }

    #[test]
    fn test_clean_period_label() {
        assert_eq!(clean_period_label("2024 M$"), "2024");
        assert_eq!(clean_period_label(" 2023 (MM$) "), "2023");
        assert_eq!(clean_period_label("31/12/2024 USD"), "31/12/2024");
        assert_eq!(clean_period_label("Dic 2024"), "Dic 2024");
    }

    #[test]
    fn test_detect_currency() {
        assert_eq!(detect_currency("2024 M$"), Some("CLP"));
        assert_eq!(detect_currency("2024 US$"), Some("USD"));
        assert_eq!(detect_currency("FY2024 (EUR)"), Some("EUR"));
        assert_eq!(detect_currency("2024"), None);
    }

    #[test]
    fn test_currency_codes_inside_words_ignored() {
        assert_eq!(detect_currency("Razón social: Eurofarma Chile SpA"), None);
        assert_eq!(detect_currency("Clínica de Neurología"), None);
        assert_eq!(detect_currency("Busdrive Ltda"), None);
        assert_eq!(detect_currency("Montos en USD"), Some("USD"));
    }
}
