use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

fn re_number_token() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("invalid regex"))
}

fn re_currency_label() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"(?i)\b(?:ETB|USD|EUR|GBP|Birr)\b|\$").expect("invalid regex"))
}

/// Canonicalize a monetary substring ("4,581.00 ETB", "$12.50", "Birr 300")
/// into a strictly positive decimal.
///
/// Non-positive and unparseable values come back as `None` — a zero amount
/// is treated as absent, never as zero, so the caller's cascade keeps going.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let stripped = re_currency_label().replace_all(s, " ");
    let cleaned = stripped.replace(',', "");
    let token = re_number_token().find(&cleaned)?;
    let amount = Decimal::from_str(token.as_str()).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn plain_decimal() {
        assert_eq!(parse_amount("4581.00"), Some(dec("4581.00")));
        assert_eq!(parse_amount("0.01"), Some(dec("0.01")));
    }

    #[test]
    fn currency_labels_are_stripped() {
        assert_eq!(parse_amount("4,581.00 ETB"), Some(dec("4581.00")));
        assert_eq!(parse_amount("ETB 300"), Some(dec("300")));
        assert_eq!(parse_amount("$12.50"), Some(dec("12.50")));
        assert_eq!(parse_amount("1,234.56 Birr"), Some(dec("1234.56")));
    }

    #[test]
    fn thousands_separators() {
        assert_eq!(parse_amount("1,234,567.89"), Some(dec("1234567.89")));
    }

    #[test]
    fn non_positive_is_absent() {
        assert_eq!(parse_amount("0.00"), None);
        assert_eq!(parse_amount("0"), None);
    }

    #[test]
    fn garbage_is_absent() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("no digits here"), None);
        assert_eq!(parse_amount("ETB"), None);
    }
}
