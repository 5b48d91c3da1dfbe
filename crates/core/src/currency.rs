use serde::{Deserialize, Serialize};

/// Currencies that appear on the receipts we handle. Ethiopian birr is the
/// home currency and the documented default when nothing else matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Currency {
    #[default]
    #[serde(rename = "ETB")]
    Etb,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Etb => "ETB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "Birr" shows up spelled out on Telebirr slips.
        match s.to_ascii_uppercase().as_str() {
            "ETB" | "BIRR" => Ok(Currency::Etb),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(format!("Unknown currency: '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn birr_normalizes_to_etb() {
        assert_eq!(Currency::from_str("Birr").unwrap(), Currency::Etb);
        assert_eq!(Currency::from_str("BIRR").unwrap(), Currency::Etb);
    }

    #[test]
    fn codes_roundtrip() {
        for c in [Currency::Etb, Currency::Usd, Currency::Eur, Currency::Gbp] {
            assert_eq!(Currency::from_str(c.code()).unwrap(), c);
        }
    }

    #[test]
    fn default_is_etb() {
        assert_eq!(Currency::default(), Currency::Etb);
    }

    #[test]
    fn unknown_code_is_error() {
        assert!(Currency::from_str("AUD").is_err());
    }
}
