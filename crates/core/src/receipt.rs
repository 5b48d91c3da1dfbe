use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Category, Currency, PaymentStatus};

/// The pipeline's sole durable output: one structured record per receipt.
///
/// The field names here are the wire contract with storage and the UI —
/// every field is always present in the serialized shape, nullable where
/// extraction may come up empty, so consumers stay stable against
/// extraction drift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    pub merchant_name: Option<String>,
    pub payment_reason: Option<String>,
    /// Strictly positive when present; unparseable or non-positive amounts
    /// are recorded as absent, never as zero.
    pub amount: Option<Decimal>,
    pub currency: Currency,
    /// Always populated; defaults to the parse instant when no date pattern
    /// matched (soft-fail, logged by the extractor).
    pub payment_date: NaiveDateTime,
    pub payer_name: Option<String>,
    pub status: PaymentStatus,
    pub payment_channel: Option<String>,
    pub invoice_no: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "category_name")]
    pub category: Category,
    /// The exact text extraction ran over, preserved verbatim for audit.
    pub raw_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn sample() -> ParsedReceipt {
        ParsedReceipt {
            merchant_name: Some("Nile Petroleum".into()),
            payment_reason: None,
            amount: Some(Decimal::from_str("4581.00").unwrap()),
            currency: Currency::Etb,
            payment_date: NaiveDate::from_ymd_opt(2026, 1, 5)
                .unwrap()
                .and_hms_opt(19, 46, 30)
                .unwrap(),
            payer_name: None,
            status: PaymentStatus::Completed,
            payment_channel: Some("Mobile Banking".into()),
            invoice_no: Some("FT26043ZZDBJ".into()),
            source: Some("Telebirr".into()),
            category: Category::Fuel,
            raw_text: "Amount: 4581.00 ETB".into(),
        }
    }

    #[test]
    fn wire_shape_has_contract_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "merchant_name",
            "payment_reason",
            "amount",
            "currency",
            "payment_date",
            "payer_name",
            "status",
            "payment_channel",
            "invoice_no",
            "source",
            "category_name",
            "raw_text",
        ] {
            assert!(obj.contains_key(key), "missing wire field {key}");
        }
        assert_eq!(obj.len(), 12);
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json["payment_reason"].is_null());
        assert!(json["payer_name"].is_null());
    }

    #[test]
    fn payment_date_is_iso8601() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["payment_date"], "2026-01-05T19:46:30");
    }
}
