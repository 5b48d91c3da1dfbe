use serde::{Deserialize, Serialize};

/// Settlement status of the payment a receipt describes. Receipts rarely
/// carry an explicit status line; the extractor falls back to heuristics and
/// finally to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentStatus {
    Completed,
    #[default]
    Pending,
    Failed,
    Declined,
}

impl PaymentStatus {
    /// Map a status word as printed on a receipt to the canonical enum.
    /// Vendors write "Success" or "Approved" where we store `Completed`.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "completed" | "success" | "approved" => Some(PaymentStatus::Completed),
            "pending" => Some(PaymentStatus::Pending),
            "failed" => Some(PaymentStatus::Failed),
            "declined" => Some(PaymentStatus::Declined),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PaymentStatus::Completed => "Completed",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Declined => "Declined",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_synonyms_fold_into_completed() {
        assert_eq!(PaymentStatus::from_keyword("Success"), Some(PaymentStatus::Completed));
        assert_eq!(PaymentStatus::from_keyword("approved"), Some(PaymentStatus::Completed));
        assert_eq!(PaymentStatus::from_keyword("COMPLETED"), Some(PaymentStatus::Completed));
    }

    #[test]
    fn unknown_word_is_none() {
        assert_eq!(PaymentStatus::from_keyword("reversed"), None);
    }

    #[test]
    fn default_is_pending() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }
}
