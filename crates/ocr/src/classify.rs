use std::sync::OnceLock;

use regex::Regex;

use dereseny_core::Category;

/// One keyword group mapped to a category. Rules are tried in table order,
/// first match wins.
pub struct CategoryRule {
    pub category: Category,
    pub keywords: &'static str,
    regex: OnceLock<Regex>,
}

impl CategoryRule {
    const fn new(category: Category, keywords: &'static str) -> Self {
        Self { category, keywords, regex: OnceLock::new() }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex
            .get_or_init(|| {
                Regex::new(&format!("(?i){}", self.keywords)).expect("invalid category keywords")
            })
            .is_match(text)
    }
}

/// The classification table. Ordering matters: the Transfer group includes
/// broad bank/receipt vocabulary, so the more specific Food and Hospital
/// groups must run before it or everything from a bank slip would land in
/// Transfer.
pub static CATEGORY_RULES: [CategoryRule; 5] = [
    CategoryRule::new(
        Category::Food,
        r"food|restaurant|grocery|dining|meal|snack|cafe|coffee|lunch|dinner|breakfast|burger|pizza|kitchen|bakery|supermarket|market",
    ),
    CategoryRule::new(
        Category::Hospital,
        r"hospital|medical|clinic|pharmacy|doctor|health|medicine|drug|healthcare|patient|treatment",
    ),
    CategoryRule::new(
        Category::Transfer,
        r"transfer|send|receive|remittance|wire|deposit|withdrawal|payer|receiver|commercial\s+bank|cbe|payment\s+done\s+via",
    ),
    CategoryRule::new(
        Category::Utilities,
        r"electric|water|utility|bill|power|energy|telecom|internet|wifi|phone|airtime|bundle|package",
    ),
    CategoryRule::new(
        Category::Fuel,
        r"fuel|gas|petrol|diesel|benzene|station|shell|exxon|bp|total|oil",
    ),
];

/// Assign a spending category from the full receipt text.
///
/// Always returns a member of the closed six-value set; empty or unmatched
/// text is `Other`.
pub fn classify(text: &str) -> Category {
    if text.trim().is_empty() {
        return Category::Other;
    }

    for rule in &CATEGORY_RULES {
        if rule.matches(text) {
            return rule.category;
        }
    }

    tracing::debug!(
        "Classification: no category matched for text snippet: {:.50}",
        text
    );
    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_other() {
        assert_eq!(classify(""), Category::Other);
        assert_eq!(classify("   \n"), Category::Other);
    }

    #[test]
    fn unmatched_text_is_other() {
        assert_eq!(classify("zzz qqq xyzzy"), Category::Other);
    }

    #[test]
    fn fuel_payment() {
        assert_eq!(classify("Fuel Payment"), Category::Fuel);
        assert_eq!(classify("Shell petrol station"), Category::Fuel);
    }

    #[test]
    fn utilities() {
        assert_eq!(classify("Electric Bill"), Category::Utilities);
        assert_eq!(classify("airtime bundle top-up"), Category::Utilities);
    }

    #[test]
    fn food() {
        assert_eq!(classify("Restaurant Dinner"), Category::Food);
        assert_eq!(classify("ABC Supermarket"), Category::Food);
    }

    #[test]
    fn hospital() {
        assert_eq!(classify("St. Paulos Hospital pharmacy"), Category::Hospital);
    }

    #[test]
    fn bank_slip_is_transfer() {
        assert_eq!(
            classify("Commercial Bank of Ethiopia\nPayer: Abebe\nReceiver: Kebede"),
            Category::Transfer
        );
    }

    #[test]
    fn food_outranks_transfer_for_restaurant_payments() {
        // "payment done via" is Transfer vocabulary, but the restaurant
        // keyword is more specific and its rule runs first.
        assert_eq!(
            classify("Restaurant bill, payment done via Mobile"),
            Category::Food
        );
    }

    #[test]
    fn table_order_is_food_hospital_transfer_utilities_fuel() {
        let order: Vec<Category> = CATEGORY_RULES.iter().map(|r| r.category).collect();
        assert_eq!(
            order,
            vec![
                Category::Food,
                Category::Hospital,
                Category::Transfer,
                Category::Utilities,
                Category::Fuel,
            ]
        );
    }

    #[test]
    fn every_rule_compiles_and_matches_its_own_vocabulary() {
        for rule in &CATEGORY_RULES {
            let first = rule.keywords.split('|').next().unwrap();
            assert!(
                rule.matches(first),
                "rule for {:?} should match '{first}'",
                rule.category
            );
        }
    }

    #[test]
    fn result_is_always_in_closed_set() {
        for text in ["", "garbage", "fuel food hospital", "ትርጉም የለሽ"] {
            assert!(Category::ALL.contains(&classify(text)));
        }
    }
}
