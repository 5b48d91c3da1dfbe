use serde::{Deserialize, Serialize};

/// The closed set of spending categories the classifier may produce.
/// Downstream storage keys on these exact names; free-form strings are not
/// allowed to leak out of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Category {
    Food,
    Hospital,
    Transfer,
    Utilities,
    Fuel,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Hospital,
        Category::Transfer,
        Category::Utilities,
        Category::Fuel,
        Category::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Hospital => "Hospital",
            Category::Transfer => "Transfer",
            Category::Utilities => "Utilities",
            Category::Fuel => "Fuel",
            Category::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown category: '{s}'"))
    }
}
