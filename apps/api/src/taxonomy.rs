//! Controlled vocabularies and synonym maps.
//!
//! Built once at startup (`Taxonomy::builtin()`), wrapped in an `Arc` in
//! `AppState`, and passed explicitly into the normalization functions.
//! A synonym miss is not an error: it tells the caller to fall through to
//! its substring heuristics.

use std::collections::HashMap;

use serde::Serialize;

/// The four normalized categories that carry synonym tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Geography,
    Approach,
    Sector,
    AssetClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct Taxonomy {
    pub geographic_markets: Vec<String>,
    pub investment_approaches: Vec<String>,
    pub asset_classes: Vec<String>,
    pub sectors: Vec<String>,
    pub roles: Vec<String>,
    pub degree_levels: Vec<String>,
    #[serde(skip)]
    synonyms: HashMap<Category, HashMap<String, String>>,
}

const GEOGRAPHIC_MARKETS: &[&str] = &["US", "Europe", "APAC"];

const INVESTMENT_APPROACHES: &[&str] = &["Fundamental", "Systematic"];

const ASSET_CLASSES: &[&str] = &[
    "Equity",
    "Credit",
    "Macro",
    "Rates",
    "Commodities",
    "Volatility",
    "FX",
];

const SECTORS: &[&str] = &[
    "Technology",
    "Healthcare",
    "Financial Services",
    "Energy",
    "Industrials",
    "Consumer",
    "TMT",
    "Real Estate",
    "Utilities",
];

const ROLES: &[&str] = &[
    "Junior Analyst",
    "Research Analyst",
    "Quant Research",
    "Quant Trading",
    "Trader",
    "Credit Analyst",
    "Macro Research",
    "Data",
];

const DEGREE_LEVELS: &[&str] = &["High School", "Bachelors", "Masters", "PhD", "Other"];

const SYN_GEO: &[(&str, &str)] = &[
    ("usa", "US"),
    ("united states", "US"),
    ("us", "US"),
    ("u.s.", "US"),
    ("europe", "Europe"),
    ("emea", "Europe"),
    ("apac", "APAC"),
    ("asia", "APAC"),
];

const SYN_APPROACH: &[(&str, &str)] = &[
    ("quant", "Systematic"),
    ("systematic", "Systematic"),
    ("discretionary", "Fundamental"),
    ("fundamental", "Fundamental"),
];

const SYN_SECTOR: &[(&str, &str)] = &[
    ("financials", "Financial Services"),
    ("finserv", "Financial Services"),
    ("tech", "Technology"),
    ("tmt", "TMT"),
    ("health care", "Healthcare"),
    ("healthcare", "Healthcare"),
];

const SYN_ASSET_CLASS: &[(&str, &str)] = &[
    ("equities", "Equity"),
    ("equity", "Equity"),
    ("credit", "Credit"),
    ("macro", "Macro"),
    ("rates", "Rates"),
    ("commodities", "Commodities"),
    ("fx", "FX"),
    ("vol", "Volatility"),
];

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| t.to_string()).collect()
}

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Taxonomy {
    /// The built-in vocabularies.
    pub fn builtin() -> Self {
        let synonyms = HashMap::from([
            (Category::Geography, table(SYN_GEO)),
            (Category::Approach, table(SYN_APPROACH)),
            (Category::Sector, table(SYN_SECTOR)),
            (Category::AssetClass, table(SYN_ASSET_CLASS)),
        ]);

        Self {
            geographic_markets: owned(GEOGRAPHIC_MARKETS),
            investment_approaches: owned(INVESTMENT_APPROACHES),
            asset_classes: owned(ASSET_CLASSES),
            sectors: owned(SECTORS),
            roles: owned(ROLES),
            degree_levels: owned(DEGREE_LEVELS),
            synonyms,
        }
    }

    /// Looks up an already-normalized (trimmed, lowercased) key.
    pub fn synonym(&self, category: Category, key: &str) -> Option<&str> {
        self.synonyms
            .get(&category)
            .and_then(|t| t.get(key))
            .map(String::as_str)
    }

    /// Whether `term` is exactly one of the controlled terms for `category`.
    pub fn is_controlled(&self, category: Category, term: &str) -> bool {
        let terms = match category {
            Category::Geography => &self.geographic_markets,
            Category::Approach => &self.investment_approaches,
            Category::Sector => &self.sectors,
            Category::AssetClass => &self.asset_classes,
        };
        terms.iter().any(|t| t == term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_synonym_targets_a_controlled_term() {
        let tax = Taxonomy::builtin();
        for (category, pairs) in [
            (Category::Geography, SYN_GEO),
            (Category::Approach, SYN_APPROACH),
            (Category::Sector, SYN_SECTOR),
            (Category::AssetClass, SYN_ASSET_CLASS),
        ] {
            for (key, target) in pairs {
                assert_eq!(tax.synonym(category, key), Some(*target));
                assert!(
                    tax.is_controlled(category, target),
                    "{target} not controlled for {category:?}"
                );
            }
        }
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let tax = Taxonomy::builtin();
        assert_eq!(tax.synonym(Category::Sector, "crypto"), None);
        // keys are expected pre-lowercased
        assert_eq!(tax.synonym(Category::Geography, "USA"), None);
    }

    #[test]
    fn test_controlled_terms_are_case_sensitive() {
        let tax = Taxonomy::builtin();
        assert!(tax.is_controlled(Category::Geography, "APAC"));
        assert!(!tax.is_controlled(Category::Geography, "apac"));
    }

    #[test]
    fn test_serializes_vocabularies_only() {
        let value = serde_json::to_value(Taxonomy::builtin()).unwrap();
        assert_eq!(value["geographic_markets"][0], "US");
        assert!(value.get("synonyms").is_none());
        assert_eq!(value["degree_levels"].as_array().unwrap().len(), 5);
    }
}
