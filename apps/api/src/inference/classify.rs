//! Keyword-taxonomy classification over lowercased resume text.
//!
//! Classification runs on the lowercased text. Evidence snippets are pulled
//! from the original text with case-insensitive patterns so they stay literal.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::resume::Skills;

const SYSTEMATIC_TERMS: &[&str] = &[
    "quant",
    "systematic",
    "alpha",
    "signals",
    "backtest",
    "back-testing",
    "factor model",
    "regression",
    "time series",
    "machine learning",
    "ml",
    "xgboost",
    "random forest",
    "pytorch",
    "tensorflow",
    "feature engineering",
    "stat arb",
    "statistical arbitrage",
];

const FUNDAMENTAL_TERMS: &[&str] = &[
    "fundamental",
    "valuation",
    "dcf",
    "comps",
    "earnings",
    "10-k",
    "10q",
    "10-q",
    "industry research",
    "channel checks",
    "modeling",
    "financial model",
    "pitch book",
];

/// Fixed declaration order; output follows it, not order of appearance.
const SECTOR_TERMS: &[(&str, &[&str])] = &[
    (
        "Technology",
        &[
            "software",
            "saas",
            "cloud",
            "ai",
            "artificial intelligence",
            "data platform",
            "semiconductor",
            "tech",
        ],
    ),
    (
        "Healthcare",
        &["healthcare", "biotech", "pharma", "clinical", "hospital", "medical device"],
    ),
    (
        "Financial Services",
        &[
            "investment bank",
            "banking",
            "bank",
            "financial",
            "fintech",
            "insurance",
            "asset management",
            "private equity",
        ],
    ),
    (
        "Energy",
        &[
            "oil",
            "gas",
            "upstream",
            "downstream",
            "refining",
            "energy",
            "power generation",
            "utilities",
        ],
    ),
    (
        "Industrials",
        &[
            "manufacturing",
            "industrial",
            "aerospace",
            "defense",
            "automation",
            "supply chain",
            "logistics",
        ],
    ),
    (
        "Consumer",
        &["consumer", "retail", "e-commerce", "ecommerce", "cpg", "brands", "marketplace"],
    ),
];

/// Checked in order; the first region with a hit wins.
const GEO_PATTERNS: &[(&str, &str)] = &[
    (
        "US",
        r"\b(new york|nyc|boston|chicago|san francisco|california|usa|u\.s\.|united states)\b",
    ),
    (
        "Europe",
        r"\b(london|uk|united kingdom|england|paris|france|germany|frankfurt|europe|emea)\b",
    ),
    (
        "APAC",
        r"\b(singapore|hong kong|india|mumbai|bangalore|tokyo|japan|china|shanghai|seoul|asia|apac)\b",
    ),
];

const PROGRAMMING_SKILLS: &[&str] = &["Python", "C++", "Java", "R", "Julia"];
const DATA_SKILLS: &[&str] = &["SQL", "Pandas", "Spark", "Snowflake", "Airflow"];
const ML_SKILLS: &[&str] = &[
    "Machine Learning",
    "Deep Learning",
    "XGBoost",
    "PyTorch",
    "TensorFlow",
    "NLP",
];
const FINANCE_SKILLS: &[&str] = &[
    "DCF",
    "Valuation",
    "Factor Models",
    "Options",
    "Derivatives",
    "Risk",
];
const TOOL_SKILLS: &[&str] = &["Bloomberg", "FactSet", "Capital IQ", "Refinitiv", "Koyfin"];

/// A set of labels plus the literal snippets that support them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified<'a> {
    pub labels: Vec<String>,
    pub evidence: Vec<&'a str>,
}

/// Case-insensitive alternation of literal keywords, for evidence lookup.
fn keyword_finder(terms: &[&str]) -> Regex {
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){alternation}")).expect("keyword finder regex")
}

struct KeywordGroup {
    label: &'static str,
    terms: &'static [&'static str],
    finder: Regex,
}

impl KeywordGroup {
    fn new(label: &'static str, terms: &'static [&'static str]) -> Self {
        Self {
            label,
            terms,
            finder: keyword_finder(terms),
        }
    }

    fn hits(&self, lower: &str) -> bool {
        self.terms.iter().any(|t| lower.contains(t))
    }

    /// Earliest keyword occurrence in the original text.
    fn snippet<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.finder.find(text).map(|m| m.as_str())
    }
}

static APPROACH_GROUPS: Lazy<[KeywordGroup; 2]> = Lazy::new(|| {
    [
        KeywordGroup::new("Fundamental", FUNDAMENTAL_TERMS),
        KeywordGroup::new("Systematic", SYSTEMATIC_TERMS),
    ]
});

static SECTOR_GROUPS: Lazy<Vec<KeywordGroup>> = Lazy::new(|| {
    SECTOR_TERMS
        .iter()
        .map(|&(label, terms)| KeywordGroup::new(label, terms))
        .collect()
});

struct GeoPattern {
    market: &'static str,
    lower: Regex,
    literal: Regex,
}

static GEO_REGEXES: Lazy<Vec<GeoPattern>> = Lazy::new(|| {
    GEO_PATTERNS
        .iter()
        .map(|&(market, pattern)| GeoPattern {
            market,
            lower: Regex::new(pattern).expect("geo regex"),
            literal: Regex::new(&format!("(?i){pattern}")).expect("geo evidence regex"),
        })
        .collect()
});

struct SkillMatcher {
    name: &'static str,
    word: Regex,
    /// Lowercased, spaces removed; `None` for word-boundary-only skills.
    compact: Option<String>,
}

impl SkillMatcher {
    fn new(name: &'static str, allow_compact: bool) -> Self {
        let lower = name.to_lowercase();
        let word = Regex::new(&format!(r"\b{}\b", regex::escape(&lower))).expect("skill regex");
        Self {
            name,
            word,
            compact: allow_compact.then(|| lower.replace(' ', "")),
        }
    }

    fn matches(&self, lower: &str, compact_text: &str) -> bool {
        self.compact
            .as_deref()
            .is_some_and(|c| compact_text.contains(c))
            || self.word.is_match(lower)
    }
}

static SKILL_MATCHERS: Lazy<[Vec<SkillMatcher>; 5]> = Lazy::new(|| {
    let build = |names: &'static [&'static str], allow_compact: bool| {
        names
            .iter()
            .map(|&n| SkillMatcher::new(n, allow_compact))
            .collect::<Vec<_>>()
    };
    [
        build(PROGRAMMING_SKILLS, false),
        build(DATA_SKILLS, false),
        build(ML_SKILLS, true),
        build(FINANCE_SKILLS, true),
        build(TOOL_SKILLS, true),
    ]
});

/// Fundamental and/or Systematic, in that order; empty when nothing hits.
pub fn infer_approaches(text: &str) -> Classified<'_> {
    let lower = text.to_lowercase();
    let mut out = Classified::default();
    for group in APPROACH_GROUPS.iter().filter(|g| g.hits(&lower)) {
        out.labels.push(group.label.to_string());
        out.evidence.extend(group.snippet(text));
    }
    out
}

/// Sectors with at least one keyword substring; evidence for the first two.
pub fn infer_sectors(text: &str) -> Classified<'_> {
    const MAX_EVIDENCE: usize = 2;

    let lower = text.to_lowercase();
    let mut out = Classified::default();
    for group in SECTOR_GROUPS.iter().filter(|g| g.hits(&lower)) {
        out.labels.push(group.label.to_string());
        if out.labels.len() <= MAX_EVIDENCE {
            out.evidence.extend(group.snippet(text));
        }
    }
    out
}

/// First region whose pattern hits, US before Europe before APAC.
pub fn infer_geo_market(text: &str) -> Classified<'_> {
    let lower = text.to_lowercase();
    let Some(geo) = GEO_REGEXES.iter().find(|g| g.lower.is_match(&lower)) else {
        return Classified::default();
    };
    Classified {
        labels: vec![geo.market.to_string()],
        evidence: geo.literal.find(text).map(|m| m.as_str()).into_iter().collect(),
    }
}

/// Vocabulary hits per skill category; `other` is always empty.
pub fn infer_skills(text: &str) -> Skills {
    let lower = text.to_lowercase();
    let compact_text = lower.replace(' ', "");
    let [programming, data, ml, finance, tools] = SKILL_MATCHERS.each_ref().map(|matchers| {
        matchers
            .iter()
            .filter(|m| m.matches(&lower, &compact_text))
            .map(|m| m.name.to_string())
            .collect::<Vec<_>>()
    });
    Skills {
        programming,
        data,
        ml,
        finance,
        tools,
        other: Vec::new(),
    }
}
