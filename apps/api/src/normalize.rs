//! Normalization Layer: maps free-form inferred strings onto the controlled
//! taxonomy and clamps numeric experience values.
//!
//! Every function is pure: the taxonomy is passed in, never read from globals.

use std::collections::HashSet;

use serde_json::Value;

use crate::taxonomy::{Category, Taxonomy};

/// Upper bound for years of experience.
pub const MAX_YEARS_EXPERIENCE: f64 = 60.0;

const US_HINTS: &[&str] = &["united states", "usa", "new york", "boston", "chicago"];
const EUROPE_HINTS: &[&str] = &["london", "uk", "france", "germany", "europe"];
const APAC_HINTS: &[&str] = &["singapore", "hong kong", "india", "japan", "china", "asia"];

/// Trim, lowercase, collapse internal whitespace runs to one space.
pub fn norm_key(value: &str) -> String {
    value
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Maps a free-form market/country string to US / Europe / APAC when possible.
///
/// Order: synonym table, exact controlled term, then US → Europe → APAC
/// substring hints; otherwise the trimmed input is passed through.
pub fn normalize_market(taxonomy: &Taxonomy, value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let key = norm_key(trimmed);
    let v = taxonomy
        .synonym(Category::Geography, &key)
        .unwrap_or(trimmed);
    if taxonomy.is_controlled(Category::Geography, v) {
        return Some(v.to_string());
    }

    let lower = v.to_lowercase();
    let hinted = [(US_HINTS, "US"), (EUROPE_HINTS, "Europe"), (APAC_HINTS, "APAC")]
        .into_iter()
        .find(|(hints, _)| hints.iter().any(|h| lower.contains(h)))
        .map(|(_, market)| market);

    Some(hinted.unwrap_or(v).to_string())
}

/// Maps an approach label to Fundamental / Systematic.
///
/// Any non-empty value that is neither a synonym nor mentions quant/system
/// becomes "Fundamental". Downstream filters rely on that non-null default.
/// The quant/system check is case-sensitive on the value as given.
pub fn normalize_approach(taxonomy: &Taxonomy, value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        return None;
    }

    let key = norm_key(trimmed);
    let v = taxonomy.synonym(Category::Approach, &key).unwrap_or(trimmed);
    if taxonomy.is_controlled(Category::Approach, v) {
        return Some(v.to_string());
    }

    if v.contains("quant") || v.contains("system") {
        Some("Systematic".to_string())
    } else {
        Some("Fundamental".to_string())
    }
}

pub fn normalize_sector_list(taxonomy: &Taxonomy, values: &[String]) -> Vec<String> {
    normalize_list(taxonomy, Category::Sector, values)
}

pub fn normalize_asset_class_list(taxonomy: &Taxonomy, values: &[String]) -> Vec<String> {
    normalize_list(taxonomy, Category::AssetClass, values)
}

/// Per-element synonym lookup; unmapped values are title-cased, never dropped.
fn normalize_list(taxonomy: &Taxonomy, category: Category, values: &[String]) -> Vec<String> {
    let mapped = values.iter().filter_map(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let key = norm_key(trimmed);
        let v = taxonomy.synonym(category, &key).unwrap_or(trimmed);
        if taxonomy.is_controlled(category, v) {
            Some(v.to_string())
        } else {
            Some(title_case(v))
        }
    });
    dedup_preserve_order(mapped)
}

/// Title-cases like a word processor: a letter is uppercased when the
/// previous character is not a letter, lowercased otherwise.
/// `"e-commerce"` → `"E-Commerce"`, `"fintech"` → `"Fintech"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Removes repeats, keeping the first occurrence of each element.
pub fn dedup_preserve_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Coerces a loosely-typed JSON value into a valid years-of-experience figure.
///
/// Numbers, numeric strings and booleans are accepted; anything else is absent.
pub fn clamp_years_exp(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.and_then(clamp_years)
}

/// Negative → absent, above 60 → 60.0, otherwise rounded to one decimal.
pub fn clamp_years(value: f64) -> Option<f64> {
    if value.is_nan() || value < 0.0 {
        return None;
    }
    if value > MAX_YEARS_EXPERIENCE {
        return Some(MAX_YEARS_EXPERIENCE);
    }
    Some(round_tenth(value))
}

/// Rounds to one decimal place, ties to even on the exact binary value
/// (`0.25` → `0.2`, `0.35` → `0.3` because 0.35 is stored slightly below).
pub fn round_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
