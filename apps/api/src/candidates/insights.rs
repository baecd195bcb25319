use std::collections::HashMap;

use serde::Serialize;

use crate::models::candidate::{decode_list, CandidateRow};

pub const HISTOGRAM_BINS: usize = 15;
pub const TOP_SECTORS: usize = 15;

const UNKNOWN: &str = "(Unknown)";
const NO_SECTOR: &str = "(None)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightsReport {
    pub total_candidates: usize,
    pub by_geo_market: Vec<LabelCount>,
    pub by_approach: Vec<LabelCount>,
    /// Mentions, not candidates: a candidate counts once per listed sector.
    pub by_sector: Vec<LabelCount>,
    pub experience_histogram: Vec<HistogramBin>,
    pub unknown_experience: usize,
}

/// Count desc, then label asc.
fn ranked<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut ranked: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, count)| LabelCount {
            label: label.to_string(),
            count,
        })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    ranked
}

fn label_or_unknown(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or(UNKNOWN)
}

/// Equal-width bins spanning [min, max]; the last bin is closed on the right.
/// A single distinct value gets a unit-wide range centred on it.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins {
                hi
            } else {
                lo + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

pub fn compute_insights(rows: &[CandidateRow]) -> InsightsReport {
    let sectors: Vec<Vec<String>> = rows.iter().map(|r| decode_list(&r.sectors_json)).collect();
    let sector_labels = sectors.iter().flat_map(|list| {
        let labels: Vec<&str> = if list.is_empty() {
            vec![NO_SECTOR]
        } else {
            list.iter()
                .map(|s| if s.is_empty() { NO_SECTOR } else { s.as_str() })
                .collect()
        };
        labels
    });
    let mut by_sector = ranked(sector_labels);
    by_sector.truncate(TOP_SECTORS);

    let known: Vec<f64> = rows
        .iter()
        .filter_map(|r| r.years_experience)
        .filter(|y| y.is_finite())
        .collect();

    InsightsReport {
        total_candidates: rows.len(),
        by_geo_market: ranked(rows.iter().map(|r| label_or_unknown(&r.geo_market))),
        by_approach: ranked(rows.iter().map(|r| label_or_unknown(&r.approach))),
        by_sector,
        experience_histogram: histogram(&known, HISTOGRAM_BINS),
        unknown_experience: rows.len() - known.len(),
    }
}
