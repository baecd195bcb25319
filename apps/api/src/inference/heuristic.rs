//! Deterministic heuristic resume parser.
//!
//! `infer_resume` is a pure function of the text and the injected clock: no
//! I/O, no shared state, safe to call concurrently.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{classify, contacts, dates, ParseClock};
use crate::models::resume::{
    Candidate, Evidence, Metadata, ParsedResume, Quality, Summary, TargetFit,
};

pub const PARSER_VERSION: &str = "heuristic_v2";
const CONFIDENCE: f64 = 0.6;
const QUALITY_NOTE: &str =
    "Heuristic keyword parser; switch to a remote provider for richer extraction.";
const DEFAULT_ASSET_CLASS: &str = "Equity";
const DEFAULT_ROLE: &str = "Junior Analyst";

fn snippets<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items.into_iter().map(str::to_string).collect()
}

/// Builds a `ParsedResume` from raw text with keyword and pattern heuristics.
pub fn infer_resume(resume_id: Uuid, text: &str, clock: &ParseClock) -> ParsedResume {
    let name = contacts::first_line(text);
    let emails = contacts::find_emails(text);
    let phones = contacts::find_phones(text);
    let geo = classify::infer_geo_market(text);
    let approaches = classify::infer_approaches(text);
    let sectors = classify::infer_sectors(text);
    let experience = dates::estimate_years_experience(text, clock.today);
    let skills = classify::infer_skills(text);

    let mut evidence: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut record = |field: &str, values: Vec<String>| {
        if !values.is_empty() {
            evidence.insert(field.to_string(), values);
        }
    };
    record("candidate.full_name", snippets(name));
    record("candidate.emails", emails.iter().take(1).cloned().collect());
    record(
        "candidate.phones",
        snippets(phones.iter().take(1).map(|p| p.snippet)),
    );
    record(
        "summary.years_experience",
        experience
            .as_ref()
            .map(|e| snippets(e.evidence.iter().copied()))
            .unwrap_or_default(),
    );
    record(
        "target_fit.geographic_markets",
        snippets(geo.evidence.iter().copied().take(1)),
    );
    record(
        "target_fit.investment_approaches",
        snippets(approaches.evidence.iter().copied()),
    );
    record(
        "target_fit.sectors",
        snippets(sectors.evidence.iter().copied()),
    );

    let mut parsed = ParsedResume {
        candidate: Candidate {
            full_name: name.map(str::to_string),
            emails,
            phones: phones.into_iter().map(|p| p.number).collect(),
            ..Candidate::default()
        },
        target_fit: TargetFit {
            geographic_markets: geo.labels,
            investment_approaches: approaches.labels,
            asset_classes: vec![DEFAULT_ASSET_CLASS.to_string()],
            sectors: sectors.labels,
            roles: vec![DEFAULT_ROLE.to_string()],
        },
        summary: Summary {
            years_experience: experience.map(|e| e.years),
            ..Summary::default()
        },
        skills,
        metadata: Metadata {
            parsed_at: Some(clock.timestamp()),
            parser_version: Some(PARSER_VERSION.to_string()),
            quality: Quality {
                confidence: Some(CONFIDENCE),
                notes: vec![QUALITY_NOTE.to_string()],
                ..Quality::default()
            },
            ..Metadata::default()
        },
        evidence: Evidence {
            field_to_snippets: evidence,
            ..Evidence::default()
        },
        ..ParsedResume::empty(resume_id)
    };
    parsed.enforce_list_invariants();
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "\
Jane Q. Doe
New York, NY | jane.doe@example.com | +1 212-555-0199

Experience
Acme Capital, Equity Research Analyst, Jan 2020 - Mar 2022
- Built DCF models and channel checks for SaaS and semiconductor coverage
- Wrote Python and SQL backtest tooling; Bloomberg and FactSet daily
";

    fn clock() -> ParseClock {
        ParseClock::at(Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap())
    }

    #[test]
    fn test_sample_resume() {
        let id = Uuid::new_v4();
        let parsed = infer_resume(id, SAMPLE, &clock());

        assert_eq!(parsed.resume_id, id);
        assert_eq!(parsed.candidate.full_name.as_deref(), Some("Jane Q. Doe"));
        assert_eq!(parsed.candidate.emails, vec!["jane.doe@example.com"]);
        assert_eq!(parsed.candidate.phones, vec!["+1 212-555-0199"]);
        assert_eq!(parsed.target_fit.geographic_markets, vec!["US"]);
        assert_eq!(
            parsed.target_fit.investment_approaches,
            vec!["Fundamental", "Systematic"]
        );
        assert_eq!(parsed.target_fit.sectors, vec!["Technology"]);
        assert_eq!(parsed.target_fit.asset_classes, vec!["Equity"]);
        assert_eq!(parsed.target_fit.roles, vec!["Junior Analyst"]);
        assert_eq!(parsed.summary.years_experience, Some(2.2));
        assert_eq!(parsed.skills.programming, vec!["Python"]);
        assert_eq!(parsed.skills.data, vec!["SQL"]);
        assert_eq!(parsed.skills.finance, vec!["DCF"]);
        assert_eq!(parsed.skills.tools, vec!["Bloomberg", "FactSet"]);
        assert_eq!(parsed.metadata.parser_version.as_deref(), Some(PARSER_VERSION));
        assert_eq!(parsed.metadata.quality.confidence, Some(0.6));
    }

    #[test]
    fn test_evidence_snippets_are_literal() {
        let parsed = infer_resume(Uuid::nil(), SAMPLE, &clock());
        let ev = &parsed.evidence.field_to_snippets;

        assert_eq!(ev["candidate.full_name"], vec!["Jane Q. Doe"]);
        assert_eq!(ev["candidate.phones"], vec!["+1 212-555-0199"]);
        assert_eq!(ev["summary.years_experience"], vec!["Jan 2020 - Mar 2022"]);
        assert_eq!(ev["target_fit.geographic_markets"], vec!["New York"]);
        for snippets in ev.values() {
            for snippet in snippets {
                assert!(SAMPLE.contains(snippet.as_str()), "{snippet} not in text");
            }
        }
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let id = Uuid::new_v4();
        let a = serde_json::to_string(&infer_resume(id, SAMPLE, &clock())).unwrap();
        let b = serde_json::to_string(&infer_resume(id, SAMPLE, &clock())).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_text_degrades_to_defaults() {
        let parsed = infer_resume(Uuid::nil(), "", &clock());
        assert_eq!(parsed.candidate.full_name, None);
        assert!(parsed.candidate.emails.is_empty());
        assert!(parsed.target_fit.geographic_markets.is_empty());
        assert!(parsed.target_fit.investment_approaches.is_empty());
        assert_eq!(parsed.summary.years_experience, None);
        assert!(parsed.evidence.field_to_snippets.is_empty());
        assert_eq!(parsed.target_fit.roles, vec!["Junior Analyst"]);
    }

    #[test]
    fn test_parsed_at_uses_clock() {
        let parsed = infer_resume(Uuid::nil(), "x", &clock());
        assert_eq!(
            parsed.metadata.parsed_at.as_deref(),
            Some("2024-06-15T12:00:00.000000Z")
        );
    }
}
