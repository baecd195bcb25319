//! Record Assembly & Search-Blob Builder.
//!
//! Projects a validated `ParsedResume` onto the flat `CandidateRecord` stored
//! in Postgres. Rebuilt in full on every (re-)parse.

use anyhow::Result;

use crate::models::candidate::CandidateRecord;
use crate::models::resume::ParsedResume;
use crate::normalize::{
    clamp_years, normalize_approach, normalize_asset_class_list, normalize_market,
    normalize_sector_list,
};
use crate::taxonomy::Taxonomy;

/// Characters of raw resume text appended to the search blob.
pub const BLOB_TEXT_CHARS: usize = 5000;

/// Flattened lowercase text used for keyword search.
///
/// Order: name, emails, phones, sectors, roles, approaches, asset classes,
/// skills by category, each experience entry's employer / title / bullets,
/// then the head of the raw text. Empty parts are skipped.
pub fn build_search_blob(parsed: &ParsedResume, resume_text: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    let c = &parsed.candidate;
    let t = &parsed.target_fit;

    parts.extend(c.full_name.as_deref());
    parts.extend(c.emails.iter().map(String::as_str));
    parts.extend(c.phones.iter().map(String::as_str));
    for list in [&t.sectors, &t.roles, &t.investment_approaches, &t.asset_classes] {
        parts.extend(list.iter().map(String::as_str));
    }
    for list in parsed.skills.categories() {
        parts.extend(list.iter().map(String::as_str));
    }
    for exp in &parsed.experience {
        parts.extend(exp.employer.as_deref());
        parts.extend(exp.title.as_deref());
        parts.extend(exp.bullets.iter().map(String::as_str));
    }
    let head_end = resume_text
        .char_indices()
        .nth(BLOB_TEXT_CHARS)
        .map_or(resume_text.len(), |(idx, _)| idx);
    parts.push(&resume_text[..head_end]);

    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn json_list(values: &[String]) -> Result<String> {
    Ok(serde_json::to_string(values)?)
}

/// Deterministic projection of a parsed resume onto its stored row.
pub fn build_candidate_record(
    parsed: &ParsedResume,
    resume_text: &str,
    source_filename: &str,
    raw_document_key: Option<String>,
    taxonomy: &Taxonomy,
) -> Result<CandidateRecord> {
    let c = &parsed.candidate;
    let t = &parsed.target_fit;
    let country = c.location_current.country.clone();

    let geo_raw = t
        .geographic_markets
        .first()
        .map(String::as_str)
        .filter(|g| !g.trim().is_empty())
        .or(country.as_deref());

    Ok(CandidateRecord {
        resume_id: parsed.resume_id,
        full_name: c.full_name.clone(),
        email: c.emails.first().cloned(),
        phone: c.phones.first().cloned(),
        geo_market: normalize_market(taxonomy, geo_raw),
        country,
        approach: normalize_approach(
            taxonomy,
            t.investment_approaches.first().map(String::as_str),
        ),
        years_experience: parsed.summary.years_experience.and_then(clamp_years),
        degree_level: parsed.summary.education_level.clone(),
        sectors_json: json_list(&normalize_sector_list(taxonomy, &t.sectors))?,
        asset_classes_json: json_list(&normalize_asset_class_list(taxonomy, &t.asset_classes))?,
        roles_json: json_list(&t.roles)?,
        skills_programming_json: json_list(&parsed.skills.programming)?,
        skills_data_json: json_list(&parsed.skills.data)?,
        skills_ml_json: json_list(&parsed.skills.ml)?,
        skills_finance_json: json_list(&parsed.skills.finance)?,
        skills_tools_json: json_list(&parsed.skills.tools)?,
        search_blob: build_search_blob(parsed, resume_text),
        parsed_json: serde_json::to_value(parsed)?,
        source_filename: source_filename.to_string(),
        raw_document_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ExperienceEntry;
    use uuid::Uuid;

    fn sample() -> ParsedResume {
        let mut parsed = ParsedResume::empty(Uuid::new_v4());
        parsed.candidate.full_name = Some("Jane DOE".into());
        parsed.candidate.emails = vec!["Jane@Fund.com".into(), "j@x.io".into()];
        parsed.target_fit.geographic_markets = vec!["United States".into()];
        parsed.target_fit.investment_approaches = vec!["quant".into()];
        parsed.target_fit.sectors = vec!["tech".into(), "fintech".into()];
        parsed.target_fit.asset_classes = vec!["equities".into()];
        parsed.target_fit.roles = vec!["Quant Research".into()];
        parsed.skills.programming = vec!["Python".into()];
        parsed.skills.other = vec!["Chess".into()];
        parsed.summary.years_experience = Some(75.0);
        parsed.experience = vec![ExperienceEntry {
            employer: Some("Acme Capital".into()),
            title: None,
            bullets: vec!["Built signals".into()],
            ..ExperienceEntry::default()
        }];
        parsed
    }

    #[test]
    fn test_blob_contains_lowercased_name() {
        let blob = build_search_blob(&sample(), "");
        assert!(blob.contains("jane doe"));
    }

    #[test]
    fn test_blob_order_and_skips_empty_parts() {
        let blob = build_search_blob(&sample(), "Raw TEXT");
        assert_eq!(
            blob,
            "jane doe jane@fund.com j@x.io tech fintech quant research quant equities \
             python chess acme capital built signals raw text"
        );
    }

    #[test]
    fn test_blob_caps_raw_text() {
        let text = "a".repeat(BLOB_TEXT_CHARS + 100);
        let blob = build_search_blob(&ParsedResume::empty(Uuid::nil()), &text);
        assert_eq!(blob.len(), BLOB_TEXT_CHARS);
    }

    #[test]
    fn test_record_projection() {
        let parsed = sample();
        let record =
            build_candidate_record(&parsed, "text", "jane.pdf", None, &Taxonomy::builtin())
                .unwrap();

        assert_eq!(record.resume_id, parsed.resume_id);
        assert_eq!(record.email.as_deref(), Some("Jane@Fund.com"));
        assert_eq!(record.phone, None);
        assert_eq!(record.geo_market.as_deref(), Some("US"));
        assert_eq!(record.approach.as_deref(), Some("Systematic"));
        assert_eq!(record.years_experience, Some(60.0));
        assert_eq!(record.sectors_json, r#"["Technology","Fintech"]"#);
        assert_eq!(record.asset_classes_json, r#"["Equity"]"#);
        assert_eq!(record.roles_json, r#"["Quant Research"]"#);
        assert_eq!(record.skills_ml_json, "[]");
        assert_eq!(record.parsed_json["resume_id"], parsed.resume_id.to_string());
        assert_eq!(record.source_filename, "jane.pdf");
    }

    #[test]
    fn test_geo_falls_back_to_country() {
        let mut parsed = ParsedResume::empty(Uuid::nil());
        parsed.candidate.location_current.country = Some("Singapore".into());
        let record =
            build_candidate_record(&parsed, "", "x.docx", None, &Taxonomy::builtin()).unwrap();
        assert_eq!(record.geo_market.as_deref(), Some("APAC"));
        assert_eq!(record.country.as_deref(), Some("Singapore"));
        assert_eq!(record.approach, None);
        assert_eq!(record.years_experience, None);
    }

    #[test]
    fn test_blank_first_market_falls_back_to_country() {
        let mut parsed = ParsedResume::empty(Uuid::nil());
        parsed.target_fit.geographic_markets = vec!["   ".into(), "US".into()];
        parsed.candidate.location_current.country = Some("Singapore".into());
        let record =
            build_candidate_record(&parsed, "", "x.docx", None, &Taxonomy::builtin()).unwrap();
        assert_eq!(record.geo_market.as_deref(), Some("APAC"));
    }
}
