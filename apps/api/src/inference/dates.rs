//! Date-range extraction and years-of-experience estimation.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::normalize::MAX_YEARS_EXPERIENCE;

/// Evidence snippets kept for a date-range based estimate.
const MAX_RANGE_EVIDENCE: usize = 2;

const MONTH_ALTERNATION: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec|January|February|March|April|June|July|August|September|October|November|December";

// Dash class accepts en/em dashes so matches stay on the original text.
static MONTH_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<a>(?:{m})\s+\d{{4}})\s*[-\u{{2013}}\u{{2014}}]\s*(?P<b>(?:{m})\s+\d{{4}}|Present|Current)",
        m = MONTH_ALTERNATION
    ))
    .expect("month range regex")
});

static YEAR_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?P<a>\d{4})\s*[-\u{2013}\u{2014}]\s*(?P<b>\d{4}|Present|Current)")
        .expect("year range regex")
});

static EXPLICIT_YEARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\+?\s+years?\b").expect("explicit years regex")
});

/// An accepted employment span (`end >= start`) and the text that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange<'a> {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub snippet: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceEstimate<'a> {
    pub years: f64,
    pub evidence: Vec<&'a str>,
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match token.parse::<i32>() {
        Ok(year) if year >= 1 => Some(year),
        _ => None,
    }
}

/// `"Jan 2022"` → 2022-01-01, `"2022"` → 2022-01-01, otherwise `None`.
fn parse_month_year(token: &str) -> Option<NaiveDate> {
    let lower = token.trim().to_lowercase();
    let mut parts = lower.split_whitespace();
    let (month, year) = match (parts.next(), parts.next(), parts.next()) {
        (Some(year), None, None) => (1, parse_year(year)?),
        (Some(month), Some(year), None) => (month_number(month)?, parse_year(year)?),
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn range_from_captures<'a>(caps: &Captures<'a>, today: NaiveDate) -> Option<DateRange<'a>> {
    let start = parse_month_year(caps.name("a")?.as_str())?;
    let end_raw = caps.name("b")?.as_str().trim();
    let end = if end_raw.eq_ignore_ascii_case("present") || end_raw.eq_ignore_ascii_case("current")
    {
        today.with_day(1)?
    } else {
        parse_month_year(end_raw)?
    };
    (end >= start).then(|| DateRange {
        start,
        end,
        snippet: caps.get(0).map_or("", |m| m.as_str()),
    })
}

/// Month-year ranges first, then bare year ranges. A month-year range ending
/// in "Present" also yields a year-only range for the same span.
pub fn extract_date_ranges(text: &str, today: NaiveDate) -> Vec<DateRange<'_>> {
    [&*MONTH_RANGE_RE, &*YEAR_RANGE_RE]
        .into_iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| range_from_captures(&caps, today))
        .collect()
}

/// Whole months between two first-of-month dates.
fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end.year() as i64 - start.year() as i64) * 12 + (end.month() as i64 - start.month() as i64)
}

/// `months / 12` rounded to one decimal, ties to even.
fn months_to_years(months: i64) -> f64 {
    let tenths = months * 10;
    let (mut q, r) = (tenths / 12, tenths % 12);
    if r * 2 > 12 || (r * 2 == 12 && q % 2 == 1) {
        q += 1;
    }
    q as f64 / 10.0
}

/// An explicit "N years" statement wins when N is in 0..=60; otherwise the
/// span from the earliest range start to the latest range end.
/// No ranges and no usable statement means unknown, never zero.
pub fn estimate_years_experience(text: &str, today: NaiveDate) -> Option<ExperienceEstimate<'_>> {
    if let Some(caps) = EXPLICIT_YEARS_RE.captures(text) {
        let years = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .map(f64::from)
            .filter(|v| (0.0..=MAX_YEARS_EXPERIENCE).contains(v));
        if let (Some(years), Some(m)) = (years, caps.get(0)) {
            return Some(ExperienceEstimate {
                years,
                evidence: vec![m.as_str()],
            });
        }
    }

    let ranges = extract_date_ranges(text, today);
    let start = ranges.iter().map(|r| r.start).min()?;
    let end = ranges.iter().map(|r| r.end).max()?;
    let months = months_between(start, end);
    if months < 0 {
        return None;
    }

    Some(ExperienceEstimate {
        years: months_to_years(months).min(MAX_YEARS_EXPERIENCE),
        evidence: ranges
            .iter()
            .take(MAX_RANGE_EVIDENCE)
            .map(|r| r.snippet)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_explicit_years_used_verbatim() {
        let est = estimate_years_experience("5 years of experience", today()).unwrap();
        assert_eq!(est.years, 5.0);
        assert_eq!(est.evidence, vec!["5 years"]);
    }

    #[test]
    fn test_explicit_plus_years() {
        let est = estimate_years_experience("Over 12+ Years in equities", today()).unwrap();
        assert_eq!(est.years, 12.0);
        assert_eq!(est.evidence, vec!["12+ Years"]);
    }

    #[test]
    fn test_explicit_years_out_of_range_falls_through() {
        let text = "75 years of history. Analyst 2020 - 2022";
        let est = estimate_years_experience(text, today()).unwrap();
        assert_eq!(est.years, 2.0);
    }

    #[test]
    fn test_month_range() {
        let est = estimate_years_experience("Analyst, Jan 2020 - Mar 2022", today()).unwrap();
        assert_eq!(est.years, 2.2);
        assert_eq!(est.evidence, vec!["Jan 2020 - Mar 2022"]);
    }

    #[test]
    fn test_overlapping_ranges_span_earliest_to_latest() {
        let text = "Fund A 2018 - 2020\nFund B 2019 - Present";
        let est = estimate_years_experience(text, today()).unwrap();
        // 2018-01 .. 2024-06 = 77 months
        assert_eq!(est.years, 6.4);
        assert_eq!(est.evidence, vec!["2018 - 2020", "2019 - Present"]);
    }

    #[test]
    fn test_no_ranges_is_unknown() {
        assert_eq!(estimate_years_experience("no dates here", today()), None);
    }

    #[test]
    fn test_reversed_range_rejected() {
        assert!(extract_date_ranges("2022 - 2019", today()).is_empty());
        assert_eq!(estimate_years_experience("2022 - 2019", today()), None);
    }

    #[test]
    fn test_present_resolves_to_first_of_month() {
        let ranges = extract_date_ranges("Jun 2019 – present", today());
        // month-year pattern plus the year-only pattern on the same text
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0].start, ymd(2019, 6, 1));
        assert_eq!(ranges[0].end, ymd(2024, 6, 1));
        assert_eq!(ranges[0].snippet, "Jun 2019 – present");
        assert_eq!(ranges[1].start, ymd(2019, 1, 1));
        assert_eq!(ranges[1].snippet, "2019 – present");
    }

    #[test]
    fn test_full_month_names_and_sept() {
        let ranges = extract_date_ranges("September 2015 - Sept 2016", today());
        assert_eq!(ranges[0].start, ymd(2015, 9, 1));
        assert_eq!(ranges[0].end, ymd(2016, 9, 1));
    }

    #[test]
    fn test_year_zero_is_ignored() {
        assert!(extract_date_ranges("0000 - 2020", today()).is_empty());
    }

    #[test]
    fn test_rounding_ties_to_even() {
        assert_eq!(months_to_years(3), 0.2);
        assert_eq!(months_to_years(9), 0.8);
        assert_eq!(months_to_years(15), 1.2);
        assert_eq!(months_to_years(26), 2.2);
        assert_eq!(months_to_years(0), 0.0);
    }

    #[test]
    fn test_caps_at_sixty() {
        let est = estimate_years_experience("1900 - 2000", today()).unwrap();
        assert_eq!(est.years, 60.0);
    }
}
