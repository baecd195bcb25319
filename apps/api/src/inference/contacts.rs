use once_cell::sync::Lazy;
use regex::Regex;

use crate::normalize::dedup_preserve_order;

pub const MAX_PHONES: usize = 3;
const MIN_PHONE_DIGITS: usize = 10;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("email regex")
});

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-\s]?)?(?:\(?\d{2,4}\)?[-\s]?)?\d{3,4}[-\s]?\d{3,4}")
        .expect("phone regex")
});

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// A phone number as stored (whitespace collapsed) plus the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PhoneMatch<'a> {
    pub number: String,
    pub snippet: &'a str,
}

const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{85}', '\u{2028}', '\u{2029}',
];

/// First non-blank line, trimmed.
pub fn first_line(text: &str) -> Option<&str> {
    text.split(LINE_BREAKS)
        .map(str::trim)
        .find(|line| !line.is_empty())
}

/// Every email-looking token, de-duplicated in order of appearance.
pub fn find_emails(text: &str) -> Vec<String> {
    dedup_preserve_order(EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()))
}

/// Loose phone matches carrying at least ten digits, at most three.
pub fn find_phones(text: &str) -> Vec<PhoneMatch<'_>> {
    let mut out: Vec<PhoneMatch<'_>> = Vec::new();
    for m in PHONE_RE.find_iter(text) {
        let number = WHITESPACE_RE
            .replace_all(m.as_str(), " ")
            .trim()
            .to_string();
        let digits = number.chars().filter(|c| c.is_numeric()).count();
        if digits < MIN_PHONE_DIGITS || out.iter().any(|p| p.number == number) {
            continue;
        }
        out.push(PhoneMatch {
            number,
            snippet: m.as_str().trim(),
        });
        if out.len() == MAX_PHONES {
            break;
        }
    }
    out
}
