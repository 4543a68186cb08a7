//! Per-domain signal extraction from free-text reports.
//!
//! The report is narrative text written by a language model, so there is no
//! schema to lean on. Lines are scanned top to bottom with a "current domain"
//! cursor that moves whenever a URL appears; every line under a domain is run
//! through a declarative [`SignalRule`] table. Vocabulary covers English and
//! Russian reports.

use std::collections::HashSet;
use std::sync::LazyLock;

use competitor_report_core::{
    SignalField, SignalMap, SignalRecord, domain_of, unique_domains,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// How a rule folds a match into its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Keep the largest captured number.
    Max,
    /// Add the captured number.
    Sum,
    /// Set the flag on any match.
    Latch,
}

/// One row of the extraction table: a field, its patterns, and how matches
/// combine. Every pattern is searched on every line and each one that matches
/// folds its first match into the field.
pub struct SignalRule {
    pub field: SignalField,
    pub combine: Combine,
    patterns: Vec<Regex>,
}

impl SignalRule {
    fn new(field: SignalField, combine: Combine, patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(&format!("(?i){p}")).expect("static regex must compile"))
            .collect();
        Self {
            field,
            combine,
            patterns,
        }
    }

    /// Applies every matching pattern to `record`. Returns `true` when any
    /// pattern matched with a usable value.
    fn apply(&self, line: &str, record: &mut SignalRecord) -> bool {
        let mut changed = false;
        for caps in self.patterns.iter().filter_map(|p| p.captures(line)) {
            match (self.combine, caps.get(1).and_then(|m| parse_count(m.as_str()))) {
                (Combine::Latch, _) => record.latch(self.field),
                (Combine::Max, Some(value)) => record.raise(self.field, value),
                (Combine::Sum, Some(value)) => record.add(self.field, value),
                // Overflowing numbers are dropped; the field keeps its value.
                (Combine::Max | Combine::Sum, None) => continue,
            }
            changed = true;
        }
        changed
    }
}

/// Where the records of a [`SignalExtraction`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Line-by-line parse under URL mentions.
    Parsed,
    /// No URL lines; placeholder records for domains mentioned anywhere.
    TextFallback,
    /// Nothing in the text; placeholder records for the analyzed URLs.
    UrlFallback,
    /// Nothing to report.
    Empty,
}

impl SignalSource {
    /// Returns `true` for the placeholder branches.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::TextFallback | Self::UrlFallback)
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parsed => write!(f, "parsed"),
            Self::TextFallback => write!(f, "text_fallback"),
            Self::UrlFallback => write!(f, "url_fallback"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

/// Signal records together with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalExtraction {
    pub signals: SignalMap,
    pub source: SignalSource,
}

const NUMBER: &str = r"([0-9]{1,3}(?:[ \u{00A0},][0-9]{3})+|[0-9]+)";

static RULES: LazyLock<Vec<SignalRule>> = LazyLock::new(|| {
    let n = NUMBER;
    vec![
        SignalRule::new(
            SignalField::TextSize,
            Combine::Max,
            &[
                format!(r"{n}\s*(?:symbols?|characters?|chars\b|симв\w*|знак\w*)"),
                format!(r"(?:length|длин\w*).*?{n}"),
                format!(r"(?:volume|объ[её]м\w*).*?{n}"),
            ],
        ),
        SignalRule::new(
            SignalField::Ctas,
            Combine::Sum,
            &[
                format!(
                    r"{n}\s*(?:ctas?\b|calls?[- ]to[- ]actions?|buttons?\b|призыв\w*|кнопк\w*)"
                ),
                format!(r"(?:призыв\w*|кнопк\w*|calls?[- ]to[- ]action\w*|buttons?\b).*?{n}"),
            ],
        ),
        SignalRule::new(
            SignalField::TrustSignals,
            Combine::Sum,
            &[
                format!(
                    r"{n}\s*(?:reviews?|testimonials?|case stud(?:y|ies)|cases?\b|certificates?|guarantees?|отзыв\w*|кейс\w*|сертификат\w*|гаранти\w*)"
                ),
                format!(r"(?:trust|довери\w*).*?{n}"),
            ],
        ),
        SignalRule::new(
            SignalField::HasCases,
            Combine::Latch,
            &literals(&["case", "success stor", "кейс", "пример", "история успеха"]),
        ),
        SignalRule::new(
            SignalField::HasReviews,
            Combine::Latch,
            &literals(&["review", "testimonial", "отзыв", "рекомендация", "мнение"]),
        ),
        SignalRule::new(
            SignalField::HasCertificates,
            Combine::Latch,
            &literals(&[
                "certificat",
                "license",
                "licence",
                "award",
                "сертификат",
                "лицензия",
                "награда",
            ]),
        ),
    ]
});

/// The extraction table, one rule per [`SignalField`] in record order.
pub fn signal_rules() -> &'static [SignalRule] {
    &RULES
}

struct UrlPatterns {
    url: Regex,
    bare_domain: Regex,
}

static URLS: LazyLock<UrlPatterns> = LazyLock::new(|| UrlPatterns {
    url: Regex::new(r#"(?i)\bhttps?://[^\s<>()\[\]{}"'`*|]+"#).expect("static regex must compile"),
    // Bare host mentions, limited to common TLDs to keep file names and
    // dotted identifiers out.
    bare_domain: Regex::new(
        r"(?i)\b(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:com|org|net|io|ai|app|dev|co|info|biz|shop|store|online|site|tech|ru|su|ua|by|kz|de|fr|uk|eu|us|ca|es|it|nl|pl|example|test)\b",
    )
    .expect("static regex must compile"),
});

fn literals(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| regex::escape(w)).collect()
}

fn parse_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Host of the first URL on `line`, if any.
fn first_url_domain(line: &str) -> Option<String> {
    URLS.url.find_iter(line).find_map(|m| url_token_domain(m.as_str()))
}

fn url_token_domain(token: &str) -> Option<String> {
    let token = token.trim_end_matches(['.', ',', ';', ':', '!', '?', '»', '…']);
    let url = Url::parse(token).ok()?;
    if url.host_str().is_none_or(str::is_empty) {
        return None;
    }
    Some(domain_of(token))
}

/// Parses a report into per-domain signal records.
///
/// Returns an empty map for empty input. When the line scan finds no URL at
/// all, the whole text is searched for domain mentions and each one gets a
/// placeholder record (see [`SignalRecord::placeholder`]) so charts still show
/// every competitor.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::parser::parse_signals;
///
/// let report = "\
/// https://a.example/landing
/// Page volume is about 1500 characters, 2 reviews on the home page.
/// https://b.example/
/// 3 CTA buttons above the fold.
/// ";
///
/// let signals = parse_signals(report);
/// assert_eq!(signals["a.example"].text_size, 1500);
/// assert_eq!(signals["a.example"].trust_signals, 2);
/// assert_eq!(signals["b.example"].ctas, 3);
/// ```
pub fn parse_signals(report_text: &str) -> SignalMap {
    parse_with_source(report_text).0
}

/// Like [`parse_signals`], with a last fallback to the analyzed URL list and
/// the provenance of the result.
///
/// The URL fallback fires only when the report mentions no domain at all; its
/// records use the same fixed placeholder values as the text fallback.
pub fn extract_signals<S: AsRef<str>>(report_text: &str, urls: &[S]) -> SignalExtraction {
    let (signals, source) = parse_with_source(report_text);
    if !signals.is_empty() {
        return SignalExtraction { signals, source };
    }

    let domains = unique_domains(urls);
    if domains.is_empty() {
        return SignalExtraction {
            signals,
            source: SignalSource::Empty,
        };
    }

    let record = placeholder_for(report_text);
    debug!(domains = domains.len(), "Using analyzed URLs for placeholder signals");
    SignalExtraction {
        signals: domains.into_iter().map(|d| (d, record)).collect(),
        source: SignalSource::UrlFallback,
    }
}

fn parse_with_source(report_text: &str) -> (SignalMap, SignalSource) {
    let mut signals = SignalMap::new();
    if report_text.trim().is_empty() {
        return (signals, SignalSource::Empty);
    }

    let mut current: Option<String> = None;
    let mut matched_lines = 0usize;

    for line in report_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(domain) = first_url_domain(line) {
            signals.entry(domain.clone()).or_default();
            current = Some(domain);
        }

        let Some(domain) = current.as_deref() else {
            continue;
        };
        let Some(record) = signals.get_mut(domain) else {
            continue;
        };

        let mut changed = false;
        for rule in RULES.iter() {
            changed |= rule.apply(line, record);
        }
        if changed {
            matched_lines += 1;
        }
    }

    if !signals.is_empty() {
        debug!(
            domains = signals.len(),
            matched_lines, "Parsed signals from report lines"
        );
        return (signals, SignalSource::Parsed);
    }

    let mentioned = mentioned_domains(report_text);
    if mentioned.is_empty() {
        return (signals, SignalSource::Empty);
    }

    let record = placeholder_for(report_text);
    debug!(
        domains = mentioned.len(),
        "No URL lines found, using placeholder signals for mentioned domains"
    );
    let signals = mentioned.into_iter().map(|d| (d, record)).collect();
    (signals, SignalSource::TextFallback)
}

/// URL hosts and bare domain mentions, deduplicated in first-seen order.
fn mentioned_domains(text: &str) -> Vec<String> {
    let mut found: Vec<(usize, String)> = URLS
        .url
        .find_iter(text)
        .filter_map(|m| url_token_domain(m.as_str()).map(|d| (m.start(), d)))
        .collect();
    found.extend(
        URLS.bare_domain
            .find_iter(text)
            .map(|m| (m.start(), m.as_str().to_lowercase())),
    );
    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter_map(|(_, domain)| seen.insert(domain.clone()).then_some(domain))
        .collect()
}

fn placeholder_for(report_text: &str) -> SignalRecord {
    let lower = report_text.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));
    SignalRecord::placeholder(
        any(&["case", "кейс"]),
        any(&["review", "отзыв"]),
        any(&["certificate", "сертификат"]),
    )
}
