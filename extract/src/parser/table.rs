//! Strengths / weaknesses / opportunities table per competitor domain.

use std::ops::Range;

use competitor_report_core::{ComparisonRow, ComparisonTable, NO_DATA_PLACEHOLDER, unique_domains};
use regex::{Regex, RegexBuilder};
use tracing::debug;

use super::util::{collapse_whitespace, ellipsize, is_indented};

/// Sentences kept per cell.
const MAX_SENTENCES: usize = 2;
/// Characters kept per sentence before `...` is appended.
const MAX_SENTENCE_CHARS: usize = 100;

const STRENGTH_KEYWORDS: &[&str] = &[
    "strength",
    "advantage",
    "pros",
    "good",
    "effective",
    "сильн",
    "преимуществ",
    "плюс",
    "хорош",
    "эффективн",
];

const WEAKNESS_KEYWORDS: &[&str] = &[
    "weakness",
    "disadvantage",
    "cons",
    "problem",
    "bad",
    "слаб",
    "недостат",
    "минус",
    "проблем",
    "плох",
];

const OPPORTUNITY_KEYWORDS: &[&str] = &[
    "opportunit",
    "borrow",
    "outmaneuver",
    "differentiate",
    "unique",
    "возможност",
    "заимствов",
    "обойти",
    "отлич",
    "уникальн",
];

/// Separators left at a sentence start once a domain is cut out of it.
const LEADING_NOISE: &[char] = &[' ', '\t', ':', ',', ';', '-', '\u{2013}', '\u{2014}'];

/// Builds the comparison table for `domains` from the report text.
///
/// Returns `None` when fewer than two distinct domains are given. Each row is
/// built from the lines that mention its domain plus their indented
/// continuation lines; a category without a matching sentence shows
/// [`NO_DATA_PLACEHOLDER`].
///
/// A mention must sit on hostname boundaries, so `shop.example` does not
/// match inside `myshop.example`. Mentions of every table domain (with any
/// URL scheme and path around them) are removed before the text is split into
/// sentences on `.`.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::parser::build_comparison_table;
///
/// let text = "Notes on alpha.example.\n  Slow support is a problem.\nNotes on beta.example.\n  Unique pricing.";
/// let table = build_comparison_table(text, &["https://alpha.example", "beta.example"]).unwrap();
/// assert_eq!(table.rows[0].weaknesses, "Slow support is a problem");
/// assert_eq!(table.rows[1].strengths, "no data found");
/// assert_eq!(table.rows[1].opportunities, "Unique pricing");
/// ```
pub fn build_comparison_table<S: AsRef<str>>(
    report_text: &str,
    domains: &[S],
) -> Option<ComparisonTable> {
    let domains = unique_domains(domains);
    if domains.len() < 2 {
        debug!(domains = domains.len(), "Too few domains for a comparison table");
        return None;
    }

    let lines: Vec<&str> = report_text.lines().collect();
    let patterns: Vec<Option<Regex>> = domains.iter().map(|d| mention_pattern(d)).collect();
    let rows = domains
        .into_iter()
        .zip(&patterns)
        .map(|(domain, pattern)| {
            let mention = match pattern {
                Some(pattern) => strip_mentions(&mention_text(&lines, pattern), &patterns),
                None => String::new(),
            };
            let sentences: Vec<String> = mention
                .split('.')
                .map(|s| collapse_whitespace(s).trim_start_matches(LEADING_NOISE).to_string())
                .filter(|s| !s.is_empty())
                .collect();
            ComparisonRow {
                strengths: category_cell(&sentences, STRENGTH_KEYWORDS),
                weaknesses: category_cell(&sentences, WEAKNESS_KEYWORDS),
                opportunities: category_cell(&sentences, OPPORTUNITY_KEYWORDS),
                domain,
            }
        })
        .collect();

    Some(ComparisonTable::new(rows))
}

fn mention_pattern(domain: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(domain))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => Some(pattern),
        Err(err) => {
            debug!(domain, error = %err, "Domain cannot be matched in report text");
            None
        }
    }
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.'
}

/// Byte ranges of `pattern` matches in `line` that are whole hostnames. A
/// trailing `.` counts as a boundary only when no label follows it.
fn host_matches(line: &str, pattern: &Regex) -> Vec<Range<usize>> {
    pattern
        .find_iter(line)
        .filter(|m| {
            let before_ok = line[..m.start()]
                .chars()
                .next_back()
                .is_none_or(|c| !is_host_char(c));
            let mut after = line[m.end()..].chars();
            let after_ok = match after.next() {
                None => true,
                Some('.') => after.next().is_none_or(|c| !c.is_ascii_alphanumeric()),
                Some(c) => !is_host_char(c),
            };
            before_ok && after_ok
        })
        .map(|m| m.range())
        .collect()
}

/// Widens a hostname match over a preceding URL scheme and a following path.
fn widen_to_url(text: &str, range: Range<usize>) -> Range<usize> {
    let mut start = range.start;
    for scheme in ["https://", "http://"] {
        let Some(from) = start.checked_sub(scheme.len()) else {
            continue;
        };
        if text.is_char_boundary(from) && text[from..start].eq_ignore_ascii_case(scheme) {
            start = from;
            break;
        }
    }

    let mut end = range.end;
    if text[end..].starts_with('/') {
        let path = text[end..]
            .split(char::is_whitespace)
            .next()
            .unwrap_or_default()
            .trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
        end += path.len();
    }
    start..end
}

/// Removes every hostname mention of the given domains from `text`.
fn strip_mentions(text: &str, patterns: &[Option<Regex>]) -> String {
    let mut cuts: Vec<Range<usize>> = patterns
        .iter()
        .flatten()
        .flat_map(|pattern| host_matches(text, pattern))
        .map(|range| widen_to_url(text, range))
        .collect();
    cuts.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for cut in cuts {
        if cut.start >= pos {
            out.push_str(&text[pos..cut.start]);
            out.push(' ');
        }
        pos = pos.max(cut.end);
    }
    out.push_str(&text[pos..]);
    out
}

/// Joins every run that starts at a line mentioning the domain and continues
/// through the indented lines below it.
fn mention_text(lines: &[&str], pattern: &Regex) -> String {
    let mut runs: Vec<String> = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if host_matches(lines[i], pattern).is_empty() {
            i += 1;
            continue;
        }
        let mut run = vec![lines[i].trim()];
        i += 1;
        while i < lines.len() && is_indented(lines[i]) && !lines[i].trim().is_empty() {
            run.push(lines[i].trim());
            i += 1;
        }
        runs.push(run.join(" "));
    }

    runs.join(" ")
}

fn category_cell(sentences: &[String], keywords: &[&str]) -> String {
    let kept: Vec<String> = sentences
        .iter()
        .filter(|sentence| {
            let lower = sentence.to_lowercase();
            keywords.iter().any(|k| lower.contains(k))
        })
        .take(MAX_SENTENCES)
        .map(|sentence| ellipsize(sentence, MAX_SENTENCE_CHARS))
        .collect();

    if kept.is_empty() {
        NO_DATA_PLACEHOLDER.to_string()
    } else {
        kept.join("; ")
    }
}
