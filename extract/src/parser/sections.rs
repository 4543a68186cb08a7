//! Keyword-anchored section splitting.
//!
//! Anchors are tried strictly in list order and the cursor only moves
//! forward. An anchor whose keywords appear only before the cursor is skipped,
//! even if the text mentions it; list order wins over textual order.

use std::sync::LazyLock;

use competitor_report_core::{DEFAULT_SECTION_TITLE, Section};
use regex::Regex;
use tracing::debug;

use super::dedupe::dedupe;
use super::normalize::clean_markdown;

/// Sections whose trimmed body is shorter than this are dropped as noise.
pub const MIN_SECTION_CHARS: usize = 50;

/// A section title and the keywords that open it.
pub struct Anchor {
    pub title: &'static str,
    pub keywords: &'static [&'static str],
    pattern: Regex,
}

impl Anchor {
    fn new(title: &'static str, keywords: &'static [&'static str]) -> Self {
        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            title,
            keywords,
            pattern: Regex::new(&format!("(?i){alternation}")).expect("static regex must compile"),
        }
    }

    /// Byte offset of the earliest keyword occurrence at or after `cursor`.
    fn find_from(&self, text: &str, cursor: usize) -> Option<usize> {
        self.pattern.find_at(text, cursor).map(|m| m.start())
    }
}

static ANCHORS: LazyLock<Vec<Anchor>> = LazyLock::new(|| {
    vec![
        Anchor::new(
            "Summary",
            &[
                "summary",
                "overview",
                "corpus",
                "raw data",
                "обзор",
                "корпус",
                "сырые данные",
            ],
        ),
        Anchor::new(
            "Key Facts",
            &[
                "value proposition",
                "usp",
                "positioning",
                "segments",
                "services",
                "seo",
                "утп",
                "позиционирование",
                "сегменты",
                "услуги",
            ],
        ),
        Anchor::new(
            "Competitor Analysis",
            &[
                "strengths",
                "weaknesses",
                "differences",
                "trends",
                "сильные",
                "слабые",
                "отличия",
                "тренды",
            ],
        ),
        Anchor::new(
            "Recommendations",
            &[
                "recommendation",
                "action plan",
                "next steps",
                "рекомендации",
                "план",
                "шаги",
            ],
        ),
        Anchor::new(
            "Conclusion",
            &["conclusion", "in closing", "вывод", "итог"],
        ),
    ]
});

/// The fixed anchor list, in priority order.
pub fn anchors() -> &'static [Anchor] {
    &ANCHORS
}

/// Title for every kept span after the first one.
pub const CONTINUATION_TITLE: &str = "Continuation";

/// Title for the tail after the last found anchor.
pub const CONCLUSION_TITLE: &str = "Conclusion";

/// Splits report text into titled sections.
///
/// The span before each found anchor is cut off as a section. The first kept
/// span is titled after the anchor that opened it (`Report` for text before
/// any anchor); every later span is `Continuation`. Whatever follows the last
/// found anchor is `Conclusion`. Spans shorter than [`MIN_SECTION_CHARS`] are
/// dropped and do not count as kept. If no anchor is found, or nothing
/// survives, the whole trimmed text comes back as a single `Report` section.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::parser::split_sections;
///
/// let sections = split_sections("Nothing here matches any anchor keyword.");
/// assert_eq!(sections.len(), 1);
/// assert_eq!(sections[0].title, "Report");
/// ```
pub fn split_sections(report_text: &str) -> Vec<Section> {
    let whole = || vec![Section::new(DEFAULT_SECTION_TITLE, report_text.trim())];

    let mut sections: Vec<Section> = Vec::new();
    let mut spans = 0usize;
    let mut cursor = 0usize;
    let mut current: Option<&'static str> = None;

    for anchor in ANCHORS.iter() {
        let Some(idx) = anchor.find_from(report_text, cursor) else {
            continue;
        };
        if idx > cursor {
            let title = if sections.is_empty() {
                current.unwrap_or(DEFAULT_SECTION_TITLE)
            } else {
                CONTINUATION_TITLE
            };
            keep_span(&mut sections, title, &report_text[cursor..idx]);
            spans += 1;
        }
        cursor = idx;
        current = Some(anchor.title);
    }

    if current.is_none() {
        return whole();
    }
    keep_span(&mut sections, CONCLUSION_TITLE, &report_text[cursor..]);
    spans += 1;

    debug!(spans, kept = sections.len(), "Split report into sections");

    if sections.is_empty() {
        return whole();
    }
    sections
}

fn keep_span(sections: &mut Vec<Section>, title: &str, body: &str) {
    let body = body.trim();
    if body.chars().count() >= MIN_SECTION_CHARS {
        sections.push(Section::new(title, body));
    }
}

/// Cleans markdown, collapses repeated blocks, then splits into sections.
pub fn make_sections(report_text: &str) -> Vec<Section> {
    split_sections(&dedupe(&clean_markdown(report_text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLER: &str = "and this sentence pads the body well past the noise threshold";

    #[test]
    fn test_no_anchor_returns_single_report_section() {
        let text = "  Plain text that names none of the anchor keywords at all.  ";
        let sections = split_sections(text);
        assert_eq!(sections, vec![Section::new("Report", text.trim())]);
    }

    #[test]
    fn test_empty_text_returns_empty_report_section() {
        assert_eq!(split_sections(""), vec![Section::new("Report", "")]);
    }

    #[test]
    fn test_anchors_two_and_four_in_textual_order() {
        let text = format!(
            "Positioning: both rivals sell to small firms, {FILLER}.\n\
             Recommendations: ship a pricing page first, {FILLER}. Final words run to the end."
        );
        let sections = split_sections(&text);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Key Facts", "Conclusion"]);
        assert!(sections[0].body.starts_with("Positioning"));
        assert!(sections[1].body.starts_with("Recommendations"));
        assert!(sections[1].body.ends_with("Final words run to the end."));
    }

    #[test]
    fn test_preamble_is_titled_report() {
        let text = format!(
            "Prepared for the growth team, {FILLER}.\nOverview of the market, {FILLER}."
        );
        let sections = split_sections(&text);
        assert_eq!(sections[0].title, "Report");
        assert_eq!(sections[1].title, "Conclusion");
        assert!(sections[1].body.starts_with("Overview"));
    }

    #[test]
    fn test_later_spans_are_continuations_and_tail_is_conclusion() {
        let text = format!(
            "Prepared for the growth team, {FILLER}.\n\
             Overview of the market, {FILLER}.\n\
             Positioning of each rival, {FILLER}.\n\
             Strengths and gaps, {FILLER}."
        );
        let sections = split_sections(&text);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Report", "Continuation", "Continuation", "Conclusion"]);
        assert!(sections[1].body.starts_with("Overview"));
        assert!(sections[2].body.starts_with("Positioning"));
        assert!(sections[3].body.starts_with("Strengths"));
    }

    #[test]
    fn test_first_kept_span_takes_its_anchor_title() {
        let text = format!(
            "Summary: ok.\nPositioning of each rival, {FILLER}.\nStrengths and gaps, {FILLER}."
        );
        let titles: Vec<String> = split_sections(&text).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, ["Key Facts", "Conclusion"]);
    }

    #[test]
    fn test_list_order_wins_over_text_order() {
        // "Recommendations" precedes "Summary" in the text, but Summary is
        // tried first and moves the cursor past the recommendation keyword.
        let text = format!(
            "Recommendations come first here, {FILLER}.\nSummary arrives later, {FILLER}."
        );
        let sections = split_sections(&text);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Report", "Conclusion"]);
        assert!(sections[0].body.starts_with("Recommendations"));
    }

    #[test]
    fn test_short_sections_dropped() {
        let text = format!("Summary: ok.\nStrengths: the rival ships fast, {FILLER}.");
        let sections = split_sections(&text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Conclusion");
        assert!(sections[0].body.starts_with("Strengths"));
    }

    #[test]
    fn test_all_sections_too_short_falls_back_to_whole_text() {
        let text = "Summary: ok. Strengths: fast.";
        assert_eq!(split_sections(text), vec![Section::new("Report", text)]);
    }

    #[test]
    fn test_keywords_match_case_insensitively_in_russian() {
        let text = format!(
            "ОБЗОР рынка конкурентов, {FILLER}.\nРекомендации для нашего сайта, {FILLER}."
        );
        let titles: Vec<String> = split_sections(&text).into_iter().map(|s| s.title).collect();
        assert_eq!(titles, ["Summary", "Conclusion"]);
    }

    #[test]
    fn test_anchor_list_has_unique_titles() {
        let mut titles: Vec<&str> = anchors().iter().map(|a| a.title).collect();
        titles.dedup();
        assert_eq!(titles.len(), anchors().len());
        assert!(anchors().iter().all(|a| !a.keywords.is_empty()));
    }

    #[test]
    fn test_make_sections_removes_repeated_blocks() {
        let block = format!("## Summary\n\nThe market is crowded, {FILLER}.");
        let text = format!("{block}\n\n{block}");
        let sections = make_sections(&text);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].body.matches("crowded").count(), 1);
        assert!(!sections[0].body.contains('#'));
    }
}
