//! Markdown cleanup for report text.
//!
//! Crew output is markdown-ish: headings, bold runs, bullet stars, the odd
//! code fence. The PDF and the API-style summary want plain text, so markup is
//! stripped here while line structure and indentation are kept for the
//! section splitter and the table builder.

use regex::Regex;
use std::sync::LazyLock;

use super::util::ellipsize;

struct MarkdownPatterns {
    rule: Regex,
    fence: Regex,
    heading: Regex,
    quote: Regex,
    bullet: Regex,
    link: Regex,
    code: Regex,
    strong_star: Regex,
    strong_under: Regex,
    em_star: Regex,
    em_under: Regex,
    blank_run: Regex,
}

static MARKDOWN: LazyLock<MarkdownPatterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("static regex must compile");
    MarkdownPatterns {
        rule: re(r"^\s*(?:(?:-\s*){3,}|(?:\*\s*){3,}|(?:_\s*){3,})$"),
        fence: re(r"^\s*(?:```|~~~)"),
        heading: re(r"^\s{0,3}#{1,6}\s*"),
        quote: re(r"^\s*(?:>\s?)+"),
        bullet: re(r"^(\s*)[*+•]\s+"),
        link: re(r"!?\[([^\]\n]+)\]\(([^)\s]+)\)"),
        code: re(r"`([^`\n]*)`"),
        strong_star: re(r"\*\*([^*\n]+?)\*\*"),
        strong_under: re(r"__([^_\n]+?)__"),
        em_star: re(r"\*([^*\s][^*\n]*?)\*"),
        em_under: re(r"(^|[\s(])_([^_\n]+)_([\s).,;:!?]|$)"),
        blank_run: re(r"\n{3,}"),
    }
});

/// Strips markdown markup, leaving plain text.
///
/// Headings, emphasis, inline code, blockquotes, horizontal rules and code
/// fences are removed; `[label](url)` becomes `label (url)`; `*`, `+` and `•`
/// bullets become `- `. Runs of blank lines collapse to a single blank line.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::parser::clean_markdown;
///
/// let text = "## Summary\n\n* **Fast** checkout, see [pricing](https://a.example/p)";
/// assert_eq!(
///     clean_markdown(text),
///     "Summary\n\n- Fast checkout, see pricing (https://a.example/p)"
/// );
/// ```
pub fn clean_markdown(text: &str) -> String {
    let md = &*MARKDOWN;
    let replaced = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for line in replaced.lines() {
        let line = line.trim_end();
        if md.rule.is_match(line) || md.fence.is_match(line) {
            lines.push(String::new());
            continue;
        }

        let line = md.heading.replace(line, "");
        let line = md.quote.replace(&line, "");
        let line = md.bullet.replace(&line, "${1}- ");
        let line = md.link.replace_all(&line, "${1} (${2})");
        let line = md.code.replace_all(&line, "${1}");
        let line = md.strong_star.replace_all(&line, "${1}");
        let line = md.strong_under.replace_all(&line, "${1}");
        let line = md.em_star.replace_all(&line, "${1}");
        let line = md.em_under.replace_all(&line, "${1}${2}${3}");

        lines.push(line.trim_end().to_string());
    }

    let joined = lines.join("\n");
    md.blank_run.replace_all(&joined, "\n\n").trim().to_string()
}

/// Cleaned text cut to `max_chars` characters, with `...` when cut.
pub fn summary_preview(text: &str, max_chars: usize) -> String {
    ellipsize(&clean_markdown(text), max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_emphasis_stripped() {
        let text = "# Title\n### Sub\n**bold** and __also__ and *it* and _em_.";
        assert_eq!(clean_markdown(text), "Title\nSub\nbold and also and it and em.");
    }

    #[test]
    fn test_snake_case_words_survive() {
        assert_eq!(clean_markdown("field has_reviews is set"), "field has_reviews is set");
    }

    #[test]
    fn test_bullets_normalized_and_indentation_kept() {
        let text = "* first\n  + nested\n- already dash\n• dot";
        assert_eq!(
            clean_markdown(text),
            "- first\n  - nested\n- already dash\n- dot"
        );
    }

    #[test]
    fn test_rules_fences_and_quotes_removed() {
        let text = "> quoted line\n---\n```text\ncode body\n```\n***";
        assert_eq!(clean_markdown(text), "quoted line\n\ncode body");
    }

    #[test]
    fn test_blank_runs_collapse() {
        assert_eq!(clean_markdown("a\n\n\n\n\nb\r\n\r\nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_inline_code_unwrapped() {
        assert_eq!(clean_markdown("run `make report` now"), "run make report now");
    }

    #[test]
    fn test_urls_untouched() {
        let text = "Visit https://shop.example/a_b_c for details";
        assert_eq!(clean_markdown(text), text);
    }

    #[test]
    fn test_summary_preview_truncates_cleaned_text() {
        let text = format!("## Head\n{}", "x".repeat(20));
        assert_eq!(summary_preview(&text, 10), "Head\nxxxxx...");
        assert_eq!(summary_preview("**short**", 10), "short");
    }
}
