//! Repeated-block removal.
//!
//! LLM output tends to repeat whole paragraphs when a task restates the
//! previous task's answer. A block is a run of consecutive non-blank lines;
//! its lines are trimmed and joined with single spaces before comparison.

use std::collections::HashSet;

/// Drops exact repeats of earlier blocks, keeping first-seen order.
///
/// The result joins blocks with a blank line, so `dedupe(dedupe(x))` equals
/// `dedupe(x)`.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::parser::dedupe;
///
/// let text = "Alpha line\n  continues\n\nBeta\n\nAlpha line continues\n";
/// assert_eq!(dedupe(text), "Alpha line continues\n\nBeta");
/// ```
pub fn dedupe(text: &str) -> String {
    let mut seen = HashSet::new();
    let mut kept: Vec<String> = Vec::new();

    for block in blocks(text) {
        if seen.insert(block.clone()) {
            kept.push(block);
        }
    }

    kept.join("\n\n")
}

fn blocks(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                out.push(current.join(" "));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        out.push(current.join(" "));
    }
    out
}
