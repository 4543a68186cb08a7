//! Competitor page fetching and report text extraction.
//!
//! Two halves live here:
//!
//! - [`fetch`] pulls competitor pages over HTTP and reduces them to visible
//!   text, producing the corpus handed to the crew.
//! - [`parser`] turns the crew's free-text report into structure: per-domain
//!   signal records, titled sections and a comparison table. It never fails;
//!   each parser falls back to a best-effort result.
//!
//! [`analyze_report_text`] runs every parser over one report and bundles the
//! results with warnings about any fallback that was taken.
//!
//! # Example
//!
//! ```
//! use competitor_report_extract::{analyze_report_text, parser::SignalSource};
//!
//! let report = "\
//! https://alpha.example/ landing page, about 5 000 characters, 2 CTA buttons.
//! https://beta.example/ shows 12 reviews and a certificate.
//! ";
//!
//! let analysis = analyze_report_text(report, &["https://alpha.example/", "https://beta.example/"]);
//! assert_eq!(analysis.source, SignalSource::Parsed);
//! assert_eq!(analysis.signals["alpha.example"].text_size, 5000);
//! assert_eq!(analysis.signals["beta.example"].trust_signals, 12);
//! assert!(analysis.signals["beta.example"].has_certificates);
//! assert!(analysis.table.is_some());
//! ```

pub mod fetch;
pub mod output;
pub mod parser;
pub mod report;

use competitor_report_core::{DEFAULT_SECTION_TITLE, unique_domains};
use parser::{
    SignalSource, build_comparison_table, clean_markdown, extract_signals, make_sections,
    summary_preview,
};
use report::{ReportAnalysis, SUMMARY_PREVIEW_CHARS};
use tracing::debug;

/// Runs every report parser over `report_text`.
///
/// `urls` are the analyzed competitor URLs. They feed the comparison table
/// and the last-resort signal fallback; when empty, the table uses the
/// domains found in the report instead.
pub fn analyze_report_text<S: AsRef<str>>(report_text: &str, urls: &[S]) -> ReportAnalysis {
    let extraction = extract_signals(report_text, urls);
    let sections = make_sections(report_text);

    let domains = if urls.is_empty() {
        extraction.signals.keys().cloned().collect()
    } else {
        unique_domains(urls)
    };
    let table = build_comparison_table(&clean_markdown(report_text), &domains);

    let mut warnings = Vec::new();
    match extraction.source {
        SignalSource::Parsed => {}
        SignalSource::TextFallback => warnings.push(
            "No URL lines in the report; placeholder signals for mentioned domains".to_string(),
        ),
        SignalSource::UrlFallback => warnings.push(
            "No domains in the report; placeholder signals for the analyzed URLs".to_string(),
        ),
        SignalSource::Empty => warnings.push("No domains found; signals are empty".to_string()),
    }
    if table.is_none() {
        warnings.push(format!(
            "Comparison table skipped: {} distinct domain(s), need at least 2",
            domains.len()
        ));
    }
    let collapsed = sections.len() == 1 && sections[0].title == DEFAULT_SECTION_TITLE;
    if collapsed && !report_text.trim().is_empty() {
        warnings.push("No section anchors matched; report kept as a single section".to_string());
    }

    debug!(
        source = %extraction.source,
        domains = extraction.signals.len(),
        sections = sections.len(),
        table = table.is_some(),
        "Analyzed report text"
    );

    ReportAnalysis {
        signals: extraction.signals,
        source: extraction.source,
        sections,
        table,
        summary: summary_preview(report_text, SUMMARY_PREVIEW_CHARS),
        warnings,
    }
}
