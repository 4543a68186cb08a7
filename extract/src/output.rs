//! Output formatting for signals, sections, tables and whole analyses.

use competitor_report_core::{ComparisonTable, CorpusEntry, Section, SignalMap};
use serde::Serialize;

use crate::parser::ellipsize;
use crate::report::ReportAnalysis;

/// Characters of a section body shown in table output.
const TABLE_BODY_PREVIEW: usize = 80;

/// Supported output formats.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}"))
}

/// Formats a signal map in the requested output format.
pub fn format_signals(signals: &SignalMap, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(signals),
        OutputFormat::Yaml => to_yaml(signals),
        OutputFormat::Markdown => Ok(signals_to_markdown(signals)),
        OutputFormat::Table => Ok(signals_to_table(signals)),
    }
}

/// Formats report sections in the requested output format.
pub fn format_sections(sections: &[Section], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(sections),
        OutputFormat::Yaml => to_yaml(sections),
        OutputFormat::Markdown => Ok(sections_to_markdown(sections)),
        OutputFormat::Table => Ok(sections_to_table(sections)),
    }
}

/// Formats a comparison table in the requested output format.
pub fn format_table(table: &ComparisonTable, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(table),
        OutputFormat::Yaml => to_yaml(table),
        OutputFormat::Markdown => Ok(comparison_to_markdown(table)),
        OutputFormat::Table => Ok(comparison_to_table(table)),
    }
}

/// Formats a full report analysis in the requested output format.
pub fn format_analysis(analysis: &ReportAnalysis, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(analysis),
        OutputFormat::Yaml => to_yaml(analysis),
        OutputFormat::Markdown => Ok(analysis_to_markdown(analysis)),
        OutputFormat::Table => Ok(analysis_to_table(analysis)),
    }
}

/// Formats a fetched corpus in the requested output format.
pub fn format_corpus(entries: &[CorpusEntry], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => to_json(entries),
        OutputFormat::Yaml => to_yaml(entries),
        OutputFormat::Markdown => Ok(corpus_to_markdown(entries)),
        OutputFormat::Table => Ok(corpus_to_table(entries)),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn signals_to_markdown(signals: &SignalMap) -> String {
    let mut out = String::new();
    out.push_str("| Domain | Text size | CTAs | Trust signals | Cases | Reviews | Certificates |\n");
    out.push_str("|--------|-----------|------|---------------|-------|---------|--------------|\n");
    for (domain, r) in signals {
        out.push_str(&format!(
            "| {domain} | {} | {} | {} | {} | {} | {} |\n",
            r.text_size,
            r.ctas,
            r.trust_signals,
            yes_no(r.has_cases),
            yes_no(r.has_reviews),
            yes_no(r.has_certificates),
        ));
    }
    out
}

fn signals_to_table(signals: &SignalMap) -> String {
    if signals.is_empty() {
        return "No domains found.\n".to_string();
    }
    let width = signals.keys().map(String::len).max().unwrap_or(6).max(6);

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>9}  {:>4}  {:>5}  cases reviews certs\n",
        "Domain", "text_size", "ctas", "trust"
    ));
    for (domain, r) in signals {
        out.push_str(&format!(
            "{domain:<width$}  {:>9}  {:>4}  {:>5}  {:<5} {:<7} {}\n",
            r.text_size,
            r.ctas,
            r.trust_signals,
            yes_no(r.has_cases),
            yes_no(r.has_reviews),
            yes_no(r.has_certificates),
        ));
    }
    out
}

fn sections_to_markdown(sections: &[Section]) -> String {
    let mut out = String::new();
    for section in sections {
        out.push_str(&format!("## {}\n\n{}\n\n", section.title, section.body));
    }
    out
}

fn sections_to_table(sections: &[Section]) -> String {
    let width = sections.iter().map(|s| s.title.len()).max().unwrap_or(5);
    let mut out = String::new();
    for section in sections {
        let preview = ellipsize(&section.body.replace('\n', " "), TABLE_BODY_PREVIEW);
        out.push_str(&format!(
            "{:<width$}  {:>6} chars  {preview}\n",
            section.title,
            section.body.chars().count(),
        ));
    }
    out
}

fn comparison_to_markdown(table: &ComparisonTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("| {} |\n", table.header.join(" | ")));
    out.push_str("|--------|-----------|------------|---------------|\n");
    for row in &table.rows {
        let cells = row.cells().map(|cell| cell.replace('|', "/"));
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn comparison_to_table(table: &ComparisonTable) -> String {
    let mut out = String::new();
    for row in &table.rows {
        out.push_str(&format!("{}\n", row.domain));
        for (label, cell) in table.header[1..].iter().zip(&row.cells()[1..]) {
            out.push_str(&format!("  {label:<13} {cell}\n"));
        }
    }
    out
}

fn analysis_to_markdown(analysis: &ReportAnalysis) -> String {
    let mut out = String::new();

    out.push_str("# Report Analysis\n\n");
    out.push_str(&format!("- **Signal source:** {}\n", analysis.source));
    out.push_str(&format!("- **Domains:** {}\n", analysis.signals.len()));
    out.push_str(&format!("- **Sections:** {}\n", analysis.sections.len()));
    out.push_str(&format!(
        "- **Comparison table:** {}\n",
        yes_no(analysis.table.is_some())
    ));

    if !analysis.signals.is_empty() {
        out.push_str("\n## Signals\n\n");
        out.push_str(&signals_to_markdown(&analysis.signals));
    }

    if let Some(ref table) = analysis.table {
        out.push_str("\n## Comparison\n\n");
        out.push_str(&comparison_to_markdown(table));
    }

    out.push_str("\n## Sections\n\n");
    for section in &analysis.sections {
        out.push_str(&format!(
            "- {} ({} chars)\n",
            section.title,
            section.body.chars().count()
        ));
    }

    if !analysis.warnings.is_empty() {
        out.push_str("\n## Warnings\n\n");
        for w in &analysis.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }

    out
}

fn analysis_to_table(analysis: &ReportAnalysis) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "source={} domains={} sections={} table={}\n",
        analysis.source,
        analysis.signals.len(),
        analysis.sections.len(),
        yes_no(analysis.table.is_some()),
    ));
    if !analysis.signals.is_empty() {
        out.push('\n');
        out.push_str(&signals_to_table(&analysis.signals));
    }
    for w in &analysis.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }
    out
}

fn corpus_to_markdown(entries: &[CorpusEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("## {}\n\n", entry.domain));
        out.push_str(&format!("- **URL:** {}\n", entry.url));
        out.push_str(&format!("- **Note:** {}\n\n", entry.note));
        if !entry.excerpt.is_empty() {
            out.push_str(&format!("{}\n\n", entry.excerpt));
        }
    }
    out
}

fn corpus_to_table(entries: &[CorpusEntry]) -> String {
    let width = entries.iter().map(|e| e.domain.len()).max().unwrap_or(6);
    let mut out = String::new();
    for entry in entries {
        let status = if entry.is_ok() { "OK" } else { "FAIL" };
        out.push_str(&format!(
            "{:<width$}  {status:<4}  {:>5} chars  {}\n",
            entry.domain,
            entry.excerpt.chars().count(),
            entry.url,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SignalSource;
    use competitor_report_core::{ComparisonRow, NO_DATA_PLACEHOLDER, SignalRecord};

    fn sample_signals() -> SignalMap {
        let mut signals = SignalMap::new();
        let mut record = SignalRecord::default();
        record.text_size = 4200;
        record.ctas = 3;
        record.has_reviews = true;
        signals.insert("shop.example".to_string(), record);
        signals.insert("rival.example".to_string(), SignalRecord::default());
        signals
    }

    fn sample_table() -> ComparisonTable {
        ComparisonTable::new(vec![ComparisonRow {
            domain: "shop.example".to_string(),
            strengths: "Fast | cheap delivery".to_string(),
            weaknesses: NO_DATA_PLACEHOLDER.to_string(),
            opportunities: "Unique bundles".to_string(),
        }])
    }

    fn sample_analysis() -> ReportAnalysis {
        ReportAnalysis {
            signals: sample_signals(),
            source: SignalSource::Parsed,
            sections: vec![Section::new("Summary", "Two shops compete on price.")],
            table: Some(sample_table()),
            summary: "Two shops compete on price.".to_string(),
            warnings: vec!["something odd".to_string()],
        }
    }

    #[test]
    fn test_format_signals_json_keeps_order() {
        let json = format_signals(&sample_signals(), OutputFormat::Json).unwrap();
        let shop = json.find("shop.example").unwrap();
        let rival = json.find("rival.example").unwrap();
        assert!(shop < rival);
        assert!(json.contains("\"text_size\": 4200"));
    }

    #[test]
    fn test_format_signals_yaml() {
        let yaml = format_signals(&sample_signals(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("shop.example:"));
        assert!(yaml.contains("has_reviews: true"));
    }

    #[test]
    fn test_format_signals_markdown_and_table() {
        let md = format_signals(&sample_signals(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("| shop.example | 4200 | 3 | 0 | no | yes | no |"));

        let table = format_signals(&sample_signals(), OutputFormat::Table).unwrap();
        assert_eq!(table.lines().count(), 3);
        assert!(table.lines().nth(1).unwrap().starts_with("shop.example"));
    }

    #[test]
    fn test_format_empty_signals_table() {
        let table = format_signals(&SignalMap::new(), OutputFormat::Table).unwrap();
        assert_eq!(table, "No domains found.\n");
    }

    #[test]
    fn test_format_sections_markdown() {
        let sections = vec![
            Section::new("Summary", "First body"),
            Section::new("Conclusion", "Last body"),
        ];
        let md = format_sections(&sections, OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("## Summary\n\nFirst body"));
        assert!(md.contains("## Conclusion"));
    }

    #[test]
    fn test_format_sections_table_previews_body() {
        let sections = vec![Section::new("Report", "x".repeat(200))];
        let table = format_sections(&sections, OutputFormat::Table).unwrap();
        assert!(table.contains("200 chars"));
        assert!(table.trim_end().ends_with("..."));
    }

    #[test]
    fn test_format_table_markdown_escapes_pipes() {
        let md = format_table(&sample_table(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("| Domain | Strengths | Weaknesses | Opportunities |"));
        assert!(md.contains("Fast / cheap delivery"));
        assert!(md.contains(NO_DATA_PLACEHOLDER));
    }

    #[test]
    fn test_format_table_plain() {
        let text = format_table(&sample_table(), OutputFormat::Table).unwrap();
        assert!(text.starts_with("shop.example\n"));
        assert!(text.contains("  Opportunities Unique bundles"));
    }

    #[test]
    fn test_format_analysis_markdown() {
        let md = format_analysis(&sample_analysis(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("**Signal source:** parsed"));
        assert!(md.contains("## Comparison"));
        assert!(md.contains("- Summary (27 chars)"));
        assert!(md.contains("- something odd"));
    }

    #[test]
    fn test_format_analysis_table_and_json() {
        let table = format_analysis(&sample_analysis(), OutputFormat::Table).unwrap();
        assert!(table.starts_with("source=parsed domains=2 sections=1 table=yes"));
        assert!(table.contains("warning: something odd"));

        let json = format_analysis(&sample_analysis(), OutputFormat::Json).unwrap();
        assert!(json.contains("\"source\": \"parsed\""));
    }

    #[test]
    fn test_format_corpus_table() {
        let entries = vec![CorpusEntry {
            url: "https://shop.example/".to_string(),
            domain: "shop.example".to_string(),
            excerpt: String::new(),
            note: "__ERROR_FETCH__ https://shop.example/: timed out".to_string(),
        }];
        let table = format_corpus(&entries, OutputFormat::Table).unwrap();
        assert!(table.contains("FAIL"));
        let md = format_corpus(&entries, OutputFormat::Markdown).unwrap();
        assert!(md.contains("- **Note:** __ERROR_FETCH__"));
    }
}
