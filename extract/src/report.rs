//! Structured analysis of one report text.

use competitor_report_core::{ComparisonTable, Section, SignalMap};
use serde::{Deserialize, Serialize};

use crate::parser::SignalSource;

/// Characters of cleaned text kept in [`ReportAnalysis::summary`].
pub const SUMMARY_PREVIEW_CHARS: usize = 1000;

/// Everything the parsers pulled out of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub signals: SignalMap,
    /// Which branch produced `signals`.
    pub source: SignalSource,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<ComparisonTable>,
    /// Markdown-free preview of the report.
    pub summary: String,
    pub warnings: Vec<String>,
}

impl ReportAnalysis {
    /// Domains with a signal record, in report order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// Returns `true` when the signals came from the report itself rather
    /// than a fallback branch.
    pub fn has_parsed_signals(&self) -> bool {
        self.source == SignalSource::Parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use competitor_report_core::SignalRecord;

    fn sample() -> ReportAnalysis {
        let mut signals = SignalMap::new();
        signals.insert("b.example".to_string(), SignalRecord::default());
        signals.insert("a.example".to_string(), SignalRecord::placeholder(true, false, false));
        ReportAnalysis {
            signals,
            source: SignalSource::TextFallback,
            sections: vec![Section::new("Report", "body")],
            table: None,
            summary: "body".to_string(),
            warnings: vec!["no table".to_string()],
        }
    }

    #[test]
    fn test_domains_keep_report_order() {
        let analysis = sample();
        assert_eq!(analysis.domains().collect::<Vec<_>>(), ["b.example", "a.example"]);
        assert!(!analysis.has_parsed_signals());
    }

    #[test]
    fn test_serialization_omits_missing_table() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("table").is_none());
        assert_eq!(json["source"], "text_fallback");
        assert_eq!(json["signals"]["a.example"]["text_size"], 10_000);

        let keys: Vec<&String> = json["signals"].as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let analysis = sample();
        let yaml = serde_yaml::to_string(&analysis).unwrap();
        let back: ReportAnalysis = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, analysis);
        assert_eq!(back.domains().next(), Some("b.example"));
    }
}
