use std::fs;
use std::path::PathBuf;

use competitor_report_core::{NO_DATA_PLACEHOLDER, SignalRecord};
use competitor_report_extract::analyze_report_text;
use competitor_report_extract::parser::{
    SignalSource, build_comparison_table, dedupe, extract_signals, make_sections, parse_signals,
};

const EN_URLS: [&str; 3] = [
    "https://northwind.example/",
    "https://contoso.example/pricing",
    "https://fabrikam.example/",
];

#[test]
fn test_english_report_signals() {
    let report = fixture("report-en.txt");
    let signals = parse_signals(&report);

    assert_eq!(
        signals.keys().map(String::as_str).collect::<Vec<_>>(),
        ["northwind.example", "contoso.example", "fabrikam.example"]
    );

    let northwind = signals["northwind.example"];
    assert_eq!(northwind.text_size, 12_400);
    assert_eq!(northwind.ctas, 4);
    assert_eq!(northwind.trust_signals, 18);
    assert!(northwind.has_cases);
    assert!(northwind.has_reviews);
    assert!(northwind.has_certificates);

    assert_eq!(
        signals["contoso.example"],
        SignalRecord {
            text_size: 3200,
            ctas: 2,
            trust_signals: 1,
            has_cases: false,
            has_reviews: false,
            has_certificates: false,
        }
    );

    // Lines after the last URL keep accumulating under it.
    let fabrikam = signals["fabrikam.example"];
    assert_eq!(fabrikam.text_size, 0);
    assert_eq!(fabrikam.ctas, 0);
    assert!(fabrikam.has_reviews);
    assert!(!fabrikam.has_certificates);
}

#[test]
fn test_russian_report_signals() {
    let report = fixture("report-ru.txt");
    let signals = parse_signals(&report);
    assert_eq!(signals.len(), 2);

    let alfa = signals["alfa.example"];
    assert_eq!(alfa.text_size, 9800);
    assert_eq!(alfa.ctas, 5);
    assert_eq!(alfa.trust_signals, 12);
    assert!(alfa.has_cases && alfa.has_reviews && alfa.has_certificates);

    let beta = signals["beta.example"];
    assert_eq!(beta.text_size, 2500);
    assert_eq!(beta.ctas, 3);
    assert_eq!(beta.trust_signals, 4);
    assert!(beta.has_certificates);
}

#[test]
fn test_report_without_urls_uses_text_fallback() {
    let report = fixture("report-no-urls.txt");
    let extraction = extract_signals(&report, &EN_URLS);
    assert_eq!(extraction.source, SignalSource::TextFallback);
    assert_eq!(
        extraction.signals.keys().map(String::as_str).collect::<Vec<_>>(),
        ["northwind.example", "contoso.example"]
    );
    for record in extraction.signals.values() {
        assert_eq!(*record, SignalRecord::placeholder(true, true, false));
    }
}

#[test]
fn test_english_report_sections() {
    let report = fixture("report-en.txt");
    let sections = make_sections(&report);
    let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Summary", "Continuation", "Continuation", "Conclusion"]);
    assert!(sections.iter().all(|s| s.body.chars().count() >= 50));
    assert!(sections.iter().all(|s| !s.body.contains("##")));
    assert!(sections[0].body.starts_with("Summary"));
    assert!(sections[1].body.starts_with("strengths and weaknesses"));
    assert!(sections[2].body.starts_with("Recommendations"));
    assert!(sections[3].body.starts_with("Conclusion"));
    assert!(sections[3].body.ends_with("fabrikam is not a threat yet."));
}

#[test]
fn test_russian_report_sections() {
    let report = fixture("report-ru.txt");
    let titles: Vec<String> = make_sections(&report).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, ["Summary", "Continuation", "Continuation", "Conclusion"]);
}

#[test]
fn test_english_comparison_table() {
    let report = fixture("report-en.txt");
    let table = build_comparison_table(&report, &EN_URLS).expect("three domains");
    assert_eq!(table.rows.len(), 3);

    let northwind = &table.rows[0];
    assert!(northwind.strengths.contains("Strength: rich social proof"));
    assert!(northwind.strengths.contains("Another advantage"));
    assert_eq!(northwind.weaknesses, "Weakness: the pricing is hidden");
    assert_eq!(northwind.opportunities, NO_DATA_PLACEHOLDER);

    let contoso = &table.rows[1];
    assert_eq!(contoso.weaknesses, "The main problem is the lack of reviews");
    assert_eq!(
        contoso.opportunities,
        "An opportunity is to borrow their pricing table layout"
    );

    let fabrikam = &table.rows[2];
    assert_eq!(fabrikam.strengths, NO_DATA_PLACEHOLDER);
    assert!(fabrikam.weaknesses.contains("almost no content"));
}

#[test]
fn test_russian_comparison_table() {
    let report = fixture("report-ru.txt");
    let table = build_comparison_table(&report, &["https://alfa.example/", "https://beta.example/"])
        .expect("two domains");

    let alfa = &table.rows[0];
    assert_eq!(alfa.weaknesses, "Недостаток: нет цен");
    assert_eq!(alfa.opportunities, NO_DATA_PLACEHOLDER);
    assert_eq!(alfa.strengths.split("; ").count(), 2);

    let beta = &table.rows[1];
    assert_eq!(beta.weaknesses, "Минус: мало отзывов");
    assert_eq!(beta.opportunities, "Возможность: заимствовать их блок гарантий");
}

#[test]
fn test_dedupe_is_idempotent_on_fixtures() {
    for name in ["report-en.txt", "report-ru.txt", "report-no-urls.txt"] {
        let once = dedupe(&fixture(name));
        assert_eq!(dedupe(&once), once, "{name}");
    }
}

#[test]
fn test_full_analysis_of_english_fixture() {
    let analysis = analyze_report_text(&fixture("report-en.txt"), &EN_URLS);
    assert_eq!(analysis.source, SignalSource::Parsed);
    assert_eq!(analysis.signals.len(), 3);
    assert_eq!(analysis.sections.len(), 4);
    assert!(analysis.table.is_some());
    assert!(analysis.warnings.is_empty());
    assert!(analysis.summary.starts_with("Competitor Report\n\nSummary"));
}

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("fixture file must be readable")
}
