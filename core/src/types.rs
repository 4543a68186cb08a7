//! Data model shared by the extraction, chart and PDF stages.
//!
//! Everything here is transient: values are built fresh for one report and
//! dropped afterwards. The types serialize with [`serde`] so the CLI can emit
//! them as JSON or YAML.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of the sentinel string produced when a page could not be fetched.
pub const FETCH_ERROR_SENTINEL: &str = "__ERROR_FETCH__";

/// Cell text used when no sentence of a comparison category was found.
pub const NO_DATA_PLACEHOLDER: &str = "no data found";

/// Title for text that falls outside every section anchor.
pub const DEFAULT_SECTION_TITLE: &str = "Report";

/// Placeholder `text_size` for domains synthesized by the fallback branch.
pub const PLACEHOLDER_TEXT_SIZE: u64 = 10_000;
/// Placeholder `ctas` for domains synthesized by the fallback branch.
pub const PLACEHOLDER_CTAS: u64 = 3;
/// Placeholder `trust_signals` for domains synthesized by the fallback branch.
pub const PLACEHOLDER_TRUST_SIGNALS: u64 = 2;

/// One field of a [`SignalRecord`].
///
/// The three counters are charted; the three flags only ever latch to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalField {
    TextSize,
    Ctas,
    TrustSignals,
    HasCases,
    HasReviews,
    HasCertificates,
}

impl SignalField {
    /// All fields in record order.
    pub const ALL: [SignalField; 6] = [
        SignalField::TextSize,
        SignalField::Ctas,
        SignalField::TrustSignals,
        SignalField::HasCases,
        SignalField::HasReviews,
        SignalField::HasCertificates,
    ];

    /// Returns `true` for the boolean fields.
    pub fn is_flag(self) -> bool {
        matches!(
            self,
            Self::HasCases | Self::HasReviews | Self::HasCertificates
        )
    }

    /// Serialized field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextSize => "text_size",
            Self::Ctas => "ctas",
            Self::TrustSignals => "trust_signals",
            Self::HasCases => "has_cases",
            Self::HasReviews => "has_reviews",
            Self::HasCertificates => "has_certificates",
        }
    }
}

impl std::fmt::Display for SignalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured signals extracted for one competitor domain.
///
/// A record starts at all-zero / `false`. Within one parse pass the counters
/// only move upward and the flags only latch to `true`; the mutators below are
/// the only way the parser touches a record, so that invariant holds by
/// construction.
///
/// # Examples
///
/// ```
/// use competitor_report_core::{SignalField, SignalRecord};
///
/// let mut record = SignalRecord::default();
/// record.raise(SignalField::TextSize, 900);
/// record.raise(SignalField::TextSize, 400);
/// record.add(SignalField::TrustSignals, 2);
/// record.add(SignalField::TrustSignals, 1);
/// record.latch(SignalField::HasCases);
///
/// assert_eq!(record.text_size, 900);
/// assert_eq!(record.trust_signals, 3);
/// assert!(record.has_cases);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalRecord {
    /// Largest character-count mention seen for the domain.
    pub text_size: u64,
    /// Sum of call-to-action counts.
    pub ctas: u64,
    /// Sum of trust-signal counts (reviews, cases, certificates, guarantees).
    pub trust_signals: u64,
    pub has_cases: bool,
    pub has_reviews: bool,
    pub has_certificates: bool,
}

impl SignalRecord {
    /// Placeholder record used when the report yields nothing parseable.
    pub fn placeholder(has_cases: bool, has_reviews: bool, has_certificates: bool) -> Self {
        Self {
            text_size: PLACEHOLDER_TEXT_SIZE,
            ctas: PLACEHOLDER_CTAS,
            trust_signals: PLACEHOLDER_TRUST_SIGNALS,
            has_cases,
            has_reviews,
            has_certificates,
        }
    }

    /// Raises a counter to `value` when it is larger (running maximum).
    /// Flag fields are left untouched.
    pub fn raise(&mut self, field: SignalField, value: u64) {
        if let Some(slot) = self.counter_mut(field) {
            *slot = (*slot).max(value);
        }
    }

    /// Adds `value` to a counter, saturating at `u64::MAX`.
    /// Flag fields are left untouched.
    pub fn add(&mut self, field: SignalField, value: u64) {
        if let Some(slot) = self.counter_mut(field) {
            *slot = slot.saturating_add(value);
        }
    }

    /// Sets a boolean field to `true`. Counter fields are left untouched.
    pub fn latch(&mut self, field: SignalField) {
        match field {
            SignalField::HasCases => self.has_cases = true,
            SignalField::HasReviews => self.has_reviews = true,
            SignalField::HasCertificates => self.has_certificates = true,
            SignalField::TextSize | SignalField::Ctas | SignalField::TrustSignals => {}
        }
    }

    /// Counter value for a numeric field, `None` for flags.
    pub fn count(&self, field: SignalField) -> Option<u64> {
        match field {
            SignalField::TextSize => Some(self.text_size),
            SignalField::Ctas => Some(self.ctas),
            SignalField::TrustSignals => Some(self.trust_signals),
            _ => None,
        }
    }

    /// Flag value for a boolean field, `None` for counters.
    pub fn flag(&self, field: SignalField) -> Option<bool> {
        match field {
            SignalField::HasCases => Some(self.has_cases),
            SignalField::HasReviews => Some(self.has_reviews),
            SignalField::HasCertificates => Some(self.has_certificates),
            _ => None,
        }
    }

    fn counter_mut(&mut self, field: SignalField) -> Option<&mut u64> {
        match field {
            SignalField::TextSize => Some(&mut self.text_size),
            SignalField::Ctas => Some(&mut self.ctas),
            SignalField::TrustSignals => Some(&mut self.trust_signals),
            _ => None,
        }
    }

    /// Returns `true` when nothing was recorded for the domain.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Domain -> record map, ordered by first mention in the report.
pub type SignalMap = IndexMap<String, SignalRecord>;

/// A titled slice of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// One domain row of a [`ComparisonTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub domain: String,
    pub strengths: String,
    pub weaknesses: String,
    pub opportunities: String,
}

impl ComparisonRow {
    pub fn cells(&self) -> [&str; 4] {
        [
            self.domain.as_str(),
            self.strengths.as_str(),
            self.weaknesses.as_str(),
            self.opportunities.as_str(),
        ]
    }
}

/// Strengths / weaknesses / opportunities grid, one row per domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonTable {
    pub header: [String; 4],
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Column labels of the header row.
    pub const HEADER: [&'static str; 4] = ["Domain", "Strengths", "Weaknesses", "Opportunities"];

    pub fn new(rows: Vec<ComparisonRow>) -> Self {
        Self {
            header: Self::HEADER.map(String::from),
            rows,
        }
    }

    /// Header row followed by one row per domain, four cells each.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.to_vec())
            .chain(
                self.rows
                    .iter()
                    .map(|row| row.cells().map(String::from).to_vec()),
            )
            .collect()
    }
}

/// One fetched competitor page, as handed to the crew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub url: String,
    pub domain: String,
    /// Leading slice of the normalized page text; empty when the fetch failed.
    pub excerpt: String,
    /// `OK`, or the fetch error sentinel.
    pub note: String,
}

impl CorpusEntry {
    pub const OK_NOTE: &'static str = "OK";

    pub fn is_ok(&self) -> bool {
        self.note == Self::OK_NOTE
    }
}

/// Returns `true` if `text` is a fetch error sentinel.
pub fn is_fetch_error(text: &str) -> bool {
    text.starts_with(FETCH_ERROR_SENTINEL)
}
