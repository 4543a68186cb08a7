//! Report text parsers.
//!
//! The crew writes a free-form narrative report. This module turns it into
//! structure without ever failing: every parser degrades to a best-effort
//! result instead of returning an error.
//!
//! - [`signals`]: per-domain counts and flags via a declarative rule table,
//!   with explicit fallback branches ([`SignalSource`]).
//! - [`sections`]: keyword-anchored titled sections for document layout.
//! - [`table`]: strengths / weaknesses / opportunities per domain.
//! - [`dedupe`](mod@dedupe) and [`normalize`]: cleanup passes applied before
//!   section splitting.
//!
//! All vocabularies cover English and Russian reports.

pub mod dedupe;
pub mod normalize;
pub mod sections;
pub mod signals;
pub mod table;
mod util;

pub use dedupe::dedupe;
pub use normalize::{clean_markdown, summary_preview};
pub use sections::{
    Anchor, CONCLUSION_TITLE, CONTINUATION_TITLE, MIN_SECTION_CHARS, anchors, make_sections,
    split_sections,
};
pub use signals::{
    Combine, SignalExtraction, SignalRule, SignalSource, extract_signals, parse_signals,
    signal_rules,
};
pub use table::build_comparison_table;

pub(crate) use util::{collapse_whitespace, ellipsize, truncate_chars};
