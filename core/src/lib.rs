//! Core types and shared primitives for competitor report generation.
//!
//! This crate defines the data model that flows between the fetch, parse,
//! chart and PDF stages:
//!
//! - [`SignalRecord`] - per-domain counts and flags pulled out of a free-text
//!   report, collected into an insertion-ordered [`SignalMap`].
//! - [`Section`] - a titled slice of the report used for document layout.
//! - [`ComparisonTable`] - the strengths / weaknesses / opportunities grid.
//! - [`CorpusEntry`] - one fetched competitor page, or its fetch error.
//!
//! Domains are derived with [`domain_of`], input URLs are checked with
//! [`validate_urls`], and runtime settings live in [`ReportConfig`].
//!
//! # Example
//!
//! ```
//! use competitor_report_core::*;
//!
//! let mut signals = SignalMap::new();
//! let record = signals.entry(domain_of("https://shop.example/pricing")).or_default();
//! record.raise(SignalField::TextSize, 1500);
//! record.add(SignalField::Ctas, 2);
//! record.latch(SignalField::HasReviews);
//!
//! assert_eq!(signals["shop.example"].text_size, 1500);
//! assert!(signals["shop.example"].has_reviews);
//! assert!(validate_urls(&["https://shop.example/".to_string()]).is_empty());
//! ```

mod config;
mod domain;
mod types;
mod validate;

pub use config::{ConfigError, FetchSettings, LlmSettings, OutputSettings, ReportConfig};
pub use domain::{domain_of, unique_domains};
pub use types::*;
pub use validate::{UrlError, validate_urls};
