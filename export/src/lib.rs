//! Chart and PDF output for competitor reports.
//!
//! [`build_charts`] writes one SVG bar chart per signal counter.
//! [`save_pdf_report`] lays out a [`PdfReport`] (sections, table blocks and
//! the same charts drawn as vector bars) into an A4 PDF.

mod charts;
mod error;
mod pdf;
mod text;

pub use charts::{Bar, ChartSpec, build_charts};
pub use error::{ExportError, Result};
pub use pdf::{PAGE_HEIGHT, PAGE_WIDTH, PdfReport, TableBlock, default_output_path, save_pdf_report};
pub use text::{encode_win_ansi, wrap_text};
