use thiserror::Error;

/// Result type for chart and PDF output.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Chart and PDF output errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}
