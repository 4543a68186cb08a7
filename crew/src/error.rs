//! Error types for the crew and its LLM client.

use thiserror::Error;

/// Result type for crew operations.
pub type Result<T> = std::result::Result<T, CrewError>;

/// Crew and LLM client errors.
#[derive(Debug, Error)]
pub enum CrewError {
    /// Missing API key, empty crew, unusable settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection failure or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response or an empty completion.
    #[error("API error: {0}")]
    Api(String),

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A task failed; carries the position and agent role of the task.
    #[error("task {index} ({role}) failed: {source}")]
    Task {
        index: usize,
        role: String,
        #[source]
        source: Box<CrewError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_error_wraps_cause() {
        let err = CrewError::Task {
            index: 2,
            role: "Competitor Analyst".to_string(),
            source: Box::new(CrewError::Network("connection refused".to_string())),
        };
        assert_eq!(
            err.to_string(),
            "task 2 (Competitor Analyst) failed: Network error: connection refused"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
