//! Runtime configuration for report generation.
//!
//! Every section is optional in the YAML file; missing keys fall back to the
//! defaults below. Environment variables override the LLM settings, and the
//! CLI overrides both.
//!
//! # Example YAML
//!
//! ```yaml
//! fetch:
//!   timeout_secs: 15
//!   delay_ms: 500
//! llm:
//!   model: gpt-4o-mini
//!   temperature: 0.2
//! output:
//!   reports_dir: reports
//!   charts_dir: reports/charts
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving a [`ReportConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A value is outside its allowed range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Page fetch settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Politeness delay between consecutive fetches.
    pub delay_ms: u64,
    /// Characters of normalized text kept per corpus entry.
    pub excerpt_chars: usize,
    /// Upper bound on normalized page text.
    pub max_text_chars: usize,
    /// Characters of the rendered corpus appended to the first task.
    pub corpus_preview_chars: usize,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            delay_ms: 500,
            excerpt_chars: 1200,
            max_text_chars: 60_000,
            corpus_preview_chars: 5000,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Chat-completion backend settings.
///
/// The API key is never stored here; it is read from the environment variable
/// named by `api_key_env`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub api_key_env: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
            max_tokens: 2000,
            timeout_secs: 180,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

/// Where and how the report files are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub reports_dir: PathBuf,
    pub charts_dir: PathBuf,
    /// Prefix of generated PDF file names.
    pub file_prefix: String,
    pub title: String,
    pub footer: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
            charts_dir: PathBuf::from("reports/charts"),
            file_prefix: "competitors_report".to_string(),
            title: "Competitor Analysis - Generated Report".to_string(),
            footer: "Autonomous agents and process automation".to_string(),
        }
    }
}

/// Top-level configuration.
///
/// # Examples
///
/// ```
/// use competitor_report_core::ReportConfig;
///
/// let config: ReportConfig = serde_yaml::from_str("fetch:\n  delay_ms: 0\n").unwrap();
/// assert_eq!(config.fetch.delay_ms, 0);
/// assert_eq!(config.fetch.timeout_secs, 15);
/// assert_eq!(config.llm.model, "gpt-4o-mini");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub fetch: FetchSettings,
    pub llm: LlmSettings,
    pub output: OutputSettings,
}

impl ReportConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if parsing fails, or [`ConfigError::Invalid`] if a
    /// value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: Self = serde_yaml::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Applies `OPENAI_MODEL` and `OPENAI_API_BASE` when they are set.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("OPENAI_MODEL").filter(|v| !v.trim().is_empty()) {
            self.llm.model = model;
        }
        if let Some(base) = lookup("OPENAI_API_BASE").filter(|v| !v.trim().is_empty()) {
            self.llm.base_url = base;
        }
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::Invalid(
                "llm.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model cannot be empty".to_string()));
        }
        Ok(())
    }
}
