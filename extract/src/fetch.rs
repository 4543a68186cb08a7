//! Competitor page fetching and visible-text extraction.
//!
//! One blocking GET per URL, a fixed pause between requests, no retries. A
//! failed fetch never aborts the run; it is folded into a sentinel string that
//! flows through text extraction and ends up in the corpus entry's `note`.

use std::thread;
use std::time::Duration;

use competitor_report_core::{
    CorpusEntry, FETCH_ERROR_SENTINEL, FetchSettings, domain_of, is_fetch_error,
};
use scraper::Html;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::parser::{collapse_whitespace, truncate_chars};

/// Elements whose text never reaches the corpus.
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// Errors from a single fetch. Only [`Fetcher::new`] surfaces one directly;
/// per-URL failures are rendered into the fetch sentinel.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
}

/// Fetcher settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    /// Pause between consecutive fetches.
    pub delay: Duration,
    pub user_agent: String,
    pub max_text_chars: usize,
    pub excerpt_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::from(&FetchSettings::default())
    }
}

impl From<&FetchSettings> for FetchConfig {
    fn from(settings: &FetchSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
            delay: Duration::from_millis(settings.delay_ms),
            user_agent: settings.user_agent.clone(),
            max_text_chars: settings.max_text_chars,
            excerpt_chars: settings.excerpt_chars,
        }
    }
}

/// Blocking page fetcher.
pub struct Fetcher {
    client: reqwest::blocking::Client,
    config: FetchConfig,
}

impl Fetcher {
    /// Builds the HTTP client with the configured timeout and user agent.
    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Returns the page body, or `__ERROR_FETCH__ <url>: <error>` on any
    /// transport, status or body-read failure.
    pub fn fetch_html(&self, url: &str) -> String {
        match self.try_fetch(url) {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched page");
                body
            }
            Err(err) => {
                warn!(url, error = %err, "Fetch failed");
                format!("{FETCH_ERROR_SENTINEL} {url}: {err}")
            }
        }
    }

    fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text()?)
    }

    /// Fetches and normalizes one URL into a corpus entry.
    pub fn fetch_entry(&self, url: &str) -> CorpusEntry {
        let html = self.fetch_html(url);
        let text = extract_text(&html, self.config.max_text_chars);
        corpus_entry(url, &text, self.config.excerpt_chars)
    }

    /// Fetches every URL in order, pausing between requests.
    pub fn build_corpus<S: AsRef<str>>(&self, urls: &[S]) -> Vec<CorpusEntry> {
        let mut corpus = Vec::with_capacity(urls.len());
        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !self.config.delay.is_zero() {
                thread::sleep(self.config.delay);
            }
            let entry = self.fetch_entry(url.as_ref());
            info!(
                url = %entry.url,
                domain = %entry.domain,
                ok = entry.is_ok(),
                excerpt_chars = entry.excerpt.chars().count(),
                "Corpus entry ready"
            );
            corpus.push(entry);
        }
        corpus
    }
}

/// Visible text of an HTML document.
///
/// Text under `script`, `style` and `noscript` is dropped, whitespace runs
/// collapse to single spaces and the result is cut to `max_chars`
/// characters. A fetch sentinel is returned unchanged.
///
/// # Examples
///
/// ```
/// use competitor_report_extract::fetch::extract_text;
///
/// let html = "<html><body><h1>Hi</h1><script>var x;</script><p>there\n  friend</p></body></html>";
/// assert_eq!(extract_text(html, 60_000), "Hi there friend");
/// ```
pub fn extract_text(html: &str, max_chars: usize) -> String {
    if is_fetch_error(html) {
        return html.to_string();
    }

    let document = Html::parse_document(html);
    let mut pieces: Vec<&str> = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
        });
        if !hidden {
            pieces.push(text);
        }
    }

    let collapsed = collapse_whitespace(&pieces.join(" "));
    truncate_chars(&collapsed, max_chars).to_string()
}

/// Builds a corpus entry from normalized page text (or a fetch sentinel).
pub fn corpus_entry(url: &str, text: &str, excerpt_chars: usize) -> CorpusEntry {
    let (excerpt, note) = if is_fetch_error(text) {
        (String::new(), text.to_string())
    } else {
        (
            truncate_chars(text, excerpt_chars).to_string(),
            CorpusEntry::OK_NOTE.to_string(),
        )
    };
    CorpusEntry {
        url: url.to_string(),
        domain: domain_of(url),
        excerpt,
        note,
    }
}

/// Compact JSON rendering of the corpus, cut to `max_chars` characters.
///
/// Appended to the first crew task so the model sees the corpus layout.
pub fn render_corpus_preview(entries: &[CorpusEntry], max_chars: usize) -> String {
    let rendered = serde_json::to_string(entries).unwrap_or_default();
    truncate_chars(&rendered, max_chars).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_drops_hidden_elements() {
        let html = r#"<html><head><title>Shop</title><style>p { color: red }</style></head>
            <body><noscript>enable js</noscript><p>Buy   now</p>
            <script>track("x")</script><div>Free <b>shipping</b></div></body></html>"#;
        assert_eq!(extract_text(html, 60_000), "Shop Buy now Free shipping");
    }

    #[test]
    fn test_extract_text_truncates_on_char_boundary() {
        let html = "<p>привет мир</p>";
        assert_eq!(extract_text(html, 6), "привет");
    }

    #[test]
    fn test_sentinel_passes_through_extract_text() {
        let sentinel = "__ERROR_FETCH__ https://down.example/: HTTP status 503 Service Unavailable";
        assert_eq!(extract_text(sentinel, 10), sentinel);
    }

    #[test]
    fn test_corpus_entry_ok_and_error() {
        let ok = corpus_entry("https://shop.example/about", "abcdef", 3);
        assert_eq!(ok.domain, "shop.example");
        assert_eq!(ok.excerpt, "abc");
        assert!(ok.is_ok());

        let sentinel = "__ERROR_FETCH__ https://down.example/: timed out";
        let failed = corpus_entry("https://down.example/", sentinel, 1200);
        assert!(failed.excerpt.is_empty());
        assert_eq!(failed.note, sentinel);
        assert!(!failed.is_ok());
    }

    #[test]
    fn test_render_corpus_preview_is_bounded() {
        let entries: Vec<CorpusEntry> = (0..50)
            .map(|i| corpus_entry(&format!("https://s{i}.example/"), &"x".repeat(300), 300))
            .collect();
        let preview = render_corpus_preview(&entries, 5000);
        assert_eq!(preview.chars().count(), 5000);
        assert!(preview.starts_with("[{\"url\":\"https://s0.example/\""));
    }

    #[test]
    fn test_fetch_failure_becomes_sentinel() {
        let config = FetchConfig {
            timeout: Duration::from_secs(2),
            delay: Duration::ZERO,
            ..FetchConfig::default()
        };
        let fetcher = Fetcher::new(config).unwrap();
        let body = fetcher.fetch_html("http://127.0.0.1:9/");
        assert!(body.starts_with("__ERROR_FETCH__ http://127.0.0.1:9/: "));

        let corpus = fetcher.build_corpus(&["http://127.0.0.1:9/", "not a url"]);
        assert_eq!(corpus.len(), 2);
        assert!(corpus.iter().all(|entry| !entry.is_ok()));
        assert_eq!(corpus[0].domain, "127.0.0.1:9");
    }

    #[test]
    fn test_config_from_settings() {
        let mut settings = FetchSettings::default();
        settings.delay_ms = 0;
        let config = FetchConfig::from(&settings);
        assert!(config.delay.is_zero());
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.excerpt_chars, 1200);
    }
}
