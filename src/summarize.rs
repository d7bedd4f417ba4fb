//! # Summarization Providers
//!
//! Newsletter summaries come from an ordered chain of interchangeable
//! providers. Each provider either returns a summary or a typed failure, and
//! the chain falls through to the next one on failure.

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SummarizerConfig;

/// A summary and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub text: String,
    pub provider: String,
}

/// Failure of a single provider or of the whole chain.
#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("provider {provider} unavailable: {message}")]
    Unavailable { provider: String, message: String },
    #[error("provider {provider} returned a malformed response: {message}")]
    MalformedResponse { provider: String, message: String },
    #[error("provider {provider} returned an empty summary")]
    EmptySummary { provider: String },
    #[error("no summarization providers configured")]
    NoProviders,
    #[error("all {} summarization providers failed", .failures.len())]
    AllProvidersFailed { failures: Vec<SummarizerError> },
}

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Stable provider name used in logs and metrics.
    fn name(&self) -> &str;

    /// Summarize a newsletter. `body_text` is already truncated by the chain.
    async fn summarize(&self, subject: &str, body_text: &str) -> Result<Summary, SummarizerError>;
}

/// Providers tried in order until one succeeds.
#[derive(Clone)]
pub struct SummarizerChain {
    providers: Vec<Arc<dyn Summarizer>>,
    max_input_chars: usize,
}

impl std::fmt::Debug for SummarizerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}

impl SummarizerChain {
    pub fn new(max_input_chars: usize) -> Self {
        Self {
            providers: Vec::new(),
            max_input_chars,
        }
    }

    /// Empty chain with the configured input limit.
    pub fn from_config(config: &SummarizerConfig) -> Self {
        Self::new(config.max_input_chars)
    }

    /// Append a provider after the existing ones.
    pub fn with_provider(mut self, provider: Arc<dyn Summarizer>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Summarize with the first provider that succeeds.
    pub async fn summarize(&self, subject: &str, body_text: &str) -> Result<Summary, SummarizerError> {
        if self.providers.is_empty() {
            return Err(SummarizerError::NoProviders);
        }

        let input = truncate_chars(body_text, self.max_input_chars);
        let mut failures = Vec::new();

        for provider in &self.providers {
            let outcome = match provider.summarize(subject, input).await {
                Ok(summary) if summary.text.trim().is_empty() => Err(SummarizerError::EmptySummary {
                    provider: provider.name().to_string(),
                }),
                other => other,
            };

            match outcome {
                Ok(summary) => {
                    let labels = vec![("provider", provider.name().to_string())];
                    counter!("newsletter_summaries_total", &labels).increment(1);
                    debug!(provider = provider.name(), "Summarized newsletter");
                    return Ok(summary);
                }
                Err(err) => {
                    let labels = vec![("provider", provider.name().to_string())];
                    counter!("newsletter_summarizer_failures_total", &labels).increment(1);
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Summarizer failed, trying next provider"
                    );
                    failures.push(err);
                }
            }
        }

        Err(SummarizerError::AllProvidersFailed { failures })
    }
}

/// Longest prefix of `text` with at most `max_chars` characters.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FixedSummarizer {
        name: &'static str,
        reply: Result<&'static str, ()>,
        seen_input: Mutex<Option<String>>,
    }

    impl FixedSummarizer {
        fn ok(name: &'static str, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(text),
                seen_input: Mutex::new(None),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Err(()),
                seen_input: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        fn name(&self) -> &str {
            self.name
        }

        async fn summarize(&self, _subject: &str, body_text: &str) -> Result<Summary, SummarizerError> {
            *self.seen_input.lock().unwrap() = Some(body_text.to_string());
            match self.reply {
                Ok(text) => Ok(Summary {
                    text: text.to_string(),
                    provider: self.name.to_string(),
                }),
                Err(()) => Err(SummarizerError::Unavailable {
                    provider: self.name.to_string(),
                    message: "503".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = SummarizerChain::new(4000)
            .with_provider(FixedSummarizer::ok("primary", "Weekly deals"))
            .with_provider(FixedSummarizer::ok("fallback", "unused"));

        let summary = chain.summarize("Deals", "body").await.unwrap();
        assert_eq!(summary.provider, "primary");
        assert_eq!(summary.text, "Weekly deals");
    }

    #[tokio::test]
    async fn test_falls_through_to_next_provider() {
        let chain = SummarizerChain::new(4000)
            .with_provider(FixedSummarizer::failing("primary"))
            .with_provider(FixedSummarizer::ok("fallback", "Product launch"));

        let summary = chain.summarize("Launch", "body").await.unwrap();
        assert_eq!(summary.provider, "fallback");
    }

    #[tokio::test]
    async fn test_empty_summary_counts_as_failure() {
        let chain = SummarizerChain::new(4000)
            .with_provider(FixedSummarizer::ok("primary", "   "))
            .with_provider(FixedSummarizer::ok("fallback", "Real summary"));

        let summary = chain.summarize("Subject", "body").await.unwrap();
        assert_eq!(summary.provider, "fallback");
    }

    #[tokio::test]
    async fn test_all_failures_are_collected() {
        let chain = SummarizerChain::new(4000)
            .with_provider(FixedSummarizer::failing("primary"))
            .with_provider(FixedSummarizer::ok("fallback", ""));

        let err = chain.summarize("Subject", "body").await.unwrap_err();
        match err {
            SummarizerError::AllProvidersFailed { failures } => {
                assert_eq!(failures.len(), 2);
                assert!(matches!(failures[0], SummarizerError::Unavailable { .. }));
                assert!(matches!(failures[1], SummarizerError::EmptySummary { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain() {
        let chain = SummarizerChain::new(4000);
        assert!(chain.is_empty());
        assert!(matches!(
            chain.summarize("Subject", "body").await,
            Err(SummarizerError::NoProviders)
        ));
    }

    #[tokio::test]
    async fn test_input_is_truncated_on_char_boundary() {
        let provider = FixedSummarizer::ok("primary", "ok");
        let chain = SummarizerChain::new(3).with_provider(provider.clone());

        chain.summarize("Subject", "héllo").await.unwrap();
        assert_eq!(provider.seen_input.lock().unwrap().as_deref(), Some("hél"));
    }

    #[tokio::test]
    async fn test_from_config_applies_input_limit() {
        let provider = FixedSummarizer::ok("primary", "ok");
        let config = SummarizerConfig { max_input_chars: 3 };
        let chain = SummarizerChain::from_config(&config).with_provider(provider.clone());

        chain.summarize("Subject", "héllo wörld").await.unwrap();
        assert_eq!(provider.seen_input.lock().unwrap().as_deref(), Some("hél"));
    }
}
