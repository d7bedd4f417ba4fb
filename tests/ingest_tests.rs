//! Integration tests for the newsletter ingestion unit of work.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use newsletter_brands::config::AppConfig;
use newsletter_brands::error::IngestError;
use newsletter_brands::ingest::{InboundNewsletter, NewsletterIngestor};
use newsletter_brands::repositories::NewsletterRepository;
use newsletter_brands::resolver::{BrandResolver, ResolutionOutcome};
use newsletter_brands::summarize::{Summarizer, SummarizerChain, SummarizerError, Summary};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{brand_count, setup_test_db_arc};

struct StaticSummarizer {
    name: &'static str,
    text: Option<&'static str>,
}

#[async_trait]
impl Summarizer for StaticSummarizer {
    fn name(&self) -> &str {
        self.name
    }

    async fn summarize(&self, _subject: &str, _body_text: &str) -> Result<Summary, SummarizerError> {
        match self.text {
            Some(text) => Ok(Summary {
                text: text.to_string(),
                provider: self.name.to_string(),
            }),
            None => Err(SummarizerError::Unavailable {
                provider: self.name.to_string(),
                message: "rate limited".to_string(),
            }),
        }
    }
}

fn empty_chain() -> SummarizerChain {
    SummarizerChain::from_config(&AppConfig::default().summarizer)
}

fn chain(providers: Vec<StaticSummarizer>) -> SummarizerChain {
    providers
        .into_iter()
        .fold(empty_chain(), |chain, provider| chain.with_provider(Arc::new(provider)))
}

#[tokio::test]
async fn ingest_records_newsletter_with_fallback_summary() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let ingestor = NewsletterIngestor::new(
        db.clone(),
        BrandResolver::default(),
        chain(vec![
            StaticSummarizer {
                name: "primary",
                text: None,
            },
            StaticSummarizer {
                name: "fallback",
                text: Some("Spring sale starts Monday"),
            },
        ]),
    );

    let inbound = InboundNewsletter::from_header(
        "\"Acme News\" <news@acme.io>",
        "Spring sale",
        "Everything is 20% off.",
    )
    .with_archive(
        "https://archive.example/n/1.html",
        "https://archive.example/n/1_full.webp",
        "https://archive.example/n/1_small.webp",
    );
    let newsletter_id = inbound.newsletter_id;

    let ingested = ingestor.ingest(inbound).await?;

    assert_eq!(ingested.newsletter_id, newsletter_id);
    assert_eq!(ingested.brand.outcome, ResolutionOutcome::Created);
    assert_eq!(ingested.brand.slug, "acme-news");
    assert_eq!(ingested.summary.as_deref(), Some("Spring sale starts Monday"));

    let stored = NewsletterRepository::new(db.as_ref())
        .find_by_id(newsletter_id)
        .await?
        .expect("newsletter stored");
    assert_eq!(stored.brand_id, ingested.brand.brand_id);
    assert_eq!(stored.sender, "Acme News");
    assert_eq!(stored.sender_slug, "acme-news");
    assert_eq!(stored.subject, "Spring sale");
    assert_eq!(
        stored.thumbnail_screenshot_url.as_deref(),
        Some("https://archive.example/n/1_small.webp")
    );
    Ok(())
}

#[tokio::test]
async fn summarizer_failure_stores_newsletter_without_summary() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let ingestor = NewsletterIngestor::new(
        db.clone(),
        BrandResolver::default(),
        chain(vec![StaticSummarizer {
            name: "primary",
            text: None,
        }]),
    );

    let ingested = ingestor
        .ingest(InboundNewsletter::new("news@acme.io", "Acme", "Hello", "Body"))
        .await?;

    assert_eq!(ingested.summary, None);
    let stored = NewsletterRepository::new(db.as_ref())
        .find_by_id(ingested.newsletter_id)
        .await?
        .expect("newsletter stored");
    assert_eq!(stored.summary, None);
    Ok(())
}

#[tokio::test]
async fn repeated_sender_coalesces_into_one_brand() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let ingestor = NewsletterIngestor::new(
        db.clone(),
        BrandResolver::default(),
        empty_chain(),
    );

    let first = ingestor
        .ingest(InboundNewsletter::new("news@acme.io", "Acme", "Issue 1", "One"))
        .await?;
    let second = ingestor
        .ingest(InboundNewsletter::new(
            "digest@eu.acme.io",
            "Acme Europe",
            "Issue 2",
            "Two",
        ))
        .await?;

    assert_eq!(first.brand.brand_id, second.brand.brand_id);
    assert_eq!(second.brand.outcome, ResolutionOutcome::Found);
    assert_eq!(brand_count(&db).await?, 1);

    let issues = NewsletterRepository::new(db.as_ref())
        .find_by_brand(first.brand.brand_id)
        .await?;
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[1].sender, "Acme Europe");
    assert_eq!(issues[1].sender_slug, "acme");
    Ok(())
}

#[tokio::test]
async fn failed_newsletter_insert_rolls_back_new_brand() -> Result<()> {
    let db = setup_test_db_arc().await?;
    let ingestor = NewsletterIngestor::new(
        db.clone(),
        BrandResolver::default(),
        empty_chain(),
    );

    let first = ingestor
        .ingest(InboundNewsletter::new("news@acme.io", "Acme", "Issue 1", "One"))
        .await?;

    // Reusing the newsletter id makes the insert fail after the brand for the
    // new sender was created in the same transaction.
    let mut duplicate = InboundNewsletter::new("hello@globex.com", "Globex", "Launch", "Body");
    duplicate.newsletter_id = first.newsletter_id;

    let err = ingestor.ingest(duplicate).await.unwrap_err();
    assert!(matches!(
        err,
        IngestError::Store {
            operation: "insert newsletter",
            ..
        }
    ));
    assert_eq!(brand_count(&db).await?, 1);
    Ok(())
}
