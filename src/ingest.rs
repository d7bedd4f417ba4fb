//! # Newsletter Ingestion
//!
//! One newsletter is one unit of work: summarize, resolve the sender's brand
//! and record the newsletter. Resolution and the newsletter insert share a
//! transaction, so a failure after a brand was created leaves no orphan.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::IngestError;
use crate::identity::{SenderIdentity, extract_identity, parse_from_header};
use crate::repositories::{NewNewsletter, NewsletterRepository};
use crate::resolver::{BrandResolver, ResolvedBrand};
use crate::summarize::SummarizerChain;

/// A parsed inbound newsletter with its archive locations.
#[derive(Debug, Clone)]
pub struct InboundNewsletter {
    /// Assigned before archiving, since archive paths embed it
    pub newsletter_id: Uuid,
    pub sender_email: String,
    pub sender_name: String,
    pub subject: String,
    /// Plain-text body fed to the summarizers
    pub body_text: String,
    pub html_url: Option<String>,
    pub top_screenshot_url: Option<String>,
    pub thumbnail_screenshot_url: Option<String>,
}

impl InboundNewsletter {
    pub fn new(
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
        subject: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            newsletter_id: Uuid::new_v4(),
            sender_email: sender_email.into(),
            sender_name: sender_name.into(),
            subject: subject.into(),
            body_text: body_text.into(),
            html_url: None,
            top_screenshot_url: None,
            thumbnail_screenshot_url: None,
        }
    }

    /// Build from a raw `From:` header value.
    pub fn from_header(
        from: &str,
        subject: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        let (name, address) = parse_from_header(from);
        Self::new(address, name, subject, body_text)
    }

    pub fn with_archive(
        mut self,
        html_url: impl Into<String>,
        top_screenshot_url: impl Into<String>,
        thumbnail_screenshot_url: impl Into<String>,
    ) -> Self {
        self.html_url = Some(html_url.into());
        self.top_screenshot_url = Some(top_screenshot_url.into());
        self.thumbnail_screenshot_url = Some(thumbnail_screenshot_url.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestedNewsletter {
    pub newsletter_id: Uuid,
    pub brand: ResolvedBrand,
    pub summary: Option<String>,
}

/// Records newsletters against their brands.
pub struct NewsletterIngestor {
    db: Arc<DatabaseConnection>,
    resolver: BrandResolver,
    summarizers: SummarizerChain,
}

impl NewsletterIngestor {
    pub fn new(
        db: Arc<DatabaseConnection>,
        resolver: BrandResolver,
        summarizers: SummarizerChain,
    ) -> Self {
        Self {
            db,
            resolver,
            summarizers,
        }
    }

    /// Ingest one newsletter.
    ///
    /// Summarization happens before the transaction opens; when every
    /// provider fails the newsletter is stored without a summary.
    pub async fn ingest(&self, inbound: InboundNewsletter) -> Result<IngestedNewsletter, IngestError> {
        let span = info_span!(
            "ingest_newsletter",
            newsletter_id = %inbound.newsletter_id,
            sender = %inbound.sender_email
        );

        async move {
            let summary = if self.summarizers.is_empty() {
                None
            } else {
                match self
                    .summarizers
                    .summarize(&inbound.subject, &inbound.body_text)
                    .await
                {
                    Ok(summary) => Some(summary.text),
                    Err(err) => {
                        warn!(error = %err, "Storing newsletter without a summary");
                        None
                    }
                }
            };

            let identity = extract_identity(&inbound.sender_email, &inbound.sender_name);

            let txn = self
                .db
                .begin()
                .await
                .map_err(|err| IngestError::store("begin ingestion", err))?;

            let brand = match self.record(&txn, &inbound, &identity, summary.clone()).await {
                Ok(brand) => brand,
                Err(err) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!(error = %rollback_err, "Failed to roll back ingestion");
                    }
                    return Err(err);
                }
            };

            txn.commit()
                .await
                .map_err(|err| IngestError::store("commit ingestion", err))?;

            info!(
                brand_id = %brand.brand_id,
                brand_slug = %brand.slug,
                outcome = brand.outcome.as_str(),
                "Recorded newsletter"
            );

            Ok(IngestedNewsletter {
                newsletter_id: inbound.newsletter_id,
                brand,
                summary,
            })
        }
        .instrument(span)
        .await
    }

    async fn record(
        &self,
        txn: &DatabaseTransaction,
        inbound: &InboundNewsletter,
        identity: &SenderIdentity,
        summary: Option<String>,
    ) -> Result<ResolvedBrand, IngestError> {
        let brand = self
            .resolver
            .resolve_identity_with_retry(txn, identity)
            .await?;

        NewsletterRepository::new(txn)
            .insert(NewNewsletter {
                newsletter_id: inbound.newsletter_id,
                brand_id: brand.brand_id,
                sender: identity.name.clone(),
                sender_slug: brand.slug.clone(),
                subject: inbound.subject.clone(),
                html_url: inbound.html_url.clone(),
                top_screenshot_url: inbound.top_screenshot_url.clone(),
                thumbnail_screenshot_url: inbound.thumbnail_screenshot_url.clone(),
                summary,
            })
            .await
            .map_err(|err| IngestError::store("insert newsletter", err))?;

        Ok(brand)
    }
}
