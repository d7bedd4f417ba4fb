//! # Brand Resolver
//!
//! Maps a newsletter sender onto a deduplicated brand row. Resolution reads
//! first (exact domain, then suffix matches), and only on a miss assigns a
//! collision-free slug and creates the brand together with its social links
//! placeholder.
//!
//! Every operation runs on a caller-supplied connection, normally the
//! transaction that will also record the newsletter. Concurrent creations of
//! the same brand are settled by the store's unique indexes:
//! [`BrandResolver::resolve_with_retry`] re-runs resolution after a conflict
//! and lands on the row the winner created.

use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseTransaction, TransactionTrait};
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::ResolverConfig;
use crate::error::ResolveError;
use crate::identity::{SenderIdentity, email_domain, extract_identity, location_hint, parent_domain};
use crate::models::brand;
use crate::repositories::{BrandRepository, NewBrand};

/// Result of looking up an existing brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrandLookup {
    Found(brand::Model),
    NotFound,
}

/// Result of slug assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugAssignment {
    /// No brand holds this slug yet
    Available(String),
    /// The slug belongs to a brand with the same domain; reuse it
    OwnedBySameDomain(brand::Model),
}

/// What resolution will do for an identity, computed without writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    Existing(brand::Model),
    Create {
        identity: SenderIdentity,
        slug: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Found,
    Created,
}

impl ResolutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Created => "created",
        }
    }
}

/// The brand a sender resolved to, with the name and slug as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBrand {
    pub brand_id: Uuid,
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
    pub outcome: ResolutionOutcome,
}

impl ResolvedBrand {
    fn from_model(model: brand::Model, outcome: ResolutionOutcome) -> Self {
        Self {
            brand_id: model.brand_id,
            name: model.name,
            slug: model.slug,
            domain: model.domain,
            outcome,
        }
    }
}

enum SlugCheck {
    Free,
    SameDomain(brand::Model),
    Taken,
}

/// Resolves senders to brands.
#[derive(Debug, Clone, Default)]
pub struct BrandResolver {
    config: ResolverConfig,
}

impl BrandResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Looks up the brand an identity already belongs to.
    ///
    /// Exact domain first. Then suffix matches on the address domain, one
    /// level of subdomain apart: a brand registered on the immediate parent
    /// (`example.com` for `news.example.com`, never `acme.io` for
    /// `sales.region.acme.io`), and finally a brand registered on a subdomain
    /// of it, oldest first.
    pub async fn find_existing<C>(
        &self,
        conn: &C,
        domain: Option<&str>,
        email: &str,
    ) -> Result<BrandLookup, ResolveError>
    where
        C: ConnectionTrait,
    {
        let repo = BrandRepository::new(conn);

        if let Some(domain) = domain {
            let exact = repo
                .find_by_domain(domain)
                .await
                .map_err(|err| ResolveError::from_db("find brand by domain", err))?;
            if let Some(found) = exact {
                debug!(brand_id = %found.brand_id, domain, "Matched brand by exact domain");
                return Ok(BrandLookup::Found(found));
            }
        }

        let Some(email_domain) = email_domain(email) else {
            return Ok(BrandLookup::NotFound);
        };

        if let Some(parent) = parent_domain(&email_domain) {
            let parent_match = repo
                .find_by_domain(&parent)
                .await
                .map_err(|err| ResolveError::from_db("find brand by parent domain", err))?;
            if let Some(found) = parent_match {
                debug!(
                    brand_id = %found.brand_id,
                    email_domain = %email_domain,
                    brand_domain = %parent,
                    "Matched brand registered on the parent domain"
                );
                return Ok(BrandLookup::Found(found));
            }
        }

        let child_matches = repo
            .find_by_domain_suffix(&email_domain)
            .await
            .map_err(|err| ResolveError::from_db("find brand by domain suffix", err))?;
        if let Some(found) = child_matches.into_iter().next() {
            debug!(
                brand_id = %found.brand_id,
                email_domain = %email_domain,
                brand_domain = ?found.domain,
                "Matched brand registered on a subdomain"
            );
            return Ok(BrandLookup::Found(found));
        }

        Ok(BrandLookup::NotFound)
    }

    /// Picks a slug no other brand holds.
    ///
    /// The base slug is tried as is, then once with the domain's location
    /// hint, then with numeric suffixes from 2 upwards. An empty base goes
    /// straight to the numeric suffixes. A slug held by a brand with the same
    /// domain is reported as [`SlugAssignment::OwnedBySameDomain`].
    pub async fn assign_unique_slug<C>(
        &self,
        conn: &C,
        base_slug: &str,
        domain: Option<&str>,
    ) -> Result<SlugAssignment, ResolveError>
    where
        C: ConnectionTrait,
    {
        let repo = BrandRepository::new(conn);

        if !base_slug.is_empty() {
            match check_slug(&repo, base_slug, domain).await? {
                SlugCheck::Free => return Ok(SlugAssignment::Available(base_slug.to_string())),
                SlugCheck::SameDomain(owner) => return Ok(SlugAssignment::OwnedBySameDomain(owner)),
                SlugCheck::Taken => {}
            }

            if let Some(hint) = domain.and_then(location_hint) {
                let candidate = format!("{base_slug}-{hint}");
                match check_slug(&repo, &candidate, domain).await? {
                    SlugCheck::Free => return Ok(SlugAssignment::Available(candidate)),
                    SlugCheck::SameDomain(owner) => {
                        return Ok(SlugAssignment::OwnedBySameDomain(owner));
                    }
                    SlugCheck::Taken => {}
                }
            }
        }

        let mut suffix: u32 = 2;
        loop {
            if let Some(limit) = self.config.slug_suffix_limit
                && suffix > limit
            {
                return Err(ResolveError::SlugExhausted {
                    base: base_slug.to_string(),
                    limit,
                });
            }

            let candidate = format!("{base_slug}-{suffix}");
            match check_slug(&repo, &candidate, domain).await? {
                SlugCheck::Free => return Ok(SlugAssignment::Available(candidate)),
                SlugCheck::SameDomain(owner) => return Ok(SlugAssignment::OwnedBySameDomain(owner)),
                SlugCheck::Taken => {}
            }

            suffix = suffix.checked_add(1).ok_or_else(|| ResolveError::SlugExhausted {
                base: base_slug.to_string(),
                limit: u32::MAX,
            })?;
        }
    }

    /// Inserts a brand and its social links placeholder.
    ///
    /// Both rows are written in a nested transaction, so a failed insert
    /// leaves the caller's transaction usable for a retry.
    pub async fn create_brand<C>(
        &self,
        conn: &C,
        name: &str,
        slug: &str,
        domain: Option<&str>,
    ) -> Result<brand::Model, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let txn = conn
            .begin()
            .await
            .map_err(|err| ResolveError::from_db("begin brand creation", err))?;

        match insert_brand_rows(&txn, name, slug, domain).await {
            Ok(created) => {
                txn.commit()
                    .await
                    .map_err(|err| ResolveError::from_db("commit brand creation", err))?;
                Ok(created)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, slug, "Failed to roll back brand creation");
                }
                Err(err)
            }
        }
    }

    /// Computes what resolving `identity` would do, without writing.
    pub async fn plan<C>(
        &self,
        conn: &C,
        identity: &SenderIdentity,
    ) -> Result<ResolutionPlan, ResolveError>
    where
        C: ConnectionTrait,
    {
        if let BrandLookup::Found(existing) = self
            .find_existing(conn, identity.domain.as_deref(), &identity.email)
            .await?
        {
            return Ok(ResolutionPlan::Existing(existing));
        }

        match self
            .assign_unique_slug(conn, &identity.slug_base, identity.domain.as_deref())
            .await?
        {
            SlugAssignment::OwnedBySameDomain(existing) => Ok(ResolutionPlan::Existing(existing)),
            SlugAssignment::Available(slug) => Ok(ResolutionPlan::Create {
                identity: identity.clone(),
                slug,
            }),
        }
    }

    /// Carries out a plan: existing brands are returned as found, new ones
    /// are created.
    pub async fn apply<C>(&self, conn: &C, plan: ResolutionPlan) -> Result<ResolvedBrand, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        match plan {
            ResolutionPlan::Existing(existing) => {
                Ok(ResolvedBrand::from_model(existing, ResolutionOutcome::Found))
            }
            ResolutionPlan::Create { identity, slug } => {
                let created = self
                    .create_brand(conn, &identity.name, &slug, identity.domain.as_deref())
                    .await?;
                info!(
                    brand_id = %created.brand_id,
                    slug = %created.slug,
                    domain = ?created.domain,
                    sender = %identity.email,
                    "Created brand"
                );
                Ok(ResolvedBrand::from_model(created, ResolutionOutcome::Created))
            }
        }
    }

    /// Resolves a sender to its brand, creating the brand on a miss.
    ///
    /// Store errors propagate unchanged; a uniqueness conflict surfaces as
    /// [`ResolveError::UniqueViolation`]. See [`Self::resolve_with_retry`].
    #[instrument(skip(self, conn))]
    pub async fn resolve_brand<C>(
        &self,
        conn: &C,
        sender_email: &str,
        sender_name: &str,
    ) -> Result<ResolvedBrand, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let identity = extract_identity(sender_email, sender_name);
        self.resolve_identity(conn, &identity).await
    }

    /// Resolves like [`Self::resolve_brand`], re-running resolution after a
    /// uniqueness conflict up to the configured retry limit.
    #[instrument(skip(self, conn))]
    pub async fn resolve_with_retry<C>(
        &self,
        conn: &C,
        sender_email: &str,
        sender_name: &str,
    ) -> Result<ResolvedBrand, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let identity = extract_identity(sender_email, sender_name);
        self.resolve_identity_with_retry(conn, &identity).await
    }

    /// Retrying resolution for an identity the caller already extracted.
    pub async fn resolve_identity_with_retry<C>(
        &self,
        conn: &C,
        identity: &SenderIdentity,
    ) -> Result<ResolvedBrand, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let mut retries = 0;

        loop {
            match self.resolve_identity(conn, identity).await {
                Err(err) if err.is_conflict() && retries < self.config.conflict_retry_limit => {
                    retries += 1;
                    counter!("brand_resolution_conflict_retries_total").increment(1);
                    warn!(
                        attempt = retries,
                        limit = self.config.conflict_retry_limit,
                        sender = %identity.email,
                        "Brand creation lost a race, resolving again"
                    );
                }
                result => return result,
            }
        }
    }

    async fn resolve_identity<C>(
        &self,
        conn: &C,
        identity: &SenderIdentity,
    ) -> Result<ResolvedBrand, ResolveError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let result = match self.plan(conn, identity).await {
            Ok(plan) => self.apply(conn, plan).await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(resolved) => {
                let labels = vec![("outcome", resolved.outcome.as_str().to_string())];
                counter!("brand_resolutions_total", &labels).increment(1);
            }
            Err(err) if err.is_conflict() => {
                warn!(
                    operation = err.operation(),
                    sender = %identity.email,
                    domain = ?identity.domain,
                    slug_base = %identity.slug_base,
                    error = %err,
                    "Brand resolution hit a uniqueness conflict"
                );
            }
            Err(err) => {
                let labels = vec![("outcome", "error".to_string())];
                counter!("brand_resolutions_total", &labels).increment(1);
                error!(
                    operation = err.operation(),
                    sender = %identity.email,
                    domain = ?identity.domain,
                    slug_base = %identity.slug_base,
                    error = %err,
                    "Brand resolution failed"
                );
            }
        }

        result
    }
}

async fn check_slug<C>(
    repo: &BrandRepository<'_, C>,
    candidate: &str,
    domain: Option<&str>,
) -> Result<SlugCheck, ResolveError>
where
    C: ConnectionTrait,
{
    let holder = repo
        .find_by_slug(candidate)
        .await
        .map_err(|err| ResolveError::from_db("find brand by slug", err))?;

    Ok(match holder {
        None => SlugCheck::Free,
        Some(owner) if domain.is_some() && owner.domain.as_deref() == domain => {
            SlugCheck::SameDomain(owner)
        }
        Some(_) => {
            debug!(slug = candidate, "Slug already taken");
            SlugCheck::Taken
        }
    })
}

async fn insert_brand_rows(
    txn: &DatabaseTransaction,
    name: &str,
    slug: &str,
    domain: Option<&str>,
) -> Result<brand::Model, ResolveError> {
    let repo = BrandRepository::new(txn);

    let created = repo
        .insert(NewBrand {
            name: name.to_string(),
            slug: slug.to_string(),
            domain: domain.map(str::to_string),
        })
        .await
        .map_err(|err| ResolveError::from_db("insert brand", err))?;

    repo.insert_social_links(created.brand_id)
        .await
        .map_err(|err| ResolveError::from_db("insert social links", err))?;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_labels() {
        assert_eq!(ResolutionOutcome::Found.as_str(), "found");
        assert_eq!(ResolutionOutcome::Created.as_str(), "created");
        assert_eq!(
            serde_json::to_string(&ResolutionOutcome::Created).unwrap(),
            "\"created\""
        );
    }
}
