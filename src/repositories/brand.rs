//! Brand repository for database operations
//!
//! Encapsulates the SeaORM queries brand resolution needs. Every method runs
//! on a caller-supplied connection, which is normally an open transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::models::brand::{self, Entity as Brand};
use crate::models::social_links;

/// Fields the resolver supplies when creating a brand
#[derive(Debug, Clone)]
pub struct NewBrand {
    pub name: String,
    pub slug: String,
    pub domain: Option<String>,
}

/// Repository for brand database operations
pub struct BrandRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C> BrandRepository<'a, C>
where
    C: ConnectionTrait,
{
    /// Create a new BrandRepository over the given connection or transaction
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Get brand by ID
    pub async fn find_by_id(&self, brand_id: Uuid) -> Result<Option<brand::Model>, DbErr> {
        Brand::find_by_id(brand_id).one(self.conn).await
    }

    /// Exact match on slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<brand::Model>, DbErr> {
        Brand::find()
            .filter(brand::Column::Slug.eq(slug))
            .one(self.conn)
            .await
    }

    /// Exact match on domain
    pub async fn find_by_domain(&self, domain: &str) -> Result<Option<brand::Model>, DbErr> {
        Brand::find()
            .filter(brand::Column::Domain.eq(domain))
            .one(self.conn)
            .await
    }

    /// Brands whose domain ends with `.{domain}`, ordered by creation time then ID
    ///
    /// The LIKE prefilter treats `_` as a wildcard, so rows are rechecked
    /// with an exact suffix comparison.
    pub async fn find_by_domain_suffix(&self, domain: &str) -> Result<Vec<brand::Model>, DbErr> {
        let suffix = format!(".{}", domain.to_lowercase());

        let candidates = Brand::find()
            .filter(brand::Column::Domain.like(format!("%{}", suffix)))
            .order_by_asc(brand::Column::CreatedAt)
            .order_by_asc(brand::Column::BrandId)
            .all(self.conn)
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|candidate| {
                candidate
                    .domain
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().ends_with(&suffix))
            })
            .collect())
    }

    /// Insert a brand with the resolver's defaults (unclaimed, unverified)
    pub async fn insert(&self, new_brand: NewBrand) -> Result<brand::Model, DbErr> {
        let now = Utc::now();

        let brand = brand::ActiveModel {
            brand_id: Set(Uuid::new_v4()),
            name: Set(new_brand.name),
            slug: Set(new_brand.slug),
            domain: Set(new_brand.domain),
            description: Set(None),
            website: Set(None),
            logo: Set(None),
            is_claimed: Set(false),
            is_verified: Set(false),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        brand.insert(self.conn).await
    }

    /// Insert the empty social links row owned by `brand_id`
    pub async fn insert_social_links(
        &self,
        brand_id: Uuid,
    ) -> Result<social_links::Model, DbErr> {
        let now = Utc::now();

        let links = social_links::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand_id: Set(brand_id),
            website: Set(None),
            twitter: Set(None),
            instagram: Set(None),
            youtube: Set(None),
            linkedin: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        links.insert(self.conn).await
    }

    /// Social links row for a brand
    pub async fn find_social_links(
        &self,
        brand_id: Uuid,
    ) -> Result<Option<social_links::Model>, DbErr> {
        social_links::Entity::find()
            .filter(social_links::Column::BrandId.eq(brand_id))
            .one(self.conn)
            .await
    }

    /// Get brand count
    pub async fn count(&self) -> Result<u64, DbErr> {
        Brand::find().count(self.conn).await
    }
}
