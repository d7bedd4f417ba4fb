//! Brand entity model
//!
//! This module contains the SeaORM entity model for the brands table,
//! which stores one row per distinct newsletter-sending organization.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Brand entity representing a deduplicated newsletter sender
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "brands")]
pub struct Model {
    /// Opaque identifier assigned at creation (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub brand_id: Uuid,

    /// Display name taken from the first sender seen
    pub name: String,

    /// URL-safe identifier, unique across all brands
    #[sea_orm(unique)]
    pub slug: String,

    /// Sending email domain, the primary match key
    #[sea_orm(unique)]
    pub domain: Option<String>,

    pub description: Option<String>,

    pub website: Option<String>,

    pub logo: Option<String>,

    /// Owned by the claiming workflow; the resolver only ever writes `false`
    pub is_claimed: bool,

    /// Owned by the claiming workflow; the resolver only ever writes `false`
    pub is_verified: bool,

    /// Timestamp when the brand was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the brand was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::social_links::Entity")]
    SocialLinks,
    #[sea_orm(has_many = "super::newsletter::Entity")]
    Newsletters,
}

impl Related<super::social_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SocialLinks.def()
    }
}

impl Related<super::newsletter::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Newsletters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
