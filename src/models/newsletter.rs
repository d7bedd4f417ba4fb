//! Newsletter entity model
//!
//! This module contains the SeaORM entity model for the newsletters table.
//! Rows are inserted by the ingestion pipeline in the same transaction that
//! resolves (and possibly creates) their brand.

use super::brand::Entity as Brand;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// A single ingested newsletter issue
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "newsletters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub newsletter_id: Uuid,

    /// Brand the sender resolved to
    pub brand_id: Uuid,

    /// Sender display name as derived from the message
    pub sender: String,

    /// Slug of the resolved brand
    pub sender_slug: String,

    pub subject: String,

    /// Location of the archived HTML body
    pub html_url: Option<String>,

    pub top_screenshot_url: Option<String>,

    pub thumbnail_screenshot_url: Option<String>,

    /// Provider-generated summary, absent when every summarizer failed
    pub summary: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Brand",
        from = "Column::BrandId",
        to = "super::brand::Column::BrandId"
    )]
    Brand,
}

impl Related<Brand> for Entity {
    fn to() -> RelationDef {
        Relation::Brand.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
