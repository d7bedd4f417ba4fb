//! Social links entity model
//!
//! Placeholder profile links owned 1:1 by a brand. The resolver creates the
//! row empty; the claiming workflow fills it in.

use super::brand::Entity as Brand;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "social_links")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning brand (unique, one row per brand)
    #[sea_orm(unique)]
    pub brand_id: Uuid,

    pub website: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub youtube: Option<String>,
    pub linkedin: Option<String>,

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
