//! Migration to create the social_links table.
//!
//! Every brand owns exactly one social links row, created together with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SocialLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SocialLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SocialLinks::BrandId).uuid().not_null())
                    .col(ColumnDef::new(SocialLinks::Website).text().null())
                    .col(ColumnDef::new(SocialLinks::Twitter).text().null())
                    .col(ColumnDef::new(SocialLinks::Instagram).text().null())
                    .col(ColumnDef::new(SocialLinks::Youtube).text().null())
                    .col(ColumnDef::new(SocialLinks::Linkedin).text().null())
                    .col(
                        ColumnDef::new(SocialLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SocialLinks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_social_links_brand_id")
                            .from(SocialLinks::Table, SocialLinks::BrandId)
                            .to(Brands::Table, Brands::BrandId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_social_links_brand_id")
                    .table(SocialLinks::Table)
                    .col(SocialLinks::BrandId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_social_links_brand_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SocialLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SocialLinks {
    Table,
    Id,
    BrandId,
    Website,
    Twitter,
    Instagram,
    Youtube,
    Linkedin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    BrandId,
}
