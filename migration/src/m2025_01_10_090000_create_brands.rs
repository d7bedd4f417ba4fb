//! Migration to create the brands table.
//!
//! Brands are the deduplicated newsletter senders. Both `slug` and `domain`
//! carry unique indexes; they are what concurrent resolutions collide on.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brands::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Brands::BrandId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Brands::Name).text().not_null())
                    .col(ColumnDef::new(Brands::Slug).text().not_null())
                    .col(ColumnDef::new(Brands::Domain).text().null())
                    .col(ColumnDef::new(Brands::Description).text().null())
                    .col(ColumnDef::new(Brands::Website).text().null())
                    .col(ColumnDef::new(Brands::Logo).text().null())
                    .col(
                        ColumnDef::new(Brands::IsClaimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Brands::IsVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Brands::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Brands::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_brands_slug")
                    .table(Brands::Table)
                    .col(Brands::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // NULL domains never conflict with each other on Postgres or SQLite.
        manager
            .create_index(
                Index::create()
                    .name("idx_brands_domain")
                    .table(Brands::Table)
                    .col(Brands::Domain)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_brands_domain").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_brands_slug").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Brands::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    BrandId,
    Name,
    Slug,
    Domain,
    Description,
    Website,
    Logo,
    IsClaimed,
    IsVerified,
    CreatedAt,
    UpdatedAt,
}
