//! Migration to create the newsletters table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Newsletters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Newsletters::NewsletterId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Newsletters::BrandId).uuid().not_null())
                    .col(ColumnDef::new(Newsletters::Sender).text().not_null())
                    .col(ColumnDef::new(Newsletters::SenderSlug).text().not_null())
                    .col(ColumnDef::new(Newsletters::Subject).text().not_null())
                    .col(ColumnDef::new(Newsletters::HtmlUrl).text().null())
                    .col(ColumnDef::new(Newsletters::TopScreenshotUrl).text().null())
                    .col(
                        ColumnDef::new(Newsletters::ThumbnailScreenshotUrl)
                            .text()
                            .null(),
                    )
                    .col(ColumnDef::new(Newsletters::Summary).text().null())
                    .col(
                        ColumnDef::new(Newsletters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Newsletters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_newsletters_brand_id")
                            .from(Newsletters::Table, Newsletters::BrandId)
                            .to(Brands::Table, Brands::BrandId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_newsletters_brand_id")
                    .table(Newsletters::Table)
                    .col(Newsletters::BrandId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_newsletters_brand_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Newsletters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Newsletters {
    Table,
    NewsletterId,
    BrandId,
    Sender,
    SenderSlug,
    Subject,
    HtmlUrl,
    TopScreenshotUrl,
    ThumbnailScreenshotUrl,
    Summary,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brands {
    Table,
    BrandId,
}
