//! Database migrations for the newsletter brand store.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_01_10_090000_create_brands;
mod m2025_01_10_090100_create_social_links;
mod m2025_01_10_090200_create_newsletters;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_01_10_090000_create_brands::Migration),
            Box::new(m2025_01_10_090100_create_social_links::Migration),
            Box::new(m2025_01_10_090200_create_newsletters::Migration),
        ]
    }
}
