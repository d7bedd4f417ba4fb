//! Test utilities for database testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations for testing purposes, plus brand fixtures.

use anyhow::Result;
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use newsletter_brands::models::brand;
use newsletter_brands::repositories::BrandRepository;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, Set, Statement};
use std::sync::Arc;
use uuid::Uuid;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// Foreign keys stay enforced so orphaned social links or newsletters fail
/// the same way they would on Postgres.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = ON".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Sets up an in-memory SQLite database with all migrations applied and returns an Arc.
#[allow(dead_code)]
pub async fn setup_test_db_arc() -> Result<Arc<DatabaseConnection>> {
    let db = setup_test_db().await?;
    Ok(Arc::new(db))
}

/// Inserts a brand row directly, bypassing the resolver.
///
/// `age_secs` backdates `created_at` so suffix-match ordering is
/// deterministic regardless of clock resolution.
#[allow(dead_code)]
pub async fn insert_brand(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    domain: Option<&str>,
    age_secs: i64,
) -> Result<brand::Model> {
    let created_at = Utc::now() - Duration::seconds(age_secs);

    let model = brand::ActiveModel {
        brand_id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        domain: Set(domain.map(str::to_string)),
        description: Set(None),
        website: Set(None),
        logo: Set(None),
        is_claimed: Set(false),
        is_verified: Set(false),
        created_at: Set(created_at.into()),
        updated_at: Set(created_at.into()),
    }
    .insert(db)
    .await?;

    Ok(model)
}

/// Number of brand rows currently stored.
#[allow(dead_code)]
pub async fn brand_count(db: &DatabaseConnection) -> Result<u64> {
    Ok(BrandRepository::new(db).count().await?)
}

/// Number of social links rows currently stored.
#[allow(dead_code)]
pub async fn social_links_count(db: &DatabaseConnection) -> Result<u64> {
    use newsletter_brands::models::SocialLinks;
    use sea_orm::{EntityTrait, PaginatorTrait};

    Ok(SocialLinks::find().count(db).await?)
}
