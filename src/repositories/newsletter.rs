//! Newsletter repository for database operations

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use crate::models::newsletter::{self, Entity as Newsletter};

/// Request data for recording a newsletter
#[derive(Debug, Clone)]
pub struct NewNewsletter {
    pub newsletter_id: Uuid,
    pub brand_id: Uuid,
    pub sender: String,
    pub sender_slug: String,
    pub subject: String,
    pub html_url: Option<String>,
    pub top_screenshot_url: Option<String>,
    pub thumbnail_screenshot_url: Option<String>,
    pub summary: Option<String>,
}

/// Repository for newsletter database operations
pub struct NewsletterRepository<'a, C> {
    conn: &'a C,
}

impl<'a, C> NewsletterRepository<'a, C>
where
    C: ConnectionTrait,
{
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert a newsletter row
    pub async fn insert(&self, new_newsletter: NewNewsletter) -> Result<newsletter::Model, DbErr> {
        let now = Utc::now();

        let row = newsletter::ActiveModel {
            newsletter_id: Set(new_newsletter.newsletter_id),
            brand_id: Set(new_newsletter.brand_id),
            sender: Set(new_newsletter.sender),
            sender_slug: Set(new_newsletter.sender_slug),
            subject: Set(new_newsletter.subject),
            html_url: Set(new_newsletter.html_url),
            top_screenshot_url: Set(new_newsletter.top_screenshot_url),
            thumbnail_screenshot_url: Set(new_newsletter.thumbnail_screenshot_url),
            summary: Set(new_newsletter.summary),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        row.insert(self.conn).await
    }

    /// Get newsletter by ID
    pub async fn find_by_id(&self, newsletter_id: Uuid) -> Result<Option<newsletter::Model>, DbErr> {
        Newsletter::find_by_id(newsletter_id).one(self.conn).await
    }

    /// Lists a brand's newsletters, oldest first
    pub async fn find_by_brand(&self, brand_id: Uuid) -> Result<Vec<newsletter::Model>, DbErr> {
        Newsletter::find()
            .filter(newsletter::Column::BrandId.eq(brand_id))
            .order_by_asc(newsletter::Column::CreatedAt)
            .order_by_asc(newsletter::Column::NewsletterId)
            .all(self.conn)
            .await
    }
}
