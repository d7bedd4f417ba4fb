//! # Data Models
//!
//! SeaORM entities for the brand store.

pub mod brand;
pub mod newsletter;
pub mod social_links;

pub use brand::Entity as Brand;
pub use newsletter::Entity as Newsletter;
pub use social_links::Entity as SocialLinks;
