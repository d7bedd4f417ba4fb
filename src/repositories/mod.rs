//! # Repository Layer
//!
//! Repository implementations that encapsulate SeaORM operations. They borrow
//! a connection rather than owning one so the same code runs inside the
//! caller's transaction.

pub mod brand;
pub mod newsletter;

pub use brand::{BrandRepository, NewBrand};
pub use newsletter::{NewNewsletter, NewsletterRepository};
