use crate::domain::model::{Listing, Ratings, Review};
use crate::domain::predicate::Predicate;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Backing store: one logical collection per category key.
///
/// `append_review` must push the review and recompute the aggregate as one
/// atomic step on the store side. Implementations return `Ok(None)` when the
/// listing does not exist.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>>;
    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>>;
    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing>;
    /// Replaces everything except `reviews` and `ratings`, which stay as stored.
    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>>;
    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>>;
}

pub trait ConfigProvider: Send + Sync {
    fn store_base_url(&self) -> Option<&str>;
    fn seed_file(&self) -> Option<&str>;
    fn concurrent_requests(&self) -> usize;
    fn request_timeout(&self) -> Duration;
}
