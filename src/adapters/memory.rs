use crate::domain::model::{Listing, Ratings, Review};
use crate::domain::ports::ListingStore;
use crate::domain::predicate::{apply_predicates, Predicate};
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;

/// In-process store, one collection per category key.
///
/// Writes take the collection lock, so a review append and its aggregate
/// recompute are never interleaved with another writer.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<Listing>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collections(collections: HashMap<String, Vec<Listing>>) -> Self {
        let collections = collections
            .into_iter()
            .map(|(category, listings)| {
                let listings = listings
                    .into_iter()
                    .map(|listing| normalize(&category, listing))
                    .collect();
                (category, listings)
            })
            .collect();

        Self {
            collections: RwLock::new(collections),
        }
    }

    /// Loads `{ "<categoryKey>": [listing, ...], ... }` from a JSON file.
    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(&path).await?;
        let collections: HashMap<String, Vec<Listing>> = serde_json::from_str(&content)?;
        let total: usize = collections.values().map(Vec::len).sum();
        tracing::info!(
            "📂 Loaded {} listings in {} categories from {}",
            total,
            collections.len(),
            path.as_ref().display()
        );
        Ok(Self::from_collections(collections))
    }

    pub async fn seed(&self, category: &str, listings: Vec<Listing>) {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(category.to_string()).or_default();
        collection.extend(listings.into_iter().map(|l| normalize(category, l)));
    }

    pub async fn len(&self, category: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(category).map(Vec::len).unwrap_or(0)
    }
}

// Seed data gets the same guarantees as data created through the catalog.
fn normalize(category: &str, mut listing: Listing) -> Listing {
    listing.category_key = category.to_string();
    listing.ratings = Ratings::from_reviews(&listing.reviews);
    listing
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        let snapshot = {
            let collections = self.collections.read().await;
            collections.get(category).cloned().unwrap_or_default()
        };
        Ok(apply_predicates(filters, snapshot))
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(category)
            .and_then(|listings| listings.iter().find(|l| l.id == id))
            .cloned())
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        let mut collections = self.collections.write().await;
        let collection = collections.entry(category.to_string()).or_default();
        if collection.iter().any(|l| l.id == listing.id) {
            return Err(CatalogError::validation(
                vec!["id".to_string()],
                format!("{} listing {} already exists", category, listing.id),
            ));
        }
        collection.push(listing.clone());
        tracing::debug!("Inserted {}/{}", category, listing.id);
        Ok(listing)
    }

    async fn update(&self, category: &str, mut listing: Listing) -> Result<Option<Listing>> {
        let mut collections = self.collections.write().await;
        let Some(existing) = collections
            .get_mut(category)
            .and_then(|listings| listings.iter_mut().find(|l| l.id == listing.id))
        else {
            return Ok(None);
        };

        listing.reviews = std::mem::take(&mut existing.reviews);
        listing.ratings = existing.ratings;
        *existing = listing.clone();
        tracing::debug!("Replaced {}/{}", category, listing.id);
        Ok(Some(listing))
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        let mut collections = self.collections.write().await;
        let ratings = collections
            .get_mut(category)
            .and_then(|listings| listings.iter_mut().find(|l| l.id == id))
            .map(|listing| listing.push_review(review));
        Ok(ratings)
    }
}
