#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;
use venue_catalog::{
    CatalogError, FlatPrice, InMemoryStore, Listing, ListingStore, Package, Predicate, Ratings,
    Result, Review,
};

pub fn review(user: &str, rating: f64) -> Review {
    Review {
        user_name: user.to_string(),
        rating,
        comment: "Nice place".to_string(),
        date: Utc::now(),
    }
}

pub fn package(name: &str, price: f64) -> Package {
    Package {
        name: name.to_string(),
        price,
        ..Package::default()
    }
}

pub fn banquet_hall(id: &str, name: &str, city: &str, capacity: u32, prices: &[f64]) -> Listing {
    let mut listing = Listing::new(id, "banquetHall", name)
        .with_city(city)
        .with_attribute("capacity", json!({ "min": 50, "max": capacity }));
    listing.packages = prices
        .iter()
        .enumerate()
        .map(|(i, price)| package(&format!("Package {}", i + 1), *price))
        .collect();
    listing
}

pub fn hotel(id: &str, name: &str, city: &str, per_day: f64) -> Listing {
    let mut listing = Listing::new(id, "hotel", name)
        .with_city(city)
        .with_attribute("rooms", json!(40));
    listing.price = Some(FlatPrice {
        per_day: Some(per_day),
        ..FlatPrice::default()
    });
    listing
}

pub fn dj(id: &str, name: &str, city: &str) -> Listing {
    Listing::new(id, "djBooking", name)
        .with_city(city)
        .with_attribute("genres", json!(["Bollywood", "Punjabi"]))
}

/// Kota and Jaipur listings across three categories.
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new();
    store
        .seed(
            "banquetHall",
            vec![
                banquet_hall("b1", "Royal Palace", "Kota", 500, &[80000.0, 120000.0]),
                banquet_hall("b2", "Shagun Hall", "Kota", 200, &[45000.0]),
                banquet_hall("b3", "Pink City Banquet", "Jaipur", 800, &[150000.0]),
            ],
        )
        .await;
    store
        .seed(
            "hotel",
            vec![
                hotel("h1", "Hotel Chambal", "Kota", 3500.0),
                hotel("h2", "Amer View", "Jaipur", 6000.0),
            ],
        )
        .await;

    let mut reviewed = dj("d1", "DJ Rocky", "Kota");
    reviewed.reviews = vec![review("Asha", 5.0), review("Vikram", 4.0)];
    store.seed("djBooking", vec![reviewed, dj("d2", "DJ Beats", "Jaipur")]).await;

    Arc::new(store)
}

/// Delegates to an inner store but fails `list` for selected categories.
pub struct FlakyStore {
    pub inner: Arc<dyn ListingStore>,
    pub failing: HashSet<String>,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn ListingStore>, failing: &[&str]) -> Self {
        Self {
            inner,
            failing: failing.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ListingStore for FlakyStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        if self.failing.contains(category) {
            return Err(CatalogError::store(category, "connection reset"));
        }
        self.inner.list(category, filters).await
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        self.inner.get(category, id).await
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        self.inner.insert(category, listing).await
    }

    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>> {
        self.inner.update(category, listing).await
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        self.inner.append_review(category, id, review).await
    }
}

/// `list` never completes for the selected categories.
pub struct HangingStore {
    pub inner: Arc<dyn ListingStore>,
    pub hanging: HashSet<String>,
}

impl HangingStore {
    pub fn new(inner: Arc<dyn ListingStore>, hanging: &[&str]) -> Self {
        Self {
            inner,
            hanging: hanging.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ListingStore for HangingStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        if self.hanging.contains(category) {
            futures::future::pending::<()>().await;
        }
        self.inner.list(category, filters).await
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        self.inner.get(category, id).await
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        self.inner.insert(category, listing).await
    }

    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>> {
        self.inner.update(category, listing).await
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        self.inner.append_review(category, id, review).await
    }
}

/// `list` blocks until `parties` calls are waiting at once, so it only
/// completes when that many fetches are in flight together.
pub struct BarrierStore {
    pub inner: Arc<dyn ListingStore>,
    pub barrier: Barrier,
}

impl BarrierStore {
    pub fn new(inner: Arc<dyn ListingStore>, parties: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl ListingStore for BarrierStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        self.barrier.wait().await;
        self.inner.list(category, filters).await
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        self.inner.get(category, id).await
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        self.inner.insert(category, listing).await
    }

    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>> {
        self.inner.update(category, listing).await
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        self.inner.append_review(category, id, review).await
    }
}

/// Every `list` takes `latency`; records the most calls seen in flight.
pub struct SlowStore {
    pub inner: Arc<dyn ListingStore>,
    pub latency: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
}

impl SlowStore {
    pub fn new(inner: Arc<dyn ListingStore>, latency: Duration) -> Self {
        Self {
            inner,
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ListingStore for SlowStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.inner.list(category, filters).await
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        self.inner.get(category, id).await
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        self.inner.insert(category, listing).await
    }

    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>> {
        self.inner.update(category, listing).await
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        self.inner.append_review(category, id, review).await
    }
}
