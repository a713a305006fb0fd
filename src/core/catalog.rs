use crate::core::filter::FilterQueryBuilder;
use crate::core::registry::SchemaRegistry;
use crate::domain::model::{Listing, RawParams, Ratings};
use crate::domain::ports::{ConfigProvider, ListingStore};
use crate::domain::predicate::{matches_nothing, Predicate};
use crate::utils::error::{CatalogError, Result};
use futures::stream::{self, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 8;

/// Outcome of a cross-category fetch. Categories whose fetch failed are
/// named in `failed` and contribute nothing to `listings`.
#[derive(Debug, Default)]
pub struct FanOutReport {
    pub listings: Vec<Listing>,
    pub failed: Vec<String>,
}

pub struct CatalogService {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn ListingStore>,
    filters: FilterQueryBuilder,
    concurrent_requests: usize,
}

impl CatalogService {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<dyn ListingStore>) -> Self {
        Self {
            filters: FilterQueryBuilder::new(registry.clone()),
            registry,
            store,
            concurrent_requests: DEFAULT_CONCURRENT_REQUESTS,
        }
    }

    pub fn from_config<C: ConfigProvider>(
        config: &C,
        registry: Arc<SchemaRegistry>,
        store: Arc<dyn ListingStore>,
    ) -> Self {
        Self::new(registry, store).with_concurrency(config.concurrent_requests())
    }

    pub fn with_concurrency(mut self, concurrent_requests: usize) -> Self {
        self.concurrent_requests = concurrent_requests.max(1);
        self
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    pub fn filters(&self) -> &FilterQueryBuilder {
        &self.filters
    }

    pub async fn list(&self, category: &str, predicates: &[Predicate]) -> Result<Vec<Listing>> {
        self.registry.describe(category)?;
        if matches_nothing(predicates) {
            tracing::debug!("{}: filters match nothing, store not queried", category);
            return Ok(Vec::new());
        }
        let listings = self.store.list(category, predicates).await?;
        tracing::debug!("{}: {} listings matched", category, listings.len());
        Ok(tag(category, listings))
    }

    pub async fn search(&self, category: &str, params: &RawParams) -> Result<Vec<Listing>> {
        let predicates = self.filters.build(category, params)?;
        self.list(category, &predicates).await
    }

    pub async fn list_all(&self, categories: &[&str], predicates: &[Predicate]) -> Result<Vec<Listing>> {
        Ok(self.fan_out(categories, predicates).await?.listings)
    }

    pub async fn fan_out(&self, categories: &[&str], predicates: &[Predicate]) -> Result<FanOutReport> {
        let plan = categories
            .iter()
            .map(|category| (category.to_string(), predicates.to_vec()))
            .collect();
        self.execute_fan_out(plan).await
    }

    /// Like `fan_out`, but builds the predicates per category from raw
    /// params, so category-specific filters apply where they exist.
    pub async fn search_all(&self, categories: &[&str], params: &RawParams) -> Result<FanOutReport> {
        let mut plan = Vec::with_capacity(categories.len());
        for category in categories {
            plan.push((category.to_string(), self.filters.build(category, params)?));
        }
        self.execute_fan_out(plan).await
    }

    /// Fans out like `list_all` but gives up as soon as `cancel` fires.
    /// In-flight fetches are dropped and nothing partial is returned.
    pub async fn list_all_with_cancel(
        &self,
        categories: &[&str],
        predicates: &[Predicate],
        cancel: &CancellationToken,
    ) -> Result<Vec<Listing>> {
        let report = cancellable(cancel, self.fan_out(categories, predicates)).await?;
        Ok(report.listings)
    }

    async fn execute_fan_out(&self, plan: Vec<(String, Vec<Predicate>)>) -> Result<FanOutReport> {
        for (category, _) in &plan {
            self.registry.describe(category)?;
        }

        tracing::debug!(
            "Fanning out to {} categories ({} at a time)",
            plan.len(),
            self.concurrent_requests
        );

        let outcomes: Vec<(String, Result<Vec<Listing>>)> = stream::iter(plan)
            .map(|(category, predicates)| {
                let store = self.store.clone();
                async move {
                    if matches_nothing(&predicates) {
                        return (category, Ok(Vec::new()));
                    }
                    let outcome = store.list(&category, &predicates).await;
                    (category, outcome)
                }
            })
            .buffered(self.concurrent_requests)
            .collect()
            .await;

        let mut report = FanOutReport::default();
        for (category, outcome) in outcomes {
            match outcome {
                Ok(listings) => report.listings.extend(tag(&category, listings)),
                Err(e) => {
                    tracing::warn!("⚠️ {} fetch failed, skipping category: {}", category, e);
                    report.failed.push(category);
                }
            }
        }

        if !report.failed.is_empty() {
            tracing::info!(
                "Cross-category listing degraded: {} listings, failed categories: {}",
                report.listings.len(),
                report.failed.join(", ")
            );
        }
        Ok(report)
    }

    pub async fn get(&self, category: &str, id: &str) -> Result<Listing> {
        self.registry.describe(category)?;
        match self.store.get(category, id).await? {
            Some(mut listing) => {
                listing.category_key = category.to_string();
                Ok(listing)
            }
            None => Err(not_found(category, id)),
        }
    }

    pub async fn create(&self, category: &str, mut listing: Listing) -> Result<Listing> {
        self.validate_required(category, &listing)?;

        listing.category_key = category.to_string();
        if listing.id.trim().is_empty() {
            listing.id = Uuid::new_v4().to_string();
        }
        listing.ratings = Ratings::from_reviews(&listing.reviews);

        let created = self.store.insert(category, listing).await?;
        tracing::info!("Created {} listing {}", category, created.id);
        Ok(created)
    }

    pub async fn update(&self, category: &str, id: &str, mut listing: Listing) -> Result<Listing> {
        self.validate_required(category, &listing)?;

        listing.id = id.to_string();
        listing.category_key = category.to_string();

        match self.store.update(category, listing).await? {
            Some(updated) => {
                tracing::info!("Updated {} listing {}", category, id);
                Ok(updated)
            }
            None => Err(not_found(category, id)),
        }
    }

    fn validate_required(&self, category: &str, listing: &Listing) -> Result<()> {
        let missing = self.registry.describe(category)?.missing_fields(listing);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CatalogError::validation(
                missing,
                format!("{} listing is missing required fields", category),
            ))
        }
    }
}

/// Runs `work` until it finishes or `cancel` fires, whichever is first.
/// On cancellation `work` is dropped, which drops everything it was awaiting.
pub async fn cancellable<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::info!("Request cancelled by caller");
            Err(CatalogError::Cancelled)
        }
        outcome = work => outcome,
    }
}

fn tag(category: &str, listings: Vec<Listing>) -> Vec<Listing> {
    listings
        .into_iter()
        .map(|mut listing| {
            listing.category_key = category.to_string();
            listing
        })
        .collect()
}

pub(crate) fn not_found(category: &str, id: &str) -> CatalogError {
    CatalogError::NotFound {
        category: category.to_string(),
        id: id.to_string(),
    }
}
