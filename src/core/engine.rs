use crate::core::booking::BookingDispatcher;
use crate::core::catalog::CatalogService;
use crate::core::filter::FilterQueryBuilder;
use crate::core::pricing::PriceResolver;
use crate::core::registry::SchemaRegistry;
use crate::core::reviews::ReviewAggregator;
use crate::domain::ports::{ConfigProvider, ListingStore};
use std::sync::Arc;

/// Wires the registry and one store into every catalog component.
///
/// Holds no request state; identity travels with each call.
pub struct CatalogEngine {
    registry: Arc<SchemaRegistry>,
    catalog: Arc<CatalogService>,
    prices: PriceResolver,
    reviews: ReviewAggregator,
    booking: BookingDispatcher,
}

impl CatalogEngine {
    pub fn new(registry: SchemaRegistry, store: Arc<dyn ListingStore>) -> Self {
        let registry = Arc::new(registry);
        let catalog = CatalogService::new(registry.clone(), store);
        Self::assemble(registry, catalog)
    }

    pub fn from_config<C: ConfigProvider>(
        config: &C,
        registry: SchemaRegistry,
        store: Arc<dyn ListingStore>,
    ) -> Self {
        let registry = Arc::new(registry);
        let catalog = CatalogService::from_config(config, registry.clone(), store);
        Self::assemble(registry, catalog)
    }

    fn assemble(registry: Arc<SchemaRegistry>, catalog: CatalogService) -> Self {
        let catalog = Arc::new(catalog);
        tracing::debug!("Catalog engine ready with {} categories", registry.len());
        Self {
            prices: PriceResolver::new(registry.clone()),
            reviews: ReviewAggregator::new(registry.clone(), catalog.store().clone()),
            booking: BookingDispatcher::new(catalog.clone()),
            registry,
            catalog,
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn filters(&self) -> &FilterQueryBuilder {
        self.catalog.filters()
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    pub fn prices(&self) -> &PriceResolver {
        &self.prices
    }

    pub fn reviews(&self) -> &ReviewAggregator {
        &self.reviews
    }

    pub fn booking(&self) -> &BookingDispatcher {
        &self.booking
    }
}
