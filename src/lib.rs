pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{memory::InMemoryStore, rest::RestStore};
pub use config::toml_config::CatalogConfig;
pub use core::{
    booking::{BookingDispatcher, BookingFlow, BookingIntent, PriceDisplay},
    catalog::{CatalogService, FanOutReport},
    engine::CatalogEngine,
    filter::{params_from_query, FilterQueryBuilder},
    pricing::{PriceRange, PriceResolver},
    registry::{FieldKind, FieldSpec, PriceShape, PriceUnit, SchemaDescriptor, SchemaRegistry},
    reviews::{ReviewAggregator, ReviewInput, UpdatedRatings},
};
pub use domain::model::{
    round_one_decimal, FilterRequest, FlatPrice, Listing, Location, Package, RawParams, Ratings, Review,
};
pub use domain::ports::{ConfigProvider, ListingStore};
pub use domain::predicate::Predicate;
pub use utils::error::{CatalogError, Result};
