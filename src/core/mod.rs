pub mod booking;
pub mod catalog;
pub mod engine;
pub mod filter;
pub mod pricing;
pub mod registry;
pub mod reviews;

pub use crate::domain::model::{Listing, Package, RawParams, Ratings, Review};
pub use crate::domain::ports::{ConfigProvider, ListingStore};
pub use crate::domain::predicate::Predicate;
pub use crate::utils::error::Result;
