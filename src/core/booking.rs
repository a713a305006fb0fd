use crate::core::catalog::CatalogService;
use crate::core::pricing::{PriceRange, PriceResolver};
use crate::core::registry::PriceShape;
use crate::domain::model::Package;
use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookingFlow {
    FlatReservation,
    PackageSelection,
}

impl From<PriceShape> for BookingFlow {
    fn from(shape: PriceShape) -> Self {
        match shape {
            PriceShape::Flat => Self::FlatReservation,
            PriceShape::Packaged => Self::PackageSelection,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum PriceDisplay {
    Available { range: PriceRange },
    Unavailable,
}

/// Everything a booking form needs to decide which control to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingIntent {
    pub category_key: String,
    pub listing_id: String,
    pub flow: BookingFlow,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    pub price: PriceDisplay,
}

pub struct BookingDispatcher {
    catalog: Arc<CatalogService>,
    prices: PriceResolver,
}

impl BookingDispatcher {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self {
            prices: PriceResolver::new(catalog.registry().clone()),
            catalog,
        }
    }

    pub fn resolve_booking_flow(&self, category: &str) -> Result<BookingFlow> {
        Ok(self.catalog.registry().describe(category)?.price_shape.into())
    }

    pub async fn intent(&self, category: &str, listing_id: &str) -> Result<BookingIntent> {
        let flow = self.resolve_booking_flow(category)?;
        let listing = self.catalog.get(category, listing_id).await?;

        let price = match self.prices.resolve(&listing) {
            Ok(range) => PriceDisplay::Available { range },
            Err(CatalogError::PriceUnresolvable { .. }) => PriceDisplay::Unavailable,
            Err(e) => return Err(e),
        };

        let packages = match flow {
            BookingFlow::PackageSelection => listing.packages,
            BookingFlow::FlatReservation => Vec::new(),
        };

        Ok(BookingIntent {
            category_key: category.to_string(),
            listing_id: listing.id,
            flow,
            packages,
            price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flow_follows_price_shape() {
        assert_eq!(BookingFlow::from(PriceShape::Flat), BookingFlow::FlatReservation);
        assert_eq!(BookingFlow::from(PriceShape::Packaged), BookingFlow::PackageSelection);
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(BookingFlow::PackageSelection).unwrap(),
            json!("package-selection")
        );
        assert_eq!(
            serde_json::to_value(PriceDisplay::Unavailable).unwrap(),
            json!({"status": "unavailable"})
        );
    }
}
