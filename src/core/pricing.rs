use crate::core::registry::{PriceUnit, SchemaRegistry};
use crate::domain::model::{usable_price, Listing};
use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub unit: PriceUnit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_plate: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PriceResolver {
    registry: Arc<SchemaRegistry>,
}

impl PriceResolver {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    /// Display price range for a listing, using its category's price unit.
    pub fn resolve(&self, listing: &Listing) -> Result<PriceRange> {
        let unit = self.registry.describe(&listing.category_key)?.price_unit;
        Self::resolve_with_unit(listing, unit).inspect_err(|e| {
            tracing::error!(
                "💥 {} listing {} has no usable price: {}",
                listing.category_key,
                listing.id,
                e
            );
        })
    }

    /// Packages win when present: the range spans their prices. Otherwise
    /// the flat price for `unit` is both ends of the range. Price filters
    /// and sorts evaluate the same `min` through `Listing::starting_price`.
    pub fn resolve_with_unit(listing: &Listing, unit: PriceUnit) -> Result<PriceRange> {
        let (min, max) = listing
            .bookable_range(unit)
            .map_err(|reason| unresolvable(listing, reason))?;

        let per_plate = listing
            .price
            .as_ref()
            .and_then(|p| p.per_plate)
            .filter(|p| usable_price(*p));

        Ok(PriceRange {
            min,
            max,
            unit,
            per_plate,
        })
    }
}

fn unresolvable(listing: &Listing, reason: String) -> CatalogError {
    CatalogError::PriceUnresolvable {
        listing_id: listing.id.clone(),
        reason,
    }
}
