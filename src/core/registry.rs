pub use crate::domain::model::PriceUnit;

use crate::domain::model::{is_blank, value_at_path, Listing, STARTING_PRICE};
use crate::utils::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceShape {
    Flat,
    Packaged,
}

/// How a query parameter is turned into a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Equals,
    Contains,
    Includes,
    Min,
    Max,
    Sort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub param: String,
    #[serde(default)]
    pub path: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn new(param: &str, path: &str, kind: FieldKind) -> Self {
        Self {
            param: param.to_string(),
            path: path.to_string(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDescriptor {
    pub key: String,
    pub label: String,
    pub filterable_fields: Vec<FieldSpec>,
    pub price_shape: PriceShape,
    pub price_unit: PriceUnit,
    pub required_fields: Vec<String>,
}

impl SchemaDescriptor {
    /// Starts a descriptor with the filters every category supports and the
    /// baseline required fields.
    pub fn new(key: &str, label: &str, price_shape: PriceShape, price_unit: PriceUnit) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            filterable_fields: common_fields(),
            price_shape,
            price_unit,
            required_fields: vec!["name".to_string(), "location.city".to_string()],
        }
    }

    pub fn filter(mut self, param: &str, path: &str, kind: FieldKind) -> Self {
        self.add_filter(FieldSpec::new(param, path, kind));
        self
    }

    pub fn require(mut self, field: &str) -> Self {
        if !self.required_fields.iter().any(|f| f == field) {
            self.required_fields.push(field.to_string());
        }
        self
    }

    /// Later specs for the same param replace earlier ones.
    pub fn add_filter(&mut self, spec: FieldSpec) {
        self.filterable_fields.retain(|existing| existing.param != spec.param);
        self.filterable_fields.push(spec);
    }

    pub fn field(&self, param: &str) -> Option<&FieldSpec> {
        self.filterable_fields.iter().find(|f| f.param == param)
    }

    pub fn missing_fields(&self, listing: &Listing) -> Vec<String> {
        let document = listing.to_document();
        self.required_fields
            .iter()
            .filter(|path| is_blank(value_at_path(&document, path)))
            .cloned()
            .collect()
    }
}

fn common_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("city", "location.city", FieldKind::Equals),
        FieldSpec::new("area", "location.area", FieldKind::Equals),
        FieldSpec::new("q", "name", FieldKind::Contains),
        FieldSpec::new("minPrice", STARTING_PRICE, FieldKind::Min),
        FieldSpec::new("maxPrice", STARTING_PRICE, FieldKind::Max),
        FieldSpec::new("minRating", "ratings.average", FieldKind::Min),
        FieldSpec::new("amenity", "amenities", FieldKind::Includes),
        FieldSpec::new("sort", "", FieldKind::Sort),
    ]
}

/// Category key -> schema. Everything category specific the engine needs is
/// read from here.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    categories: HashMap<String, SchemaDescriptor>,
}

impl SchemaRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_builtin_categories() -> Self {
        let mut registry = Self::empty();
        for descriptor in builtin_categories() {
            registry.register(descriptor);
        }
        registry
    }

    /// Inserts or replaces a category; returns the replaced descriptor.
    pub fn register(&mut self, descriptor: SchemaDescriptor) -> Option<SchemaDescriptor> {
        tracing::debug!("Registering category '{}'", descriptor.key);
        self.categories.insert(descriptor.key.clone(), descriptor)
    }

    pub fn describe(&self, key: &str) -> Result<&SchemaDescriptor> {
        self.categories
            .get(key)
            .ok_or_else(|| CatalogError::UnknownCategory {
                key: key.to_string(),
            })
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.categories.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn builtin_categories() -> Vec<SchemaDescriptor> {
    use FieldKind::*;
    use PriceShape::*;
    use PriceUnit::*;

    vec![
        SchemaDescriptor::new("banquetHall", "Banquet Hall", Packaged, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .filter("type", "type", Equals)
            .require("capacity"),
        SchemaDescriptor::new("marriageGarden", "Marriage Garden", Packaged, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .filter("type", "type", Equals)
            .require("capacity"),
        SchemaDescriptor::new("partyLawn", "Party Lawn", Packaged, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max),
        SchemaDescriptor::new("hotel", "Hotel", Flat, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .filter("minRooms", "rooms", Min)
            .filter("type", "type", Equals)
            .require("price.perDay"),
        SchemaDescriptor::new("resort", "Resort", Packaged, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .filter("minRooms", "rooms", Min),
        SchemaDescriptor::new("farmHouse", "Farm House", Flat, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .require("price.perDay"),
        SchemaDescriptor::new("tentHouse", "Tent House", Flat, PerDay)
            .filter("minCapacity", "capacity.max", Min)
            .filter("maxCapacity", "capacity.max", Max)
            .require("price.perDay"),
        SchemaDescriptor::new("djBooking", "DJ", Packaged, PerDay)
            .filter("type", "type", Equals)
            .filter("genre", "genres", Includes),
        SchemaDescriptor::new("caterer", "Caterer", Packaged, PerDay)
            .filter("cuisine", "dishVarieties", Includes)
            .filter("type", "type", Equals)
            .filter("minPlates", "minimumPlates", Min),
        SchemaDescriptor::new("mehndiArtist", "Mehndi Artist", Packaged, PerDay)
            .filter("style", "styles", Includes),
        SchemaDescriptor::new("makeupArtist", "Makeup Artist", Packaged, PerDay)
            .filter("style", "styles", Includes),
        SchemaDescriptor::new("photographer", "Photographer", Packaged, PerDay)
            .filter("specialization", "specializations", Includes),
        SchemaDescriptor::new("bandBaja", "Band Baja", Packaged, PerDay)
            .filter("minTeamSize", "teamSize", Min),
        SchemaDescriptor::new("horseBaggi", "Horse & Baggi", Flat, PerDay)
            .filter("type", "type", Equals)
            .require("price.perDay"),
        SchemaDescriptor::new("carRental", "Car Rental", Flat, PerDay)
            .filter("minFleetSize", "fleetSize", Min)
            .filter("vehicleType", "vehicleTypes", Includes)
            .require("price.perDay")
            .require("fleetSize"),
        SchemaDescriptor::new("propertyRental", "Property Rental", Flat, PerMonth)
            .filter("minRooms", "rooms", Min)
            .filter("type", "type", Equals)
            .filter("furnishing", "furnishing", Equals)
            .require("price.perMonth"),
    ]
}
