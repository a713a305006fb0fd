use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Query-string shaped filter input, e.g. `city=Kota&minPrice=5000`.
pub type RawParams = HashMap<String, String>;

/// Virtual path of the lowest bookable price. A unit suffix
/// (`startingPrice.perMonth`) picks the flat price; the bare path means `perDay`.
pub const STARTING_PRICE: &str = "startingPrice";

/// Billing period of a flat price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceUnit {
    #[default]
    PerDay,
    PerMonth,
}

pub fn starting_price_path(unit: PriceUnit) -> String {
    match unit {
        PriceUnit::PerDay => format!("{}.perDay", STARTING_PRICE),
        PriceUnit::PerMonth => format!("{}.perMonth", STARTING_PRICE),
    }
}

fn starting_price_unit(path: &str) -> Option<PriceUnit> {
    match path.strip_prefix(STARTING_PRICE)? {
        "" | ".perDay" => Some(PriceUnit::PerDay),
        ".perMonth" => Some(PriceUnit::PerMonth),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub average: f64,
    pub count: u32,
}

impl Ratings {
    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let sum: f64 = reviews.iter().map(|r| r.rating).sum();
        Self {
            average: round_one_decimal(sum / reviews.len() as f64),
            count: reviews.len() as u32,
        }
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatPrice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_plate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_month: Option<f64>,
}

/// A vendor-authored entry in one category.
///
/// The shared fields are typed; anything category specific (`capacity`,
/// `rooms`, `fleetSize`, `dishVarieties`, ...) stays in `attributes` and is
/// flattened into the same JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub category_key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub main_image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub ratings: Ratings,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub packages: Vec<Package>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<FlatPrice>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Listing {
    pub fn new(id: impl Into<String>, category_key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            category_key: category_key.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.location.city = city.to_string();
        self
    }

    pub fn with_attribute(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Appends a review and recomputes the aggregate from the full list.
    pub fn push_review(&mut self, review: Review) -> Ratings {
        self.reviews.push(review);
        self.ratings = Ratings::from_reviews(&self.reviews);
        self.ratings
    }

    /// `(min, max)` the listing can be booked for. Packages win when present
    /// and every package price must be usable; otherwise the flat price for
    /// `unit` is both ends. `Err` carries the reason no price exists.
    pub fn bookable_range(&self, unit: PriceUnit) -> Result<(f64, f64), String> {
        if !self.packages.is_empty() {
            if let Some(bad) = self.packages.iter().find(|p| !usable_price(p.price)) {
                return Err(format!("package '{}' has invalid price {}", bad.name, bad.price));
            }
            return Ok(self
                .packages
                .iter()
                .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.price), hi.max(p.price))));
        }

        let flat = self.price.as_ref().and_then(|p| match unit {
            PriceUnit::PerDay => p.per_day,
            PriceUnit::PerMonth => p.per_month,
        });
        match flat {
            Some(price) if usable_price(price) => Ok((price, price)),
            Some(price) => Err(format!("invalid flat price {}", price)),
            None => Err("no packages and no flat price".to_string()),
        }
    }

    /// Lowest bookable price, used for price filters and sorting.
    pub fn starting_price(&self, unit: PriceUnit) -> Option<f64> {
        self.bookable_range(unit).ok().map(|(min, _)| min)
    }

    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Resolves a dotted path against the listing document. The computed
    /// `startingPrice` path is answered without touching the document.
    pub fn field(&self, document: &Value, path: &str) -> Option<Value> {
        if let Some(unit) = starting_price_unit(path) {
            return self.starting_price(unit).map(Value::from);
        }
        value_at_path(document, path).cloned()
    }
}

pub fn usable_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}

pub fn value_at_path<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(document, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

/// `null`, blank strings and empty collections all count as absent.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// Typed form of the common filters. Anything else rides along in
/// `category_specific_fields` and is interpreted by the category schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRequest {
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_capacity: Option<u32>,
    pub max_capacity: Option<u32>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(flatten)]
    pub category_specific_fields: HashMap<String, String>,
}

impl FilterRequest {
    pub fn into_params(self) -> RawParams {
        let mut params = self.category_specific_fields;
        let mut put = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                params.insert(key.to_string(), value);
            }
        };
        put("city", self.city);
        put("minPrice", self.min_price.map(|v| v.to_string()));
        put("maxPrice", self.max_price.map(|v| v.to_string()));
        put("minCapacity", self.min_capacity.map(|v| v.to_string()));
        put("maxCapacity", self.max_capacity.map(|v| v.to_string()));
        put("type", self.kind);
        params
    }
}
