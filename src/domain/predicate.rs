use crate::domain::model::Listing;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A normalized filter condition. Predicates are plain data so they can be
/// shipped to a remote store as-is; `matches` is the in-process evaluation.
///
/// Text comparison is always case-insensitive: `equals` compares the trimmed
/// value exactly, `contains` is a substring match, `includes` checks
/// membership in an array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Predicate {
    Equals {
        field: String,
        value: String,
    },
    Contains {
        field: String,
        value: String,
    },
    Includes {
        field: String,
        value: String,
    },
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Sort {
        field: String,
        descending: bool,
    },
    MatchNone,
}

impl Predicate {
    pub fn matches(&self, listing: &Listing, document: &Value) -> bool {
        match self {
            Self::Equals { field, value } => {
                let wanted = normalize(value);
                scalars(listing.field(document, field))
                    .iter()
                    .any(|candidate| normalize(candidate) == wanted)
            }
            Self::Contains { field, value } => {
                let wanted = normalize(value);
                scalars(listing.field(document, field))
                    .iter()
                    .any(|candidate| normalize(candidate).contains(&wanted))
            }
            Self::Includes { field, value } => {
                let wanted = normalize(value);
                match listing.field(document, field) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(scalar_text)
                        .any(|candidate| normalize(&candidate) == wanted),
                    other => scalars(other)
                        .iter()
                        .any(|candidate| normalize(candidate) == wanted),
                }
            }
            Self::Range { field, min, max } => {
                match listing.field(document, field).as_ref().and_then(number) {
                    Some(n) => min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi),
                    None => false,
                }
            }
            Self::Sort { .. } => true,
            Self::MatchNone => false,
        }
    }
}

/// True when the set can match no listing at all, so no store needs asking.
pub fn matches_nothing(predicates: &[Predicate]) -> bool {
    predicates.iter().any(|p| matches!(p, Predicate::MatchNone))
}

/// Filters `listings` through every predicate (AND) and applies the last
/// sort predicate, if any. Without a sort the input order is kept.
pub fn apply_predicates(predicates: &[Predicate], listings: Vec<Listing>) -> Vec<Listing> {
    if matches_nothing(predicates) {
        return Vec::new();
    }

    let mut kept: Vec<(Listing, Value)> = listings
        .into_iter()
        .map(|listing| {
            let document = listing.to_document();
            (listing, document)
        })
        .filter(|(listing, document)| predicates.iter().all(|p| p.matches(listing, document)))
        .collect();

    let sort = predicates.iter().rev().find_map(|p| match p {
        Predicate::Sort { field, descending } => Some((field.as_str(), *descending)),
        _ => None,
    });

    if let Some((field, descending)) = sort {
        kept.sort_by(|(a, a_doc), (b, b_doc)| {
            compare_fields(a.field(a_doc, field), b.field(b_doc, field), descending)
        });
    }

    kept.into_iter().map(|(listing, _)| listing).collect()
}

// Missing values always sort last, whatever the direction.
fn compare_fields(a: Option<Value>, b: Option<Value>, descending: bool) -> Ordering {
    let (a, b) = match (a, b) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Greater,
        (Some(_), None) => return Ordering::Less,
        (Some(a), Some(b)) => (a, b),
    };

    let ordering = match (number(&a), number(&b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => {
            let x = scalar_text(&a).map(|s| normalize(&s)).unwrap_or_default();
            let y = scalar_text(&b).map(|s| normalize(&s)).unwrap_or_default();
            x.cmp(&y)
        }
    };

    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalars(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
