use crate::core::registry::{FieldKind, SchemaRegistry};
use crate::domain::model::{starting_price_path, RawParams, STARTING_PRICE};
use crate::domain::predicate::Predicate;
use crate::utils::error::Result;
use std::sync::Arc;

/// Turns query-string shaped params into predicates for one category.
///
/// Unknown params, blank values and unparsable numbers are dropped rather
/// than rejected. A numeric range whose lower bound exceeds its upper bound
/// collapses the whole set into `MatchNone`.
#[derive(Debug, Clone)]
pub struct FilterQueryBuilder {
    registry: Arc<SchemaRegistry>,
}

impl FilterQueryBuilder {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn build(&self, category: &str, params: &RawParams) -> Result<Vec<Predicate>> {
        let descriptor = self.registry.describe(category)?;

        for key in params.keys() {
            if descriptor.field(key).is_none() {
                tracing::debug!("Dropping unsupported filter '{}' for {}", key, category);
            }
        }

        let mut predicates = Vec::new();
        let mut ranges: Vec<(String, Option<f64>, Option<f64>)> = Vec::new();
        let mut sort = None;

        // price filters and sorts read the same price the category displays
        let unit = descriptor.price_unit;
        let resolve_path = |path: &str| {
            if path == STARTING_PRICE {
                starting_price_path(unit)
            } else {
                path.to_string()
            }
        };

        for spec in &descriptor.filterable_fields {
            let Some(raw) = params.get(&spec.param).map(|v| v.trim()) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            let path = resolve_path(&spec.path);

            match spec.kind {
                FieldKind::Equals => predicates.push(Predicate::Equals {
                    field: path,
                    value: raw.to_string(),
                }),
                FieldKind::Contains => predicates.push(Predicate::Contains {
                    field: path,
                    value: raw.to_string(),
                }),
                FieldKind::Includes => predicates.push(Predicate::Includes {
                    field: path,
                    value: raw.to_string(),
                }),
                FieldKind::Min | FieldKind::Max => {
                    let Some(bound) = parse_number(raw) else {
                        tracing::debug!("Dropping non-numeric {}='{}'", spec.param, raw);
                        continue;
                    };
                    let index = match ranges.iter().position(|(field, _, _)| *field == path) {
                        Some(index) => index,
                        None => {
                            ranges.push((path, None, None));
                            ranges.len() - 1
                        }
                    };
                    if spec.kind == FieldKind::Min {
                        ranges[index].1 = Some(bound);
                    } else {
                        ranges[index].2 = Some(bound);
                    }
                }
                FieldKind::Sort => match sort_order(raw) {
                    Some(order) => sort = Some(order),
                    None => tracing::debug!("Dropping unknown sort '{}'", raw),
                },
            }
        }

        for (field, min, max) in ranges {
            if let (Some(lo), Some(hi)) = (min, max) {
                if lo > hi {
                    tracing::debug!("Empty range on {} ({} > {}), matching nothing", field, lo, hi);
                    return Ok(vec![Predicate::MatchNone]);
                }
            }
            predicates.push(Predicate::Range { field, min, max });
        }

        if let Some((field, descending)) = sort {
            predicates.push(Predicate::Sort {
                field: resolve_path(field),
                descending,
            });
        }

        Ok(predicates)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn sort_order(raw: &str) -> Option<(&'static str, bool)> {
    match raw {
        "priceAsc" => Some((STARTING_PRICE, false)),
        "priceDesc" => Some((STARTING_PRICE, true)),
        "ratingAsc" => Some(("ratings.average", false)),
        "ratingDesc" => Some(("ratings.average", true)),
        "nameAsc" => Some(("name", false)),
        "nameDesc" => Some(("name", true)),
        _ => None,
    }
}

/// Parses `city=Kota&minPrice=5000` into raw params. Repeated keys keep the
/// last value.
pub fn params_from_query(query: &str) -> RawParams {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> FilterQueryBuilder {
        FilterQueryBuilder::new(Arc::new(SchemaRegistry::with_builtin_categories()))
    }

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unknown_params_are_dropped() {
        let predicates = builder()
            .build("hotel", &params(&[("city", "Kota"), ("foo", "bar")]))
            .unwrap();
        assert_eq!(
            predicates,
            vec![Predicate::Equals {
                field: "location.city".to_string(),
                value: "Kota".to_string(),
            }]
        );
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let predicates = builder()
            .build(
                "banquetHall",
                &params(&[("city", "Kota"), ("minPrice", "5000"), ("maxPrice", "1000")]),
            )
            .unwrap();
        assert_eq!(predicates, vec![Predicate::MatchNone]);
    }

    #[test]
    fn test_min_and_max_collapse_into_one_range() {
        let predicates = builder()
            .build(
                "banquetHall",
                &params(&[("minCapacity", "200"), ("maxCapacity", "500"), ("maxPrice", "90000")]),
            )
            .unwrap();
        assert!(predicates.contains(&Predicate::Range {
            field: "capacity.max".to_string(),
            min: Some(200.0),
            max: Some(500.0),
        }));
        assert!(predicates.contains(&Predicate::Range {
            field: "startingPrice.perDay".to_string(),
            min: None,
            max: Some(90000.0),
        }));
        assert_eq!(predicates.len(), 2);
    }

    #[test]
    fn test_blank_and_non_numeric_values_are_dropped() {
        let predicates = builder()
            .build(
                "hotel",
                &params(&[("city", "  "), ("minPrice", "cheap"), ("sort", "random")]),
            )
            .unwrap();
        assert!(predicates.is_empty());
    }

    #[test]
    fn test_category_specific_fields() {
        let predicates = builder()
            .build("caterer", &params(&[("cuisine", "Gujarati"), ("minRooms", "3")]))
            .unwrap();
        // minRooms is a hotel filter, not a caterer one
        assert_eq!(
            predicates,
            vec![Predicate::Includes {
                field: "dishVarieties".to_string(),
                value: "Gujarati".to_string(),
            }]
        );
    }

    #[test]
    fn test_sort_is_emitted_last() {
        let predicates = builder()
            .build("djBooking", &params(&[("sort", "ratingDesc"), ("city", "Udaipur")]))
            .unwrap();
        assert_eq!(
            predicates.last(),
            Some(&Predicate::Sort {
                field: "ratings.average".to_string(),
                descending: true,
            })
        );
    }

    #[test]
    fn test_price_filters_use_category_unit() {
        let predicates = builder()
            .build("propertyRental", &params(&[("maxPrice", "20000"), ("sort", "priceDesc")]))
            .unwrap();
        assert_eq!(
            predicates,
            vec![
                Predicate::Range {
                    field: "startingPrice.perMonth".to_string(),
                    min: None,
                    max: Some(20000.0),
                },
                Predicate::Sort {
                    field: "startingPrice.perMonth".to_string(),
                    descending: true,
                },
            ]
        );
    }

    #[test]
    fn test_unknown_category_fails() {
        assert!(builder().build("spaceship", &RawParams::new()).is_err());
    }

    #[test]
    fn test_params_from_query() {
        let params = params_from_query("?city=New%20Delhi&minPrice=1000&type=");
        assert_eq!(params["city"], "New Delhi");
        assert_eq!(params["minPrice"], "1000");
        assert_eq!(params["type"], "");
    }
}
