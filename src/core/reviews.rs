use crate::core::catalog::not_found;
use crate::core::registry::SchemaRegistry;
use crate::domain::model::{Ratings, Review};
use crate::domain::ports::ListingStore;
use crate::utils::error::{CatalogError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Aggregate returned after a review lands.
pub type UpdatedRatings = Ratings;

/// A review as submitted. `date` defaults to the time of submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewInput {
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl ReviewInput {
    pub fn new(user_name: &str, rating: f64, comment: &str) -> Self {
        Self {
            user_name: user_name.to_string(),
            rating,
            comment: comment.to_string(),
            date: None,
        }
    }

    fn invalid_fields(&self) -> Vec<String> {
        let mut invalid = Vec::new();
        if self.user_name.trim().is_empty() {
            invalid.push("userName".to_string());
        }
        if !(self.rating.is_finite() && (MIN_RATING..=MAX_RATING).contains(&self.rating)) {
            invalid.push("rating".to_string());
        }
        if self.comment.trim().is_empty() {
            invalid.push("comment".to_string());
        }
        invalid
    }

    fn into_review(self) -> Review {
        Review {
            user_name: self.user_name.trim().to_string(),
            rating: self.rating,
            comment: self.comment.trim().to_string(),
            date: self.date.unwrap_or_else(Utc::now),
        }
    }
}

/// Appends reviews and keeps `ratings` in step with `reviews`.
///
/// The append and the recompute happen inside the store in one step, so
/// concurrent submissions for the same listing cannot overwrite each other.
pub struct ReviewAggregator {
    registry: Arc<SchemaRegistry>,
    store: Arc<dyn ListingStore>,
}

impl ReviewAggregator {
    pub fn new(registry: Arc<SchemaRegistry>, store: Arc<dyn ListingStore>) -> Self {
        Self { registry, store }
    }

    pub async fn submit(&self, category: &str, listing_id: &str, input: ReviewInput) -> Result<UpdatedRatings> {
        self.registry.describe(category)?;

        let invalid = input.invalid_fields();
        if !invalid.is_empty() {
            return Err(CatalogError::validation(
                invalid,
                format!("rating must be between {} and {}, name and comment are required", MIN_RATING, MAX_RATING),
            ));
        }

        let review = input.into_review();
        match self.store.append_review(category, listing_id, review).await? {
            Some(ratings) => {
                tracing::info!(
                    "⭐ Review added to {}/{}: average {} over {} reviews",
                    category,
                    listing_id,
                    ratings.average,
                    ratings.count
                );
                Ok(ratings)
            }
            None => Err(not_found(category, listing_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_fields_are_all_reported() {
        let input = ReviewInput::new(" ", 5.5, "");
        assert_eq!(
            input.invalid_fields(),
            vec!["userName".to_string(), "rating".to_string(), "comment".to_string()]
        );
        assert!(ReviewInput::new("A", f64::NAN, "x").invalid_fields().contains(&"rating".to_string()));
    }

    #[test]
    fn test_bounds_and_fractions_are_accepted() {
        assert!(ReviewInput::new("A", 1.0, "ok").invalid_fields().is_empty());
        assert!(ReviewInput::new("A", 4.5, "ok").invalid_fields().is_empty());
        assert!(ReviewInput::new("A", 5.0, "ok").invalid_fields().is_empty());
        assert!(!ReviewInput::new("A", 0.5, "ok").invalid_fields().is_empty());
    }

    #[test]
    fn test_into_review_defaults_date() {
        let before = Utc::now();
        let review = ReviewInput::new(" Meera ", 4.0, " Great food ").into_review();
        assert_eq!(review.user_name, "Meera");
        assert_eq!(review.comment, "Great food");
        assert!(review.date >= before);
    }
}
