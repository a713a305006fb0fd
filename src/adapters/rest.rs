use crate::domain::model::{Listing, Ratings, Review};
use crate::domain::ports::{ConfigProvider, ListingStore};
use crate::domain::predicate::Predicate;
use crate::utils::error::{CatalogError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    filters: &'a [Predicate],
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Store backed by a remote listing service.
///
/// Review appends are delegated to `POST /{category}/{id}/reviews`; the
/// service pushes the review and recomputes the aggregate on its side.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: Url,
}

impl RestStore {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| CatalogError::InvalidConfigValueError {
            field: "store.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidConfigValueError {
                field: "store.base_url".to_string(),
                value: base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let base_url = config
            .store_base_url()
            .ok_or_else(|| CatalogError::MissingConfigError {
                field: "store.base_url".to_string(),
            })?;
        Self::with_timeout(base_url, config.request_timeout())
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn read<T: DeserializeOwned>(category: &str, response: Response) -> Result<Option<T>> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::store(
                category,
                format!("HTTP {}: {}", status, body.trim()),
            ));
        }
        let envelope: Envelope<T> = response.json().await?;
        Ok(Some(envelope.data))
    }

    async fn read_required<T: DeserializeOwned>(category: &str, response: Response) -> Result<T> {
        let status = response.status();
        Self::read(category, response)
            .await?
            .ok_or_else(|| CatalogError::store(category, format!("HTTP {}", status)))
    }
}

#[async_trait]
impl ListingStore for RestStore {
    async fn list(&self, category: &str, filters: &[Predicate]) -> Result<Vec<Listing>> {
        let url = self.endpoint(&[category, "search"]);
        tracing::debug!("POST {} with {} filters", url, filters.len());
        let response = self
            .client
            .post(url)
            .json(&SearchRequest { filters })
            .send()
            .await?;
        Self::read_required(category, response).await
    }

    async fn get(&self, category: &str, id: &str) -> Result<Option<Listing>> {
        let url = self.endpoint(&[category, id]);
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        Self::read(category, response).await
    }

    async fn insert(&self, category: &str, listing: Listing) -> Result<Listing> {
        let url = self.endpoint(&[category]);
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&listing).send().await?;
        Self::read_required(category, response).await
    }

    async fn update(&self, category: &str, listing: Listing) -> Result<Option<Listing>> {
        let url = self.endpoint(&[category, &listing.id]);
        tracing::debug!("PUT {}", url);
        let response = self.client.put(url).json(&listing).send().await?;
        Self::read(category, response).await
    }

    async fn append_review(&self, category: &str, id: &str, review: Review) -> Result<Option<Ratings>> {
        let url = self.endpoint(&[category, id, "reviews"]);
        tracing::debug!("POST {}", url);
        let response = self.client.post(url).json(&review).send().await?;
        Self::read(category, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_and_escapes_segments() {
        let store = RestStore::new("http://localhost:9000/api/").unwrap();
        assert_eq!(
            store.endpoint(&["banquetHall", "search"]).as_str(),
            "http://localhost:9000/api/banquetHall/search"
        );
        assert_eq!(
            store.endpoint(&["hotel", "a b/c"]).as_str(),
            "http://localhost:9000/api/hotel/a%20b%2Fc"
        );
    }

    #[test]
    fn test_rejects_non_base_url() {
        assert!(RestStore::new("mailto:vendor@example.com").is_err());
        assert!(RestStore::new("not a url").is_err());
    }
}
