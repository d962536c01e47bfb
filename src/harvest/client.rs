//! HTTP implementation of `TimelineSource`
//!
//! # Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | Profile lookup | `GET {base}/users/by/username/{entity}` |
//! | Content page | `GET {base}/users/{id}/{tweets,highlights}?count=N&cursor=C` |
//!
//! # Status Mapping
//!
//! | Response | Result |
//! |----------|--------|
//! | 2xx | Body decoded; shape mismatch → `Decode` |
//! | 429, 420 | `RateLimited` |
//! | 404 | `NotFound` |
//! | 403 | `Suspended` |
//! | Other 4xx | `Unavailable` |
//! | 5xx, timeout, connection failure | `Transport` |

use crate::config::{secs, ApiConfig};
use crate::harvest::source::{ApiError, TimelineSource};
use crate::records::{Category, Page, RawProfile};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// API client backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client, reading the bearer token from the configured
    /// environment variable
    ///
    /// A missing token is not an error; requests are then sent unauthenticated.
    pub fn new(config: &ApiConfig) -> Result<Self, HarvestError> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|token| !token.is_empty());
        if token.is_none() {
            tracing::warn!(
                "No API token found in ${}, sending unauthenticated requests",
                config.token_env
            );
        }
        Self::with_token(config, token.as_deref())
    }

    /// Creates a client with an explicit bearer token
    pub fn with_token(config: &ApiConfig, token: Option<&str>) -> Result<Self, HarvestError> {
        let base = Url::parse(&config.base_url)?;
        if base.cannot_be_a_base() {
            return Err(HarvestError::Precondition(format!(
                "API base URL cannot be a base: {}",
                base
            )));
        }

        Ok(Self {
            client: build_http_client(config, token)?,
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("invalid base URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, what: &str) -> Result<T, ApiError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(transport_error)?;
        decode(response, what).await
    }
}

#[async_trait]
impl TimelineSource for ApiClient {
    async fn fetch_profile(&self, entity: &str) -> Result<RawProfile, ApiError> {
        let url = self.endpoint(&["users", "by", "username", entity])?;
        self.get(url, &format!("profile {}", entity)).await
    }

    async fn fetch_page(
        &self,
        entity_id: &str,
        category: Category,
        page_size: usize,
        cursor: Option<&str>,
    ) -> Result<Page, ApiError> {
        if !category.is_paginated() {
            return Err(ApiError::Unavailable(format!(
                "{} is not a paginated category",
                category
            )));
        }

        let mut url = self.endpoint(&["users", entity_id, category.as_str()])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &page_size.to_string());
            if let Some(cursor) = cursor {
                query.append_pair("cursor", cursor);
            }
        }

        self.get(url, &format!("{} page for {}", category, entity_id))
            .await
    }
}

/// Builds the HTTP client used for all API requests
///
/// # Arguments
///
/// * `config` - API connection settings
/// * `token` - Optional bearer token sent as `Authorization`
pub fn build_http_client(config: &ApiConfig, token: Option<&str>) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HarvestError::Precondition(format!("invalid API token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let client = Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(secs(config.request_timeout))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

/// Maps a non-success HTTP status onto an `ApiError`
pub fn classify_status(status: StatusCode, what: &str) -> ApiError {
    match status.as_u16() {
        420 | 429 => ApiError::RateLimited,
        404 => ApiError::NotFound(what.to_string()),
        403 => ApiError::Suspended(format!("{} (HTTP 403)", what)),
        400..=499 => ApiError::Unavailable(format!("{} (HTTP {})", what, status.as_u16())),
        _ => ApiError::Transport(format!("{} (HTTP {})", what, status.as_u16())),
    }
}

async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(classify_status(status, what));
    }

    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(|e| ApiError::Decode(format!("{}: {}", what, e)))
}

fn transport_error(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Transport(format!("request timed out: {}", e))
    } else if e.is_connect() {
        ApiError::Transport(format!("connection failed: {}", e))
    } else {
        ApiError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "x"),
            ApiError::RateLimited
        );
        assert_eq!(
            classify_status(StatusCode::from_u16(420).unwrap(), "x"),
            ApiError::RateLimited
        );
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "x"),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "x"),
            ApiError::Suspended(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::GONE, "x"),
            ApiError::Unavailable(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, "x"),
            ApiError::Transport(_)
        ));
    }

    #[test]
    fn test_endpoint_building() {
        let client = ApiClient::with_token(&ApiConfig::new("https://api.example.com/v2/"), None)
            .unwrap();

        let url = client.endpoint(&["users", "by", "username", "alice"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v2/users/by/username/alice"
        );

        // Segments are percent-encoded, never interpreted as path structure
        let url = client.endpoint(&["users", "a/b", "tweets"]).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v2/users/a%2Fb/tweets");
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = ApiClient::with_token(&ApiConfig::new("mailto:someone@example.com"), None);
        assert!(matches!(result, Err(HarvestError::Precondition(_))));
    }

    #[test]
    fn test_build_client_with_token() {
        let config = ApiConfig::new("https://api.example.com");
        assert!(build_http_client(&config, Some("secret")).is_ok());
        assert!(build_http_client(&config, Some("bad\ntoken")).is_err());
    }
}
