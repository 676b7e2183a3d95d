//! Transport client for the screening API.
//!
//! Issues rate-limited, optionally authenticated GET requests and maps
//! HTTP/network failures into the crate error taxonomy. Adjacency fetches
//! are best-effort: any failure there degrades to an empty list.

mod pacer;

pub use pacer::RequestPacer;

use crate::config::Config;
use crate::error::{Result, WatchlinkError};
use crate::model::{AdjacentResponse, Entity, ResultsWrapper, SearchResponse};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use url::Url;

/// Read-only view of the upstream entity store consumed by the relationship
/// modules. Tests drive aggregation with an in-memory implementation.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one entity record. Failure here is fatal to the caller.
    async fn get_entity(&self, id: &str) -> Result<Entity>;

    /// Fetch the adjacency listing for an entity, flattened across property
    /// groups. Best-effort: failures yield an empty list, never an error.
    async fn get_adjacent(&self, id: &str) -> Vec<Entity>;
}

/// Query parameters for `GET /search/{scope}`.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: String,
    pub schema: Option<String>,
    pub dataset: Option<String>,
    pub topics: Option<String>,
    pub countries: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// HTTP client for the screening API.
///
/// All requests pass through a shared pacer enforcing the configured minimum
/// inter-request spacing. The API key is re-read from its cell on every
/// request, so a key swapped mid-session affects subsequent requests only.
///
/// # Panics
///
/// `new` panics if the underlying HTTP client cannot be created (should not
/// happen in normal operation).
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    scope: String,
    adjacent_limit: u32,
    api_key: RwLock<Option<String>>,
    pacer: RequestPacer,
}

impl ApiClient {
    /// Create a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = Url::parse(&config.api.base_url)
            .map_err(|e| WatchlinkError::Config(format!("Invalid api.base_url: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(WatchlinkError::Config(format!(
                "api.base_url must be an absolute http(s) URL: {}",
                config.api.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Ok(Self {
            http,
            base_url,
            scope: config.api.scope.clone(),
            adjacent_limit: config.api.adjacent_limit,
            api_key: RwLock::new(config.api_key()),
            pacer: RequestPacer::new(Duration::from_millis(config.api.rate_limit_ms)),
        })
    }

    /// Replace the API key used by subsequent requests. In-flight requests
    /// keep the key they were issued with.
    pub fn set_api_key(&self, key: Option<String>) {
        *self.api_key.write().unwrap() = key;
    }

    fn auth_header(&self) -> Option<String> {
        self.api_key
            .read()
            .unwrap()
            .as_ref()
            .map(|key| format!("ApiKey {}", key))
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .expect("base URL validated as absolute")
            .extend(segments);
        url
    }

    fn search_url(&self, params: &SearchParams) -> Url {
        let mut url = self.endpoint(&["search", &self.scope]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("q", &params.query);
            if let Some(schema) = &params.schema {
                query.append_pair("schema", schema);
            }
            if let Some(dataset) = &params.dataset {
                query.append_pair("dataset", dataset);
            }
            if let Some(topics) = &params.topics {
                query.append_pair("topics", topics);
            }
            if let Some(countries) = &params.countries {
                query.append_pair("countries", countries);
            }
            if let Some(limit) = params.limit {
                query.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = params.offset {
                query.append_pair("offset", &offset.to_string());
            }
        }
        url
    }

    /// Paced, authenticated GET with status mapping.
    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        self.pacer.acquire().await;

        let mut request = self.http.get(url);
        if let Some(header) = self.auth_header() {
            request = request.header("Authorization", header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WatchlinkError::NetworkUnreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(status, &body));
        }

        Ok(response)
    }

    /// Full-text entity search.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        let response = self.get(self.search_url(params)).await?;
        response.json().await.map_err(|e| {
            WatchlinkError::UpstreamFailure(format!("Failed to parse search response: {}", e))
        })
    }

    /// Fetch a single entity record by identifier.
    pub async fn fetch_entity(&self, id: &str) -> Result<Entity> {
        let response = self.get(self.endpoint(&["entities", id])).await?;
        response.json().await.map_err(|e| {
            WatchlinkError::UpstreamFailure(format!("Failed to parse entity response: {}", e))
        })
    }

    /// Fetch the adjacency listing, flattened across property-name groups.
    /// Degrades to an empty list on any failure; adjacency is best-effort.
    pub async fn fetch_adjacent(&self, id: &str) -> Vec<Entity> {
        match self.adjacent_request(id).await {
            Ok(records) => records,
            Err(e) => {
                log::warn!("Adjacency fetch for {} failed, continuing without: {}", id, e);
                Vec::new()
            }
        }
    }

    async fn adjacent_request(&self, id: &str) -> Result<Vec<Entity>> {
        let mut url = self.endpoint(&["entities", id, "adjacent"]);
        url.query_pairs_mut()
            .append_pair("limit", &self.adjacent_limit.to_string());

        let response = self.get(url).await?;
        let body: Value = response.json().await.map_err(|e| {
            WatchlinkError::UpstreamFailure(format!("Failed to parse adjacency response: {}", e))
        })?;

        Ok(flatten_adjacent(body))
    }

    /// Dataset catalog metadata, passed through unprocessed.
    pub async fn catalog(&self) -> Result<Value> {
        let response = self.get(self.endpoint(&["catalog"])).await?;
        response.json().await.map_err(|e| {
            WatchlinkError::UpstreamFailure(format!("Failed to parse catalog response: {}", e))
        })
    }
}

#[async_trait]
impl EntitySource for ApiClient {
    async fn get_entity(&self, id: &str) -> Result<Entity> {
        self.fetch_entity(id).await
    }

    async fn get_adjacent(&self, id: &str) -> Vec<Entity> {
        self.fetch_adjacent(id).await
    }
}

/// Map a non-success HTTP status to the error taxonomy.
fn map_status(status: StatusCode, body: &str) -> WatchlinkError {
    let detail = format!("{}: {}", status, snippet(body));
    match status.as_u16() {
        400 => WatchlinkError::InvalidRequest(detail),
        401 => WatchlinkError::InvalidCredential(detail),
        403 => WatchlinkError::Forbidden(detail),
        404 => WatchlinkError::NotFound(detail),
        429 => WatchlinkError::RateLimited(detail),
        500 => WatchlinkError::UpstreamFailure(detail),
        _ => WatchlinkError::UnknownFailure(detail),
    }
}

/// First 200 characters of an error body, for log and error messages.
fn snippet(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    &body[..end]
}

/// Flatten any of the three adjacency response shapes into one record list.
/// Unexpected shapes yield an empty list.
fn flatten_adjacent(body: Value) -> Vec<Entity> {
    // Primary shape: records grouped by property name.
    if let Ok(grouped) = serde_json::from_value::<AdjacentResponse>(body.clone()) {
        return grouped
            .adjacent
            .into_values()
            .flat_map(|group| group.results)
            .collect();
    }
    // Fallback: flat array of records.
    if let Ok(flat) = serde_json::from_value::<Vec<Entity>>(body.clone()) {
        return flat;
    }
    // Fallback: {"results": [...]} wrapper.
    if let Ok(wrapper) = serde_json::from_value::<ResultsWrapper>(body) {
        return wrapper.results;
    }
    Vec::new()
}
