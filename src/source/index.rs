//! Client for the paginated canister index API
//!
//! Every outbound request (total count, pages and liveness probes) first
//! waits on a shared rate limiter, so requests are throttled but never
//! dropped.

use crate::{Result, SeekrError};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::Client;
use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use std::num::NonZeroU32;
use url::Url;

/// Default index endpoint
pub const DEFAULT_BASE_URL: &str = "https://ic-api.internetcomputer.org/api/v3/canisters";

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Default outbound request rate
pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 10;

/// One item of an index page
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IndexItem {
    canister_id: Option<String>,
    id: Option<String>,
}

impl IndexItem {
    /// Creates an item with the given canister identifier
    pub fn new(canister_id: impl Into<String>) -> Self {
        Self {
            canister_id: Some(canister_id.into()),
            id: None,
        }
    }

    /// Returns the item's identifier, preferring `canister_id` over `id`
    pub fn identifier(&self) -> Option<&str> {
        self.canister_id
            .as_deref()
            .or(self.id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct TotalPayload {
    total_canisters: Option<u64>,
    #[serde(rename = "totalCount")]
    total_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct PagePayload {
    #[serde(default)]
    data: Vec<IndexItem>,
}

/// Rate-limited client for the upstream index
pub struct IndexClient {
    client: Client,
    base_url: Url,
    page_size: u64,
    limiter: DefaultDirectRateLimiter,
}

impl IndexClient {
    /// Creates a client
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client used for every request
    /// * `base_url` - The index endpoint
    /// * `page_size` - Items requested per page (at least 1)
    /// * `requests_per_second` - Outbound request rate (at least 1)
    pub fn new(client: Client, base_url: Url, page_size: u64, requests_per_second: u32) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            client,
            base_url,
            page_size: page_size.max(1),
            limiter: RateLimiter::direct(Quota::per_second(rate)),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Fetches the total number of items in the index
    pub async fn fetch_total(&self) -> Result<u64> {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("limit", "0");

        let payload: TotalPayload = self.get_json(url.clone()).await?;

        payload
            .total_canisters
            .or(payload.total_count)
            .ok_or_else(|| SeekrError::UpstreamPayload {
                url: url.to_string(),
                source: serde_json::Error::custom("missing total count"),
            })
    }

    /// Fetches the items of one page (zero-based)
    pub async fn fetch_page(&self, page: u64) -> Result<Vec<IndexItem>> {
        let offset = page
            .checked_mul(self.page_size)
            .ok_or_else(|| SeekrError::UpstreamPayload {
                url: self.base_url.to_string(),
                source: serde_json::Error::custom(format!("page {} is out of range", page)),
            })?;

        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &self.page_size.to_string());

        let payload: PagePayload = self.get_json(url).await?;
        Ok(payload.data)
    }

    /// Sends a HEAD request to a candidate URL; true on a 2xx status
    pub async fn probe(&self, url: &str) -> bool {
        self.limiter.until_ready().await;

        match self.client.head(url).send().await {
            Ok(response) => {
                let ok = response.status().is_success();
                if !ok {
                    tracing::debug!("Probe of {} returned {}", url, response.status());
                }
                ok
            }
            Err(e) => {
                tracing::debug!("Probe of {} failed: {}", url, e);
                false
            }
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        self.limiter.until_ready().await;

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SeekrError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeekrError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| SeekrError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| SeekrError::UpstreamPayload {
            url: url.to_string(),
            source,
        })
    }
}
