//! # HTTP Backend
//!
//! ```text
//! GET  {base_url}/products/search?q={term}   → [CatalogEntry, ...]
//! POST {base_url}/sales                      → receipt JSON
//! POST {base_url}/sales/hold                 → receipt JSON
//!
//! non-2xx → BackendError::Rejected { status, message }
//!           message = body.message | body.error | None
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, error};

use pdv_core::{CatalogEntry, Receipt, SalePayload};

use crate::backend::{CatalogLookup, SaleSubmission};
use crate::error::{BackendError, BackendResult};

/// HTTP client for a remote sales backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

/// Error body shapes: `{"message": ".."}` or `{"error": ".."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl HttpBackend {
    /// Creates a backend rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpBackend {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_sale(&self, path: &str, sale: &SalePayload) -> BackendResult<Receipt> {
        let url = self.url(path);
        debug!(url = %url, items = sale.items.len(), "Posting sale");

        let response = self.client.post(&url).json(sale).send().await?;
        let response = check_status(response).await?;

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Receipt(serde_json::Value::Null));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Passes 2xx responses through, turns the rest into `Rejected`.
async fn check_status(response: Response) -> BackendResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.trim().is_empty());

    error!(status = status.as_u16(), message = ?message, "Backend rejected request");
    Err(BackendError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl CatalogLookup for HttpBackend {
    async fn search(&self, term: &str) -> BackendResult<Vec<CatalogEntry>> {
        let response = self
            .client
            .get(self.url("products/search"))
            .query(&[("q", term)])
            .send()
            .await?;

        let entries: Vec<CatalogEntry> = check_status(response).await?.json().await?;
        debug!(term = %term, results = entries.len(), "Catalog search");
        Ok(entries)
    }
}

#[async_trait]
impl SaleSubmission for HttpBackend {
    async fn submit(&self, sale: &SalePayload) -> BackendResult<Receipt> {
        self.post_sale("sales", sale).await
    }

    async fn hold(&self, sale: &SalePayload) -> BackendResult<Receipt> {
        self.post_sale("sales/hold", sale).await
    }
}
