// src/store/supabase.rs
// =============================================================================
// Talks to the listings table through Supabase's REST interface (PostgREST).
//
// Endpoints used:
// - GET   /rest/v1/<table>?select=...&is_active=eq.true   (read listings)
// - PATCH /rest/v1/<table>?id=in.(...)                    (deactivate)
//
// Every request carries the project key twice: as `apikey` (gateway) and as
// a bearer token (row-level security).
// =============================================================================

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{ListingSource, Record, RecordId, SitemapEntry, StoreError};

/// Columns the link checker reads
const CANDIDATE_COLUMNS: &str = "id,name,website_url";

/// Columns the sitemap generator reads
const SITEMAP_COLUMNS: &str = "id,updated_at,created_at";

/// Client for one table of a Supabase project
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    http: Client,
    endpoint: Url,
    api_key: String,
}

impl SupabaseClient {
    /// Builds a client for `<project_url>/rest/v1/<table>`
    ///
    /// `project_url` may or may not end with a slash.
    pub fn new(project_url: &str, api_key: &str, table: &str) -> Result<Self, StoreError> {
        let rest_root = format!("{}/rest/v1/", project_url.trim_end_matches('/'));
        let endpoint = Url::parse(&rest_root)?.join(table)?;

        Ok(Self {
            http: Client::new(),
            endpoint,
            api_key: api_key.to_string(),
        })
    }

    /// Reads every active listing for the sitemap, newest first
    pub async fn fetch_sitemap_entries(&self) -> Result<Vec<SitemapEntry>, StoreError> {
        let request = self.http.get(self.endpoint.clone()).query(&[
            ("select", SITEMAP_COLUMNS),
            ("is_active", "eq.true"),
            ("order", "created_at.desc"),
        ]);

        self.fetch_rows(request).await
    }

    // Adds the two auth headers every call needs
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, StoreError> {
        let response = self.authorize(request).send().await?;
        let response = ensure_success(response).await?;
        let rows = response.json::<Vec<T>>().await?;
        debug!(rows = rows.len(), endpoint = %self.endpoint, "fetched rows");
        Ok(rows)
    }
}

#[async_trait]
impl ListingSource for SupabaseClient {
    async fn fetch_candidates(&self) -> Result<Vec<Record>, StoreError> {
        let request = self.http.get(self.endpoint.clone()).query(&[
            ("select", CANDIDATE_COLUMNS),
            ("is_active", "eq.true"),
            ("website_url", "not.is.null"),
        ]);

        self.fetch_rows(request).await
    }

    async fn deactivate(&self, ids: &[RecordId], at: DateTime<Utc>) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        let literals: Vec<String> = ids.iter().map(RecordId::to_filter_literal).collect();
        let filter = format!("in.({})", literals.join(","));
        let body = json!({
            "is_active": false,
            "updated_at": at.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        let request = self
            .http
            .patch(self.endpoint.clone())
            .query(&[("id", filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&body);

        let response = self.authorize(request).send().await?;
        ensure_success(response).await?;
        debug!(count = ids.len(), "deactivated listings");
        Ok(())
    }
}

// Turns a non-2xx answer into StoreError::Status, keeping the body for context
async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}
