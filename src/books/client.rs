//! Books API client
//!
//! Main client for the Google Books REST API, combining service-account
//! authentication and HTTP functionality.

use super::auth::{JwtConfig, ServiceAccountCredentials};
use super::encode_query;
use super::http::ApiHttpClient;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Default Books API endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Main Books API client
#[derive(Clone)]
pub struct BooksClient {
    pub credentials: ServiceAccountCredentials,
    pub http: ApiHttpClient,
    base_url: String,
}

impl BooksClient {
    /// Create a new Books client from a service-account JWT config
    pub fn new(config: JwtConfig) -> Result<Self> {
        let http = ApiHttpClient::new()?;

        let credentials = ServiceAccountCredentials::new(config, http.inner().clone())
            .context("Failed to initialize service account credentials")?;

        Ok(Self {
            credentials,
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Build a Books API URL from a resource path and query pairs
    pub fn api_url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path);
        let query_string = encode_query(query);
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        url
    }

    /// Make an authenticated GET request against a Books API resource path
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let token = self.get_token().await?;
        let url = self.api_url(path, query);
        self.http.get_json(&url, &token).await
    }
}

/// Format a Books API error for display
pub fn format_api_error(error: &anyhow::Error) -> String {
    super::http::format_api_error(error)
}
