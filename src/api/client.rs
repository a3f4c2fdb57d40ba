// src/api/client.rs
//! HTTP client for the Notion API.
//!
//! This module wraps reqwest for the handful of endpoints the object mapper
//! needs. It handles authentication, the base URL and retries; decoding is
//! left to [`super::parser`].

use super::{pagination, parser, NotionRepository};
use crate::constants::{API_BASE_URL, DEFAULT_MAX_QUERY_PAGES, NOTION_VERSION};
use crate::error::AppError;
use crate::error_recovery::{retry_with_backoff, retry_with_backoff_when, RetryPolicy};
use crate::model::{DatabaseObject, PageObject};
use crate::types::{ApiKey, DatabaseId, PageId, ValidatedUrl};
use reqwest::{header, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
    max_query_pages: Option<u32>,
}

impl NotionHttpClient {
    /// Creates a new HTTP client with Notion API authentication.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .build()?;
        Ok(Self {
            client,
            base_url: API_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
            max_query_pages: Some(DEFAULT_MAX_QUERY_PAGES),
        })
    }

    /// Points the client at another API root, e.g. a proxy or a test server.
    pub fn with_base_url(mut self, base_url: &ValidatedUrl) -> Self {
        self.base_url = base_url.as_str().trim_end_matches('/').to_string();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Caps how many result pages a query follows; `None` follows them all.
    pub fn with_max_query_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_query_pages = max_pages;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates the default headers for Notion API requests.
    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = api_key.bearer();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );

        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    /// Makes a GET request to the specified endpoint.
    pub async fn get(&self, endpoint: &str) -> Result<Response, AppError> {
        let url = self.url_for(endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).send().await?)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post(&self, endpoint: &str, body: &Value) -> Result<Response, AppError> {
        let url = self.url_for(endpoint);
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        log::debug!("POST {} -> {}", endpoint, response.status());
        Ok(response)
    }

    /// Makes a PATCH request with JSON body to the specified endpoint.
    pub async fn patch(&self, endpoint: &str, body: &Value) -> Result<Response, AppError> {
        let url = self.url_for(endpoint);
        log::debug!("PATCH {}", url);
        Ok(self.client.patch(url).json(body).send().await?)
    }

    /// One request, decoded into `T` or a typed error.
    async fn execute<T: DeserializeOwned>(
        &self,
        method: &Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, AppError> {
        let empty = json!({});
        let body = body.unwrap_or(&empty);
        let response = if *method == Method::POST {
            self.post(endpoint, body).await?
        } else if *method == Method::PATCH {
            self.patch(endpoint, body).await?
        } else {
            self.get(endpoint).await?
        };
        let result = extract_response_text(response).await?;
        parser::parse_api_response(result)
    }

    /// [`execute`](Self::execute) under the client's retry policy.
    ///
    /// Only for requests that may safely be repeated: reads, queries and
    /// property updates.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, AppError> {
        retry_with_backoff(|| self.execute(&method, endpoint, body), &self.retry).await
    }

    /// A request that must not be applied twice. It is resent only after
    /// failures Notion guarantees left no effect.
    async fn request_once<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<T, AppError> {
        retry_with_backoff_when(
            || self.execute(&method, endpoint, body),
            &self.retry,
            AppError::is_safe_to_resend,
        )
        .await
    }
}

#[async_trait::async_trait]
impl NotionRepository for NotionHttpClient {
    async fn retrieve_page(&self, id: &PageId) -> Result<PageObject, AppError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        self.request(Method::GET, &endpoint, None).await
    }

    async fn retrieve_database(&self, id: &DatabaseId) -> Result<DatabaseObject, AppError> {
        let endpoint = format!("databases/{}", id.to_dashed());
        self.request(Method::GET, &endpoint, None).await
    }

    async fn query_database(
        &self,
        id: &DatabaseId,
        query: &Value,
    ) -> Result<Vec<PageObject>, AppError> {
        let endpoint = format!("databases/{}/query", id.to_dashed());
        log::info!("Querying database {}", id);
        log::debug!("Query body: {}", query);
        let pagination_result = pagination::fetch_all_pages(
            |page_size, cursor| {
                let mut body = match query {
                    Value::Object(map) => map.clone(),
                    _ => serde_json::Map::new(),
                };
                body.insert("page_size".to_string(), json!(page_size));
                if let Some(cursor) = cursor {
                    body.insert("start_cursor".to_string(), json!(cursor));
                }
                let endpoint = endpoint.clone();
                async move {
                    self.request(Method::POST, &endpoint, Some(&Value::Object(body)))
                        .await
                }
            },
            self.max_query_pages,
        )
        .await?;

        log::info!(
            "Query on database {} returned {} page(s) in {} request(s)",
            id,
            pagination_result.items.len(),
            pagination_result.pages_fetched
        );
        Ok(pagination_result.items)
    }

    async fn create_page(&self, body: &Value) -> Result<PageObject, AppError> {
        let page: PageObject = self.request_once(Method::POST, "pages", Some(body)).await?;
        log::info!("Created page {}", page.id);
        Ok(page)
    }

    async fn update_page(&self, id: &PageId, body: &Value) -> Result<PageObject, AppError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        let page: PageObject = self.request(Method::PATCH, &endpoint, Some(body)).await?;
        log::info!("Updated page {}", page.id);
        Ok(page)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
