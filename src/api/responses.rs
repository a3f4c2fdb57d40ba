// src/api/responses.rs
//! Response envelopes shared by several endpoints.

use serde::{Deserialize, Serialize};

/// The error body Notion sends with every non-2xx response.
pub use notion_client::objects::error::Error as NotionError;

/// Generic paginated list envelope (`object: "list"`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Items gathered across every page of a paginated endpoint.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}
