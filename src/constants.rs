// src/constants.rs
//! Domain constants that define the operational boundaries of the client.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API boundaries
// ---------------------------------------------------------------------------

/// Root of the public Notion REST API.
pub const API_BASE_URL: &str = "https://api.notion.com/v1";

/// API version sent in the `Notion-Version` header on every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// How many objects the Notion API returns per page of query results.
///
/// The Notion API maximum is 100.
pub const NOTION_API_PAGE_SIZE: usize = 100;

/// Most result pages one database query will follow (100 000 rows).
pub const DEFAULT_MAX_QUERY_PAGES: u32 = 1000;

// ---------------------------------------------------------------------------
// Retry behaviour
// ---------------------------------------------------------------------------

/// Retries after the first attempt for rate-limited or failing requests.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait before the first retry; doubled after each further failure.
pub const RETRY_INITIAL_DELAY: Duration = Duration::from_millis(500);

/// Upper bound for the wait between two attempts.
pub const RETRY_MAX_DELAY: Duration = Duration::from_secs(8);

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing undecodable response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 500;
