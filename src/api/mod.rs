// src/api/mod.rs
//! Notion API interaction — reading and writing pages in a workspace.
//!
//! This module provides a data-oriented interface to the Notion API,
//! with clear separation between I/O operations, parsing, and business logic.

pub mod client;
mod pagination;
pub mod parser;
mod responses;

use crate::error::AppError;
use crate::model::{DatabaseObject, PageObject};
use crate::types::{DatabaseId, PageId};
use serde_json::Value;

/// The ability to read and write pages in a Notion workspace.
///
/// Business logic depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    async fn retrieve_page(&self, id: &PageId) -> Result<PageObject, AppError>;

    async fn retrieve_database(&self, id: &DatabaseId) -> Result<DatabaseObject, AppError>;

    /// Runs a query and returns every matching page, across all result pages.
    ///
    /// `query` is the request body without pagination fields.
    async fn query_database(
        &self,
        id: &DatabaseId,
        query: &Value,
    ) -> Result<Vec<PageObject>, AppError>;

    /// Creates a page from a full request body (`parent` and `properties`).
    async fn create_page(&self, body: &Value) -> Result<PageObject, AppError>;

    async fn update_page(&self, id: &PageId, body: &Value) -> Result<PageObject, AppError>;
}

// Re-export the public interface
pub use client::{ApiResponse, NotionHttpClient};
pub use responses::PaginatedResponse;
