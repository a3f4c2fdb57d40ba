// src/lib.rs
//! notion-alchemy — typed object mapping for Notion pages and databases.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `AppError`, `NotionErrorCode`, `ValidationError`
//! - **Configuration** — `ClientConfig`, `RetryPolicy`
//! - **Properties** — `PropertyKind`, `PropertyValue`, `PropertyCodec`, `PropertyRegistry`
//! - **Model** — `ModelSchema`, `Record`, `NotionModel`, `PageObject`, `DatabaseObject`
//! - **Queries** — `QueryFilter`, `FilterValue`
//! - **API client** — `NotionClient`, `NotionHttpClient`, `NotionRepository`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod error_recovery;
pub mod model;
pub mod properties;
pub mod query;
pub mod session;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, NotionErrorCode, Result};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::ClientConfig;
pub use crate::error_recovery::RetryPolicy;

// --- Properties ---
pub use crate::properties::{PropertyCodec, PropertyKind, PropertyRegistry, PropertyValue};

// --- Model ---
pub use crate::model::{
    DatabaseObject, FromPropertyValue, IntoPropertyValue, ModelSchema, NotionModel, PageObject,
    Parent, Record,
};

// --- Queries ---
pub use crate::query::{FilterValue, QueryFilter};

// --- Domain Types ---
pub use crate::types::{
    Annotations, ApiKey, Color, DatabaseId, DateOrDateTime, DateValue, FileRef, FileSource,
    FormulaResult, PageId, PropertyName, RichText, RichTextItem, SelectOption, User, UserId,
    ValidatedUrl,
};

// --- API Client ---
pub use crate::api::{NotionHttpClient, NotionRepository};
pub use crate::session::NotionClient;
