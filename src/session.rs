// src/session.rs
//! The object-mapping facade: records and typed models in, API calls out.

use crate::api::{NotionHttpClient, NotionRepository};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::model::{ModelSchema, NotionModel, PageObject, Record};
use crate::properties::PropertyRegistry;
use crate::query::QueryFilter;
use crate::types::{ApiKey, DatabaseId, PageId};
use serde_json::{json, Value};
use std::sync::Arc;

/// Reads, queries, creates and updates pages through a [`NotionRepository`],
/// converting properties with a [`PropertyRegistry`].
pub struct NotionClient<R: NotionRepository = NotionHttpClient> {
    repository: R,
    registry: Arc<PropertyRegistry>,
}

impl NotionClient<NotionHttpClient> {
    /// A client for the public Notion API with default settings.
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        Ok(Self::with_repository(NotionHttpClient::new(api_key)?))
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let mut http = NotionHttpClient::new(&config.api_key)?
            .with_retry_policy(config.retry)
            .with_max_query_pages(config.max_query_pages);
        if let Some(base_url) = &config.base_url {
            http = http.with_base_url(base_url);
        }
        Ok(Self::with_repository(http))
    }
}

impl<R: NotionRepository> NotionClient<R> {
    pub fn with_repository(repository: R) -> Self {
        Self {
            repository,
            registry: Arc::new(PropertyRegistry::standard()),
        }
    }

    /// Replaces the property registry, e.g. one with custom codecs.
    pub fn with_registry(mut self, registry: PropertyRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Fetches a page with its properties in wire form.
    pub async fn get_page(&self, id: &PageId) -> Result<PageObject, AppError> {
        self.repository.retrieve_page(id).await
    }

    /// Fetches a page and maps it onto `schema`.
    pub async fn get_record(
        &self,
        schema: impl Into<Arc<ModelSchema>>,
        id: &PageId,
    ) -> Result<Record, AppError> {
        let page = self.repository.retrieve_page(id).await?;
        Record::from_page(schema, &page, &self.registry)
    }

    /// Queries the schema's database, returning every matching page as a record.
    pub async fn query_database(
        &self,
        schema: impl Into<Arc<ModelSchema>>,
        filter: &QueryFilter,
    ) -> Result<Vec<Record>, AppError> {
        let schema = schema.into();
        let database_id = schema.require_database_id()?;
        let payload = filter.to_payload(Some(schema.as_ref()))?;

        let pages = self.repository.query_database(database_id, &payload).await?;
        pages
            .iter()
            .map(|page| Record::from_page(Arc::clone(&schema), page, &self.registry))
            .collect()
    }

    /// Creates a page in the record's database and returns it as stored.
    pub async fn create_page(&self, record: &Record) -> Result<Record, AppError> {
        let schema = Arc::clone(record.schema());
        let database_id = schema.require_database_id()?;
        let body = json!({
            "parent": { "database_id": database_id.to_dashed() },
            "properties": Value::Object(record.to_properties(&self.registry)?),
        });

        let page = self.repository.create_page(&body).await?;
        Record::from_page(schema, &page, &self.registry)
    }

    /// Writes the record's properties back to its page.
    pub async fn update_page(&self, record: &Record) -> Result<Record, AppError> {
        let id = record.id().ok_or(AppError::MissingPageId)?;
        let body = json!({
            "properties": Value::Object(record.to_properties(&self.registry)?),
        });

        let page = self.repository.update_page(id, &body).await?;
        Record::from_page(Arc::clone(record.schema()), &page, &self.registry)
    }

    /// Builds a schema from a database's property definitions.
    pub async fn infer_schema(&self, database_id: &DatabaseId) -> Result<ModelSchema, AppError> {
        let database = self.repository.retrieve_database(database_id).await?;
        Ok(ModelSchema::from_database(&database))
    }

    pub async fn get<M: NotionModel>(&self, id: &PageId) -> Result<M, AppError> {
        M::from_record(&self.get_record(M::schema(), id).await?)
    }

    pub async fn query<M: NotionModel>(&self, filter: &QueryFilter) -> Result<Vec<M>, AppError> {
        self.query_database(M::schema(), filter)
            .await?
            .iter()
            .map(M::from_record)
            .collect()
    }

    pub async fn create<M: NotionModel>(&self, model: &M) -> Result<M, AppError> {
        let record = model.to_record(M::schema())?;
        M::from_record(&self.create_page(&record).await?)
    }

    pub async fn update<M: NotionModel>(&self, model: &M) -> Result<M, AppError> {
        let mut record = model.to_record(M::schema())?;
        if let Some(id) = model.id() {
            record.set_id(id.clone());
        }
        M::from_record(&self.update_page(&record).await?)
    }
}
