// src/model/mod.rs
//! Page and database envelopes as the API returns them, plus the mapping
//! layer on top: schemas, records and typed models.

mod record;
mod schema;
mod typed;

pub use record::Record;
pub use schema::ModelSchema;
pub use typed::{FromPropertyValue, IntoPropertyValue, NotionModel};

use crate::types::{DatabaseId, PageId, RichText};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Notion page with its properties still in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageObject {
    pub id: PageId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub parent: Option<Parent>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

impl PageObject {
    /// Plain text of the page's title property, if it has one.
    pub fn title(&self) -> Option<String> {
        self.properties
            .values()
            .filter(|payload| payload.get("type").and_then(Value::as_str) == Some("title"))
            .find_map(|payload| serde_json::from_value::<RichText>(payload.get("title")?.clone()).ok())
            .map(|text| text.plain_text())
    }

    /// The database this page is a row of, if any.
    pub fn database_id(&self) -> Option<&DatabaseId> {
        match &self.parent {
            Some(Parent::Database { database_id }) => Some(database_id),
            _ => None,
        }
    }
}

/// Where a page or database lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Parent {
    #[serde(rename = "page_id")]
    Page { page_id: PageId },
    #[serde(rename = "database_id")]
    Database { database_id: DatabaseId },
    #[serde(rename = "block_id")]
    Block { block_id: String },
    #[serde(rename = "workspace")]
    Workspace,
    #[serde(other)]
    Unknown,
}

/// A Notion database with its property schema in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseObject {
    pub id: DatabaseId,
    #[serde(default)]
    pub title: RichText,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_envelope() {
        let page: PageObject = serde_json::from_value(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "created_time": "2022-03-01T19:05:00.000Z",
            "last_edited_time": "2022-07-06T20:25:00.000Z",
            "archived": false,
            "url": "https://www.notion.so/Tuscan-kale-598337872cf94fdf8782e53db20768a5",
            "parent": {"type": "database_id", "database_id": "d9824bdc-8445-4327-be8b-5b47500af6ce"},
            "properties": {
                "Price": {"id": "BJXS", "type": "number", "number": 2.5},
                "Name": {"id": "title", "type": "title", "title": [
                    {"type": "text", "text": {"content": "Tuscan kale", "link": null}, "plain_text": "Tuscan kale"}
                ]}
            }
        }))
        .unwrap();

        assert_eq!(page.title().as_deref(), Some("Tuscan kale"));
        assert_eq!(
            page.database_id().map(|id| id.as_str()),
            Some("d9824bdc84454327be8b5b47500af6ce")
        );
        // property order follows the payload
        assert_eq!(
            page.properties.keys().collect::<Vec<_>>(),
            vec!["Price", "Name"]
        );
    }

    #[test]
    fn test_parent_variants() {
        let workspace: Parent =
            serde_json::from_value(json!({"type": "workspace", "workspace": true})).unwrap();
        assert_eq!(workspace, Parent::Workspace);

        let other: Parent =
            serde_json::from_value(json!({"type": "data_source_id", "data_source_id": "x"}))
                .unwrap();
        assert_eq!(other, Parent::Unknown);
    }

    #[test]
    fn test_database_envelope() {
        let database: DatabaseObject = serde_json::from_value(json!({
            "object": "database",
            "id": "d9824bdc84454327be8b5b47500af6ce",
            "title": [{"type": "text", "text": {"content": "Grocery List"}, "plain_text": "Grocery List"}],
            "properties": {
                "Name": {"id": "title", "name": "Name", "type": "title", "title": {}}
            }
        }))
        .unwrap();
        assert_eq!(database.title.plain_text(), "Grocery List");
        assert_eq!(database.properties.len(), 1);
    }
}
