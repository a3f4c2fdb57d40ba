// src/model/schema.rs
//! Model schemas: which properties a model maps, and as what kind.

use super::DatabaseObject;
use crate::error::AppError;
use crate::properties::PropertyKind;
use crate::types::{DatabaseId, PropertyName};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// The shape of a model: an optional backing database and an ordered set of
/// named, typed fields.
///
/// In JSON form a field declared with `null` as its kind maps as rich text:
///
/// ```json
/// { "database_id": "d9824bdc84454327be8b5b47500af6ce",
///   "fields": { "Name": "title", "Done": "checkbox", "Notes": null } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_id: Option<DatabaseId>,
    #[serde(default, deserialize_with = "fields_defaulting_to_rich_text")]
    fields: IndexMap<PropertyName, PropertyKind>,
}

fn fields_defaulting_to_rich_text<'de, D>(
    deserializer: D,
) -> Result<IndexMap<PropertyName, PropertyKind>, D::Error>
where
    D: Deserializer<'de>,
{
    let declared = IndexMap::<PropertyName, Option<PropertyKind>>::deserialize(deserializer)?;
    Ok(declared
        .into_iter()
        .map(|(name, kind)| (name, kind.unwrap_or(PropertyKind::RichText)))
        .collect())
}

impl ModelSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema bound to a database, ready for querying and page creation.
    pub fn for_database(database_id: DatabaseId) -> Self {
        Self {
            database_id: Some(database_id),
            fields: IndexMap::new(),
        }
    }

    pub fn with_database_id(mut self, database_id: DatabaseId) -> Self {
        self.database_id = Some(database_id);
        self
    }

    /// Declares a field; redeclaring a name replaces its kind.
    pub fn field(mut self, name: impl Into<PropertyName>, kind: PropertyKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn title(self, name: impl Into<PropertyName>) -> Self {
        self.field(name, PropertyKind::Title)
    }

    /// Declares a field without a more specific kind.
    pub fn rich_text(self, name: impl Into<PropertyName>) -> Self {
        self.field(name, PropertyKind::RichText)
    }

    pub fn kind_of(&self, name: &str) -> Option<PropertyKind> {
        self.fields.get(name).copied()
    }

    /// Like [`kind_of`](Self::kind_of), failing for undeclared names.
    pub fn kind_for(&self, name: &str) -> Result<PropertyKind, AppError> {
        self.kind_of(name)
            .ok_or_else(|| AppError::UnknownField(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&PropertyName, PropertyKind)> {
        self.fields.iter().map(|(name, kind)| (name, *kind))
    }

    /// The name of the title field, if one is declared.
    pub fn title_field(&self) -> Option<&PropertyName> {
        self.fields
            .iter()
            .find(|(_, kind)| **kind == PropertyKind::Title)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The database id, or [`AppError::MissingDatabaseId`].
    pub fn require_database_id(&self) -> Result<&DatabaseId, AppError> {
        self.database_id.as_ref().ok_or(AppError::MissingDatabaseId)
    }

    /// Builds a schema mirroring a database's property schema.
    ///
    /// Properties of kinds without a standard codec are left out.
    pub fn from_database(database: &DatabaseObject) -> Self {
        let mut schema = Self::for_database(database.id.clone());
        for (name, definition) in &database.properties {
            let tag = definition
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            match tag.parse::<PropertyKind>() {
                Ok(kind) => schema.fields.insert(PropertyName::from(name.as_str()), kind),
                Err(_) => {
                    log::warn!(
                        "Skipping database property '{}' of unsupported type '{}'",
                        name,
                        tag
                    );
                    continue;
                }
            };
        }
        log::debug!(
            "Inferred schema with {} field(s) for database {}",
            schema.len(),
            database.id
        );
        schema
    }

    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a schema from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| AppError::JsonParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tasks_id() -> DatabaseId {
        DatabaseId::parse("d9824bdc84454327be8b5b47500af6ce").unwrap()
    }

    #[test]
    fn test_builder_keeps_declaration_order() {
        let schema = ModelSchema::for_database(tasks_id())
            .title("Name")
            .field("Done", PropertyKind::Checkbox)
            .rich_text("Notes");

        let names: Vec<_> = schema.fields().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Done", "Notes"]);
        assert_eq!(schema.kind_of("Notes"), Some(PropertyKind::RichText));
        assert_eq!(schema.title_field().map(PropertyName::as_str), Some("Name"));
        assert!(matches!(
            schema.kind_for("Missing"),
            Err(AppError::UnknownField(name)) if name == "Missing"
        ));
    }

    #[test]
    fn test_json_null_kind_means_rich_text() {
        let schema = ModelSchema::from_json_str(
            r#"{"database_id": "d9824bdc-8445-4327-be8b-5b47500af6ce",
                "fields": {"Name": "title", "Notes": null, "Tags": "multi_select"}}"#,
        )
        .unwrap();
        assert_eq!(schema.database_id, Some(tasks_id()));
        assert_eq!(schema.kind_of("Notes"), Some(PropertyKind::RichText));
        assert_eq!(schema.kind_of("Tags"), Some(PropertyKind::MultiSelect));
    }

    #[test]
    fn test_json_round_trip_and_missing_database() {
        let schema = ModelSchema::new().title("Name");
        let json = schema.to_json_pretty().unwrap();
        assert!(!json.contains("database_id"));
        assert_eq!(ModelSchema::from_json_str(&json).unwrap(), schema);
        assert!(matches!(
            schema.require_database_id(),
            Err(AppError::MissingDatabaseId)
        ));
    }

    #[test]
    fn test_load_reports_path_on_bad_json() {
        let path = std::env::temp_dir().join(format!("schema-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, "{not json").unwrap();
        let err = ModelSchema::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AppError::JsonParseError { path: p, .. } if p == path));
    }

    #[test]
    fn test_from_database_skips_unsupported_kinds() {
        let database: DatabaseObject = serde_json::from_value(json!({
            "id": "d9824bdc84454327be8b5b47500af6ce",
            "properties": {
                "Name": {"id": "title", "name": "Name", "type": "title", "title": {}},
                "Price": {"id": "a", "name": "Price", "type": "number", "number": {"format": "dollar"}},
                "Total": {"id": "b", "name": "Total", "type": "rollup", "rollup": {}}
            }
        }))
        .unwrap();

        let schema = ModelSchema::from_database(&database);
        assert_eq!(schema.database_id, Some(tasks_id()));
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.kind_of("Price"), Some(PropertyKind::Number));
        assert!(!schema.contains("Total"));
    }
}
