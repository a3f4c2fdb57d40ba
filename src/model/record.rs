// src/model/record.rs
//! A model instance: typed property values bound to a schema.

use super::typed::{FromPropertyValue, IntoPropertyValue};
use super::{ModelSchema, PageObject};
use crate::error::AppError;
use crate::properties::{PropertyRegistry, PropertyValue};
use crate::types::{FileRef, PageId, PropertyName};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Property values for one page, checked against a [`ModelSchema`].
///
/// A record read from Notion keeps the page id, the page url and the raw
/// payload of every mapped property next to the parsed values.
#[derive(Debug, Clone)]
pub struct Record {
    id: Option<PageId>,
    url: Option<String>,
    schema: Arc<ModelSchema>,
    values: IndexMap<PropertyName, PropertyValue>,
    raw: IndexMap<PropertyName, Value>,
}

impl Record {
    pub fn new(schema: impl Into<Arc<ModelSchema>>) -> Self {
        Self {
            id: None,
            url: None,
            schema: schema.into(),
            values: IndexMap::new(),
            raw: IndexMap::new(),
        }
    }

    /// Reads the schema's fields out of a page.
    ///
    /// Fields the page does not carry stay unset. A property whose wire type
    /// differs from the declared kind is an error.
    pub fn from_page(
        schema: impl Into<Arc<ModelSchema>>,
        page: &PageObject,
        registry: &PropertyRegistry,
    ) -> Result<Self, AppError> {
        let mut record = Self::new(schema);
        record.id = Some(page.id.clone());
        record.url = page.url.clone();

        let schema = Arc::clone(&record.schema);
        for (name, kind) in schema.fields() {
            let Some(payload) = page.properties.get(name.as_str()) else {
                log::debug!("Page {} has no property '{}'", page.id, name);
                continue;
            };

            let tag = payload.get("type").and_then(Value::as_str).unwrap_or_default();
            if tag != kind.as_str() {
                return Err(AppError::PropertyTypeMismatch {
                    property: name.to_string(),
                    expected: kind,
                    found: tag.to_string(),
                });
            }

            let value = registry.parse(payload)?;
            if value.kind().is_none() {
                return Err(AppError::MissingCodec(kind));
            }
            record.raw.insert(name.clone(), payload.clone());
            record.values.insert(name.clone(), value);
        }

        let ignored = page
            .properties
            .keys()
            .filter(|name| !schema.contains(name))
            .count();
        if ignored > 0 {
            log::debug!(
                "Ignored {} page propert{} not declared on the model",
                ignored,
                if ignored == 1 { "y" } else { "ies" }
            );
        }

        Ok(record)
    }

    pub fn id(&self) -> Option<&PageId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: PageId) {
        self.id = Some(id);
    }

    pub fn with_id(mut self, id: PageId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.schema
    }

    /// The payload a property had when the record was read from Notion.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Set values in schema order.
    pub fn values(&self) -> impl Iterator<Item = (&PropertyName, &PropertyValue)> {
        self.schema
            .fields()
            .filter_map(|(name, _)| self.values.get_key_value(name.as_str()))
    }

    /// Extracts a field as a plain Rust value.
    pub fn get_as<T: FromPropertyValue>(&self, name: &str) -> Result<T, AppError> {
        let kind = self.schema.kind_for(name)?;
        let value = self.values.get(name);
        let converted = match value {
            Some(value) => T::from_property_value(value),
            None => T::from_unset(),
        };
        converted.ok_or_else(|| AppError::PropertyTypeMismatch {
            property: name.to_string(),
            expected: kind,
            found: match value {
                Some(value) => format!(
                    "{} (not convertible to {})",
                    value.type_name(),
                    std::any::type_name::<T>()
                ),
                None => "no value".to_string(),
            },
        })
    }

    /// Sets a field, checking it against the schema.
    pub fn set(&mut self, name: &str, value: PropertyValue) -> Result<&mut Self, AppError> {
        let kind = self.schema.kind_for(name)?;
        if !kind.is_writable() {
            return Err(AppError::ReadOnlyProperty(kind.to_string()));
        }
        if value.kind() != Some(kind) {
            return Err(AppError::PropertyTypeMismatch {
                property: name.to_string(),
                expected: kind,
                found: value.type_name().to_string(),
            });
        }
        self.values.insert(PropertyName::from(name), value);
        Ok(self)
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, name: &str, value: PropertyValue) -> Result<Self, AppError> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Sets a field from a plain Rust value, converted to the field's kind.
    pub fn set_as<V: IntoPropertyValue>(
        &mut self,
        name: &str,
        value: V,
    ) -> Result<&mut Self, AppError> {
        let kind = self.schema.kind_for(name)?;
        let converted =
            value
                .into_property_value(kind)
                .ok_or_else(|| AppError::PropertyTypeMismatch {
                    property: name.to_string(),
                    expected: kind,
                    found: std::any::type_name::<V>().to_string(),
                })?;
        self.set(name, converted)
    }

    pub fn unset(&mut self, name: &str) -> Option<PropertyValue> {
        self.values.shift_remove(name)
    }

    /// The `properties` object of a create or update request.
    ///
    /// Unset, null and read-only values are left out, and so are files
    /// values holding Notion-hosted uploads, which cannot be written back.
    pub fn to_properties(&self, registry: &PropertyRegistry) -> Result<Map<String, Value>, AppError> {
        let mut properties = Map::new();
        for (name, value) in self.values() {
            if value.is_null() || !value.is_writable() {
                log::debug!("Not writing property '{}' ({})", name, value.type_name());
                continue;
            }
            if let PropertyValue::Files(files) = value {
                if files.iter().any(FileRef::is_hosted) {
                    log::warn!(
                        "Not writing property '{}': it holds files uploaded to Notion",
                        name
                    );
                    continue;
                }
            }
            properties.insert(name.to_string(), registry.format(value)?);
        }
        Ok(properties)
    }

    /// A compact JSON view for display.
    pub fn to_display_json(&self) -> Value {
        let properties: Map<String, Value> = self
            .values()
            .map(|(name, value)| (name.to_string(), value.to_display_json()))
            .collect();
        json!({
            "id": self.id.as_ref().map(PageId::to_dashed),
            "url": self.url,
            "properties": properties,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::PropertyKind;
    use crate::types::{FileSource, RichText, SelectOption};
    use pretty_assertions::assert_eq;

    fn schema() -> Arc<ModelSchema> {
        Arc::new(
            ModelSchema::new()
                .title("Name")
                .field("Done", PropertyKind::Checkbox)
                .field("Priority", PropertyKind::Select)
                .field("Score", PropertyKind::Formula)
                .field("Attachments", PropertyKind::Files)
                .rich_text("Notes"),
        )
    }

    fn page() -> PageObject {
        serde_json::from_value(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "url": "https://www.notion.so/598337872cf94fdf8782e53db20768a5",
            "properties": {
                "Name": {"id": "title", "type": "title", "title": [
                    {"type": "text", "text": {"content": "Ship v1"}, "plain_text": "Ship v1"}
                ]},
                "Done": {"id": "a", "type": "checkbox", "checkbox": true},
                "Priority": {"id": "b", "type": "select", "select": null},
                "Score": {"id": "c", "type": "formula", "formula": {"type": "number", "number": 9}},
                "Owner": {"id": "d", "type": "people", "people": []}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_from_page_reads_declared_fields() {
        let record = Record::from_page(schema(), &page(), &PropertyRegistry::standard()).unwrap();

        assert_eq!(
            record.id().map(PageId::as_str),
            Some("598337872cf94fdf8782e53db20768a5")
        );
        assert_eq!(record.get_as::<String>("Name").unwrap(), "Ship v1");
        assert!(record.get_as::<bool>("Done").unwrap());
        assert_eq!(record.get_as::<Option<String>>("Priority").unwrap(), None);
        assert_eq!(record.get_as::<f64>("Score").unwrap(), 9.0);
        assert!(!record.is_set("Notes"));
        assert_eq!(record.raw("Done"), Some(&json!({"id": "a", "type": "checkbox", "checkbox": true})));
        assert!(record.get("Owner").is_none());
    }

    #[test]
    fn test_from_page_rejects_wrong_wire_type() {
        let schema = Arc::new(ModelSchema::new().field("Done", PropertyKind::Number));
        let err = Record::from_page(schema, &page(), &PropertyRegistry::standard()).unwrap_err();
        assert!(matches!(
            err,
            AppError::PropertyTypeMismatch { property, expected: PropertyKind::Number, found }
                if property == "Done" && found == "checkbox"
        ));
    }

    #[test]
    fn test_set_checks_schema() {
        let mut record = Record::new(schema());
        assert!(matches!(
            record.set("Nope", PropertyValue::Checkbox(true)),
            Err(AppError::UnknownField(_))
        ));
        assert!(matches!(
            record.set("Done", PropertyValue::Number(Some(1.0))),
            Err(AppError::PropertyTypeMismatch { .. })
        ));
        assert!(matches!(
            record.set("Score", PropertyValue::Number(Some(1.0))),
            Err(AppError::ReadOnlyProperty(_))
        ));
        assert!(matches!(
            record.set_as("Done", "not a bool"),
            Err(AppError::PropertyTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_to_properties_skips_null_and_read_only() {
        let registry = PropertyRegistry::standard();
        let mut record = Record::from_page(schema(), &page(), &registry).unwrap();
        record.set_as("Notes", "remember the milk").unwrap();

        let properties = record.to_properties(&registry).unwrap();
        assert_eq!(
            Value::Object(properties),
            json!({
                "Name": {"title": [{"type": "text", "text": {"content": "Ship v1"}}]},
                "Done": {"checkbox": true},
                "Notes": {"rich_text": [{"type": "text", "text": {"content": "remember the milk"}}]}
            })
        );
    }

    #[test]
    fn test_to_properties_skips_hosted_files() {
        let registry = PropertyRegistry::standard();
        let mut record = Record::new(schema());
        record
            .set(
                "Attachments",
                PropertyValue::Files(vec![crate::types::FileRef {
                    name: "scan.png".to_string(),
                    source: FileSource::Hosted {
                        url: "https://s3.example.com/scan.png".to_string(),
                        expiry_time: None,
                    },
                }]),
            )
            .unwrap()
            .set("Priority", PropertyValue::Select(Some(SelectOption::named("Low"))))
            .unwrap();

        let properties = record.to_properties(&registry).unwrap();
        assert_eq!(
            Value::Object(properties),
            json!({"Priority": {"select": {"name": "Low"}}})
        );
    }

    #[test]
    fn test_values_follow_schema_order() {
        let record = Record::new(schema())
            .with("Notes", PropertyValue::RichText(RichText::plain("n")))
            .unwrap()
            .with("Name", PropertyValue::Title(RichText::plain("t")))
            .unwrap();
        let names: Vec<_> = record.values().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["Name", "Notes"]);
    }

    #[test]
    fn test_get_as_unset_scalar_is_an_error() {
        let record = Record::new(schema());
        assert!(matches!(
            record.get_as::<bool>("Done"),
            Err(AppError::PropertyTypeMismatch { found, .. }) if found == "no value"
        ));
        assert_eq!(record.get_as::<Option<bool>>("Done").unwrap(), None);
    }
}
