// src/properties/registry.rs
//! The property-type registry: a table from type tag to codec.
//!
//! Every conversion between a property's wire JSON and its in-memory value
//! goes through this table, so supporting a new Notion property type, or
//! changing how an existing one is written, means registering a codec.

use super::codecs;
use super::{PropertyKind, PropertyValue};
use crate::error::AppError;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A parser/formatter pair for one property kind.
pub trait PropertyCodec: Send + Sync {
    /// The kind this codec handles.
    fn kind(&self) -> PropertyKind;

    /// Converts a property payload (`{"id": …, "type": …, "<type>": …}`)
    /// into an in-memory value.
    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError>;

    /// Converts a value into its request-body shape (`{"<type>": …}`).
    fn format(&self, value: &PropertyValue) -> Result<Value, AppError>;
}

/// Maps property kinds to their codecs.
#[derive(Clone)]
pub struct PropertyRegistry {
    codecs: HashMap<PropertyKind, Arc<dyn PropertyCodec>>,
}

impl PropertyRegistry {
    /// A registry with no codecs at all.
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    /// A registry with a codec for every kind in [`PropertyKind::ALL`].
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for kind in [PropertyKind::Title, PropertyKind::RichText] {
            registry.register(codecs::TextCodec::new(kind));
        }
        registry.register(codecs::NumberCodec);
        registry.register(codecs::CheckboxCodec);
        for kind in [PropertyKind::Select, PropertyKind::Status] {
            registry.register(codecs::ChoiceCodec::new(kind));
        }
        registry.register(codecs::MultiSelectCodec);
        registry.register(codecs::DateCodec);
        registry.register(codecs::PeopleCodec);
        registry.register(codecs::FilesCodec);
        registry.register(codecs::RelationCodec);
        registry.register(codecs::FormulaCodec);
        for kind in [
            PropertyKind::Url,
            PropertyKind::Email,
            PropertyKind::PhoneNumber,
        ] {
            registry.register(codecs::StringCodec::new(kind));
        }
        for kind in [PropertyKind::CreatedTime, PropertyKind::LastEditedTime] {
            registry.register(codecs::TimestampCodec::new(kind));
        }
        registry
    }

    /// Adds a codec, returning the one it replaces.
    pub fn register(
        &mut self,
        codec: impl PropertyCodec + 'static,
    ) -> Option<Arc<dyn PropertyCodec>> {
        let kind = codec.kind();
        log::debug!("Registering codec for property type '{}'", kind);
        self.codecs.insert(kind, Arc::new(codec))
    }

    /// Builder-style [`register`](Self::register).
    pub fn with_codec(mut self, codec: impl PropertyCodec + 'static) -> Self {
        self.register(codec);
        self
    }

    pub fn contains(&self, kind: PropertyKind) -> bool {
        self.codecs.contains_key(&kind)
    }

    pub fn codec(&self, kind: PropertyKind) -> Result<&dyn PropertyCodec, AppError> {
        self.codecs
            .get(&kind)
            .map(|codec| codec.as_ref())
            .ok_or(AppError::MissingCodec(kind))
    }

    /// Parses a property payload, dispatching on its `type` tag.
    ///
    /// Tags without a codec yield [`PropertyValue::Unsupported`] so that one
    /// exotic property never prevents reading the rest of a page.
    pub fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let tag = payload
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::MalformedResponse("Property payload has no 'type' tag".to_string())
            })?;

        let codec = tag
            .parse::<PropertyKind>()
            .ok()
            .and_then(|kind| self.codecs.get(&kind));

        match codec {
            Some(codec) => codec.parse(payload),
            None => {
                log::warn!(
                    "Unsupported property type '{}', keeping raw payload",
                    tag
                );
                Ok(PropertyValue::Unsupported {
                    kind: tag.to_string(),
                    raw: payload.clone(),
                })
            }
        }
    }

    /// Formats a value into its request-body shape.
    pub fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        let kind = value
            .kind()
            .ok_or_else(|| AppError::ReadOnlyProperty(value.type_name().to_string()))?;
        self.codec(kind)?.format(value)
    }
}

impl Default for PropertyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.codecs.keys().map(PropertyKind::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("PropertyRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RichText;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Writes checkboxes as the strings "yes"/"no", to exercise overriding.
    struct ShoutingCheckbox;

    impl PropertyCodec for ShoutingCheckbox {
        fn kind(&self) -> PropertyKind {
            PropertyKind::Checkbox
        }

        fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
            Ok(PropertyValue::Checkbox(
                payload["checkbox"].as_bool().unwrap_or(false),
            ))
        }

        fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
            match value {
                PropertyValue::Checkbox(true) => Ok(json!({"checkbox": "yes"})),
                _ => Ok(json!({"checkbox": "no"})),
            }
        }
    }

    #[test]
    fn test_standard_registry_covers_every_kind() {
        let registry = PropertyRegistry::standard();
        for kind in PropertyKind::ALL {
            assert!(registry.contains(kind), "missing codec for {}", kind);
            assert_eq!(registry.codec(kind).unwrap().kind(), kind);
        }
    }

    #[test]
    fn test_parse_dispatches_on_type_tag() {
        let registry = PropertyRegistry::standard();
        let value = registry
            .parse(&json!({"id": "abc", "type": "checkbox", "checkbox": true}))
            .unwrap();
        assert_eq!(value, PropertyValue::Checkbox(true));
    }

    #[test]
    fn test_missing_type_tag_is_malformed() {
        let registry = PropertyRegistry::standard();
        let err = registry.parse(&json!({"checkbox": true})).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_unknown_tag_is_kept_raw() {
        let registry = PropertyRegistry::standard();
        let payload = json!({"id": "r", "type": "rollup", "rollup": {"type": "number", "number": 3}});
        let value = registry.parse(&payload).unwrap();
        assert_eq!(
            value,
            PropertyValue::Unsupported {
                kind: "rollup".to_string(),
                raw: payload
            }
        );
        assert!(matches!(
            registry.format(&value),
            Err(AppError::ReadOnlyProperty(kind)) if kind == "rollup"
        ));
    }

    #[test]
    fn test_kind_without_codec_is_unsupported_on_parse_and_error_on_format() {
        let registry = PropertyRegistry::empty();
        let value = registry
            .parse(&json!({"type": "title", "title": []}))
            .unwrap();
        assert!(matches!(value, PropertyValue::Unsupported { .. }));

        let err = registry
            .format(&PropertyValue::Title(RichText::plain("x")))
            .unwrap_err();
        assert!(matches!(err, AppError::MissingCodec(PropertyKind::Title)));
    }

    #[test]
    fn test_register_overrides_existing_codec() {
        let mut registry = PropertyRegistry::standard();
        let previous = registry.register(ShoutingCheckbox);
        assert!(previous.is_some());
        assert_eq!(
            registry.format(&PropertyValue::Checkbox(true)).unwrap(),
            json!({"checkbox": "yes"})
        );
    }
}
