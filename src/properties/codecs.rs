// src/properties/codecs.rs
//! Built-in codecs for the standard property kinds.

use super::registry::PropertyCodec;
use super::{PropertyKind, PropertyValue};
use crate::error::AppError;
use crate::types::{
    DateValue, FileRef, FormulaResult, PageId, RichText, RichTextItem, SelectOption, User,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

/// The value under the payload's type key, or null when absent.
fn inner(payload: &Value, kind: PropertyKind) -> &Value {
    payload.get(kind.as_str()).unwrap_or(&Value::Null)
}

fn decode<T: DeserializeOwned>(kind: PropertyKind, payload: &Value) -> Result<T, AppError> {
    serde_json::from_value(inner(payload, kind).clone()).map_err(|e| {
        AppError::MalformedResponse(format!("Invalid {} property payload: {}", kind, e))
    })
}

/// Like [`decode`], treating a missing or null list as empty.
fn decode_list<T: DeserializeOwned>(kind: PropertyKind, payload: &Value) -> Result<Vec<T>, AppError> {
    if inner(payload, kind).is_null() {
        return Ok(Vec::new());
    }
    decode(kind, payload)
}

fn unexpected(kind: PropertyKind, value: &PropertyValue) -> AppError {
    AppError::InternalError {
        message: format!(
            "{} codec asked to format a {} value",
            kind,
            value.type_name()
        ),
        source: None,
    }
}

fn wrap(kind: PropertyKind, inner: Value) -> Value {
    json!({ kind.as_str(): inner })
}

/// Title and rich text: lists of formatted segments.
pub struct TextCodec {
    kind: PropertyKind,
}

impl TextCodec {
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyCodec for TextCodec {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let text = RichText::new(decode_list::<RichTextItem>(self.kind, payload)?);
        Ok(match self.kind {
            PropertyKind::Title => PropertyValue::Title(text),
            _ => PropertyValue::RichText(text),
        })
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Title(text) | PropertyValue::RichText(text)
                if value.kind() == Some(self.kind) =>
            {
                Ok(wrap(self.kind, text.to_request_json()))
            }
            other => Err(unexpected(self.kind, other)),
        }
    }
}

pub struct NumberCodec;

impl PropertyCodec for NumberCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Number
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        Ok(PropertyValue::Number(decode(self.kind(), payload)?))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Number(n) => Ok(wrap(self.kind(), json!(n))),
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

pub struct CheckboxCodec;

impl PropertyCodec for CheckboxCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Checkbox
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let checked: Option<bool> = decode(self.kind(), payload)?;
        Ok(PropertyValue::Checkbox(checked.unwrap_or(false)))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Checkbox(checked) => Ok(wrap(self.kind(), json!(checked))),
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

/// Select and status: a single named option, possibly empty.
pub struct ChoiceCodec {
    kind: PropertyKind,
}

impl ChoiceCodec {
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyCodec for ChoiceCodec {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let option: Option<SelectOption> = decode(self.kind, payload)?;
        Ok(match self.kind {
            PropertyKind::Status => PropertyValue::Status(option),
            _ => PropertyValue::Select(option),
        })
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Select(option) | PropertyValue::Status(option)
                if value.kind() == Some(self.kind) =>
            {
                let inner = option
                    .as_ref()
                    .map(|o| json!({ "name": o.name }))
                    .unwrap_or(Value::Null);
                Ok(wrap(self.kind, inner))
            }
            other => Err(unexpected(self.kind, other)),
        }
    }
}

pub struct MultiSelectCodec;

impl PropertyCodec for MultiSelectCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::MultiSelect
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        Ok(PropertyValue::MultiSelect(decode_list(self.kind(), payload)?))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::MultiSelect(options) => {
                let names: Vec<Value> = options.iter().map(|o| json!({ "name": o.name })).collect();
                Ok(wrap(self.kind(), Value::Array(names)))
            }
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

pub struct DateCodec;

impl PropertyCodec for DateCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Date
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let date: Option<DateValue> = decode(self.kind(), payload)?;
        Ok(PropertyValue::Date(date))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Date(date) => Ok(wrap(self.kind(), serde_json::to_value(date)?)),
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

pub struct PeopleCodec;

impl PropertyCodec for PeopleCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::People
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        Ok(PropertyValue::People(decode_list::<User>(self.kind(), payload)?))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::People(people) => {
                let refs: Vec<Value> = people
                    .iter()
                    .map(|user| json!({ "object": "user", "id": user.id.to_dashed() }))
                    .collect();
                Ok(wrap(self.kind(), Value::Array(refs)))
            }
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

/// Files: only externally linked files can be written back.
pub struct FilesCodec;

impl PropertyCodec for FilesCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Files
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        Ok(PropertyValue::Files(decode_list::<FileRef>(self.kind(), payload)?))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        let PropertyValue::Files(files) = value else {
            return Err(unexpected(self.kind(), value));
        };
        if files.iter().any(FileRef::is_hosted) {
            return Err(AppError::ReadOnlyProperty(
                "files (Notion-hosted uploads)".to_string(),
            ));
        }
        let entries: Vec<Value> = files
            .iter()
            .map(|file| {
                let name = if file.name.is_empty() {
                    file.url()
                } else {
                    file.name.as_str()
                };
                json!({ "name": name, "type": "external", "external": { "url": file.url() } })
            })
            .collect();
        Ok(wrap(self.kind(), Value::Array(entries)))
    }
}

#[derive(Deserialize)]
struct RelationRef {
    id: PageId,
}

pub struct RelationCodec;

impl PropertyCodec for RelationCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Relation
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        if payload.get("has_more").and_then(Value::as_bool) == Some(true) {
            log::warn!("Relation property is truncated; Notion returned only the first page of related ids");
        }
        let refs: Vec<RelationRef> = decode_list(self.kind(), payload)?;
        Ok(PropertyValue::Relation(refs.into_iter().map(|r| r.id).collect()))
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Relation(ids) => {
                let refs: Vec<Value> = ids.iter().map(|id| json!({ "id": id.to_dashed() })).collect();
                Ok(wrap(self.kind(), Value::Array(refs)))
            }
            other => Err(unexpected(self.kind(), other)),
        }
    }
}

/// Formula: computed by Notion, parse only.
pub struct FormulaCodec;

impl PropertyCodec for FormulaCodec {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Formula
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let result: Option<FormulaResult> = decode(self.kind(), payload)?;
        Ok(PropertyValue::Formula(
            result.unwrap_or(FormulaResult::String { string: None }),
        ))
    }

    fn format(&self, _value: &PropertyValue) -> Result<Value, AppError> {
        Err(AppError::ReadOnlyProperty(self.kind().to_string()))
    }
}

/// Url, email and phone number: optional plain strings.
pub struct StringCodec {
    kind: PropertyKind,
}

impl StringCodec {
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyCodec for StringCodec {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let value: Option<String> = decode(self.kind, payload)?;
        Ok(match self.kind {
            PropertyKind::Email => PropertyValue::Email(value),
            PropertyKind::PhoneNumber => PropertyValue::PhoneNumber(value),
            _ => PropertyValue::Url(value),
        })
    }

    fn format(&self, value: &PropertyValue) -> Result<Value, AppError> {
        match value {
            PropertyValue::Url(v) | PropertyValue::Email(v) | PropertyValue::PhoneNumber(v)
                if value.kind() == Some(self.kind) =>
            {
                Ok(wrap(self.kind, json!(v)))
            }
            other => Err(unexpected(self.kind, other)),
        }
    }
}

/// Created and last-edited timestamps: set by Notion, parse only.
pub struct TimestampCodec {
    kind: PropertyKind,
}

impl TimestampCodec {
    pub fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyCodec for TimestampCodec {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn parse(&self, payload: &Value) -> Result<PropertyValue, AppError> {
        let instant: DateTime<Utc> = decode(self.kind, payload)?;
        Ok(match self.kind {
            PropertyKind::LastEditedTime => PropertyValue::LastEditedTime(instant),
            _ => PropertyValue::CreatedTime(instant),
        })
    }

    fn format(&self, _value: &PropertyValue) -> Result<Value, AppError> {
        Err(AppError::ReadOnlyProperty(self.kind.to_string()))
    }
}
