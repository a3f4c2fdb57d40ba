// src/properties/mod.rs
//! Property kinds, in-memory property values, and the codec registry that
//! converts between them and Notion's wire JSON.

mod codecs;
mod input;
pub mod registry;

pub use codecs::*;
pub use registry::{PropertyCodec, PropertyRegistry};

use crate::types::{
    DateValue, FileRef, FormulaResult, PageId, RichText, SelectOption, User, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// The Notion property type tag, as found in a property's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Number,
    Checkbox,
    Select,
    MultiSelect,
    Date,
    People,
    Files,
    Relation,
    Formula,
    Status,
    Url,
    Email,
    PhoneNumber,
    CreatedTime,
    LastEditedTime,
}

impl PropertyKind {
    /// Every kind the standard registry knows how to handle.
    pub const ALL: [PropertyKind; 17] = [
        PropertyKind::Title,
        PropertyKind::RichText,
        PropertyKind::Number,
        PropertyKind::Checkbox,
        PropertyKind::Select,
        PropertyKind::MultiSelect,
        PropertyKind::Date,
        PropertyKind::People,
        PropertyKind::Files,
        PropertyKind::Relation,
        PropertyKind::Formula,
        PropertyKind::Status,
        PropertyKind::Url,
        PropertyKind::Email,
        PropertyKind::PhoneNumber,
        PropertyKind::CreatedTime,
        PropertyKind::LastEditedTime,
    ];

    /// The wire tag for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Title => "title",
            PropertyKind::RichText => "rich_text",
            PropertyKind::Number => "number",
            PropertyKind::Checkbox => "checkbox",
            PropertyKind::Select => "select",
            PropertyKind::MultiSelect => "multi_select",
            PropertyKind::Date => "date",
            PropertyKind::People => "people",
            PropertyKind::Files => "files",
            PropertyKind::Relation => "relation",
            PropertyKind::Formula => "formula",
            PropertyKind::Status => "status",
            PropertyKind::Url => "url",
            PropertyKind::Email => "email",
            PropertyKind::PhoneNumber => "phone_number",
            PropertyKind::CreatedTime => "created_time",
            PropertyKind::LastEditedTime => "last_edited_time",
        }
    }

    /// Whether the Notion API accepts values of this kind in request bodies.
    pub fn is_writable(&self) -> bool {
        !matches!(
            self,
            PropertyKind::Formula | PropertyKind::CreatedTime | PropertyKind::LastEditedTime
        )
    }

    /// Whether database filters on this kind use the `timestamp` form.
    pub fn is_timestamp(&self) -> bool {
        matches!(
            self,
            PropertyKind::CreatedTime | PropertyKind::LastEditedTime
        )
    }

    /// Whether equality on this kind is expressed as membership.
    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            PropertyKind::MultiSelect | PropertyKind::People | PropertyKind::Relation
        )
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PropertyKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                kind: "property type",
                input: s.to_string(),
            })
    }
}

/// In-memory value of a single page property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Title(RichText),
    RichText(RichText),
    Number(Option<f64>),
    Checkbox(bool),
    Select(Option<SelectOption>),
    MultiSelect(Vec<SelectOption>),
    Status(Option<SelectOption>),
    Date(Option<DateValue>),
    People(Vec<User>),
    Files(Vec<FileRef>),
    Relation(Vec<PageId>),
    Formula(FormulaResult),
    Url(Option<String>),
    Email(Option<String>),
    PhoneNumber(Option<String>),
    CreatedTime(DateTime<Utc>),
    LastEditedTime(DateTime<Utc>),
    /// A property type without a registered codec, kept verbatim.
    Unsupported { kind: String, raw: Value },
}

impl PropertyValue {
    /// The kind of this value; `None` for unsupported properties.
    pub fn kind(&self) -> Option<PropertyKind> {
        Some(match self {
            PropertyValue::Title(_) => PropertyKind::Title,
            PropertyValue::RichText(_) => PropertyKind::RichText,
            PropertyValue::Number(_) => PropertyKind::Number,
            PropertyValue::Checkbox(_) => PropertyKind::Checkbox,
            PropertyValue::Select(_) => PropertyKind::Select,
            PropertyValue::MultiSelect(_) => PropertyKind::MultiSelect,
            PropertyValue::Status(_) => PropertyKind::Status,
            PropertyValue::Date(_) => PropertyKind::Date,
            PropertyValue::People(_) => PropertyKind::People,
            PropertyValue::Files(_) => PropertyKind::Files,
            PropertyValue::Relation(_) => PropertyKind::Relation,
            PropertyValue::Formula(_) => PropertyKind::Formula,
            PropertyValue::Url(_) => PropertyKind::Url,
            PropertyValue::Email(_) => PropertyKind::Email,
            PropertyValue::PhoneNumber(_) => PropertyKind::PhoneNumber,
            PropertyValue::CreatedTime(_) => PropertyKind::CreatedTime,
            PropertyValue::LastEditedTime(_) => PropertyKind::LastEditedTime,
            PropertyValue::Unsupported { .. } => return None,
        })
    }

    /// The wire tag of this value, including unsupported tags.
    pub fn type_name(&self) -> &str {
        match self {
            PropertyValue::Unsupported { kind, .. } => kind,
            other => other.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Whether the value is empty in the sense of "not set".
    ///
    /// Empty collections and text are still values: writing them clears the
    /// property. Null scalars are skipped when building request bodies.
    pub fn is_null(&self) -> bool {
        match self {
            PropertyValue::Number(v) => v.is_none(),
            PropertyValue::Select(v) | PropertyValue::Status(v) => v.is_none(),
            PropertyValue::Date(v) => v.is_none(),
            PropertyValue::Url(v) | PropertyValue::Email(v) | PropertyValue::PhoneNumber(v) => {
                v.is_none()
            }
            PropertyValue::Formula(result) => result.is_empty(),
            _ => false,
        }
    }

    /// Whether the value can appear in a request body.
    pub fn is_writable(&self) -> bool {
        self.kind().is_some_and(|kind| kind.is_writable())
    }

    /// Text rendering for title, rich text, choice and string-like values.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PropertyValue::Title(text) | PropertyValue::RichText(text) => Some(text.plain_text()),
            PropertyValue::Select(option) | PropertyValue::Status(option) => {
                option.as_ref().map(|o| o.name.clone())
            }
            PropertyValue::Url(v) | PropertyValue::Email(v) | PropertyValue::PhoneNumber(v) => {
                v.clone()
            }
            PropertyValue::Formula(FormulaResult::String { string }) => string.clone(),
            _ => None,
        }
    }

    /// A compact JSON rendering for display; not a wire format.
    pub fn to_display_json(&self) -> Value {
        match self {
            PropertyValue::Title(text) | PropertyValue::RichText(text) => {
                json!(text.plain_text())
            }
            PropertyValue::Number(n) => json!(n),
            PropertyValue::Checkbox(b) => json!(b),
            PropertyValue::Select(o) | PropertyValue::Status(o) => {
                json!(o.as_ref().map(|o| o.name.as_str()))
            }
            PropertyValue::MultiSelect(options) => {
                json!(options.iter().map(|o| o.name.as_str()).collect::<Vec<_>>())
            }
            PropertyValue::Date(d) => json!(d),
            PropertyValue::People(people) => {
                json!(people.iter().map(|p| p.to_string()).collect::<Vec<_>>())
            }
            PropertyValue::Files(files) => {
                json!(files.iter().map(|f| f.url()).collect::<Vec<_>>())
            }
            PropertyValue::Relation(ids) => {
                json!(ids.iter().map(|id| id.to_dashed()).collect::<Vec<_>>())
            }
            PropertyValue::Formula(result) => match result {
                FormulaResult::String { string } => json!(string),
                FormulaResult::Number { number } => json!(number),
                FormulaResult::Boolean { boolean } => json!(boolean),
                FormulaResult::Date { date } => json!(date),
            },
            PropertyValue::Url(v) | PropertyValue::Email(v) | PropertyValue::PhoneNumber(v) => {
                json!(v)
            }
            PropertyValue::CreatedTime(t) | PropertyValue::LastEditedTime(t) => {
                json!(t.to_rfc3339())
            }
            PropertyValue::Unsupported { raw, .. } => raw.clone(),
        }
    }
}
