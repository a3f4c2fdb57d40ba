// src/model/typed.rs
//! Conversions between plain Rust values and property values, and the
//! trait that lets a struct act as a model.

use super::{ModelSchema, Record};
use crate::error::AppError;
use crate::properties::{PropertyKind, PropertyValue};
use crate::types::{DateValue, FormulaResult, PageId, RichText, SelectOption, User};
use chrono::NaiveDate;
use std::sync::Arc;

/// A struct mapped onto the properties of a Notion database.
///
/// ```ignore
/// struct Task { id: Option<PageId>, name: String, done: bool }
///
/// impl NotionModel for Task {
///     fn schema() -> Arc<ModelSchema> {
///         Arc::new(ModelSchema::for_database(tasks_db()).title("Name")
///             .field("Done", PropertyKind::Checkbox))
///     }
///     fn from_record(record: &Record) -> Result<Self, AppError> {
///         Ok(Task { id: record.id().cloned(), name: record.get_as("Name")?, done: record.get_as("Done")? })
///     }
///     fn to_record(&self, schema: Arc<ModelSchema>) -> Result<Record, AppError> {
///         let mut record = Record::new(schema);
///         record.set_as("Name", self.name.as_str())?.set_as("Done", self.done)?;
///         Ok(record)
///     }
///     fn id(&self) -> Option<&PageId> { self.id.as_ref() }
/// }
/// ```
pub trait NotionModel: Sized {
    fn schema() -> Arc<ModelSchema>;

    fn from_record(record: &Record) -> Result<Self, AppError>;

    fn to_record(&self, schema: Arc<ModelSchema>) -> Result<Record, AppError>;

    /// The page this instance was read from, if any.
    fn id(&self) -> Option<&PageId>;
}

/// Extraction of a Rust value from a property value.
pub trait FromPropertyValue: Sized {
    fn from_property_value(value: &PropertyValue) -> Option<Self>;

    /// The value to use when the property is not set on the record.
    fn from_unset() -> Option<Self> {
        None
    }
}

/// Conversion of a Rust value into a property value of a given kind.
pub trait IntoPropertyValue {
    /// `None` when the value cannot be represented as `kind`.
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue>;
}

impl FromPropertyValue for String {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        value.as_text()
    }
}

impl FromPropertyValue for RichText {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Title(text) | PropertyValue::RichText(text) => Some(text.clone()),
            _ => None,
        }
    }
}

impl FromPropertyValue for f64 {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Number(n) => *n,
            PropertyValue::Formula(FormulaResult::Number { number }) => *number,
            _ => None,
        }
    }
}

impl FromPropertyValue for i64 {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        f64::from_property_value(value)
            .filter(|n| n.fract() == 0.0 && *n >= i64::MIN as f64 && *n <= i64::MAX as f64)
            .map(|n| n as i64)
    }
}

impl FromPropertyValue for bool {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Checkbox(checked) => Some(*checked),
            PropertyValue::Formula(FormulaResult::Boolean { boolean }) => *boolean,
            _ => None,
        }
    }
}

impl FromPropertyValue for DateValue {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Date(date) | PropertyValue::Formula(FormulaResult::Date { date }) => {
                date.clone()
            }
            _ => None,
        }
    }
}

impl FromPropertyValue for NaiveDate {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::CreatedTime(t) | PropertyValue::LastEditedTime(t) => {
                Some(t.date_naive())
            }
            other => DateValue::from_property_value(other).map(|date| date.start.date()),
        }
    }
}

impl FromPropertyValue for SelectOption {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Select(option) | PropertyValue::Status(option) => option.clone(),
            _ => None,
        }
    }
}

impl FromPropertyValue for Vec<String> {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::MultiSelect(options) => {
                Some(options.iter().map(|o| o.name.clone()).collect())
            }
            _ => None,
        }
    }

    fn from_unset() -> Option<Self> {
        Some(Vec::new())
    }
}

impl FromPropertyValue for Vec<PageId> {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::Relation(ids) => Some(ids.clone()),
            _ => None,
        }
    }

    fn from_unset() -> Option<Self> {
        Some(Vec::new())
    }
}

impl FromPropertyValue for Vec<User> {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        match value {
            PropertyValue::People(people) => Some(people.clone()),
            _ => None,
        }
    }

    fn from_unset() -> Option<Self> {
        Some(Vec::new())
    }
}

impl<T: FromPropertyValue> FromPropertyValue for Option<T> {
    fn from_property_value(value: &PropertyValue) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_property_value(value).map(Some)
    }

    fn from_unset() -> Option<Self> {
        Some(None)
    }
}

/// The "nothing here" value of a writable kind.
pub(crate) fn empty_value(kind: PropertyKind) -> Option<PropertyValue> {
    Some(match kind {
        PropertyKind::Title => PropertyValue::Title(RichText::default()),
        PropertyKind::RichText => PropertyValue::RichText(RichText::default()),
        PropertyKind::Number => PropertyValue::Number(None),
        PropertyKind::Checkbox => PropertyValue::Checkbox(false),
        PropertyKind::Select => PropertyValue::Select(None),
        PropertyKind::Status => PropertyValue::Status(None),
        PropertyKind::MultiSelect => PropertyValue::MultiSelect(Vec::new()),
        PropertyKind::Date => PropertyValue::Date(None),
        PropertyKind::People => PropertyValue::People(Vec::new()),
        PropertyKind::Files => PropertyValue::Files(Vec::new()),
        PropertyKind::Relation => PropertyValue::Relation(Vec::new()),
        PropertyKind::Url => PropertyValue::Url(None),
        PropertyKind::Email => PropertyValue::Email(None),
        PropertyKind::PhoneNumber => PropertyValue::PhoneNumber(None),
        PropertyKind::Formula | PropertyKind::CreatedTime | PropertyKind::LastEditedTime => {
            return None
        }
    })
}

impl IntoPropertyValue for &str {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        kind.parse_input(self).ok()
    }
}

impl IntoPropertyValue for String {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        self.as_str().into_property_value(kind)
    }
}

impl IntoPropertyValue for RichText {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        match kind {
            PropertyKind::Title => Some(PropertyValue::Title(self)),
            PropertyKind::RichText => Some(PropertyValue::RichText(self)),
            _ => None,
        }
    }
}

impl IntoPropertyValue for f64 {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::Number).then_some(PropertyValue::Number(Some(self)))
    }
}

impl IntoPropertyValue for i64 {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (self as f64).into_property_value(kind)
    }
}

impl IntoPropertyValue for bool {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::Checkbox).then_some(PropertyValue::Checkbox(self))
    }
}

impl IntoPropertyValue for DateValue {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::Date).then_some(PropertyValue::Date(Some(self)))
    }
}

impl IntoPropertyValue for NaiveDate {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        DateValue::starting(self).into_property_value(kind)
    }
}

impl IntoPropertyValue for SelectOption {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        match kind {
            PropertyKind::Select => Some(PropertyValue::Select(Some(self))),
            PropertyKind::Status => Some(PropertyValue::Status(Some(self))),
            _ => None,
        }
    }
}

impl IntoPropertyValue for Vec<String> {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::MultiSelect).then(|| {
            PropertyValue::MultiSelect(self.into_iter().map(SelectOption::named).collect())
        })
    }
}

impl IntoPropertyValue for Vec<PageId> {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::Relation).then_some(PropertyValue::Relation(self))
    }
}

impl IntoPropertyValue for Vec<User> {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        (kind == PropertyKind::People).then_some(PropertyValue::People(self))
    }
}

impl<T: IntoPropertyValue> IntoPropertyValue for Option<T> {
    fn into_property_value(self, kind: PropertyKind) -> Option<PropertyValue> {
        match self {
            Some(value) => value.into_property_value(kind),
            None => empty_value(kind),
        }
    }
}
