// src/properties/input.rs
//! Parsing of property values from plain strings, as typed on a command line.

use super::{PropertyKind, PropertyValue};
use crate::error::AppError;
use crate::types::{
    DateOrDateTime, DateValue, FileRef, PageId, RichText, SelectOption, User, UserId,
    ValidatedUrl, ValidationError,
};

fn invalid(kind: PropertyKind, input: &str) -> AppError {
    AppError::ValidationError(ValidationError::InvalidValue {
        kind: kind.as_str(),
        input: input.to_string(),
    })
}

/// Comma-separated items, trimmed, with blanks dropped.
fn list(input: &str) -> impl Iterator<Item = &str> {
    input.split(',').map(str::trim).filter(|item| !item.is_empty())
}

/// `None` for blank input, otherwise the trimmed text.
fn optional(input: &str) -> Option<&str> {
    let trimmed = input.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

impl PropertyKind {
    /// Builds a value of this kind from a string.
    ///
    /// Lists (multi-select, people, relation, files) are comma separated,
    /// dates accept `start..end` ranges, and blank input clears nullable
    /// kinds.
    pub fn parse_input(&self, input: &str) -> Result<PropertyValue, AppError> {
        let kind = *self;
        let value = match kind {
            PropertyKind::Title => PropertyValue::Title(RichText::plain(input)),
            PropertyKind::RichText => PropertyValue::RichText(RichText::plain(input)),
            PropertyKind::Number => PropertyValue::Number(
                optional(input)
                    .map(|n| n.parse::<f64>().map_err(|_| invalid(kind, input)))
                    .transpose()?,
            ),
            PropertyKind::Checkbox => {
                PropertyValue::Checkbox(match input.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "1" | "x" => true,
                    "false" | "no" | "0" | "" => false,
                    _ => return Err(invalid(kind, input)),
                })
            }
            PropertyKind::Select => {
                PropertyValue::Select(optional(input).map(SelectOption::named))
            }
            PropertyKind::Status => {
                PropertyValue::Status(optional(input).map(SelectOption::named))
            }
            PropertyKind::MultiSelect => {
                PropertyValue::MultiSelect(list(input).map(SelectOption::named).collect())
            }
            PropertyKind::Date => PropertyValue::Date(match optional(input) {
                None => None,
                Some(text) => Some(match text.split_once("..") {
                    Some((start, end)) => DateValue::starting(DateOrDateTime::parse(start)?)
                        .with_end(DateOrDateTime::parse(end)?),
                    None => DateValue::starting(DateOrDateTime::parse(text)?),
                }),
            }),
            PropertyKind::People => PropertyValue::People(
                list(input)
                    .map(|id| UserId::parse(id).map(User::with_id))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyKind::Relation => PropertyValue::Relation(
                list(input)
                    .map(PageId::parse)
                    .collect::<Result<_, _>>()?,
            ),
            PropertyKind::Files => PropertyValue::Files(
                list(input)
                    .map(|url| {
                        let url = ValidatedUrl::parse(url)?;
                        Ok(FileRef::external(url.as_str(), url.as_str()))
                    })
                    .collect::<Result<_, ValidationError>>()?,
            ),
            PropertyKind::Url => PropertyValue::Url(
                optional(input)
                    .map(|url| ValidatedUrl::parse(url).map(|u| u.as_str().to_string()))
                    .transpose()?,
            ),
            PropertyKind::Email => match optional(input) {
                Some(email) if !email.contains('@') => return Err(invalid(kind, input)),
                email => PropertyValue::Email(email.map(str::to_string)),
            },
            PropertyKind::PhoneNumber => {
                PropertyValue::PhoneNumber(optional(input).map(str::to_string))
            }
            PropertyKind::Formula | PropertyKind::CreatedTime | PropertyKind::LastEditedTime => {
                return Err(AppError::ReadOnlyProperty(kind.to_string()))
            }
        };
        Ok(value)
    }
}
