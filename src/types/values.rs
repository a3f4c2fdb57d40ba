// src/types/values.rs
//! Value vocabulary shared by property parsers, formatters and filters.

use super::{Color, UserId, ValidationError};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Select, multi-select and status option.
///
/// Only `name` is needed when writing; Notion matches options by name and
/// creates missing select options on the fly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl SelectOption {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }
}

/// A calendar date, a wall-clock time, or an instant, as Notion stores date
/// starts and ends.
///
/// A wall-clock time has no offset; Notion reads it in the date's
/// `time_zone`, or in UTC when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrDateTime {
    Date(NaiveDate),
    Naive(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
}

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

impl DateOrDateTime {
    /// Parse an ISO 8601 date or date-time.
    ///
    /// Accepts `YYYY-MM-DD`, and date-times separated by `T` or a space,
    /// with or without seconds, fractional seconds and a `Z`/`±HH:MM` offset.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let input = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Ok(Self::Date(date));
        }

        let with_offset = match input.strip_suffix(['Z', 'z']) {
            Some(utc) => format!("{}+00:00", utc),
            None => input.to_string(),
        };
        if let Some(instant) = OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(&with_offset, format).ok())
        {
            return Ok(Self::DateTime(instant));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .map(Self::Naive)
            .ok_or_else(|| ValidationError::InvalidDate {
                input: input.to_string(),
                reason: "expected an ISO 8601 date or date-time".to_string(),
            })
    }

    /// The calendar date, ignoring any time component.
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::Naive(local) => local.date(),
            Self::DateTime(instant) => instant.date_naive(),
        }
    }

    pub fn to_iso_string(&self) -> String {
        match self {
            Self::Date(date) => date.format("%Y-%m-%d").to_string(),
            Self::Naive(local) => local.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::DateTime(instant) => instant.to_rfc3339(),
        }
    }
}

impl fmt::Display for DateOrDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_iso_string())
    }
}

impl From<NaiveDate> for DateOrDateTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for DateOrDateTime {
    fn from(local: NaiveDateTime) -> Self {
        Self::Naive(local)
    }
}

impl From<DateTime<FixedOffset>> for DateOrDateTime {
    fn from(instant: DateTime<FixedOffset>) -> Self {
        Self::DateTime(instant)
    }
}

impl From<DateTime<chrono::Utc>> for DateOrDateTime {
    fn from(instant: DateTime<chrono::Utc>) -> Self {
        Self::DateTime(instant.fixed_offset())
    }
}

impl Serialize for DateOrDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for DateOrDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Date property value with optional end and time zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    pub start: DateOrDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateOrDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl DateValue {
    pub fn starting(start: impl Into<DateOrDateTime>) -> Self {
        Self {
            start: start.into(),
            end: None,
            time_zone: None,
        }
    }

    pub fn with_end(mut self, end: impl Into<DateOrDateTime>) -> Self {
        self.end = Some(end.into());
        self
    }
}

/// A Notion user as it appears in people, created_by and mention payloads.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: Option<String>,
}

impl User {
    pub fn with_id(id: UserId) -> Self {
        Self {
            id,
            name: None,
            avatar_url: None,
            email: None,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.email) {
            (Some(name), _) => write!(f, "{}", name),
            (None, Some(email)) => write!(f, "{}", email),
            (None, None) => write!(f, "User {}", self.id),
        }
    }
}

/// Wire shape of a user object; `person.email` is flattened into `User`.
#[derive(Serialize, Deserialize)]
struct UserWire {
    id: UserId,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    person: Option<PersonWire>,
}

#[derive(Serialize, Deserialize)]
struct PersonWire {
    #[serde(default)]
    email: Option<String>,
}

impl Serialize for User {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        UserWire {
            id: self.id.clone(),
            name: self.name.clone(),
            avatar_url: self.avatar_url.clone(),
            person: self.email.clone().map(|email| PersonWire { email: Some(email) }),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for User {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let wire = UserWire::deserialize(deserializer)?;
        Ok(Self {
            id: wire.id,
            name: wire.name,
            avatar_url: wire.avatar_url,
            email: wire.person.and_then(|p| p.email),
        })
    }
}

/// Where a file attached to a files property lives.
#[derive(Debug, Clone, PartialEq)]
pub enum FileSource {
    /// Linked from outside Notion; writable.
    External { url: String },
    /// Uploaded to Notion; the URL is signed and expires.
    Hosted {
        url: String,
        expiry_time: Option<DateTime<chrono::Utc>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub name: String,
    pub source: FileSource,
}

impl FileRef {
    pub fn external(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::External { url: url.into() },
        }
    }

    pub fn url(&self) -> &str {
        match &self.source {
            FileSource::External { url } | FileSource::Hosted { url, .. } => url,
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self.source, FileSource::Hosted { .. })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum FileWire {
    External {
        #[serde(default)]
        name: String,
        external: ExternalWire,
    },
    File {
        #[serde(default)]
        name: String,
        file: HostedWire,
    },
}

#[derive(Serialize, Deserialize)]
struct ExternalWire {
    url: String,
}

#[derive(Serialize, Deserialize)]
struct HostedWire {
    url: String,
    #[serde(default)]
    expiry_time: Option<DateTime<chrono::Utc>>,
}

impl Serialize for FileRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let wire = match &self.source {
            FileSource::External { url } => FileWire::External {
                name: self.name.clone(),
                external: ExternalWire { url: url.clone() },
            },
            FileSource::Hosted { url, expiry_time } => FileWire::File {
                name: self.name.clone(),
                file: HostedWire {
                    url: url.clone(),
                    expiry_time: *expiry_time,
                },
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FileRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match FileWire::deserialize(deserializer)? {
            FileWire::External { name, external } => Self {
                name,
                source: FileSource::External { url: external.url },
            },
            FileWire::File { name, file } => Self {
                name,
                source: FileSource::Hosted {
                    url: file.url,
                    expiry_time: file.expiry_time,
                },
            },
        })
    }
}

/// Computed formula output. Each variant may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaResult {
    String { string: Option<String> },
    Number { number: Option<f64> },
    Boolean { boolean: Option<bool> },
    Date { date: Option<DateValue> },
}

impl FormulaResult {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String { string } => string.is_none(),
            Self::Number { number } => number.is_none(),
            Self::Boolean { boolean } => boolean.is_none(),
            Self::Date { date } => date.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_date_or_datetime_parsing() {
        let date = DateOrDateTime::parse("2024-03-01").unwrap();
        assert_eq!(date, DateOrDateTime::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(date.to_iso_string(), "2024-03-01");

        let instant = DateOrDateTime::parse("2024-03-01T09:30:00.000+02:00").unwrap();
        assert_eq!(instant.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(instant.to_iso_string(), "2024-03-01T09:30:00+02:00");

        assert!(DateOrDateTime::parse("2024-03-01T09:30:00.000Z").is_ok());
        assert!(DateOrDateTime::parse("yesterday").is_err());
    }

    #[test]
    fn test_wall_clock_times_without_offset() {
        let nine = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        for input in [
            "2024-05-01T09:00:00",
            "2024-05-01T09:00:00.000",
            "2024-05-01 09:00:00",
            "2024-05-01T09:00",
        ] {
            assert_eq!(
                DateOrDateTime::parse(input).unwrap(),
                DateOrDateTime::Naive(nine),
                "{}",
                input
            );
        }

        let naive = DateOrDateTime::parse("2024-05-01 09:00:00.250").unwrap();
        assert_eq!(naive.date(), NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(naive.to_iso_string(), "2024-05-01T09:00:00.250");
        assert_eq!(
            DateOrDateTime::parse("2024-05-01T09:00").unwrap().to_iso_string(),
            "2024-05-01T09:00:00"
        );
    }

    #[test]
    fn test_offsets_with_space_separator_or_no_seconds() {
        let instant = DateOrDateTime::parse("2024-05-01 09:00:00+02:00").unwrap();
        assert_eq!(instant.to_iso_string(), "2024-05-01T09:00:00+02:00");
        assert!(matches!(
            DateOrDateTime::parse("2024-05-01T09:00Z").unwrap(),
            DateOrDateTime::DateTime(_)
        ));
        assert!(DateOrDateTime::parse("2024-05-01T25:00:00").is_err());
    }

    #[test]
    fn test_naive_date_value_survives_serde() {
        let value: DateValue = serde_json::from_value(json!({
            "start": "2024-05-01T09:00:00.000",
            "end": null,
            "time_zone": "Europe/Berlin"
        }))
        .unwrap();
        assert!(matches!(value.start, DateOrDateTime::Naive(_)));
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({"start": "2024-05-01T09:00:00", "time_zone": "Europe/Berlin"})
        );
    }

    #[test]
    fn test_user_email_comes_from_person() {
        let user: User = serde_json::from_value(json!({
            "object": "user",
            "id": "6794760a-1f15-45cd-9c65-0dfe42f5135a",
            "name": "Ada",
            "type": "person",
            "person": {"email": "ada@example.com"}
        }))
        .unwrap();
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.to_string(), "Ada");
    }

    #[test]
    fn test_file_sources() {
        let files: Vec<FileRef> = serde_json::from_value(json!([
            {"name": "brief.pdf", "type": "file",
             "file": {"url": "https://s3.example.com/brief.pdf", "expiry_time": "2024-01-01T00:00:00.000Z"}},
            {"name": "site", "type": "external", "external": {"url": "https://example.com"}}
        ]))
        .unwrap();
        assert!(files[0].is_hosted());
        assert_eq!(files[1], FileRef::external("site", "https://example.com"));
    }

    #[test]
    fn test_formula_result_variants() {
        let result: FormulaResult =
            serde_json::from_value(json!({"type": "number", "number": 42})).unwrap();
        assert_eq!(result, FormulaResult::Number { number: Some(42.0) });

        let empty: FormulaResult =
            serde_json::from_value(json!({"type": "string", "string": null})).unwrap();
        assert!(empty.is_empty());
    }
}
