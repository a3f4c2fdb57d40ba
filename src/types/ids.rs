use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use url::Url;
use uuid::Uuid;

/// A Notion object ID, tagged with the kind of object it names.
///
/// Stored as 32 lowercase hex characters; sent to the API and serialized in
/// the dashed UUID form.
pub struct Id<T> {
    value: String,
    _phantom: PhantomData<T>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserMarker;

pub type PageId = Id<PageMarker>;
pub type DatabaseId = Id<DatabaseMarker>;
pub type UserId = Id<UserMarker>;

impl<T> Id<T> {
    /// Parse a 32-hex ID, a dashed UUID, or a Notion URL ending in an ID.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_notion_id(input)?;
        Ok(Self {
            value: normalized,
            _phantom: PhantomData,
        })
    }

    pub fn new_v4() -> Self {
        Self {
            value: Uuid::new_v4().as_simple().to_string(),
            _phantom: PhantomData,
        }
    }

    /// Get the ID as a string reference (32 lowercase hex characters)
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// The 8-4-4-4-12 form used in request paths and bodies.
    pub fn to_dashed(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            &self.value[0..8],
            &self.value[8..12],
            &self.value[12..16],
            &self.value[16..20],
            &self.value[20..32]
        )
    }

    /// Reinterprets the ID as another kind of object.
    ///
    /// Notion shares one ID space, so a relation target is a page ID and a
    /// page parent may be referenced as a database ID.
    pub fn cast<U>(&self) -> Id<U> {
        Id {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

// Manual impls so the marker types don't need to satisfy the derive bounds.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.value).finish()
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> std::str::FromStr for Id<T> {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_dashed().serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}

lazy_static::lazy_static! {
    // A page slug ends with the ID: "Roadmap-550e8400e29b41d4a716446655440000"
    static ref TRAILING_ID: Regex =
        Regex::new(r"(?:^|-)([0-9a-fA-F]{32})$").expect("TRAILING_ID pattern compiles");
}

/// Reduces an ID, dashed UUID or Notion URL to 32 lowercase hex characters.
fn normalize_notion_id(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidId("empty ID".to_string()));
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return id_from_url(trimmed);
    }

    if let Ok(uuid) = Uuid::parse_str(trimmed) {
        return Ok(uuid.as_simple().to_string());
    }

    match TRAILING_ID.captures(trimmed) {
        Some(captures) if captures[0].len() == trimmed.len() => Ok(captures[1].to_lowercase()),
        _ => Err(ValidationError::InvalidId(format!(
            "'{}' is not a 32-character hex ID or UUID",
            trimmed
        ))),
    }
}

/// Finds the ID in a Notion link.
///
/// A `p=` query parameter (a page opened on top of a database view) wins over
/// the path, whose last segment carries the database or page ID.
fn id_from_url(input: &str) -> Result<String, ValidationError> {
    let url = Url::parse(input)
        .map_err(|e| ValidationError::InvalidId(format!("{}: {}", input, e)))?;

    let from_query = url
        .query_pairs()
        .find(|(key, _)| key == "p")
        .map(|(_, value)| value.into_owned());
    let from_path = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string);

    from_query
        .into_iter()
        .chain(from_path)
        .find_map(|candidate| {
            if let Ok(uuid) = Uuid::parse_str(&candidate) {
                return Some(uuid.as_simple().to_string());
            }
            TRAILING_ID
                .captures(&candidate)
                .map(|captures| captures[1].to_lowercase())
        })
        .ok_or_else(|| ValidationError::InvalidId(format!("no Notion ID in URL {}", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parsing() {
        let id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = PageId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = PageId::parse("https://www.notion.so/Launch-Plan-550e8400e29b41d4a716446655440000/")
            .unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = PageId::parse(
            "https://www.notion.so/acme/d9824bdc84454327be8b5b47500af6ce?v=1&p=550e8400e29b41d4a716446655440000",
        )
        .unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");

        let id = DatabaseId::parse(
            "https://www.notion.so/acme/550E8400E29B41D4A716446655440000?v=abc",
        )
        .unwrap();
        assert_eq!(id.as_str(), "550e8400e29b41d4a716446655440000");
    }

    #[test]
    fn test_rejected_ids() {
        assert!(PageId::parse("too-short").is_err());
        assert!(PageId::parse("x550e8400e29b41d4a716446655440000").is_err());
        assert!(PageId::parse("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
        assert!(PageId::parse("").is_err());
        assert!(PageId::parse("https://www.notion.so/no-id-here").is_err());
    }

    #[test]
    fn test_to_dashed() {
        let id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        assert_eq!(id.to_dashed(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn test_serde_uses_dashed_form() {
        let id = PageId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"550e8400-e29b-41d4-a716-446655440000\"");

        let back: PageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<PageId>("\"nope\"").is_err());
    }

    #[test]
    fn test_cast_keeps_value() {
        let page = PageId::new_v4();
        let db: DatabaseId = page.cast();
        assert_eq!(page.as_str(), db.as_str());
    }
}
