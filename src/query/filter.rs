// src/query/filter.rs
//! Database query payloads: property filters joined with `and`, plus sorts.

use crate::model::ModelSchema;
use crate::properties::PropertyKind;
use crate::error::AppError;
use crate::types::DateOrDateTime;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{json, Map, Value};

/// A value compared against a property.
///
/// The variant decides the filter type when the property is not declared on
/// the model being queried.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Checkbox(bool),
    Number(f64),
    Date(DateOrDateTime),
    Text(String),
}

impl FilterValue {
    /// The property kind this value implies on its own.
    pub fn inferred_kind(&self) -> PropertyKind {
        match self {
            FilterValue::Checkbox(_) => PropertyKind::Checkbox,
            FilterValue::Number(_) => PropertyKind::Number,
            FilterValue::Date(_) => PropertyKind::Date,
            FilterValue::Text(_) => PropertyKind::RichText,
        }
    }

    /// Filter key inside a formula condition.
    fn formula_key(&self) -> &'static str {
        match self {
            FilterValue::Checkbox(_) => "checkbox",
            FilterValue::Number(_) => "number",
            FilterValue::Date(_) => "date",
            FilterValue::Text(_) => "string",
        }
    }

    /// Booleans and numbers stay JSON scalars; everything else is a string.
    pub fn to_json(&self) -> Value {
        match self {
            FilterValue::Checkbox(b) => json!(b),
            FilterValue::Number(n) => json!(n),
            FilterValue::Date(d) => json!(d.to_iso_string()),
            FilterValue::Text(s) => json!(s),
        }
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Checkbox(value)
    }
}

macro_rules! number_filter_value {
    ($($t:ty),*) => {
        $(impl From<$t> for FilterValue {
            fn from(value: $t) -> Self {
                FilterValue::Number(value as f64)
            }
        })*
    };
}

number_filter_value!(f64, f32, i64, i32, u32, usize);

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value.into())
    }
}

impl From<NaiveDateTime> for FilterValue {
    fn from(value: NaiveDateTime) -> Self {
        FilterValue::Date(value.into())
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        FilterValue::Date(value.into())
    }
}

impl From<DateTime<FixedOffset>> for FilterValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FilterValue::Date(value.into())
    }
}

impl From<DateOrDateTime> for FilterValue {
    fn from(value: DateOrDateTime) -> Self {
        FilterValue::Date(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Equals,
    DoesNotEqual,
    Contains,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Equals => "equals",
            Condition::DoesNotEqual => "does_not_equal",
            Condition::Contains => "contains",
        }
    }

    /// The operator name for a property of `kind`, if Notion has one.
    ///
    /// Equality on list-valued kinds is expressed as membership. Substring
    /// and membership tests exist only for text, list and string-formula
    /// properties.
    fn operator(self, kind: PropertyKind, value: &FilterValue) -> Option<&'static str> {
        match self {
            Condition::Equals if kind.is_collection() => Some("contains"),
            Condition::DoesNotEqual if kind.is_collection() => Some("does_not_contain"),
            Condition::Equals | Condition::DoesNotEqual => Some(self.as_str()),
            Condition::Contains => match kind {
                PropertyKind::Title
                | PropertyKind::RichText
                | PropertyKind::Url
                | PropertyKind::Email
                | PropertyKind::PhoneNumber
                | PropertyKind::MultiSelect
                | PropertyKind::People
                | PropertyKind::Relation => Some("contains"),
                PropertyKind::Formula if matches!(value, FilterValue::Text(_)) => Some("contains"),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Clause {
    property: String,
    condition: Condition,
    value: FilterValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Sort {
    property: String,
    direction: SortDirection,
}

/// Conditions and sorts for a database query.
///
/// ```ignore
/// let filter = QueryFilter::new()
///     .equals("Done", false)
///     .equals("Priority", "High")
///     .sort_descending("Due");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryFilter {
    clauses: Vec<Clause>,
    sorts: Vec<Sort>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_clause(
        mut self,
        property: impl Into<String>,
        condition: Condition,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.clauses.push(Clause {
            property: property.into(),
            condition,
            value: value.into(),
        });
        self
    }

    pub fn equals(self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with_clause(property, Condition::Equals, value)
    }

    pub fn does_not_equal(
        self,
        property: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.with_clause(property, Condition::DoesNotEqual, value)
    }

    pub fn contains(self, property: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with_clause(property, Condition::Contains, value)
    }

    pub fn sort_ascending(mut self, property: impl Into<String>) -> Self {
        self.sorts.push(Sort {
            property: property.into(),
            direction: SortDirection::Ascending,
        });
        self
    }

    pub fn sort_descending(mut self, property: impl Into<String>) -> Self {
        self.sorts.push(Sort {
            property: property.into(),
            direction: SortDirection::Descending,
        });
        self
    }

    /// True when the filter would match every page in default order.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty() && self.sorts.is_empty()
    }

    /// Builds the body of a database query request.
    ///
    /// Properties declared on `schema` are filtered as their declared kind;
    /// others as the kind their value implies. A condition Notion cannot
    /// evaluate on that kind is an error.
    pub fn to_payload(&self, schema: Option<&ModelSchema>) -> Result<Value, AppError> {
        let declared = |property: &str| schema.and_then(|schema| schema.kind_of(property));
        let mut payload = Map::new();

        if !self.clauses.is_empty() {
            let conditions = self
                .clauses
                .iter()
                .map(|clause| {
                    let kind = declared(&clause.property)
                        .unwrap_or_else(|| clause.value.inferred_kind());
                    clause_json(clause, kind)
                })
                .collect::<Result<Vec<Value>, AppError>>()?;
            payload.insert("filter".to_string(), json!({ "and": conditions }));
        }

        if !self.sorts.is_empty() {
            let sorts: Vec<Value> = self
                .sorts
                .iter()
                .map(|sort| match declared(&sort.property) {
                    Some(kind) if kind.is_timestamp() => {
                        json!({ "timestamp": kind.as_str(), "direction": sort.direction.as_str() })
                    }
                    _ => json!({ "property": sort.property, "direction": sort.direction.as_str() }),
                })
                .collect();
            payload.insert("sorts".to_string(), Value::Array(sorts));
        }

        Ok(Value::Object(payload))
    }
}

fn clause_json(clause: &Clause, kind: PropertyKind) -> Result<Value, AppError> {
    let operator = clause
        .condition
        .operator(kind, &clause.value)
        .ok_or_else(|| AppError::UnsupportedFilter {
            property: clause.property.clone(),
            condition: clause.condition.as_str(),
            kind,
        })?;
    let comparison = json!({ operator: clause.value.to_json() });
    Ok(match kind {
        PropertyKind::CreatedTime | PropertyKind::LastEditedTime => {
            json!({ "timestamp": kind.as_str(), kind.as_str(): comparison })
        }
        PropertyKind::Formula => json!({
            "property": clause.property,
            "formula": { clause.value.formula_key(): comparison },
        }),
        _ => json!({ "property": clause.property, kind.as_str(): comparison }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatabaseId;
    use pretty_assertions::assert_eq;

    fn schema() -> ModelSchema {
        ModelSchema::for_database(DatabaseId::parse("d9824bdc84454327be8b5b47500af6ce").unwrap())
            .title("Name")
            .field("Priority", PropertyKind::Select)
            .field("Tags", PropertyKind::MultiSelect)
            .field("Created", PropertyKind::CreatedTime)
            .field("Score", PropertyKind::Formula)
            .field("Owner", PropertyKind::People)
            .field("Blocked by", PropertyKind::Relation)
            .field("Done", PropertyKind::Checkbox)
            .field("Estimate", PropertyKind::Number)
    }

    #[test]
    fn test_empty_filter_is_empty_object() {
        assert_eq!(QueryFilter::new().to_payload(None).unwrap(), json!({}));
        assert!(QueryFilter::new().is_empty());
    }

    #[test]
    fn test_kind_inferred_from_value() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let payload = QueryFilter::new()
            .equals("Done", true)
            .equals("Estimate", 3)
            .equals("Due", day)
            .equals("Owner", "Ada")
            .to_payload(None)
            .unwrap();

        assert_eq!(
            payload,
            json!({"filter": {"and": [
                {"property": "Done", "checkbox": {"equals": true}},
                {"property": "Estimate", "number": {"equals": 3.0}},
                {"property": "Due", "date": {"equals": "2024-01-31"}},
                {"property": "Owner", "rich_text": {"equals": "Ada"}}
            ]}})
        );
    }

    #[test]
    fn test_declared_kinds_win_over_inference() {
        let payload = QueryFilter::new()
            .equals("Priority", "High")
            .equals("Tags", "urgent")
            .does_not_equal("Tags", "later")
            .equals("Name", "Launch")
            .to_payload(Some(&schema()))
            .unwrap();

        assert_eq!(
            payload,
            json!({"filter": {"and": [
                {"property": "Priority", "select": {"equals": "High"}},
                {"property": "Tags", "multi_select": {"contains": "urgent"}},
                {"property": "Tags", "multi_select": {"does_not_contain": "later"}},
                {"property": "Name", "title": {"equals": "Launch"}}
            ]}})
        );
    }

    #[test]
    fn test_timestamp_and_formula_shapes() {
        let instant = DateOrDateTime::parse("2024-03-01T00:00:00+00:00").unwrap();
        let payload = QueryFilter::new()
            .equals("Created", instant)
            .equals("Score", 10)
            .to_payload(Some(&schema()))
            .unwrap();

        assert_eq!(
            payload,
            json!({"filter": {"and": [
                {"timestamp": "created_time", "created_time": {"equals": "2024-03-01T00:00:00+00:00"}},
                {"property": "Score", "formula": {"number": {"equals": 10.0}}}
            ]}})
        );
    }

    #[test]
    fn test_sorts() {
        let payload = QueryFilter::new()
            .sort_descending("Created")
            .sort_ascending("Name")
            .to_payload(Some(&schema()))
            .unwrap();

        assert_eq!(
            payload,
            json!({"sorts": [
                {"timestamp": "created_time", "direction": "descending"},
                {"property": "Name", "direction": "ascending"}
            ]})
        );
    }

    #[test]
    fn test_people_and_relation_equality_is_membership() {
        let payload = QueryFilter::new()
            .equals("Owner", "6f1c3a42-9b0e-4d1c-8a55-0e0b1f6d2c11")
            .does_not_equal("Blocked by", "dd456007-6c66-4bba-957e-ea501dcda3a6")
            .to_payload(Some(&schema()))
            .unwrap();

        assert_eq!(
            payload,
            json!({"filter": {"and": [
                {"property": "Owner", "people": {"contains": "6f1c3a42-9b0e-4d1c-8a55-0e0b1f6d2c11"}},
                {"property": "Blocked by", "relation": {"does_not_contain": "dd456007-6c66-4bba-957e-ea501dcda3a6"}}
            ]}})
        );
    }

    #[test]
    fn test_contains_only_where_notion_supports_it() {
        let payload = QueryFilter::new()
            .contains("Name", "launch")
            .contains("Tags", "urgent")
            .contains("Score", "A")
            .to_payload(Some(&schema()))
            .unwrap();
        assert_eq!(
            payload["filter"]["and"][2],
            json!({"property": "Score", "formula": {"string": {"contains": "A"}}})
        );

        for filter in [
            QueryFilter::new().contains("Done", true),
            QueryFilter::new().contains("Estimate", 3),
            QueryFilter::new().contains("Created", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            QueryFilter::new().contains("Priority", "High"),
            QueryFilter::new().contains("Score", 10),
        ] {
            assert!(matches!(
                filter.to_payload(Some(&schema())),
                Err(AppError::UnsupportedFilter { condition: "contains", .. })
            ));
        }

        // Undeclared properties fall back to the kind the value implies
        assert!(QueryFilter::new().contains("Notes", "x").to_payload(None).is_ok());
        assert!(QueryFilter::new().contains("Count", 2).to_payload(None).is_err());
    }
}
