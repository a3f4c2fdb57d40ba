// src/config.rs
use crate::constants::{DEFAULT_MAX_QUERY_PAGES, DEFAULT_MAX_RETRIES};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::model::{ModelSchema, Record};
use crate::properties::PropertyKind;
use crate::query::{FilterValue, QueryFilter};
use crate::types::{ApiKey, DateOrDateTime, ValidatedUrl, ValidationError};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variables holding the integration token, in lookup order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["NOTION_API_KEY", "NOTION_TOKEN"];

/// Parsed and validated command-line input.
#[derive(Parser, Debug)]
#[command(name = "notion-alchemy", author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Notion API root to talk to (defaults to https://api.notion.com/v1)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Retries for rate-limited or failing requests
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,

    /// Most result pages of 100 rows a query follows
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_QUERY_PAGES)]
    pub max_pages: u32,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a page; with --schema, print it mapped onto a model schema
    Page {
        /// Page URL or ID
        page: String,
        /// Model schema JSON file
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Print a model schema inferred from a database
    Schema {
        /// Database URL or ID
        database: String,
    },
    /// Query the database of a model schema
    Query {
        /// Model schema JSON file (must carry a database_id)
        schema: PathBuf,
        /// Equality condition, repeatable
        #[arg(long = "where", value_name = "PROPERTY=VALUE")]
        conditions: Vec<String>,
        /// Sort key, repeatable; append ":desc" for descending order
        #[arg(long, value_name = "PROPERTY[:desc]")]
        sort: Vec<String>,
    },
    /// Create a page in the database of a model schema
    Create {
        /// Model schema JSON file (must carry a database_id)
        schema: PathBuf,
        /// Property assignment, repeatable
        #[arg(long = "set", value_name = "PROPERTY=VALUE")]
        assignments: Vec<String>,
    },
    /// Update properties of an existing page
    Update {
        /// Model schema JSON file
        schema: PathBuf,
        /// Page URL or ID
        page: String,
        /// Property assignment, repeatable
        #[arg(long = "set", value_name = "PROPERTY=VALUE")]
        assignments: Vec<String>,
    },
}

/// Resolved client configuration — validated and ready to build a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub base_url: Option<ValidatedUrl>,
    pub retry: RetryPolicy,
    pub max_query_pages: Option<u32>,
}

impl ClientConfig {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            base_url: None,
            retry: RetryPolicy::default(),
            max_query_pages: Some(DEFAULT_MAX_QUERY_PAGES),
        }
    }

    /// Reads the API key from the environment; everything else is default.
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::new(api_key_from_env()?))
    }

    /// Resolves a complete client configuration from CLI input and environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        let mut config = Self::from_env()?;
        config.base_url = cli
            .base_url
            .as_deref()
            .map(ValidatedUrl::parse)
            .transpose()?;
        config.retry = config.retry.with_max_retries(cli.max_retries);
        config.max_query_pages = Some(cli.max_pages);
        Ok(config)
    }
}

fn api_key_from_env() -> Result<ApiKey, AppError> {
    let raw = API_KEY_ENV_VARS
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| {
            AppError::MissingConfiguration(format!(
                "set {} (or {}) to a Notion integration token",
                API_KEY_ENV_VARS[0], API_KEY_ENV_VARS[1]
            ))
        })?;
    Ok(ApiKey::new(raw.trim())?)
}

/// Splits `PROPERTY=VALUE` at the first `=`.
pub fn parse_assignment(input: &str) -> Result<(&str, &str), AppError> {
    match input.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(ValidationError::InvalidValue {
            kind: "PROPERTY=VALUE assignment",
            input: input.to_string(),
        }
        .into()),
    }
}

/// Interprets a condition value as the declared kind, or as text.
fn filter_value(kind: Option<PropertyKind>, input: &str) -> Result<FilterValue, AppError> {
    let invalid = |kind: PropertyKind| ValidationError::InvalidValue {
        kind: kind.as_str(),
        input: input.to_string(),
    };
    Ok(match kind {
        Some(PropertyKind::Checkbox) => match PropertyKind::Checkbox.parse_input(input)? {
            crate::properties::PropertyValue::Checkbox(b) => FilterValue::Checkbox(b),
            _ => return Err(invalid(PropertyKind::Checkbox).into()),
        },
        Some(PropertyKind::Number) => FilterValue::Number(
            input
                .trim()
                .parse()
                .map_err(|_| invalid(PropertyKind::Number))?,
        ),
        Some(
            kind @ (PropertyKind::Date | PropertyKind::CreatedTime | PropertyKind::LastEditedTime),
        ) => FilterValue::Date(DateOrDateTime::parse(input).map_err(|_| invalid(kind))?),
        _ => FilterValue::Text(input.to_string()),
    })
}

/// Builds a query filter from `--where` and `--sort` arguments.
pub fn filter_from_args(
    schema: &ModelSchema,
    conditions: &[String],
    sorts: &[String],
) -> Result<QueryFilter, AppError> {
    let mut filter = QueryFilter::new();
    for condition in conditions {
        let (name, value) = parse_assignment(condition)?;
        filter = filter.equals(name, filter_value(schema.kind_of(name), value)?);
    }
    for sort in sorts {
        filter = match sort.rsplit_once(':') {
            Some((name, "desc")) => filter.sort_descending(name),
            Some((name, "asc")) => filter.sort_ascending(name),
            _ => filter.sort_ascending(sort.as_str()),
        };
    }
    Ok(filter)
}

/// Applies `--set` assignments to a record, parsing values per field kind.
pub fn apply_assignments(record: &mut Record, assignments: &[String]) -> Result<(), AppError> {
    for assignment in assignments {
        let (name, value) = parse_assignment(assignment)?;
        let kind = record.schema().kind_for(name)?;
        record.set(name, kind.parse_input(value)?)?;
    }
    Ok(())
}
