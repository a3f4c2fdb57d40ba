// src/query/mod.rs
//! Query building for database queries.

mod filter;

pub use filter::{Condition, FilterValue, QueryFilter, SortDirection};
