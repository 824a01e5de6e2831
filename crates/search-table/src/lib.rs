//! `search-table` flattens search-engine JSON responses into tabular results.
//!
//! The crate only deals with parsed JSON values:
//! - index mappings become per-index dotted field listings ([`parse_mappings`])
//! - search responses, either raw document hits or nested aggregation trees, become a
//!   [`Table`] of ordered columns and sparse rows ([`flatten_response`])
//! - query descriptors are split into an engine request and a result allow-list
//!   ([`compile_query`])
//!
//! Networking sits behind the [`Transport`] trait; [`SearchRunner`] wires the pieces together.

mod aggregation;
mod error;
mod flatten;
pub mod mapping;
mod options;
pub mod query;
mod runner;
mod table;
mod types;

pub use crate::error::{interpret_error, SearchError, SearchResult};
pub use crate::flatten::{flatten_response, flatten_response_with_options};
pub use crate::mapping::{parse_mappings, schema_listing, FieldMapping, IndexSchema, SchemaEntry};
pub use crate::options::{FlattenOptions, DEFAULT_DIAGNOSTIC_TEXT_LIMIT, DEFAULT_ERROR_TEXT_LIMIT};
pub use crate::query::{
    compile_json_query, compile_query, compile_sql_query, CompiledQuery, Dialect, EngineRequest,
    Method, SQL_ENDPOINT,
};
pub use crate::runner::{SearchRunner, Transport, HEALTH_PATH, MAPPINGS_PATH};
pub use crate::table::{Column, ResultFields, Row, Table};
pub use crate::types::PortableType;
