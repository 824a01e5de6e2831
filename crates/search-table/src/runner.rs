use serde_json::Value as JsonValue;

use crate::error::{SearchError, SearchResult};
use crate::flatten::flatten_response_with_options;
use crate::mapping::{parse_mappings, schema_listing, SchemaEntry};
use crate::options::FlattenOptions;
use crate::query::{compile_query, Dialect, EngineRequest};
use crate::table::Table;

pub const MAPPINGS_PATH: &str = "/_mappings";
pub const HEALTH_PATH: &str = "/_cluster/health";

/// Issues requests against the search engine and returns the decoded JSON body.
///
/// Implementations own everything network related: base URL, authentication, TLS and
/// timeouts. A response whose body is an engine error object should be returned as `Ok`
/// so the error can be interpreted uniformly.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(&self, request: &EngineRequest) -> Result<JsonValue, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn send(&self, request: &EngineRequest) -> Result<JsonValue, Self::Error> {
        (**self).send(request)
    }
}

/// Compiles queries, sends them through a [`Transport`] and flattens the responses.
#[derive(Debug)]
pub struct SearchRunner<T> {
    transport: T,
    dialect: Dialect,
    options: FlattenOptions,
}

impl<T: Transport> SearchRunner<T> {
    pub fn new(transport: T, dialect: Dialect) -> Self {
        Self::with_options(transport, dialect, FlattenOptions::default())
    }

    pub fn with_options(transport: T, dialect: Dialect, options: FlattenOptions) -> Self {
        Self {
            transport,
            dialect,
            options,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    fn send(&self, request: &EngineRequest) -> SearchResult<JsonValue> {
        log::debug!("{} {}", request.method.as_str(), request.path);
        self.transport
            .send(request)
            .map_err(|err| SearchError::Transport(Box::new(err)))
    }

    pub fn run_query(&self, text: &str) -> SearchResult<Table> {
        let compiled = compile_query(text, self.dialect)?;
        let response = self.send(&compiled.request)?;
        flatten_response_with_options(&response, compiled.result_fields.as_ref(), &self.options)
    }

    /// Like [`SearchRunner::run_query`], serialized as `{"columns": [...], "rows": [...]}`.
    pub fn run_query_json(&self, text: &str) -> SearchResult<String> {
        let table = self.run_query(text)?;
        Ok(serde_json::to_string(&table)?)
    }

    pub fn schema(&self) -> SearchResult<Vec<SchemaEntry>> {
        let response = self.send(&EngineRequest::get(MAPPINGS_PATH))?;
        Ok(schema_listing(&parse_mappings(&response, &self.options)))
    }

    pub fn test_connection(&self) -> SearchResult<()> {
        self.send(&EngineRequest::get(HEALTH_PATH)).map(|_| ())
    }
}
