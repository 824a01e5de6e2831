use serde_json::{Map, Value as JsonValue};

use crate::error::{SearchError, SearchResult};
use crate::table::ResultFields;

/// Fixed endpoint for SQL-dialect queries.
pub const SQL_ENDPOINT: &str = "/_opendistro/_sql?format=json";

/// Query language the caller wrote the query in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dialect {
    /// Engine-native JSON query body with optional `index` / `result_fields` control keys.
    #[default]
    Json,
    /// SQL text forwarded verbatim to [`SQL_ENDPOINT`].
    Sql,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request for the external transport to issue against the engine.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineRequest {
    pub method: Method,
    /// Path relative to the configured engine URL, starting with `/`.
    pub path: String,
    pub body: Option<JsonValue>,
}

impl EngineRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: JsonValue) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// Headers every request carries.
    pub fn headers(&self) -> &'static [(&'static str, &'static str)] {
        &[("Accept", "application/json")]
    }
}

/// A query split into the engine request and the allow-list applied to its results.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    pub request: EngineRequest,
    pub result_fields: Option<ResultFields>,
}

/// Compiles caller query text for the given dialect.
pub fn compile_query(text: &str, dialect: Dialect) -> SearchResult<CompiledQuery> {
    match dialect {
        Dialect::Json => {
            let parsed: JsonValue = serde_json::from_str(text)
                .map_err(|err| SearchError::InvalidQuery(err.to_string()))?;
            compile_json_query(parsed)
        }
        Dialect::Sql => Ok(compile_sql_query(text)),
    }
}

/// Strips the `index` and `result_fields` control keys off a JSON query.
///
/// Whatever remains is sent to `/{index}/_search` untouched.
pub fn compile_json_query(query: JsonValue) -> SearchResult<CompiledQuery> {
    let JsonValue::Object(mut body) = query else {
        return Err(SearchError::InvalidQuery(
            "query must be a JSON object".to_string(),
        ));
    };

    let index = match body.shift_remove("index") {
        None => String::new(),
        Some(JsonValue::String(index)) => index,
        Some(other) => {
            return Err(SearchError::InvalidQuery(format!(
                "`index` must be a string, got {other}"
            )))
        }
    };
    let result_fields = take_result_fields(&mut body)?;

    Ok(CompiledQuery {
        request: EngineRequest::post(format!("/{index}/_search"), JsonValue::Object(body)),
        result_fields,
    })
}

fn take_result_fields(body: &mut Map<String, JsonValue>) -> SearchResult<Option<ResultFields>> {
    let Some(raw) = body.shift_remove("result_fields") else {
        return Ok(None);
    };
    let JsonValue::Array(items) = raw else {
        return Err(SearchError::InvalidQuery(
            "`result_fields` must be an array of strings".to_string(),
        ));
    };
    let names = items
        .into_iter()
        .map(|item| match item {
            JsonValue::String(name) => Ok(name),
            other => Err(SearchError::InvalidQuery(format!(
                "`result_fields` entries must be strings, got {other}"
            ))),
        })
        .collect::<SearchResult<Vec<String>>>()?;
    Ok(Some(ResultFields::new(names)))
}

/// Wraps SQL text as `{"query": text}` for the SQL endpoint. SQL results are never filtered.
pub fn compile_sql_query(text: &str) -> CompiledQuery {
    let mut body = Map::new();
    body.insert("query".to_string(), JsonValue::String(text.to_string()));
    CompiledQuery {
        request: EngineRequest::post(SQL_ENDPOINT, JsonValue::Object(body)),
        result_fields: None,
    }
}
