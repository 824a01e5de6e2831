use serde_json::Value as JsonValue;

use crate::options::FlattenOptions;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The engine answered with an explicit `error` object.
    #[error("{0}")]
    EngineReported(String),

    /// The response matched neither the hits nor the aggregations layout.
    #[error("{0}")]
    UnrecognizedShape(String),

    #[error("malformed response at {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("failed to serialize table: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SearchError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        SearchError::MalformedResponse {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

const CONTINUATION_MARKER: &str = "... continues";
const DIAGNOSTIC_MARKER: &str = "...";

/// Cuts `text` down to `limit` characters, appending `marker` when anything was dropped.
fn truncate_with(text: &str, limit: usize, marker: &str) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + marker.len());
            out.push_str(&text[..cut]);
            out.push_str(marker);
            out
        }
        None => text.to_string(),
    }
}

/// Strings are used verbatim; every other value is rendered as compact JSON.
fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds the bounded, human-readable message for an engine-reported error.
///
/// Structured errors carrying both `reason` and `details` render as `"{reason}: {details}"`
/// with each part truncated on its own; anything else is stringified whole.
pub fn interpret_error(error: &JsonValue, options: &FlattenOptions) -> String {
    let limit = options.error_text_limit;
    if let JsonValue::Object(fields) = error {
        if let (Some(reason), Some(details)) = (fields.get("reason"), fields.get("details")) {
            return format!(
                "{}: {}",
                truncate_with(&stringify(reason), limit, CONTINUATION_MARKER),
                truncate_with(&stringify(details), limit, CONTINUATION_MARKER),
            );
        }
    }
    truncate_with(&stringify(error), limit, CONTINUATION_MARKER)
}

/// Message for a response that is neither a hits list nor an aggregation tree.
pub(crate) fn unrecognized_shape_message(response: &JsonValue, options: &FlattenOptions) -> String {
    let raw = truncate_with(
        &response.to_string(),
        options.diagnostic_text_limit,
        DIAGNOSTIC_MARKER,
    );
    format!("failed to parse the results returned by the search engine:\n{raw}")
}
