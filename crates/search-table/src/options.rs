use serde::{Deserialize, Serialize};

/// Character limit applied to each part of an engine-reported error message.
pub const DEFAULT_ERROR_TEXT_LIMIT: usize = 10_240;

/// Character limit applied to raw payloads echoed back in diagnostics.
pub const DEFAULT_DIAGNOSTIC_TEXT_LIMIT: usize = 2_048;

/// Knobs for turning engine responses into tables.
///
/// Every field has a default, so hosts can deserialize a partial JSON object
/// (e.g. `{"reserved_index_prefix": "_"}`) and get the stock behavior for the rest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Joins parent and child keys when nested objects are flattened into column names.
    pub path_separator: char,
    /// Indices whose name starts with this character are treated as internal and never listed.
    pub reserved_index_prefix: char,
    /// Maximum characters kept from an engine-reported error (per part) before truncation.
    pub error_text_limit: usize,
    /// Maximum characters of an unrecognized response echoed back for diagnosis.
    pub diagnostic_text_limit: usize,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            path_separator: '.',
            reserved_index_prefix: '.',
            error_text_limit: DEFAULT_ERROR_TEXT_LIMIT,
            diagnostic_text_limit: DEFAULT_DIAGNOSTIC_TEXT_LIMIT,
        }
    }
}

impl FlattenOptions {
    pub(crate) fn join(&self, parent: &str, child: &str) -> String {
        let mut path = String::with_capacity(parent.len() + child.len() + 1);
        path.push_str(parent);
        path.push(self.path_separator);
        path.push_str(child);
        path
    }
}
