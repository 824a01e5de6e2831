use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Column type exposed to callers, independent of the engine's own type vocabulary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortableType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Date,
}

impl PortableType {
    /// Maps an engine-reported field type name (as found in index mappings).
    ///
    /// Unknown names, including `object`, map to [`PortableType::String`].
    pub fn for_type_name(name: &str) -> Self {
        match name {
            "integer" | "long" | "short" | "byte" => PortableType::Integer,
            "float" | "double" | "half_float" | "scaled_float" => PortableType::Float,
            "boolean" => PortableType::Boolean,
            "date" | "date_nanos" => PortableType::Date,
            _ => PortableType::String,
        }
    }

    /// Maps the native kind of a JSON value.
    ///
    /// Numbers that fit an integer representation are integers; every other number is a
    /// float. Null, arrays and objects have no portable kind and map to string.
    pub fn for_value(value: &JsonValue) -> Self {
        match value {
            JsonValue::String(_) => PortableType::String,
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => PortableType::Integer,
            JsonValue::Number(_) => PortableType::Float,
            JsonValue::Bool(_) => PortableType::Boolean,
            JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => PortableType::String,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortableType::String => "string",
            PortableType::Integer => "integer",
            PortableType::Float => "float",
            PortableType::Boolean => "boolean",
            PortableType::Date => "date",
        }
    }
}

impl fmt::Display for PortableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
