//! Index mapping introspection.
//!
//! Turns a `/_mappings` response into dotted field paths per index, e.g.
//!
//! ```json
//! { "bank": { "mappings": { "properties": {
//!     "balance": { "type": "long" },
//!     "geo": { "properties": { "lat": { "type": "double" } } }
//! } } } }
//! ```
//!
//! yields `bank: [balance: integer, geo.lat: float]`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;

use crate::options::FlattenOptions;
use crate::types::PortableType;

/// A declared field of an index, addressed by its dotted path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMapping {
    pub path: String,
    pub column_type: PortableType,
}

/// Declared fields of one index, in mapping order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexSchema {
    pub name: String,
    pub fields: Vec<FieldMapping>,
}

impl IndexSchema {
    pub fn field_type(&self, path: &str) -> Option<PortableType> {
        self.fields
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.column_type)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.path.clone()).collect()
    }
}

/// Schema listing entry handed to callers: an index name and its column names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    pub columns: Vec<String>,
}

/// Walks a mapping response into per-index field schemas.
///
/// Internal indices (reserved prefix) and indices without declared properties are
/// skipped rather than treated as failures.
pub fn parse_mappings(response: &JsonValue, options: &FlattenOptions) -> Vec<IndexSchema> {
    let Some(indices) = response.as_object() else {
        log::debug!("mapping response is not an object; no indices listed");
        return Vec::new();
    };

    let mut schemas = Vec::new();
    for (index_name, index_data) in indices {
        if index_name.starts_with(options.reserved_index_prefix) {
            continue;
        }
        let Some(mappings) = index_data.get("mappings").and_then(JsonValue::as_object) else {
            log::debug!("index {index_name} has no mappings; skipping");
            continue;
        };

        let mut schema = IndexSchema {
            name: index_name.clone(),
            fields: Vec::new(),
        };
        let mut seen = HashSet::new();
        if let Some(properties) = mappings.get("properties") {
            let Some(properties) = properties.as_object() else {
                log::debug!("index {index_name} has non-object properties; skipping");
                continue;
            };
            collect_properties("", properties, &mut schema.fields, &mut seen, options);
        } else {
            // Older engines nest properties under a per-document-type name.
            let mut typed = mappings
                .values()
                .filter_map(|doc_type| doc_type.get("properties"))
                .filter_map(JsonValue::as_object)
                .peekable();
            if typed.peek().is_none() {
                log::debug!("index {index_name} declares no properties; skipping");
                continue;
            }
            for properties in typed {
                collect_properties("", properties, &mut schema.fields, &mut seen, options);
            }
        }
        schemas.push(schema);
    }
    schemas
}

fn collect_properties(
    prefix: &str,
    properties: &Map<String, JsonValue>,
    out: &mut Vec<FieldMapping>,
    seen: &mut HashSet<String>,
    options: &FlattenOptions,
) {
    for (name, property) in properties {
        if let Some(type_name) = property.get("type").and_then(JsonValue::as_str) {
            if type_name.is_empty() {
                continue;
            }
            let path = format!("{prefix}{name}");
            if !seen.insert(path.clone()) {
                continue;
            }
            out.push(FieldMapping {
                path,
                column_type: PortableType::for_type_name(type_name),
            });
        } else if let Some(nested) = property.get("properties").and_then(JsonValue::as_object) {
            if nested.is_empty() {
                continue;
            }
            let mut nested_prefix = format!("{prefix}{name}");
            nested_prefix.push(options.path_separator);
            collect_properties(&nested_prefix, nested, out, seen, options);
        }
    }
}

/// Converts parsed schemas into the listing shape: one entry per index with its column names.
pub fn schema_listing(schemas: &[IndexSchema]) -> Vec<SchemaEntry> {
    schemas
        .iter()
        .map(|schema| SchemaEntry {
            name: schema.name.clone(),
            columns: schema.column_names(),
        })
        .collect()
}
