#![allow(dead_code)]

use search_table::{Column, PortableType, Row, Table};
use serde_json::Value as JsonValue;

pub fn row(value: JsonValue) -> Row {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("row fixture must be an object, got {other}"),
    }
}

pub fn column(name: &str, column_type: PortableType) -> Column {
    Column::new(name, column_type)
}

pub fn column_names(table: &Table) -> Vec<&str> {
    table.column_names().collect()
}
